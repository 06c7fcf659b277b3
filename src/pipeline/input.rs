//! Input resolution: validate the user-supplied deck path.
//!
//! Input is a local file only — links inside the deck are fetched, the deck
//! itself is not. The `%PDF` magic bytes are checked up front so callers get
//! a meaningful error instead of a parser failure deep inside the PDF pass.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local deck path, validating existence, readability, and PDF
/// magic bytes.
pub fn resolve_input(path: &Path) -> Result<PathBuf, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved deck: {}", path.display());
    Ok(path.to_path_buf())
}
