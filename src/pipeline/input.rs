//! Input validation: confirm a user-supplied path is a readable PDF.
//!
//! Validation happens *before* any session state is touched, so a rejected
//! file leaves the current slice list and status untouched. The `%PDF` magic
//! check gives callers a meaningful error instead of a backend crash on an
//! arbitrary file.

use crate::error::Design2CodeError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with the PDF magic.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, Design2CodeError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Design2CodeError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => return Err(Design2CodeError::NotAPdf { path, magic }),
                Err(_) => {
                    return Err(Design2CodeError::NotAPdf {
                        path,
                        magic: [0; 4],
                    })
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Design2CodeError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Design2CodeError::FileNotFound { path });
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(path)
}
