//! Input validation: check a queued path before handing it to a converter.
//!
//! pdfium crashes or returns opaque errors on non-PDF input, so for the
//! PDF → Markdown direction we check the `%PDF` magic bytes up front and
//! return a meaningful error instead.

use crate::config::Direction;
use crate::error::Pdf2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate `path` as a source for `direction`.
///
/// Checks, in order: extension, existence, read permission and (for PDFs)
/// magic bytes. Returns the path unchanged on success.
pub fn resolve_source(path: &Path, direction: Direction) -> Result<PathBuf, Pdf2MdError> {
    let path = path.to_path_buf();

    if !direction.accepts(&path) {
        return Err(Pdf2MdError::UnsupportedExtension {
            path,
            expected: direction.source_filter(),
        });
    }

    if !path.is_file() {
        return Err(Pdf2MdError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if direction == Direction::PdfToMarkdown {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(Pdf2MdError::NotAPdf { path, magic });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2MdError::FileNotFound { path });
        }
    }

    debug!("Resolved source: {}", path.display());
    Ok(path)
}

/// Read a Markdown/text source as UTF-8.
pub fn read_text(path: &Path) -> Result<String, Pdf2MdError> {
    std::fs::read_to_string(path).map_err(|source| Pdf2MdError::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}
