//! PDFium binding.
//!
//! Both converters drive the pdfium C++ library through `pdfium-render`.
//! Each converter binds lazily on first use and keeps the handle for its
//! lifetime; the queue worker owns the converters, so a binding never leaves
//! the thread that created it.

use crate::error::Pdf2MdError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium shared library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Directories searched for the platform pdfium library before falling back
/// to the system loader: the executable directory, then the current directory.
pub fn library_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&dir));
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    candidates
}

/// Bind to pdfium.
///
/// `PDFIUM_LIB_PATH` wins when set, and failing to load it is an error rather
/// than a silent fallback. Otherwise the [`library_candidates`] are tried,
/// then the system library.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2MdError> {
    if let Ok(path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !path.trim().is_empty() {
            let path = PathBuf::from(path);
            let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
                Pdf2MdError::PdfiumBindingFailed(format!(
                    "{e} (from {PDFIUM_LIB_PATH_ENV}={})",
                    path.display()
                ))
            })?;
            debug!("Bound pdfium from {}", path.display());
            return Ok(Pdfium::new(bindings));
        }
    }

    for path in library_candidates() {
        if let Ok(bindings) = Pdfium::bind_to_library(&path) {
            debug!("Bound pdfium from {}", path.display());
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| Pdf2MdError::PdfiumBindingFailed(e.to_string()))?;
    debug!("Bound system pdfium library");
    Ok(Pdfium::new(bindings))
}

/// A lazily bound pdfium handle.
#[derive(Default)]
pub struct Engine {
    pdfium: Option<Pdfium>,
}

impl Engine {
    /// The bound library, binding on first call.
    pub fn get(&mut self) -> Result<&Pdfium, Pdf2MdError> {
        if self.pdfium.is_none() {
            self.pdfium = Some(bind_pdfium()?);
        }
        self.pdfium
            .as_ref()
            .ok_or_else(|| Pdf2MdError::Internal("pdfium binding vanished".into()))
    }
}
