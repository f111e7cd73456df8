//! Output naming and atomic writes.
//!
//! Every converter writes its result through [`write_atomic`]: the bytes go
//! to a temp file inside the output directory which is then renamed onto the
//! final name. A conversion that fails mid-way therefore never leaves a
//! truncated `.md` or `.pdf` behind.

use crate::config::Direction;
use crate::error::Pdf2MdError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file stem used for naming outputs and the Markdown title.
pub fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// `<output_dir>/<source stem>.<direction output extension>`.
pub fn output_path(source: &Path, output_dir: &Path, direction: Direction) -> PathBuf {
    output_dir.join(format!(
        "{}.{}",
        source_stem(source),
        direction.output_extension()
    ))
}

/// Write `bytes` to `path`, creating parent directories, via temp file + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Pdf2MdError> {
    let write_err = |source: std::io::Error| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".pdf2md-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
