//! GDSII export of device trees.

use std::{fs, path::Path, sync::Arc};

use layir::{Device, Library};
use tracing::info;

pub mod export;
pub mod metadata;

#[cfg(test)]
mod tests;

pub use export::{export_gds, GdsExportOpts};

pub type Result<T, E = GdsExportError> = std::result::Result<T, E>;

/// An error produced while exporting layout data.
#[derive(Debug, thiserror::Error)]
pub enum GdsExportError {
    /// A coordinate or layer number does not fit in its GDS field.
    #[error("value out of range for GDS: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),
    /// The GDS writer failed. Holds the writer's message, since its error
    /// type is not `Send`.
    #[error("failed to write GDS file: {0}")]
    Write(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Flattens `top` into a library, exports it, and saves it to `path`.
///
/// Parent directories of `path` are created as needed.
pub fn write_gds(top: &Arc<Device>, path: impl AsRef<Path>, opts: GdsExportOpts) -> Result<()> {
    let path = path.as_ref();
    let lib = Library::from_top(top);
    let gds = export_gds(&lib, opts)?;
    create_parent_dirs(path)?;
    gds.save(path)
        .map_err(|err| GdsExportError::Write(err.to_string()))?;
    info!(path = %path.display(), cells = lib.len(), "wrote GDS");
    Ok(())
}

pub(crate) fn create_parent_dirs(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
