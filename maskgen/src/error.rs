//! Mask generation errors.

use config::{ConfigError, Issues};
use gdsconv::GdsExportError;

/// A result type returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error building or exporting a mask.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration key was missing, mistyped, or unresolvable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// `sweep_mode` named neither `gridsweep` nor `array`.
    #[error("unknown sweep mode `{0}`: expected `gridsweep` or `array`")]
    UnknownSweepMode(String),
    /// `design_name` is not in the registry.
    #[error("unknown design `{name}`; registered designs: {}", .available.join(", "))]
    UnknownDesign {
        /// The requested design.
        name: String,
        /// Every registered design, in registration order.
        available: Vec<String>,
    },
    /// The sweep plan failed validation; nothing was built.
    #[error("invalid sweep plan:\n{0}")]
    InvalidPlan(Issues),
    /// An array layout cell refers to a variant that does not exist.
    #[error("array layout cell ({row}, {col}) refers to variant {index}, but only {count} variants are defined")]
    VariantIndex {
        /// Layout row of the cell.
        row: usize,
        /// Layout column of the cell.
        col: usize,
        /// The variant index found in the cell.
        index: usize,
        /// The number of variants defined.
        count: usize,
    },
    /// A configuration asks for a layout that cannot be drawn.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Writing GDS or port metadata failed.
    #[error(transparent)]
    Export(#[from] GdsExportError),
    /// A device tree operation failed, such as connecting a missing port.
    #[error(transparent)]
    Layout(#[from] layir::Error),
    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Device geometry could not be constructed from the given dimensions.
    #[error("invalid geometry: {0}")]
    Geometry(String),
}
