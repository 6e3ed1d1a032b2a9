//! Parametric photomask generation for superconducting qubit chips.
//!
//! A chip is produced by a [`ChipDesign`] from a [`FlatConfig`]. The sweep
//! driver in [`sweep`] varies configuration values across a grid of chips and
//! tiles the results into a single top-level [`Device`](layir::Device), which
//! [`gdsconv`] then writes to GDS.
//!
//! ```no_run
//! use maskgen::{chip::DesignRegistry, sweep::{run_sweep, SweepPlan}};
//!
//! # fn main() -> maskgen::Result<()> {
//! let mut config = config::load_config("sweep.yaml")?;
//! let registry = DesignRegistry::with_defaults();
//! let design = registry.resolve(&config)?;
//! let plan = SweepPlan::from_config(&config)?;
//! let top = run_sweep(&mut config, &plan, design.as_ref())?;
//! gdsconv::write_gds(&top, "out.gds", Default::default())?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

pub mod chip;
pub mod devices;
pub mod error;
pub mod params;
pub mod physics;
pub mod sweep;
pub mod tiling;

#[cfg(test)]
mod tests;

pub use chip::{ChipDesign, DesignRegistry};
pub use config::FlatConfig;
pub use error::{Error, Result};
pub use sweep::{run_sweep, SweepPlan, SweepPoint};
