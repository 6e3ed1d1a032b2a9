//! Fixed polygon recipes for the structures placed on a chip or wafer.
//!
//! Every builder returns a [`Device`](layir::Device) whose name is the cell
//! name used in the exported GDS. Dimensions inside the recipes are in um.

pub mod primitives;

mod jj;
mod launch_pad;
mod markers;
mod resonator;
mod test_structures;
mod wafer;

pub use jj::{eb_line, jj};
pub use launch_pad::{dc_line, feed_line, launch_pad};
pub use markers::{corner_points, eb_markers, frame, CORNER_POINTS, EB_MARKERS};
pub use resonator::{resonator, ResonatorParams};
pub use test_structures::{test_areas, test_boxes};
pub use wafer::{wafer, wafer_grid};

/// GDS layers used by the recipes.
pub mod layers {
    use layir::Layer;

    /// Base metal.
    pub const METAL: Layer = Layer::new(0);
    /// Junction fingers and resonator center conductors.
    pub const FINGER: Layer = Layer::new(1);
    /// Junction boxes and undercut windows.
    pub const BOX: Layer = Layer::new(2);
    /// E-beam alignment markers.
    pub const MARKER: Layer = Layer::new(3);
    /// Ground-plane etch.
    pub const ETCH: Layer = Layer::new(4);
    /// Wafer outline.
    pub const WAFER: Layer = Layer::new(21);
    /// Dicing grid.
    pub const GRID: Layer = Layer::new(25);
}
