//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::orientation::Orientation;
pub use crate::path::{CrossSection, Path, Section, Segment};
pub use crate::point::Point;
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::ring::Ring;
pub use crate::shape::Shape;
pub use crate::span::Span;
pub use crate::transform::{Transform, TransformMut, Transformation, Translate, TranslateMut};
pub use crate::union::BoundingUnion;
pub use crate::units::{to_um, um};
