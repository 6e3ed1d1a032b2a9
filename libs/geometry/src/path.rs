//! Centerline paths and their extrusion into polygons.
//!
//! Paths are described in micrometres as a sequence of straight and arc
//! segments starting from a point and heading. A [`CrossSection`] gives the
//! width and lateral offset of each extruded strip, so a coplanar waveguide is
//! one cross section with two gap strips on either side of the centerline.

use serde::{Deserialize, Serialize};

use crate::polygon::Polygon;
use crate::units::DBU_PER_UM;

/// One piece of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// A straight run of the given length.
    Straight {
        /// Length in micrometres.
        length: f64,
    },
    /// A circular arc.
    Arc {
        /// Radius in micrometres.
        radius: f64,
        /// Turn angle in degrees; positive turns left.
        angle: f64,
    },
}

impl Segment {
    /// The centerline length of the segment in micrometres.
    pub fn length(&self) -> f64 {
        match *self {
            Segment::Straight { length } => length,
            Segment::Arc { radius, angle } => radius * angle.to_radians().abs(),
        }
    }
}

/// A centerline made of straight and arc segments.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// let mut path = Path::new([0., 0.], 0.);
/// path.straight(100.).arc(50., 90.).straight(100.);
/// let len = path.length();
/// assert!((len - (200. + 50. * std::f64::consts::FRAC_PI_2)).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    start: [f64; 2],
    heading: f64,
    segments: Vec<Segment>,
}

/// A sampled point on a path centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    pos: [f64; 2],
    /// Heading in radians.
    heading: f64,
}

impl Path {
    /// Maximum angle between arc samples, in degrees.
    pub const ANGLE_RESOLUTION: f64 = 2.5;

    /// Creates an empty path starting at `start` (um) heading `heading` degrees
    /// counter-clockwise from the +x axis.
    pub fn new(start: [f64; 2], heading: f64) -> Self {
        Self {
            start,
            heading,
            segments: Vec::new(),
        }
    }

    /// Builds a path through `points` whose corners are replaced by arcs of
    /// the given radius.
    ///
    /// Returns `None` if there are fewer than two points, two consecutive
    /// points coincide, or the radius is too large for a corner to fit
    /// between its neighbours.
    ///
    /// # Examples
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let path = Path::smooth(&[[0., 0.], [100., 0.], [100., 100.]], 20.).unwrap();
    /// let [x, y] = path.end();
    /// assert!((x - 100.).abs() < 1e-9 && (y - 100.).abs() < 1e-9);
    /// ```
    pub fn smooth(points: &[[f64; 2]], radius: f64) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let headings = points
            .windows(2)
            .map(|w| {
                let (dx, dy) = (w[1][0] - w[0][0], w[1][1] - w[0][1]);
                (dx != 0. || dy != 0.).then(|| (dy.atan2(dx).to_degrees(), dx.hypot(dy)))
            })
            .collect::<Option<Vec<_>>>()?;

        // Signed turn at each interior vertex, in (-180, 180].
        let turns = headings
            .windows(2)
            .map(|w| {
                let t = crate::wrap_angle(w[1].0 - w[0].0);
                if t > 180. {
                    t - 360.
                } else {
                    t
                }
            })
            .collect::<Vec<_>>();
        let setback = |turn: f64| radius * (turn.abs().to_radians() / 2.).tan();

        let mut path = Self::new(points[0], headings[0].0);
        for (i, &(_, len)) in headings.iter().enumerate() {
            let before = if i > 0 { setback(turns[i - 1]) } else { 0. };
            let after = turns.get(i).map(|&t| setback(t)).unwrap_or(0.);
            let straight = len - before - after;
            if straight < -1e-9 {
                return None;
            }
            if straight > 1e-9 {
                path.straight(straight);
            }
            if let Some(&turn) = turns.get(i) {
                if turn != 0. {
                    path.arc(radius, turn);
                }
            }
        }
        Some(path)
    }

    /// Appends a straight segment.
    pub fn straight(&mut self, length: f64) -> &mut Self {
        self.segments.push(Segment::Straight { length });
        self
    }

    /// Appends an arc segment; positive angles turn left.
    pub fn arc(&mut self, radius: f64, angle: f64) -> &mut Self {
        self.segments.push(Segment::Arc { radius, angle });
        self
    }

    /// The segments of the path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The total centerline length in micrometres.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// The start point of the path in micrometres.
    #[inline]
    pub fn start(&self) -> [f64; 2] {
        self.start
    }

    /// The initial heading in degrees.
    #[inline]
    pub fn start_heading(&self) -> f64 {
        self.heading
    }

    /// The end point of the path in micrometres.
    pub fn end(&self) -> [f64; 2] {
        self.samples().last().map(|s| s.pos).unwrap_or(self.start)
    }

    /// The heading at the end of the path, in degrees.
    pub fn end_heading(&self) -> f64 {
        self.heading
            + self
                .segments
                .iter()
                .map(|s| match *s {
                    Segment::Straight { .. } => 0.,
                    Segment::Arc { angle, .. } => angle,
                })
                .sum::<f64>()
    }

    fn samples(&self) -> Vec<Sample> {
        let mut pos = self.start;
        let mut heading = self.heading.to_radians();
        let mut out = vec![Sample { pos, heading }];
        for seg in &self.segments {
            match *seg {
                Segment::Straight { length } => {
                    pos = [
                        pos[0] + length * heading.cos(),
                        pos[1] + length * heading.sin(),
                    ];
                    out.push(Sample { pos, heading });
                }
                Segment::Arc { radius, angle } => {
                    let turn = angle.signum();
                    // Center lies to the left for positive turns.
                    let center = [
                        pos[0] - turn * radius * heading.sin(),
                        pos[1] + turn * radius * heading.cos(),
                    ];
                    let steps = (angle.abs() / Self::ANGLE_RESOLUTION).ceil().max(1.) as usize;
                    let start_heading = heading;
                    for k in 1..=steps {
                        let h = start_heading + angle.to_radians() * k as f64 / steps as f64;
                        let p = [
                            center[0] + turn * radius * h.sin(),
                            center[1] - turn * radius * h.cos(),
                        ];
                        out.push(Sample { pos: p, heading: h });
                    }
                    heading = start_heading + angle.to_radians();
                    pos = out.last().map(|s| s.pos).unwrap_or(pos);
                }
            }
        }
        out
    }

    /// The sampled centerline in micrometres.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples().into_iter().map(|s| s.pos).collect()
    }

    /// Extrudes every section of `xs` along the path.
    ///
    /// Returns one polygon, in database units, per section.
    pub fn extrude<L: Clone>(&self, xs: &CrossSection<L>) -> Vec<(L, Polygon)> {
        let samples = self.samples();
        let scale = DBU_PER_UM as f64;
        xs.sections
            .iter()
            .map(|sec| {
                let lo = sec.offset - sec.width / 2.;
                let hi = sec.offset + sec.width / 2.;
                let offset_point = |s: &Sample, d: f64| {
                    let n = [-s.heading.sin(), s.heading.cos()];
                    [(s.pos[0] + d * n[0]) * scale, (s.pos[1] + d * n[1]) * scale]
                };
                let left = samples.iter().map(|s| offset_point(s, hi));
                let right = samples.iter().rev().map(|s| offset_point(s, lo));
                (sec.layer.clone(), Polygon::from_f64_verts(left.chain(right)))
            })
            .collect()
    }
}

/// One strip of a [`CrossSection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section<L> {
    /// Width in micrometres.
    pub width: f64,
    /// Offset of the strip center from the path centerline, in micrometres;
    /// positive is to the left of the direction of travel.
    pub offset: f64,
    /// The layer the strip is drawn on.
    pub layer: L,
}

/// A set of strips extruded together along a [`Path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection<L> {
    sections: Vec<Section<L>>,
}

impl<L> Default for CrossSection<L> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl<L> CrossSection<L> {
    /// Creates an empty cross section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a strip.
    pub fn add(mut self, width: f64, offset: f64, layer: L) -> Self {
        self.sections.push(Section {
            width,
            offset,
            layer,
        });
        self
    }

    /// The strips of the cross section.
    pub fn sections(&self) -> &[Section<L>] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::prelude::*;

    #[test]
    fn straight_extrusion_is_a_rectangle() {
        let mut path = Path::new([0., 0.], 0.);
        path.straight(100.);
        let xs = CrossSection::new().add(10., 0., 0u8);
        let polys = path.extrude(&xs);
        assert_eq!(polys.len(), 1);
        assert_eq!(
            polys[0].1.bbox(),
            Some(Rect::from_sides(0, -5_000, 100_000, 5_000))
        );
        assert_eq!(polys[0].1.points().len(), 4);
    }

    #[test]
    fn quarter_turn_ends_where_expected() {
        let mut path = Path::new([0., 0.], 0.);
        path.arc(50., 90.);
        let [x, y] = path.end();
        assert_relative_eq!(x, 50., epsilon = 1e-9);
        assert_relative_eq!(y, 50., epsilon = 1e-9);
        assert_relative_eq!(path.end_heading(), 90.);

        let mut path = Path::new([0., 0.], 0.);
        path.arc(50., -90.);
        let [x, y] = path.end();
        assert_relative_eq!(x, 50., epsilon = 1e-9);
        assert_relative_eq!(y, -50., epsilon = 1e-9);
    }

    #[test]
    fn smooth_path_rounds_corners() {
        let path = Path::smooth(&[[0., 0.], [200., 0.], [200., -300.]], 100.).unwrap();
        assert_relative_eq!(
            path.length(),
            100. + 200. + 100. * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
        let [x, y] = path.end();
        assert_relative_eq!(x, 200., epsilon = 1e-9);
        assert_relative_eq!(y, -300., epsilon = 1e-9);
        assert_relative_eq!(path.end_heading(), -90.);

        assert!(Path::smooth(&[[0., 0.], [50., 0.], [50., 50.]], 100.).is_none());
        assert!(Path::smooth(&[[0., 0.]], 10.).is_none());
    }

    #[test]
    fn cpw_gaps_flank_the_centerline() {
        let mut path = Path::new([0., 0.], 90.);
        path.straight(20.);
        let xs = CrossSection::new().add(6., 8., "gap").add(6., -8., "gap");
        let polys = path.extrude(&xs);
        let boxes: Vec<Rect> = polys.iter().filter_map(|(_, p)| p.bbox()).collect();
        // Heading up, "left" is -x.
        assert_eq!(boxes[0], Rect::from_sides(-11_000, 0, -5_000, 20_000));
        assert_eq!(boxes[1], Rect::from_sides(5_000, 0, 11_000, 20_000));
    }
}
