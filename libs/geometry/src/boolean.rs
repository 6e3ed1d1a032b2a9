//! Boolean operations on Manhattan geometry.

use crate::rect::Rect;
use crate::span::Span;

/// Subtracts the union of `cut` from the union of `base`.
///
/// Works by slab decomposition: the plane is cut into horizontal slabs at
/// every distinct y-coordinate, and each slab is reduced to x-intervals.
/// Vertically adjacent slabs with identical intervals are merged, so a plain
/// rectangle with a hole comes back as at most four rectangles.
///
/// The output rectangles do not overlap and have non-zero area.
///
/// ```
/// # use geometry::prelude::*;
/// # use geometry::boolean::subtract_rects;
/// let out = subtract_rects(
///     &[Rect::from_sides(0, 0, 100, 100)],
///     &[Rect::from_sides(-10, 40, 110, 60)],
/// );
/// assert_eq!(out, vec![Rect::from_sides(0, 0, 100, 40), Rect::from_sides(0, 60, 100, 100)]);
/// ```
pub fn subtract_rects(base: &[Rect], cut: &[Rect]) -> Vec<Rect> {
    let mut ys: Vec<i64> = base
        .iter()
        .chain(cut.iter())
        .flat_map(|r| [r.bot(), r.top()])
        .collect();
    ys.sort_unstable();
    ys.dedup();

    let mut out: Vec<Rect> = Vec::new();
    // Rectangles still open at the top of the previous slab.
    let mut open: Vec<Rect> = Vec::new();

    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        let slab = Span::new(y0, y1);
        let covers = |r: &&Rect| r.bot() <= y0 && r.top() >= y1 && r.height() > 0;

        let keep = merge_intervals(base.iter().filter(covers).map(Rect::hspan));
        let remove = merge_intervals(cut.iter().filter(covers).map(Rect::hspan));
        let intervals = difference(&keep, &remove);

        let mut next_open = Vec::with_capacity(intervals.len());
        for span in intervals {
            if let Some(pos) = open
                .iter()
                .position(|r| r.hspan() == span && r.top() == y0)
            {
                let r = open.swap_remove(pos);
                next_open.push(Rect::from_spans(span, r.vspan().union(slab)));
            } else {
                next_open.push(Rect::from_spans(span, slab));
            }
        }
        out.append(&mut open);
        open = next_open;
    }
    out.append(&mut open);
    out.sort();
    out
}

/// Sorts and merges overlapping or touching intervals.
fn merge_intervals(spans: impl Iterator<Item = Span>) -> Vec<Span> {
    let mut spans: Vec<Span> = spans.filter(|s| s.length() > 0).collect();
    spans.sort();
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for s in spans {
        match merged.last_mut() {
            Some(last) if s.start() <= last.stop() => *last = last.union(s),
            _ => merged.push(s),
        }
    }
    merged
}

/// Removes sorted disjoint `remove` intervals from sorted disjoint `keep` intervals.
fn difference(keep: &[Span], remove: &[Span]) -> Vec<Span> {
    let mut out = Vec::new();
    for k in keep {
        let mut start = k.start();
        for r in remove {
            if r.stop() <= start || r.start() >= k.stop() {
                continue;
            }
            if r.start() > start {
                out.push(Span::new(start, r.start()));
            }
            start = start.max(r.stop());
        }
        if start < k.stop() {
            out.push(Span::new(start, k.stop()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_in_rect_leaves_four_pieces() {
        let out = subtract_rects(
            &[Rect::from_sides(0, 0, 100, 100)],
            &[Rect::from_sides(20, 20, 80, 80)],
        );
        assert_eq!(
            out,
            vec![
                Rect::from_sides(0, 0, 100, 20),
                Rect::from_sides(0, 20, 20, 80),
                Rect::from_sides(0, 80, 100, 100),
                Rect::from_sides(80, 20, 100, 80),
            ]
        );
        let area: i64 = out.iter().map(Rect::area).sum();
        assert_eq!(area, 100 * 100 - 60 * 60);
    }

    #[test]
    fn disjoint_cut_is_noop() {
        let base = [Rect::from_sides(0, 0, 10, 10)];
        let out = subtract_rects(&base, &[Rect::from_sides(20, 20, 30, 30)]);
        assert_eq!(out, base.to_vec());
    }

    #[test]
    fn full_cover_removes_everything() {
        let out = subtract_rects(
            &[Rect::from_sides(0, 0, 10, 10), Rect::from_sides(5, 5, 15, 15)],
            &[Rect::from_sides(-1, -1, 20, 20)],
        );
        assert!(out.is_empty());
    }
}
