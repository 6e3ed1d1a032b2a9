use std::sync::Arc;

use geometry::boolean::subtract_rects;
use geometry::prelude::*;
use geometry::units::um_point;
use layir::{Device, Place};

use super::layers;
use super::primitives::{bbox_rect, copy_layer, polygon, rectangle};

const TEST_AREAS: [[f64; 2]; 4] = [
    [-1743.5, -1231.413],
    [-1743.5, -1881.408],
    [-1093.5, -1231.413],
    [-1093.5, -1881.408],
];

/// Shifts the test structure sites to make room for a DC line.
fn dc_line_shift(dc_line: bool) -> [f64; 2] {
    if dc_line {
        [250., 50.]
    } else {
        [0., 0.]
    }
}

fn test_point() -> Device {
    const BOX_WIDTH: f64 = 279.;
    const BOX_LENGTH: f64 = 135.;
    const BOX_GAP: f64 = 27.;
    const STUB_WIDTH: f64 = 18.;
    const STUB_LENGTH: f64 = 68.4;
    const STUB_GAP: f64 = 18.;
    const STUB_GAP_LENGTH: f64 = 14.4;

    let inner = bbox_rect([-0.5 * BOX_WIDTH, -BOX_LENGTH], [0.5 * BOX_WIDTH, 0.]);
    let ring = Ring::from_inner(inner, um(BOX_GAP));
    let stub = bbox_rect([-0.5 * STUB_WIDTH, 0.], [0.5 * STUB_WIDTH, STUB_LENGTH]);

    let mut tp = Device::new("TestPoint");
    tp.add_shapes(layers::ETCH, subtract_rects(&ring.rects(), &[stub]));
    // A U-shaped gap around the stub, open towards the box.
    let (w, g) = (0.5 * STUB_WIDTH, 0.5 * STUB_WIDTH + STUB_GAP);
    tp.add_polygon(
        layers::ETCH,
        polygon([
            [-g, BOX_GAP],
            [-g, STUB_LENGTH + STUB_GAP_LENGTH],
            [g, STUB_LENGTH + STUB_GAP_LENGTH],
            [g, BOX_GAP],
            [w, BOX_GAP],
            [w, STUB_LENGTH],
            [-w, STUB_LENGTH],
            [-w, BOX_GAP],
        ]),
    );
    tp
}

/// Probe pads etched into the ground plane in the lower-left chip quadrant.
pub fn test_areas(dc_line: bool) -> Device {
    const BOX_WIDTH: f64 = 279.;
    const BOX_LENGTH: f64 = 135.;
    const BOX_GAP: f64 = 27.;

    let tp = Arc::new(test_point());
    let [dx, dy] = dc_line_shift(dc_line);
    let mut tps = Device::new("TestPoints");
    for [x, y] in TEST_AREAS {
        let (x, y) = (x + dx, y + dy);
        tps.add_ref(tp.clone())
            .set_xmin(um(x - 0.5 * BOX_WIDTH - BOX_GAP))
            .set_ymin(um(y - 0.5 * BOX_LENGTH - BOX_GAP));
    }
    tps
}

/// Square junction-layer test boxes next to the test areas.
pub fn test_boxes(dc_line: bool) -> Device {
    let mut finger = Device::new("TestBox_finger");
    finger.add_rect(layers::FINGER, rectangle(45., 45.));
    let undercut = copy_layer(&finger, layers::FINGER, layers::BOX);

    let mut tbx = Device::new("TestBox");
    tbx.add_ref(Arc::new(finger));
    tbx.add_ref(Arc::new(undercut));
    let tbx = Arc::new(tbx);

    let [dx, dy] = dc_line_shift(dc_line);
    let mut boxes = Device::new("TestBoxes");
    let sites = TEST_AREAS
        .iter()
        .map(|&[x, _]| [x, -1550.])
        .chain(TEST_AREAS);
    for [x, y] in sites {
        boxes
            .add_ref(tbx.clone())
            .set_center(um_point(x + dx, y + dy));
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_bbox_includes_stub_gap() {
        let tp = test_point();
        assert_eq!(
            tp.bbox(),
            Some(Rect::from_sides(-166_500, -162_000, 166_500, 82_800))
        );
    }

    #[test]
    fn test_areas_follow_dc_line_shift() {
        let plain = test_areas(false);
        let shifted = test_areas(true);
        let a = plain.instances()[0].bbox().unwrap();
        let b = shifted.instances()[0].bbox().unwrap();
        assert_eq!(b.left() - a.left(), 250_000);
        assert_eq!(b.bot() - a.bot(), 50_000);
        assert_eq!(a.left(), um(-1743.5 - 139.5 - 27.));
    }

    #[test]
    fn test_boxes_have_both_layers() {
        let boxes = test_boxes(false);
        assert_eq!(boxes.instances().len(), 6);
        let layers_present = boxes
            .flatten_shapes()
            .iter()
            .map(|s| *s.layer())
            .collect::<std::collections::HashSet<_>>();
        assert!(layers_present.contains(&layers::FINGER));
        assert!(layers_present.contains(&layers::BOX));
    }
}
