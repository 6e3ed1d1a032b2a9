use std::sync::Arc;

use approx::assert_relative_eq;
use gds21::{GdsElement, GdsLibrary};
use geometry::prelude::*;
use layir::{Device, Layer, Library, Port};
use test_log::test;

use crate::{
    export::{export_gds, GdsExportOpts},
    metadata::{write_metadata, PortMetadata},
    write_gds, GdsExportError,
};

fn stub() -> Arc<Device> {
    let mut dev = Device::new("stub");
    dev.add_rect(Layer(1, 0), Rect::from_sides(0, 0, 100, 100));
    dev.add_port("out", Port::new(Point::new(100, 50), 20, 0.));
    Arc::new(dev)
}

fn chip() -> Arc<Device> {
    let bot = stub();
    let mut mid = Device::new("mid");
    mid.add_rect(Layer(2, 0), Rect::from_sides(100, 0, 200, 100));
    mid.add_ref(bot.clone());
    let mid = Arc::new(mid);

    let mut top = Device::new("top");
    top.add_polygon(
        Layer(4, 0),
        Polygon::from_verts(vec![
            Point::new(0, 0),
            Point::new(200, 0),
            Point::new(0, 200),
        ]),
    );
    top.add_ref(mid.clone()).translate_mut(Point::new(0, 1000));
    top.add_ref(mid).rotate(90.);
    top.add_ref(bot)
        .mirror(Point::new(0, 0), Point::new(0, 1))
        .unwrap();
    Arc::new(top)
}

#[test]
fn export_orders_children_first() {
    let lib = Library::from_top(&chip());
    let gds = export_gds(&lib, GdsExportOpts::default()).unwrap();

    assert_eq!(gds.structs.len(), 3);
    assert_eq!(gds.structs[0].name, "stub");
    assert_eq!(gds.structs[1].name, "mid");
    assert_eq!(gds.structs[2].name, "top");
    assert_eq!(gds.structs[0].elems.len(), 1);
    assert_eq!(gds.structs[1].elems.len(), 2);
    assert_eq!(gds.structs[2].elems.len(), 4);
}

#[test]
fn boundaries_are_closed_and_refs_carry_strans() {
    let lib = Library::from_top(&chip());
    let gds = export_gds(&lib, GdsExportOpts::default()).unwrap();
    let top = &gds.structs[2];

    match &top.elems[0] {
        GdsElement::GdsBoundary(b) => {
            assert_eq!(b.layer, 4);
            assert_eq!(b.xy.len(), 4);
            assert_eq!(b.xy.first(), b.xy.last());
        }
        other => panic!("expected a boundary, got {other:?}"),
    }
    let refs = top
        .elems
        .iter()
        .filter_map(|e| match e {
            GdsElement::GdsStructRef(r) => Some(r),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(refs.len(), 3);
    assert!(refs[0].strans.is_none());
    assert_eq!(refs[0].xy.y, 1000);
    let rotated = refs[1].strans.as_ref().unwrap();
    assert!(!rotated.reflected);
    assert_relative_eq!(rotated.angle.unwrap(), 90.);
    let mirrored = refs[2].strans.as_ref().unwrap();
    assert!(mirrored.reflected);
    assert_relative_eq!(mirrored.angle.unwrap(), 180.);
}

#[test]
fn out_of_range_coordinates_fail() {
    let mut dev = Device::new("huge");
    dev.add_rect(Layer(0, 0), Rect::from_sides(0, 0, 1 << 40, 10));
    let lib = Library::from_top(&Arc::new(dev));
    let err = export_gds(&lib, GdsExportOpts::default()).unwrap_err();
    assert!(matches!(err, GdsExportError::TryFromInt(_)));
}

#[test]
fn write_gds_creates_directories_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out/mask.gds");
    write_gds(&chip(), &path, GdsExportOpts::default()).unwrap();

    let gds = GdsLibrary::load(&path).unwrap();
    let names = gds.structs.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
    assert_eq!(names, vec!["stub", "mid", "top"]);
}

#[test]
fn metadata_reports_ports_in_top_coordinates() {
    let meta = PortMetadata::collect(&chip());

    let shifted = meta.device("top/mid/stub").unwrap();
    assert_relative_eq!(shifted["out"].midpoint[0], 0.1);
    assert_relative_eq!(shifted["out"].midpoint[1], 1.05);
    assert_relative_eq!(shifted["out"].width, 0.02);

    let rotated = meta.device("top/mid_1/stub").unwrap();
    assert_relative_eq!(rotated["out"].midpoint[0], -0.05);
    assert_relative_eq!(rotated["out"].midpoint[1], 0.1);
    assert_relative_eq!(rotated["out"].orientation, 90.);

    let mirrored = meta.device("top/stub").unwrap();
    assert_relative_eq!(mirrored["out"].midpoint[0], -0.1);
    assert_relative_eq!(mirrored["out"].orientation, 180.);
}

#[test]
fn metadata_is_written_as_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta/ports.yaml");
    let written = write_metadata(&chip(), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: PortMetadata = serde_yaml::from_str(&text).unwrap();
    assert_eq!(parsed, written);
    assert_eq!(parsed.devices.len(), 3);
}
