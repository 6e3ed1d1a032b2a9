use arcstr::ArcStr;
use gds21::{
    GdsBoundary, GdsElement, GdsLibrary, GdsPoint, GdsStrans, GdsStruct, GdsStructRef, GdsUnits,
};
use geometry::{
    point::Point,
    prelude::{Orientation, Polygon},
    rect::Rect,
};
use layir::{Cell, Instance, Layer, Library, Shape};

use crate::Result;

pub struct GdsExportOpts {
    /// Name of the GDS library.
    pub name: ArcStr,
    /// Defaults to a user unit of 1 um and a database unit of 1 nm.
    pub units: Option<GdsUnits>,
}

impl Default for GdsExportOpts {
    fn default() -> Self {
        Self {
            name: arcstr::literal!("LIB"),
            units: None,
        }
    }
}

/// Converts every cell of `lib` into a [`GdsStruct`], children first.
pub fn export_gds(lib: &Library<Layer>, opts: GdsExportOpts) -> Result<GdsLibrary> {
    let exporter = GdsExporter { opts, lib };
    exporter.export()
}

struct GdsExporter<'a> {
    opts: GdsExportOpts,
    lib: &'a Library<Layer>,
}

impl GdsExporter<'_> {
    fn export(self) -> Result<GdsLibrary> {
        let mut gds = GdsLibrary::new(self.opts.name.to_string());
        gds.units = self
            .opts
            .units
            .clone()
            .unwrap_or_else(|| GdsUnits::new(1e-3, 1e-9));
        for id in self.lib.topological_order() {
            let cell = self.lib.cell(id);
            let strukt = self.export_cell(cell)?;
            gds.structs.push(strukt);
        }
        tracing::debug!(structs = gds.structs.len(), "exported GDS library");
        Ok(gds)
    }

    fn export_cell(&self, cell: &Cell<Layer>) -> Result<GdsStruct> {
        let mut gcell = GdsStruct::new(cell.name().to_string());
        for shape in cell.shapes() {
            gcell.elems.push(export_shape(shape)?);
        }
        for (_, inst) in cell.instances() {
            gcell.elems.push(export_instance(self.lib, inst)?);
        }
        Ok(gcell)
    }
}

fn export_instance(lib: &Library<Layer>, inst: &Instance) -> Result<GdsElement> {
    let cell = lib.cell(inst.child());
    Ok(GdsStructRef {
        name: cell.name().to_string(),
        xy: export_point(inst.transformation().offset_point())?,
        strans: export_orientation(inst.transformation().orientation()),
        ..Default::default()
    }
    .into())
}

fn export_shape(shape: &Shape<Layer>) -> Result<GdsElement> {
    let xy = match shape.shape() {
        geometry::shape::Shape::Rect(rect) => export_rect(rect)?,
        geometry::shape::Shape::Polygon(poly) => export_polygon(poly)?,
    };
    Ok(GdsBoundary {
        layer: shape.layer().0.try_into()?,
        datatype: shape.layer().1.try_into()?,
        xy,
        ..Default::default()
    }
    .into())
}

fn export_point(p: Point) -> Result<GdsPoint> {
    let x = p.x.try_into()?;
    let y = p.y.try_into()?;
    Ok(GdsPoint::new(x, y))
}

/// GDS boundaries repeat their first point to close the loop.
fn export_polygon(poly: &Polygon) -> Result<Vec<GdsPoint>> {
    let mut points = poly
        .points()
        .iter()
        .copied()
        .map(export_point)
        .collect::<Result<Vec<_>>>()?;
    if let Some(first) = points.first().cloned() {
        points.push(first);
    }
    Ok(points)
}

fn export_rect(rect: &Rect) -> Result<Vec<GdsPoint>> {
    let bl = export_point(rect.lower_left())?;
    let br = export_point(rect.lower_right())?;
    let ur = export_point(rect.upper_right())?;
    let ul = export_point(rect.upper_left())?;
    Ok(vec![bl.clone(), br, ur, ul, bl])
}

fn export_orientation(orientation: Orientation) -> Option<GdsStrans> {
    if orientation == Orientation::identity() {
        return None;
    }
    let angle = orientation.angle();
    Some(GdsStrans {
        reflected: orientation.reflect_vert(),
        angle: (angle != 0.).then_some(angle),
        ..Default::default()
    })
}
