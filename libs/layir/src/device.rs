//! Hierarchical device construction.

use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    Layer, Port,
};

/// A shape on a GDS layer.
pub type LayerShape = crate::Shape<Layer>;

/// A named collection of shapes, child instances, and ports.
///
/// Devices are built up mutably and then frozen into an [`Arc`] so that they
/// can be instantiated any number of times without copying their contents.
#[derive(Debug, Clone, Default)]
pub struct Device {
    name: ArcStr,
    shapes: Vec<LayerShape>,
    instances: Vec<Instance>,
    ports: IndexMap<ArcStr, Port>,
}

/// A placement of a shared [`Device`] inside another device.
#[derive(Debug, Clone)]
pub struct Instance {
    child: Arc<Device>,
    name: ArcStr,
    trans: Transformation,
}

impl Device {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    pub fn add_shape(&mut self, layer: Layer, shape: impl Into<geometry::shape::Shape>) {
        self.shapes.push(LayerShape::new(layer, shape));
    }

    /// Adds a rectangle, skipping it if it has zero area.
    pub fn add_rect(&mut self, layer: Layer, rect: Rect) {
        if rect.area() > 0 {
            self.add_shape(layer, rect);
        }
    }

    /// Adds a polygon, skipping it if it has fewer than three vertices.
    pub fn add_polygon(&mut self, layer: Layer, polygon: Polygon) {
        if polygon.points().len() >= 3 {
            self.add_shape(layer, polygon);
        }
    }

    /// Adds every shape in `shapes` on the given layer.
    pub fn add_shapes<S: Into<geometry::shape::Shape>>(
        &mut self,
        layer: Layer,
        shapes: impl IntoIterator<Item = S>,
    ) {
        for shape in shapes {
            self.add_shape(layer, shape);
        }
    }

    /// Instantiates `child` at the origin, returning the new instance for
    /// further placement.
    pub fn add_ref(&mut self, child: Arc<Device>) -> &mut Instance {
        let name = child.name().clone();
        let idx = self.instances.len();
        self.instances.push(Instance::new(child, name));
        &mut self.instances[idx]
    }

    /// Adds a port, replacing any existing port with the same name.
    pub fn add_port(&mut self, name: impl Into<ArcStr>, port: Port) {
        let name = name.into();
        if self.ports.insert(name.clone(), port).is_some() {
            tracing::debug!(device = %self.name, port = %name, "replaced existing port");
        }
    }

    pub fn try_port(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    pub fn port(&self, name: &str) -> Result<&Port> {
        self.try_port(name).ok_or_else(|| Error::MissingPort {
            device: self.name.clone(),
            port: name.into(),
        })
    }

    #[inline]
    pub fn ports(&self) -> &IndexMap<ArcStr, Port> {
        &self.ports
    }

    #[inline]
    pub fn shapes(&self) -> &[LayerShape] {
        &self.shapes
    }

    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[inline]
    pub fn instances_mut(&mut self) -> &mut [Instance] {
        &mut self.instances
    }

    /// Collects every shape in the hierarchy, expressed in this device's
    /// coordinates.
    pub fn flatten_shapes(&self) -> Vec<LayerShape> {
        let mut out = self.shapes.clone();
        for inst in &self.instances {
            out.extend(inst.flatten_shapes());
        }
        out
    }

    /// Duplicates this device's own shapes on layer `from` onto layer `to`.
    ///
    /// Shapes inside child instances are not copied.
    pub fn copy_layer(&mut self, from: Layer, to: Layer) {
        let copies = self
            .shapes
            .iter()
            .filter(|s| *s.layer() == from)
            .map(|s| s.with_layer(to))
            .collect::<Vec<_>>();
        self.shapes.extend(copies);
    }

    /// Rotates the device counterclockwise about the origin.
    pub fn rotate(&mut self, angle: f64) {
        self.transform_mut(Transformation::rotate(angle));
    }

    pub fn rotate_about(&mut self, angle: f64, center: Point) {
        self.transform_mut(Transformation::rotate_about(angle, center));
    }

    /// Reflects the device across the line through `p1` and `p2`.
    ///
    /// Fails with [`Error::DegenerateMirror`] if `p1 == p2`.
    pub fn mirror(&mut self, p1: Point, p2: Point) -> Result<()> {
        self.transform_mut(mirror_line(p1, p2)?);
        Ok(())
    }
}

fn mirror_line(p1: Point, p2: Point) -> Result<Transformation> {
    Transformation::mirror(p1, p2).ok_or(Error::DegenerateMirror { x: p1.x, y: p1.y })
}

impl TranslateMut for Device {
    fn translate_mut(&mut self, p: Point) {
        self.shapes.translate_mut(p);
        self.instances.translate_mut(p);
        for port in self.ports.values_mut() {
            port.translate_mut(p);
        }
    }
}

impl TransformMut for Device {
    fn transform_mut(&mut self, trans: Transformation) {
        self.shapes.transform_mut(trans);
        self.instances.transform_mut(trans);
        for port in self.ports.values_mut() {
            port.transform_mut(trans);
        }
    }
}

impl Bbox for Device {
    fn bbox(&self) -> Option<Rect> {
        self.shapes.bbox().bounding_union(&self.instances.bbox())
    }
}

impl Instance {
    pub fn new(child: Arc<Device>, name: impl Into<ArcStr>) -> Self {
        Self {
            child,
            name: name.into(),
            trans: Transformation::identity(),
        }
    }

    #[inline]
    pub fn child(&self) -> &Arc<Device> {
        &self.child
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<ArcStr>) -> &mut Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn transformation(&self) -> Transformation {
        self.trans
    }

    pub fn set_transformation(&mut self, trans: Transformation) -> &mut Self {
        self.trans = trans;
        self
    }

    /// The named port of the child, in the parent's coordinates.
    pub fn port(&self, name: &str) -> Result<Port> {
        Ok(self.child.port(name)?.transform(self.trans))
    }

    /// All ports of the child, in the parent's coordinates.
    pub fn ports(&self) -> impl Iterator<Item = (&ArcStr, Port)> {
        self.child
            .ports()
            .iter()
            .map(|(name, port)| (name, port.transform(self.trans)))
    }

    /// Moves this instance so that its port `port` meets `dest` head on.
    ///
    /// After connecting, the port sits on `dest.midpoint` facing the
    /// opposite direction from `dest`.
    pub fn connect(&mut self, port: &str, dest: &Port) -> Result<&mut Self> {
        let current = self.port(port)?;
        let angle = dest.orientation + 180. - current.orientation;
        self.trans = Transformation::cascade(
            Transformation::rotate_about(angle, current.midpoint),
            self.trans,
        );
        let moved = self.port(port)?;
        self.translate_mut(dest.midpoint - moved.midpoint);
        Ok(self)
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.transform_mut(Transformation::rotate(angle));
        self
    }

    pub fn mirror(&mut self, p1: Point, p2: Point) -> Result<&mut Self> {
        self.transform_mut(mirror_line(p1, p2)?);
        Ok(self)
    }

    /// The child's shapes, in the parent's coordinates.
    pub fn flatten_shapes(&self) -> Vec<LayerShape> {
        self.child.flatten_shapes().transform(self.trans)
    }
}

impl TranslateMut for Instance {
    fn translate_mut(&mut self, p: Point) {
        self.trans = Transformation::cascade(Transformation::translate(p.x, p.y), self.trans);
    }
}

impl TransformMut for Instance {
    fn transform_mut(&mut self, trans: Transformation) {
        self.trans = Transformation::cascade(trans, self.trans);
    }
}

impl Bbox for Instance {
    fn bbox(&self) -> Option<Rect> {
        if self.trans.is_manhattan() {
            self.child.bbox().map(|rect| rect.transform(self.trans))
        } else {
            self.flatten_shapes().bbox()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use geometry::prelude::*;

    use super::Device;
    use crate::{Error, Layer, Port};

    const METAL: Layer = Layer(0, 0);

    fn stub() -> Arc<Device> {
        let mut dev = Device::new("stub");
        dev.add_rect(METAL, Rect::from_sides(0, -5, 100, 5));
        dev.add_port("in", Port::new(Point::new(0, 0), 10, 180.));
        dev.add_port("out", Port::new(Point::new(100, 0), 10, 0.));
        Arc::new(dev)
    }

    #[test]
    fn connect_aligns_ports_head_on() {
        let mut top = Device::new("top");
        let dest = Port::new(Point::new(500, 300), 10, 90.);
        let inst = top.add_ref(stub());
        inst.connect("in", &dest).unwrap();

        let port = inst.port("in").unwrap();
        assert_eq!(port.midpoint, dest.midpoint);
        assert_relative_eq!(port.orientation, 270.);
        let out = inst.port("out").unwrap();
        assert_eq!(out.midpoint, Point::new(500, 400));
        assert_eq!(top.bbox(), Some(Rect::from_sides(495, 300, 505, 400)));
    }

    #[test]
    fn missing_port_is_an_error() {
        let dev = stub();
        let err = dev.port("nope").unwrap_err();
        assert!(matches!(err, Error::MissingPort { ref port, .. } if port == "nope"));
    }

    #[test]
    fn translate_moves_shapes_instances_and_ports() {
        let mut top = Device::new("top");
        top.add_rect(METAL, Rect::from_sides(0, 0, 10, 10));
        top.add_ref(stub());
        top.add_port("p", Port::new(Point::new(0, 0), 1, 0.));
        top.translate_mut(Point::new(7, 3));

        assert_eq!(top.bbox(), Some(Rect::from_sides(7, -2, 107, 13)));
        assert_eq!(top.instances()[0].port("out").unwrap().midpoint, Point::new(107, 3));
        assert_eq!(top.port("p").unwrap().midpoint, Point::new(7, 3));
    }

    #[test]
    fn rotated_instance_bbox_follows_shapes() {
        let mut top = Device::new("top");
        top.add_ref(stub()).rotate(45.);
        let bbox = top.bbox().unwrap();
        assert_eq!(bbox.left(), -4);
        assert_eq!(bbox.right(), 74);
    }

    #[test]
    fn copy_layer_duplicates_own_shapes() {
        let mut dev = Device::new("box");
        dev.add_rect(Layer(1, 0), Rect::from_sides(0, 0, 5, 5));
        dev.add_rect(METAL, Rect::from_sides(0, 0, 1, 1));
        dev.copy_layer(Layer(1, 0), Layer(2, 0));
        assert_eq!(dev.shapes().len(), 3);
        assert_eq!(*dev.shapes()[2].layer(), Layer(2, 0));
    }

    #[test]
    fn flatten_collects_child_shapes() {
        let mut top = Device::new("top");
        top.add_ref(stub()).translate_mut(Point::new(0, 100));
        let shapes = top.flatten_shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].bbox(), Some(Rect::from_sides(0, 95, 100, 105)));
    }
}
