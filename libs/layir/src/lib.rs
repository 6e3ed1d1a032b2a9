//! Layout intermediate representation for photomask devices.
//!
//! Devices are assembled as a tree of [`Device`]s sharing children through
//! [`Arc`](std::sync::Arc). For export, a tree is flattened into a [`Library`]
//! of uniquely named [`Cell`]s in which each distinct device appears once.

pub mod device;
pub mod error;
pub mod id;
pub mod names;
pub mod place;
pub mod port;


use std::{
    collections::{HashMap, VecDeque},
    ops::Deref,
    sync::Arc,
};

use crate::id::Id;
use arcstr::ArcStr;
use geometry::prelude::Transformation;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub use device::Device;
pub use error::{Error, Result};
pub use names::Names;
pub use place::Place;
pub use port::Port;

/// A GDS layer and datatype pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Layer(pub u16, pub u16);

impl Layer {
    /// A layer with datatype 0.
    pub const fn new(layer: u16) -> Self {
        Self(layer, 0)
    }
}

pub struct Cells;

// The reason this uses [`Cells`] instead of [`Cell`]
// is because `Cell` has a generic type parameter.
pub type CellId = Id<Cells>;
pub type InstanceId = Id<Instance>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryBuilder<L> {
    cell_id: CellId,
    cells: IndexMap<CellId, Cell<L>>,
    name_map: HashMap<ArcStr, CellId>,
    #[serde(skip)]
    names: Names<CellId>,
}

pub struct Library<L>(LibraryBuilder<L>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell<L> {
    name: ArcStr,
    instance_id: InstanceId,
    instances: IndexMap<InstanceId, Instance>,
    shapes: Vec<Shape<L>>,
    ports: IndexMap<ArcStr, Port>,
}

/// A primitive layout shape consisting of a layer and a geometric shape.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Shape<L> {
    layer: L,
    shape: geometry::shape::Shape,
}

/// A placement of one cell inside another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    child: CellId,
    name: ArcStr,
    trans: Transformation,
}

impl<L> Default for LibraryBuilder<L> {
    fn default() -> Self {
        Self {
            cell_id: Id::new(),
            names: Default::default(),
            name_map: Default::default(),
            cells: Default::default(),
        }
    }
}

impl<L> LibraryBuilder<L> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a cell, renaming it if its name is already taken.
    pub fn add_cell(&mut self, mut cell: Cell<L>) -> CellId {
        let id = self.cell_id.alloc();
        cell.name = self.names.assign_name(id, &cell.name);
        self.name_map.insert(cell.name.clone(), id);
        self.cells.insert(id, cell);
        id
    }

    /// Gets the cell with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cell has the given ID.
    pub fn cell(&self, id: CellId) -> &Cell<L> {
        self.cells.get(&id).unwrap()
    }

    pub fn try_cell(&self, id: CellId) -> Option<&Cell<L>> {
        self.cells.get(&id)
    }

    pub(crate) fn try_cell_mut(&mut self, id: CellId) -> Option<&mut Cell<L>> {
        self.cells.get_mut(&id)
    }

    pub fn try_cell_named(&self, name: &str) -> Option<&Cell<L>> {
        self.try_cell(*self.name_map.get(name)?)
    }

    /// Iterates over the `(id, cell)` pairs in this library.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell<L>)> {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    /// The number of cells in the library.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the library has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns cell IDs in topological order.
    ///
    /// Every cell appears after all of the cells it instantiates.
    pub fn topological_order(&self) -> Vec<CellId> {
        let mut state = IndexSet::new();
        for (cell, _) in self.cells() {
            self.dfs_postorder(cell, &mut state);
        }
        state.into_iter().collect::<Vec<_>>()
    }

    fn dfs_postorder(&self, id: CellId, state: &mut IndexSet<CellId>) {
        if state.contains(&id) {
            return;
        }

        let cell = self.cell(id);
        for (_, inst) in cell.instances() {
            self.dfs_postorder(inst.child(), state);
        }
        state.insert(id);
    }

    pub fn build(self) -> Library<L> {
        Library(self)
    }
}

impl<L> Deref for Library<L> {
    type Target = LibraryBuilder<L>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Library<Layer> {
    /// Flattens a device tree into a library of uniquely named cells.
    ///
    /// Devices shared through the same [`Arc`] become a single cell. Cells
    /// are named in breadth-first order from the top, so the top cell always
    /// keeps its own name and duplicates further down become `name_1`,
    /// `name_2`, and so on.
    pub fn from_top(top: &Arc<Device>) -> Self {
        let mut order: Vec<&Arc<Device>> = Vec::new();
        let mut index: HashMap<*const Device, usize> = HashMap::new();
        let mut queue = VecDeque::from([top]);
        while let Some(dev) = queue.pop_front() {
            let key = Arc::as_ptr(dev);
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key, order.len());
            order.push(dev);
            for inst in dev.instances() {
                queue.push_back(inst.child());
            }
        }

        let mut lib = LibraryBuilder::new();
        let ids: Vec<CellId> = order
            .iter()
            .map(|dev| {
                let mut cell = Cell::new(dev.name().clone());
                for shape in dev.shapes() {
                    cell.add_shape(shape.clone());
                }
                for (name, port) in dev.ports() {
                    cell.add_port(name.clone(), *port);
                }
                lib.add_cell(cell)
            })
            .collect();

        for (dev, &id) in order.iter().zip(ids.iter()) {
            let instances: Vec<Instance> = dev
                .instances()
                .iter()
                .map(|inst| {
                    let child = ids[index[&Arc::as_ptr(inst.child())]];
                    Instance::with_transformation(child, inst.name().clone(), inst.transformation())
                })
                .collect();
            if let Some(cell) = lib.try_cell_mut(id) {
                for inst in instances {
                    cell.add_instance(inst);
                }
            }
        }

        tracing::debug!(cells = lib.len(), top = %top.name(), "flattened device tree");
        lib.build()
    }
}

impl<L> Cell<L> {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            instance_id: Id::new(),
            instances: Default::default(),
            shapes: Default::default(),
            ports: Default::default(),
        }
    }

    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Iterate over the ports of this cell.
    #[inline]
    pub fn ports(&self) -> impl Iterator<Item = (&ArcStr, &Port)> {
        self.ports.iter()
    }

    pub fn add_port(&mut self, name: impl Into<ArcStr>, port: Port) {
        self.ports.insert(name.into(), port);
    }

    /// Get a port of this cell by name.
    #[inline]
    pub fn try_port(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    /// Add the given instance to the cell.
    #[inline]
    pub fn add_instance(&mut self, instance: Instance) -> InstanceId {
        let id = self.instance_id.alloc();
        self.instances.insert(id, instance);
        id
    }

    /// Iterate over the instances of this cell.
    #[inline]
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances.iter().map(|x| (*x.0, x.1))
    }

    pub fn add_shape(&mut self, shape: Shape<L>) {
        self.shapes.push(shape)
    }

    /// Iterate over the shapes drawn directly in this cell.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape<L>> {
        self.shapes.iter()
    }
}

impl<L> Shape<L> {
    #[inline]
    pub fn new(layer: L, shape: impl Into<geometry::shape::Shape>) -> Self {
        Self {
            layer,
            shape: shape.into(),
        }
    }

    #[inline]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    #[inline]
    pub fn shape(&self) -> &geometry::shape::Shape {
        &self.shape
    }

    /// Returns a copy of this shape on a different layer.
    pub fn with_layer<M>(&self, layer: M) -> Shape<M> {
        Shape {
            layer,
            shape: self.shape.clone(),
        }
    }
}

impl<L> geometry::bbox::Bbox for Shape<L> {
    fn bbox(&self) -> Option<geometry::rect::Rect> {
        self.shape.bbox()
    }
}

impl<L> geometry::transform::TranslateMut for Shape<L> {
    fn translate_mut(&mut self, p: geometry::point::Point) {
        self.shape.translate_mut(p)
    }
}

impl<L> geometry::transform::TransformMut for Shape<L> {
    fn transform_mut(&mut self, trans: Transformation) {
        self.shape.transform_mut(trans)
    }
}

impl Instance {
    pub fn with_transformation(
        child: CellId,
        name: impl Into<ArcStr>,
        transformation: impl Into<Transformation>,
    ) -> Self {
        Self {
            child,
            name: name.into(),
            trans: transformation.into(),
        }
    }

    #[inline]
    pub fn child(&self) -> CellId {
        self.child
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn transformation(&self) -> Transformation {
        self.trans
    }
}
