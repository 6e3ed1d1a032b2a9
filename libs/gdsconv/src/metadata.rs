//! Port metadata for downstream tools.
//!
//! Every device in the tree that has ports gets an entry keyed by its
//! instance path from the top (for example `chip/resonator_1`). Ports are
//! reported in top-level coordinates, with lengths in micrometres and
//! orientations in degrees.

use std::{fs, path::Path, sync::Arc};

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;
use layir::{Device, Names, Port};
use serde::{Deserialize, Serialize};

use crate::{create_parent_dirs, Result};

/// A port in top-level coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub midpoint: [f64; 2],
    pub width: f64,
    pub orientation: f64,
}

impl From<Port> for PortRecord {
    fn from(port: Port) -> Self {
        Self {
            midpoint: [to_um(port.midpoint.x), to_um(port.midpoint.y)],
            width: to_um(port.width),
            orientation: port.orientation,
        }
    }
}

/// Ports of every device in a tree, keyed by unique device path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMetadata {
    pub devices: IndexMap<ArcStr, IndexMap<ArcStr, PortRecord>>,
}

impl PortMetadata {
    /// Collects port metadata from the tree rooted at `top`.
    pub fn collect(top: &Device) -> Self {
        let mut collector = Collector {
            names: Names::new(),
            next: 0,
            out: Self::default(),
        };
        collector.visit(top, top.name(), Transformation::identity());
        collector.out
    }

    /// Ports of the device at `path`.
    pub fn device(&self, path: &str) -> Option<&IndexMap<ArcStr, PortRecord>> {
        self.devices.get(path)
    }
}

struct Collector {
    names: Names<usize>,
    next: usize,
    out: PortMetadata,
}

impl Collector {
    fn visit(&mut self, dev: &Device, path: &str, trans: Transformation) {
        let key = self.next;
        self.next += 1;
        let path = self.names.assign_name(key, path);

        if !dev.ports().is_empty() {
            let ports = dev
                .ports()
                .iter()
                .map(|(name, port)| (name.clone(), PortRecord::from(port.transform(trans))))
                .collect();
            self.out.devices.insert(path.clone(), ports);
        }

        for inst in dev.instances() {
            let child_path = format!("{}/{}", path, inst.name());
            let child_trans = Transformation::cascade(trans, inst.transformation());
            self.visit(inst.child(), &child_path, child_trans);
        }
    }
}

/// Writes port metadata for `top` to `path` as YAML.
pub fn write_metadata(top: &Arc<Device>, path: impl AsRef<Path>) -> Result<PortMetadata> {
    let path = path.as_ref();
    let metadata = PortMetadata::collect(top);
    let yaml = serde_yaml::to_string(&metadata)?;
    create_parent_dirs(path)?;
    fs::write(path, yaml)?;
    tracing::info!(path = %path.display(), devices = metadata.devices.len(), "wrote port metadata");
    Ok(metadata)
}
