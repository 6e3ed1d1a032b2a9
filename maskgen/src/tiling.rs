//! Grid tiling of chip devices.

use std::sync::Arc;

use geometry::prelude::*;
use layir::{Device, Place};

/// Extra space between adjacent grid slots, in database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSpacing {
    /// Added after every column.
    pub x: i64,
    /// Added after every row.
    pub y: i64,
}

impl GridSpacing {
    /// Spacing of `x` between columns and `y` between rows.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A constraint on a grid row or column.
#[derive(Debug, Clone, Copy)]
struct GridConstraint {
    /// The constraining row/column index.
    start_index: usize,
    /// The constrained row/column index.
    end_index: usize,
    /// The required minimum distance between the rows/columns.
    distance: i64,
}

#[derive(Debug, Clone, Default)]
struct GridConstraintSolver {
    constraints: Vec<GridConstraint>,
}

impl GridConstraintSolver {
    fn add(&mut self, start_index: usize, end_index: usize, distance: i64) {
        self.constraints.push(GridConstraint {
            start_index,
            end_index,
            distance,
        });
    }

    /// Returns the position of every grid line, starting at 0.
    fn solve(mut self, lines: usize) -> Vec<i64> {
        self.constraints.sort_by_key(|c| c.end_index);
        let mut grids = vec![0; lines];
        for c in self.constraints {
            grids[c.end_index] = grids[c.end_index].max(grids[c.start_index] + c.distance);
        }
        grids
    }
}

/// Lays out devices in rows, left to right and top to bottom.
///
/// Every column is as wide as its widest device and every row as tall as
/// its tallest; devices are centered in their slots. Empty slots take up no
/// space beyond the spacing.
#[derive(Debug, Clone)]
pub struct GridTiler {
    name: arcstr::ArcStr,
    spacing: GridSpacing,
    grid: Vec<Vec<Option<Arc<Device>>>>,
}

impl GridTiler {
    /// An empty tiler whose output device is called `name`.
    pub fn new(name: impl Into<arcstr::ArcStr>, spacing: GridSpacing) -> Self {
        Self {
            name: name.into(),
            spacing,
            grid: vec![vec![]],
        }
    }

    /// Appends `device` to the current row.
    pub fn push(&mut self, device: Arc<Device>) {
        self.last_row_mut().push(Some(device));
    }

    /// Appends an empty slot to the current row.
    pub fn push_empty(&mut self) {
        self.last_row_mut().push(None);
    }

    fn last_row_mut(&mut self) -> &mut Vec<Option<Arc<Device>>> {
        if self.grid.is_empty() {
            self.grid.push(Vec::new());
        }
        let last = self.grid.len() - 1;
        &mut self.grid[last]
    }

    /// Ends a row of the tiler, starting a new one.
    pub fn end_row(&mut self) {
        self.grid.push(Vec::new());
    }

    /// Places every device and recenters the grid on the origin.
    pub fn tile(mut self) -> Device {
        if self.grid.last().is_some_and(|row| row.is_empty()) {
            self.grid.pop();
        }
        let rows = self.grid.len();
        let cols = self.grid.iter().map(Vec::len).max().unwrap_or(0);

        let mut row_constraints = GridConstraintSolver::default();
        let mut col_constraints = GridConstraintSolver::default();
        for i in 0..rows {
            row_constraints.add(i, i + 1, self.spacing.y);
        }
        for j in 0..cols {
            col_constraints.add(j, j + 1, self.spacing.x);
        }
        for (i, row) in self.grid.iter().enumerate() {
            for (j, device) in row.iter().enumerate() {
                if let Some(rect) = device.as_ref().and_then(|d| d.bbox()) {
                    row_constraints.add(i, i + 1, rect.height() + self.spacing.y);
                    col_constraints.add(j, j + 1, rect.width() + self.spacing.x);
                }
            }
        }
        let row_grid = row_constraints.solve(rows + 1);
        let col_grid = col_constraints.solve(cols + 1);

        let mut out = Device::new(self.name.clone());
        for (i, row) in self.grid.into_iter().enumerate() {
            for (j, device) in row.into_iter().enumerate() {
                let Some(device) = device else { continue };
                // Slots exclude the trailing spacing; rows grow downwards.
                let slot = Rect::from_sides(
                    col_grid[j],
                    -(row_grid[i + 1] - self.spacing.y),
                    col_grid[j + 1] - self.spacing.x,
                    -row_grid[i],
                );
                out.add_ref(device).set_center(slot.center());
            }
        }
        out.set_center(Point::zero());
        out
    }
}

/// Tiles `cells` row by row with the given spacing.
pub fn device_grid(cells: Vec<Vec<Arc<Device>>>, spacing: GridSpacing) -> Device {
    let mut tiler = GridTiler::new("grid", spacing);
    for (i, row) in cells.into_iter().enumerate() {
        if i > 0 {
            tiler.end_row();
        }
        for device in row {
            tiler.push(device);
        }
    }
    tiler.tile()
}
