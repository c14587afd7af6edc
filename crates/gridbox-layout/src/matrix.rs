//! Cell occupancy tracking for one placement pass.
//!
//! A [`GridMatrix`] is short-lived: a strategy builds one, reserves cells
//! into it while resolving node positions, and throws it away. The column
//! count is fixed for the whole pass; rows grow on demand.

use std::collections::HashMap;

use gridbox_core::LayoutError;

/// Scan order used by [`GridMatrix::find_first_fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Increasing row, then column: left-to-right, top-to-bottom.
    RowMajor,
    /// Increasing column, then row: top-to-bottom, left-to-right.
    ColumnMajor,
}

/// Occupancy map over a fixed-column, growable-row grid.
///
/// Each occupied cell records the index of the node that owns it. A node
/// always occupies a full `w x h` rectangle of cells; partial occupancy
/// cannot be expressed through this API.
#[derive(Debug, Clone)]
pub struct GridMatrix {
    columns: usize,
    rows: usize,
    cells: HashMap<(usize, usize), usize>,
}

impl GridMatrix {
    /// Create an empty matrix with the given column count (at least 1).
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: 0,
            cells: HashMap::new(),
        }
    }

    /// Fixed column count of this pass.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// One past the bottom-most occupied row.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Node index occupying the given cell, if any.
    #[must_use]
    pub fn occupant(&self, x: usize, y: usize) -> Option<usize> {
        self.cells.get(&(x, y)).copied()
    }

    /// Whether the `w x h` rectangle at `(x, y)` lies inside the column
    /// bound and touches no occupied cell. Rows past the current row
    /// count are free by definition.
    #[must_use]
    pub fn is_free(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        if x + w > self.columns {
            return false;
        }
        for cy in y..y + h {
            for cx in x..x + w {
                if self.cells.contains_key(&(cx, cy)) {
                    return false;
                }
            }
        }
        true
    }

    /// Claim the `w x h` rectangle at `(x, y)` for `node`.
    ///
    /// Fails with [`LayoutError::Configuration`] when the rectangle
    /// leaves the column bound or overlaps an existing reservation; the
    /// matrix is left untouched on failure.
    pub fn reserve(
        &mut self,
        node: usize,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> Result<(), LayoutError> {
        if x + w > self.columns {
            return Err(LayoutError::configuration(format!(
                "node {node}: cells ({x}, {y}) spanning {w}x{h} exceed the {} column bound",
                self.columns
            )));
        }
        for cy in y..y + h {
            for cx in x..x + w {
                if let Some(other) = self.cells.get(&(cx, cy)) {
                    return Err(LayoutError::configuration(format!(
                        "node {node}: cell ({cx}, {cy}) is already reserved by node {other}"
                    )));
                }
            }
        }
        for cy in y..y + h {
            for cx in x..x + w {
                self.cells.insert((cx, cy), node);
            }
        }
        self.rows = self.rows.max(y + h);
        Ok(())
    }

    /// Position of the first free `w x h` rectangle in the given scan
    /// order, growing the row count only when no existing row admits it.
    #[must_use]
    pub fn find_first_fit(&self, w: usize, h: usize, order: ScanOrder) -> (usize, usize) {
        let w = w.clamp(1, self.columns);
        let h = h.max(1);
        let last_x = self.columns - w;
        match order {
            ScanOrder::RowMajor => {
                for y in 0..self.rows {
                    for x in 0..=last_x {
                        if self.is_free(x, y, w, h) {
                            return (x, y);
                        }
                    }
                }
            }
            ScanOrder::ColumnMajor => {
                for x in 0..=last_x {
                    for y in 0..self.rows {
                        if self.is_free(x, y, w, h) {
                            return (x, y);
                        }
                    }
                }
            }
        }
        (0, self.rows)
    }
}
