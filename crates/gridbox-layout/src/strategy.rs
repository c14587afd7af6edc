//! Placement strategies: resolving grid hints into concrete cells.
//!
//! Two built-in strategies share the same explicit-reservation step and
//! differ only in how automatically positioned nodes flow:
//!
//! - [`GridStrategy::RowMajor`] fills left-to-right, top-to-bottom with a
//!   monotone cursor, the classic form-field reading order.
//! - [`GridStrategy::ColumnBalanced`] favors short columns: each node
//!   takes the topmost free slot (leftmost on ties), and a node following
//!   a column-spanning one is pulled directly underneath its left edge.
//!
//! Anything else plugs in through [`GridStrategy::Custom`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use gridbox_core::{GridConfig, GridData, GridHint, LayoutError, FULL_WIDTH};

use crate::matrix::{GridMatrix, ScanOrder};

/// A resolved cell rectangle, before weights and pixel sizes are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// Grid column
    pub x: usize,
    /// Grid row
    pub y: usize,
    /// Column span
    pub w: usize,
    /// Row span
    pub h: usize,
}

/// A pluggable placement algorithm for [`GridStrategy::Custom`].
///
/// Implementations receive the full hint list and must return one cell
/// rectangle per hint, in the same order, honoring the occupancy
/// invariants (in-bounds, non-overlapping).
pub trait PlacementStrategy: fmt::Debug {
    /// Resolve every hint to a cell rectangle.
    fn place(&self, hints: &[GridHint], config: &GridConfig) -> Result<Vec<CellRect>, LayoutError>;
}

/// Which placement algorithm a container uses, chosen at construction.
#[derive(Debug, Clone)]
pub enum GridStrategy {
    /// Left-to-right, top-to-bottom flow.
    RowMajor,
    /// Topmost-slot flow that keeps columns balanced.
    ColumnBalanced,
    /// A caller-supplied algorithm.
    Custom(Arc<dyn PlacementStrategy>),
}

/// Output of one placement pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridComputation {
    /// One resolved placement per input hint, in input order.
    pub grid_data: Vec<GridData>,
    /// Number of grid rows used, `max(y + h)` over all placements.
    pub row_count: usize,
    /// The configured column count.
    pub column_count: usize,
}

/// Resolve an ordered hint list into grid placements.
///
/// Pure: identical inputs always produce identical output. Explicit
/// hints are reserved first, in hint order, and fail fast when out of
/// bounds or overlapping; automatic hints are then flowed by the chosen
/// strategy in original order.
pub fn compute_grid(
    hints: &[GridHint],
    config: &GridConfig,
    strategy: &GridStrategy,
) -> Result<GridComputation, LayoutError> {
    let columns = config.columns.max(1);
    let cells = match strategy {
        GridStrategy::RowMajor => place_row_major(hints, columns)?,
        GridStrategy::ColumnBalanced => place_column_balanced(hints, columns)?,
        GridStrategy::Custom(custom) => {
            let cells = custom.place(hints, config)?;
            if cells.len() != hints.len() {
                return Err(LayoutError::configuration(format!(
                    "custom strategy returned {} placements for {} hints",
                    cells.len(),
                    hints.len()
                )));
            }
            // Run the rectangles through the matrix so a misbehaving
            // strategy fails here instead of corrupting pixel math.
            let mut matrix = GridMatrix::new(columns);
            for (index, cell) in cells.iter().enumerate() {
                matrix.reserve(index, cell.x, cell.y, cell.w, cell.h)?;
            }
            cells
        }
    };

    let row_count = cells.iter().map(|c| c.y + c.h).max().unwrap_or(0);
    let grid_data = hints
        .iter()
        .zip(&cells)
        .map(|(hint, cell)| resolve_data(hint, cell, config))
        .collect();

    Ok(GridComputation {
        grid_data,
        row_count,
        column_count: columns,
    })
}

/// Derive weights and base pixel extents for one placed node.
fn resolve_data(hint: &GridHint, cell: &CellRect, config: &GridConfig) -> GridData {
    let weight_x = if hint.weight_x < 0.0 {
        cell.w as f32
    } else {
        hint.weight_x
    };
    let weight_y = if hint.weight_y < 0.0 {
        cell.h as f32
    } else {
        hint.weight_y
    };
    GridData {
        x: cell.x,
        y: cell.y,
        w: cell.w,
        h: cell.h,
        weight_x,
        weight_y,
        width: span_extent(cell.w, config.column_width, config.hgap),
        height: span_extent(cell.h, config.row_height, config.vgap),
    }
}

/// Base pixel extent of a span: cells plus the gaps between them.
pub(crate) fn span_extent(span: usize, cell: i32, gap: i32) -> i32 {
    if span == 0 {
        return 0;
    }
    span as i32 * cell + (span as i32 - 1) * gap
}

/// Reserve every explicit hint, in hint order. Returns the partially
/// filled placement list; auto hints stay `None`.
fn reserve_explicit(
    matrix: &mut GridMatrix,
    hints: &[GridHint],
    columns: usize,
) -> Result<Vec<Option<CellRect>>, LayoutError> {
    let mut placed = vec![None; hints.len()];
    for (index, hint) in hints.iter().enumerate() {
        if hint.is_auto() {
            continue;
        }
        let cell = CellRect {
            x: hint.x as usize,
            y: hint.y as usize,
            w: hint.resolved_w(columns),
            h: hint.resolved_h(),
        };
        matrix.reserve(index, cell.x, cell.y, cell.w, cell.h)?;
        placed[index] = Some(cell);
    }
    Ok(placed)
}

/// Whether this hint claims the full grid width and thus always starts
/// a fresh row of its own.
fn is_full_width(hint: &GridHint, columns: usize) -> bool {
    hint.w == FULL_WIDTH || hint.resolved_w(columns) >= columns
}

/// Left-to-right, top-to-bottom flow.
///
/// The scan cursor is monotone across the pass: once a free cell has
/// been skipped because the current node did not fit there, no later
/// node returns to it. Full-width nodes always open a fresh row below
/// everything placed so far.
fn place_row_major(hints: &[GridHint], columns: usize) -> Result<Vec<CellRect>, LayoutError> {
    let mut matrix = GridMatrix::new(columns);
    let mut placed = reserve_explicit(&mut matrix, hints, columns)?;

    let mut cursor = (0usize, 0usize);
    for (index, hint) in hints.iter().enumerate() {
        if placed[index].is_some() {
            continue;
        }
        let w = hint.resolved_w(columns);
        let h = hint.resolved_h();

        let (x, y) = if is_full_width(hint, columns) {
            (0, matrix.rows())
        } else {
            let (mut x, mut y) = cursor;
            loop {
                if x + w > columns {
                    x = 0;
                    y += 1;
                    continue;
                }
                if matrix.is_free(x, y, w, h) {
                    break;
                }
                x += 1;
            }
            (x, y)
        };

        matrix.reserve(index, x, y, w, h)?;
        placed[index] = Some(CellRect { x, y, w, h });
        cursor = if is_full_width(hint, columns) {
            (0, y + h)
        } else {
            (x + w, y)
        };
    }

    Ok(unwrap_placed(placed))
}

/// Topmost-slot flow that keeps columns balanced.
///
/// Each automatic node takes the topmost free slot that admits its
/// rectangle, leftmost on ties, so gaps left by spanning nodes are
/// back-filled by later nodes. When a node spans multiple columns, the
/// slot directly below its left edge is offered to the immediately
/// following node, continuing that column downward; the offer lapses
/// after one node either way.
fn place_column_balanced(hints: &[GridHint], columns: usize) -> Result<Vec<CellRect>, LayoutError> {
    let mut matrix = GridMatrix::new(columns);
    let mut placed = reserve_explicit(&mut matrix, hints, columns)?;

    let mut anchor: Option<(usize, usize)> = None;
    for (index, hint) in hints.iter().enumerate() {
        if placed[index].is_some() {
            continue;
        }
        let w = hint.resolved_w(columns);
        let h = hint.resolved_h();

        let (x, y) = if is_full_width(hint, columns) {
            anchor = None;
            (0usize, matrix.rows())
        } else {
            let anchored = anchor.take().filter(|&(ax, ay)| matrix.is_free(ax, ay, w, h));
            // The topmost slot admitting the rectangle, leftmost on
            // ties, is exactly the row-major first fit.
            anchored.unwrap_or_else(|| matrix.find_first_fit(w, h, ScanOrder::RowMajor))
        };

        matrix.reserve(index, x, y, w, h)?;
        placed[index] = Some(CellRect { x, y, w, h });
        if w > 1 {
            anchor = Some((x, y + h));
        }
    }

    Ok(unwrap_placed(placed))
}

fn unwrap_placed(placed: Vec<Option<CellRect>>) -> Vec<CellRect> {
    // Every slot is filled by the time the flows above finish.
    placed.into_iter().flatten().collect()
}
