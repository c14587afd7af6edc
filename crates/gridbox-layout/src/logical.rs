//! Per-container layout policy: the [`Layout`] trait and the grid-based
//! implementation, [`LogicalGridLayout`].
//!
//! A layout never measures content. It arranges already-measured
//! children: grid placement resolves cells, the cells are translated
//! into pixel rectangles using the container's bounds and the configured
//! cell metrics, and leftover space is distributed along each axis
//! proportionally to the node weights.

use gridbox_core::{Alignment, GridConfig, GridData, LayoutError, Rect, Size, SizeHints};

use crate::strategy::{compute_grid, span_extent, GridStrategy};
use crate::validator::{LayoutContext, UnitId};

/// Policy object owned 1:1 by a sizable container.
pub trait Layout: std::fmt::Debug {
    /// Assign pixel bounds to the container's children. Side-effecting
    /// only through [`LayoutContext::set_child_bounds`].
    fn layout(&mut self, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError>;

    /// The container's ideal pixel size under the given hints. Must not
    /// assign any child bounds.
    fn preferred_layout_size(
        &self,
        ctx: &mut LayoutContext<'_>,
        hints: &SizeHints,
    ) -> Result<Size, LayoutError>;

    /// Hook fired when a descendant reports a size change, before the
    /// container is re-laid out. The default does nothing.
    fn invalidate(&mut self, _source: UnitId) {}
}

/// Grid-based container layout.
///
/// Children are placed by the configured [`GridStrategy`], then each
/// cell rectangle is realized in pixels: base cell sizes come from the
/// [`GridConfig`], and whatever container space is left over (positive
/// or negative) is shared among columns and rows by weight.
#[derive(Debug, Clone)]
pub struct LogicalGridLayout {
    config: GridConfig,
    strategy: GridStrategy,
}

impl LogicalGridLayout {
    /// Create a grid layout with the given configuration and strategy.
    #[must_use]
    pub const fn new(config: GridConfig, strategy: GridStrategy) -> Self {
        Self { config, strategy }
    }

    /// The grid configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }
}

impl Layout for LogicalGridLayout {
    fn layout(&mut self, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
        let hints = ctx.child_hints();
        if hints.is_empty() {
            return Ok(());
        }
        let computation = compute_grid(&hints, &self.config, &self.strategy)?;
        let content = ctx.content_bounds();

        let column_widths = distribute(
            self.config.column_width,
            &column_weights(computation.column_count, &computation.grid_data),
            self.config.hgap,
            content.width,
        );
        let row_heights = distribute(
            self.config.row_height,
            &row_weights(computation.row_count, &computation.grid_data),
            self.config.vgap,
            content.height,
        );
        let column_offsets = offsets(content.x, &column_widths, self.config.hgap);
        let row_offsets = offsets(content.y, &row_heights, self.config.vgap);

        for (index, data) in computation.grid_data.iter().enumerate() {
            let cell = Rect::new(
                column_offsets[data.x],
                row_offsets[data.y],
                stretch_extent(&column_widths[data.x..data.right()], self.config.hgap),
                stretch_extent(&row_heights[data.y..data.bottom()], self.config.vgap),
            );
            let hint = hints[index];
            let mut bounds = cell;
            if hint.use_ui_width || hint.use_ui_height {
                let measured = ctx.child_preferred_size(index, &SizeHints::none())?;
                if hint.use_ui_width && measured.width < cell.width {
                    bounds.width = measured.width;
                    bounds.x = cell.x
                        + align_offset(hint.horizontal_alignment, cell.width - measured.width);
                }
                if hint.use_ui_height && measured.height < cell.height {
                    bounds.height = measured.height;
                    bounds.y = cell.y
                        + align_offset(hint.vertical_alignment, cell.height - measured.height);
                }
            }
            ctx.set_child_bounds(index, bounds);
        }
        Ok(())
    }

    fn preferred_layout_size(
        &self,
        ctx: &mut LayoutContext<'_>,
        hints: &SizeHints,
    ) -> Result<Size, LayoutError> {
        let child_hints = ctx.child_hints();
        let (mut width, mut height) = if child_hints.is_empty() {
            (0, 0)
        } else {
            let computation = compute_grid(&child_hints, &self.config, &self.strategy)?;
            (
                span_extent(
                    computation.column_count,
                    self.config.column_width,
                    self.config.hgap,
                ),
                span_extent(
                    computation.row_count,
                    self.config.row_height,
                    self.config.vgap,
                ),
            )
        };
        if hints.include_margin {
            let insets = ctx.insets();
            width += insets.horizontal();
            height += insets.vertical();
        }
        if hints.exact {
            if let Some(cap) = hints.width_hint {
                width = width.min(cap);
            }
        }
        Ok(Size::new(width, height))
    }
}

/// Per-column growth weight: the largest per-cell share of any node
/// covering the column.
fn column_weights(columns: usize, data: &[GridData]) -> Vec<f32> {
    let mut weights = vec![0.0f32; columns];
    for node in data {
        let share = node.weight_x / node.w as f32;
        for column in node.x..node.right() {
            weights[column] = weights[column].max(share);
        }
    }
    weights
}

fn row_weights(rows: usize, data: &[GridData]) -> Vec<f32> {
    let mut weights = vec![0.0f32; rows];
    for node in data {
        let share = node.weight_y / node.h as f32;
        for row in node.y..node.bottom() {
            weights[row] = weights[row].max(share);
        }
    }
    weights
}

/// Final track sizes for one axis: the base size everywhere, plus the
/// leftover container space split by weight. Cumulative rounding keeps
/// the distributed total exact; tracks never go negative.
fn distribute(base: i32, weights: &[f32], gap: i32, available: i32) -> Vec<i32> {
    let count = weights.len();
    let mut sizes = vec![base; count];
    if count == 0 {
        return sizes;
    }
    let used = count as i32 * base + (count as i32 - 1) * gap;
    let extra = available - used;
    let total: f32 = weights.iter().sum();
    if extra != 0 && total > 0.0 {
        let mut accumulated = 0.0f64;
        let mut assigned = 0i32;
        for (size, &weight) in sizes.iter_mut().zip(weights) {
            accumulated += f64::from(extra) * f64::from(weight) / f64::from(total);
            let target = accumulated.round() as i32;
            *size += target - assigned;
            assigned = target;
        }
    }
    for size in &mut sizes {
        *size = (*size).max(0);
    }
    sizes
}

/// Leading pixel offset of every track.
fn offsets(origin: i32, sizes: &[i32], gap: i32) -> Vec<i32> {
    let mut out = Vec::with_capacity(sizes.len());
    let mut position = origin;
    for &size in sizes {
        out.push(position);
        position += size + gap;
    }
    out
}

/// Pixel extent of a run of tracks including the gaps between them.
fn stretch_extent(sizes: &[i32], gap: i32) -> i32 {
    if sizes.is_empty() {
        return 0;
    }
    sizes.iter().sum::<i32>() + (sizes.len() as i32 - 1) * gap
}

const fn align_offset(alignment: Alignment, slack: i32) -> i32 {
    match alignment {
        Alignment::Start => 0,
        Alignment::Center => slack / 2,
        Alignment::End => slack,
    }
}
