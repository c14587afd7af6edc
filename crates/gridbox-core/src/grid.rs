//! The logical grid data model: configuration, per-child hints and
//! resolved placements.
//!
//! A [`GridHint`] is the declarative request a field attaches to itself;
//! a [`GridData`] is the placement the engine resolved for it. `GridData`
//! has no identity across passes — it is rebuilt from scratch every time
//! the grid is computed.

use serde::{Deserialize, Serialize};

/// Sentinel for an automatic grid position (`x`/`y`).
pub const AUTO: i32 = -1;

/// Sentinel span meaning "span all configured columns".
pub const FULL_WIDTH: i32 = -1;

/// Sentinel weight meaning "derive the weight from the resolved span".
pub const DERIVED_WEIGHT: f32 = -1.0;

/// Alignment of a child inside its grid cell, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Align to the leading edge (left/top)
    #[default]
    Start,
    /// Center within the cell
    Center,
    /// Align to the trailing edge (right/bottom)
    End,
}

impl Alignment {
    /// Numeric form (-1, 0, 1) as used by the widget layer.
    #[must_use]
    pub const fn as_sign(self) -> i8 {
        match self {
            Self::Start => -1,
            Self::Center => 0,
            Self::End => 1,
        }
    }

    /// Build from the widget layer's numeric form; values below zero map
    /// to `Start`, above zero to `End`.
    #[must_use]
    pub const fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            Self::Start
        } else if sign > 0 {
            Self::End
        } else {
            Self::Center
        }
    }
}

/// Static grid parameters for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Fixed number of columns (at least 1)
    pub columns: usize,
    /// Horizontal gap between columns, pixels
    pub hgap: i32,
    /// Vertical gap between rows, pixels
    pub vgap: i32,
    /// Base width of one column, pixels
    pub column_width: i32,
    /// Base height of one row, pixels
    pub row_height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            hgap: 5,
            vgap: 5,
            column_width: 160,
            row_height: 30,
        }
    }
}

impl GridConfig {
    /// Create a config with the given column count and default metrics.
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            ..Self::default()
        }
    }

    /// Set the gaps between cells.
    #[must_use]
    pub const fn with_gaps(mut self, hgap: i32, vgap: i32) -> Self {
        self.hgap = hgap;
        self.vgap = vgap;
        self
    }

    /// Set the base cell metrics.
    #[must_use]
    pub const fn with_cell_size(mut self, column_width: i32, row_height: i32) -> Self {
        self.column_width = column_width;
        self.row_height = row_height;
        self
    }
}

/// Declarative sizing request attached to one child of a grid container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridHint {
    /// Explicit grid column, or [`AUTO`]
    pub x: i32,
    /// Explicit grid row, or [`AUTO`]
    pub y: i32,
    /// Column span; [`FULL_WIDTH`] spans all columns
    pub w: i32,
    /// Row span
    pub h: i32,
    /// Horizontal growth weight, or [`DERIVED_WEIGHT`]
    pub weight_x: f32,
    /// Vertical growth weight, or [`DERIVED_WEIGHT`]
    pub weight_y: f32,
    /// Use the child's own preferred width instead of the cell width
    pub use_ui_width: bool,
    /// Use the child's own preferred height instead of the cell height
    pub use_ui_height: bool,
    /// Horizontal alignment inside the cell
    pub horizontal_alignment: Alignment,
    /// Vertical alignment inside the cell
    pub vertical_alignment: Alignment,
}

impl Default for GridHint {
    fn default() -> Self {
        Self {
            x: AUTO,
            y: AUTO,
            w: 1,
            h: 1,
            weight_x: DERIVED_WEIGHT,
            weight_y: DERIVED_WEIGHT,
            use_ui_width: false,
            use_ui_height: false,
            horizontal_alignment: Alignment::Start,
            vertical_alignment: Alignment::Start,
        }
    }
}

impl GridHint {
    /// A hint requesting automatic placement with span 1x1.
    #[must_use]
    pub fn auto() -> Self {
        Self::default()
    }

    /// Request an explicit grid position.
    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Request a span.
    #[must_use]
    pub fn span(mut self, w: i32, h: i32) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    /// Span all configured columns.
    #[must_use]
    pub fn full_width(mut self) -> Self {
        self.w = FULL_WIDTH;
        self
    }

    /// Set explicit growth weights.
    #[must_use]
    pub fn weights(mut self, weight_x: f32, weight_y: f32) -> Self {
        self.weight_x = weight_x;
        self.weight_y = weight_y;
        self
    }

    /// Prefer the child's own measured size over the stretched cell size.
    #[must_use]
    pub fn use_ui_size(mut self) -> Self {
        self.use_ui_width = true;
        self.use_ui_height = true;
        self
    }

    /// Set cell alignment.
    #[must_use]
    pub fn align(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }

    /// Whether this hint requests automatic placement.
    ///
    /// A hint is explicit only when both coordinates are given.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.x < 0 || self.y < 0
    }

    /// Column span resolved against a concrete column count.
    ///
    /// [`FULL_WIDTH`] resolves to the column count; larger requests clamp
    /// to it; non-positive requests become 1.
    #[must_use]
    pub fn resolved_w(&self, columns: usize) -> usize {
        if self.w == FULL_WIDTH {
            columns
        } else {
            (self.w.max(1) as usize).min(columns)
        }
    }

    /// Row span resolved to at least 1.
    #[must_use]
    pub fn resolved_h(&self) -> usize {
        self.h.max(1) as usize
    }
}

/// Resolved grid coordinates, spans and weights for one child.
///
/// Produced fresh by every placement pass; never patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    /// Resolved grid column
    pub x: usize,
    /// Resolved grid row
    pub y: usize,
    /// Resolved column span (>= 1)
    pub w: usize,
    /// Resolved row span (>= 1)
    pub h: usize,
    /// Resolved horizontal growth weight
    pub weight_x: f32,
    /// Resolved vertical growth weight
    pub weight_y: f32,
    /// Base pixel width of the spanned cells, gaps included
    pub width: i32,
    /// Base pixel height of the spanned cells, gaps included
    pub height: i32,
}

impl GridData {
    /// Column one past the right edge.
    #[must_use]
    pub const fn right(&self) -> usize {
        self.x + self.w
    }

    /// Row one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> usize {
        self.y + self.h
    }

    /// Whether two placements overlap in grid cells.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hint_defaults_are_auto() {
        let hint = GridHint::default();
        assert!(hint.is_auto());
        assert_eq!(hint.w, 1);
        assert_eq!(hint.h, 1);
        assert_eq!(hint.weight_x, DERIVED_WEIGHT);
    }

    #[test]
    fn test_hint_explicit_requires_both_coordinates() {
        assert!(GridHint::auto().at(2, AUTO).is_auto());
        assert!(GridHint::auto().at(AUTO, 2).is_auto());
        assert!(!GridHint::auto().at(0, 0).is_auto());
    }

    #[test]
    fn test_resolved_span_clamps() {
        let hint = GridHint::auto().span(5, 0);
        assert_eq!(hint.resolved_w(3), 3);
        assert_eq!(hint.resolved_h(), 1);
    }

    #[test]
    fn test_full_width_resolves_to_column_count() {
        let hint = GridHint::auto().full_width();
        assert_eq!(hint.resolved_w(4), 4);
        assert_eq!(hint.resolved_w(1), 1);
    }

    #[test]
    fn test_config_clamps_columns() {
        assert_eq!(GridConfig::new(0).columns, 1);
    }

    #[test]
    fn test_alignment_signs_round_trip() {
        for alignment in [Alignment::Start, Alignment::Center, Alignment::End] {
            assert_eq!(Alignment::from_sign(alignment.as_sign()), alignment);
        }
    }

    #[test]
    fn test_grid_data_overlaps() {
        let a = GridData {
            x: 0,
            y: 0,
            w: 2,
            h: 1,
            weight_x: 0.0,
            weight_y: 0.0,
            width: 0,
            height: 0,
        };
        let mut b = a;
        b.x = 1;
        assert!(a.overlaps(&b));
        b.x = 2;
        assert!(!a.overlaps(&b));
        b.x = 0;
        b.y = 1;
        assert!(!a.overlaps(&b));
    }

    proptest! {
        #[test]
        fn prop_resolved_spans_stay_in_range(
            w in -2..10i32,
            h in -2..10i32,
            columns in 1..8usize,
        ) {
            let hint = GridHint::auto().span(w, h);
            let resolved = hint.resolved_w(columns);
            prop_assert!(resolved >= 1);
            prop_assert!(resolved <= columns);
            prop_assert!(hint.resolved_h() >= 1);
        }
    }
}
