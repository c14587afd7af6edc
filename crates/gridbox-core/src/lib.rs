//! Core types for the Gridbox logical grid layout engine.
//!
//! This crate provides the foundational data model shared by the layout
//! crates:
//! - Geometric primitives: [`Size`], [`Rect`], [`Insets`]
//! - The grid data model: [`GridConfig`], [`GridHint`], [`GridData`]
//! - The measurement boundary: [`SizeHints`], [`MeasureSize`]
//! - The shared error type: [`LayoutError`]
//!
//! Everything here is pure data plus small helpers; the placement
//! algorithms and the validation scheduler live in `gridbox-layout`.

mod error;
mod geometry;
mod grid;
mod measure;

pub use error::LayoutError;
pub use geometry::{Insets, Rect, Size};
pub use grid::{
    Alignment, GridConfig, GridData, GridHint, AUTO, DERIVED_WEIGHT, FULL_WIDTH,
};
pub use measure::{FixedSize, MeasureSize, SizeHints};
