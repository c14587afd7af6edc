//! Logical grid placement and layout validation scheduling.
//!
//! Two subsystems cooperate to size and arrange nested panels of fields:
//!
//! - **Placement** ([`compute_grid`]): resolve per-child [`GridHint`]s
//!   into grid cells under a fixed column count, with row-major and
//!   column-balanced flow strategies.
//! - **Validation** ([`LayoutValidator`]): track which containers need a
//!   new layout pass, coalesce redundant invalidations, and run the
//!   passes in ancestor-before-descendant order on the next cooperative
//!   turn.
//!
//! [`LogicalGridLayout`] connects the two: as a container's [`Layout`],
//! it runs placement over the container's children and translates the
//! resulting cells into pixel bounds.
//!
//! [`GridHint`]: gridbox_core::GridHint

mod logical;
mod matrix;
mod strategy;
mod validator;

pub use logical::{Layout, LogicalGridLayout};
pub use matrix::{GridMatrix, ScanOrder};
pub use strategy::{compute_grid, CellRect, GridComputation, GridStrategy, PlacementStrategy};
pub use validator::{LayoutContext, LayoutValidator, ManualSchedule, ScheduleHook, UnitId};
