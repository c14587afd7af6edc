//! The measurement boundary.
//!
//! The layout engine never measures content itself. Every sizable child
//! supplies a [`MeasureSize`] provider, and the engine asks it for a
//! preferred size under a set of [`SizeHints`]. Anything that can answer
//! that question (a rendered widget, a test stub, a cached value) can
//! participate in layout.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Constraints passed to a preferred-size computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeHints {
    /// Available width in pixels, if known. Used for wrap calculations.
    pub width_hint: Option<i32>,
    /// When set, the width hint is a hard cap rather than a suggestion.
    pub exact: bool,
    /// Include the container's insets in the reported size.
    pub include_margin: bool,
}

impl SizeHints {
    /// Hints with no constraints at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            width_hint: None,
            exact: false,
            include_margin: false,
        }
    }

    /// Constrain the width.
    #[must_use]
    pub const fn with_width(mut self, width: i32) -> Self {
        self.width_hint = Some(width);
        self
    }

    /// Treat the width hint as exact.
    #[must_use]
    pub const fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Include margins in the result.
    #[must_use]
    pub const fn with_margin(mut self) -> Self {
        self.include_margin = true;
        self
    }
}

/// Capability required of every sizable child: answer its preferred
/// pixel size under the given hints.
pub trait MeasureSize {
    /// Preferred size in pixels. Must not mutate observable state.
    fn preferred_size(&self, hints: &SizeHints) -> Size;
}

/// A provider that always reports a fixed size. Useful as a default and
/// in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedSize(pub Size);

impl MeasureSize for FixedSize {
    fn preferred_size(&self, _hints: &SizeHints) -> Size {
        self.0
    }
}
