//! Error types shared by the grid placement and validation layers.

use thiserror::Error;

/// Errors raised by grid placement and the layout scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A declared hint cannot be honored: an explicit rectangle is out of
    /// the grid's bounds or overlaps another explicit rectangle. This is
    /// an authoring mistake in the static layout declaration and is never
    /// retried.
    #[error("invalid grid configuration: {reason}")]
    Configuration {
        /// What made the configuration invalid
        reason: String,
    },

    /// An internal invariant of the validation scheduler was violated,
    /// such as a re-entrant validation sweep. Surfaced to the process-wide
    /// error handler, never silently swallowed.
    #[error("layout scheduler invariant violated: {reason}")]
    SchedulerInvariant {
        /// Which invariant was violated
        reason: String,
    },
}

impl LayoutError {
    /// Build a [`LayoutError::Configuration`].
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Build a [`LayoutError::SchedulerInvariant`].
    #[must_use]
    pub fn scheduler(reason: impl Into<String>) -> Self {
        Self::SchedulerInvariant {
            reason: reason.into(),
        }
    }
}
