//! Geometric primitives: `Size`, `Rect`, `Insets`.
//!
//! All values are whole pixels. Grid cell coordinates live in
//! [`crate::grid`]; these types only describe measured or assigned
//! pixel geometry.

use serde::{Deserialize, Serialize};

/// A 2D size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Size {
    /// Zero size
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a new size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check if this size can contain another size.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Component-wise maximum of two sizes.
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// A rectangle defined by position and size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position of the top-left corner
    pub x: i32,
    /// Y position of the top-left corner
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Empty rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from a size at the origin.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// The size of this rectangle.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// X coordinate one past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Y coordinate one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Shrink this rectangle by the given insets.
    ///
    /// Width and height never go below zero.
    #[must_use]
    pub fn inset(&self, insets: &Insets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.horizontal()).max(0),
            (self.height - insets.vertical()).max(0),
        )
    }
}

/// Pixel margins around a container's content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insets {
    /// Top margin
    pub top: i32,
    /// Right margin
    pub right: i32,
    /// Bottom margin
    pub bottom: i32,
    /// Left margin
    pub left: i32,
}

impl Insets {
    /// Zero insets.
    pub const ZERO: Self = Self {
        top: 0,
        right: 0,
        bottom: 0,
        left: 0,
    };

    /// Create new insets.
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same margin on all four sides.
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Total horizontal margin (left + right).
    #[must_use]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Total vertical margin (top + bottom).
    #[must_use]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_contains() {
        let outer = Size::new(100, 50);
        assert!(outer.contains(&Size::new(100, 50)));
        assert!(outer.contains(&Size::new(10, 10)));
        assert!(!outer.contains(&Size::new(101, 10)));
    }

    #[test]
    fn test_size_max() {
        let a = Size::new(10, 50);
        let b = Size::new(40, 20);
        assert_eq!(a.max(&b), Size::new(40, 50));
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert_eq!(rect.size(), Size::new(30, 40));
    }

    #[test]
    fn test_rect_inset() {
        let rect = Rect::new(0, 0, 100, 100);
        let inner = rect.inset(&Insets::new(10, 20, 30, 40));
        assert_eq!(inner, Rect::new(40, 10, 40, 60));
    }

    #[test]
    fn test_rect_inset_clamps_to_zero() {
        let rect = Rect::new(0, 0, 10, 10);
        let inner = rect.inset(&Insets::uniform(20));
        assert_eq!(inner.width, 0);
        assert_eq!(inner.height, 0);
    }

    #[test]
    fn test_insets_totals() {
        let insets = Insets::new(1, 2, 3, 4);
        assert_eq!(insets.horizontal(), 6);
        assert_eq!(insets.vertical(), 4);
    }
}
