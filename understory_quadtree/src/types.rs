// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles, quadrants, and item type masks.

use kurbo::{Point, Rect};

/// Handle of a node in a [`Quadtree`](crate::Quadtree).
///
/// Nodes are created by splits and grows and are never destroyed, so a handle
/// stays valid for the lifetime of the tree that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node handles are intentionally 32-bit."
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One of the four sub-regions of a node.
///
/// Quadrants are numbered clockwise starting from the upper right, in screen
/// coordinates (y grows downward).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Right half, upper half.
    UpperRight = 0,
    /// Right half, lower half.
    LowerRight = 1,
    /// Left half, lower half.
    LowerLeft = 2,
    /// Left half, upper half.
    UpperLeft = 3,
}

impl Quadrant {
    /// All quadrants, in index order.
    pub const ALL: [Self; 4] = [
        Self::UpperRight,
        Self::LowerRight,
        Self::LowerLeft,
        Self::UpperLeft,
    ];

    /// Index of this quadrant in a node's child array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Select the quadrant of `point` relative to `center`.
    ///
    /// A point maps to the right half iff `point.x > center.x` and to the
    /// lower half iff `point.y > center.y`, so points on the center lines go
    /// left and up.
    ///
    /// ```
    /// use kurbo::Point;
    /// use understory_quadtree::Quadrant;
    ///
    /// let c = Point::new(50.0, 50.0);
    /// assert_eq!(Quadrant::of(c, Point::new(75.0, 25.0)), Quadrant::UpperRight);
    /// assert_eq!(Quadrant::of(c, c), Quadrant::UpperLeft);
    /// ```
    #[inline]
    pub fn of(center: Point, point: Point) -> Self {
        match (point.x > center.x, point.y > center.y) {
            (true, false) => Self::UpperRight,
            (true, true) => Self::LowerRight,
            (false, true) => Self::LowerLeft,
            (false, false) => Self::UpperLeft,
        }
    }

    /// The part of `parent` covered by this quadrant: half its width and half its height.
    pub fn sub_rect(self, parent: Rect) -> Rect {
        let c = parent.center();
        match self {
            Self::UpperRight => Rect::new(c.x, parent.y0, parent.x1, c.y),
            Self::LowerRight => Rect::new(c.x, c.y, parent.x1, parent.y1),
            Self::LowerLeft => Rect::new(parent.x0, c.y, c.x, parent.y1),
            Self::UpperLeft => Rect::new(parent.x0, parent.y0, c.x, c.y),
        }
    }
}

bitflags::bitflags! {
    /// Client-defined item categories used to filter queries.
    ///
    /// The crate assigns no meaning to individual bits; build masks with
    /// [`TypeMask::from_bits_retain`] or your own named constants. An item
    /// passes a query filter when it carries *every* bit of the filter, so an
    /// empty filter matches all items. Items themselves must carry at least
    /// one bit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TypeMask: u32 {
        /// Every bit set. Items carrying this mask pass any filter.
        const ALL = u32::MAX;
    }
}

impl TypeMask {
    /// Whether an item carrying `self` passes a query filtering on `filter`.
    #[inline]
    pub const fn satisfies(self, filter: Self) -> bool {
        self.contains(filter)
    }
}
