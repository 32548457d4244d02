// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item capability consumed by the tree, and a plain implementation of it.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect, Size};

use crate::types::TypeMask;

/// Anything that can be stored in a [`Quadtree`](crate::Quadtree).
///
/// The tree keys items by [`SpatialItem::id`], never by their other fields,
/// so an item's geometry may change freely between calls to
/// [`Quadtree::move_item`](crate::Quadtree::move_item). The tree never
/// derives the bounding box from the location; keeping the two consistent is
/// up to the implementor.
pub trait SpatialItem {
    /// Stable, caller-owned identity of the item.
    type Id: Copy + Eq + Hash + Debug;

    /// Identity of this item.
    fn id(&self) -> Self::Id;

    /// Reference point of the item. Must lie inside the world region on insert.
    fn location(&self) -> Point;

    /// Bounding box used for overlap tests and for choosing a quadrant.
    fn bounding_box(&self) -> Rect;

    /// Categories of this item. Must not be empty.
    fn type_mask(&self) -> TypeMask;
}

/// A plain [`SpatialItem`]: an identifier with geometry and a type mask.
///
/// ```
/// use kurbo::{Point, Size};
/// use understory_quadtree::{Item, SpatialItem, TypeMask};
///
/// let item = Item::anchored(7_u32, Point::new(10.0, 10.0), Size::new(2.0, 2.0), TypeMask::ALL);
/// assert_eq!(item.bounding_box().center(), Point::new(11.0, 11.0));
///
/// let moved = item.moved_to(Point::new(20.0, 10.0));
/// assert_eq!(moved.bounding_box().x0, 20.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item<K> {
    /// Stable identifier.
    pub id: K,
    /// Reference point.
    pub location: Point,
    /// Bounding box.
    pub bounding_box: Rect,
    /// Categories.
    pub type_mask: TypeMask,
}

impl<K> Item<K> {
    /// Create an item from all of its parts.
    pub const fn new(id: K, location: Point, bounding_box: Rect, type_mask: TypeMask) -> Self {
        Self {
            id,
            location,
            bounding_box,
            type_mask,
        }
    }

    /// Create an item whose bounding box has its upper-left corner at `location`.
    pub fn anchored(id: K, location: Point, size: Size, type_mask: TypeMask) -> Self {
        Self::new(
            id,
            location,
            Rect::from_origin_size(location, size),
            type_mask,
        )
    }

    /// Create an item whose bounding box is centered on `location`.
    pub fn centered(id: K, location: Point, size: Size, type_mask: TypeMask) -> Self {
        Self::new(
            id,
            location,
            Rect::from_center_size(location, size),
            type_mask,
        )
    }

    /// The same item translated so that its location is `location`.
    ///
    /// The bounding box moves by the same offset.
    #[must_use]
    pub fn moved_to(self, location: Point) -> Self {
        let offset = location - self.location;
        Self {
            location,
            bounding_box: self.bounding_box + offset,
            ..self
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> SpatialItem for Item<K> {
    type Id = K;

    #[inline]
    fn id(&self) -> K {
        self.id
    }

    #[inline]
    fn location(&self) -> Point {
        self.location
    }

    #[inline]
    fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    #[inline]
    fn type_mask(&self) -> TypeMask {
        self.type_mask
    }
}
