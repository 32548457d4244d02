// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A quadtree shared between threads behind a reader/writer lock.

use core::fmt;

use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::item::SpatialItem;
use crate::region::Region;
use crate::tree::Quadtree;
use crate::types::TypeMask;

/// A cloneable handle to a [`Quadtree`] guarded by an [`RwLock`].
///
/// Queries take the shared lock and may run concurrently; mutations take the
/// exclusive lock.
///
/// ```rust
/// use kurbo::{Point, Rect, Size};
/// use understory_quadtree::{Item, Quadtree, SharedQuadtree, TypeMask};
///
/// let tree = Quadtree::new(Rect::new(0.0, 0.0, 64.0, 64.0)).unwrap();
/// let shared = SharedQuadtree::new(tree);
///
/// let writer = shared.clone();
/// std::thread::spawn(move || {
///     let item = Item::anchored(1_u32, Point::new(8.0, 8.0), Size::new(2.0, 2.0), TypeMask::ALL);
///     writer.add_item(item).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.query_any(&Rect::new(0.0, 0.0, 16.0, 16.0)).len(), 1);
/// ```
pub struct SharedQuadtree<I: SpatialItem> {
    inner: Arc<RwLock<Quadtree<I>>>,
}

impl<I: SpatialItem> Clone for SharedQuadtree<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: SpatialItem> fmt::Debug for SharedQuadtree<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedQuadtree")
            .field("tree", &*self.read())
            .finish()
    }
}

impl<I: SpatialItem> From<Quadtree<I>> for SharedQuadtree<I> {
    fn from(tree: Quadtree<I>) -> Self {
        Self::new(tree)
    }
}

impl<I: SpatialItem> SharedQuadtree<I> {
    /// Wrap `tree` for shared use.
    pub fn new(tree: Quadtree<I>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Take the shared lock, for several queries against one consistent state.
    pub fn read(&self) -> RwLockReadGuard<'_, Quadtree<I>> {
        self.inner.read()
    }

    /// Take the exclusive lock, for a batch of mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, Quadtree<I>> {
        self.inner.write()
    }

    /// See [`Quadtree::add_item`].
    pub fn add_item(&self, item: I) -> Result<()> {
        self.write().add_item(item)
    }

    /// See [`Quadtree::move_item`].
    pub fn move_item(&self, item: I) -> Result<()> {
        self.write().move_item(item)
    }

    /// See [`Quadtree::remove_item`].
    pub fn remove_item(&self, id: &I::Id) -> bool {
        self.write().remove_item(id)
    }

    /// See [`Quadtree::clear`].
    pub fn clear(&self) {
        self.write().clear();
    }

    /// See [`Quadtree::grow`].
    pub fn grow(&self) {
        self.write().grow();
    }

    /// See [`Quadtree::query`].
    pub fn query<R: Region + ?Sized>(&self, region: &R, filter: TypeMask) -> HashSet<I::Id> {
        self.read().query(region, filter)
    }

    /// See [`Quadtree::query_any`].
    pub fn query_any<R: Region + ?Sized>(&self, region: &R) -> HashSet<I::Id> {
        self.read().query_any(region)
    }

    /// See [`Quadtree::len`].
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// See [`Quadtree::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Unwrap the tree if this is the last handle, or give the handle back.
    pub fn try_unwrap(self) -> Result<Quadtree<I>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(inner) => Err(Self { inner }),
        }
    }
}
