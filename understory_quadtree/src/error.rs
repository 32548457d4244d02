// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for quadtree operations.

use kurbo::{Point, Rect};
use thiserror::Error;

/// Errors reported by [`Quadtree`](crate::Quadtree) operations.
///
/// Every error is raised before the tree is mutated, except
/// [`QuadtreeError::Consistency`], which signals an internal logic fault.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum QuadtreeError {
    /// A construction parameter was out of range, or the world region was degenerate.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The item carries an empty type mask.
    #[error("item has an empty type mask")]
    InvalidItem,

    /// The item's location lies outside the world region.
    ///
    /// This is recoverable: [`grow`](crate::Quadtree::grow) the tree and retry.
    #[error("location {location:?} lies outside the world region {world:?}")]
    OutOfBounds {
        /// The rejected location.
        location: Point,
        /// The world region at the time of the call.
        world: Rect,
    },

    /// The tree structure was used in a way its invariants forbid.
    #[error("quadtree consistency fault: {0}")]
    Consistency(&'static str),
}

/// Result alias for quadtree operations.
pub type Result<T, E = QuadtreeError> = core::result::Result<T, E>;
