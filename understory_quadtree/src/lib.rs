// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Quadtree: an adaptive 2D quadtree for broad-phase queries.
//!
//! The tree stores movable items, each with a stable identity, a location, a
//! bounding box, and a [`TypeMask`] of client-defined categories. It answers
//! "which items overlap this region" for rectangles and circles, optionally
//! restricted to items carrying a set of type bits.
//!
//! - Leaves split into four quadrants once they would hold more than a
//!   configured number of items, down to a configured maximum depth.
//! - A reverse index from item identity to leaf keeps moves and removals
//!   independent of the size of the tree.
//! - Queries skip per-item tests for nodes that lie entirely inside the query
//!   region.
//! - [`Quadtree::grow`] doubles the world when items need to leave it.
//!
//! Geometry comes from [`kurbo`]. Items implement [`SpatialItem`], or use the
//! ready-made [`Item`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Circle, Point, Rect, Size};
//! use understory_quadtree::{Item, Quadtree, QuadtreeError, TypeMask};
//!
//! const PLAYER: TypeMask = TypeMask::from_bits_retain(1 << 0);
//! const PICKUP: TypeMask = TypeMask::from_bits_retain(1 << 1);
//!
//! let mut tree = Quadtree::try_new(Rect::new(0.0, 0.0, 100.0, 100.0), 5, 10).unwrap();
//! let player = Item::anchored(1_u32, Point::new(10.0, 10.0), Size::new(2.0, 2.0), PLAYER);
//! tree.add_item(player).unwrap();
//! tree.add_item(Item::anchored(2, Point::new(12.0, 10.0), Size::new(1.0, 1.0), PICKUP)).unwrap();
//!
//! // Everything near the player, then only pickups.
//! let near = Circle::new((11.0, 11.0), 3.0);
//! assert_eq!(tree.query_any(&near).len(), 2);
//! assert_eq!(tree.query(&near, PICKUP).len(), 1);
//!
//! // Moving re-files the item only if it left its leaf.
//! tree.move_item(player.moved_to(Point::new(60.0, 60.0))).unwrap();
//! assert_eq!(tree.query(&near, PLAYER).len(), 0);
//!
//! // Items must stay inside the world; grow it to make room.
//! let far = player.moved_to(Point::new(150.0, 20.0));
//! assert!(matches!(tree.move_item(far), Err(QuadtreeError::OutOfBounds { .. })));
//! tree.grow();
//! tree.move_item(far).unwrap();
//! assert_eq!(tree.world(), Rect::new(0.0, 0.0, 200.0, 200.0));
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` in dependencies and provides
//!   [`SharedQuadtree`], a thread-shareable handle behind a reader/writer lock.
//! - `libm`: floating point support for `no_std` builds.
//! - `serde`: `Serialize`/`Deserialize` for [`QuadtreeConfig`] and [`TypeMask`].
//!
//! ## Logging
//!
//! Splits and grows are reported as `tracing` events at `debug` level, item
//! mutations at `trace` level, and rejected inputs at `warn` level. The crate
//! installs no subscriber.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod config;
mod error;
mod item;
mod node;
mod region;
#[cfg(feature = "std")]
mod shared;
mod tree;
mod types;

pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITEMS_PER_NODE, QuadtreeConfig};
pub use error::{QuadtreeError, Result};
pub use item::{Item, SpatialItem};
pub use node::NodeRef;
pub use region::{Region, circle_contains_point, rect_contains_point};
#[cfg(feature = "std")]
pub use shared::SharedQuadtree;
pub use tree::Quadtree;
pub use types::{NodeId, Quadrant, TypeMask};

/// Set type returned by queries.
pub use hashbrown::HashSet;
