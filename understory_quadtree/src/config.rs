// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Policy limits for a quadtree.

use crate::error::{QuadtreeError, Result};

/// Default maximum depth of a new tree (the root has depth 1).
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default number of items a leaf may hold before it splits.
pub const DEFAULT_MAX_ITEMS_PER_NODE: usize = 100;

/// Splitting policy for a [`Quadtree`](crate::Quadtree).
///
/// ```
/// use understory_quadtree::QuadtreeConfig;
///
/// let config = QuadtreeConfig::new().with_max_depth(8).with_max_items_per_node(16);
/// assert_eq!(config.max_depth, 8);
/// assert!(config.validate().is_ok());
/// assert!(QuadtreeConfig::new().with_max_depth(0).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadtreeConfig {
    /// Maximum depth of any node; leaves at this depth never split. At least 1.
    pub max_depth: u32,
    /// A leaf splits when adding an item would take it past this count. At least 1.
    pub max_items_per_node: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_items_per_node: DEFAULT_MAX_ITEMS_PER_NODE,
        }
    }
}

impl QuadtreeConfig {
    /// Create a configuration with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-leaf item limit.
    pub fn with_max_items_per_node(mut self, max_items_per_node: usize) -> Self {
        self.max_items_per_node = max_items_per_node;
        self
    }

    /// Check that both limits are at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth < 1 {
            return Err(QuadtreeError::InvalidArgument("max depth must be at least 1"));
        }
        if self.max_items_per_node < 1 {
            return Err(QuadtreeError::InvalidArgument(
                "max items per node must be at least 1",
            ));
        }
        Ok(())
    }
}
