// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Quadtree` API: item lifecycle, queries, and growth.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

use crate::config::QuadtreeConfig;
use crate::error::{QuadtreeError, Result};
use crate::item::SpatialItem;
use crate::node::{Node, NodeRef};
use crate::region::{Region, is_proper_rect, rect_contains_point};
use crate::types::{NodeId, Quadrant, TypeMask};

/// Reverse index entry: the latest snapshot of an item and the leaf holding it.
#[derive(Clone, Debug)]
pub(crate) struct Entry<I> {
    pub(crate) item: I,
    pub(crate) node: NodeId,
}

/// An adaptive quadtree over movable, type-tagged items.
///
/// Leaves split into four quadrants once they would hold more than
/// [`max_items_per_node`](Self::max_items_per_node) items, until
/// [`max_depth`](Self::max_depth) is reached. Each item is stored in exactly
/// one leaf, chosen by the center of its bounding box; a reverse index from
/// item identity to leaf makes moves and removals independent of tree size.
///
/// Mutating operations take `&mut self` and queries take `&self`, so the
/// borrow checker provides the single-writer, many-readers discipline the
/// structure needs. Use [`SharedQuadtree`](crate::SharedQuadtree) to share a
/// tree across threads.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Circle, Point, Rect, Size};
/// use understory_quadtree::{Item, Quadtree, TypeMask};
///
/// const SHIP: TypeMask = TypeMask::from_bits_retain(1);
/// const ROCK: TypeMask = TypeMask::from_bits_retain(2);
///
/// let mut tree = Quadtree::try_new(Rect::new(0.0, 0.0, 1000.0, 1000.0), 6, 8).unwrap();
/// tree.add_item(Item::centered(1_u32, Point::new(100.0, 100.0), Size::new(10.0, 10.0), SHIP)).unwrap();
/// tree.add_item(Item::centered(2_u32, Point::new(120.0, 100.0), Size::new(30.0, 30.0), ROCK)).unwrap();
///
/// let near = tree.query(&Circle::new((100.0, 100.0), 10.0), TypeMask::empty());
/// assert_eq!(near.len(), 2);
///
/// let rocks = tree.query(&Circle::new((100.0, 100.0), 10.0), ROCK);
/// assert!(rocks.contains(&2));
/// ```
pub struct Quadtree<I: SpatialItem> {
    pub(crate) nodes: Vec<Node<I::Id>>,
    pub(crate) root: NodeId,
    pub(crate) entries: HashMap<I::Id, Entry<I>>,
    pub(crate) max_depth: u32,
    pub(crate) max_items_per_node: usize,
}

impl<I: SpatialItem> fmt::Debug for Quadtree<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quadtree")
            .field("world", &self.world())
            .field("nodes", &self.nodes.len())
            .field("items", &self.entries.len())
            .field("max_depth", &self.max_depth)
            .field("max_items_per_node", &self.max_items_per_node)
            .finish_non_exhaustive()
    }
}

impl<I: SpatialItem> fmt::Display for Quadtree<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let world = self.world();
        write!(
            f,
            "Quadtree {} x {}, {} items",
            world.width(),
            world.height(),
            self.entries.len()
        )
    }
}

impl<I: SpatialItem> Quadtree<I> {
    /// Create a tree over `world` with explicit limits.
    ///
    /// Fails with [`QuadtreeError::InvalidArgument`] if either limit is zero or
    /// `world` is not finite with positive width and height.
    pub fn try_new(world: Rect, max_depth: u32, max_items_per_node: usize) -> Result<Self> {
        Self::with_config(
            world,
            QuadtreeConfig {
                max_depth,
                max_items_per_node,
            },
        )
    }

    /// Create a tree over `world` with the default limits.
    pub fn new(world: Rect) -> Result<Self> {
        Self::with_config(world, QuadtreeConfig::default())
    }

    /// Create a tree over `world` with the limits from `config`.
    pub fn with_config(world: Rect, config: QuadtreeConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            tracing::warn!(?config, "rejected quadtree configuration");
            return Err(err);
        }
        if !is_proper_rect(&world) {
            tracing::warn!(?world, "rejected degenerate world region");
            return Err(QuadtreeError::InvalidArgument(
                "world region must be finite with positive width and height",
            ));
        }
        Ok(Self {
            nodes: alloc::vec![Node::new(world, None)],
            root: NodeId::new(0),
            entries: HashMap::new(),
            max_depth: config.max_depth,
            max_items_per_node: config.max_items_per_node,
        })
    }

    /// Region covered by the root node.
    pub fn world(&self) -> Rect {
        self.nodes[self.root.idx()].region
    }

    /// Maximum node depth. Grows by one with every [`grow`](Self::grow).
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of items a leaf may hold before it splits.
    pub fn max_items_per_node(&self) -> usize {
        self.max_items_per_node
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nodes, including empty leaves left behind by removals.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether an item with this identity is stored.
    pub fn contains(&self, id: &I::Id) -> bool {
        self.entries.contains_key(id)
    }

    /// The stored snapshot of an item, as passed to the last add or move.
    pub fn get(&self, id: &I::Id) -> Option<&I> {
        self.entries.get(id).map(|e| &e.item)
    }

    /// The node currently holding an item.
    pub fn node_of(&self, id: &I::Id) -> Option<NodeId> {
        self.entries.get(id).map(|e| e.node)
    }

    /// Iterate over every stored item, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &I> + '_ {
        self.entries.values().map(|e| &e.item)
    }

    /// View of the root node.
    pub fn root(&self) -> NodeRef<'_, I> {
        NodeRef::at(self, self.root)
    }

    /// View of a node, or `None` if the handle did not come from this tree.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, I>> {
        NodeRef::new(self, id)
    }

    /// Add an item, or re-insert it from the root if its identity is already stored.
    ///
    /// Fails with [`QuadtreeError::InvalidItem`] if the item's type mask is
    /// empty and with [`QuadtreeError::OutOfBounds`] if its location lies
    /// outside [`world`](Self::world); the tree is unchanged in both cases.
    pub fn add_item(&mut self, item: I) -> Result<()> {
        self.validate(&item)?;
        self.insert_validated(item)
    }

    /// Update an item after its geometry or type mask changed.
    ///
    /// If the leaf holding the item still contains its whole bounding box, only
    /// the stored snapshot is replaced. Otherwise the item is taken out and
    /// re-inserted from the root, since it may have moved arbitrarily far.
    /// Unknown items are added. Fails like [`add_item`](Self::add_item), without
    /// changing the tree.
    pub fn move_item(&mut self, item: I) -> Result<()> {
        self.validate(&item)?;
        let id = item.id();
        if let Some(entry) = self.entries.get_mut(&id) {
            let region = self.nodes[entry.node.idx()].region;
            if region.encloses_rect(&item.bounding_box()) {
                entry.item = item;
                tracing::trace!(?id, node = entry.node.idx(), "moved item within its leaf");
                return Ok(());
            }
        }
        self.insert_validated(item)
    }

    fn insert_validated(&mut self, item: I) -> Result<()> {
        let id = item.id();
        self.detach(&id);
        let center = item.bounding_box().center();
        let node = self
            .insert_at(self.root, id, center)?
            .ok_or(QuadtreeError::Consistency(
                "detached item is still present in its target leaf",
            ))?;
        tracing::trace!(?id, node = node.idx(), "added item");
        self.entries.insert(id, Entry { item, node });
        Ok(())
    }

    /// Remove an item. Returns `false` if no item with this identity is stored.
    ///
    /// Leaves emptied by removals are kept; nodes are never merged.
    pub fn remove_item(&mut self, id: &I::Id) -> bool {
        let removed = self.detach(id).is_some();
        if removed {
            tracing::trace!(?id, "removed item");
        }
        removed
    }

    /// Remove every item, keeping the node structure.
    pub fn clear(&mut self) {
        self.entries.clear();
        for node in &mut self.nodes {
            node.items.clear();
        }
    }

    /// Double the world region and add a new root above the current one.
    ///
    /// The world keeps its upper-left corner and extends right and down; the
    /// old root becomes the new root's [`Quadrant::UpperLeft`] child, so every
    /// existing item and [`NodeId`] stays valid. [`max_depth`](Self::max_depth)
    /// increases by one.
    pub fn grow(&mut self) {
        let old_root = self.root;
        let old = self.world();
        let world = Rect::new(
            old.x0,
            old.y0,
            old.x0 + old.width() * 2.0,
            old.y0 + old.height() * 2.0,
        );
        let new_root = self.push_node(world, None);
        let children = Quadrant::ALL.map(|q| match q {
            Quadrant::UpperLeft => old_root,
            _ => self.push_node(q.sub_rect(world), Some(new_root)),
        });
        self.nodes[new_root.idx()].children = Some(children);
        self.nodes[old_root.idx()].parent = Some(new_root);
        self.root = new_root;
        self.max_depth += 1;
        tracing::debug!(?world, max_depth = self.max_depth, "grew quadtree");
    }

    /// Collect the identities of items overlapping `region` that carry every bit of `filter`.
    ///
    /// An empty `filter` matches every item. Edges count as overlapping.
    ///
    /// Items are reached through the leaf holding the center of their bounding
    /// box. A box reaching past that leaf is not found by a query that touches
    /// only the overhang.
    pub fn query<R: Region + ?Sized>(&self, region: &R, filter: TypeMask) -> HashSet<I::Id> {
        let mut found = HashSet::new();
        self.walk(region, filter, |item| {
            found.insert(item.id());
        });
        found
    }

    /// Like [`query`](Self::query), but fills `found` (clearing it first).
    ///
    /// Returns whether anything was found.
    pub fn query_into<R: Region + ?Sized>(
        &self,
        region: &R,
        filter: TypeMask,
        found: &mut HashSet<I::Id>,
    ) -> bool {
        found.clear();
        self.walk(region, filter, |item| {
            found.insert(item.id());
        });
        !found.is_empty()
    }

    /// [`query`](Self::query) without a type filter.
    pub fn query_any<R: Region + ?Sized>(&self, region: &R) -> HashSet<I::Id> {
        self.query(region, TypeMask::empty())
    }

    /// Visit items overlapping `region` that carry every bit of `filter`
    /// (does not allocate result storage).
    ///
    /// Each matching item is visited once; the order is unspecified.
    pub fn visit<R, F>(&self, region: &R, filter: TypeMask, f: F)
    where
        R: Region + ?Sized,
        F: FnMut(&I),
    {
        self.walk(region, filter, f);
    }

    fn validate(&self, item: &I) -> Result<()> {
        if item.type_mask().is_empty() {
            tracing::warn!(id = ?item.id(), "rejected item with an empty type mask");
            return Err(QuadtreeError::InvalidItem);
        }
        let location = item.location();
        let world = self.world();
        if !rect_contains_point(&world, location) {
            tracing::warn!(id = ?item.id(), ?location, "rejected item outside the world region");
            return Err(QuadtreeError::OutOfBounds { location, world });
        }
        Ok(())
    }

    /// Take an item out of its leaf and the reverse index.
    fn detach(&mut self, id: &I::Id) -> Option<Entry<I>> {
        let entry = self.entries.remove(id)?;
        if let Ok(node) = self.node_data_mut(entry.node) {
            node.items.remove(id);
        }
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use alloc::format;
    use alloc::vec;
    use kurbo::{Circle, Point, Size};

    const P1: TypeMask = TypeMask::from_bits_retain(1);
    const P2: TypeMask = TypeMask::from_bits_retain(2);
    const P3: TypeMask = TypeMask::from_bits_retain(4);

    fn item(id: u32, x: f64, y: f64, mask: TypeMask) -> Item<u32> {
        Item::anchored(id, Point::new(x, y), Size::new(1.0, 1.0), mask)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size((x, y), (w, h))
    }

    /// World (0,0,100,100), max depth 5, ten items per node, six items.
    fn scenario_tree() -> Quadtree<Item<u32>> {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 10).unwrap();
        for it in [
            item(1, 1.0, 1.0, P1),
            item(2, 5.0, 5.0, P2),
            item(3, 25.0, 25.0, P2),
            item(4, 50.0, 50.0, P1),
            item(5, 75.0, 75.0, P3),
            item(6, 100.0, 100.0, TypeMask::ALL),
        ] {
            tree.add_item(it).unwrap();
        }
        tree
    }

    /// Check the reverse index against the node arena.
    fn assert_consistent<I: SpatialItem>(tree: &Quadtree<I>) {
        let mut held = 0;
        for (idx, node) in tree.nodes.iter().enumerate() {
            if node.children.is_some() {
                assert!(node.items.is_empty(), "internal node {idx} holds items");
            }
            for key in &node.items {
                let entry = tree.entries.get(key).expect("held item is indexed");
                assert_eq!(entry.node.idx(), idx, "reverse index names another node");
            }
            held += node.items.len();
        }
        assert_eq!(held, tree.len(), "leaf item counts must sum to the index size");
        assert_eq!(tree.root().subtree_item_count(), tree.len());
    }

    #[test]
    fn scenario_small_square() {
        let tree = scenario_tree();
        let found = tree.query(&rect(1.0, 1.0, 1.0, 1.0), P1);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&1));
    }

    #[test]
    fn scenario_oversized_square() {
        let tree = scenario_tree();
        let found = tree.query(&rect(-1.0, -1.0, 102.0, 102.0), P1);
        assert_eq!(found.len(), 3);
        for id in [1, 4, 6] {
            assert!(found.contains(&id), "missing item {id}");
        }
    }

    #[test]
    fn scenario_oversized_circle() {
        let tree = scenario_tree();
        let found = tree.query(&Circle::new((50.0, 50.0), 100.0), P1);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn scenario_tangent_square() {
        let tree = scenario_tree();
        let found = tree.query(&rect(0.0, 0.0, 1.0, 1.0), P1);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&1));
    }

    #[test]
    fn scenario_circles() {
        let tree = scenario_tree();
        assert_eq!(tree.query(&Circle::new((1.0, 1.0), 1.0), P1).len(), 1);
        assert_eq!(tree.query(&Circle::new((1.0, 2.0), 1.0), P1).len(), 1);

        let found = tree.query(&Circle::new((3.0, 3.0), 5.0), P2);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&2));
    }

    #[test]
    fn filter_requires_every_requested_bit() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 3, 4).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1 | P2)).unwrap();
        tree.add_item(item(2, 12.0, 12.0, P1)).unwrap();

        let area = rect(0.0, 0.0, 50.0, 50.0);
        assert_eq!(tree.query(&area, P1).len(), 2);
        let both = tree.query(&area, P1 | P2);
        assert_eq!(both.len(), 1);
        assert!(both.contains(&1));
        assert!(tree.query(&area, P1 | P3).is_empty());
        assert_eq!(tree.query_any(&area).len(), 2);
    }

    #[test]
    fn query_into_reports_any_found_and_clears() {
        let tree = scenario_tree();
        let mut found = HashSet::new();
        assert!(tree.query_into(&rect(0.0, 0.0, 100.0, 100.0), P2, &mut found));
        assert_eq!(found.len(), 3);
        assert!(!tree.query_into(&rect(30.0, 30.0, 5.0, 5.0), P2, &mut found));
        assert!(found.is_empty());
    }

    #[test]
    fn visit_matches_query() {
        let tree = scenario_tree();
        let area = Circle::new((50.0, 50.0), 40.0);
        let mut visited = vec![];
        tree.visit(&area, TypeMask::empty(), |it| visited.push(it.id));
        let found = tree.query_any(&area);
        assert_eq!(visited.len(), found.len());
        assert!(visited.iter().all(|id| found.contains(id)));
    }

    #[test]
    fn rejects_bad_construction() {
        let world = rect(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            Quadtree::<Item<u32>>::try_new(world, 0, 10),
            Err(QuadtreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            Quadtree::<Item<u32>>::try_new(world, 5, 0),
            Err(QuadtreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            Quadtree::<Item<u32>>::try_new(Rect::new(0.0, 0.0, 0.0, 10.0), 5, 10),
            Err(QuadtreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            Quadtree::<Item<u32>>::try_new(Rect::new(0.0, 0.0, f64::NAN, 10.0), 5, 10),
            Err(QuadtreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn defaults_follow_config() {
        let tree = Quadtree::<Item<u32>>::new(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(tree.max_depth(), crate::config::DEFAULT_MAX_DEPTH);
        assert_eq!(
            tree.max_items_per_node(),
            crate::config::DEFAULT_MAX_ITEMS_PER_NODE
        );
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn rejects_bad_items_without_mutation() {
        let mut tree = scenario_tree();
        let nodes = tree.node_count();

        assert_eq!(
            tree.add_item(item(9, 10.0, 10.0, TypeMask::empty())),
            Err(QuadtreeError::InvalidItem)
        );
        let outside = item(9, 150.0, 10.0, P1);
        assert_eq!(
            tree.add_item(outside),
            Err(QuadtreeError::OutOfBounds {
                location: Point::new(150.0, 10.0),
                world: rect(0.0, 0.0, 100.0, 100.0),
            })
        );
        // A move that would leave the world keeps the item where it was.
        assert!(tree.move_item(item(1, 150.0, 1.0, P1)).is_err());
        assert_eq!(tree.get(&1).unwrap().location, Point::new(1.0, 1.0));
        assert_eq!(
            tree.move_item(item(1, 1.0, 1.0, TypeMask::empty())),
            Err(QuadtreeError::InvalidItem)
        );

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.node_count(), nodes);
        assert!(!tree.contains(&9));
        assert_consistent(&tree);
    }

    #[test]
    fn split_happens_one_past_the_limit() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 4).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 60.0, 10.0, P1)).unwrap();
        tree.add_item(item(3, 60.0, 60.0, P1)).unwrap();
        tree.add_item(item(4, 10.0, 60.0, P1)).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().item_count(), 4);
        assert_eq!(tree.node_count(), 1);

        tree.add_item(item(5, 70.0, 70.0, P1)).unwrap();
        let root = tree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.item_count(), 0);
        assert_eq!(tree.node_count(), 5);

        let count = |q| root.child(q).unwrap().item_count();
        assert_eq!(count(Quadrant::UpperRight), 1);
        assert_eq!(count(Quadrant::LowerRight), 2);
        assert_eq!(count(Quadrant::LowerLeft), 1);
        assert_eq!(count(Quadrant::UpperLeft), 1);

        let lower_right = root.child(Quadrant::LowerRight).unwrap();
        assert_eq!(lower_right.region(), rect(50.0, 50.0, 50.0, 50.0));
        assert_eq!(lower_right.depth(), 2);
        assert_eq!(tree.node_of(&5), Some(lower_right.id()));
        assert_eq!(tree.node_of(&3), Some(lower_right.id()));
        assert_consistent(&tree);
    }

    #[test]
    fn split_cascades_until_max_depth() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 3, 1).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 20.0, 20.0, P1)).unwrap();

        // Root and its upper-left child both split; the grandchild is at max depth.
        assert_eq!(tree.node_count(), 9);
        let leaf = tree.node_of(&1).unwrap();
        assert_eq!(tree.node_of(&2), Some(leaf));
        let leaf = tree.node(leaf).unwrap();
        assert_eq!(leaf.depth(), 3);
        assert_eq!(leaf.item_count(), 2);
        assert_eq!(leaf.region(), rect(0.0, 0.0, 25.0, 25.0));
        assert_consistent(&tree);
    }

    #[test]
    fn max_depth_one_never_splits() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 1, 2).unwrap();
        for i in 0..20 {
            tree.add_item(item(i, f64::from(i) * 4.0, 50.0, P1)).unwrap();
        }
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().item_count(), 20);
        assert_consistent(&tree);
    }

    #[test]
    fn split_consistency_fault_on_internal_node() {
        let mut tree = Quadtree::<Item<u32>>::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 4).unwrap();
        let root = tree.root;
        tree.split(root).unwrap();
        assert_eq!(
            tree.split(root),
            Err(QuadtreeError::Consistency("node is already split"))
        );
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn re_adding_replaces_the_previous_placement() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 1).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 80.0, 80.0, P1)).unwrap();
        tree.add_item(item(1, 80.0, 10.0, P2)).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.node(tree.node_of(&1).unwrap()).unwrap().region(),
            rect(50.0, 0.0, 50.0, 50.0)
        );
        assert!(tree.query(&rect(0.0, 0.0, 40.0, 40.0), TypeMask::empty()).is_empty());
        assert!(tree.query(&rect(50.0, 0.0, 50.0, 50.0), P2).contains(&1));
        assert_consistent(&tree);
    }

    #[test]
    fn unchanged_move_is_a_no_op() {
        let mut tree = scenario_tree();
        let node = tree.node_of(&3);
        let nodes = tree.node_count();

        tree.move_item(item(3, 25.0, 25.0, P2)).unwrap();
        assert_eq!(tree.node_of(&3), node);
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.len(), 6);
        assert_consistent(&tree);
    }

    #[test]
    fn move_within_leaf_refreshes_the_snapshot() {
        let mut tree = scenario_tree();
        let node = tree.node_of(&3);

        tree.move_item(item(3, 30.0, 30.0, P2 | P3)).unwrap();
        assert_eq!(tree.node_of(&3), node);
        assert!(tree.query(&rect(25.0, 25.0, 0.5, 0.5), P2).is_empty());
        assert!(tree.query(&rect(30.0, 30.0, 0.5, 0.5), P2 | P3).contains(&3));
    }

    #[test]
    fn move_inside_a_split_leaf_keeps_its_placement() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 1).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 80.0, 80.0, P1)).unwrap();
        let leaf = tree.node_of(&1).unwrap();
        assert_eq!(tree.node(leaf).unwrap().region(), rect(0.0, 0.0, 50.0, 50.0));
        let nodes = tree.node_count();

        // The new box touches the leaf's far corner; closed containment keeps it there.
        tree.move_item(item(1, 49.0, 49.0, P1)).unwrap();
        assert_eq!(tree.node_of(&1), Some(leaf));
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.get(&1).unwrap().location, Point::new(49.0, 49.0));
        assert!(tree.query(&rect(49.5, 49.5, 0.0, 0.0), P1).contains(&1));
        assert_consistent(&tree);
    }

    #[test]
    fn degenerate_circles_match_nothing() {
        let tree = scenario_tree();
        assert!(tree.query_any(&Circle::new((10.0, 10.0), -5.0)).is_empty());
        assert!(tree.query_any(&Circle::new((10.0, 10.0), f64::NAN)).is_empty());
        assert!(tree.query_any(&Rect::new(20.0, 20.0, 0.0, 0.0)).is_empty());
        assert_eq!(tree.query_any(&Circle::new((10.0, 10.0), 8.0)).len(), 1);
    }

    #[test]
    fn move_across_leaves_reinserts_from_the_root() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 5, 1).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 80.0, 80.0, P1)).unwrap();
        let before = tree.node_of(&1).unwrap();

        tree.move_item(item(1, 80.0, 10.0, P1)).unwrap();
        let after = tree.node_of(&1).unwrap();
        assert_ne!(before, after);
        assert_eq!(tree.node(before).unwrap().item_count(), 0);
        assert_eq!(
            tree.node(after).unwrap().region(),
            rect(50.0, 0.0, 50.0, 50.0)
        );
        assert_consistent(&tree);
    }

    #[test]
    fn move_of_unknown_item_adds_it() {
        let mut tree = scenario_tree();
        tree.move_item(item(7, 40.0, 40.0, P3)).unwrap();
        assert!(tree.contains(&7));
        assert_eq!(tree.len(), 7);
        assert_consistent(&tree);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut tree = scenario_tree();
        assert!(tree.remove_item(&4));
        assert!(!tree.remove_item(&4));
        assert!(!tree.remove_item(&42));
        assert_eq!(tree.len(), 5);
        assert!(tree.query(&rect(50.0, 50.0, 1.0, 1.0), P1).is_empty());
        assert_consistent(&tree);
    }

    #[test]
    fn clear_keeps_the_shape() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 4, 2).unwrap();
        for i in 0..16 {
            let x = f64::from(i % 4) * 25.0 + 5.0;
            let y = f64::from(i / 4) * 25.0 + 5.0;
            tree.add_item(item(i, x, y, P1)).unwrap();
        }
        let nodes = tree.node_count();
        assert!(nodes > 1);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), nodes);
        assert!(tree.query_any(&rect(0.0, 0.0, 100.0, 100.0)).is_empty());
        assert_consistent(&tree);

        tree.add_item(item(1, 5.0, 5.0, P1)).unwrap();
        assert_eq!(tree.len(), 1);
        assert_consistent(&tree);
    }

    #[test]
    fn grow_keeps_items_and_handles() {
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 100.0, 100.0), 2, 1).unwrap();
        tree.add_item(item(1, 10.0, 10.0, P1)).unwrap();
        tree.add_item(item(2, 80.0, 80.0, P1)).unwrap();
        let old_root = tree.root().id();
        let leaf = tree.node_of(&1);

        let far = item(3, 150.0, 150.0, P1);
        assert!(matches!(
            tree.add_item(far),
            Err(QuadtreeError::OutOfBounds { .. })
        ));

        tree.grow();
        assert_eq!(tree.world(), rect(0.0, 0.0, 200.0, 200.0));
        assert_eq!(tree.max_depth(), 3);
        assert_eq!(tree.node_of(&1), leaf);

        let root = tree.root();
        assert_eq!(root.depth(), 1);
        let upper_left = root.child(Quadrant::UpperLeft).unwrap();
        assert_eq!(upper_left.id(), old_root);
        assert_eq!(upper_left.depth(), 2);
        assert_eq!(
            root.child(Quadrant::LowerRight).unwrap().region(),
            rect(100.0, 100.0, 100.0, 100.0)
        );

        tree.add_item(far).unwrap();
        let everything = tree.query_any(&rect(0.0, 0.0, 200.0, 200.0));
        assert_eq!(everything.len(), 3);
        assert_consistent(&tree);
    }

    #[test]
    fn display_and_debug() {
        let tree = scenario_tree();
        assert_eq!(format!("{tree}"), "Quadtree 100 x 100, 6 items");
        assert!(format!("{tree:?}").starts_with("Quadtree {"));
    }

    /// Minimal linear congruential generator so the test stays deterministic.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self, max: f64) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            #[allow(clippy::cast_precision_loss, reason = "test data only")]
            let unit = (self.0 >> 11) as f64 / (1_u64 << 53) as f64;
            unit * max
        }
    }

    #[test]
    fn queries_match_brute_force() {
        let mut rng = Lcg(0x5eed);
        let mut tree = Quadtree::try_new(rect(0.0, 0.0, 1000.0, 1000.0), 6, 4).unwrap();
        let masks = [P1, P2, P3, P1 | P2, TypeMask::ALL];
        let mut items = vec![];
        for id in 0..300_u32 {
            let location = Point::new(rng.next_f64(1000.0), rng.next_f64(1000.0));
            // Point-sized boxes never reach outside the leaf that holds them.
            let it = Item::centered(id, location, Size::ZERO, masks[id as usize % masks.len()]);
            tree.add_item(it).unwrap();
            items.push(it);
        }
        // Move a third of the items and remove a tenth.
        for it in items.iter_mut().step_by(3) {
            *it = it.moved_to(Point::new(rng.next_f64(1000.0), rng.next_f64(1000.0)));
            tree.move_item(*it).unwrap();
        }
        for it in items.iter().step_by(10) {
            assert!(tree.remove_item(&it.id));
        }
        let live: Vec<_> = items.iter().filter(|it| tree.contains(&it.id)).collect();
        assert_eq!(live.len(), tree.len());
        assert_consistent(&tree);

        for _ in 0..40 {
            let x = rng.next_f64(1000.0);
            let y = rng.next_f64(1000.0);
            let extent = rng.next_f64(400.0);
            let area = Rect::new(x - extent, y - extent, x + extent, y + extent);
            let circle = Circle::new((x, y), extent);
            for filter in [TypeMask::empty(), P1, P2 | P1] {
                let expected: HashSet<u32> = live
                    .iter()
                    .filter(|it| it.type_mask.satisfies(filter))
                    .filter(|it| area.intersects_rect(&it.bounding_box))
                    .map(|it| it.id)
                    .collect();
                assert_eq!(tree.query(&area, filter), expected);

                let expected: HashSet<u32> = live
                    .iter()
                    .filter(|it| it.type_mask.satisfies(filter))
                    .filter(|it| circle.intersects_rect(&it.bounding_box))
                    .map(|it| it.id)
                    .collect();
                assert_eq!(tree.query(&circle, filter), expected);
            }
        }
    }
}
