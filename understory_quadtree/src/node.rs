// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree nodes: splitting, insertion by quadrant, and the region walk.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashSet;
use kurbo::{Point, Rect};
use smallvec::{SmallVec, smallvec};

use crate::error::{QuadtreeError, Result};
use crate::item::SpatialItem;
use crate::region::Region;
use crate::tree::Quadtree;
use crate::types::{NodeId, Quadrant, TypeMask};

#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    pub(crate) region: Rect,
    pub(crate) parent: Option<NodeId>,
    /// Children by quadrant index; `None` while this node is a leaf.
    pub(crate) children: Option<[NodeId; 4]>,
    /// Items held directly. Always empty once `children` is set.
    pub(crate) items: HashSet<K>,
}

impl<K> Node<K> {
    pub(crate) fn new(region: Rect, parent: Option<NodeId>) -> Self {
        Self {
            region,
            parent,
            children: None,
            items: HashSet::new(),
        }
    }

    #[inline]
    pub(crate) fn child_for(&self, point: Point) -> Option<NodeId> {
        let children = self.children?;
        Some(children[Quadrant::of(self.region.center(), point).index()])
    }
}

impl<I: SpatialItem> Quadtree<I> {
    pub(crate) fn node_data(&self, id: NodeId) -> Result<&Node<I::Id>> {
        self.nodes
            .get(id.idx())
            .ok_or(QuadtreeError::Consistency("dangling node handle"))
    }

    pub(crate) fn node_data_mut(&mut self, id: NodeId) -> Result<&mut Node<I::Id>> {
        self.nodes
            .get_mut(id.idx())
            .ok_or(QuadtreeError::Consistency("dangling node handle"))
    }

    pub(crate) fn push_node(&mut self, region: Rect, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(region, parent));
        id
    }

    /// Depth of a node, counting the root as 1.
    pub(crate) fn depth_of(&self, id: NodeId) -> u32 {
        let mut depth = 1;
        let mut current = self.nodes.get(id.idx()).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.idx()].parent;
        }
        depth
    }

    /// Turn a leaf into an internal node with four empty leaf children.
    ///
    /// The leaf's items are left in place; the caller redistributes them.
    pub(crate) fn split(&mut self, id: NodeId) -> Result<[NodeId; 4]> {
        let node = self.node_data(id)?;
        if node.children.is_some() {
            tracing::warn!(node = id.idx(), "refusing to split an internal node");
            return Err(QuadtreeError::Consistency("node is already split"));
        }
        let region = node.region;
        let children = Quadrant::ALL.map(|q| self.push_node(q.sub_rect(region), Some(id)));
        self.nodes[id.idx()].children = Some(children);
        tracing::debug!(
            node = id.idx(),
            depth = self.depth_of(id),
            "split quadtree node"
        );
        Ok(children)
    }

    /// Insert `item` into the subtree rooted at `start`, descending by the
    /// quadrant of `center` and splitting full leaves on the way.
    ///
    /// Returns the leaf now holding the item, or `None` if that leaf already
    /// held it. The caller records the returned node in the reverse index.
    /// Items moved by a split have their reverse index entries updated here.
    pub(crate) fn insert_at(
        &mut self,
        start: NodeId,
        item: I::Id,
        center: Point,
    ) -> Result<Option<NodeId>> {
        let mut id = start;
        loop {
            let node = self.node_data(id)?;
            if let Some(child) = node.child_for(center) {
                id = child;
                continue;
            }
            if node.items.contains(&item) {
                return Ok(None);
            }
            if node.items.len() + 1 > self.max_items_per_node && self.depth_of(id) < self.max_depth
            {
                self.split(id)?;
                self.redistribute(id)?;
                // `id` is internal now; the next pass descends into a child.
                continue;
            }
            self.nodes[id.idx()].items.insert(item);
            return Ok(Some(id));
        }
    }

    /// Move every item of a freshly split node into its children.
    fn redistribute(&mut self, id: NodeId) -> Result<()> {
        let held: Vec<I::Id> = self.nodes[id.idx()].items.drain().collect();
        for item in held {
            let center = self
                .entries
                .get(&item)
                .ok_or(QuadtreeError::Consistency(
                    "node holds an item missing from the reverse index",
                ))?
                .item
                .bounding_box()
                .center();
            let target = self.insert_at(id, item, center)?.ok_or(
                QuadtreeError::Consistency("split produced a duplicate item"),
            )?;
            if let Some(entry) = self.entries.get_mut(&item) {
                entry.node = target;
            }
        }
        Ok(())
    }

    /// Walk every node overlapping `region` and call `f` for each matching item.
    ///
    /// Nodes whose region lies inside `region` report their items without
    /// testing each bounding box.
    pub(crate) fn walk<R, F>(&self, region: &R, filter: TypeMask, mut f: F)
    where
        R: Region + ?Sized,
        F: FnMut(&I),
    {
        let mut stack: SmallVec<[NodeId; 32]> = smallvec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.idx()];
            if !region.intersects_rect(&node.region) {
                continue;
            }
            if !node.items.is_empty() {
                let contained = region.encloses_rect(&node.region);
                for key in &node.items {
                    let Some(entry) = self.entries.get(key) else {
                        continue;
                    };
                    let item = &entry.item;
                    if item.type_mask().satisfies(filter)
                        && (contained || region.intersects_rect(&item.bounding_box()))
                    {
                        f(item);
                    }
                }
            }
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
    }

    /// Number of items held by `id` and all of its descendants.
    pub(crate) fn subtree_len(&self, id: NodeId) -> usize {
        let mut total = 0;
        let mut stack: SmallVec<[NodeId; 32]> = smallvec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.idx()) else {
                continue;
            };
            total += node.items.len();
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
        total
    }
}

/// Read-only view of a node, for inspection and debugging.
///
/// Obtained from [`Quadtree::root`] or [`Quadtree::node`].
pub struct NodeRef<'a, I: SpatialItem> {
    tree: &'a Quadtree<I>,
    id: NodeId,
    node: &'a Node<I::Id>,
}

impl<I: SpatialItem> Clone for NodeRef<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: SpatialItem> Copy for NodeRef<'_, I> {}

impl<I: SpatialItem> Debug for NodeRef<'_, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("depth", &self.depth())
            .field("region", &self.node.region)
            .field("items", &self.node.items.len())
            .field("leaf", &self.is_leaf())
            .finish_non_exhaustive()
    }
}

impl<'a, I: SpatialItem> NodeRef<'a, I> {
    pub(crate) fn new(tree: &'a Quadtree<I>, id: NodeId) -> Option<Self> {
        let node = tree.nodes.get(id.idx())?;
        Some(Self { tree, id, node })
    }

    /// View of a handle known to be live, such as the root or a child.
    pub(crate) fn at(tree: &'a Quadtree<I>, id: NodeId) -> Self {
        Self {
            tree,
            id,
            node: &tree.nodes[id.idx()],
        }
    }

    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Region covered by this node.
    pub fn region(&self) -> Rect {
        self.node.region
    }

    /// Depth of this node; the root has depth 1.
    pub fn depth(&self) -> u32 {
        self.tree.depth_of(self.id)
    }

    /// Parent of this node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node.parent.and_then(|p| Self::new(self.tree, p))
    }

    /// Whether this node holds items directly rather than children.
    pub fn is_leaf(&self) -> bool {
        self.node.children.is_none()
    }

    /// Child covering `quadrant`, or `None` for a leaf.
    pub fn child(&self, quadrant: Quadrant) -> Option<Self> {
        let children = self.node.children?;
        Self::new(self.tree, children[quadrant.index()])
    }

    /// All four children in quadrant order, or `None` for a leaf.
    pub fn children(&self) -> Option<[Self; 4]> {
        let children = self.node.children?;
        Some(children.map(|id| Self::at(self.tree, id)))
    }

    /// Identifiers of the items held directly by this node.
    pub fn items(&self) -> impl Iterator<Item = I::Id> + 'a {
        self.node.items.iter().copied()
    }

    /// Number of items held directly by this node.
    pub fn item_count(&self) -> usize {
        self.node.items.len()
    }

    /// Number of items held by this node and all of its descendants.
    pub fn subtree_item_count(&self) -> usize {
        self.tree.subtree_len(self.id)
    }
}
