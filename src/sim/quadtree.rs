//! Region quadtree over point-located items
//!
//! Nodes live in a flat arena and refer to their children by index, so a
//! reset is a `Vec::clear` and nothing is freed node by node. The tree stores
//! an item's slot handle together with the position it was inserted at; it
//! never owns the entity itself.
//!
//! Subdivision is lazy: a leaf splits only when an insert would push it past
//! `capacity`, and on splitting it hands every held item down to the four
//! children. An internal node therefore never holds items directly.

use glam::Vec2;

use crate::Rect;
use crate::consts::{MAX_DEPTH, NODE_CAPACITY};

/// Index of a node inside the arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy)]
struct Item {
    slot: usize,
    pos: Vec2,
}

#[derive(Debug, Clone)]
struct Node {
    boundary: Rect,
    depth: u32,
    /// NW, NE, SW, SE
    children: Option<[NodeId; 4]>,
    items: Vec<Item>,
}

impl Node {
    fn leaf(boundary: Rect, depth: u32) -> Self {
        Self {
            boundary,
            depth,
            children: None,
            items: Vec::new(),
        }
    }
}

/// Which quadrant of `boundary` owns `pos` (0 = NW, 1 = NE, 2 = SW, 3 = SE)
///
/// Routing by the midpoint keeps every in-bounds point on exactly one path,
/// including points on the split lines.
#[inline]
fn quadrant_index(boundary: &Rect, pos: Vec2) -> usize {
    let mid = boundary.center();
    let east = (pos.x >= mid.x) as usize;
    let south = (pos.y >= mid.y) as usize;
    east + 2 * south
}

/// Adaptive spatial partition, rebuilt from scratch every frame
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    capacity: usize,
    max_depth: u32,
    len: usize,
    /// Store epoch this tree was built from (None until built from a store)
    source_epoch: Option<u64>,
}

impl QuadTree {
    /// Create a single-leaf tree covering `bounds`
    pub fn new(bounds: Rect, capacity: usize) -> Self {
        Self::with_max_depth(bounds, capacity, MAX_DEPTH)
    }

    pub fn with_max_depth(bounds: Rect, capacity: usize, max_depth: u32) -> Self {
        Self {
            nodes: vec![Node::leaf(bounds, 0)],
            capacity: capacity.max(1),
            max_depth,
            len: 0,
            source_epoch: None,
        }
    }

    /// Discard every node and start over with one leaf covering `bounds`.
    /// The arena allocation is kept for the next build.
    pub fn reset(&mut self, bounds: Rect) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(bounds, 0));
        self.len = 0;
        self.source_epoch = None;
    }

    /// Index `slot` at `pos`.
    ///
    /// Returns `false` (and indexes nothing) if `pos` is outside the root
    /// boundary. Callers keep positions inside the world, so this only
    /// happens on a broken motion step.
    pub fn insert(&mut self, slot: usize, pos: Vec2) -> bool {
        if !self.nodes[ROOT].boundary.contains(pos) {
            log::trace!("quadtree: slot {} at {:?} outside bounds, not indexed", slot, pos);
            return false;
        }

        let mut id = ROOT;
        loop {
            if let Some(children) = self.nodes[id].children {
                id = children[quadrant_index(&self.nodes[id].boundary, pos)];
                continue;
            }

            let node = &mut self.nodes[id];
            if node.items.len() < self.capacity || node.depth >= self.max_depth {
                node.items.push(Item { slot, pos });
                self.len += 1;
                return true;
            }

            // Full leaf: split and retry from the same node, which now routes to a child
            self.subdivide(id);
        }
    }

    fn subdivide(&mut self, id: NodeId) {
        let boundary = self.nodes[id].boundary;
        let depth = self.nodes[id].depth + 1;

        let first = self.nodes.len();
        for quadrant in boundary.quadrants() {
            self.nodes.push(Node::leaf(quadrant, depth));
        }
        let children = [first, first + 1, first + 2, first + 3];

        let items = std::mem::take(&mut self.nodes[id].items);
        self.nodes[id].children = Some(children);

        // At most `capacity` items move down, so no child can overflow here
        for item in items {
            let child = children[quadrant_index(&boundary, item.pos)];
            self.nodes[child].items.push(item);
        }
    }

    /// Slots whose indexed position lies inside `range`
    pub fn query_range(&self, range: &Rect) -> Vec<usize> {
        let mut found = Vec::new();
        self.query_range_into(range, &mut found);
        found
    }

    /// Allocation-free variant of [`query_range`](Self::query_range); appends to `found`
    pub fn query_range_into(&self, range: &Rect, found: &mut Vec<usize>) {
        self.query_node(ROOT, range, found);
    }

    fn query_node(&self, id: NodeId, range: &Rect, found: &mut Vec<usize>) {
        let node = &self.nodes[id];
        if !node.boundary.intersects(range) {
            return;
        }

        found.extend(
            node.items
                .iter()
                .filter(|item| range.contains(item.pos))
                .map(|item| item.slot),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_node(child, range, found);
            }
        }
    }

    /// Every node boundary, root first, children in NW, NE, SW, SE order
    pub fn debug_rects(&self) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(self.nodes.len());
        self.collect_rects(ROOT, &mut rects);
        rects
    }

    fn collect_rects(&self, id: NodeId, rects: &mut Vec<Rect>) {
        let node = &self.nodes[id];
        rects.push(node.boundary);
        if let Some(children) = node.children {
            for child in children {
                self.collect_rects(child, rects);
            }
        }
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[ROOT].boundary
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of nodes (a fresh tree has one)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn source_epoch(&self) -> Option<u64> {
        self.source_epoch
    }

    pub(crate) fn set_source_epoch(&mut self, epoch: u64) {
        self.source_epoch = Some(epoch);
    }
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::new(crate::default_world(), NODE_CAPACITY)
    }
}
