//! The widget tree: arena-stored nodes with parent back-pointers.
//!
//! Nodes own their widgets and their children; parents are non-owning
//! back-references used for bubbling and absolute-coordinate accumulation.
//! A node's rectangle is expressed in parent-local coordinates. Child order
//! is paint order (first child painted first, so the last child is
//! topmost); hit testing walks it in reverse.

use crate::bus::Address;
use crate::widgets::Widget;
use indexmap::IndexMap;
use trellis_core::geometry::Rect;
use trellis_core::math::Vec2;

/// Node identifier in the widget tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

bitflags::bitflags! {
    /// Per-node interaction flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Drawn and hit-testable; hiding a node hides its subtree.
        const VISIBLE = 0b0001;
        /// Participates in hit testing and event delivery.
        const ENABLED = 0b0010;
        /// May claim keyboard focus on click.
        const FOCUSABLE = 0b0100;
        /// Transparent to hit testing; pointer events fall through to
        /// whatever is beneath. Children still participate.
        const PASSTHROUGH = 0b1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        NodeFlags::VISIBLE | NodeFlags::ENABLED
    }
}

/// Errors from tree structure operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The referenced node is not in the tree.
    NodeNotFound(NodeId),
    /// The operation would corrupt the hierarchy (reparenting a node onto
    /// itself or one of its descendants, or moving the root). The tree is
    /// left unchanged.
    InvalidChildOperation,
    /// The parent chain does not terminate; the tree invariant is broken.
    CycleDetected,
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::NodeNotFound(id) => write!(f, "node {:?} not found", id),
            TreeError::InvalidChildOperation => write!(f, "invalid child operation"),
            TreeError::CycleDetected => write!(f, "cycle detected in widget tree"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// A node in the widget tree.
pub struct Node {
    pub widget: Box<dyn Widget>,
    /// Bounding rectangle in parent-local coordinates.
    pub rect: Rect<f32>,
    pub parent: Option<NodeId>,
    /// Paint order: first entry is painted first (bottom-most).
    pub children: Vec<NodeId>,
    pub flags: NodeFlags,
    /// Bus address, assigned when the node is registered with a [`Ui`].
    ///
    /// [`Ui`]: crate::Ui
    pub address: Option<Address>,
}

/// Widget tree managing node storage and hierarchy.
pub struct WidgetTree {
    nodes: IndexMap<NodeId, Node>,
    root: Option<NodeId>,
    next_id: usize,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            root: None,
            next_id: 0,
        }
    }

    /// Add a widget to the tree as an orphan and return its id. Attach it
    /// with [`WidgetTree::add_child`] or make it the root.
    pub fn insert(&mut self, widget: Box<dyn Widget>, rect: Rect<f32>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                widget,
                rect,
                parent: None,
                children: Vec::new(),
                flags: NodeFlags::default(),
                address: None,
            },
        );
        id
    }

    /// Make an orphan node the root of the tree.
    pub fn set_root(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?;
        if node.parent.is_some() {
            return Err(TreeError::InvalidChildOperation);
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Attach `child` as the topmost child of `parent`, detaching it from
    /// its current parent first. Attaching a node to itself, to one of its
    /// own descendants, or moving the root is rejected with
    /// [`TreeError::InvalidChildOperation`] and the tree is left unchanged.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(TreeError::NodeNotFound(child));
        }
        if parent == child || Some(child) == self.root {
            return Err(TreeError::InvalidChildOperation);
        }
        // Reject before mutating: the new parent must not sit below child.
        if self.is_descendant_of(parent, child)? {
            return Err(TreeError::InvalidChildOperation);
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Remove a node and its entire subtree. Returns the removed ids
    /// (depth-first, starting with `id`) so callers can release any state
    /// keyed on them.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        if !self.nodes.contains_key(&id) {
            return Err(TreeError::NodeNotFound(id));
        }
        self.detach(id);
        let removed = self.collect_subtree(id);
        for node_id in &removed {
            self.nodes.shift_remove(node_id);
            if self.root == Some(*node_id) {
                self.root = None;
            }
        }
        Ok(removed)
    }

    /// Move a node to the end of its parent's child list (topmost).
    pub fn bring_to_front(&mut self, id: NodeId) -> TreeResult<()> {
        let parent = self.parent_of(id)?;
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != id);
            parent_node.children.push(id);
        }
        Ok(())
    }

    /// Move a node to the start of its parent's child list (bottom-most).
    pub fn send_to_back(&mut self, id: NodeId) -> TreeResult<()> {
        let parent = self.parent_of(id)?;
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != id);
            parent_node.children.insert(0, id);
        }
        Ok(())
    }

    fn parent_of(&self, id: NodeId) -> TreeResult<NodeId> {
        self.nodes
            .get(&id)
            .ok_or(TreeError::NodeNotFound(id))?
            .parent
            .ok_or(TreeError::InvalidChildOperation)
    }

    /// Detach a node from its parent, leaving it an orphan in the arena.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    fn collect_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            out.push(node_id);
            if let Some(node) = self.nodes.get(&node_id) {
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// Whether `node` sits somewhere below `ancestor`. Walks the parent
    /// chain with a step bound; a chain longer than the arena means the
    /// parent pointers form a cycle.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> TreeResult<bool> {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            steps += 1;
            if steps > self.nodes.len() {
                return Err(TreeError::CycleDetected);
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        Ok(false)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn widget(&self, id: NodeId) -> Option<&dyn Widget> {
        self.nodes.get(&id).map(|n| &*n.widget)
    }

    pub fn widget_mut(&mut self, id: NodeId) -> Option<&mut dyn Widget> {
        self.nodes.get_mut(&id).map(|n| &mut *n.widget)
    }

    /// A node's rectangle in parent-local coordinates.
    pub fn rect(&self, id: NodeId) -> Option<Rect<f32>> {
        self.nodes.get(&id).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect<f32>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect = rect;
        }
    }

    pub fn set_position(&mut self, id: NodeId, pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect.x = pos.x;
            node.rect.y = pos.y;
        }
    }

    /// A node's rectangle in absolute coordinates, accumulated over its
    /// ancestor offsets.
    pub fn absolute_rect(&self, id: NodeId) -> Option<Rect<f32>> {
        let node = self.nodes.get(&id)?;
        let mut rect = node.rect;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.nodes.get(&parent_id)?;
            rect.x += parent.rect.x;
            rect.y += parent.rect.y;
            current = parent.parent;
        }
        Some(rect)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(NodeFlags::VISIBLE, visible);
        }
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(NodeFlags::ENABLED, enabled);
        }
    }

    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(NodeFlags::FOCUSABLE, focusable);
        }
    }

    pub fn set_passthrough(&mut self, id: NodeId, passthrough: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(NodeFlags::PASSTHROUGH, passthrough);
        }
    }

    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes
            .get(&id)
            .map(|n| n.flags)
            .unwrap_or(NodeFlags::empty())
    }

    /// Whether a node and every ancestor up to the root are visible and
    /// enabled. Nodes failing this are neither drawn nor delivered events.
    pub fn is_interactive(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(&node_id) else {
                return false;
            };
            if !node.flags.contains(NodeFlags::VISIBLE | NodeFlags::ENABLED) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Iterate a node's ancestors from its parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.nodes.get(&id).and_then(|n| n.parent);
            Some(id)
        })
    }

    pub fn set_address(&mut self, id: NodeId, address: Address) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.address = Some(address);
        }
    }

    pub fn address(&self, id: NodeId) -> Option<Address> {
        self.nodes.get(&id).and_then(|n| n.address)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.next_id = 0;
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}
