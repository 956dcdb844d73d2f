//! Tree operations: insert, remove, reparent, walk, observe.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId, NodeKind};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// A recorded child-list change, grouped per flush by the observers built on
/// top of the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildListChange {
    /// The node whose child list (or assigned-node list, for slots) changed.
    pub parent: NodeId,
    /// Nodes added to the list.
    pub added: Vec<NodeId>,
    /// Nodes removed from the list.
    pub removed: Vec<NodeId>,
}

/// The node tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is
/// O(1). Child-list changes are recorded into a journal once journaling is
/// enabled; draining the journal yields one batch per synchronous block.
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    journal: Vec<ChildListChange>,
    journaling: bool,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            journal: Vec::new(),
            journaling: false,
        }
    }

    /// Insert a detached node (no parent).
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        self.record(parent, vec![id], Vec::new());
        id
    }

    /// Remove a node and all its descendants recursively.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't
    /// exist. Only the detachment of the top node is journaled; interior
    /// child-list changes of the removed subtree are not observable.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
            self.record(parent_id, Vec::new(), vec![id]);
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            // Queue children before removing.
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Remove every child subtree of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        for child in self.children(parent).to_vec() {
            self.remove(child);
        }
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// The node keeps its subtree intact. If `node` was previously a child of
    /// another parent, it is detached first.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either `node` or `new_parent` does not exist.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(self.nodes.contains_key(node), "node does not exist");
        debug_assert!(
            self.nodes.contains_key(new_parent),
            "new_parent does not exist"
        );

        // Detach from old parent.
        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
            self.record(old_parent, Vec::new(), vec![node]);
        }

        // Attach to new parent.
        self.parent.insert(node, new_parent);
        self.children
            .get_mut(new_parent)
            .expect("new_parent must have children vec")
            .push(node);
        self.record(new_parent, vec![node], Vec::new());
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Whether a node is currently attached under some parent.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.parent.contains_key(id)
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Concatenated content of every text node in the subtree rooted at
    /// `start`, in document order.
    pub fn text_content(&self, start: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get(current) {
                if let Some(text) = data.text_content() {
                    out.push_str(text);
                }
                for &child in self.children(current).iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    // -- slots --------------------------------------------------------------

    /// Assign a detached node into a slot. The node becomes part of the
    /// slot's rendered output without becoming a tree child of the slot.
    pub fn assign_to_slot(&mut self, slot: NodeId, node: NodeId) {
        if let Some(NodeKind::Slot { assigned }) = self.nodes.get_mut(slot).map(|d| &mut d.kind) {
            if !assigned.contains(&node) {
                assigned.push(node);
                self.record(slot, vec![node], Vec::new());
            }
        }
    }

    /// Remove a node from a slot's assigned list.
    pub fn unassign_from_slot(&mut self, slot: NodeId, node: NodeId) {
        if let Some(NodeKind::Slot { assigned }) = self.nodes.get_mut(slot).map(|d| &mut d.kind) {
            let before = assigned.len();
            assigned.retain(|&n| n != node);
            if assigned.len() != before {
                self.record(slot, Vec::new(), vec![node]);
            }
        }
    }

    /// The children of `parent` with one level of slot indirection resolved:
    /// a slot child contributes its assigned nodes, or its own children as
    /// fallback content when nothing is assigned.
    pub fn effective_children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in self.children(parent) {
            match self.nodes.get(child).map(|d| &d.kind) {
                Some(NodeKind::Slot { assigned }) => {
                    if assigned.is_empty() {
                        out.extend_from_slice(self.children(child));
                    } else {
                        out.extend_from_slice(assigned);
                    }
                }
                _ => out.push(child),
            }
        }
        out
    }

    // -- mutation journal ---------------------------------------------------

    /// Start recording child-list changes. Idempotent.
    pub fn enable_journal(&mut self) {
        self.journaling = true;
    }

    /// Whether child-list changes are currently being recorded.
    pub fn journaling(&self) -> bool {
        self.journaling
    }

    /// Drain all recorded child-list changes since the previous drain.
    pub fn take_changes(&mut self) -> Vec<ChildListChange> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, parent: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.journaling {
            self.journal.push(ChildListChange {
                parent,
                added,
                removed,
            });
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
