//! Node types: NodeId, NodeData, NodeKind.

use slotmap::new_key_type;

use crate::host::{ColumnState, ContainerState, TableState};
use crate::template::source::TemplateSource;

new_key_type! {
    /// Unique identifier for a tree node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// The payload carried by a tree node.
#[derive(Debug)]
pub enum NodeKind {
    /// Generic content node with no behavior of its own (render targets,
    /// cells, wrappers).
    Element,
    /// A text node.
    Text(String),
    /// An uncompiled template fragment awaiting processing.
    Fragment(TemplateSource),
    /// An insertion point: renders its assigned nodes, or its own children
    /// as fallback content when nothing is assigned.
    Slot { assigned: Vec<NodeId> },
    /// A generic composite host exposing a body renderer slot.
    Container(ContainerState),
    /// A column of a table host.
    Column(ColumnState),
    /// A table host with an item collection and row state operations.
    Table(TableState),
}

/// Data associated with a single tree node.
#[derive(Debug)]
pub struct NodeData {
    /// The node payload.
    pub kind: NodeKind,
    /// Class markers (used to classify template fragments).
    pub classes: Vec<String>,
    /// Suppresses the one-time template deprecation notice for this host.
    pub suppress_template_notice: bool,
}

impl NodeData {
    /// Create a node with the given payload and no classes.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            suppress_template_notice: false,
        }
    }

    /// A generic content node.
    pub fn element() -> Self {
        Self::new(NodeKind::Element)
    }

    /// A text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(content.into()))
    }

    /// A template fragment with the given template text.
    pub fn fragment(template: impl Into<String>) -> Self {
        Self::new(NodeKind::Fragment(TemplateSource::new(template)))
    }

    /// An empty slot. Fallback content is added as regular children.
    pub fn slot() -> Self {
        Self::new(NodeKind::Slot {
            assigned: Vec::new(),
        })
    }

    /// A generic container host.
    pub fn container(state: ContainerState) -> Self {
        Self::new(NodeKind::Container(state))
    }

    /// A table column host.
    pub fn column(state: ColumnState) -> Self {
        Self::new(NodeKind::Column(state))
    }

    /// A table host.
    pub fn table(state: TableState) -> Self {
        Self::new(NodeKind::Table(state))
    }

    /// Add a class marker (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Suppress the template deprecation notice for this host (builder).
    pub fn suppress_template_notice(mut self) -> Self {
        self.suppress_template_notice = true;
        self
    }

    /// Check whether this node has a given class marker.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The text content of a `Text` node.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(content) => Some(content),
            _ => None,
        }
    }

    /// Overwrite the content of a `Text` node. No-op for other kinds.
    pub fn set_text(&mut self, content: impl Into<String>) {
        if let NodeKind::Text(existing) = &mut self.kind {
            *existing = content.into();
        }
    }

    /// The template source payload, if this is a fragment node.
    pub fn as_fragment(&self) -> Option<&TemplateSource> {
        match &self.kind {
            NodeKind::Fragment(source) => Some(source),
            _ => None,
        }
    }

    /// Mutable template source payload, if this is a fragment node.
    pub fn as_fragment_mut(&mut self) -> Option<&mut TemplateSource> {
        match &mut self.kind {
            NodeKind::Fragment(source) => Some(source),
            _ => None,
        }
    }

    /// The container payload, if this is a container host.
    pub fn as_container(&self) -> Option<&ContainerState> {
        match &self.kind {
            NodeKind::Container(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable container payload.
    pub fn as_container_mut(&mut self) -> Option<&mut ContainerState> {
        match &mut self.kind {
            NodeKind::Container(state) => Some(state),
            _ => None,
        }
    }

    /// The column payload, if this is a column host.
    pub fn as_column(&self) -> Option<&ColumnState> {
        match &self.kind {
            NodeKind::Column(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable column payload.
    pub fn as_column_mut(&mut self) -> Option<&mut ColumnState> {
        match &mut self.kind {
            NodeKind::Column(state) => Some(state),
            _ => None,
        }
    }

    /// The table payload, if this is a table host.
    pub fn as_table(&self) -> Option<&TableState> {
        match &self.kind {
            NodeKind::Table(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable table payload.
    pub fn as_table_mut(&mut self) -> Option<&mut TableState> {
        match &mut self.kind {
            NodeKind::Table(state) => Some(state),
            _ => None,
        }
    }

    /// Whether this node is a template fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self.kind, NodeKind::Fragment(_))
    }

    /// Whether this node is a slot.
    pub fn is_slot(&self) -> bool {
        matches!(self.kind, NodeKind::Slot { .. })
    }

    /// Whether this node is a table column.
    pub fn is_column(&self) -> bool {
        matches!(self.kind, NodeKind::Column(_))
    }

    /// Whether this node is a table host.
    pub fn is_table(&self) -> bool {
        matches!(self.kind, NodeKind::Table(_))
    }
}
