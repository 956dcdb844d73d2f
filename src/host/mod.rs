//! Host-side contracts: renderer slots and the composite hosts that expose
//! them (generic containers, table columns, tables).
//!
//! A renderer slot is a named property holding a callback of
//! `(node, owner, model)`. Hosts call whatever is installed to fill a region;
//! the binding layer only ever reads a slot (to detect conflicts) and writes
//! a new value. Renderers installed by the binding layer carry a marker so
//! they may be overwritten by later bindings, unlike user-supplied ones.

pub mod table;

use std::fmt;
use std::rc::Rc;

use crate::dom::node::{NodeData, NodeId, NodeKind};
use crate::dom::Dom;
use crate::model::Model;
use crate::templatizer::TemplatizerId;

pub use table::{ItemsSource, TableEvent, TableState};

// ---------------------------------------------------------------------------
// SlotKind
// ---------------------------------------------------------------------------

/// The renderer slots a host may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The main content region (a container's body, a column's cells).
    Body,
    /// A column's header region.
    Header,
    /// A column's footer region.
    Footer,
    /// A column's cell-editor region.
    Editor,
    /// A table's per-row details region.
    RowDetails,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotKind::Body => "body",
            SlotKind::Header => "header",
            SlotKind::Footer => "footer",
            SlotKind::Editor => "editor",
            SlotKind::RowDetails => "row-details",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// A user-supplied renderer callback: `(tree, node, owner, model)`.
pub type RendererFn = Rc<dyn Fn(&mut Dom, NodeId, NodeId, &Model)>;

/// The value held by a renderer slot.
#[derive(Clone)]
pub enum Renderer {
    /// Installed by the template binding layer; carries the templatizer that
    /// serves the slot. May be overwritten by a later binding.
    Adapter(TemplatizerId),
    /// Supplied directly by the application. Never overwritten; a template
    /// binding targeting the same slot is a configuration error.
    User(RendererFn),
}

impl Renderer {
    /// Wrap a user callback.
    pub fn user(f: impl Fn(&mut Dom, NodeId, NodeId, &Model) + 'static) -> Self {
        Renderer::User(Rc::new(f))
    }

    /// Whether this renderer was installed by the binding layer.
    pub fn is_adapter(&self) -> bool {
        matches!(self, Renderer::Adapter(_))
    }

    /// The templatizer behind an adapter-installed renderer.
    pub fn templatizer(&self) -> Option<TemplatizerId> {
        match self {
            Renderer::Adapter(id) => Some(*id),
            Renderer::User(_) => None,
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Adapter(id) => f.debug_tuple("Adapter").field(id).finish(),
            Renderer::User(_) => f.write_str("User(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Host payloads
// ---------------------------------------------------------------------------

/// A generic composite host: exposes a single body renderer slot.
#[derive(Debug, Default)]
pub struct ContainerState {
    /// The body renderer.
    pub renderer: Option<Renderer>,
}

impl ContainerState {
    /// Create a container with an empty renderer slot.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A table column: exposes body, header, footer, and editor renderer slots,
/// and carries a declared reference to its owning table.
#[derive(Debug, Default)]
pub struct ColumnState {
    /// The owning table, set when the column is wired into one.
    pub table: Option<NodeId>,
    /// The cell body renderer.
    pub renderer: Option<Renderer>,
    /// The header renderer.
    pub header_renderer: Option<Renderer>,
    /// The footer renderer.
    pub footer_renderer: Option<Renderer>,
    /// The cell editor renderer.
    pub editor_renderer: Option<Renderer>,
}

impl ColumnState {
    /// Create a detached column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a column declaring its owning table.
    pub fn for_table(table: NodeId) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Slot access on NodeData
// ---------------------------------------------------------------------------

impl NodeData {
    /// Immutable access to a renderer slot. Returns `None` when this node
    /// kind does not expose the slot.
    pub fn renderer_slot(&self, slot: SlotKind) -> Option<&Option<Renderer>> {
        match (&self.kind, slot) {
            (NodeKind::Container(state), SlotKind::Body) => Some(&state.renderer),
            (NodeKind::Column(state), SlotKind::Body) => Some(&state.renderer),
            (NodeKind::Column(state), SlotKind::Header) => Some(&state.header_renderer),
            (NodeKind::Column(state), SlotKind::Footer) => Some(&state.footer_renderer),
            (NodeKind::Column(state), SlotKind::Editor) => Some(&state.editor_renderer),
            (NodeKind::Table(state), SlotKind::RowDetails) => Some(&state.row_details_renderer),
            _ => None,
        }
    }

    /// Mutable access to a renderer slot. Returns `None` when this node kind
    /// does not expose the slot.
    pub fn renderer_slot_mut(&mut self, slot: SlotKind) -> Option<&mut Option<Renderer>> {
        match (&mut self.kind, slot) {
            (NodeKind::Container(state), SlotKind::Body) => Some(&mut state.renderer),
            (NodeKind::Column(state), SlotKind::Body) => Some(&mut state.renderer),
            (NodeKind::Column(state), SlotKind::Header) => Some(&mut state.header_renderer),
            (NodeKind::Column(state), SlotKind::Footer) => Some(&mut state.footer_renderer),
            (NodeKind::Column(state), SlotKind::Editor) => Some(&mut state.editor_renderer),
            (NodeKind::Table(state), SlotKind::RowDetails) => {
                Some(&mut state.row_details_renderer)
            }
            _ => None,
        }
    }

    /// The renderer currently installed in `slot`, if the slot exists and is
    /// occupied.
    pub fn installed_renderer(&self, slot: SlotKind) -> Option<&Renderer> {
        self.renderer_slot(slot).and_then(|s| s.as_ref())
    }
}
