//! # stencil-bridge
//!
//! A legacy template bridge for declarative widget frameworks: keeps the old
//! template-in-markup authoring style working against hosts that expose the
//! newer renderer-callback extension API.
//!
//! Composite hosts (tables, columns, generic containers) customize regions
//! through renderer slots — named properties holding `(node, owner, model)`
//! callbacks. This crate discovers template fragments declared as host
//! children, compiles each one once, and installs adapter renderers that
//! stamp and update independently-bindable template instances. Property
//! changes flow both ways: host properties fan out to every live instance,
//! and edits made inside an instance are routed back to the host — including
//! rewriting a row item's nested-field edit into a mutation of the table's
//! item collection, guarded against feedback loops.
//!
//! Everything is synchronous and single-threaded: work happens inside the
//! caller's event handlers, and structural changes are delivered in batches
//! through the arena's mutation journal.
//!
//! ## Core Systems
//!
//! - **[`dom`]** — Slotmap-backed node arena: attachment queries, slot
//!   indirection, mutation journal
//! - **[`model`]** — Dynamic property bags, shared items, dotted-path access
//! - **[`template`]** — Template sources, the binding-expression compiler,
//!   stamped instances
//! - **[`templatizer`]** — Per-source instance lifecycle: reuse, staleness,
//!   fan-out, notification routing
//! - **[`host`]** — Renderer-slot convention and the table host contract
//! - **[`binding`]** — Fragment discovery, classification, renderer
//!   installation, structural observation

pub mod binding;
pub mod dom;
pub mod error;
pub mod host;
pub mod model;
pub mod template;
pub mod templatizer;

pub use binding::TemplateBindings;
pub use dom::{Dom, NodeData, NodeId, NodeKind};
pub use error::BindError;
pub use host::{Renderer, SlotKind};
pub use model::{new_item, Item, Model};
pub use templatizer::{Templatizer, TemplatizerId};
