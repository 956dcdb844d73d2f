//! Node arena: slotmap-backed tree with attachment queries, slot
//! indirection, and an observable child-list mutation journal.

pub mod node;
pub mod tree;

pub use node::{NodeData, NodeId, NodeKind};
pub use tree::{ChildListChange, Dom};
