//! Error types.

use crate::dom::NodeId;
use crate::host::SlotKind;

/// Errors from installing template bindings.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A user-supplied renderer already occupies the slot a template
    /// targets. Raised synchronously at bind time; the existing renderer is
    /// left in place.
    #[error("slot `{slot}` on node {node:?} already has a user-supplied renderer; remove the template or the renderer")]
    RendererConflict {
        /// The object owning the contested slot.
        node: NodeId,
        /// The contested slot.
        slot: SlotKind,
    },
}
