//! Notification routing: dispatch an instance-originated property change to
//! a handler chosen by the path's root key.
//!
//! Routing is an explicit per-root mapping with a safe no-op default: a root
//! key nobody handles is dropped, never an error. Templatizer variants differ
//! only in the router they carry.

use serde_json::Value;

use crate::dom::{Dom, NodeId};
use crate::model::PropertyPath;
use crate::template::TemplateInstance;

/// Everything a router may inspect about one notification.
pub struct NotifyContext<'a> {
    /// The object owning the templatizer (a host or one of its columns).
    pub owner: NodeId,
    /// The instance the change originated from.
    pub instance: &'a TemplateInstance,
    /// The changed property path.
    pub path: &'a PropertyPath,
    /// The new value at that path.
    pub value: &'a Value,
}

/// Routes instance-originated property changes back to the owning host.
pub trait NotificationRouter {
    /// Handle one notification. The default implementation drops it.
    fn route(&self, dom: &mut Dom, ctx: &NotifyContext<'_>) {
        let _ = (dom, ctx);
    }
}

/// Router with no handlers: every notification is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRouter;

impl NotificationRouter for NullRouter {}
