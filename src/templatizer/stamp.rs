//! Stamp registry: which instance currently occupies a render target.
//!
//! Instance ids are only unique within their owning templatizer, so a stamp
//! pairs the instance with a process-unique templatizer token. A templatizer
//! reuses an instance only when both halves match and the instance is still
//! attached; everything else is treated as foreign content and replaced.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SecondaryMap;

use crate::dom::node::NodeId;
use crate::template::instance::InstanceId;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one templatizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplatizerToken(u64);

impl TemplatizerToken {
    /// Allocate a fresh token.
    pub(crate) fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// The record left on a render target after a create-path render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// The templatizer that stamped the target.
    pub templatizer: TemplatizerToken,
    /// The instance occupying the target.
    pub instance: InstanceId,
}

/// Registry mapping render targets to the instance stamped into them.
#[derive(Debug, Default)]
pub struct StampRegistry {
    map: SecondaryMap<NodeId, Stamp>,
}

impl StampRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stamp on a render target, if any.
    pub fn get(&self, target: NodeId) -> Option<Stamp> {
        self.map.get(target).copied()
    }

    /// Record a stamp on a render target, replacing any previous one.
    pub(crate) fn set(&mut self, target: NodeId, stamp: Stamp) {
        self.map.insert(target, stamp);
    }

    /// Remove the stamp from a render target.
    pub(crate) fn clear(&mut self, target: NodeId) {
        self.map.remove(target);
    }
}
