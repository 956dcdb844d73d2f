//! Renderer binding layer: discovers template fragments under hosts, builds
//! one templatizer per fragment, and installs renderer callbacks into the
//! owning objects' slots.
//!
//! One `TemplateBindings` is constructed per consumer and handed each host
//! explicitly; it owns every templatizer it builds plus the stamp registry
//! shared by their render targets.

pub mod observe;
pub mod scan;

use std::collections::HashSet;

use serde_json::Value;
use slotmap::SlotMap;

use crate::dom::{Dom, NodeId};
use crate::host::{Renderer, SlotKind};
use crate::model::Model;
use crate::template::InstanceId;
use crate::templatizer::{StampRegistry, Templatizer, TemplatizerId};

/// The binding layer's state: templatizers, stamped targets, observed hosts,
/// and the hosts already given the one-time deprecation notice.
pub struct TemplateBindings {
    templatizers: SlotMap<TemplatizerId, Templatizer>,
    stamps: StampRegistry,
    observed: HashSet<NodeId>,
    noticed: HashSet<NodeId>,
}

impl TemplateBindings {
    /// Create an empty binding layer.
    pub fn new() -> Self {
        Self {
            templatizers: SlotMap::with_key(),
            stamps: StampRegistry::new(),
            observed: HashSet::new(),
            noticed: HashSet::new(),
        }
    }

    /// Access a templatizer built by this layer.
    pub fn templatizer(&self, id: TemplatizerId) -> Option<&Templatizer> {
        self.templatizers.get(id)
    }

    /// Mutable access to a templatizer built by this layer.
    pub fn templatizer_mut(&mut self, id: TemplatizerId) -> Option<&mut Templatizer> {
        self.templatizers.get_mut(id)
    }

    /// Number of templatizers this layer has built.
    pub fn templatizer_count(&self) -> usize {
        self.templatizers.len()
    }

    /// The stamp registry shared by all render targets.
    pub fn stamps(&self) -> &StampRegistry {
        &self.stamps
    }

    /// Invoke the renderer installed in `slot` of `owner` with
    /// `(target, owner, model)`. No-op when the slot is empty or absent.
    pub fn render_slot(
        &mut self,
        dom: &mut Dom,
        owner: NodeId,
        slot: SlotKind,
        target: NodeId,
        model: &Model,
    ) {
        let Some(renderer) = dom
            .get(owner)
            .and_then(|data| data.installed_renderer(slot))
            .cloned()
        else {
            return;
        };
        match renderer {
            Renderer::Adapter(id) => {
                if let Some(templatizer) = self.templatizers.get_mut(id) {
                    templatizer.render(dom, &mut self.stamps, target, model);
                }
            }
            Renderer::User(callback) => callback(dom, target, owner, model),
        }
    }

    /// Forward a changed host property into every templatizer owned by
    /// `owner`, each of which fans it out to its live instances.
    pub fn forward_host_property(&mut self, dom: &mut Dom, owner: NodeId, name: &str, value: Value) {
        for (_, templatizer) in self.templatizers.iter_mut() {
            if templatizer.owner() == owner {
                templatizer.forward_host_property(dom, name, value.clone());
            }
        }
    }

    /// Route a property change raised by user interaction inside a render
    /// target to the templatizer whose instance occupies it. No-op when the
    /// target is unstamped or the stamping templatizer is gone.
    pub fn notify_target(&mut self, dom: &mut Dom, target: NodeId, path: &str, value: Value) {
        let Some(stamp) = self.stamps.get(target) else {
            return;
        };
        let owning = self
            .templatizers
            .iter_mut()
            .find(|(_, t)| t.token() == stamp.templatizer);
        if let Some((_, templatizer)) = owning {
            templatizer.notify(dom, stamp.instance, path, value);
        }
    }

    /// Dispatch an instance-originated property change through its
    /// templatizer's router.
    pub fn notify(
        &mut self,
        dom: &mut Dom,
        templatizer: TemplatizerId,
        instance: InstanceId,
        path: &str,
        value: Value,
    ) {
        if let Some(templatizer) = self.templatizers.get_mut(templatizer) {
            templatizer.notify(dom, instance, path, value);
        }
    }
}

impl Default for TemplateBindings {
    fn default() -> Self {
        Self::new()
    }
}
