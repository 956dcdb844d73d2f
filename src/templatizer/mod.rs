//! Templatizer: compiles a template source once and manages the live
//! instances stamped from it.
//!
//! One templatizer exists per (owner, source) pair. Compilation is lazy and
//! memoized: the first rendered model fixes the instance property shape for
//! the life of the templatizer. Rendering into a target either updates the
//! instance already stamped there, discards a stale one, or stamps a fresh
//! instance; host property changes fan out to every live instance in
//! creation order.

pub mod router;
pub mod stamp;
pub mod table_router;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use slotmap::{new_key_type, SlotMap};

use crate::dom::node::NodeData;
use crate::dom::{Dom, NodeId};
use crate::model::{Model, PropertyPath};
use crate::template::compile::CompiledTemplate;
use crate::template::instance::{InstanceId, TemplateInstance};

pub use router::{NotificationRouter, NotifyContext, NullRouter};
pub use stamp::{Stamp, StampRegistry, TemplatizerToken};
pub use table_router::TableRouter;

new_key_type! {
    /// Identifier of a templatizer within the binding layer's registry.
    pub struct TemplatizerId;
}

/// Compiles one template source and owns the instances stamped from it.
pub struct Templatizer {
    token: TemplatizerToken,
    owner: NodeId,
    source: NodeId,
    text: String,
    class: Option<Rc<CompiledTemplate>>,
    instances: SlotMap<InstanceId, TemplateInstance>,
    /// Creation order of live instances; drives fan-out ordering.
    order: Vec<InstanceId>,
    router: Box<dyn NotificationRouter>,
}

impl Templatizer {
    /// Create a templatizer that drops all instance notifications.
    ///
    /// Pure construction: the source text is snapshotted but nothing is
    /// compiled until the first render.
    pub fn new(dom: &Dom, owner: NodeId, source: NodeId) -> Self {
        Self::with_router(dom, owner, source, Box::new(NullRouter))
    }

    /// Create a templatizer with the given notification router.
    pub fn with_router(
        dom: &Dom,
        owner: NodeId,
        source: NodeId,
        router: Box<dyn NotificationRouter>,
    ) -> Self {
        debug_assert!(
            dom.get(source).is_some_and(NodeData::is_fragment),
            "templatizer source must be a fragment node"
        );
        let text = dom
            .get(source)
            .and_then(NodeData::as_fragment)
            .map(|s| s.text().to_owned())
            .unwrap_or_default();
        Self {
            token: TemplatizerToken::next(),
            owner,
            source,
            text,
            class: None,
            instances: SlotMap::with_key(),
            order: Vec::new(),
            router,
        }
    }

    /// The object owning this templatizer.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// The fragment node this templatizer was built for.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// This templatizer's process-unique token.
    pub fn token(&self) -> TemplatizerToken {
        self.token
    }

    /// The compiled class, once the first render has happened.
    pub fn class(&self) -> Option<&Rc<CompiledTemplate>> {
        self.class.as_ref()
    }

    /// Number of live instances.
    pub fn live_count(&self) -> usize {
        self.order.len()
    }

    /// Live instance ids in creation order.
    pub fn live_ids(&self) -> &[InstanceId] {
        &self.order
    }

    /// Access a live instance.
    pub fn instance(&self, id: InstanceId) -> Option<&TemplateInstance> {
        self.instances.get(id)
    }

    /// Render the template into `target` with the given model.
    ///
    /// If the instance stamped into `target` is one of ours and still
    /// attached, it is updated in place. An owned-but-detached instance is
    /// stale: it is dropped from the live set and replaced. Otherwise the
    /// template is compiled on first use, a fresh instance is stamped, the
    /// target's previous content is cleared, and the instance is attached.
    pub fn render(&mut self, dom: &mut Dom, stamps: &mut StampRegistry, target: NodeId, model: &Model) {
        if let Some(stamp) = stamps.get(target) {
            if stamp.templatizer == self.token && self.instances.contains_key(stamp.instance) {
                if self.instances[stamp.instance].is_attached(dom) {
                    self.update_instance(dom, stamp.instance, model);
                    return;
                }
                // Stale: the target's content was cleared out from under us.
                self.discard(stamp.instance);
                stamps.clear(target);
            }
        }

        let class = self
            .class
            .get_or_insert_with(|| CompiledTemplate::compile(&self.text, model))
            .clone();

        let instance = TemplateInstance::stamp(dom, class, model);
        let nodes = instance.nodes().to_vec();
        let id = self.instances.insert(instance);
        self.order.push(id);

        dom.clear_children(target);
        stamps.set(
            target,
            Stamp {
                templatizer: self.token,
                instance: id,
            },
        );
        for node in nodes {
            dom.reparent(node, target);
        }
    }

    /// Forward a changed host property into every live instance, in creation
    /// order.
    pub fn forward_host_property(&mut self, dom: &mut Dom, name: &str, value: Value) {
        for &id in &self.order {
            if let Some(instance) = self.instances.get_mut(id) {
                instance.set_value(dom, name, value.clone());
            }
        }
    }

    /// Dispatch an instance-originated property change through the router.
    ///
    /// The snapshot on the instance is deliberately left untouched: only
    /// host-driven forwarding confirms state, which is what the routers'
    /// echo guards rely on.
    pub fn notify(&mut self, dom: &mut Dom, instance: InstanceId, path: &str, value: Value) {
        let Some(inst) = self.instances.get(instance) else {
            return;
        };
        let path = PropertyPath::parse(path);
        let ctx = NotifyContext {
            owner: self.owner,
            instance: inst,
            path: &path,
            value: &value,
        };
        self.router.route(dom, &ctx);
    }

    fn update_instance(&mut self, dom: &mut Dom, id: InstanceId, model: &Model) {
        let instance = self
            .instances
            .get_mut(id)
            .expect("updated instance must be live");
        for (key, value) in model.values() {
            instance.set_value(dom, key, value.clone());
        }
        if let Some(item) = model.item() {
            // Forwarded even when the reference is unchanged: callers mutate
            // items in place, so identity is not proof the fields are stale-free.
            instance.set_item(dom, item.clone());
        }
    }

    fn discard(&mut self, id: InstanceId) {
        self.instances.remove(id);
        self.order.retain(|&i| i != id);
    }
}

impl fmt::Debug for Templatizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Templatizer")
            .field("token", &self.token)
            .field("owner", &self.owner)
            .field("source", &self.source)
            .field("compiled", &self.class.is_some())
            .field("live", &self.order.len())
            .finish()
    }
}
