//! Template instances: stamped, independently updatable copies of a
//! compiled template.
//!
//! An instance stamps one text node per compiled segment. Literal segments
//! never change; binding segments are re-evaluated whenever the property at
//! their root is forwarded into the instance. The properties snapshot holds
//! the last host-confirmed state and is written only through forwarding,
//! which is what lets downstream bridges tell a genuine user edit from an
//! echo of their own update.

use std::rc::Rc;

use serde_json::Value;
use slotmap::new_key_type;
use tracing::warn;

use super::compile::{CompiledTemplate, Segment};
use crate::dom::{Dom, NodeData, NodeId};
use crate::model::{display, get_path, Item, Model, PropertyPath};

new_key_type! {
    /// Identifier of a live instance within its owning templatizer.
    pub struct InstanceId;
}

/// One stamped rendering of a compiled template.
#[derive(Debug)]
pub struct TemplateInstance {
    class: Rc<CompiledTemplate>,
    nodes: Vec<NodeId>,
    properties: Model,
}

impl TemplateInstance {
    /// Stamp a new instance: snapshot the model (dropping keys outside the
    /// compiled shape) and create one detached text node per segment. The
    /// caller attaches the nodes under their render target.
    pub(crate) fn stamp(dom: &mut Dom, class: Rc<CompiledTemplate>, model: &Model) -> Self {
        let mut properties = Model::new();
        for (key, value) in model.values() {
            if class.accepts(key) {
                properties.set(key.clone(), value.clone());
            } else {
                warn!(key = %key, "model key outside the compiled property shape; ignored");
            }
        }
        if let Some(item) = model.item() {
            if class.accepts("item") {
                properties.set_item(item.clone());
            } else {
                warn!(key = "item", "model key outside the compiled property shape; ignored");
            }
        }

        let mut instance = Self {
            class,
            nodes: Vec::new(),
            properties,
        };
        for index in 0..instance.class.segments().len() {
            let content = match &instance.class.segments()[index] {
                Segment::Literal(text) => text.clone(),
                Segment::Binding(path) => instance.eval(path),
            };
            let node = dom.insert(NodeData::text(content));
            instance.nodes.push(node);
        }
        instance
    }

    /// The stamped nodes, in segment order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Whether this instance is still attached: its first content node has a
    /// parent. An instance whose content was externally cleared is stale and
    /// is never revived.
    pub fn is_attached(&self, dom: &Dom) -> bool {
        self.nodes.first().is_some_and(|&node| dom.is_attached(node))
    }

    /// The last host-confirmed properties snapshot.
    pub fn properties(&self) -> &Model {
        &self.properties
    }

    /// The instance's item, if one was forwarded.
    pub fn item(&self) -> Option<&Item> {
        self.properties.item()
    }

    /// Forward a host data property into this instance, re-evaluating the
    /// bindings rooted at it. Keys outside the compiled shape are dropped
    /// with a warning.
    pub(crate) fn set_value(&mut self, dom: &mut Dom, key: &str, value: Value) {
        if !self.class.accepts(key) {
            warn!(key = %key, "model key outside the compiled property shape; ignored");
            return;
        }
        self.properties.set(key, value);
        self.refresh_root(dom, key);
    }

    /// Forward the item into this instance. Always re-evaluates the item
    /// bindings: an unchanged reference says nothing about nested fields
    /// mutated in place.
    pub(crate) fn set_item(&mut self, dom: &mut Dom, item: Item) {
        if !self.class.accepts("item") {
            warn!(key = "item", "model key outside the compiled property shape; ignored");
            return;
        }
        self.properties.set_item(item);
        self.refresh_root(dom, "item");
    }

    fn refresh_root(&self, dom: &mut Dom, root: &str) {
        for (node, segment) in self.nodes.iter().zip(self.class.segments()) {
            if let Segment::Binding(path) = segment {
                if path.root() == root {
                    if let Some(data) = dom.get_mut(*node) {
                        data.set_text(self.eval(path));
                    }
                }
            }
        }
    }

    fn eval(&self, path: &PropertyPath) -> String {
        if path.root() == "item" {
            match self.properties.item() {
                Some(item) => {
                    let value = item.borrow();
                    get_path(&value, path.rest()).map(display).unwrap_or_default()
                }
                None => String::new(),
            }
        } else {
            self.properties
                .value(path.root())
                .and_then(|value| get_path(value, path.rest()))
                .map(display)
                .unwrap_or_default()
        }
    }
}
