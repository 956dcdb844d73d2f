//! Structural-change observation: rescanning hosts when their children
//! change.
//!
//! Mutations are not delivered one by one. The arena journals child-list
//! changes; `flush` drains one batch and rescans each affected observed host
//! exactly once, however many mutations the batch contains. A change inside
//! a slot that is a direct child of an observed host, or inside a column of
//! an observed table, also marks that host — this is what makes a fallback
//! fragment effective again after a slotted one is removed.

use super::TemplateBindings;
use crate::dom::node::NodeData;
use crate::dom::{Dom, NodeId};
use crate::error::BindError;

impl TemplateBindings {
    /// Watch `host` for child-list changes. Idempotent; enables the arena's
    /// mutation journal on first use.
    pub fn observe(&mut self, dom: &mut Dom, host: NodeId) {
        dom.enable_journal();
        self.observed.insert(host);
    }

    /// Whether `host` is being watched.
    pub fn is_observed(&self, host: NodeId) -> bool {
        self.observed.contains(&host)
    }

    /// Drain the journal and rescan every observed host affected by the
    /// batch, each exactly once. Returns the number of rescanned hosts.
    ///
    /// # Errors
    ///
    /// Propagates [`BindError`] from the underlying rescans.
    pub fn flush(&mut self, dom: &mut Dom) -> Result<usize, BindError> {
        let changes = dom.take_changes();
        let mut dirty: Vec<NodeId> = Vec::new();
        for change in &changes {
            for host in self.hosts_affected(dom, change.parent) {
                if !dirty.contains(&host) {
                    dirty.push(host);
                }
            }
        }
        let count = dirty.len();
        for host in dirty {
            self.bind(dom, host)?;
        }
        Ok(count)
    }

    /// Observed hosts a change under `parent` belongs to.
    fn hosts_affected(&self, dom: &Dom, parent: NodeId) -> Vec<NodeId> {
        if self.observed.contains(&parent) {
            return vec![parent];
        }
        let data = dom.get(parent);
        // One level of slot indirection: slot content belongs to the slot's
        // own parent.
        if data.is_some_and(NodeData::is_slot) {
            if let Some(grand) = dom.parent(parent) {
                if self.observed.contains(&grand) {
                    return vec![grand];
                }
            }
        }
        // Column fragments belong to the column's observed table.
        if data.is_some_and(NodeData::is_column) {
            if let Some(grand) = dom.parent(parent) {
                if self.observed.contains(&grand) && dom.get(grand).is_some_and(NodeData::is_table)
                {
                    return vec![grand];
                }
            }
        }
        Vec::new()
    }
}
