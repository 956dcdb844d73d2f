//! Row-context notification routing: the bridges between an instance living
//! in a table's row or cell and the table's own state operations.
//!
//! Four roots are handled. `item` rewrites a nested-field edit into a
//! mutation of the table's item collection (`item.title` on row 2 becomes
//! `items.2.title`); `expanded`, `selected`, and `details_opened` call the
//! matching table operation. Each row-state bridge carries an echo guard:
//! a value equal to the instance's snapshot is our own forwarding coming
//! back and must not re-trigger the operation.

use crate::dom::node::NodeData;
use crate::dom::{Dom, NodeId};
use crate::templatizer::router::{NotificationRouter, NotifyContext};
use crate::templatizer::Templatizer;

/// Which table operation a row-state notification drives.
#[derive(Debug, Clone, Copy)]
enum RowStateBridge {
    Expanded,
    Selected,
    DetailsOpen,
}

/// Router for templatizers whose instances live in a row or cell context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRouter;

impl TableRouter {
    /// Resolve the nearest table-like owner: the owner itself, or the
    /// owner's declared table when the owner is a column.
    pub fn owner_table(dom: &Dom, owner: NodeId) -> Option<NodeId> {
        let data = dom.get(owner)?;
        if data.is_table() {
            return Some(owner);
        }
        data.as_column().and_then(|column| column.table)
    }

    fn on_item_changed(&self, dom: &mut Dom, ctx: &NotifyContext<'_>) {
        // Reassigning the whole item reference has no safe meaning here.
        if ctx.path.rest().is_empty() {
            return;
        }
        let Some(table_id) = Self::owner_table(dom, ctx.owner) else {
            return;
        };
        let Some(item) = ctx.instance.item().cloned() else {
            return;
        };
        // A paged item source is not index-addressable; nothing safe to do.
        let index = dom
            .get(table_id)
            .and_then(NodeData::as_table)
            .and_then(|table| table.index_of(&item));
        let Some(index) = index else {
            return;
        };
        let path = format!("items.{index}.{rest}", rest = ctx.path.rest());
        if let Some(table) = dom.get_mut(table_id).and_then(NodeData::as_table_mut) {
            table.notify_item_path(&path, ctx.value.clone());
        }
    }

    fn on_row_state_changed(&self, dom: &mut Dom, ctx: &NotifyContext<'_>, bridge: RowStateBridge) {
        // Echo guard: forwarding wrote this value into the snapshot already.
        if ctx.instance.properties().value(ctx.path.root()) == Some(ctx.value) {
            return;
        }
        let Some(table_id) = Self::owner_table(dom, ctx.owner) else {
            return;
        };
        let Some(item) = ctx.instance.item().cloned() else {
            return;
        };
        let on = ctx.value.as_bool().unwrap_or(false);
        let Some(table) = dom.get_mut(table_id).and_then(NodeData::as_table_mut) else {
            return;
        };
        match (bridge, on) {
            (RowStateBridge::Expanded, true) => table.expand_item(&item),
            (RowStateBridge::Expanded, false) => table.collapse_item(&item),
            (RowStateBridge::Selected, true) => table.select_item(&item),
            (RowStateBridge::Selected, false) => table.deselect_item(&item),
            (RowStateBridge::DetailsOpen, true) => table.open_item_details(&item),
            (RowStateBridge::DetailsOpen, false) => table.close_item_details(&item),
        }
    }
}

impl NotificationRouter for TableRouter {
    fn route(&self, dom: &mut Dom, ctx: &NotifyContext<'_>) {
        match ctx.path.root() {
            "item" => self.on_item_changed(dom, ctx),
            "expanded" => self.on_row_state_changed(dom, ctx, RowStateBridge::Expanded),
            "selected" => self.on_row_state_changed(dom, ctx, RowStateBridge::Selected),
            "details_opened" => self.on_row_state_changed(dom, ctx, RowStateBridge::DetailsOpen),
            _ => {}
        }
    }
}

impl Templatizer {
    /// Create a templatizer whose instances live in a table's row or cell
    /// context, wired with the row-context router.
    pub fn for_table_context(dom: &Dom, owner: NodeId, source: NodeId) -> Self {
        Self::with_router(dom, owner, source, Box::new(TableRouter))
    }
}
