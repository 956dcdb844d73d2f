//! Table host: item collection, per-item row state, and the nested-path
//! mutation notifier.
//!
//! Item membership is tracked by reference identity (`Rc::ptr_eq`), not by
//! value: two rows with equal data are still distinct rows. Every state
//! operation appends a [`TableEvent`] that the application loop drains, in
//! the same accumulate-and-drain shape used for widget lifecycle events.

use std::rc::Rc;

use serde_json::Value;

use crate::host::Renderer;
use crate::model::{set_path, Item};

// ---------------------------------------------------------------------------
// ItemsSource
// ---------------------------------------------------------------------------

/// Where a table's rows come from.
#[derive(Debug)]
pub enum ItemsSource {
    /// A fully materialized, index-addressable sequence.
    Materialized(Vec<Item>),
    /// Rows are fetched on demand by an external paged supplier; the
    /// sequence is not index-addressable from here.
    Paged,
}

// ---------------------------------------------------------------------------
// TableEvent
// ---------------------------------------------------------------------------

/// Events emitted by table state operations, in order of occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// An item's row was expanded.
    Expanded(Item),
    /// An item's row was collapsed.
    Collapsed(Item),
    /// An item was selected.
    Selected(Item),
    /// An item was deselected.
    Deselected(Item),
    /// An item's details row was opened.
    DetailsOpened(Item),
    /// An item's details row was closed.
    DetailsClosed(Item),
    /// A nested path under the item collection was mutated.
    ItemPathChanged {
        /// The dotted path, rooted at the item collection.
        path: String,
        /// The new value at that path.
        value: Value,
    },
}

// ---------------------------------------------------------------------------
// TableState
// ---------------------------------------------------------------------------

/// A table host's externally visible state.
#[derive(Debug)]
pub struct TableState {
    items: ItemsSource,
    selected: Vec<Item>,
    expanded: Vec<Item>,
    details_open: Vec<Item>,
    events: Vec<TableEvent>,
    /// The per-row details renderer slot.
    pub row_details_renderer: Option<Renderer>,
}

impl TableState {
    /// Create a table over a materialized item sequence.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: ItemsSource::Materialized(items),
            selected: Vec::new(),
            expanded: Vec::new(),
            details_open: Vec::new(),
            events: Vec::new(),
            row_details_renderer: None,
        }
    }

    /// Create a table whose rows come from a paged supplier.
    pub fn paged() -> Self {
        Self {
            items: ItemsSource::Paged,
            selected: Vec::new(),
            expanded: Vec::new(),
            details_open: Vec::new(),
            events: Vec::new(),
            row_details_renderer: None,
        }
    }

    /// The materialized item sequence, or `None` for a paged source.
    pub fn items(&self) -> Option<&[Item]> {
        match &self.items {
            ItemsSource::Materialized(items) => Some(items),
            ItemsSource::Paged => None,
        }
    }

    /// Whether rows come from a paged supplier.
    pub fn is_paged(&self) -> bool {
        matches!(self.items, ItemsSource::Paged)
    }

    /// The index of an item in the materialized sequence, by identity.
    /// `None` for a paged source or an unknown item.
    pub fn index_of(&self, item: &Item) -> Option<usize> {
        self.items()?.iter().position(|i| Rc::ptr_eq(i, item))
    }

    // -- row state operations -----------------------------------------------

    /// Expand an item's row. No-op (and no event) if already expanded.
    pub fn expand_item(&mut self, item: &Item) {
        if add_by_identity(&mut self.expanded, item) {
            self.events.push(TableEvent::Expanded(item.clone()));
        }
    }

    /// Collapse an item's row. No-op if not expanded.
    pub fn collapse_item(&mut self, item: &Item) {
        if remove_by_identity(&mut self.expanded, item) {
            self.events.push(TableEvent::Collapsed(item.clone()));
        }
    }

    /// Select an item. No-op if already selected.
    pub fn select_item(&mut self, item: &Item) {
        if add_by_identity(&mut self.selected, item) {
            self.events.push(TableEvent::Selected(item.clone()));
        }
    }

    /// Deselect an item. No-op if not selected.
    pub fn deselect_item(&mut self, item: &Item) {
        if remove_by_identity(&mut self.selected, item) {
            self.events.push(TableEvent::Deselected(item.clone()));
        }
    }

    /// Open an item's details row. No-op if already open.
    pub fn open_item_details(&mut self, item: &Item) {
        if add_by_identity(&mut self.details_open, item) {
            self.events.push(TableEvent::DetailsOpened(item.clone()));
        }
    }

    /// Close an item's details row. No-op if not open.
    pub fn close_item_details(&mut self, item: &Item) {
        if remove_by_identity(&mut self.details_open, item) {
            self.events.push(TableEvent::DetailsClosed(item.clone()));
        }
    }

    /// Whether an item's row is expanded.
    pub fn is_expanded(&self, item: &Item) -> bool {
        contains_identity(&self.expanded, item)
    }

    /// Whether an item is selected.
    pub fn is_selected(&self, item: &Item) -> bool {
        contains_identity(&self.selected, item)
    }

    /// Whether an item's details row is open.
    pub fn is_details_open(&self, item: &Item) -> bool {
        contains_identity(&self.details_open, item)
    }

    // -- nested-path mutation ------------------------------------------------

    /// Accept a nested-path mutation rooted at the item collection, e.g.
    /// `items.2.title`. The addressed field is updated in place when the
    /// path resolves, and an [`TableEvent::ItemPathChanged`] is recorded
    /// either way.
    pub fn notify_item_path(&mut self, path: &str, value: Value) {
        if let Some(rest) = path.strip_prefix("items.") {
            let (index, leaf) = match rest.split_once('.') {
                Some((index, leaf)) => (index, leaf),
                None => (rest, ""),
            };
            let target = index
                .parse::<usize>()
                .ok()
                .and_then(|i| self.items().and_then(|items| items.get(i)).cloned());
            if let Some(item) = target {
                set_path(&mut item.borrow_mut(), leaf, value.clone());
            }
        }
        self.events.push(TableEvent::ItemPathChanged {
            path: path.to_owned(),
            value,
        });
    }

    // -- events --------------------------------------------------------------

    /// Drain and return all recorded events.
    pub fn take_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether any events are pending.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

fn contains_identity(list: &[Item], item: &Item) -> bool {
    list.iter().any(|i| Rc::ptr_eq(i, item))
}

fn add_by_identity(list: &mut Vec<Item>, item: &Item) -> bool {
    if contains_identity(list, item) {
        false
    } else {
        list.push(item.clone());
        true
    }
}

fn remove_by_identity(list: &mut Vec<Item>, item: &Item) -> bool {
    let before = list.len();
    list.retain(|i| !Rc::ptr_eq(i, item));
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::new_item;
    use serde_json::json;

    fn three_items() -> Vec<Item> {
        vec![
            new_item(json!({"title": "a"})),
            new_item(json!({"title": "b"})),
            new_item(json!({"title": "c"})),
        ]
    }

    #[test]
    fn index_of_by_identity() {
        let items = three_items();
        let table = TableState::with_items(items.clone());
        assert_eq!(table.index_of(&items[2]), Some(2));

        // Equal data, different identity.
        let twin = new_item(json!({"title": "c"}));
        assert_eq!(table.index_of(&twin), None);
    }

    #[test]
    fn paged_source_is_not_indexable() {
        let table = TableState::paged();
        assert!(table.is_paged());
        assert!(table.items().is_none());
        assert_eq!(table.index_of(&new_item(json!({}))), None);
    }

    #[test]
    fn select_and_deselect() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.select_item(&items[0]);
        assert!(table.is_selected(&items[0]));
        table.deselect_item(&items[0]);
        assert!(!table.is_selected(&items[0]));
        assert_eq!(
            table.take_events(),
            vec![
                TableEvent::Selected(items[0].clone()),
                TableEvent::Deselected(items[0].clone()),
            ]
        );
    }

    #[test]
    fn double_select_is_noop() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.select_item(&items[0]);
        table.select_item(&items[0]);
        assert_eq!(table.take_events().len(), 1);
    }

    #[test]
    fn expand_collapse_and_details() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.expand_item(&items[1]);
        assert!(table.is_expanded(&items[1]));
        table.collapse_item(&items[1]);
        assert!(!table.is_expanded(&items[1]));

        table.open_item_details(&items[1]);
        assert!(table.is_details_open(&items[1]));
        table.close_item_details(&items[1]);
        assert!(!table.is_details_open(&items[1]));
        assert_eq!(table.take_events().len(), 4);
    }

    #[test]
    fn collapse_unexpanded_is_noop() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.collapse_item(&items[0]);
        assert!(!table.has_events());
    }

    #[test]
    fn notify_item_path_applies_mutation() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.notify_item_path("items.1.title", json!("B"));
        assert_eq!(items[1].borrow()["title"], json!("B"));
        assert_eq!(
            table.take_events(),
            vec![TableEvent::ItemPathChanged {
                path: "items.1.title".to_owned(),
                value: json!("B"),
            }]
        );
    }

    #[test]
    fn notify_item_path_records_even_when_unresolvable() {
        let mut table = TableState::with_items(Vec::new());
        table.notify_item_path("items.9.title", json!("x"));
        assert_eq!(table.take_events().len(), 1);
    }

    #[test]
    fn take_events_drains() {
        let items = three_items();
        let mut table = TableState::with_items(items.clone());
        table.select_item(&items[0]);
        assert_eq!(table.take_events().len(), 1);
        assert!(table.take_events().is_empty());
        assert!(!table.has_events());
    }
}
