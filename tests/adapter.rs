//! Integration tests for stencil-bridge.
//!
//! These tests exercise the public API from outside the crate: fragment
//! discovery and binding, instance reuse across renders, bidirectional
//! property flow, and structural observation.

use pretty_assertions::assert_eq;
use serde_json::json;

use stencil_bridge::host::{ColumnState, ContainerState, Renderer, TableEvent, TableState};
use stencil_bridge::{
    new_item, BindError, Dom, Item, Model, NodeData, NodeId, SlotKind, TemplateBindings,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_items() -> Vec<Item> {
    vec![
        new_item(json!({"title": "alpha"})),
        new_item(json!({"title": "beta"})),
        new_item(json!({"title": "gamma"})),
    ]
}

/// A table with one column whose body template is already bound.
fn bound_table(
    template: &str,
) -> (Dom, TemplateBindings, NodeId, NodeId, Vec<Item>) {
    let mut dom = Dom::new();
    let items = row_items();
    let table = dom.insert(NodeData::table(TableState::with_items(items.clone())));
    let column = dom.insert_child(table, NodeData::column(ColumnState::for_table(table)));
    dom.insert_child(column, NodeData::fragment(template));
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, column).unwrap();
    (dom, bindings, table, column, items)
}

fn row_model(items: &[Item], row: usize) -> Model {
    Model::new()
        .with_item(items[row].clone())
        .with("index", row as i64)
        .with("selected", false)
}

fn table_events(dom: &mut Dom, table: NodeId) -> Vec<TableEvent> {
    dom.get_mut(table)
        .unwrap()
        .as_table_mut()
        .unwrap()
        .take_events()
}

// ---------------------------------------------------------------------------
// Instance reuse and staleness
// ---------------------------------------------------------------------------

#[test]
fn test_attached_instance_is_reused_across_renders() {
    let (mut dom, mut bindings, _table, column, items) = bound_table("{{index}}: {{item.title}}");
    let cell = dom.insert(NodeData::element());

    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 0));
    let first = bindings.stamps().get(cell).unwrap();
    assert_eq!(dom.text_content(cell), "0: alpha");

    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 1));
    let second = bindings.stamps().get(cell).unwrap();

    assert_eq!(first.instance, second.instance);
    assert_eq!(first.templatizer, second.templatizer);
    assert_eq!(dom.text_content(cell), "1: beta");
}

#[test]
fn test_detached_instance_is_recreated() {
    let (mut dom, mut bindings, _table, column, items) = bound_table("{{item.title}}");
    let cell = dom.insert(NodeData::element());

    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 0));
    let first = bindings.stamps().get(cell).unwrap().instance;

    // External code wipes the cell before the next render.
    dom.clear_children(cell);
    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 0));
    let second = bindings.stamps().get(cell).unwrap().instance;

    assert_ne!(first, second);
    assert_eq!(dom.text_content(cell), "alpha");
}

#[test]
fn test_identical_item_reference_is_refreshed() {
    let (mut dom, mut bindings, _table, column, items) = bound_table("{{item.title}}");
    let cell = dom.insert(NodeData::element());
    let model = row_model(&items, 2);

    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &model);
    assert_eq!(dom.text_content(cell), "gamma");

    // Same reference, nested field mutated in place.
    items[2].borrow_mut()["title"] = json!("delta");
    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &model);
    assert_eq!(dom.text_content(cell), "delta");
}

// ---------------------------------------------------------------------------
// Host property fan-out
// ---------------------------------------------------------------------------

#[test]
fn test_host_property_fans_out_to_all_instances() {
    let mut dom = Dom::new();
    let host = dom.insert(NodeData::container(ContainerState::new()));
    dom.insert_child(host, NodeData::fragment("{{label}}"));
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, host).unwrap();

    let first = dom.insert(NodeData::element());
    let second = dom.insert(NodeData::element());
    let model = Model::new().with("label", "initial");
    bindings.render_slot(&mut dom, host, SlotKind::Body, first, &model);
    bindings.render_slot(&mut dom, host, SlotKind::Body, second, &model);

    bindings.forward_host_property(&mut dom, host, "label", json!("changed"));
    assert_eq!(dom.text_content(first), "changed");
    assert_eq!(dom.text_content(second), "changed");
}

// ---------------------------------------------------------------------------
// Instance-to-host notifications
// ---------------------------------------------------------------------------

#[test]
fn test_item_edit_rewrites_path_with_row_index() {
    let (mut dom, mut bindings, table, column, items) = bound_table("{{item.title}}");
    let cell = dom.insert(NodeData::element());
    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 2));

    bindings.notify_target(&mut dom, cell, "item.title", json!("edited"));

    assert_eq!(
        table_events(&mut dom, table),
        vec![TableEvent::ItemPathChanged {
            path: "items.2.title".to_owned(),
            value: json!("edited"),
        }]
    );
    assert_eq!(items[2].borrow()["title"], json!("edited"));
}

#[test]
fn test_row_state_loop_guard() {
    let (mut dom, mut bindings, table, column, items) = bound_table("{{item.title}}{{selected}}");
    let cell = dom.insert(NodeData::element());
    bindings.render_slot(&mut dom, column, SlotKind::Body, cell, &row_model(&items, 1));

    // Echo: equal to the snapshot value, no operation.
    bindings.notify_target(&mut dom, cell, "selected", json!(false));
    assert_eq!(table_events(&mut dom, table), vec![]);

    // Genuine change: exactly one operation.
    bindings.notify_target(&mut dom, cell, "selected", json!(true));
    assert_eq!(
        table_events(&mut dom, table),
        vec![TableEvent::Selected(items[1].clone())]
    );
}

// ---------------------------------------------------------------------------
// Classification and conflicts
// ---------------------------------------------------------------------------

#[test]
fn test_last_header_fragment_wins() {
    let mut dom = Dom::new();
    let table = dom.insert(NodeData::table(TableState::with_items(Vec::new())));
    let column = dom.insert_child(table, NodeData::column(ColumnState::for_table(table)));
    dom.insert_child(column, NodeData::fragment("first header").with_class("header"));
    dom.insert_child(column, NodeData::fragment("second header").with_class("header"));
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, column).unwrap();

    let target = dom.insert(NodeData::element());
    bindings.render_slot(&mut dom, column, SlotKind::Header, target, &Model::new());
    assert_eq!(dom.text_content(target), "second header");
}

#[test]
fn test_conflict_preserves_user_renderer() {
    let mut dom = Dom::new();
    let host = dom.insert(NodeData::container(ContainerState::new()));
    let fragment = dom.insert_child(host, NodeData::fragment("{{a}}"));
    *dom.get_mut(host)
        .unwrap()
        .renderer_slot_mut(SlotKind::Body)
        .unwrap() = Some(Renderer::user(|dom, target, _, _| {
        dom.insert_child(target, NodeData::text("user output"));
    }));

    let mut bindings = TemplateBindings::new();
    let err = bindings.bind(&mut dom, host).unwrap_err();
    assert!(matches!(err, BindError::RendererConflict { node, .. } if node == host));
    assert!(err.to_string().contains("body"));

    // The fragment was not marked processed and the user renderer still runs.
    assert!(!dom.get(fragment).unwrap().as_fragment().unwrap().is_processed());
    let target = dom.insert(NodeData::element());
    bindings.render_slot(&mut dom, host, SlotKind::Body, target, &Model::new());
    assert_eq!(dom.text_content(target), "user output");
}

#[test]
fn test_rescan_is_idempotent() {
    let mut dom = Dom::new();
    let host = dom.insert(NodeData::container(ContainerState::new()));
    dom.insert_child(host, NodeData::fragment("{{a}}"));
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, host).unwrap();
    let installed = dom
        .get(host)
        .unwrap()
        .installed_renderer(SlotKind::Body)
        .and_then(Renderer::templatizer);

    bindings.bind(&mut dom, host).unwrap();
    bindings.bind(&mut dom, host).unwrap();

    assert_eq!(bindings.templatizer_count(), 1);
    let still_installed = dom
        .get(host)
        .unwrap()
        .installed_renderer(SlotKind::Body)
        .and_then(Renderer::templatizer);
    assert_eq!(installed, still_installed);
}

// ---------------------------------------------------------------------------
// Structural observation
// ---------------------------------------------------------------------------

#[test]
fn test_template_added_later_is_bound_by_flush() {
    let mut dom = Dom::new();
    let host = dom.insert(NodeData::container(ContainerState::new()));
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, host).unwrap();
    bindings.observe(&mut dom, host);
    assert!(dom
        .get(host)
        .unwrap()
        .installed_renderer(SlotKind::Body)
        .is_none());

    dom.insert_child(host, NodeData::fragment("late {{a}}"));
    assert_eq!(bindings.flush(&mut dom).unwrap(), 1);

    let target = dom.insert(NodeData::element());
    bindings.render_slot(
        &mut dom,
        host,
        SlotKind::Body,
        target,
        &Model::new().with("a", "binding"),
    );
    assert_eq!(dom.text_content(target), "late binding");
}

#[test]
fn test_batched_mutations_trigger_one_rescan_per_host() {
    let mut dom = Dom::new();
    let host = dom.insert(NodeData::container(ContainerState::new()));
    let other = dom.insert(NodeData::container(ContainerState::new()));
    let mut bindings = TemplateBindings::new();
    bindings.observe(&mut dom, host);
    bindings.observe(&mut dom, other);

    dom.insert_child(host, NodeData::fragment("{{a}}"));
    dom.insert_child(host, NodeData::element());
    dom.insert_child(other, NodeData::fragment("{{b}}"));

    assert_eq!(bindings.flush(&mut dom).unwrap(), 2);
    assert_eq!(bindings.flush(&mut dom).unwrap(), 0);
}

#[test]
fn test_details_template_drives_details_rows() {
    let mut dom = Dom::new();
    let items = row_items();
    let table = dom.insert(NodeData::table(TableState::with_items(items.clone())));
    dom.insert_child(
        table,
        NodeData::fragment("{{item.title}} details{{details_opened}}").with_class("row-details"),
    );
    let mut bindings = TemplateBindings::new();
    bindings.bind(&mut dom, table).unwrap();

    let region = dom.insert(NodeData::element());
    let model = Model::new()
        .with_item(items[0].clone())
        .with("details_opened", false);
    bindings.render_slot(&mut dom, table, SlotKind::RowDetails, region, &model);
    assert_eq!(dom.text_content(region), "alpha detailsfalse");

    bindings.notify_target(&mut dom, region, "details_opened", json!(true));
    assert_eq!(
        table_events(&mut dom, table),
        vec![TableEvent::DetailsOpened(items[0].clone())]
    );
}
