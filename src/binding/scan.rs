//! Fragment discovery and renderer installation.
//!
//! A scan looks at a host's effective children (one level of slot
//! indirection resolved) for template fragments, plus the fragments of
//! direct column children when the host is a table. Each fragment is
//! classified by its marker, given a templatizer on first sight, and its
//! renderer installed into the owning object's slot. When several sibling
//! fragments target the same slot, the last one in document order wins.

use tracing::{debug, warn};

use super::TemplateBindings;
use crate::dom::node::NodeData;
use crate::dom::{Dom, NodeId};
use crate::error::BindError;
use crate::host::{Renderer, SlotKind};
use crate::template::source;
use crate::templatizer::Templatizer;

/// One fragment scheduled for installation.
struct SourceWork {
    fragment: NodeId,
    owner: NodeId,
    slot: SlotKind,
    /// Whether instances will live in a row/cell context of a table.
    table_context: bool,
}

impl TemplateBindings {
    /// Scan `host` for template fragments and install renderer bindings.
    ///
    /// Already-processed fragments keep their templatizer and only have
    /// their renderer re-installed, so repeated scans are idempotent and a
    /// fallback fragment wins again once a slotted one is gone.
    ///
    /// # Errors
    ///
    /// [`BindError::RendererConflict`] when a targeted slot already holds a
    /// user-supplied renderer. The conflicting fragment is left untouched.
    pub fn bind(&mut self, dom: &mut Dom, host: NodeId) -> Result<(), BindError> {
        for work in collect_work(dom, host) {
            let back_ref = dom
                .get(work.fragment)
                .and_then(NodeData::as_fragment)
                .and_then(|s| s.templatizer());
            if back_ref.is_none() {
                self.notice_deprecated(dom, host);
            }

            // Checked before the fragment is touched, so a failed binding
            // leaves no trace on it.
            let occupied_by_user = dom
                .get(work.owner)
                .and_then(|data| data.installed_renderer(work.slot))
                .is_some_and(|renderer| !renderer.is_adapter());
            if occupied_by_user {
                return Err(BindError::RendererConflict {
                    node: work.owner,
                    slot: work.slot,
                });
            }

            let id = match back_ref {
                Some(id) => id,
                None => {
                    let templatizer = if work.table_context {
                        Templatizer::for_table_context(dom, work.owner, work.fragment)
                    } else {
                        Templatizer::new(dom, work.owner, work.fragment)
                    };
                    let id = self.templatizers.insert(templatizer);
                    if let Some(source) =
                        dom.get_mut(work.fragment).and_then(NodeData::as_fragment_mut)
                    {
                        source.attach_templatizer(id);
                    }
                    id
                }
            };

            // Last-wins: a later fragment for the same slot overwrites the
            // adapter renderer installed by an earlier one.
            if let Some(slot) = dom
                .get_mut(work.owner)
                .and_then(|data| data.renderer_slot_mut(work.slot))
            {
                *slot = Some(Renderer::Adapter(id));
            }
        }
        Ok(())
    }

    fn notice_deprecated(&mut self, dom: &Dom, host: NodeId) {
        if !self.noticed.insert(host) {
            return;
        }
        let suppressed = dom.get(host).is_some_and(|data| data.suppress_template_notice);
        if !suppressed {
            warn!(
                host = ?host,
                "declarative templates are deprecated; prefer renderer callbacks"
            );
        }
    }
}

/// Fragments reachable from `host`: its effective children, and the
/// effective children of direct column children when `host` is a table.
fn collect_work(dom: &Dom, host: NodeId) -> Vec<SourceWork> {
    let mut work = Vec::new();
    let host_is_table = dom.get(host).is_some_and(NodeData::is_table);
    for child in dom.effective_children(host) {
        let Some(data) = dom.get(child) else { continue };
        if data.is_fragment() {
            classify_work(dom, host, child, &mut work);
        } else if host_is_table && data.is_column() {
            for nested in dom.effective_children(child) {
                if dom.get(nested).is_some_and(NodeData::is_fragment) {
                    classify_work(dom, child, nested, &mut work);
                }
            }
        }
    }
    work
}

/// Resolve a fragment's marker against its owner's context, or skip it when
/// the marker has no slot there.
fn classify_work(dom: &Dom, owner: NodeId, fragment: NodeId, work: &mut Vec<SourceWork>) {
    let Some(data) = dom.get(fragment) else { return };
    let marker = source::classify(data);
    let Some(owner_data) = dom.get(owner) else { return };

    let resolved = if owner_data.is_column() {
        match marker {
            SlotKind::Body => Some((owner, SlotKind::Body, true)),
            SlotKind::Header => Some((owner, SlotKind::Header, false)),
            SlotKind::Footer => Some((owner, SlotKind::Footer, false)),
            SlotKind::Editor => Some((owner, SlotKind::Editor, true)),
            // Details rows belong to the column's table.
            SlotKind::RowDetails => owner_data
                .as_column()
                .and_then(|column| column.table)
                .map(|table| (table, SlotKind::RowDetails, true)),
        }
    } else if owner_data.is_table() {
        match marker {
            SlotKind::RowDetails => Some((owner, SlotKind::RowDetails, true)),
            _ => None,
        }
    } else if owner_data.as_container().is_some() {
        match marker {
            SlotKind::Body => Some((owner, SlotKind::Body, false)),
            _ => None,
        }
    } else {
        None
    };

    match resolved {
        Some((owner, slot, table_context)) => work.push(SourceWork {
            fragment,
            owner,
            slot,
            table_context,
        }),
        None => debug!(
            fragment = ?fragment,
            marker = %marker,
            "template marker has no slot in this context; skipped"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ColumnState, ContainerState, TableState};
    use crate::model::Model;

    fn container(dom: &mut Dom) -> NodeId {
        dom.insert(NodeData::container(ContainerState::new()))
    }

    #[test]
    fn bind_installs_body_renderer() {
        let mut dom = Dom::new();
        let host = container(&mut dom);
        let fragment = dom.insert_child(host, NodeData::fragment("{{a}}"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, host).unwrap();

        let renderer = dom.get(host).unwrap().installed_renderer(SlotKind::Body);
        assert!(renderer.is_some_and(Renderer::is_adapter));
        assert!(dom.get(fragment).unwrap().as_fragment().unwrap().is_processed());
        assert_eq!(bindings.templatizer_count(), 1);
    }

    #[test]
    fn bind_twice_is_idempotent() {
        let mut dom = Dom::new();
        let host = container(&mut dom);
        dom.insert_child(host, NodeData::fragment("{{a}}"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, host).unwrap();
        bindings.bind(&mut dom, host).unwrap();
        assert_eq!(bindings.templatizer_count(), 1);
    }

    #[test]
    fn last_sibling_fragment_wins() {
        let mut dom = Dom::new();
        let table = dom.insert(NodeData::table(TableState::with_items(Vec::new())));
        let column = dom.insert_child(table, NodeData::column(ColumnState::for_table(table)));
        let _first = dom.insert_child(column, NodeData::fragment("one").with_class("header"));
        let second = dom.insert_child(column, NodeData::fragment("two").with_class("header"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, column).unwrap();

        // Both fragments got a templatizer, but the installed renderer is
        // the second one's.
        assert_eq!(bindings.templatizer_count(), 2);
        let installed = dom
            .get(column)
            .unwrap()
            .installed_renderer(SlotKind::Header)
            .and_then(Renderer::templatizer)
            .unwrap();
        let winner = dom
            .get(second)
            .unwrap()
            .as_fragment()
            .unwrap()
            .templatizer()
            .unwrap();
        assert_eq!(installed, winner);
    }

    #[test]
    fn table_scan_reaches_column_fragments() {
        let mut dom = Dom::new();
        let table = dom.insert(NodeData::table(TableState::with_items(Vec::new())));
        let column = dom.insert_child(table, NodeData::column(ColumnState::for_table(table)));
        dom.insert_child(column, NodeData::fragment("{{item.title}}"));
        dom.insert_child(table, NodeData::fragment("{{item.title}}").with_class("row-details"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, table).unwrap();

        assert!(dom
            .get(column)
            .unwrap()
            .installed_renderer(SlotKind::Body)
            .is_some());
        assert!(dom
            .get(table)
            .unwrap()
            .installed_renderer(SlotKind::RowDetails)
            .is_some());
    }

    #[test]
    fn row_details_under_column_binds_to_its_table() {
        let mut dom = Dom::new();
        let table = dom.insert(NodeData::table(TableState::with_items(Vec::new())));
        let column = dom.insert_child(table, NodeData::column(ColumnState::for_table(table)));
        dom.insert_child(column, NodeData::fragment("details").with_class("row-details"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, column).unwrap();

        assert!(dom
            .get(table)
            .unwrap()
            .installed_renderer(SlotKind::RowDetails)
            .is_some());
    }

    #[test]
    fn invalid_marker_context_is_skipped() {
        let mut dom = Dom::new();
        let host = container(&mut dom);
        dom.insert_child(host, NodeData::fragment("x").with_class("editor"));
        let mut bindings = TemplateBindings::new();
        bindings.bind(&mut dom, host).unwrap();
        assert_eq!(bindings.templatizer_count(), 0);
    }

    #[test]
    fn conflict_with_user_renderer_errors_and_preserves_it() {
        let mut dom = Dom::new();
        let host = container(&mut dom);
        let fragment = dom.insert_child(host, NodeData::fragment("{{a}}"));
        *dom.get_mut(host)
            .unwrap()
            .renderer_slot_mut(SlotKind::Body)
            .unwrap() = Some(Renderer::user(|_, _, _, _| {}));

        let mut bindings = TemplateBindings::new();
        let err = bindings.bind(&mut dom, host).unwrap_err();
        assert!(matches!(
            err,
            BindError::RendererConflict {
                node,
                slot: SlotKind::Body,
            } if node == host
        ));
        // The user renderer survived, the fragment was not touched.
        let still_user = dom
            .get(host)
            .unwrap()
            .installed_renderer(SlotKind::Body)
            .is_some_and(|r| !r.is_adapter());
        assert!(still_user);
        assert!(!dom.get(fragment).unwrap().as_fragment().unwrap().is_processed());
        assert_eq!(bindings.templatizer_count(), 0);
    }

    #[test]
    fn user_renderer_invocation_still_works() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut dom = Dom::new();
        let host = container(&mut dom);
        let called = Rc::new(Cell::new(0));
        let called_c = called.clone();
        *dom.get_mut(host)
            .unwrap()
            .renderer_slot_mut(SlotKind::Body)
            .unwrap() = Some(Renderer::user(move |_, _, _, _| {
            called_c.set(called_c.get() + 1);
        }));

        let mut bindings = TemplateBindings::new();
        let target = dom.insert(NodeData::element());
        bindings.render_slot(&mut dom, host, SlotKind::Body, target, &Model::new());
        assert_eq!(called.get(), 1);
    }
}
