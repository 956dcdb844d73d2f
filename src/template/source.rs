//! Template sources: the uncompiled fragments discovered as host children.
//!
//! A fragment's class markers decide which renderer slot it targets; a
//! fragment with no marker targets the body slot. Once the binding layer has
//! built a templatizer for a fragment, the templatizer is recorded back on
//! the source so later scans recognize it instead of processing it again.

use crate::dom::node::NodeData;
use crate::host::SlotKind;
use crate::templatizer::TemplatizerId;

/// The payload of a fragment node: immutable template text plus the
/// back-reference to the templatizer built for it.
#[derive(Debug)]
pub struct TemplateSource {
    text: String,
    templatizer: Option<TemplatizerId>,
}

impl TemplateSource {
    /// Create an unprocessed source with the given template text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            templatizer: None,
        }
    }

    /// The template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The templatizer built for this source, once processed.
    pub fn templatizer(&self) -> Option<TemplatizerId> {
        self.templatizer
    }

    /// Whether a templatizer has been recorded for this source.
    pub fn is_processed(&self) -> bool {
        self.templatizer.is_some()
    }

    /// Record the templatizer built for this source. Set once: a source is
    /// never re-compiled, a replacement fragment is new work.
    pub fn attach_templatizer(&mut self, id: TemplatizerId) {
        debug_assert!(
            self.templatizer.is_none(),
            "template source already has a templatizer"
        );
        self.templatizer = Some(id);
    }
}

/// Classify a fragment node by its class markers.
///
/// Marker precedence is fixed; an unmarked fragment targets the body slot.
pub fn classify(data: &NodeData) -> SlotKind {
    if data.has_class("header") {
        SlotKind::Header
    } else if data.has_class("footer") {
        SlotKind::Footer
    } else if data.has_class("editor") {
        SlotKind::Editor
    } else if data.has_class("row-details") {
        SlotKind::RowDetails
    } else {
        SlotKind::Body
    }
}
