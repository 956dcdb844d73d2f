//! logos-based binding lexer and the compiled template class.
//!
//! Template text interleaves literal runs with `{{ path }}` interpolations.
//! Token priority in logos is determined by longest match, which ensures
//! `{{name}}` lexes as one [`Token::Binding`] rather than two braces followed
//! by text; a brace that does not open an interpolation falls through to
//! [`Token::Brace`] and is folded back into the surrounding literal.

use std::collections::BTreeSet;
use std::rc::Rc;

use logos::Logos;

use crate::model::{Model, PropertyPath};

/// Template token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `{{ path }}` interpolation.
    #[regex(r"\{\{[^{}]*\}\}")]
    Binding,

    /// A run of literal text containing no opening brace.
    #[regex(r"[^{]+")]
    Literal,

    /// A lone `{` that does not open an interpolation.
    #[token("{")]
    Brace,
}

/// One piece of a compiled template: static text or a bound path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Static text, emitted verbatim.
    Literal(String),
    /// An interpolation, re-evaluated whenever its root property changes.
    Binding(PropertyPath),
}

/// Split template text into literal and binding segments.
///
/// Adjacent literal runs (including stray braces) are merged into a single
/// segment, so the output alternates between literals and bindings.
pub fn parse_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    for (result, span) in Token::lexer(text).spanned() {
        let slice = &text[span];
        match result {
            Ok(Token::Binding) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let inner = &slice[2..slice.len() - 2];
                segments.push(Segment::Binding(PropertyPath::parse(inner)));
            }
            _ => literal.push_str(slice),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// A template compiled against the key shape of the first model it saw.
///
/// The shape is fixed at compile time: later models may use a subset of the
/// keys but an unknown key has no binding channel and is dropped with a
/// warning at render time.
#[derive(Debug)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
    properties: BTreeSet<String>,
}

impl CompiledTemplate {
    /// Compile template text, fixing the instance property shape to the key
    /// set of `first_model`.
    pub fn compile(text: &str, first_model: &Model) -> Rc<Self> {
        Rc::new(Self {
            segments: parse_segments(text),
            properties: first_model.keys(),
        })
    }

    /// The compiled segment sequence.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The fixed instance property shape.
    pub fn properties(&self) -> &BTreeSet<String> {
        &self.properties
    }

    /// Whether a model key belongs to the compiled shape.
    pub fn accepts(&self, key: &str) -> bool {
        self.properties.contains(key)
    }
}
