//! Template pipeline: sources discovered in the tree, the binding-expression
//! compiler, and the stamped instances it produces.

pub mod compile;
pub mod instance;
pub mod source;

pub use compile::{CompiledTemplate, Segment};
pub use instance::{InstanceId, TemplateInstance};
pub use source::TemplateSource;
