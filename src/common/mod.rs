//! Source code representation and span annotations, common to every
//! stage of the compiler.

pub mod source;
pub mod span;

pub use source::Source;
pub use span::{Span, Spanned};
