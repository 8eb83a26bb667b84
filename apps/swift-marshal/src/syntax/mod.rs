//! Swift source → declaration tree.
//!
//! The rest of the crate only sees [`StructureParser`]; [`SwiftParser`] is
//! the implementation wired into the binary.

mod lexer;
mod swift;

pub use swift::SwiftParser;

use crate::error::ParseError;
use crate::models::declaration::SyntaxTree;

/// Turns source text into type containers and their members.
///
/// Implementations are shared across worker threads and must be stateless
/// between calls.
pub trait StructureParser: Sync {
    fn parse(&self, text: &str) -> Result<SyntaxTree, ParseError>;
}
