//! Query generation
//!
//! Expansion walks the grammar depth-first and left-to-right, one pending
//! element per step. Templates and ancestor paths are persistent lists, so
//! backtracking to a sibling candidate needs no undo.

mod error;
mod expander;
mod path;
mod plist;
mod template;

pub use error::GenerateError;
pub use expander::{Generator, Queries};
pub use path::AncestorPath;
pub use template::render;
