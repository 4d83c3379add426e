//! Grammar model
//!
//! A grammar is an immutable arena of [`Element`]s addressed by
//! [`ElementId`]. Grammars are built programmatically with
//! [`GrammarBuilder`] or loaded from the definition language:
//!
//! ```text
//! r_integer = regex('[-+]?[0-9]+');
//! k_limit   = keyword('limit');
//! int_expr  = rule(r_integer, seq('(', this, ')'), seq(this, tokens('+ -'), this));
//! START     = seq(k_limit, int_expr);
//! ```

mod builder;
mod error;
mod lower;
mod suggest;
mod types;

pub(crate) use error::did_you_mean;
pub(crate) use suggest::find_similar;

use std::path::Path;

pub use builder::GrammarBuilder;
pub use error::GrammarError;
pub use lower::lower;
pub use types::{Element, ElementId, ElementKind, Grammar, Kind};

impl Grammar {
    /// Parse and lower grammar definition source
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        let file = crate::parser::parse(source)?;
        lower(&file)
    }

    /// Load a grammar definition file
    pub fn from_file(path: &Path) -> Result<Self, GrammarError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

impl GrammarError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            GrammarError::Syntax(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            other => match other.span() {
                Some(span) => {
                    let message = other.to_string();
                    crate::error::report(source, filename, span.clone(), &message, &message)
                }
                None => other.to_string(),
            },
        }
    }
}
