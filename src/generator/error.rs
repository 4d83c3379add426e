//! Error types for query generation

use thiserror::Error;

use crate::grammar::did_you_mean;

/// Errors that can occur while generating queries
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateError {
    /// Start symbol is not a named element of the grammar
    #[error("unknown start symbol '{name}'{}", did_you_mean(.suggestions))]
    UnknownStart {
        name: String,
        suggestions: Vec<String>,
    },

    /// Regex terminal with no configured value, under the `error` policy
    #[error("no value configured for terminal '{terminal}' (path: {})", .path.join(" > "))]
    UnresolvedTerminal {
        terminal: String,
        /// Names expanded on the branch, oldest first
        path: Vec<String>,
    },
}
