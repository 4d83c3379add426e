//! querygen - grammar-driven query generation
//!
//! This library loads a grammar description and enumerates a bounded,
//! representative set of query strings covering every construct reachable
//! from a start symbol. The strings are meant as conformance test input for
//! a query engine.
//!
//! # Example
//!
//! ```rust
//! use querygen::generate;
//!
//! let queries = generate("START = seq('select', optional('*'), 'from');", "START").unwrap();
//! assert_eq!(queries, vec!["select * from", "select  from"]);
//! ```

pub mod error;
pub mod generator;
pub mod grammar;
pub mod overrides;
pub mod parser;

pub use error::ParseError;
pub use generator::{render, AncestorPath, GenerateError, Generator, Queries};
pub use grammar::{Element, ElementId, ElementKind, Grammar, GrammarBuilder, GrammarError, Kind};
pub use overrides::{OverrideValue, Overrides, OverridesError, UnresolvedPolicy};
pub use parser::{parse, GrammarFile};

use thiserror::Error;

/// Errors from any stage of the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Error loading the grammar
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// Error loading overrides
    #[error("overrides error: {0}")]
    Overrides(#[from] OverridesError),

    /// Error during generation
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
}

/// Generate every query for `start` with default overrides
pub fn generate(grammar_source: &str, start: &str) -> Result<Vec<String>, Error> {
    generate_with_overrides(grammar_source, start, &Overrides::default())
}

/// Generate every query for `start` with the given overrides
///
/// # Example
///
/// ```rust
/// use querygen::{generate_with_overrides, Overrides};
///
/// let overrides = Overrides::new().with_terminal_value("r_integer", "k_limit", 10);
/// let queries = generate_with_overrides(
///     r#"
///     k_limit = keyword('limit');
///     r_integer = regex('[0-9]+');
///     START = seq(k_limit, r_integer);
///     "#,
///     "START",
///     &overrides,
/// )
/// .unwrap();
/// assert_eq!(queries, vec!["limit 10"]);
/// ```
pub fn generate_with_overrides(
    grammar_source: &str,
    start: &str,
    overrides: &Overrides,
) -> Result<Vec<String>, Error> {
    let grammar = Grammar::parse(grammar_source)?;
    let queries = Generator::new(&grammar, overrides).generate_all(start)?;
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_simple() {
        let queries = generate("START = 'show';", "START").unwrap();
        assert_eq!(queries, vec!["show"]);
    }

    #[test]
    fn test_generate_syntax_error() {
        let err = generate("START = seq('a'", "START").unwrap_err();
        assert!(matches!(err, Error::Grammar(GrammarError::Syntax(_))));
    }

    #[test]
    fn test_generate_unknown_start() {
        let err = generate("START = 'show';", "MISSING").unwrap_err();
        assert!(matches!(
            err,
            Error::Generate(GenerateError::UnknownStart { .. })
        ));
    }

    #[test]
    fn test_generate_unresolved_error() {
        let overrides = Overrides::new().with_unresolved(UnresolvedPolicy::Error);
        let err = generate_with_overrides(
            "r_uuid = regex('[a-f0-9]+'); START = seq('drop', r_uuid);",
            "START",
            &overrides,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "generation error: no value configured for terminal 'r_uuid' (path: START > r_uuid)"
        );
    }
}
