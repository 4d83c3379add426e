//! Error types for grammar loading and construction

use thiserror::Error;

use crate::error::ParseError;
use crate::parser::ast::Span;

/// Errors that can occur while building a grammar
#[derive(Debug, Error)]
pub enum GrammarError {
    /// Syntax errors in grammar source
    #[error("syntax errors: {}", format_parse_errors(.0))]
    Syntax(Vec<ParseError>),

    /// Constructor that names no known element kind
    #[error("unknown element kind '{kind}'")]
    UnknownKind { kind: String, span: Option<Span> },

    /// Reference to a name that is never defined
    #[error("undefined element '{name}'{}", did_you_mean(.suggestions))]
    Undefined {
        name: String,
        span: Option<Span>,
        suggestions: Vec<String>,
    },

    /// Same name defined twice
    #[error("duplicate definition of '{name}'")]
    Duplicate { name: String, span: Option<Span> },

    /// Constructor called with the wrong arguments
    #[error("invalid arguments to {kind}: {reason}")]
    InvalidArguments {
        kind: String,
        reason: String,
        span: Option<Span>,
    },

    /// `this` used outside of a rule
    #[error("'this' is only valid inside rule(...)")]
    ThisOutsideRule { span: Option<Span> },

    /// List or Repeat with `min > max`
    #[error("invalid bounds on '{element}': min {min} exceeds max {max}")]
    InvalidBounds {
        element: String,
        min: usize,
        max: usize,
    },

    /// Forward-declared element that never received a definition
    #[error("element '{name}' was declared but never defined")]
    Undeclared { name: String },

    /// Error reading a grammar file
    #[error("failed to read grammar file: {0}")]
    Io(#[from] std::io::Error),
}

impl GrammarError {
    pub fn unknown_kind(kind: impl Into<String>, span: Span) -> Self {
        Self::UnknownKind {
            kind: kind.into(),
            span: Some(span),
        }
    }

    pub fn undefined(name: impl Into<String>, span: Span, suggestions: Vec<String>) -> Self {
        Self::Undefined {
            name: name.into(),
            span: Some(span),
            suggestions,
        }
    }

    pub fn invalid_arguments(kind: impl Into<String>, reason: impl Into<String>, span: Span) -> Self {
        Self::InvalidArguments {
            kind: kind.into(),
            reason: reason.into(),
            span: Some(span),
        }
    }

    /// Source location, when the error came from grammar text
    pub fn span(&self) -> Option<&Span> {
        match self {
            GrammarError::UnknownKind { span, .. }
            | GrammarError::Undefined { span, .. }
            | GrammarError::Duplicate { span, .. }
            | GrammarError::InvalidArguments { span, .. }
            | GrammarError::ThisOutsideRule { span } => span.as_ref(),
            GrammarError::Syntax(_)
            | GrammarError::InvalidBounds { .. }
            | GrammarError::Undeclared { .. }
            | GrammarError::Io(_) => None,
        }
    }
}

impl From<Vec<ParseError>> for GrammarError {
    fn from(errors: Vec<ParseError>) -> Self {
        GrammarError::Syntax(errors)
    }
}

/// ` (did you mean 'a', 'b'?)` or nothing
pub(crate) fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = suggestions.iter().map(|s| format!("'{}'", s)).collect();
    format!(" (did you mean {}?)", quoted.join(", "))
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
