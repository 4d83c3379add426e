//! Abstract Syntax Tree types for the grammar definition language

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root AST node - a complete grammar file
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarFile {
    pub definitions: Vec<Spanned<Definition>>,
}

/// `name = expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: Spanned<Identifier>,
    pub expr: Spanned<Expr>,
}

/// Right-hand side of a definition or a constructor argument
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Quoted string: an anonymous literal, or a constructor's text argument
    String(String),
    /// Bare number, only meaningful as a bound argument
    Number(usize),
    /// Reference to another definition
    Ref(Identifier),
    /// Self-reference to the enclosing rule
    This,
    /// `constructor(args...)`
    Call {
        constructor: Spanned<Identifier>,
        args: Vec<Spanned<Expr>>,
    },
}

impl Expr {
    /// Short description for argument errors
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::String(_) => "string",
            Expr::Number(_) => "number",
            Expr::Ref(_) => "reference",
            Expr::This => "'this'",
            Expr::Call { .. } => "constructor call",
        }
    }
}
