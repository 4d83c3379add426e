//! Lexer for the grammar definition language using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token("this")]
    This,

    #[token("=")]
    Equals,
    #[token(";")]
    Semicolon,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,

    // Identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Number(usize),

    // Comments (skip)
    #[regex(r"#[^\n]*", logos::skip)]
    HashComment,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// Input that matches no token, or a number too large for a bound
    Error(String),
}

/// Lex input string into tokens with spans
///
/// Unlexable input becomes [`Token::Error`] so the parser reports it.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input).spanned().map(move |(tok, span)| match tok {
        Ok(tok) => (tok, span),
        Err(()) => (Token::Error(input[span.clone()].to_string()), span),
    })
}
