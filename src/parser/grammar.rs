//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse grammar definition source into an AST
pub fn parse(input: &str) -> Result<GrammarFile, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    grammar_file_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn grammar_file_parser<'a, I>(
) -> impl Parser<'a, I, GrammarFile, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let expr = recursive(|expr| {
        let call = identifier
            .clone()
            .then(
                expr.separated_by(just(Token::Comma))
                    .allow_trailing()
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(constructor, args)| Expr::Call { constructor, args });

        // A call must be tried before a bare reference, both start with an identifier
        choice((
            call,
            identifier.clone().map(|id| Expr::Ref(id.node)),
            select! {
                Token::String(s) => Expr::String(s),
                Token::Number(n) => Expr::Number(n),
            },
            just(Token::This).to(Expr::This),
        ))
        .map_with(|x, e| Spanned::new(x, span_range(&e.span())))
        .boxed()
    });

    let definition = identifier
        .then_ignore(just(Token::Equals))
        .then(expr)
        .then_ignore(just(Token::Semicolon))
        .map_with(|(name, expr), e| Spanned::new(Definition { name, expr }, span_range(&e.span())));

    definition
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|definitions| GrammarFile { definitions })
}
