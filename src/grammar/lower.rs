//! Lowering from the grammar AST to the element arena

use crate::parser::ast::{Expr, GrammarFile, Span, Spanned};

use super::builder::GrammarBuilder;
use super::error::GrammarError;
use super::suggest::find_similar;
use super::types::{ElementId, ElementKind, Grammar, Kind};

/// Lower a parsed grammar file into a [`Grammar`]
///
/// Every definition is declared before any is lowered, so references may
/// point forward.
pub fn lower(file: &GrammarFile) -> Result<Grammar, GrammarError> {
    let mut builder = GrammarBuilder::new();

    let mut slots = Vec::with_capacity(file.definitions.len());
    for def in &file.definitions {
        let name = def.node.name.node.as_str();
        let slot = builder.declare(name).map_err(|_| GrammarError::Duplicate {
            name: name.to_string(),
            span: Some(def.node.name.span.clone()),
        })?;
        slots.push(slot);
    }

    let mut lowerer = Lowerer {
        builder,
        rules: Vec::new(),
    };
    for (def, slot) in file.definitions.iter().zip(slots) {
        lowerer.define(slot, &def.node.expr)?;
    }

    lowerer.builder.build()
}

struct Lowerer {
    builder: GrammarBuilder,
    /// Enclosing rules, innermost last, for resolving `this`
    rules: Vec<ElementId>,
}

impl Lowerer {
    /// Lower `expr` into an already reserved slot
    fn define(&mut self, slot: ElementId, expr: &Spanned<Expr>) -> Result<(), GrammarError> {
        let kind = match &expr.node {
            Expr::Call { constructor, args } => {
                self.call(slot, constructor.node.as_str(), args, &constructor.span)?
            }
            Expr::String(s) => ElementKind::Literal(s.clone()),
            // An alias is a single-element sequence so it keeps its own name
            Expr::Ref(_) | Expr::This => ElementKind::Sequence(vec![self.element(expr)?]),
            Expr::Number(_) => {
                return Err(GrammarError::invalid_arguments(
                    "definition",
                    "a number is not a grammar element",
                    expr.span.clone(),
                ))
            }
        };
        self.builder.define(slot, kind)
    }

    /// Lower an argument that must denote an element
    fn element(&mut self, expr: &Spanned<Expr>) -> Result<ElementId, GrammarError> {
        match &expr.node {
            Expr::String(s) => Ok(self.builder.literal(s.clone())),
            Expr::Ref(name) => self.builder.is_declared(name.as_str()).ok_or_else(|| {
                let suggestions =
                    find_similar(self.builder.declared_names(), name.as_str(), 2);
                GrammarError::undefined(name.as_str(), expr.span.clone(), suggestions)
            }),
            Expr::This => self.rules.last().copied().ok_or(GrammarError::ThisOutsideRule {
                span: Some(expr.span.clone()),
            }),
            Expr::Call { .. } => {
                let slot = self.builder.reserve();
                self.define(slot, expr)?;
                Ok(slot)
            }
            Expr::Number(_) => Err(GrammarError::invalid_arguments(
                "element",
                "expected an element, found a number",
                expr.span.clone(),
            )),
        }
    }

    fn elements(&mut self, args: &[Spanned<Expr>]) -> Result<Vec<ElementId>, GrammarError> {
        args.iter().map(|arg| self.element(arg)).collect()
    }

    fn call(
        &mut self,
        slot: ElementId,
        constructor: &str,
        args: &[Spanned<Expr>],
        span: &Span,
    ) -> Result<ElementKind, GrammarError> {
        let kind = Kind::from_constructor(constructor)
            .ok_or_else(|| GrammarError::unknown_kind(constructor, span.clone()))?;
        let invalid = |reason: &str| {
            Err(GrammarError::invalid_arguments(
                constructor,
                reason,
                span.clone(),
            ))
        };

        match kind {
            Kind::Literal | Kind::Keyword | Kind::Regex => {
                let [arg] = args else {
                    return invalid("expected exactly one string");
                };
                let Expr::String(text) = &arg.node else {
                    return invalid(&format!("expected a string, found {}", arg.node.describe()));
                };
                Ok(match kind {
                    Kind::Literal => ElementKind::Literal(text.clone()),
                    Kind::Keyword => ElementKind::Keyword(text.clone()),
                    _ => ElementKind::Regex(text.clone()),
                })
            }
            Kind::TokenSet => {
                let mut tokens = Vec::new();
                for arg in args {
                    let Expr::String(text) = &arg.node else {
                        return invalid(&format!("expected strings, found {}", arg.node.describe()));
                    };
                    tokens.extend(text.split_whitespace().map(str::to_string));
                }
                if tokens.is_empty() {
                    return invalid("expected at least one token");
                }
                Ok(ElementKind::TokenSet(tokens))
            }
            Kind::Sequence | Kind::Choice => {
                if args.is_empty() {
                    return invalid("expected at least one element");
                }
                let children = self.elements(args)?;
                Ok(if kind == Kind::Sequence {
                    ElementKind::Sequence(children)
                } else {
                    ElementKind::Choice(children)
                })
            }
            Kind::NamedRule => {
                if args.is_empty() {
                    return invalid("expected at least one alternative");
                }
                self.rules.push(slot);
                let alternatives = self.elements(args);
                self.rules.pop();
                Ok(ElementKind::NamedRule(alternatives?))
            }
            Kind::Optional => {
                let [arg] = args else {
                    return invalid("expected exactly one element");
                };
                Ok(ElementKind::Optional(self.element(arg)?))
            }
            Kind::List => {
                if !(2..=4).contains(&args.len()) {
                    return invalid("expected list(element, delimiter, min?, max?)");
                }
                let element = self.element(&args[0])?;
                let delimiter = self.element(&args[1])?;
                let (min, max) = bounds(constructor, &args[2..])?;
                Ok(ElementKind::List {
                    element,
                    delimiter,
                    min,
                    max,
                })
            }
            Kind::Repeat => {
                if !(1..=3).contains(&args.len()) {
                    return invalid("expected repeat(element, min?, max?)");
                }
                let element = self.element(&args[0])?;
                let (min, max) = bounds(constructor, &args[1..])?;
                Ok(ElementKind::Repeat { element, min, max })
            }
        }
    }
}

/// Optional `min, max` number arguments; min defaults to 0, max to unbounded
fn bounds(constructor: &str, args: &[Spanned<Expr>]) -> Result<(usize, Option<usize>), GrammarError> {
    let mut numbers = Vec::with_capacity(args.len());
    for arg in args {
        match arg.node {
            Expr::Number(n) => numbers.push(n),
            _ => {
                return Err(GrammarError::invalid_arguments(
                    constructor,
                    format!("expected a number bound, found {}", arg.node.describe()),
                    arg.span.clone(),
                ))
            }
        }
    }
    Ok((numbers.first().copied().unwrap_or(0), numbers.get(1).copied()))
}
