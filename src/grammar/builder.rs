//! Programmatic grammar construction

use std::collections::HashMap;

use super::error::GrammarError;
use super::types::{Element, ElementId, ElementKind, Grammar};

/// Builds a [`Grammar`] arena
///
/// Recursive rules are built by declaring the name first, then defining
/// it once the alternatives (which may reference the declared id) exist:
///
/// ```rust
/// use querygen::grammar::{ElementKind, GrammarBuilder};
///
/// let mut b = GrammarBuilder::new();
/// let rule = b.declare("R").unwrap();
/// let kw = b.keyword("r");
/// let recursive = b.sequence(vec![kw, rule]);
/// let base = b.literal("base");
/// b.define(rule, ElementKind::NamedRule(vec![recursive, base])).unwrap();
/// let grammar = b.build().unwrap();
/// assert_eq!(grammar.lookup("R"), Some(rule));
/// ```
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    slots: Vec<(Option<String>, Option<ElementKind>)>,
    names: HashMap<String, ElementId>,
    order: Vec<ElementId>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an anonymous element
    pub fn add(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId(self.slots.len());
        self.slots.push((None, Some(kind)));
        id
    }

    /// Add a named element
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        kind: ElementKind,
    ) -> Result<ElementId, GrammarError> {
        let id = self.declare(name)?;
        self.define(id, kind)?;
        Ok(id)
    }

    /// Reserve a named slot to be filled by [`define`](Self::define)
    pub fn declare(&mut self, name: impl Into<String>) -> Result<ElementId, GrammarError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GrammarError::Duplicate { name, span: None });
        }
        let id = ElementId(self.slots.len());
        self.slots.push((Some(name.clone()), None));
        self.names.insert(name, id);
        self.order.push(id);
        Ok(id)
    }

    /// Reserve an anonymous slot, for rules whose alternatives refer back to it
    pub fn reserve(&mut self) -> ElementId {
        let id = ElementId(self.slots.len());
        self.slots.push((None, None));
        id
    }

    /// Fill a slot reserved by [`declare`](Self::declare) or [`reserve`](Self::reserve)
    pub fn define(&mut self, id: ElementId, kind: ElementKind) -> Result<(), GrammarError> {
        let (name, slot) = &mut self.slots[id.0];
        if slot.is_some() {
            return Err(GrammarError::Duplicate {
                name: name.clone().unwrap_or_else(|| format!("#{}", id.0)),
                span: None,
            });
        }
        *slot = Some(kind);
        Ok(())
    }

    pub fn is_declared(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub(crate) fn declared_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.keys().map(String::as_str)
    }

    pub fn literal(&mut self, text: impl Into<String>) -> ElementId {
        self.add(ElementKind::Literal(text.into()))
    }

    pub fn keyword(&mut self, text: impl Into<String>) -> ElementId {
        self.add(ElementKind::Keyword(text.into()))
    }

    pub fn tokens<S: Into<String>>(&mut self, tokens: impl IntoIterator<Item = S>) -> ElementId {
        self.add(ElementKind::TokenSet(
            tokens.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn sequence(&mut self, children: Vec<ElementId>) -> ElementId {
        self.add(ElementKind::Sequence(children))
    }

    pub fn choice(&mut self, alternatives: Vec<ElementId>) -> ElementId {
        self.add(ElementKind::Choice(alternatives))
    }

    pub fn optional(&mut self, element: ElementId) -> ElementId {
        self.add(ElementKind::Optional(element))
    }

    pub fn list(
        &mut self,
        element: ElementId,
        delimiter: ElementId,
        min: usize,
        max: Option<usize>,
    ) -> ElementId {
        self.add(ElementKind::List {
            element,
            delimiter,
            min,
            max,
        })
    }

    pub fn repeat(&mut self, element: ElementId, min: usize, max: Option<usize>) -> ElementId {
        self.add(ElementKind::Repeat { element, min, max })
    }

    /// Finish the arena, checking every slot is defined and bounds are sane
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut elements = Vec::with_capacity(self.slots.len());
        for (index, (name, kind)) in self.slots.into_iter().enumerate() {
            let Some(kind) = kind else {
                return Err(GrammarError::Undeclared {
                    name: name.unwrap_or_else(|| format!("#{}", index)),
                });
            };
            if let ElementKind::List {
                min, max: Some(max), ..
            }
            | ElementKind::Repeat {
                min, max: Some(max), ..
            } = &kind
            {
                if min > max {
                    return Err(GrammarError::InvalidBounds {
                        element: name.unwrap_or_else(|| format!("#{}", index)),
                        min: *min,
                        max: *max,
                    });
                }
            }
            elements.push(Element::new(name, kind));
        }

        Ok(Grammar {
            elements,
            names: self.names,
            order: self.order,
        })
    }
}
