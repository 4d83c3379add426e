//! Grammar element types

use std::collections::HashMap;
use std::fmt;

/// Index of an element in a [`Grammar`] arena
///
/// Only valid for the grammar built by the same [`GrammarBuilder`](super::GrammarBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind tag of a grammar element, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Literal,
    Keyword,
    TokenSet,
    Regex,
    Sequence,
    List,
    Repeat,
    Optional,
    Choice,
    NamedRule,
}

impl Kind {
    /// Map a constructor name from the grammar language to a kind
    pub fn from_constructor(name: &str) -> Option<Kind> {
        match name {
            "token" | "literal" => Some(Kind::Literal),
            "keyword" => Some(Kind::Keyword),
            "tokens" => Some(Kind::TokenSet),
            "regex" => Some(Kind::Regex),
            "seq" | "sequence" => Some(Kind::Sequence),
            "list" => Some(Kind::List),
            "repeat" => Some(Kind::Repeat),
            "optional" => Some(Kind::Optional),
            "choice" => Some(Kind::Choice),
            "rule" | "prio" => Some(Kind::NamedRule),
            _ => None,
        }
    }

    /// Terminals resolve directly to text
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Kind::Literal | Kind::Keyword | Kind::TokenSet | Kind::Regex
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Literal => "Literal",
            Kind::Keyword => "Keyword",
            Kind::TokenSet => "TokenSet",
            Kind::Regex => "Regex",
            Kind::Sequence => "Sequence",
            Kind::List => "List",
            Kind::Repeat => "Repeat",
            Kind::Optional => "Optional",
            Kind::Choice => "Choice",
            Kind::NamedRule => "NamedRule",
        };
        write!(f, "{}", s)
    }
}

/// Element payload, one variant per construct
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Fixed token text
    Literal(String),
    /// Keyword text
    Keyword(String),
    /// Interchangeable literal tokens
    TokenSet(Vec<String>),
    /// Regex terminal; the pattern is kept for display only
    Regex(String),
    /// Ordered children
    Sequence(Vec<ElementId>),
    /// Delimited list with inclusive bounds, `max: None` is unbounded
    List {
        element: ElementId,
        delimiter: ElementId,
        min: usize,
        max: Option<usize>,
    },
    /// Undelimited repetition with inclusive bounds
    Repeat {
        element: ElementId,
        min: usize,
        max: Option<usize>,
    },
    Optional(ElementId),
    /// Ordered alternatives
    Choice(Vec<ElementId>),
    /// Alternatives of a possibly self-referential rule
    NamedRule(Vec<ElementId>),
}

impl ElementKind {
    pub fn tag(&self) -> Kind {
        match self {
            ElementKind::Literal(_) => Kind::Literal,
            ElementKind::Keyword(_) => Kind::Keyword,
            ElementKind::TokenSet(_) => Kind::TokenSet,
            ElementKind::Regex(_) => Kind::Regex,
            ElementKind::Sequence(_) => Kind::Sequence,
            ElementKind::List { .. } => Kind::List,
            ElementKind::Repeat { .. } => Kind::Repeat,
            ElementKind::Optional(_) => Kind::Optional,
            ElementKind::Choice(_) => Kind::Choice,
            ElementKind::NamedRule(_) => Kind::NamedRule,
        }
    }
}

/// A node of the grammar tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name: Option<String>,
    pub(crate) kind: ElementKind,
}

impl Element {
    pub fn new(name: Option<String>, kind: ElementKind) -> Self {
        Self { name, kind }
    }

    pub fn kind(&self) -> Kind {
        self.kind.tag()
    }

    pub fn payload(&self) -> &ElementKind {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sequence members, choice or rule alternatives, or the single
    /// wrapped element of List/Repeat/Optional
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Sequence(children)
            | ElementKind::Choice(children)
            | ElementKind::NamedRule(children) => children,
            ElementKind::List { element, .. }
            | ElementKind::Repeat { element, .. }
            | ElementKind::Optional(element) => std::slice::from_ref(element),
            ElementKind::Literal(_)
            | ElementKind::Keyword(_)
            | ElementKind::TokenSet(_)
            | ElementKind::Regex(_) => &[],
        }
    }

    /// Inclusive `(min, max)` for List and Repeat
    pub fn bounds(&self) -> Option<(usize, Option<usize>)> {
        match &self.kind {
            ElementKind::List { min, max, .. } | ElementKind::Repeat { min, max, .. } => {
                Some((*min, *max))
            }
            _ => None,
        }
    }

    pub fn delimiter(&self) -> Option<ElementId> {
        match &self.kind {
            ElementKind::List { delimiter, .. } => Some(*delimiter),
            _ => None,
        }
    }

    /// Text of a Literal or Keyword; token-set members are joined by spaces
    pub fn literal_value(&self) -> Option<String> {
        match &self.kind {
            ElementKind::Literal(s) | ElementKind::Keyword(s) => Some(s.clone()),
            ElementKind::TokenSet(tokens) => Some(tokens.join(" ")),
            _ => None,
        }
    }
}

/// Immutable arena of grammar elements
///
/// Elements reference each other by [`ElementId`], so recursive rules are
/// plain ids pointing back at an enclosing rule.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) elements: Vec<Element>,
    pub(crate) names: HashMap<String, ElementId>,
    /// Named elements in definition order
    pub(crate) order: Vec<ElementId>,
}

impl Grammar {
    /// Element for an id handed out while building this grammar
    ///
    /// # Panics
    ///
    /// Ids are only meaningful for the grammar that created them; an id
    /// from another builder may be out of range.
    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Like [`get`](Self::get), but `None` for an out-of-range id
    pub fn try_get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn lookup(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    /// Named elements in definition order
    pub fn names(&self) -> impl Iterator<Item = (&str, ElementId)> + '_ {
        self.order.iter().filter_map(move |id| {
            self.elements[id.0].name().map(|name| (name, *id))
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
