//! Expansion templates and query rendering

use std::borrow::Cow;

use crate::grammar::ElementId;

use super::plist::PList;

/// Position of a pending cell in the expansion tree
#[derive(Debug, Clone, Default)]
pub(crate) struct Nesting {
    /// Structural ancestors, innermost first
    ancestors: PList<ElementId>,
    /// Times an element was entered again inside itself on this chain
    recursion: usize,
}

impl Nesting {
    /// Nesting of the children of `id` when it is expanded here
    pub(crate) fn enter(&self, id: ElementId) -> Self {
        let reentered = self.ancestors.iter().any(|ancestor| *ancestor == id);
        Self {
            ancestors: self.ancestors.push(id),
            recursion: self.recursion + usize::from(reentered),
        }
    }

    pub(crate) fn recursion(&self) -> usize {
        self.recursion
    }
}

/// One slot of an expansion template
#[derive(Debug, Clone)]
pub(crate) enum Cell<'g> {
    /// Element still to be expanded
    Pending { id: ElementId, nesting: Nesting },
    /// Resolved text
    Fragment(Cow<'g, str>),
}

impl<'g> Cell<'g> {
    pub(crate) fn pending(id: ElementId, nesting: Nesting) -> Self {
        Cell::Pending { id, nesting }
    }

    pub(crate) fn text(text: &'g str) -> Self {
        Cell::Fragment(Cow::Borrowed(text))
    }
}

/// Partially expanded query
///
/// Fragments before the first pending cell are never revisited, so they are
/// moved into `emitted` (newest first) as soon as they are reached. Both
/// halves are persistent lists, which lets every candidate of a step share
/// the unchanged prefix and tail with its siblings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Template<'g> {
    emitted: PList<Cow<'g, str>>,
    rest: PList<Cell<'g>>,
}

/// Outcome of [`Template::advance`]
pub(crate) enum Advance<'g> {
    /// No pending cell is left
    Complete(String),
    /// First pending cell, and the template without it
    Pending {
        id: ElementId,
        nesting: Nesting,
        template: Template<'g>,
    },
}

impl<'g> Template<'g> {
    /// Template holding only the start element
    pub(crate) fn start(id: ElementId) -> Self {
        Self {
            emitted: PList::new(),
            rest: PList::new().push(Cell::pending(id, Nesting::default())),
        }
    }

    /// Move to the first pending cell, taking it out of the template
    pub(crate) fn advance(self) -> Advance<'g> {
        let mut emitted = self.emitted;
        let mut rest = self.rest;
        loop {
            let Some((cell, tail)) = rest.pop() else {
                return Advance::Complete(render_reversed(&emitted));
            };
            match cell {
                Cell::Fragment(text) => emitted = emitted.push(text.clone()),
                Cell::Pending { id, nesting } => {
                    return Advance::Pending {
                        id: *id,
                        nesting: nesting.clone(),
                        template: Template {
                            emitted,
                            rest: tail,
                        },
                    }
                }
            }
            rest = tail;
        }
    }

    /// Template with `cells` placed in front of the remaining cells
    pub(crate) fn substitute(&self, cells: Vec<Cell<'g>>) -> Self {
        let rest = cells
            .into_iter()
            .rev()
            .fold(self.rest.clone(), |rest, cell| rest.push(cell));
        Self {
            emitted: self.emitted.clone(),
            rest,
        }
    }
}

fn render_reversed(emitted: &PList<Cow<'_, str>>) -> String {
    let mut fragments: Vec<&str> = emitted.iter().map(|f| f.as_ref()).collect();
    fragments.reverse();
    render(&fragments)
}

/// Join fragments with a single space and trim the result
///
/// Empty fragments still contribute their separator, so an omitted element
/// in the middle of a query leaves a double space.
pub fn render<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
