//! Ancestor path of the element being expanded

use std::fmt;

use super::plist::PList;

/// Names of the elements expanded on the current branch, newest first
///
/// Expansion is one left-to-right recursion, so the path holds every named
/// element expanded before the current one on this branch: its structural
/// ancestors and the siblings to its left (a keyword preceding a value, for
/// instance). Each step gets its own path; pushing never affects siblings.
#[derive(Debug, Clone, Default)]
pub struct AncestorPath<'g> {
    names: PList<&'g str>,
    len: usize,
}

impl<'g> AncestorPath<'g> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new path with `name` as its most recent entry
    pub fn push(&self, name: &'g str) -> Self {
        Self {
            names: self.names.push(name),
            len: self.len + 1,
        }
    }

    /// Names from the most recent to the oldest
    pub fn iter(&self) -> impl Iterator<Item = &'g str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Names from the oldest to the most recent
    pub fn to_vec(&self) -> Vec<String> {
        let mut names: Vec<String> = self.iter().map(str::to_string).collect();
        names.reverse();
        names
    }
}

impl fmt::Display for AncestorPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_vec().join(" > "))
    }
}
