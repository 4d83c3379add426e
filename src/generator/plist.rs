//! Persistent singly linked list

use std::rc::Rc;

#[derive(Debug)]
struct Link<T> {
    value: T,
    next: PList<T>,
}

/// Immutable list with shared tails
///
/// `push` and `pop` never copy existing links, so sibling branches of the
/// expansion share everything they have in common.
#[derive(Debug)]
pub(crate) struct PList<T> {
    head: Option<Rc<Link<T>>>,
}

impl<T> Clone for PList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for PList<T> {
    fn default() -> Self {
        Self { head: None }
    }
}

impl<T> PList<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, value: T) -> Self {
        Self {
            head: Some(Rc::new(Link {
                value,
                next: self.clone(),
            })),
        }
    }

    /// First value and the remaining list
    pub(crate) fn pop(&self) -> Option<(&T, PList<T>)> {
        self.head
            .as_deref()
            .map(|link| (&link.value, link.next.clone()))
    }

    /// Values from the head onwards
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

pub(crate) struct Iter<'a, T> {
    next: Option<&'a Link<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|link| {
            self.next = link.next.head.as_deref();
            &link.value
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_shares_tail() {
        let base = PList::new().push(1).push(2);
        let left = base.push(3);
        let right = base.push(4);

        assert_eq!(left.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(right.iter().copied().collect::<Vec<_>>(), vec![4, 2, 1]);
        assert_eq!(base.iter().count(), 2);
    }

    #[test]
    fn test_pop() {
        let list = PList::new().push("a").push("b");
        let (head, rest) = list.pop().unwrap();
        assert_eq!(*head, "b");
        assert_eq!(rest.iter().copied().collect::<Vec<_>>(), vec!["a"]);
        assert!(PList::<u8>::new().pop().is_none());
    }
}
