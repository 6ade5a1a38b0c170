//! Handle Order Module
//!
//! Doubly linked list over arena handles. Links live in a vector indexed by
//! handle, so append, unlink and move-to-back are all O(1) without hashing.

use crate::cache::arena::Handle;

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<Handle>,
    next: Option<Handle>,
    linked: bool,
}

// == Handle List ==
/// Ordered set of handles: front = oldest, back = newest.
#[derive(Debug, Default)]
pub struct HandleList {
    links: Vec<Link>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl HandleList {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Back ==
    /// Appends a handle at the newest position.
    ///
    /// A handle that is already linked is moved instead of duplicated.
    pub fn push_back(&mut self, handle: Handle) {
        if self.contains(handle) {
            self.move_to_back(handle);
            return;
        }

        let index = handle.index();
        if index >= self.links.len() {
            self.links.resize(index + 1, Link::default());
        }

        self.links[index] = Link {
            prev: self.tail,
            next: None,
            linked: true,
        };
        match self.tail {
            Some(tail) => self.links[tail.index()].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
    }

    // == Unlink ==
    /// Removes a handle. Returns false if it was not linked.
    pub fn unlink(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }

        let Link { prev, next, .. } = self.links[handle.index()];
        match prev {
            Some(prev) => self.links[prev.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.links[next.index()].prev = prev,
            None => self.tail = prev,
        }
        self.links[handle.index()] = Link::default();
        self.len -= 1;
        true
    }

    // == Move To Back ==
    /// Moves a linked handle to the newest position. Returns false if absent.
    pub fn move_to_back(&mut self, handle: Handle) -> bool {
        if self.tail == Some(handle) {
            return true;
        }
        if !self.unlink(handle) {
            return false;
        }
        self.push_back(handle);
        true
    }

    /// Oldest handle, if any.
    pub fn front(&self) -> Option<Handle> {
        self.head
    }

    /// Newest handle, if any.
    #[cfg(test)]
    pub fn back(&self) -> Option<Handle> {
        self.tail
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.links
            .get(handle.index())
            .map_or(false, |link| link.linked)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }
}

// == Iterator ==
/// Oldest-to-newest iterator over a [`HandleList`].
pub struct Iter<'a> {
    list: &'a HandleList,
    next: Option<Handle>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let current = self.next?;
        self.next = self.list.links[current.index()].next;
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
