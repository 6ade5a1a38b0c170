//! Entry Arena Module
//!
//! Slot storage handing out stable integer handles. A handle is the identity
//! of one stored entry: two entries holding equal values still get distinct
//! handles, and a handle stays valid until its slot is removed.

// == Handle ==
/// Stable identity of an entry stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Position of the slot inside the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

// == Arena ==
/// Vector of optional slots with a free list for reuse.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    // == Insert ==
    /// Stores a value and returns its handle, reusing a freed slot if any.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                Handle(index)
            }
            None => {
                self.slots.push(Some(value));
                Handle(self.slots.len() - 1)
            }
        }
    }

    // == Remove ==
    /// Takes the value out of its slot. Returns None for a vacant handle.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let value = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.0)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.0)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every value and forgets all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
