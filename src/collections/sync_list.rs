//! Lock-guarded ordered list.
//!
//! # Responsibilities
//! - Hold an ordered sequence of entries behind a single mutex
//! - Insert and remove at both ends, by position, by predicate or by value
//! - Hand out owned copies only, never references into the list
//!
//! # Design Decisions
//! - Every operation takes the lock for its whole duration; the guard is
//!   dropped on every exit path
//! - "Empty" and "not found" are `None`/`false`/`0`, never errors
//! - Visitors run under the lock; they receive `&T`/`&mut T`, so they cannot
//!   change the element count
//! - Visitors must not call back into the same list (the mutex is not
//!   re-entrant)

use std::collections::VecDeque;

use parking_lot::Mutex;

/// An ordered, thread-safe list with copy-out accessors.
#[derive(Debug)]
pub struct SyncList<T> {
    data: Mutex<VecDeque<T>>,
}

impl<T> Default for SyncList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_back(&self, value: T) {
        self.data.lock().push_back(value);
    }

    pub fn push_front(&self, value: T) {
        self.data.lock().push_front(value);
    }

    /// Remove and return the first entry.
    pub fn pop_front(&self) -> Option<T> {
        self.data.lock().pop_front()
    }

    /// Remove and return the last entry.
    pub fn pop_back(&self) -> Option<T> {
        self.data.lock().pop_back()
    }

    /// Remove and return the entry at `index`.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        self.data.lock().remove(index)
    }

    /// Remove every entry matching `predicate`. Returns how many were removed.
    pub fn remove_if<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut data = self.data.lock();
        let before = data.len();
        data.retain(|item| !predicate(item));
        before - data.len()
    }

    /// Alias of [`SyncList::remove_if`].
    pub fn erase_if<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.remove_if(predicate)
    }

    /// Remove the earliest entry matching `predicate`.
    pub fn remove_first_if<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut data = self.data.lock();
        match data.iter().position(|item| predicate(item)) {
            Some(index) => {
                data.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.data.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Visit every entry in order under the lock.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        let data = self.data.lock();
        for item in data.iter() {
            visitor(item);
        }
    }

    /// Visit every entry in order under the lock, allowing in-place updates.
    pub fn for_each_mut<F>(&self, mut visitor: F)
    where
        F: FnMut(&mut T),
    {
        let mut data = self.data.lock();
        for item in data.iter_mut() {
            visitor(item);
        }
    }
}

impl<T: Clone> SyncList<T> {
    /// Copy of the first entry.
    pub fn front(&self) -> Option<T> {
        self.data.lock().front().cloned()
    }

    /// Copy of the last entry.
    pub fn back(&self) -> Option<T> {
        self.data.lock().back().cloned()
    }

    /// Copy of the entry at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.data.lock().get(index).cloned()
    }

    /// Copy of the first entry matching `predicate`.
    pub fn find_if<F>(&self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.data.lock().iter().find(|item| predicate(item)).cloned()
    }

    /// Copy of the whole list, in order.
    pub fn snapshot(&self) -> Vec<T> {
        self.data.lock().iter().cloned().collect()
    }
}

impl<T: PartialEq> SyncList<T> {
    /// Remove the earliest entry equal to `value`.
    pub fn erase_first(&self, value: &T) -> bool {
        self.remove_first_if(|item| item == value)
    }

    /// Remove every entry equal to `value`. Returns how many were removed.
    pub fn erase_all(&self, value: &T) -> usize {
        self.remove_if(|item| item == value)
    }
}
