//! A FIFO queue used for pending messages and for the global dispatch queue.

use std::collections::VecDeque;
use std::fmt;

/// A generic first-in first-out queue.
///
/// `push`, `pop` and the front/back accessors are `O(1)`. Searching and
/// removal by value scan the queue and are `O(N)`.
///
/// The enumeration helpers borrow the queue, so a predicate cannot mutate
/// the queue it is enumerating.
///
/// ```
/// use weft_core::Queue;
///
/// let mut q: Queue<i32> = [0, 1, 2].into_iter().collect();
/// assert_eq!(q.len(), 3);
/// assert_eq!(q.pop(), Some(0));
/// q.push(42);
/// assert_eq!(q.pop(), Some(1));
/// assert_eq!(q.pop(), Some(2));
/// assert_eq!(q.pop(), Some(42));
/// assert_eq!(q.pop(), None);
/// assert!(q.is_empty());
/// ```
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The value at the front of the queue, if any.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// The value at the back of the queue, if any.
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Append a value to the back of the queue.
    pub fn push(&mut self, value: T) {
        self.items.push_back(value);
    }

    /// Remove and return the value at the front of the queue.
    ///
    /// Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove the first value matching `pred`. Returns `true` if one was removed.
    pub fn remove_first_by(&mut self, mut pred: impl FnMut(&T) -> bool) -> bool {
        match self.items.iter().position(|item| pred(item)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every value matching `pred`, preserving the order of the rest.
    ///
    /// Returns the number of values removed.
    pub fn remove_all_by(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Whether any value passes `pred`.
    pub fn any(&self, pred: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().any(pred)
    }

    /// Whether every value passes `pred`. `true` for an empty queue.
    pub fn all(&self, pred: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().all(pred)
    }

    /// Collect the values passing `pred`, front to back.
    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.items.iter().filter(|item| pred(item)).collect()
    }

    /// Map every value, front to back.
    pub fn map<R>(&self, f: impl FnMut(&T) -> R) -> Vec<R> {
        self.items.iter().map(f).collect()
    }

    /// Visit values front to back, stopping at the first callback that
    /// returns `Some`.
    pub fn for_each_until<R>(&self, mut f: impl FnMut(&T, usize) -> Option<R>) -> Option<R> {
        self.items
            .iter()
            .enumerate()
            .find_map(|(index, item)| f(item, index))
    }
}

impl<T: PartialEq> Queue<T> {
    /// Remove the first occurrence of `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        self.remove_first_by(|item| item == value)
    }

    /// Remove every occurrence of `value`, returning how many were removed.
    pub fn remove_all(&mut self, value: &T) -> usize {
        self.remove_all_by(|item| item == value)
    }
}

impl<T: Clone> Queue<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
#[path = "tests/queue_tests.rs"]
mod tests;
