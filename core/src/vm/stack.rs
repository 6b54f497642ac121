use crate::Vec;
use alloc::fmt;

/// A bounded stack.
///
/// Used by the VM for operand storage and for call frames. Unlike a plain
/// `Vec`, pushing past the configured maximum fails instead of growing, which
/// is how the VM enforces its stack limits.
///
/// # Examples
///
/// ```ignore
/// use lanes_core::vm::Stack;
///
/// let mut stack = Stack::new(100);
/// stack.push(42).unwrap();
/// stack.push(17).unwrap();
/// assert_eq!(stack.pop(), Some(17));
/// assert_eq!(stack.peek(), Some(&42));
/// ```
pub struct Stack<T> {
    items: Vec<T>,
    max_size: usize,
}

/// Returned by [`Stack::push`] when the stack is full. Carries the rejected value.
#[derive(Debug, PartialEq, Eq)]
pub struct Overflow<T>(pub T);

impl<T> Stack<T> {
    /// Creates a new stack holding at most `max_size` elements.
    pub fn new(max_size: usize) -> Self {
        // Pre-allocate a reasonable amount to avoid frequent reallocations
        let initial_capacity = max_size.min(64);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), Overflow<T>> {
        if self.items.len() >= self.max_size {
            return Err(Overflow(value));
        }
        self.items.push(value);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Removes the top `n` values and returns them in push order, so the
    /// deepest of them comes first.
    ///
    /// Returns `None` and leaves the stack untouched if it holds fewer than
    /// `n` values.
    pub fn pop_n(&mut self, n: usize) -> Option<Vec<T>> {
        let split = self.items.len().checked_sub(n)?;
        Some(self.items.split_off(split))
    }

    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Removes all values. The maximum size is unchanged.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Bottom-to-top view of the stack.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new(10);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(&2));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_past_limit_fails() {
        let mut stack = Stack::new(2);
        stack.push('a').unwrap();
        stack.push('b').unwrap();
        assert_eq!(stack.push('c'), Err(Overflow('c')));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_pop_n_returns_push_order() {
        let mut stack = Stack::new(10);
        for i in 1..=4 {
            stack.push(i).unwrap();
        }
        assert_eq!(stack.pop_n(3), Some(vec![2, 3, 4]));
        assert_eq!(stack.as_slice(), &[1]);
        assert_eq!(stack.pop_n(0), Some(vec![]));
    }

    #[test]
    fn test_pop_n_underflow_leaves_stack_alone() {
        let mut stack = Stack::new(10);
        stack.push(1).unwrap();
        assert_eq!(stack.pop_n(2), None);
        assert_eq!(stack.as_slice(), &[1]);
    }

    #[test]
    fn test_peek_mut_and_clear() {
        let mut stack = Stack::new(10);
        stack.push(1).unwrap();
        if let Some(top) = stack.peek_mut() {
            *top = 100;
        }
        assert_eq!(stack.peek(), Some(&100));
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.capacity(), 10);
    }
}
