//! # Recursion Guard
//!
//! Tracks which groups are being expanded on the current call path.

/// Ordered stack of group ids currently being expanded.
///
/// A group id is pushed when expansion descends into it and popped when that
/// expansion returns. Attempting to enter an id that is already on the stack
/// is a cycle.
///
/// # Examples
///
/// ```
/// use item_groups::RecursionGuard;
///
/// let mut guard = RecursionGuard::new();
/// assert!(guard.enter("tools"));
/// assert!(!guard.enter("tools"));
/// guard.leave("tools");
/// assert!(guard.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecursionGuard {
    stack: Vec<String>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `group_id` is on the current expansion path.
    pub fn contains(&self, group_id: &str) -> bool {
        self.stack.iter().any(|id| id == group_id)
    }

    /// Pushes `group_id`, unless it is already present.
    ///
    /// Returns false on a cycle; the stack is left untouched in that case.
    pub fn enter(&mut self, group_id: &str) -> bool {
        if self.contains(group_id) {
            return false;
        }
        self.stack.push(group_id.to_string());
        true
    }

    /// Pops `group_id`, which must be the innermost entry.
    pub fn leave(&mut self, group_id: &str) {
        let popped = self.stack.pop();
        debug_assert_eq!(popped.as_deref(), Some(group_id), "unbalanced recursion guard");
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current expansion path, outermost first.
    pub fn path(&self) -> &[String] {
        &self.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_discipline() {
        let mut guard = RecursionGuard::new();
        assert!(guard.enter("a"));
        assert!(guard.enter("b"));
        assert_eq!(guard.path(), ["a".to_string(), "b".to_string()]);
        assert_eq!(guard.depth(), 2);

        // Re-entering "a" from inside "b" is a cycle and must not push
        assert!(!guard.enter("a"));
        assert_eq!(guard.depth(), 2);

        guard.leave("b");
        guard.leave("a");
        assert!(guard.is_empty());
        assert!(guard.enter("a"));
    }
}
