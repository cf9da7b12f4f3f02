/// Nesting depth guard. Prose never nests this deep; hitting the bound means
/// the input is pathological and further opens are dropped (and logged by the
/// parser).
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("construct stack depth limit ({MAX_DEPTH}) exceeded")]
pub struct StackOverflow;

/// Ordered list of construct names currently open, outermost first.
///
/// A typed stack instead of a bare `Vec` push/pop: popping or peeking an
/// empty stack yields `None` rather than panicking, which keeps malformed
/// markup recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructStack {
    names: Vec<String>,
}

impl ConstructStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) -> Result<(), StackOverflow> {
        if self.names.len() >= MAX_DEPTH {
            return Err(StackOverflow);
        }
        self.names.push(name.into());
        Ok(())
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    /// Innermost (most recently opened) construct name.
    pub fn peek(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Names outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn get(&self, depth: usize) -> Option<&str> {
        self.names.get(depth).map(String::as_str)
    }

    /// True when `prefix` matches this stack from the outermost entry down.
    pub fn starts_with(&self, prefix: &ConstructStack) -> bool {
        prefix.depth() <= self.depth() && self.names[..prefix.depth()] == prefix.names[..]
    }

    /// Open `name` at the given depth, shifting deeper entries inward.
    /// Used by wrap, which inserts just past the selection's common prefix.
    pub fn insert(&mut self, depth: usize, name: impl Into<String>) -> Result<(), StackOverflow> {
        if self.names.len() >= MAX_DEPTH {
            return Err(StackOverflow);
        }
        let depth = depth.min(self.names.len());
        self.names.insert(depth, name.into());
        Ok(())
    }

    /// Close the entry at the given depth, shifting deeper entries outward.
    pub fn remove(&mut self, depth: usize) -> Option<String> {
        if depth < self.names.len() {
            Some(self.names.remove(depth))
        } else {
            None
        }
    }

    /// `+`-joined names, used in log messages.
    pub fn join(&self) -> String {
        self.names.join("+")
    }
}

impl<S: Into<String>> FromIterator<S> for ConstructStack {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_peek() {
        let mut stack = ConstructStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.peek(), None);

        stack.push("Italic").unwrap();
        stack.push("Bold").unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.peek(), Some("Bold"));
        assert_eq!(stack.pop(), Some("Bold".to_string()));
        assert_eq!(stack.pop(), Some("Italic".to_string()));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn overflow_at_depth_limit() {
        let mut stack = ConstructStack::new();
        for _ in 0..MAX_DEPTH {
            stack.push("Speech").unwrap();
        }
        assert_eq!(stack.push("Speech"), Err(StackOverflow));
        assert_eq!(stack.depth(), MAX_DEPTH);
    }

    #[test]
    fn starts_with_prefix() {
        let outer: ConstructStack = ["Italic"].into_iter().collect();
        let inner: ConstructStack = ["Italic", "Bold"].into_iter().collect();
        let other: ConstructStack = ["Speech"].into_iter().collect();

        assert!(inner.starts_with(&outer));
        assert!(inner.starts_with(&ConstructStack::new()));
        assert!(!outer.starts_with(&inner));
        assert!(!inner.starts_with(&other));
    }

    #[test]
    fn insert_and_remove_at_depth() {
        let mut stack: ConstructStack = ["Italic", "Bold"].into_iter().collect();
        stack.insert(1, "Speech").unwrap();
        let names: Vec<&str> = stack.iter().collect();
        assert_eq!(names, ["Italic", "Speech", "Bold"]);

        assert_eq!(stack.remove(1), Some("Speech".to_string()));
        let names: Vec<&str> = stack.iter().collect();
        assert_eq!(names, ["Italic", "Bold"]);
        assert_eq!(stack.remove(5), None);
    }

    #[test]
    fn join_for_logging() {
        let stack: ConstructStack = ["Italic", "Bold"].into_iter().collect();
        assert_eq!(stack.join(), "Italic+Bold");
        assert_eq!(ConstructStack::new().join(), "");
    }
}
