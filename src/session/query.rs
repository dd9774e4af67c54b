//! Query text with a caret.

/// The prompt line being edited. The caret is a char position in `0..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    chars: Vec<char>,
    caret: usize,
}

impl QueryState {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let caret = chars.len();
        Self { chars, caret }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Replace the whole query, caret at the end.
    pub fn set(&mut self, text: &str) {
        *self = Self::new(text);
    }

    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.caret, ch);
        self.caret += 1;
    }

    // Every edit below returns true when the text changed.

    pub fn delete_backward(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret -= 1;
        self.chars.remove(self.caret);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.caret >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.caret);
        true
    }

    pub fn kill_to_end(&mut self) -> bool {
        if self.caret >= self.chars.len() {
            return false;
        }
        self.chars.truncate(self.caret);
        true
    }

    pub fn kill_to_start(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.chars.drain(..self.caret);
        self.caret = 0;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.chars.is_empty();
        self.chars.clear();
        self.caret = 0;
        changed
    }

    pub fn forward(&mut self) {
        self.caret = (self.caret + 1).min(self.chars.len());
    }

    pub fn backward(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn home(&mut self) {
        self.caret = 0;
    }

    pub fn end(&mut self) {
        self.caret = self.chars.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_at_the_caret() {
        let mut query = QueryState::new("ac");
        query.backward();
        query.insert('b');
        assert_eq!(query.text(), "abc");
        assert_eq!(query.caret(), 2);
    }

    #[test]
    fn deletions_respect_bounds() {
        let mut query = QueryState::new("xy");
        assert!(!query.delete_forward());
        assert!(query.delete_backward());
        query.home();
        assert!(!query.delete_backward());
        assert!(query.delete_forward());
        assert!(query.is_empty());
    }

    #[test]
    fn kills_split_at_the_caret() {
        let mut query = QueryState::new("hello world");
        for _ in 0..6 {
            query.backward();
        }
        let mut tail = query.clone();
        assert!(tail.kill_to_end());
        assert_eq!(tail.text(), "hello");

        assert!(query.kill_to_start());
        assert_eq!(query.text(), " world");
        assert_eq!(query.caret(), 0);
    }

    #[test]
    fn caret_moves_are_clamped() {
        let mut query = QueryState::new("ü");
        query.forward();
        assert_eq!(query.caret(), 1);
        query.home();
        query.backward();
        assert_eq!(query.caret(), 0);
        query.end();
        assert_eq!(query.caret(), 1);
    }
}
