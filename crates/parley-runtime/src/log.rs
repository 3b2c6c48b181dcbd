use parley_core::Turn;

/// Ordered, append-only conversation history.
///
/// Appending is the only mutation; the log never reorders or deduplicates.
/// Persistence is layered on top by [`crate::Session::append`].
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    turns: Vec<Turn>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Every turn, oldest first.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Swap in hydrated history.
    pub(crate) fn replace(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_duplicates() {
        let mut log = MessageLog::new();
        log.append(Turn::user("a"));
        log.append(Turn::assistant("b"));
        log.append(Turn::user("a"));
        let texts: Vec<&str> = log.all().iter().map(Turn::text).collect();
        assert_eq!(texts, ["a", "b", "a"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().map(Turn::text), Some("a"));
    }

    #[test]
    fn test_replace() {
        let mut log = MessageLog::new();
        log.append(Turn::user("old"));
        log.replace(vec![Turn::system("s"), Turn::user("u")]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.all()[0], Turn::system("s"));
    }
}
