//! Turn tracking.
//!
//! The tracker only counts turns. Resetting turn-scoped effects at each
//! boundary is the session's job (see `GameSession::advance_turn`), so the
//! tracker can be restored from a saved document without side effects.

/// Current turn number of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnTracker {
    first_turn: u32,
    current: u32,
}

impl TurnTracker {
    /// Create a tracker starting at `first_turn`.
    #[must_use]
    pub fn new(first_turn: u32) -> Self {
        assert!(first_turn > 0, "Turns are numbered from 1");
        Self {
            first_turn,
            current: first_turn,
        }
    }

    /// The current turn number.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Whether no turn boundary has been crossed yet.
    #[must_use]
    pub fn is_first_turn(&self) -> bool {
        self.current == self.first_turn
    }

    /// Advance to the next turn and return its number.
    pub fn advance(&mut self) -> u32 {
        self.current = self.current.saturating_add(1);
        self.current
    }

    /// Restore a saved turn number. Values below the first turn are clamped.
    pub fn restore(&mut self, turn: u32) {
        self.current = turn.max(self.first_turn);
    }

    /// Back to the first turn (new game).
    pub fn reset(&mut self) {
        self.current = self.first_turn;
    }
}

impl Default for TurnTracker {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut turns = TurnTracker::default();
        assert_eq!(turns.current(), 1);
        assert!(turns.is_first_turn());

        assert_eq!(turns.advance(), 2);
        assert_eq!(turns.current(), 2);
        assert!(!turns.is_first_turn());
    }

    #[test]
    fn test_restore_and_reset() {
        let mut turns = TurnTracker::new(1);
        turns.restore(7);
        assert_eq!(turns.current(), 7);

        turns.restore(0);
        assert_eq!(turns.current(), 1); // Clamped

        turns.restore(4);
        turns.reset();
        assert_eq!(turns.current(), 1);
    }

    #[test]
    #[should_panic(expected = "Turns are numbered from 1")]
    fn test_zero_first_turn() {
        let _ = TurnTracker::new(0);
    }
}
