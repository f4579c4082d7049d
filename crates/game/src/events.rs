/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Draw,
    Winner(u8),
}

impl Outcome {
    /// Maps the wire winner id (-1 draw, 0 or 1 player slot) to an outcome.
    pub fn from_winner_id(id: i8) -> Option<Self> {
        match id {
            -1 => Some(Outcome::Draw),
            0 | 1 => Some(Outcome::Winner(id as u8)),
            _ => None,
        }
    }
}

/// One-shot notifications for the presentation layer, drained once per tick.
/// Continuous state (positions, maze geometry, scores) is read through the
/// session accessors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The maze model has been built from the first SETUP record.
    MazeReady,
    ScoreChanged { scores: [u32; 2] },
    /// A diamond was picked up somewhere; used for the pickup cue.
    PickupCue,
    DiamondsChanged,
    GameOver { outcome: Outcome, scores: [u32; 2] },
    ShutdownRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_winner_id() {
        assert_eq!(Outcome::from_winner_id(-1), Some(Outcome::Draw));
        assert_eq!(Outcome::from_winner_id(0), Some(Outcome::Winner(0)));
        assert_eq!(Outcome::from_winner_id(1), Some(Outcome::Winner(1)));
        assert_eq!(Outcome::from_winner_id(2), None);
    }
}
