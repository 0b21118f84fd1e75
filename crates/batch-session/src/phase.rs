use std::fmt;

/// Position of a session in the settlement round.
///
/// Phases are ordered and a session only ever moves forward. The usual path
/// is `Start → BatchStarted → TreeSigningStarted → TreeNoncesAggregated →
/// BatchFinalization`; with tree signing skipped the session jumps from
/// `Start` straight to `TreeNoncesAggregated`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SessionPhase {
    /// Waiting for a batch that includes us.
    #[default]
    Start,
    /// Collecting tree fragments.
    BatchStarted,
    /// Nonces are being exchanged.
    TreeSigningStarted,
    /// Tree signatures are being delivered.
    TreeNoncesAggregated,
    /// Forfeits submitted, waiting for the commitment txid.
    BatchFinalization,
}

impl SessionPhase {
    /// Moves to `next`, which must be strictly later than the current phase.
    pub(crate) fn advance(&mut self, next: SessionPhase) {
        debug_assert!(next > *self, "phase moved backwards: {self} -> {next}");
        *self = next;
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Start => "start",
            SessionPhase::BatchStarted => "batch_started",
            SessionPhase::TreeSigningStarted => "tree_signing_started",
            SessionPhase::TreeNoncesAggregated => "tree_nonces_aggregated",
            SessionPhase::BatchFinalization => "batch_finalization",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_forward() {
        let mut phase = SessionPhase::default();
        phase.advance(SessionPhase::TreeNoncesAggregated);
        assert_eq!(phase, SessionPhase::TreeNoncesAggregated);
        phase.advance(SessionPhase::BatchFinalization);
        assert_eq!(phase, SessionPhase::BatchFinalization);
    }

    #[test]
    #[should_panic(expected = "phase moved backwards")]
    #[cfg(debug_assertions)]
    fn test_advance_backwards_panics() {
        let mut phase = SessionPhase::TreeSigningStarted;
        phase.advance(SessionPhase::BatchStarted);
    }
}
