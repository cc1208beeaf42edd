use tracing::warn;

/// Turns the host's advance counter into "draw the next challenge" events.
///
/// The host owns a counter that only grows while an exercise is mounted. The bridge
/// remembers the last value it reacted to and reports a transition exactly when the
/// counter moves past it. The first value it sees is a baseline, because the exercise
/// draws its first challenge on mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSignalBridge {
    previous: Option<u64>,
}

impl AdvanceSignalBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value the bridge reacted to (or took as baseline).
    #[must_use]
    pub fn previous(&self) -> Option<u64> {
        self.previous
    }

    /// Feeds the host's current value. Returns `true` when a new challenge must be drawn.
    pub fn observe(&mut self, current: Option<u64>) -> bool {
        let Some(current) = current else {
            return false;
        };
        match self.previous {
            None => {
                self.previous = Some(current);
                false
            }
            Some(previous) if current > previous => {
                self.previous = Some(current);
                true
            }
            Some(previous) if current < previous => {
                warn!(previous, current, "advance signal went backwards; ignoring");
                false
            }
            Some(_) => false,
        }
    }
}
