//! Edge-triggered "balanced" celebration

/// Fires once each time the plan goes from unbalanced to balanced
///
/// Staying balanced across recomputations does not fire again. The
/// trigger starts out unbalanced, so a plan that is balanced on its first
/// observation fires.
#[derive(Debug, Clone, Default)]
pub struct CelebrationTrigger {
    previous: bool,
}

impl CelebrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest balanced value; true on a false→true edge
    pub fn observe(&mut self, balanced: bool) -> bool {
        let fire = balanced && !self.previous;
        self.previous = balanced;
        fire
    }
}
