//! Cutoff policies deciding when a branch stops expanding
//!
//! A cutoff that fires is treated exactly like running out of depth: the
//! search scores the state with its evaluator and stops descending.

use std::time::{Duration, Instant};

use chexers_core::State;

/// Decides whether the search stops at `state`, reached at `depth`
pub trait Cutoff: Send + Sync {
    fn cutoff(&self, state: &State, depth: u32) -> bool;

    /// Called once at the start of every search
    fn reset(&mut self) {}
}

impl<F> Cutoff for F
where
    F: Fn(&State, u32) -> bool + Send + Sync,
{
    fn cutoff(&self, state: &State, depth: u32) -> bool {
        self(state, depth)
    }
}

/// Stops once the depth exceeds `max_depth`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthLimitCutoff {
    pub max_depth: u32,
}

impl DepthLimitCutoff {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl Cutoff for DepthLimitCutoff {
    fn cutoff(&self, _state: &State, depth: u32) -> bool {
        self.max_depth < depth
    }
}

/// Depth limit combined with a wall-clock budget per search
#[derive(Clone, Debug)]
pub struct DeadlineCutoff {
    depth: DepthLimitCutoff,
    budget: Duration,
    deadline: Instant,
}

impl DeadlineCutoff {
    pub fn new(max_depth: u32, budget: Duration) -> Self {
        Self {
            depth: DepthLimitCutoff::new(max_depth),
            budget,
            deadline: Instant::now() + budget,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl Cutoff for DeadlineCutoff {
    fn cutoff(&self, state: &State, depth: u32) -> bool {
        self.depth.cutoff(state, depth) || self.expired()
    }

    fn reset(&mut self) {
        self.deadline = Instant::now() + self.budget;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chexers_core::Game;

    #[test]
    fn test_depth_limit() {
        let state = Game::default().initial_state();
        let cutoff = DepthLimitCutoff::new(2);
        assert!(!cutoff.cutoff(&state, 1));
        assert!(!cutoff.cutoff(&state, 2));
        assert!(cutoff.cutoff(&state, 3));
    }

    #[test]
    fn test_deadline_expires() {
        let state = Game::default().initial_state();
        let mut cutoff = DeadlineCutoff::new(10, Duration::ZERO);
        assert!(cutoff.cutoff(&state, 0));

        let mut generous = DeadlineCutoff::new(10, Duration::from_secs(3600));
        generous.reset();
        assert!(!generous.cutoff(&state, 5));
        assert!(generous.cutoff(&state, 11));
        cutoff.reset();
        assert!(cutoff.expired());
    }

    #[test]
    fn test_closure_cutoff() {
        let state = Game::default().initial_state();
        let cutoff = |_: &State, depth: u32| depth >= 4;
        assert!(!cutoff.cutoff(&state, 3));
        assert!(cutoff.cutoff(&state, 4));
    }
}
