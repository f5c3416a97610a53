//! Per-session state shared by every kernel
//!
//! Owned by exactly one `Session`; nothing here outlives a restart.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title prompt shown, no simulation updates
    Idle,
    /// Active gameplay
    Running,
    /// Terminal; only a restart leaves this state
    Over,
}

/// Things that happened during a step, drained by the host (sound effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Scored,
    PowerUp,
    Whacked,
    Matched { cleared: u32 },
    Crossed,
    GameOver,
}

/// Common session state: score, clock, lifecycle flags and the RNG
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed this session was created with
    pub seed: u64,
    /// Session RNG (all kernel randomness draws from here)
    pub rng: Pcg32,
    /// Simulation steps taken while running
    pub ticks: u64,
    /// Pending events since the last drain
    pub events: Vec<GameEvent>,
    score: u64,
    started: bool,
    game_over: bool,
}

impl SessionState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ticks: 0,
            events: Vec::new(),
            score: 0,
            started: false,
            game_over: false,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.started, self.game_over) {
            (_, true) => Phase::Over,
            (true, false) => Phase::Running,
            (false, false) => Phase::Idle,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Idle → Running. Returns false if the session was already started.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    /// Running → Over. Returns false if there was nothing to end.
    pub fn end(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.game_over = true;
        self.events.push(GameEvent::GameOver);
        true
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Raise the score to `value` (never lowers it)
    pub fn raise_score_to(&mut self, value: u64) {
        self.score = self.score.max(value);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_is_monotonic() {
        let mut state = SessionState::new(1);
        assert_eq!(state.phase(), Phase::Idle);
        // Cannot end a session that never started
        assert!(!state.end());
        assert!(state.start());
        assert!(!state.start());
        assert_eq!(state.phase(), Phase::Running);
        assert!(state.end());
        assert!(!state.end());
        assert_eq!(state.phase(), Phase::Over);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_score_never_decreases() {
        let mut state = SessionState::new(1);
        state.add_score(5);
        state.raise_score_to(3);
        assert_eq!(state.score(), 5);
        state.raise_score_to(9);
        assert_eq!(state.score(), 9);
    }
}
