//! Deterministic simulation module
//!
//! One kernel per genre. Kernels must stay pure and deterministic:
//! - One `step` per nominal 60 Hz frame
//! - Seeded session RNG only
//! - No rendering backend or platform dependencies (drawing goes through
//!   the `Surface` trait)

pub mod collision;
pub mod crossing;
pub mod flappy;
pub mod match3;
pub mod runner;
pub mod session;
pub mod whack;

pub use collision::{Rect, within_radius};
pub use crossing::Crossing;
pub use flappy::Flappy;
pub use match3::{Board, Cell, Match3};
pub use runner::Runner;
pub use session::{GameEvent, Phase, SessionState};
pub use whack::Whack;

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::params::ParameterSet;
use crate::renderer::Surface;
use crate::templates::TemplateId;

/// Four-way movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.code` arrow key
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A genre-level input action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Jump / flap
    Primary,
    /// Whack or select at a canvas coordinate
    PointAt(Vec2),
    /// Discrete movement
    Move(Direction),
}

/// Which device gestures a genre listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputModel {
    /// One primary action (click, tap, Space)
    Tap,
    /// Pointer coordinates (click, tap)
    Point,
    /// Arrow keys and swipes
    Directional,
}

/// Result of a kernel step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Over,
}

/// Uniform capability interface of every genre kernel
pub trait Kernel {
    /// Build fresh entity state for a new session
    fn init(params: &ParameterSet, rng: &mut Pcg32) -> Self
    where
        Self: Sized;

    fn input_model(&self) -> InputModel;

    /// Called once when the first input starts the session
    fn on_start(&mut self, _state: &mut SessionState) {}

    /// Advance one frame while running
    fn step(&mut self, state: &mut SessionState) -> Flow;

    fn handle_action(&mut self, state: &mut SessionState, action: Action);

    /// Wall-clock second elapsed while running (countdown genres only)
    fn on_clock_second(&mut self, _state: &mut SessionState) -> Flow {
        Flow::Continue
    }

    /// Seconds left on the countdown, if the genre has one
    fn countdown(&self) -> Option<u32> {
        None
    }

    fn draw(&self, state: &SessionState, surface: &mut dyn Surface);
}

/// Closed set of genre kernels
#[derive(Debug, Clone)]
pub enum Game {
    Flappy(Flappy),
    Runner(Runner),
    Whack(Whack),
    Match3(Match3),
    Crossing(Crossing),
}

impl Game {
    pub fn new(template: TemplateId, params: &ParameterSet, rng: &mut Pcg32) -> Self {
        match template {
            TemplateId::FlappyBird => Game::Flappy(Flappy::init(params, rng)),
            TemplateId::SpeedRunner => Game::Runner(Runner::init(params, rng)),
            TemplateId::WhackAMole => Game::Whack(Whack::init(params, rng)),
            TemplateId::Match3 => Game::Match3(Match3::init(params, rng)),
            TemplateId::CrossyRoad => Game::Crossing(Crossing::init(params, rng)),
        }
    }

    pub fn template(&self) -> TemplateId {
        match self {
            Game::Flappy(_) => TemplateId::FlappyBird,
            Game::Runner(_) => TemplateId::SpeedRunner,
            Game::Whack(_) => TemplateId::WhackAMole,
            Game::Match3(_) => TemplateId::Match3,
            Game::Crossing(_) => TemplateId::CrossyRoad,
        }
    }

    pub fn kernel(&self) -> &dyn Kernel {
        match self {
            Game::Flappy(k) => k,
            Game::Runner(k) => k,
            Game::Whack(k) => k,
            Game::Match3(k) => k,
            Game::Crossing(k) => k,
        }
    }

    pub fn kernel_mut(&mut self) -> &mut dyn Kernel {
        match self {
            Game::Flappy(k) => k,
            Game::Runner(k) => k,
            Game::Whack(k) => k,
            Game::Match3(k) => k,
            Game::Crossing(k) => k,
        }
    }
}

/// One run of a kernel from Idle through Running to Over
#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub game: Game,
    params: ParameterSet,
}

impl Session {
    pub fn new(template: TemplateId, params: ParameterSet, seed: u64) -> Self {
        let mut state = SessionState::new(seed);
        let game = Game::new(template, &params, &mut state.rng);
        Self {
            state,
            game,
            params,
        }
    }

    pub fn template(&self) -> TemplateId {
        self.game.template()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn input_model(&self) -> InputModel {
        self.game.kernel().input_model()
    }

    pub fn countdown(&self) -> Option<u32> {
        self.game.kernel().countdown()
    }

    /// Idle → Running (first qualifying input)
    pub fn start(&mut self) -> bool {
        if !self.state.start() {
            return false;
        }
        log::info!("{} session started (seed {})", self.template(), self.state.seed);
        self.game.kernel_mut().on_start(&mut self.state);
        true
    }

    /// Advance one frame; no-op unless running
    pub fn step(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.ticks += 1;
        if self.game.kernel_mut().step(&mut self.state) == Flow::Over {
            self.finish();
        }
    }

    /// Apply an action; ignored unless running
    pub fn handle_action(&mut self, action: Action) {
        if !self.state.is_running() {
            return;
        }
        self.game.kernel_mut().handle_action(&mut self.state, action);
    }

    /// One real second elapsed; no-op unless running
    pub fn clock_second(&mut self) {
        if !self.state.is_running() {
            return;
        }
        if self.game.kernel_mut().on_clock_second(&mut self.state) == Flow::Over {
            self.finish();
        }
    }

    /// Tear down and rebuild everything for a fresh Idle session
    pub fn restart(&mut self, seed: u64) {
        *self = Session::new(self.template(), self.params.clone(), seed);
        log::info!("{} session restarted (seed {})", self.template(), seed);
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.game.kernel().draw(&self.state, surface);
    }

    fn finish(&mut self) {
        if self.state.end() {
            log::info!(
                "{} session over with score {}",
                self.template(),
                self.state.score()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Overrides, resolve};
    use proptest::prelude::*;

    fn session(template: TemplateId, seed: u64) -> Session {
        Session::new(template, resolve(template.as_str(), &Overrides::new()), seed)
    }

    fn action_for(model: InputModel, roll: u32) -> Action {
        match model {
            InputModel::Tap => Action::Primary,
            InputModel::Point => {
                Action::PointAt(Vec2::new((roll % 800) as f32, (roll / 800 % 450) as f32))
            }
            InputModel::Directional => Action::Move(match roll % 4 {
                0 => Direction::Up,
                1 => Direction::Down,
                2 => Direction::Left,
                _ => Direction::Right,
            }),
        }
    }

    #[test]
    fn test_idle_ignores_steps_and_actions() {
        for template in TemplateId::ALL {
            let mut s = session(template, 7);
            s.step();
            s.handle_action(Action::Primary);
            s.clock_second();
            assert_eq!(s.phase(), Phase::Idle);
            assert_eq!(s.state.ticks, 0);
            assert_eq!(s.score(), 0);
        }
    }

    #[test]
    fn test_restart_resets_to_idle() {
        let mut s = session(TemplateId::SpeedRunner, 3);
        s.start();
        for _ in 0..300 {
            s.step();
        }
        assert!(s.score() > 0);
        s.restart(4);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.score(), 0);
        assert_eq!(s.state.ticks, 0);
        assert_eq!(s.template(), TemplateId::SpeedRunner);
    }

    #[test]
    fn test_determinism() {
        for template in TemplateId::ALL {
            let mut a = session(template, 99_999);
            let mut b = session(template, 99_999);
            a.start();
            b.start();
            for i in 0..600u32 {
                if i % 17 == 0 {
                    let action = action_for(a.input_model(), i * 7919);
                    a.handle_action(action);
                    b.handle_action(action);
                }
                a.step();
                b.step();
            }
            assert_eq!(a.score(), b.score(), "{template}");
            assert_eq!(a.phase(), b.phase(), "{template}");
            assert_eq!(a.state.ticks, b.state.ticks, "{template}");
        }
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(
            seed in any::<u64>(),
            template_idx in 0usize..5,
            schedule in proptest::collection::vec((0u32..40, any::<u32>()), 1..40),
        ) {
            let template = TemplateId::ALL[template_idx];
            let mut s = session(template, seed);
            s.start();
            let mut last = s.score();
            for (wait, roll) in schedule {
                for _ in 0..wait {
                    s.step();
                    prop_assert!(s.score() >= last);
                    last = s.score();
                }
                s.handle_action(action_for(s.input_model(), roll));
                prop_assert!(s.score() >= last);
                last = s.score();
                if wait % 10 == 0 {
                    s.clock_second();
                }
            }
        }
    }
}
