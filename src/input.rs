//! Device events to genre actions
//!
//! The router owns the first-input gate: until a qualifying input arrives
//! nothing reaches the kernel, and the input that opens the gate is consumed
//! by it. Listeners stay attached for the whole page; the gate is state, not
//! listener bookkeeping.

use glam::Vec2;

use crate::sim::{Action, Direction, InputModel, Phase};

/// Key that starts tap and point genres
pub const START_KEY: &str = "Space";

/// A raw device event in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// `KeyboardEvent.code`
    KeyDown { code: String },
    PointerDown { pos: Vec2 },
    TouchStart { pos: Vec2 },
    TouchEnd { pos: Vec2 },
}

impl RawInput {
    pub fn key(code: &str) -> Self {
        RawInput::KeyDown {
            code: code.to_string(),
        }
    }

    pub fn is_touch(&self) -> bool {
        matches!(self, RawInput::TouchStart { .. } | RawInput::TouchEnd { .. })
    }
}

/// What the host should do with an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    Ignored,
    /// First qualifying input: start the session (and the music)
    Start,
    Action(Action),
    /// Input on the game over screen
    Restart,
}

/// Per-session input state machine
#[derive(Debug, Clone)]
pub struct InputRouter {
    model: InputModel,
    /// Where the current touch began (swipe detection)
    touch_origin: Option<Vec2>,
}

impl InputRouter {
    pub fn new(model: InputModel) -> Self {
        Self {
            model,
            touch_origin: None,
        }
    }

    pub fn model(&self) -> InputModel {
        self.model
    }

    pub fn reset(&mut self) {
        self.touch_origin = None;
    }

    pub fn route(&mut self, phase: Phase, input: &RawInput) -> Routed {
        match phase {
            Phase::Idle => self.gate(input),
            Phase::Running => self.action(input),
            Phase::Over => match input {
                RawInput::PointerDown { .. } | RawInput::TouchStart { .. } => Routed::Restart,
                _ => Routed::Ignored,
            },
        }
    }

    fn gate(&self, input: &RawInput) -> Routed {
        let qualifies = match input {
            RawInput::KeyDown { code } => {
                self.model == InputModel::Directional || code == START_KEY
            }
            RawInput::PointerDown { .. } | RawInput::TouchStart { .. } => true,
            RawInput::TouchEnd { .. } => false,
        };
        if qualifies { Routed::Start } else { Routed::Ignored }
    }

    fn action(&mut self, input: &RawInput) -> Routed {
        let action = match (self.model, input) {
            (InputModel::Tap, RawInput::KeyDown { code }) if code == START_KEY => Some(Action::Primary),
            (InputModel::Tap, RawInput::PointerDown { .. } | RawInput::TouchStart { .. }) => {
                Some(Action::Primary)
            }
            (InputModel::Point, RawInput::PointerDown { pos } | RawInput::TouchStart { pos }) => {
                Some(Action::PointAt(*pos))
            }
            (InputModel::Directional, RawInput::KeyDown { code }) => {
                Direction::from_key_code(code).map(Action::Move)
            }
            (InputModel::Directional, RawInput::TouchStart { pos }) => {
                self.touch_origin = Some(*pos);
                None
            }
            (InputModel::Directional, RawInput::TouchEnd { pos }) => self
                .touch_origin
                .take()
                .map(|origin| Action::Move(swipe_direction(*pos - origin))),
            _ => None,
        };
        action.map_or(Routed::Ignored, Routed::Action)
    }
}

/// Direction of a swipe by its dominant axis (ties go vertical)
pub fn swipe_direction(delta: Vec2) -> Direction {
    if delta.x.abs() > delta.y.abs() {
        if delta.x > 0.0 { Direction::Right } else { Direction::Left }
    } else if delta.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(x: f32, y: f32) -> RawInput {
        RawInput::PointerDown { pos: Vec2::new(x, y) }
    }

    #[test]
    fn test_gate_keys_per_genre() {
        let tap = InputRouter::new(InputModel::Tap);
        assert_eq!(tap.gate(&RawInput::key("Space")), Routed::Start);
        assert_eq!(tap.gate(&RawInput::key("KeyA")), Routed::Ignored);
        assert_eq!(tap.gate(&RawInput::key("ArrowUp")), Routed::Ignored);
        assert_eq!(tap.gate(&pointer(1.0, 1.0)), Routed::Start);

        let dir = InputRouter::new(InputModel::Directional);
        assert_eq!(dir.gate(&RawInput::key("ArrowUp")), Routed::Start);
        assert_eq!(dir.gate(&RawInput::key("KeyA")), Routed::Start);
        assert_eq!(
            dir.gate(&RawInput::TouchEnd { pos: Vec2::ZERO }),
            Routed::Ignored
        );
    }

    #[test]
    fn test_running_actions() {
        let mut tap = InputRouter::new(InputModel::Tap);
        assert_eq!(
            tap.route(Phase::Running, &RawInput::key("Space")),
            Routed::Action(Action::Primary)
        );
        assert_eq!(tap.route(Phase::Running, &RawInput::key("Enter")), Routed::Ignored);

        let mut point = InputRouter::new(InputModel::Point);
        assert_eq!(
            point.route(Phase::Running, &pointer(10.0, 20.0)),
            Routed::Action(Action::PointAt(Vec2::new(10.0, 20.0)))
        );
        assert_eq!(point.route(Phase::Running, &RawInput::key("Space")), Routed::Ignored);

        let mut dir = InputRouter::new(InputModel::Directional);
        assert_eq!(
            dir.route(Phase::Running, &RawInput::key("ArrowLeft")),
            Routed::Action(Action::Move(Direction::Left))
        );
        assert_eq!(dir.route(Phase::Running, &pointer(0.0, 0.0)), Routed::Ignored);
    }

    #[test]
    fn test_swipes() {
        let mut dir = InputRouter::new(InputModel::Directional);
        let start = RawInput::TouchStart { pos: Vec2::new(100.0, 100.0) };
        assert_eq!(dir.route(Phase::Running, &start), Routed::Ignored);
        assert_eq!(
            dir.route(Phase::Running, &RawInput::TouchEnd { pos: Vec2::new(160.0, 120.0) }),
            Routed::Action(Action::Move(Direction::Right))
        );
        // Origin consumed: a stray touch end does nothing
        assert_eq!(
            dir.route(Phase::Running, &RawInput::TouchEnd { pos: Vec2::new(0.0, 0.0) }),
            Routed::Ignored
        );

        dir.route(Phase::Running, &start);
        assert_eq!(
            dir.route(Phase::Running, &RawInput::TouchEnd { pos: Vec2::new(90.0, 30.0) }),
            Routed::Action(Action::Move(Direction::Up))
        );
    }

    #[test]
    fn test_swipe_direction_dominant_axis() {
        assert_eq!(swipe_direction(Vec2::new(-50.0, 10.0)), Direction::Left);
        assert_eq!(swipe_direction(Vec2::new(5.0, 40.0)), Direction::Down);
        assert_eq!(swipe_direction(Vec2::new(30.0, -30.0)), Direction::Up);
        assert_eq!(swipe_direction(Vec2::ZERO), Direction::Up);
    }

    #[test]
    fn test_over_only_restarts() {
        let mut r = InputRouter::new(InputModel::Tap);
        assert_eq!(r.route(Phase::Over, &pointer(1.0, 1.0)), Routed::Restart);
        assert_eq!(
            r.route(Phase::Over, &RawInput::TouchStart { pos: Vec2::ZERO }),
            Routed::Restart
        );
        assert_eq!(r.route(Phase::Over, &RawInput::key("Space")), Routed::Ignored);
    }
}
