//! Timed reaction game: whack moles before the clock runs out
//!
//! Nine holes on a 3×3 layout. Mole timers count in milliseconds at a fixed
//! 16 ms per frame; the game clock counts real seconds and is driven by the
//! host through `on_clock_second`.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{Rect, within_radius};
use super::session::{GameEvent, SessionState};
use super::{Action, Flow, InputModel, Kernel};
use crate::consts::FRAME_MS;
use crate::params::ParameterSet;
use crate::renderer::{Sprite, Surface};
use crate::templates::TemplateId;

pub const ROWS: usize = 3;
pub const COLS: usize = 3;
pub const HOLE_RADIUS: f32 = 50.0;
/// Distance from a hole center up to the mole's head
const HEAD_OFFSET: f32 = 20.0;
pub const HIT_RADIUS: f32 = 35.0;
/// Per-frame chance for an eligible hidden mole to pop up
const APPEAR_CHANCE: f64 = 0.01;
const MOLE_SIZE: f32 = 70.0;

const HOLE_COLOR: &str = "#654321";
const MOLE_COLOR: &str = "brown";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhackParams {
    pub visible_ms: f32,
    pub hidden_ms: f32,
    pub duration_secs: u32,
}

impl WhackParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        let t = TemplateId::WhackAMole.template();
        Self {
            visible_ms: set.number(t, "moleVisibleTime", 800.0) as f32,
            hidden_ms: set.number(t, "moleHiddenTime", 1200.0).max(0.0) as f32,
            duration_secs: set.integer(t, "gameDuration", 0, i64::from(u32::MAX)) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub center: Vec2,
    pub visible: bool,
    /// Milliseconds left in the current visible or cooldown period
    pub timer: f32,
}

impl Hole {
    pub fn head(&self) -> Vec2 {
        self.center - Vec2::new(0.0, HEAD_OFFSET)
    }

    fn sprite_rect(&self) -> Rect {
        Rect::new(
            self.center.x - MOLE_SIZE / 2.0,
            self.center.y - MOLE_SIZE,
            MOLE_SIZE,
            MOLE_SIZE,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Whack {
    pub params: WhackParams,
    pub holes: Vec<Hole>,
    pub time_left: u32,
}

impl Whack {
    /// Nearest visible hole whose head is within the hit radius of `point`
    fn hit_test(&self, point: Vec2) -> Option<usize> {
        self.holes
            .iter()
            .enumerate()
            .filter(|(_, h)| h.visible && within_radius(point, h.head(), HIT_RADIUS))
            .min_by(|(_, a), (_, b)| {
                point
                    .distance_squared(a.head())
                    .total_cmp(&point.distance_squared(b.head()))
            })
            .map(|(i, _)| i)
    }

    fn hide(&mut self, index: usize) {
        let hole = &mut self.holes[index];
        hole.visible = false;
        hole.timer = self.params.hidden_ms;
    }
}

impl Kernel for Whack {
    fn init(params: &ParameterSet, _rng: &mut Pcg32) -> Self {
        let params = WhackParams::from_set(params);
        let holes = (0..ROWS)
            .flat_map(|i| {
                (0..COLS).map(move |j| Hole {
                    center: Vec2::new(150.0 + j as f32 * 200.0, 100.0 + i as f32 * 150.0),
                    visible: false,
                    timer: 0.0,
                })
            })
            .collect();
        Self {
            time_left: params.duration_secs,
            params,
            holes,
        }
    }

    fn input_model(&self) -> InputModel {
        InputModel::Point
    }

    fn step(&mut self, state: &mut SessionState) -> Flow {
        for i in 0..self.holes.len() {
            let hole = self.holes[i];
            if hole.timer > 0.0 {
                self.holes[i].timer -= FRAME_MS;
            } else if hole.visible {
                self.hide(i);
            }

            let hole = &mut self.holes[i];
            if !hole.visible && hole.timer <= 0.0 && state.rng.random::<f64>() < APPEAR_CHANCE {
                hole.visible = true;
                hole.timer = self.params.visible_ms;
            }
        }
        Flow::Continue
    }

    fn handle_action(&mut self, state: &mut SessionState, action: Action) {
        let Action::PointAt(point) = action else {
            return;
        };
        if let Some(i) = self.hit_test(point) {
            self.hide(i);
            state.add_score(1);
            state.emit(GameEvent::Whacked);
            state.emit(GameEvent::Scored);
        }
    }

    fn on_clock_second(&mut self, _state: &mut SessionState) -> Flow {
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 { Flow::Over } else { Flow::Continue }
    }

    fn countdown(&self) -> Option<u32> {
        Some(self.time_left)
    }

    fn draw(&self, _state: &SessionState, surface: &mut dyn Surface) {
        for hole in &self.holes {
            surface.fill_circle(hole.center, HOLE_RADIUS, HOLE_COLOR);
            if !hole.visible {
                continue;
            }
            if surface.sprite_ready(Sprite::MainCharacter) {
                surface.draw_sprite(Sprite::MainCharacter, hole.sprite_rect());
            } else {
                surface.fill_circle(hole.head(), HIT_RADIUS, MOLE_COLOR);
            }
        }
    }
}
