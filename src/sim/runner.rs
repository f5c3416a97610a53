//! Endless runner: jump ground obstacles, grab power-ups
//!
//! The world scrolls left at `playerSpeed`. Score is time-based (one point
//! every ten frames) plus a bonus per collected power-up.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::session::{GameEvent, SessionState};
use super::{Action, Flow, InputModel, Kernel};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::params::ParameterSet;
use crate::renderer::{Sprite, Surface, draw_sprite_or, palette};
use crate::templates::TemplateId;

pub const PLAYER_X: f32 = 50.0;
pub const PLAYER_SIZE: f32 = 50.0;
/// Upward velocity of a jump (px/frame)
pub const JUMP_VELOCITY: f32 = -20.0;
/// Downward acceleration while airborne (px/frame²)
pub const GRAVITY: f32 = 1.0;
pub const OBSTACLE_SIZE: f32 = 30.0;
pub const POWER_UP_SIZE: f32 = 24.0;
/// Power-ups float at jump height above the floor
const POWER_UP_ALTITUDE: f32 = 130.0;
pub const POWER_UP_BONUS: u64 = 5;
/// Nothing spawns during the first frames of a run
const WARMUP_FRAMES: u64 = 50;
const FRAMES_PER_POINT: u64 = 10;

const OBSTACLE_COLOR: &str = "red";
const POWER_UP_COLOR: &str = "#FBBF24";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerParams {
    pub player_speed: f32,
    pub obstacle_frequency: f64,
    pub power_up_frequency: f64,
}

impl RunnerParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        let t = TemplateId::SpeedRunner.template();
        Self {
            player_speed: set.number(t, "playerSpeed", 10.0) as f32,
            obstacle_frequency: set.number(t, "obstacleFrequency", 0.02),
            power_up_frequency: set.number(t, "powerUpFrequency", 0.01),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel_y: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    fn floor_y() -> f32 {
        CANVAS_HEIGHT - PLAYER_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    pub params: RunnerParams,
    pub player: Player,
    /// Left edges of ground obstacles
    pub obstacles: Vec<f32>,
    /// Top-left corners of floating power-ups
    pub power_ups: Vec<Vec2>,
    pub frame: u64,
    pub bonus: u64,
}

impl Runner {
    pub fn obstacle_rect(x: f32) -> Rect {
        Rect::new(x, CANVAS_HEIGHT - OBSTACLE_SIZE, OBSTACLE_SIZE, OBSTACLE_SIZE)
    }

    pub fn power_up_rect(pos: Vec2) -> Rect {
        Rect::new(pos.x, pos.y, POWER_UP_SIZE, POWER_UP_SIZE)
    }

    fn apply_gravity(&mut self) {
        if self.player.on_ground {
            return;
        }
        self.player.vel_y += GRAVITY;
        self.player.pos.y += self.player.vel_y;
        if self.player.pos.y >= Player::floor_y() {
            self.player.pos.y = Player::floor_y();
            self.player.vel_y = 0.0;
            self.player.on_ground = true;
        }
    }

    fn maybe_spawn(&mut self, rng: &mut Pcg32) {
        if self.frame <= WARMUP_FRAMES {
            return;
        }
        if rng.random::<f64>() < self.params.obstacle_frequency {
            self.obstacles.push(CANVAS_WIDTH);
        }
        if rng.random::<f64>() < self.params.power_up_frequency {
            self.power_ups.push(Vec2::new(
                CANVAS_WIDTH,
                CANVAS_HEIGHT - POWER_UP_ALTITUDE - POWER_UP_SIZE,
            ));
        }
    }
}

impl Kernel for Runner {
    fn init(params: &ParameterSet, _rng: &mut Pcg32) -> Self {
        Self {
            params: RunnerParams::from_set(params),
            player: Player {
                pos: Vec2::new(PLAYER_X, Player::floor_y()),
                vel_y: 0.0,
                on_ground: true,
            },
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            frame: 0,
            bonus: 0,
        }
    }

    fn input_model(&self) -> InputModel {
        InputModel::Tap
    }

    fn step(&mut self, state: &mut SessionState) -> Flow {
        self.frame += 1;
        state.raise_score_to(self.frame / FRAMES_PER_POINT + self.bonus);

        self.apply_gravity();
        self.maybe_spawn(&mut state.rng);

        let speed = self.params.player_speed;
        let body = self.player.rect();

        let mut hit = false;
        for x in &mut self.obstacles {
            *x -= speed;
            if body.intersects(&Self::obstacle_rect(*x)) {
                hit = true;
            }
        }
        self.obstacles.retain(|x| *x >= -OBSTACLE_SIZE);

        for p in &mut self.power_ups {
            p.x -= speed;
        }
        let collected = self
            .power_ups
            .iter()
            .filter(|p| body.intersects(&Self::power_up_rect(**p)))
            .count() as u64;
        self.power_ups
            .retain(|p| p.x >= -POWER_UP_SIZE && !body.intersects(&Self::power_up_rect(*p)));
        if collected > 0 {
            self.bonus += collected * POWER_UP_BONUS;
            state.raise_score_to(self.frame / FRAMES_PER_POINT + self.bonus);
            for _ in 0..collected {
                state.emit(GameEvent::PowerUp);
            }
        }

        if hit { Flow::Over } else { Flow::Continue }
    }

    fn handle_action(&mut self, state: &mut SessionState, action: Action) {
        if action == Action::Primary && self.player.on_ground {
            self.player.vel_y = JUMP_VELOCITY;
            self.player.on_ground = false;
            state.emit(GameEvent::Jumped);
        }
    }

    fn draw(&self, _state: &SessionState, surface: &mut dyn Surface) {
        draw_sprite_or(surface, Sprite::MainCharacter, self.player.rect(), palette::PLACEHOLDER);
        for x in &self.obstacles {
            draw_sprite_or(surface, Sprite::Npc, Self::obstacle_rect(*x), OBSTACLE_COLOR);
        }
        for p in &self.power_ups {
            surface.fill_circle(
                Self::power_up_rect(*p).center(),
                POWER_UP_SIZE / 2.0,
                POWER_UP_COLOR,
            );
        }
    }
}
