//! Reflex platformer: flap a body through endless pipe pairs
//!
//! Vertical-only physics. Pipes scroll left at `pipeSpeed` and spawn every
//! `floor(150 / pipeSpeed)` frames.

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

pub const BIRD_X: f32 = 50.0;
pub const BIRD_SIZE: f32 = 50.0;
pub const PIPE_WIDTH: f32 = 80.0;
/// Frames between spawns at speed 1
const SPAWN_BASE: f32 = 150.0;
/// Minimum distance of a gap from the top edge
const GAP_MARGIN: f32 = 50.0;
const PIPE_COLOR: &str = "#22C55E";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlappyParams {
    pub gravity: f32,
    pub lift: f32,
    pub pipe_gap: f32,
    pub pipe_speed: f32,
}

impl FlappyParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        let t = TemplateId::FlappyBird.template();
        Self {
            gravity: set.number(t, "gravity", 0.6) as f32,
            lift: set.number(t, "lift", -10.0) as f32,
            pipe_gap: set.number(t, "pipeGap", 200.0) as f32,
            pipe_speed: set.number(t, "pipeSpeed", 5.0) as f32,
        }
    }

    /// Frames between pipe spawns; `None` when pipes never spawn
    pub fn spawn_interval(&self) -> Option<u64> {
        if self.pipe_speed > 0.0 {
            Some(((SPAWN_BASE / self.pipe_speed).floor() as u64).max(1))
        } else {
            None
        }
    }
}

/// The controlled body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub pos: Vec2,
    pub vel_y: f32,
}

impl Bird {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, BIRD_SIZE, BIRD_SIZE)
    }
}

/// An upper/lower barrier pair with an open band between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Top of the open band
    pub gap_top: f32,
    /// Scored once the trailing edge clears the bird
    pub passed: bool,
}

impl Pipe {
    pub fn upper(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.gap_top)
    }

    pub fn lower(&self, gap: f32) -> Rect {
        let top = self.gap_top + gap;
        Rect::new(self.x, top, PIPE_WIDTH, CANVAS_HEIGHT - top)
    }

    /// Bird overlaps the pipe column and sits outside the open band
    pub fn hits(&self, bird: &Rect, gap: f32) -> bool {
        bird.overlaps_x(self.x, PIPE_WIDTH)
            && (bird.y < self.gap_top || bird.bottom() > self.gap_top + gap)
    }
}

#[derive(Debug, Clone)]
pub struct Flappy {
    pub params: FlappyParams,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub frame: u64,
}

impl Flappy {
    fn flap(&mut self, state: &mut SessionState) {
        self.bird.vel_y = self.params.lift;
        state.emit(GameEvent::Jumped);
    }

    fn spawn_pipe(&mut self, rng: &mut Pcg32) {
        let span = (CANVAS_HEIGHT - self.params.pipe_gap - 2.0 * GAP_MARGIN).max(0.0);
        let gap_top = rng.random::<f32>() * span + GAP_MARGIN;
        self.pipes.push(Pipe {
            x: CANVAS_WIDTH,
            gap_top,
            passed: false,
        });
    }
}

impl Kernel for Flappy {
    fn init(params: &ParameterSet, _rng: &mut Pcg32) -> Self {
        Self {
            params: FlappyParams::from_set(params),
            bird: Bird {
                pos: Vec2::new(BIRD_X, CANVAS_HEIGHT / 2.0),
                vel_y: 0.0,
            },
            pipes: Vec::new(),
            frame: 0,
        }
    }

    fn input_model(&self) -> InputModel {
        InputModel::Tap
    }

    /// The starting tap also flaps
    fn on_start(&mut self, state: &mut SessionState) {
        self.flap(state);
    }

    fn step(&mut self, state: &mut SessionState) -> Flow {
        self.bird.vel_y += self.params.gravity;
        self.bird.pos.y += self.bird.vel_y;

        let bird = self.bird.rect();
        if bird.bottom() > CANVAS_HEIGHT || bird.y < 0.0 {
            return Flow::Over;
        }

        self.frame += 1;
        if let Some(interval) = self.params.spawn_interval() {
            if self.frame % interval == 0 {
                self.spawn_pipe(&mut state.rng);
            }
        }

        let gap = self.params.pipe_gap;
        let mut hit = false;
        for pipe in &mut self.pipes {
            pipe.x -= self.params.pipe_speed;
            if pipe.hits(&bird, gap) {
                hit = true;
            }
            if !pipe.passed && pipe.x + PIPE_WIDTH < bird.x {
                pipe.passed = true;
                state.add_score(1);
                state.emit(GameEvent::Scored);
            }
        }
        self.pipes.retain(|p| p.x >= -PIPE_WIDTH);

        if hit { Flow::Over } else { Flow::Continue }
    }

    fn handle_action(&mut self, state: &mut SessionState, action: Action) {
        if action == Action::Primary {
            self.flap(state);
        }
    }

    fn draw(&self, _state: &SessionState, surface: &mut dyn Surface) {
        for pipe in &self.pipes {
            surface.fill_rect(pipe.upper(), PIPE_COLOR);
            surface.fill_rect(pipe.lower(self.params.pipe_gap), PIPE_COLOR);
        }
        draw_sprite_or(surface, Sprite::MainCharacter, self.bird.rect(), palette::PLACEHOLDER);
    }
}
