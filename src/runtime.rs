//! Per-frame driver shared by every genre
//!
//! Owns the session, the input router and the fixed-timestep accumulator.
//! The host calls `frame` once per animation frame and forwards device
//! events to `handle_input`; everything else is drawn from here.

use glam::Vec2;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, MAX_SUBSTEPS, SIM_DT};
use crate::input::{InputRouter, RawInput, Routed};
use crate::params::{Overrides, resolve_for};
use crate::renderer::{Surface, TextAlign, palette};
use crate::sim::{GameEvent, Phase, Rect, Session};
use crate::templates::TemplateId;

pub const START_PROMPT: &str = "Tap or press Space to start";
pub const GAME_OVER_TEXT: &str = "GAME OVER";
pub const RESTART_HINT: &str = "Tap or refresh to restart";

const TITLE_PX: u32 = 40;
const PROMPT_PX: u32 = 20;
const HUD_PX: u32 = 24;
const GAME_OVER_PX: u32 = 50;
const ERROR_PX: u32 = 20;
/// Longest frame gap fed to the accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// What the host should do after an input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// First input of the page: start background music
    pub start_audio: bool,
    /// Swallow the browser default (scrolling, zooming)
    pub prevent_default: bool,
    /// A fresh session replaced the finished one
    pub restarted: bool,
}

#[derive(Debug)]
enum Slot {
    Game {
        session: Session,
        router: InputRouter,
    },
    /// The document named a game type this runtime does not know
    Unknown(String),
}

#[derive(Debug)]
pub struct Runtime {
    slot: Slot,
    title: String,
    accumulator: f32,
    last_time: Option<f64>,
    /// The static game over screen is already on the canvas
    over_drawn: bool,
    audio_started: bool,
}

impl Runtime {
    /// Select the kernel named by `game_type` and resolve its parameters.
    ///
    /// An unknown game type does not fail: the runtime boots into a
    /// permanent on-canvas error screen instead.
    pub fn boot(game_type: &str, overrides: &Overrides, title: impl Into<String>, seed: u64) -> Self {
        let slot = match TemplateId::parse(game_type) {
            Some(id) => {
                let params = resolve_for(id.template(), overrides);
                let session = Session::new(id, params, seed);
                let router = InputRouter::new(session.input_model());
                log::info!("Booted {id} with seed {seed}");
                Slot::Game { session, router }
            }
            None => {
                log::error!("Unknown game type {game_type:?}");
                Slot::Unknown(game_type.to_string())
            }
        };
        Self {
            slot,
            title: title.into(),
            accumulator: 0.0,
            last_time: None,
            over_drawn: false,
            audio_started: false,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.slot {
            Slot::Game { session, .. } => Some(session),
            Slot::Unknown(_) => None,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        self.session().map(Session::phase)
    }

    /// Whether a running countdown needs wall-clock seconds
    pub fn needs_clock(&self) -> bool {
        self.session()
            .is_some_and(|s| s.phase() == Phase::Running && s.countdown().is_some())
    }

    /// One real second elapsed
    pub fn clock_second(&mut self) {
        if let Slot::Game { session, .. } = &mut self.slot {
            session.clock_second();
        }
    }

    /// Events since the last drain (sound effects)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        match &mut self.slot {
            Slot::Game { session, .. } => session.state.drain_events(),
            Slot::Unknown(_) => Vec::new(),
        }
    }

    /// Route one device event. `restart_seed` seeds the replacement session
    /// if this input restarts a finished game.
    pub fn handle_input(&mut self, input: &RawInput, restart_seed: u64) -> InputOutcome {
        let mut outcome = InputOutcome {
            prevent_default: input.is_touch(),
            ..Default::default()
        };
        let Slot::Game { session, router } = &mut self.slot else {
            return outcome;
        };

        match router.route(session.phase(), input) {
            Routed::Ignored => {}
            Routed::Start => {
                if session.start() {
                    self.accumulator = 0.0;
                    outcome.start_audio = !self.audio_started;
                    self.audio_started = true;
                }
                outcome.prevent_default = true;
            }
            Routed::Action(action) => {
                session.handle_action(action);
                outcome.prevent_default = true;
            }
            Routed::Restart => {
                session.restart(restart_seed);
                router.reset();
                self.accumulator = 0.0;
                self.over_drawn = false;
                outcome.restarted = true;
                outcome.prevent_default = true;
            }
        }
        outcome
    }

    /// Advance and draw one animation frame at `time_ms`
    pub fn frame(&mut self, time_ms: f64, surface: &mut dyn Surface) {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);

        let session = match &mut self.slot {
            Slot::Unknown(id) => {
                draw_unknown(surface, id);
                return;
            }
            Slot::Game { session, .. } => session,
        };

        match session.phase() {
            Phase::Idle => {
                surface.clear();
                session.draw(surface);
                draw_idle(surface, &self.title);
            }
            Phase::Running => {
                self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
                let mut substeps = 0;
                while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                    session.step();
                    self.accumulator -= SIM_DT;
                    substeps += 1;
                    if session.phase() != Phase::Running {
                        break;
                    }
                }
                if substeps == MAX_SUBSTEPS {
                    // Drop the backlog a slow display could not keep up with
                    self.accumulator %= SIM_DT;
                }

                surface.clear();
                session.draw(surface);
                draw_hud(surface, session.score(), session.countdown());
                if session.phase() == Phase::Over {
                    draw_game_over(surface);
                    self.over_drawn = true;
                }
            }
            Phase::Over => {
                // Static screen; the countdown can end a session between frames
                if !self.over_drawn {
                    surface.clear();
                    session.draw(surface);
                    draw_hud(surface, session.score(), session.countdown());
                    draw_game_over(surface);
                    self.over_drawn = true;
                }
            }
        }
    }
}

fn full_canvas() -> Rect {
    Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT)
}

fn draw_idle(surface: &mut dyn Surface, title: &str) {
    let center = Vec2::new(surface.width() / 2.0, surface.height() / 2.0);
    surface.fill_rect(full_canvas(), palette::OVERLAY);
    surface.fill_text(
        title,
        center - Vec2::new(0.0, 20.0),
        TITLE_PX,
        palette::TEXT,
        TextAlign::Center,
    );
    surface.fill_text(
        START_PROMPT,
        center + Vec2::new(0.0, 20.0),
        PROMPT_PX,
        palette::TEXT,
        TextAlign::Center,
    );
}

fn draw_hud(surface: &mut dyn Surface, score: u64, countdown: Option<u32>) {
    surface.fill_text(
        &format!("Score: {score}"),
        Vec2::new(10.0, 30.0),
        HUD_PX,
        palette::TEXT,
        TextAlign::Left,
    );
    if let Some(secs) = countdown {
        surface.fill_text(
            &format!("Time: {secs}"),
            Vec2::new(surface.width() - 10.0, 30.0),
            HUD_PX,
            palette::TEXT,
            TextAlign::Right,
        );
    }
}

fn draw_game_over(surface: &mut dyn Surface) {
    let center = Vec2::new(surface.width() / 2.0, surface.height() / 2.0);
    surface.fill_rect(full_canvas(), palette::OVERLAY);
    surface.fill_text(GAME_OVER_TEXT, center, GAME_OVER_PX, palette::TEXT, TextAlign::Center);
    surface.fill_text(
        RESTART_HINT,
        center + Vec2::new(0.0, 40.0),
        PROMPT_PX,
        palette::TEXT,
        TextAlign::Center,
    );
}

fn draw_unknown(surface: &mut dyn Surface, id: &str) {
    surface.clear();
    surface.fill_text(
        &format!("Error: Unknown game type \"{id}\""),
        Vec2::new(10.0, 50.0),
        ERROR_PX,
        palette::ERROR_TEXT,
        TextAlign::Left,
    );
}
