//! Audio using the Web Audio API and the document's music element
//!
//! Background music comes from the `<audio id="bgm">` element when the
//! document has one. Sound effects are synthesised, no files needed.

use wasm_bindgen::JsCast;
use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

/// Audio manager for one page
pub struct AudioManager {
    ctx: Option<AudioContext>,
    bgm: Option<HtmlAudioElement>,
    music_started: bool,
    volume: f32,
}

impl AudioManager {
    /// `music_id` names the optional looping `<audio>` element
    pub fn new(document: &web_sys::Document, music_id: &str) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - sound effects disabled");
        }
        let bgm = document
            .get_element_by_id(music_id)
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
        Self {
            ctx,
            bgm,
            music_started: false,
            volume: 0.8,
        }
    }

    /// Start background music and unlock effects. Must run inside the user
    /// gesture that started the game; later calls do nothing.
    pub fn start_music(&mut self) {
        if self.music_started {
            return;
        }
        self.music_started = true;
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
        if let Some(bgm) = &self.bgm {
            match bgm.play() {
                Ok(_) => log::info!("Background music started"),
                Err(e) => log::warn!("Audio play failed: {e:?}"),
            }
        }
    }

    /// Play the effect for a game event
    pub fn play_event(&self, event: GameEvent) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        let vol = self.volume;

        match event {
            GameEvent::Jumped => self.play_hop(ctx, vol),
            GameEvent::Scored => self.play_ping(ctx, vol),
            GameEvent::PowerUp => self.play_arpeggio(ctx, vol, &[600.0, 800.0, 1000.0], 0.08),
            GameEvent::Whacked => self.play_thump(ctx, vol),
            GameEvent::Matched { cleared } => self.play_chime(ctx, vol, cleared),
            GameEvent::Crossed => self.play_arpeggio(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1),
            GameEvent::GameOver => self.play_game_over(ctx, vol),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Jump, flap or hop - short rising whoosh
    fn play_hop(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(520.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Point scored
    fn play_ping(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Mole whacked - mallet knock: a square-wave crack over a falling body
    fn play_thump(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        if let Some((crack, gain)) = self.create_osc(ctx, 1400.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.03)
                .ok();
            crack.start().ok();
            crack.stop_with_when(t + 0.04).ok();
        }
        if let Some((body, gain)) = self.create_osc(ctx, 320.0, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(0.001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.5, t + 0.01)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.22)
                .ok();
            body.frequency().set_value_at_time(320.0, t).ok();
            body.frequency()
                .exponential_ramp_to_value_at_time(90.0, t + 0.18)
                .ok();
            body.start().ok();
            body.stop_with_when(t + 0.25).ok();
        }
    }

    /// Gems cleared - one shimmer harmonic per three gems
    fn play_chime(&self, ctx: &AudioContext, vol: f32, cleared: u32) {
        let harmonics = (cleared / 3).clamp(1, 4) as usize;
        for (i, freq) in [1200.0, 1800.0, 2400.0, 3000.0].iter().take(harmonics).enumerate() {
            let delay = i as f64 * 0.02;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
            }
        }
    }

    /// Rising note sequence (power-up, successful crossing)
    fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], spacing: f64) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * spacing;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }

    /// Game over - a slow slide down a minor triad, then a low buzz
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let start = ctx.current_time();
        for (i, freq) in [523.25, 440.0, 329.63].iter().enumerate() {
            let t = start + i as f64 * 0.15;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.frequency()
                    .linear_ramp_to_value_at_time(*freq * 0.97, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
        let t = start + 0.45;
        if let Some((osc, gain)) = self.create_osc(ctx, 110.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(110.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(55.0, t + 0.6)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.65).ok();
        }
    }
}
