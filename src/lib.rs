//! Arcade Forge - reskinnable arcade games in a single HTML file
//!
//! Core modules:
//! - `templates`: The five game templates and their parameter schemas
//! - `params`: Parameter resolution (overrides merged over defaults)
//! - `sim`: Deterministic per-genre kernels (physics, collisions, scoring)
//! - `input`: Raw device events to genre actions, with the first-input gate
//! - `runtime`: Per-frame driver plus idle / game over / error screens
//! - `renderer`: Drawing surface abstraction shared by kernels and screens
//! - `assemble`: Builds the standalone playable document
//! - `fallback`: Built-in vector assets used when generation is unavailable
//! - `web`: Browser boot code (wasm32 only)

pub mod assemble;
pub mod config;
pub mod error;
pub mod fallback;
pub mod input;
pub mod params;
pub mod renderer;
pub mod runtime;
pub mod sim;
pub mod templates;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use assemble::{RuntimeBundle, assemble, export_file_name, preview_page};
pub use config::{Assets, GameConfig};
pub use error::{Error, Result};
pub use params::{ParameterSet, resolve};
pub use templates::{GameTemplate, TemplateId};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep: one nominal 60 Hz frame, the unit all
    /// per-frame parameters (gravity, speeds) are expressed in
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Milliseconds credited to frame-based timers per step
    pub const FRAME_MS: f32 = 16.0;

    /// Logical canvas size (the document scales it with CSS)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 450.0;

    /// UI font family used by all canvas text
    pub const UI_FONT: &str = "\"Space Grotesk\", sans-serif";
}

/// Seed derived from a millisecond wall-clock reading
#[inline]
pub fn seed_from_millis(millis: f64) -> u64 {
    // Fold the fractional part in so two boots in the same millisecond differ
    let whole = millis.trunc() as u64;
    let frac = (millis.fract() * 1_000_000.0) as u64;
    whole.rotate_left(17) ^ frac.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
