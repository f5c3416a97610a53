//! Drawing surface abstraction
//!
//! Kernels and screens draw through `Surface`; the browser backs it with a
//! 2D canvas context, tests back it with a command recorder.

use glam::Vec2;

use crate::sim::Rect;

/// Images the document may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    /// The reskinned main character
    MainCharacter,
    /// First NPC / obstacle image
    Npc,
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Immediate-mode 2D drawing target. Colors are CSS color strings.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Clear to transparent (the environment image shows through)
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str);
    fn fill_text(&mut self, text: &str, pos: Vec2, size_px: u32, color: &str, align: TextAlign);
    /// Whether the image has finished loading and has pixels
    fn sprite_ready(&self, sprite: Sprite) -> bool;
    fn draw_sprite(&mut self, sprite: Sprite, rect: Rect);
}
