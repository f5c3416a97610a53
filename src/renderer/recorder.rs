//! Recording surface for tests

use glam::Vec2;

use super::surface::{Sprite, Surface, TextAlign};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, color: String },
    Circle { center: Vec2, radius: f32, color: String },
    Text { text: String, pos: Vec2, align: TextAlign },
    Sprite { sprite: Sprite, rect: Rect },
}

pub struct Recorder {
    pub commands: Vec<DrawCmd>,
    ready: Vec<Sprite>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            ready: Vec::new(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.ready.push(sprite);
        self
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills_of(&self, color: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { color: fill, .. } if fill == color))
            .count()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Surface for Recorder {
    fn width(&self) -> f32 {
        CANVAS_WIDTH
    }

    fn height(&self) -> f32 {
        CANVAS_HEIGHT
    }

    fn clear(&mut self) {
        self.commands.push(DrawCmd::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.commands.push(DrawCmd::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, _line_width: f32) {
        self.commands.push(DrawCmd::StrokeRect {
            rect,
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, _size_px: u32, _color: &str, align: TextAlign) {
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            pos,
            align,
        });
    }

    fn sprite_ready(&self, sprite: Sprite) -> bool {
        self.ready.contains(&sprite)
    }

    fn draw_sprite(&mut self, sprite: Sprite, rect: Rect) {
        self.commands.push(DrawCmd::Sprite { sprite, rect });
    }
}
