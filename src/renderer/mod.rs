//! Canvas rendering helpers
//!
//! Everything is drawn with plain 2D primitives plus the document's images.

pub mod surface;

#[cfg(test)]
pub(crate) mod recorder;

pub use surface::{Sprite, Surface, TextAlign};

use crate::sim::Rect;

/// Shared colors
pub mod palette {
    pub const PLACEHOLDER: &str = "orange";
    pub const TEXT: &str = "white";
    pub const ERROR_TEXT: &str = "red";
    pub const OVERLAY: &str = "rgba(0, 0, 0, 0.5)";
}

/// Draw `sprite` if its image is loaded, otherwise a solid placeholder.
///
/// A missing or slow image never blocks the simulation.
pub fn draw_sprite_or(surface: &mut dyn Surface, sprite: Sprite, rect: Rect, placeholder: &str) {
    if surface.sprite_ready(sprite) {
        surface.draw_sprite(sprite, rect);
    } else {
        surface.fill_rect(rect, placeholder);
    }
}

#[cfg(test)]
mod tests {
    use super::recorder::{DrawCmd, Recorder};
    use super::*;

    #[test]
    fn test_placeholder_when_sprite_missing() {
        let mut rec = Recorder::new();
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        draw_sprite_or(&mut rec, Sprite::MainCharacter, rect, palette::PLACEHOLDER);
        assert_eq!(
            rec.commands,
            vec![DrawCmd::FillRect {
                rect,
                color: palette::PLACEHOLDER.into()
            }]
        );

        let mut rec = Recorder::new().with_sprite(Sprite::MainCharacter);
        draw_sprite_or(&mut rec, Sprite::MainCharacter, rect, palette::PLACEHOLDER);
        assert_eq!(
            rec.commands,
            vec![DrawCmd::Sprite {
                sprite: Sprite::MainCharacter,
                rect
            }]
        );
    }
}
