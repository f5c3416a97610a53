//! `Surface` backed by a 2D canvas context

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use crate::consts::UI_FONT;
use crate::renderer::{Sprite, Surface, TextAlign};
use crate::sim::Rect;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    main_character: Option<HtmlImageElement>,
    npc: Option<HtmlImageElement>,
}

impl CanvasSurface {
    /// Wrap the canvas and look up the sprite images by element id.
    /// Missing images are fine; kernels draw placeholders instead.
    pub fn new(
        document: &Document,
        canvas: &HtmlCanvasElement,
        main_character_id: &str,
        npc_id: &str,
    ) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let image = |id: &str| {
            document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        };
        Some(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
            main_character: image(main_character_id),
            npc: image(npc_id),
        })
    }

    fn image(&self, sprite: Sprite) -> Option<&HtmlImageElement> {
        match sprite {
            Sprite::MainCharacter => self.main_character.as_ref(),
            Sprite::Npc => self.npc.as_ref(),
        }
    }

    fn set_font(&self, size_px: u32) {
        self.ctx.set_font(&format!("{size_px}px {UI_FONT}"));
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.w),
            f64::from(rect.h),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f32) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(f64::from(line_width));
        self.ctx.stroke_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.w),
            f64::from(rect.h),
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size_px: u32, color: &str, align: TextAlign) {
        self.set_font(size_px);
        self.ctx.set_fill_style_str(color);
        self.ctx.set_text_align(align.as_str());
        let _ = self
            .ctx
            .fill_text(text, f64::from(pos.x), f64::from(pos.y));
    }

    fn sprite_ready(&self, sprite: Sprite) -> bool {
        self.image(sprite)
            .is_some_and(|img| img.complete() && img.natural_height() != 0)
    }

    fn draw_sprite(&mut self, sprite: Sprite, rect: Rect) {
        if let Some(img) = self.image(sprite) {
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img,
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.w),
                f64::from(rect.h),
            );
        }
    }
}
