//! Built-in assets for when generation is unavailable
//!
//! Every template gets a complete bundle of small inline SVG images, so the
//! assembler never sees an empty or partial asset set.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::config::Assets;
use crate::templates::TemplateId;

/// Default reskin text for a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reskin {
    pub theme: &'static str,
    pub main_character: &'static str,
}

struct Kit {
    reskin: Reskin,
    /// Main character body and accent colors
    body: (&'static str, &'static str),
    /// Environment gradient, top to bottom
    sky: (&'static str, &'static str),
    npc: &'static str,
}

fn kit(id: TemplateId) -> Kit {
    match id {
        TemplateId::FlappyBird => Kit {
            reskin: Reskin {
                theme: "Subaquatic Goldfish",
                main_character: "A goldfish wearing a tiny diver's helmet, inside a glass submarine.",
            },
            body: ("#F59E0B", "#FDE68A"),
            sky: ("#0E7490", "#082F49"),
            npc: "#A3E635",
        },
        TemplateId::SpeedRunner => Kit {
            reskin: Reskin {
                theme: "Cyber-Corgi Courier",
                main_character: "A low-poly corgi with glowing blue cybernetic legs.",
            },
            body: ("#EA580C", "#38BDF8"),
            sky: ("#312E81", "#0F172A"),
            npc: "#F43F5E",
        },
        TemplateId::WhackAMole => Kit {
            reskin: Reskin {
                theme: "Ghost Zapper 3000",
                main_character: "A grinning purple ghost peeking out of a portrait.",
            },
            body: ("#A855F7", "#F5F3FF"),
            sky: ("#3F3F46", "#18181B"),
            npc: "#FACC15",
        },
        TemplateId::Match3 => Kit {
            reskin: Reskin {
                theme: "Alchemist's Apprentice",
                main_character: "The player's hand, represented by a magic wand cursor.",
            },
            body: ("#6366F1", "#FDE047"),
            sky: ("#4C1D95", "#1E1B4B"),
            npc: "#10B981",
        },
        TemplateId::CrossyRoad => Kit {
            reskin: Reskin {
                theme: "Froggy Kingdom Crossing",
                main_character: "A small, green pixel-art frog.",
            },
            body: ("#22C55E", "#DCFCE7"),
            sky: ("#65A30D", "#365314"),
            npc: "#92400E",
        },
    }
}

/// `data:` URI for an SVG document
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn character_svg(body: &str, accent: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><circle cx="32" cy="34" r="24" fill="{body}"/><circle cx="40" cy="28" r="7" fill="{accent}"/><circle cx="42" cy="28" r="3" fill="#111827"/><rect x="20" y="50" width="24" height="6" rx="3" fill="{accent}"/></svg>"##
    )
}

fn environment_svg(top: &str, bottom: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 450"><defs><linearGradient id="g" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{top}"/><stop offset="1" stop-color="{bottom}"/></linearGradient></defs><rect width="800" height="450" fill="url(#g)"/></svg>"##
    )
}

fn npc_svg(fill: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="6" y="10" width="52" height="44" rx="10" fill="{fill}"/><rect x="16" y="22" width="10" height="8" fill="#111827"/><rect x="38" y="22" width="10" height="8" fill="#111827"/></svg>"##
    )
}

/// Fallback reskin text; unknown ids get the first template's text
pub fn fallback_reskin(template_id: &str) -> Reskin {
    kit(TemplateId::parse(template_id).unwrap_or(TemplateId::FlappyBird)).reskin
}

/// Complete fallback asset bundle; unknown ids get the first template's set
pub fn fallback_assets(template_id: &str) -> Assets {
    let kit = kit(TemplateId::parse(template_id).unwrap_or(TemplateId::FlappyBird));
    Assets {
        description: format!("A default set of assets for a {} game.", kit.reskin.theme),
        main_character_image: svg_data_uri(&character_svg(kit.body.0, kit.body.1)),
        environment_image: svg_data_uri(&environment_svg(kit.sky.0, kit.sky.1)),
        npc_images: vec![svg_data_uri(&npc_svg(kit.npc))],
    }
}
