//! Standalone document assembly
//!
//! The kernels ship as one compiled runtime (wasm plus its wasm-bindgen
//! glue). Assembly only injects data: the template id as a text island, the
//! resolved parameters as a JSON island, and asset references as element
//! attributes. Nothing configurable is ever spliced into script text.

use std::fmt::Write as _;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::config::{Assets, GameConfig};
use crate::error::{Error, Result};
use crate::fallback::{fallback_assets, fallback_reskin};
use crate::params::resolve;
use crate::templates::{TemplateId, lookup};

/// Element ids shared with the browser runtime
pub mod ids {
    pub const CANVAS: &str = "game-canvas";
    pub const MAIN_CHARACTER: &str = "main-char";
    pub const NPC: &str = "npc-0";
    pub const MUSIC: &str = "bgm";
    pub const GAME_TYPE: &str = "game-type";
    pub const GAME_PARAMS: &str = "game-params";
    pub const RUNTIME_WASM: &str = "runtime-wasm";
}

/// Decodes the inlined wasm and hands it to the wasm-bindgen loader
const BOOT_JS: &str = r#"(function () {
  var island = document.getElementById('runtime-wasm');
  var raw = atob(island.textContent.trim());
  var bytes = new Uint8Array(raw.length);
  for (var i = 0; i < raw.length; i++) bytes[i] = raw.charCodeAt(i);
  wasm_bindgen({ module_or_path: bytes }).catch(function (e) {
    console.error('Game runtime failed to start:', e);
  });
})();"#;

const STYLE: &str = "body { font-family: 'Inter', sans-serif; display: flex; flex-direction: column; \
justify-content: center; align-items: center; height: 100vh; margin: 0; background-color: #23272F; \
color: white; overflow: hidden; touch-action: none; }
.canvas-container { width: 100%; max-width: 800px; aspect-ratio: 16 / 9; }
#game-canvas { border: 2px solid #FFAA5A; background-size: cover; background-position: center; \
image-rendering: pixelated; width: 100%; height: 100%; cursor: pointer; }
img, h1 { display: none; }";

/// The compiled browser runtime: wasm-bindgen `no-modules` glue plus the
/// module bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeBundle {
    pub glue_js: String,
    pub wasm: Vec<u8>,
}

impl RuntimeBundle {
    pub const GLUE_FILE: &'static str = "arcade_forge.js";
    pub const WASM_FILE: &'static str = "arcade_forge_bg.wasm";

    pub fn new(glue_js: impl Into<String>, wasm: Vec<u8>) -> Self {
        Self {
            glue_js: glue_js.into(),
            wasm,
        }
    }

    /// Load a `wasm-bindgen --target no-modules` output directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let glue_path = dir.join(Self::GLUE_FILE);
        let wasm_path = dir.join(Self::WASM_FILE);
        for path in [&glue_path, &wasm_path] {
            if !path.is_file() {
                return Err(Error::MissingArtifact(path.clone()));
            }
        }
        let glue_js = std::fs::read_to_string(&glue_path).map_err(|e| Error::io(&glue_path, e))?;
        let wasm = std::fs::read(&wasm_path).map_err(|e| Error::io(&wasm_path, e))?;
        log::info!(
            "Loaded runtime from {} ({} KiB wasm)",
            dir.display(),
            wasm.len() / 1024
        );
        Ok(Self { glue_js, wasm })
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quoted CSS string literal
fn css_string(text: &str) -> String {
    let mut out = String::from("\"");
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '<' => out.push_str("\\3c "),
            '\n' | '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Script text that cannot close its own `<script>` element
fn script_safe(js: &str) -> String {
    js.replace("</script", "<\\/script")
        .replace("</SCRIPT", "<\\/SCRIPT")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Template id written to the document; blank means the first template
fn configured_id(config: &GameConfig) -> &str {
    let id = config.template_id.trim();
    if id.is_empty() {
        TemplateId::ALL[0].as_str()
    } else {
        id
    }
}

/// Build the complete playable document.
///
/// Pure and deterministic: identical inputs give byte-identical output.
pub fn assemble(config: &GameConfig, runtime: &RuntimeBundle) -> String {
    let id = configured_id(config);
    let template = lookup(id);
    let params = resolve(id, &config.parameters);
    // `<` never appears raw inside the island, whatever the keys hold
    let params_json = serde_json::to_string(&params)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c");

    let fallback;
    let assets: &Assets = match config.assets.as_ref().filter(|a| !a.is_blank()) {
        Some(assets) => assets,
        None => {
            fallback = fallback_assets(id);
            &fallback
        }
    };
    let reskin = fallback_reskin(id);
    let theme = non_blank(config.theme.as_deref()).unwrap_or(reskin.theme);
    let character = non_blank(config.main_character_description.as_deref()).unwrap_or(reskin.main_character);

    let mut doc = String::new();
    // Writing into a String cannot fail
    let _ = write!(
        doc,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, user-scalable=no\">\n\
         <title>{title}</title>\n\
         <style>\n{STYLE}\n#{canvas} {{ background-image: url({env}); }}\n</style>\n\
         </head>\n<body>\n\
         <h1>{theme} starring {character}</h1>\n\
         <div class=\"canvas-container\"><canvas id=\"{canvas}\" width=\"800\" height=\"450\"></canvas></div>\n",
        title = escape_html(template.name),
        canvas = ids::CANVAS,
        env = css_string(&assets.environment_image),
        theme = escape_html(theme),
        character = escape_html(character),
    );

    if !assets.main_character_image.is_empty() {
        let _ = writeln!(
            doc,
            "<img id=\"{}\" src=\"{}\" alt=\"\">",
            ids::MAIN_CHARACTER,
            escape_html(&assets.main_character_image)
        );
    }
    if let Some(npc) = assets.npc_images.iter().find(|s| !s.is_empty()) {
        let _ = writeln!(doc, "<img id=\"{}\" src=\"{}\" alt=\"\">", ids::NPC, escape_html(npc));
    }
    if let Some(music) = config.music() {
        let _ = writeln!(
            doc,
            "<audio id=\"{}\" src=\"{}\" loop></audio>",
            ids::MUSIC,
            escape_html(music)
        );
    }

    let _ = write!(
        doc,
        "<div id=\"{}\" style=\"display: none;\">{}</div>\n\
         <script id=\"{}\" type=\"application/json\">{}</script>\n\
         <script id=\"{}\" type=\"application/wasm;base64\">{}</script>\n\
         <script>\n{}\n</script>\n\
         <script>\n{}\n</script>\n\
         </body>\n</html>\n",
        ids::GAME_TYPE,
        escape_html(id),
        ids::GAME_PARAMS,
        params_json,
        ids::RUNTIME_WASM,
        STANDARD.encode(&runtime.wasm),
        script_safe(&runtime.glue_js),
        BOOT_JS,
    );
    doc
}

/// Download file name for an exported document
pub fn export_file_name(template_id: &str) -> String {
    let id: String = template_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let id = if id.is_empty() {
        TemplateId::ALL[0].as_str().to_string()
    } else {
        id
    };
    format!("{id}-game.html")
}

/// Host page showing a document in a sandboxed frame (scripts allowed, no
/// same-origin access)
pub fn preview_page(document: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Game Preview</title>\n\
         <style>body {{ margin: 0; background: #23272F; }} \
         iframe {{ border: 0; width: 100vw; height: 100vh; }}</style>\n\
         </head>\n<body>\n\
         <iframe sandbox=\"allow-scripts\" srcdoc=\"{}\"></iframe>\n\
         </body>\n</html>\n",
        escape_html(document)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::params::ParameterSet;

    fn runtime() -> RuntimeBundle {
        RuntimeBundle::new("let wasm_bindgen = function () {};", vec![0, 97, 115, 109, 1, 0, 0, 0])
    }

    fn island<'a>(doc: &'a str, open: &str) -> &'a str {
        let start = doc.find(open).map(|i| i + open.len()).unwrap_or(0);
        let len = doc[start..].find("</").unwrap_or(0);
        &doc[start..start + len]
    }

    #[test]
    fn test_flappy_default_document() {
        let config = GameConfig::new("flappy-bird");
        let doc = assemble(&config, &runtime());

        assert!(doc.contains("flappy-bird"));
        assert_eq!(
            island(&doc, "<div id=\"game-type\" style=\"display: none;\">"),
            "flappy-bird"
        );

        let json = island(&doc, "<script id=\"game-params\" type=\"application/json\">");
        let parsed: BTreeMap<String, f64> = serde_json::from_str(json).unwrap();
        let defaults = ParameterSet::defaults(TemplateId::FlappyBird.template());
        assert_eq!(parsed.len(), defaults.len());
        for (name, value) in defaults.iter() {
            assert_eq!(parsed[name], value);
        }

        assert!(!doc.contains("<audio"));
        assert!(!doc.contains("src=\"\""));
        assert!(doc.contains("<title>Flappy Bird</title>"));
        assert!(doc.contains("Subaquatic Goldfish starring"));
        assert!(doc.contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let mut config = GameConfig::new("crossy-road");
        config.parameters.insert("lanes".into(), serde_json::json!(4));
        config.music_data_uri = Some("data:audio/wav;base64,UklGRg==".into());
        assert_eq!(assemble(&config, &runtime()), assemble(&config, &runtime()));
    }

    #[test]
    fn test_music_and_overrides_embedded() {
        let mut config = GameConfig::new("speed-runner");
        config.parameters.insert("playerSpeed".into(), serde_json::json!(14.5));
        config.music_data_uri = Some("data:audio/wav;base64,UklGRg==".into());
        let doc = assemble(&config, &runtime());
        assert!(doc.contains("<audio id=\"bgm\" src=\"data:audio/wav;base64,UklGRg==\" loop></audio>"));
        let json = island(&doc, "<script id=\"game-params\" type=\"application/json\">");
        let parsed: BTreeMap<String, f64> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed["playerSpeed"], 14.5);
        assert_eq!(parsed["obstacleFrequency"], 0.02);
    }

    #[test]
    fn test_unknown_id_embedded_verbatim() {
        let doc = assemble(&GameConfig::new("pong"), &runtime());
        assert_eq!(island(&doc, "<div id=\"game-type\" style=\"display: none;\">"), "pong");
        // Parameters still resolve against the first template
        let json = island(&doc, "<script id=\"game-params\" type=\"application/json\">");
        assert!(json.contains("pipeGap"));

        let doc = assemble(&GameConfig::new(" "), &runtime());
        assert_eq!(
            island(&doc, "<div id=\"game-type\" style=\"display: none;\">"),
            "flappy-bird"
        );
    }

    #[test]
    fn test_injection_is_neutralised() {
        let mut config = GameConfig::new("match-3");
        config.theme = Some("<script>alert(1)</script>".into());
        config
            .parameters
            .insert("</script><b>".into(), serde_json::json!(1));
        let rt = RuntimeBundle::new("var s = '</script>';", vec![1, 2, 3]);
        let doc = assemble(&config, &rt);
        assert!(doc.contains("&lt;script&gt;alert(1)&lt;/script&gt; starring"));
        assert!(doc.contains("\\u003c/script>\\u003cb>"));
        assert!(doc.contains("var s = '<\\/script>';"));
        assert_eq!(doc.matches("</script>").count(), 4);
    }

    #[test]
    fn test_supplied_assets_win_over_fallback() {
        let mut config = GameConfig::new("whack-a-mole");
        config.assets = Some(Assets {
            description: "ghosts".into(),
            main_character_image: "data:image/png;base64,AAAA".into(),
            environment_image: "data:image/png;base64,BBBB".into(),
            npc_images: vec![],
        });
        config.theme = Some("Ghost Zapper".into());
        config.main_character_description = Some("a ghost".into());
        let doc = assemble(&config, &runtime());
        assert!(doc.contains("<img id=\"main-char\" src=\"data:image/png;base64,AAAA\" alt=\"\">"));
        assert!(doc.contains("url(\"data:image/png;base64,BBBB\")"));
        assert!(!doc.contains("id=\"npc-0\""));
        assert!(doc.contains("<h1>Ghost Zapper starring a ghost</h1>"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("match-3"), "match-3-game.html");
        assert_eq!(export_file_name("../x y"), "---x-y-game.html");
        assert_eq!(export_file_name(""), "flappy-bird-game.html");
    }

    #[test]
    fn test_preview_page_sandboxes_document() {
        let page = preview_page("<p class=\"x\">hi & bye</p>");
        assert!(page.contains("sandbox=\"allow-scripts\""));
        assert!(page.contains("srcdoc=\"&lt;p class=&quot;x&quot;&gt;hi &amp; bye&lt;/p&gt;\""));
    }

    #[test]
    fn test_runtime_bundle_from_dir() {
        let dir = std::env::temp_dir().join(format!("arcade-forge-bundle-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let missing = RuntimeBundle::from_dir(&dir);
        assert!(matches!(missing, Err(Error::MissingArtifact(_))));

        std::fs::write(dir.join(RuntimeBundle::GLUE_FILE), "let wasm_bindgen;").unwrap();
        std::fs::write(dir.join(RuntimeBundle::WASM_FILE), [0u8, 97, 115, 109]).unwrap();
        let bundle = RuntimeBundle::from_dir(&dir).unwrap();
        assert_eq!(bundle.glue_js, "let wasm_bindgen;");
        assert_eq!(bundle.wasm, vec![0, 97, 115, 109]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
