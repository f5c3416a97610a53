//! Game configuration handed to the document assembler
//!
//! Produced by the wizard (outside this crate) and read from JSON by the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::Overrides;

/// Visual assets, referenced by URI or data URI only (pixels are never decoded)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    #[serde(default, alias = "newAssetsDescription")]
    pub description: String,
    #[serde(default, alias = "newMainCharacterImage")]
    pub main_character_image: String,
    #[serde(default, alias = "newEnvironmentImage")]
    pub environment_image: String,
    #[serde(default, alias = "newNpcImages")]
    pub npc_images: Vec<String>,
}

impl Assets {
    /// True when no image reference is present at all
    pub fn is_blank(&self) -> bool {
        self.main_character_image.is_empty()
            && self.environment_image.is_empty()
            && self.npc_images.iter().all(String::is_empty)
    }
}

/// Everything needed to assemble one playable document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Template id as configured; embedded verbatim in the document
    #[serde(default)]
    pub template_id: String,
    /// Parameter overrides merged over the template defaults
    #[serde(default)]
    pub parameters: Overrides,
    /// Asset bundle; `None` means "use the built-in fallback"
    #[serde(default)]
    pub assets: Option<Assets>,
    #[serde(default)]
    pub music_data_uri: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub main_character_description: Option<String>,
}

impl GameConfig {
    pub fn new(template_id: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config for {:?} from {}", config.template_id, path.display());
        Ok(config)
    }

    /// Music reference, treating an empty string as absent
    pub fn music(&self) -> Option<&str> {
        self.music_data_uri.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = GameConfig::from_json(r#"{ "templateId": "match-3" }"#).unwrap();
        assert_eq!(config.template_id, "match-3");
        assert!(config.parameters.is_empty());
        assert!(config.assets.is_none());
        assert!(config.music().is_none());
    }

    #[test]
    fn test_parse_full_with_legacy_asset_names() {
        let config = GameConfig::from_json(
            r#"{
                "templateId": "flappy-bird",
                "parameters": { "gravity": 0.4 },
                "assets": {
                    "newAssetsDescription": "fish",
                    "newMainCharacterImage": "data:image/png;base64,AAAA",
                    "newEnvironmentImage": "",
                    "newNpcImages": ["data:image/png;base64,BBBB"]
                },
                "musicDataUri": "data:audio/wav;base64,CCCC",
                "theme": "Subaquatic"
            }"#,
        )
        .unwrap();
        let assets = config.assets.as_ref().unwrap();
        assert_eq!(assets.description, "fish");
        assert_eq!(assets.npc_images.len(), 1);
        assert!(!assets.is_blank());
        assert_eq!(config.music(), Some("data:audio/wav;base64,CCCC"));
        assert_eq!(config.theme.as_deref(), Some("Subaquatic"));
    }

    #[test]
    fn test_blank_music_is_absent() {
        let mut config = GameConfig::new("crossy-road");
        config.music_data_uri = Some("  ".into());
        assert!(config.music().is_none());
    }
}
