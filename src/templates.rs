//! Game templates and their parameter schemas
//!
//! Static, immutable catalog. The first entry doubles as the fallback for
//! unrecognized template ids.

use serde::{Deserialize, Serialize};

/// The five supported game kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateId {
    #[serde(rename = "flappy-bird")]
    FlappyBird,
    #[serde(rename = "speed-runner")]
    SpeedRunner,
    #[serde(rename = "whack-a-mole")]
    WhackAMole,
    #[serde(rename = "match-3")]
    Match3,
    #[serde(rename = "crossy-road")]
    CrossyRoad,
}

impl TemplateId {
    /// All template ids in catalog order
    pub const ALL: [TemplateId; 5] = [
        TemplateId::FlappyBird,
        TemplateId::SpeedRunner,
        TemplateId::WhackAMole,
        TemplateId::Match3,
        TemplateId::CrossyRoad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::FlappyBird => "flappy-bird",
            TemplateId::SpeedRunner => "speed-runner",
            TemplateId::WhackAMole => "whack-a-mole",
            TemplateId::Match3 => "match-3",
            TemplateId::CrossyRoad => "crossy-road",
        }
    }

    /// Exact, case-sensitive lookup (the id is a wire value, not user text)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// The catalog entry for this id
    pub fn template(&self) -> &'static GameTemplate {
        &CATALOG[*self as usize]
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Integer,
}

/// One declared, tunable parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f64,
    /// Recommended range; informational, never enforced by `resolve`
    pub min: f64,
    pub max: f64,
    pub description: &'static str,
}

impl ParamSpec {
    const fn float(name: &'static str, default: f64, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default,
            min,
            max,
            description,
        }
    }

    const fn int(name: &'static str, default: f64, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Integer,
            default,
            min,
            max,
            description,
        }
    }

    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static template descriptor
#[derive(Debug)]
pub struct GameTemplate {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    /// Ordered parameter schema with defaults
    pub params: &'static [ParamSpec],
}

impl GameTemplate {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn default_value(&self, name: &str) -> Option<f64> {
        self.param(name).map(|p| p.default)
    }
}

const FLAPPY_PARAMS: &[ParamSpec] = &[
    ParamSpec::float("gravity", 0.6, 0.0, 3.0, "The downward acceleration of the character."),
    ParamSpec::float("lift", -10.0, -30.0, 0.0, "The upward velocity applied when the character jumps (negative)."),
    ParamSpec::float("pipeGap", 200.0, 60.0, 400.0, "The vertical distance between the upper and lower pipes."),
    ParamSpec::float("pipeSpeed", 5.0, 0.5, 20.0, "How fast the pipes move from right to left."),
];

const RUNNER_PARAMS: &[ParamSpec] = &[
    ParamSpec::float("playerSpeed", 10.0, 1.0, 40.0, "The horizontal speed of the player and the game world."),
    ParamSpec::float("obstacleFrequency", 0.02, 0.0, 1.0, "The probability of an obstacle appearing each frame."),
    ParamSpec::float("powerUpFrequency", 0.01, 0.0, 1.0, "The probability of a power-up appearing each frame."),
];

const WHACK_PARAMS: &[ParamSpec] = &[
    ParamSpec::float("moleVisibleTime", 800.0, 100.0, 5000.0, "The time in milliseconds a mole is visible before hiding."),
    ParamSpec::float("moleHiddenTime", 1200.0, 0.0, 10000.0, "The time in milliseconds a mole stays down before it may reappear."),
    ParamSpec::int("gameDuration", 30.0, 5.0, 600.0, "The total duration of the game in seconds."),
];

const MATCH3_PARAMS: &[ParamSpec] = &[
    ParamSpec::int("gridSize", 8.0, 3.0, 12.0, "The number of rows and columns in the grid."),
    ParamSpec::int("numColors", 6.0, 3.0, 6.0, "The number of different gem colors available."),
    ParamSpec::int("timeLimit", 60.0, 10.0, 600.0, "The time limit for the game in seconds."),
];

const CROSSY_PARAMS: &[ParamSpec] = &[
    ParamSpec::float("trafficSpeed", 2.0, 0.1, 15.0, "The speed of cars in the traffic lanes."),
    ParamSpec::float("logSpeed", 1.5, 0.1, 15.0, "The speed of logs in the river lanes."),
    ParamSpec::int("lanes", 10.0, 1.0, 20.0, "The number of lanes (road and river) to cross."),
];

/// The template catalog, indexed by `TemplateId as usize`
pub static CATALOG: [GameTemplate; 5] = [
    GameTemplate {
        id: TemplateId::FlappyBird,
        name: "Flappy Bird",
        description: "Navigate a bird through an endless series of pipes. Simple, addictive, and challenging.",
        params: FLAPPY_PARAMS,
    },
    GameTemplate {
        id: TemplateId::SpeedRunner,
        name: "Speed Runner",
        description: "An endless runner where you dodge obstacles and collect power-ups to achieve the highest score.",
        params: RUNNER_PARAMS,
    },
    GameTemplate {
        id: TemplateId::WhackAMole,
        name: "Whack-the-Mole",
        description: "Test your reflexes by whacking moles as they pop up from their holes before time runs out.",
        params: WHACK_PARAMS,
    },
    GameTemplate {
        id: TemplateId::Match3,
        name: "Simple Match-3",
        description: "Swap adjacent gems to create lines of three or more of the same color to score points.",
        params: MATCH3_PARAMS,
    },
    GameTemplate {
        id: TemplateId::CrossyRoad,
        name: "Crossy Road",
        description: "Guide your character across a series of busy roads and rivers without getting hit or falling in.",
        params: CROSSY_PARAMS,
    },
];

/// Look up a template by id, falling back to the first catalog entry.
///
/// The fallback is deliberately permissive: an unknown id never fails, it is
/// only logged.
pub fn lookup(id: &str) -> &'static GameTemplate {
    match TemplateId::parse(id) {
        Some(id) => id.template(),
        None => {
            log::warn!(
                "Unknown template id {:?}, falling back to {}",
                id,
                CATALOG[0].id
            );
            &CATALOG[0]
        }
    }
}
