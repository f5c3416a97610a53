//! Parameter resolution
//!
//! A `ParameterSet` is a plain name → number map. `resolve` merges caller
//! overrides over a template's defaults key by key, so every key a kernel
//! reads is a finite number by the time a document is assembled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::templates::{GameTemplate, ParamKind, lookup};

/// Raw overrides as they arrive from the configuration JSON
pub type Overrides = Map<String, Value>;

/// Resolved numeric parameters (sorted by name for stable serialization)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, f64>);

impl ParameterSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Template defaults, keyed by parameter name
    pub fn defaults(template: &GameTemplate) -> Self {
        Self(
            template
                .params
                .iter()
                .map(|p| (p.name.to_string(), p.default))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Read a value, falling back to the template default (then to `fallback`)
    /// when the key is missing or not finite
    pub fn number(&self, template: &GameTemplate, name: &str, fallback: f64) -> f64 {
        match self.get(name) {
            Some(v) if v.is_finite() => v,
            _ => template.default_value(name).unwrap_or(fallback),
        }
    }

    /// Integer view of a parameter, rounded then clamped
    pub fn integer(&self, template: &GameTemplate, name: &str, lo: i64, hi: i64) -> i64 {
        let raw = self.number(template, name, lo as f64).round();
        (raw as i64).clamp(lo, hi)
    }
}

/// Merge `overrides` over the defaults of `template_id`.
///
/// An override wins only when it is present, not `null`, and a finite
/// number. Unknown numeric keys pass through untouched; kernels never read
/// them. An unrecognized `template_id` silently uses the first template's
/// schema (see `templates::lookup`).
pub fn resolve(template_id: &str, overrides: &Overrides) -> ParameterSet {
    resolve_for(lookup(template_id), overrides)
}

pub fn resolve_for(template: &GameTemplate, overrides: &Overrides) -> ParameterSet {
    let mut set = ParameterSet::defaults(template);
    for (name, value) in overrides {
        match value {
            Value::Null => {}
            Value::Number(n) => match n.as_f64() {
                Some(v) if v.is_finite() => set.insert(name, v),
                _ => log::warn!("Ignoring non-finite override {name}"),
            },
            other => {
                log::warn!(
                    "Ignoring malformed override {name}={other} for {}",
                    template.id
                );
            }
        }
    }
    set
}

/// Parse a `name=number` override (command-line form) into `overrides`
pub fn parse_override(raw: &str, overrides: &mut Overrides) -> Result<()> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::BadOverride(raw.to_string()))?;
    let name = name.trim();
    let number = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| Error::BadOverride(raw.to_string()))?;
    if name.is_empty() {
        return Err(Error::BadOverride(raw.to_string()));
    }
    overrides.insert(name.to_string(), Value::Number(number));
    Ok(())
}

/// A declared parameter whose value lies outside its recommended range
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    pub name: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} = {} is outside the recommended range [{}, {}]",
            self.name, self.value, self.min, self.max
        )
    }
}

/// Report declared parameters outside their recommended ranges, or
/// fractional values for integer parameters. Values are never changed.
pub fn validate(template: &GameTemplate, set: &ParameterSet) -> Vec<RangeWarning> {
    template
        .params
        .iter()
        .filter_map(|spec| {
            let value = set.get(spec.name)?;
            let fractional = spec.kind == ParamKind::Integer && value.fract() != 0.0;
            (!spec.in_range(value) || fractional).then_some(RangeWarning {
                name: spec.name,
                value,
                min: spec.min,
                max: spec.max,
            })
        })
        .collect()
}
