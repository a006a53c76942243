//! Frame encoding configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::viseme::DEFAULT_VISEME_BASE;
use crate::Result;

const DEFAULT_FRAME_RATE: f32 = 60.0;

/// Caller-forced base channel indices, keyed by bone index.
///
/// Overrides are looked up by bone while the layout is built, so insertion
/// order never matters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotOverrides(BTreeMap<usize, usize>);

impl SlotOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `bone` to start at channel `slot`; replaces an earlier pin.
    pub fn with(mut self, bone: usize, slot: usize) -> Self {
        self.insert(bone, slot);
        self
    }

    pub fn insert(&mut self, bone: usize, slot: usize) -> Option<usize> {
        self.0.insert(bone, slot)
    }

    #[inline]
    pub fn get(&self, bone: usize) -> Option<usize> {
        self.0.get(&bone).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&b, &s)| (b, s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, usize)> for SlotOverrides {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Layout and sampling settings shared by every frame of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// First of the three viseme channels.
    pub viseme_base_index: usize,
    /// Value read back from channels nothing writes: unbound bones, locked
    /// axes, reserved root slots.
    pub rest_value: f32,
    /// Forced base indices applied by the layout builder.
    pub overrides: SlotOverrides,
    /// Frame rate stamped on recorded clips (Hz).
    pub frame_rate: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            viseme_base_index: DEFAULT_VISEME_BASE,
            rest_value: 0.0,
            overrides: SlotOverrides::default(),
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl FrameConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: FrameConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rest_value.is_finite() {
            return Err(FrameError::InvalidConfig {
                reason: format!("rest_value must be finite, got {}", self.rest_value),
            });
        }
        Ok(())
    }

    /// Frame rate with the same fallback the recorder applies.
    pub fn effective_frame_rate(&self) -> f32 {
        sanitize_frame_rate(self.frame_rate)
    }
}

pub(crate) fn sanitize_frame_rate(rate: f32) -> f32 {
    let rate = if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        DEFAULT_FRAME_RATE
    };
    rate.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_layout() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.viseme_base_index, 80);
        assert_eq!(cfg.rest_value, 0.0);
        assert!(cfg.overrides.is_empty());
    }

    #[test]
    fn parses_partial_json_with_overrides() {
        let cfg = FrameConfig::from_json_str(r#"{ "overrides": { "25": 90 }, "rest_value": -1.0 }"#)
            .unwrap();
        assert_eq!(cfg.overrides.get(25), Some(90));
        assert_eq!(cfg.rest_value, -1.0);
        assert_eq!(cfg.viseme_base_index, 80);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = FrameConfig::from_json_str(r#"{ "viseme_base": 10 }"#).unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn frame_rate_fallback() {
        assert_eq!(sanitize_frame_rate(f32::NAN), 60.0);
        assert_eq!(sanitize_frame_rate(-5.0), 60.0);
        assert_eq!(sanitize_frame_rate(0.25), 1.0);
        assert_eq!(sanitize_frame_rate(30.0), 30.0);
    }
}
