//! Runtime-tunable simulation parameters (spec §6 "Configuration
//! defaults"). Persisted as YAML via [`crate::config::ConfigManager`] and
//! mutable at runtime through `POST /api/admin/config`.

use serde::{Deserialize, Serialize};

use crate::config::Validate;

pub const DEFAULT_COLOR_PALETTE: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4",
    "#46f0f0", "#f032e6", "#bcf60c", "#fabebe", "#008080", "#e6beff",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub arena_radius: f64,
    pub tick_rate_ms: u64,
    pub snake_speed: f64,
    pub snake_radius: f64,
    pub segment_spacing: f64,
    pub max_turn_rate: f64,
    pub starting_segments: usize,
    pub food_radius: f64,
    pub min_food: usize,
    pub max_food: usize,
    pub respawn_on_death: bool,
    pub respawn_delay_ms: u64,
    pub ai_timeout_ms: u64,
    pub colors: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            arena_radius: 2000.0,
            tick_rate_ms: 50,
            snake_speed: 4.0,
            snake_radius: 12.0,
            segment_spacing: 20.0,
            max_turn_rate: 0.25,
            starting_segments: 10,
            food_radius: 6.0,
            min_food: 200,
            max_food: 600,
            respawn_on_death: true,
            respawn_delay_ms: 3000,
            ai_timeout_ms: 50,
            colors: DEFAULT_COLOR_PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RuntimeConfig {
    pub fn eat_radius(&self) -> f64 {
        self.snake_radius + self.food_radius
    }

    pub fn respawn_delay_ticks(&self) -> u64 {
        (self.respawn_delay_ms as f64 / self.tick_rate_ms.max(1) as f64).ceil() as u64
    }

    pub fn trail_retention_arc_length(&self, segment_count: usize, slack: usize) -> f64 {
        (segment_count + slack) as f64 * self.segment_spacing
    }
}

impl Validate for RuntimeConfig {
    fn validate(&self) -> Result<(), String> {
        if !(500.0..=10000.0).contains(&self.arena_radius) {
            return Err("arenaRadius must be between 500 and 10000".to_string());
        }
        if !(20..=1000).contains(&self.tick_rate_ms) {
            return Err("tickRateMs must be between 20 and 1000".to_string());
        }
        if !(1.0..=20.0).contains(&self.snake_speed) {
            return Err("snakeSpeed must be between 1 and 20".to_string());
        }
        if !(0.01..=0.5).contains(&self.max_turn_rate) {
            return Err("maxTurnRate must be between 0.01 and 0.5".to_string());
        }
        if self.respawn_delay_ms > 30000 {
            return Err("respawnDelayMs must be between 0 and 30000".to_string());
        }
        if self.min_food > self.max_food {
            return Err("minFood must not exceed maxFood".to_string());
        }
        if self.colors.is_empty() {
            return Err("colors palette must not be empty".to_string());
        }
        if self.starting_segments == 0 {
            return Err("startingSegments must be at least 1".to_string());
        }
        Ok(())
    }
}

/// A partial patch of the subset of [`RuntimeConfig`] fields spec §6 names
/// as admin-mutable. Unlisted fields (segment spacing, food radii, the
/// color palette, ...) are deliberately not patchable at runtime.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRuntimeConfig {
    pub tick_rate_ms: Option<u64>,
    pub arena_radius: Option<f64>,
    pub respawn_on_death: Option<bool>,
    pub respawn_delay_ms: Option<u64>,
    pub snake_speed: Option<f64>,
    pub max_turn_rate: Option<f64>,
}

impl RuntimeConfig {
    /// Applies a patch, returning an error (and leaving `self` untouched)
    /// if the result would violate validation.
    pub fn apply_patch(&mut self, patch: &PartialRuntimeConfig) -> Result<(), String> {
        let mut candidate = self.clone();
        if let Some(v) = patch.tick_rate_ms {
            candidate.tick_rate_ms = v;
        }
        if let Some(v) = patch.arena_radius {
            candidate.arena_radius = v;
        }
        if let Some(v) = patch.respawn_on_death {
            candidate.respawn_on_death = v;
        }
        if let Some(v) = patch.respawn_delay_ms {
            candidate.respawn_delay_ms = v;
        }
        if let Some(v) = patch.snake_speed {
            candidate.snake_speed = v;
        }
        if let Some(v) = patch.max_turn_rate {
            candidate.max_turn_rate = v;
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn patch_rejects_out_of_range_and_leaves_config_untouched() {
        let mut cfg = RuntimeConfig::default();
        let original = cfg.clone();
        let patch = PartialRuntimeConfig { tick_rate_ms: Some(5), ..Default::default() };
        assert!(cfg.apply_patch(&patch).is_err());
        assert_eq!(cfg, original);
    }

    #[test]
    fn patch_applies_only_listed_fields() {
        let mut cfg = RuntimeConfig::default();
        let patch = PartialRuntimeConfig { snake_speed: Some(8.0), ..Default::default() };
        cfg.apply_patch(&patch).unwrap();
        assert_eq!(cfg.snake_speed, 8.0);
        assert_eq!(cfg.segment_spacing, RuntimeConfig::default().segment_spacing);
    }
}
