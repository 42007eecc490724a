//! Match Settings
//!
//! The tunable surface of a match. Values are clamped into their declared
//! ranges when applied; nothing here is ever rejected for being out of range.
//! Settings take effect atomically on `MatchState::restart`.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::constants::secs_to_ticks;
use crate::core::hash::{StateHash, StateHasher};

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The document is not valid settings JSON.
    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inclusive range for one numeric setting.
#[derive(Clone, Copy, Debug)]
pub struct SettingRange<T> {
    /// Smallest accepted value
    pub min: T,
    /// Largest accepted value
    pub max: T,
}

/// Match duration range (seconds).
pub const MATCH_DURATION_RANGE: SettingRange<u32> = SettingRange { min: 10, max: 600 };
/// Early-win domination score range.
pub const WIN_SCORE_RANGE: SettingRange<u32> = SettingRange { min: 100, max: 500 };
/// Seconds between power-up spawn attempts.
pub const SPAWN_INTERVAL_RANGE: SettingRange<u32> = SettingRange { min: 5, max: 30 };
/// Live power-up cap.
pub const MAX_POWER_UPS_RANGE: SettingRange<u32> = SettingRange { min: 3, max: 10 };
/// Zone capture speed multiplier.
pub const CAPTURE_SPEED_RANGE: SettingRange<f64> = SettingRange { min: 0.5, max: 2.0 };
/// Starting (and maximum) health.
pub const STARTING_HEALTH_RANGE: SettingRange<i32> = SettingRange { min: 50, max: 200 };
/// Respawn countdown (seconds).
pub const RESPAWN_RANGE: SettingRange<u32> = SettingRange { min: 1, max: 10 };
/// Standard projectile speed.
pub const PROJECTILE_SPEED_RANGE: SettingRange<f64> = SettingRange { min: 5.0, max: 15.0 };
/// Combatant max run speed.
pub const PLAYER_SPEED_RANGE: SettingRange<f64> = SettingRange { min: 3.0, max: 10.0 };

/// Configuration for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Match length in seconds
    pub match_duration_secs: u32,
    /// Domination score that ends the match early
    pub win_score_threshold: u32,
    /// Seconds between power-up spawn attempts
    pub power_up_spawn_interval_secs: u32,
    /// Maximum Spawning + Active power-ups
    pub max_power_ups: u32,
    /// Zone capture speed multiplier
    pub capture_speed: f64,
    /// Starting and maximum health
    pub starting_health: i32,
    /// Respawn countdown in seconds
    pub respawn_secs: u32,
    /// Standard projectile speed per tick
    pub projectile_speed: f64,
    /// Combatant max run speed per tick
    pub player_speed: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            match_duration_secs: 180,
            win_score_threshold: 200,
            power_up_spawn_interval_secs: 10,
            max_power_ups: 5,
            capture_speed: 1.0,
            starting_health: 100,
            respawn_secs: 3,
            projectile_speed: 8.0,
            player_speed: 5.0,
        }
    }
}

impl MatchSettings {
    /// Parse settings from JSON. Missing fields take defaults; values are clamped.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: MatchSettings = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Return a copy with every value clamped into its declared range.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            match_duration_secs: clamp_ord(self.match_duration_secs, MATCH_DURATION_RANGE),
            win_score_threshold: clamp_ord(self.win_score_threshold, WIN_SCORE_RANGE),
            power_up_spawn_interval_secs: clamp_ord(self.power_up_spawn_interval_secs, SPAWN_INTERVAL_RANGE),
            max_power_ups: clamp_ord(self.max_power_ups, MAX_POWER_UPS_RANGE),
            capture_speed: clamp_f64(self.capture_speed, CAPTURE_SPEED_RANGE, defaults.capture_speed),
            starting_health: clamp_ord(self.starting_health, STARTING_HEALTH_RANGE),
            respawn_secs: clamp_ord(self.respawn_secs, RESPAWN_RANGE),
            projectile_speed: clamp_f64(self.projectile_speed, PROJECTILE_SPEED_RANGE, defaults.projectile_speed),
            player_speed: clamp_f64(self.player_speed, PLAYER_SPEED_RANGE, defaults.player_speed),
        }
    }

    /// Match length in ticks.
    pub fn match_duration_ticks(&self) -> u32 {
        secs_to_ticks(self.match_duration_secs)
    }

    /// Ticks between power-up spawn attempts.
    pub fn spawn_interval_ticks(&self) -> u32 {
        secs_to_ticks(self.power_up_spawn_interval_secs)
    }

    /// Respawn countdown in ticks.
    pub fn respawn_ticks(&self) -> u32 {
        secs_to_ticks(self.respawn_secs)
    }

    /// Hash of the settings, committed into replay transcripts.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_settings();
        hasher.update_u32(self.match_duration_secs);
        hasher.update_u32(self.win_score_threshold);
        hasher.update_u32(self.power_up_spawn_interval_secs);
        hasher.update_u32(self.max_power_ups);
        hasher.update_f64(self.capture_speed);
        hasher.update_i32(self.starting_health);
        hasher.update_u32(self.respawn_secs);
        hasher.update_f64(self.projectile_speed);
        hasher.update_f64(self.player_speed);
        hasher.finalize()
    }
}

fn clamp_ord<T: Ord + Copy>(value: T, range: SettingRange<T>) -> T {
    value.clamp(range.min, range.max)
}

fn clamp_f64(value: f64, range: SettingRange<f64>, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(range.min, range.max)
    } else {
        fallback
    }
}
