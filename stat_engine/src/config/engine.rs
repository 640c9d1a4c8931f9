//! Engine-wide constants

use super::ConfigError;
use crate::types::{CombatRating, Power};
use serde::{Deserialize, Serialize};

/// Tunable engine constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub base_percentages: BasePercentages,
    #[serde(default)]
    pub unarmed: UnarmedDamage,
    #[serde(default)]
    pub stat_limits: StatLimits,
    #[serde(default)]
    pub health_per_stamina: Vec<HealthPerStamina>,
    #[serde(default)]
    pub power_defaults: Vec<PowerDefault>,
    #[serde(default)]
    pub rating_conversions: Vec<RatingConversion>,
}

impl EngineConfig {
    /// Health per stamina at `level`; 10 when no row applies
    pub fn hp_per_stamina(&self, level: u8) -> f64 {
        self.health_per_stamina
            .iter()
            .filter(|row| row.level <= level)
            .max_by_key(|row| row.level)
            .map(|row| row.ratio)
            .unwrap_or(DEFAULT_HP_PER_STAMINA)
    }

    /// Maximum of a pool before modifiers, 0 when not configured
    pub fn power_default(&self, power: Power) -> f64 {
        self.power_defaults
            .iter()
            .find(|row| row.power == power)
            .map(|row| row.base_max)
            .unwrap_or(0.0)
    }

    pub fn points_per_percent(&self, rating: CombatRating) -> Option<f64> {
        self.rating_conversions
            .iter()
            .find(|row| row.rating == rating)
            .map(|row| row.points_per_percent)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(row) = self
            .rating_conversions
            .iter()
            .find(|row| row.points_per_percent <= 0.0)
        {
            return Err(ConfigError::ValidationError(format!(
                "rating conversion for {:?} must be positive",
                row.rating
            )));
        }
        Ok(())
    }
}

const DEFAULT_HP_PER_STAMINA: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthPerStamina {
    pub level: u8,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerDefault {
    pub power: Power,
    pub base_max: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingConversion {
    pub rating: CombatRating,
    /// Rating points per 1%
    pub points_per_percent: f64,
}

/// Base values of the uncapped and capped percentages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasePercentages {
    #[serde(default = "default_five")]
    pub crit: f64,
    #[serde(default = "default_five")]
    pub spell_crit: f64,
    #[serde(default = "default_five")]
    pub block: f64,
    #[serde(default = "default_five")]
    pub parry: f64,
    #[serde(default = "default_physical_hit")]
    pub melee_hit: f64,
    #[serde(default = "default_physical_hit")]
    pub ranged_hit: f64,
    #[serde(default = "default_spell_hit")]
    pub spell_hit: f64,
}

impl Default for BasePercentages {
    fn default() -> Self {
        BasePercentages {
            crit: 5.0,
            spell_crit: 5.0,
            block: 5.0,
            parry: 5.0,
            melee_hit: 7.5,
            ranged_hit: 7.5,
            spell_hit: 15.0,
        }
    }
}

fn default_five() -> f64 {
    5.0
}
fn default_physical_hit() -> f64 {
    7.5
}
fn default_spell_hit() -> f64 {
    15.0
}

/// Main-hand range used when no usable weapon is present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnarmedDamage {
    #[serde(default = "default_unarmed_min")]
    pub min: f64,
    #[serde(default = "default_unarmed_max")]
    pub max: f64,
    #[serde(default = "default_unarmed_time")]
    pub attack_time_ms: u32,
}

impl Default for UnarmedDamage {
    fn default() -> Self {
        UnarmedDamage {
            min: 1.0,
            max: 2.0,
            attack_time_ms: 2000,
        }
    }
}

fn default_unarmed_min() -> f64 {
    1.0
}
fn default_unarmed_max() -> f64 {
    2.0
}
fn default_unarmed_time() -> u32 {
    2000
}

/// Optional server-wide percentage ceilings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatLimits {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub block: f64,
    #[serde(default)]
    pub crit: f64,
    #[serde(default)]
    pub parry: f64,
    #[serde(default)]
    pub dodge: f64,
}

impl StatLimits {
    fn limit(&self, value: f64) -> Option<f64> {
        self.enabled.then_some(value)
    }

    pub fn block(&self) -> Option<f64> {
        self.limit(self.block)
    }

    pub fn crit(&self) -> Option<f64> {
        self.limit(self.crit)
    }

    pub fn parry(&self) -> Option<f64> {
        self.limit(self.parry)
    }

    pub fn dodge(&self) -> Option<f64> {
        self.limit(self.dodge)
    }
}
