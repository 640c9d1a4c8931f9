//! Autonomous species templates

use super::ConfigError;
use crate::types::{CreatureId, DamageRange, Power};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Static template of an autonomous species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub id: CreatureId,
    /// Share of attack power added to melee damage
    #[serde(default = "default_one")]
    pub base_variance: f64,
    /// Share of attack power added to ranged damage
    #[serde(default = "default_one")]
    pub range_variance: f64,
    #[serde(default = "default_one")]
    pub mod_damage: f64,
    #[serde(default = "default_power")]
    pub power: Power,
    #[serde(default)]
    pub base_health: f64,
    #[serde(default)]
    pub base_power: f64,
    #[serde(default)]
    pub base_armor: f64,
    #[serde(default)]
    pub base_attack_power: f64,
    #[serde(default)]
    pub base_ranged_attack_power: f64,
    #[serde(default)]
    pub main_hand: DamageRange,
    #[serde(default)]
    pub off_hand: Option<DamageRange>,
    #[serde(default)]
    pub ranged: Option<DamageRange>,
    #[serde(default = "default_attack_time")]
    pub attack_time_ms: u32,
    #[serde(default = "default_attack_time")]
    pub ranged_attack_time_ms: u32,
    #[serde(default)]
    pub base_crit: f64,
    #[serde(default)]
    pub base_dodge: f64,
}

fn default_one() -> f64 {
    1.0
}
fn default_power() -> Power {
    Power::Mana
}
fn default_attack_time() -> u32 {
    2000
}

impl CreatureTemplate {
    /// Template with no contribution at all
    pub fn empty(id: CreatureId) -> Self {
        CreatureTemplate {
            id,
            base_variance: default_one(),
            range_variance: default_one(),
            mod_damage: default_one(),
            power: default_power(),
            base_health: 0.0,
            base_power: 0.0,
            base_armor: 0.0,
            base_attack_power: 0.0,
            base_ranged_attack_power: 0.0,
            main_hand: DamageRange::default(),
            off_hand: None,
            ranged: None,
            attack_time_ms: default_attack_time(),
            ranged_attack_time_ms: default_attack_time(),
            base_crit: 0.0,
            base_dodge: 0.0,
        }
    }
}

/// Container for creature templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureTable {
    #[serde(default)]
    creatures: Vec<CreatureTemplate>,
}

impl CreatureTable {
    pub fn get(&self, id: &CreatureId) -> Option<&CreatureTemplate> {
        self.creatures.iter().find(|c| &c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CreatureId> {
        self.creatures.iter().map(|c| &c.id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for row in &self.creatures {
            if !seen.insert(row.id.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate creature template {}",
                    row.id
                )));
            }
            if row.attack_time_ms == 0 || row.ranged_attack_time_ms == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "attack time must be positive for {}",
                    row.id
                )));
            }
        }
        Ok(())
    }
}

/// Load creature templates from a TOML file
pub fn load_creature_table(path: &Path) -> Result<CreatureTable, ConfigError> {
    let table: CreatureTable = super::load_toml(path)?;
    table.validate()?;
    Ok(table)
}

/// Load creature templates from a TOML string
pub fn parse_creature_table(content: &str) -> Result<CreatureTable, ConfigError> {
    let table: CreatureTable = super::parse_toml(content)?;
    table.validate()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_creature() {
        let toml = r#"
[[creatures]]
id = "wolf"
base_health = 420.0
power = "focus"
main_hand = { min = 9.0, max = 13.0 }
off_hand = { min = 4.0, max = 6.0 }
"#;
        let table = parse_creature_table(toml).unwrap();
        let wolf = table.get(&CreatureId::from("wolf")).unwrap();
        assert_eq!(wolf.power, Power::Focus);
        assert_eq!(wolf.main_hand.max, 13.0);
        assert!(wolf.ranged.is_none());
        assert_eq!(wolf.attack_time_ms, 2000);
        assert_eq!(wolf.mod_damage, 1.0);
    }

    #[test]
    fn test_rejects_zero_attack_time() {
        let toml = r#"
[[creatures]]
id = "statue"
attack_time_ms = 0
"#;
        assert!(parse_creature_table(toml).is_err());
    }
}
