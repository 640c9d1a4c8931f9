//! Per-class table loading

use super::{ConfigError, StatLine};
use crate::types::{ClassId, FormId, Power, Stat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Shapeshift form of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInfo {
    pub id: FormId,
    /// Agility also counts at the strength attack power coefficient
    #[serde(default)]
    pub ap_from_strength: bool,
    /// Fixed swing time of the form; 0 keeps the weapon's own
    #[serde(default)]
    pub combat_round_time_ms: u32,
}

/// Per-class coefficients and base values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class: ClassId,
    #[serde(default)]
    pub attack_power_per_strength: f64,
    #[serde(default)]
    pub attack_power_per_agility: f64,
    #[serde(default)]
    pub ranged_attack_power_per_agility: f64,
    /// Diminishing-returns cap for parry; 0 means the class cannot parry
    #[serde(default)]
    pub parry_cap: f64,
    #[serde(default)]
    pub dodge_cap: f64,
    #[serde(default = "default_k")]
    pub diminishing_k: f64,
    #[serde(default)]
    pub base_dodge: f64,
    #[serde(default)]
    pub dodge_per_agility: f64,
    #[serde(default)]
    pub base_health: f64,
    #[serde(default)]
    pub health_per_level: f64,
    #[serde(default)]
    pub base_mana: f64,
    #[serde(default)]
    pub mana_per_level: f64,
    #[serde(default)]
    pub powers: Vec<Power>,
    #[serde(default)]
    pub can_parry: bool,
    #[serde(default)]
    pub can_block: bool,
    #[serde(default)]
    pub can_dual_wield: bool,
    /// Level at which mastery becomes usable
    #[serde(default)]
    pub mastery_level: u8,
    #[serde(default)]
    pub base_stats: StatLine,
    #[serde(default)]
    pub stats_per_level: StatLine,
    #[serde(default)]
    pub forms: Vec<FormInfo>,
}

fn default_k() -> f64 {
    1.0
}

impl ClassInfo {
    /// Row with no contribution at all
    pub fn fallback(class: ClassId) -> Self {
        ClassInfo {
            class,
            attack_power_per_strength: 0.0,
            attack_power_per_agility: 0.0,
            ranged_attack_power_per_agility: 0.0,
            parry_cap: 0.0,
            dodge_cap: 0.0,
            diminishing_k: default_k(),
            base_dodge: 0.0,
            dodge_per_agility: 0.0,
            base_health: 0.0,
            health_per_level: 0.0,
            base_mana: 0.0,
            mana_per_level: 0.0,
            powers: Vec::new(),
            can_parry: false,
            can_block: false,
            can_dual_wield: false,
            mastery_level: u8::MAX,
            base_stats: StatLine::default(),
            stats_per_level: StatLine::default(),
            forms: Vec::new(),
        }
    }

    pub fn has_power(&self, power: Power) -> bool {
        self.powers.contains(&power)
    }

    pub fn form(&self, id: &FormId) -> Option<&FormInfo> {
        self.forms.iter().find(|f| &f.id == id)
    }

    pub fn health_at(&self, level: u8) -> f64 {
        self.base_health + self.health_per_level * levels_gained(level)
    }

    pub fn mana_at(&self, level: u8) -> f64 {
        self.base_mana + self.mana_per_level * levels_gained(level)
    }

    pub fn stat_at(&self, stat: Stat, level: u8) -> f64 {
        self.base_stats.get(stat) + self.stats_per_level.get(stat) * levels_gained(level)
    }
}

fn levels_gained(level: u8) -> f64 {
    f64::from(level.saturating_sub(1))
}

/// Container for class rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassTable {
    #[serde(default)]
    classes: Vec<ClassInfo>,
}

impl ClassTable {
    pub fn get(&self, class: ClassId) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.class == class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for row in &self.classes {
            if !seen.insert(row.class) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate class row {:?}",
                    row.class
                )));
            }
            if row.parry_cap < 0.0 || row.dodge_cap < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "negative diminishing cap for {:?}",
                    row.class
                )));
            }
            if row.diminishing_k <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "diminishing k must be positive for {:?}",
                    row.class
                )));
            }
        }
        Ok(())
    }
}

/// Load class rows from a TOML file
pub fn load_class_table(path: &Path) -> Result<ClassTable, ConfigError> {
    let table: ClassTable = super::load_toml(path)?;
    table.validate()?;
    Ok(table)
}

/// Load class rows from a TOML string
pub fn parse_class_table(content: &str) -> Result<ClassTable, ConfigError> {
    let table: ClassTable = super::parse_toml(content)?;
    table.validate()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classes() {
        let toml = r#"
[[classes]]
class = "hunter"
ranged_attack_power_per_agility = 1.0
parry_cap = 145.560408
dodge_cap = 145.560408
diminishing_k = 0.988
powers = ["focus"]
base_stats = { agility = 20.0 }
stats_per_level = { agility = 2.0 }
"#;
        let table = parse_class_table(toml).unwrap();
        let hunter = table.get(ClassId::Hunter).unwrap();
        assert!(hunter.has_power(Power::Focus));
        assert_eq!(hunter.stat_at(Stat::Agility, 11), 40.0);
        assert!(table.get(ClassId::Mage).is_none());
    }

    #[test]
    fn test_parse_forms() {
        let toml = r#"
[[classes]]
class = "druid"
diminishing_k = 0.972

[[classes.forms]]
id = "cat"
ap_from_strength = true
combat_round_time_ms = 1000
"#;
        let table = parse_class_table(toml).unwrap();
        let druid = table.get(ClassId::Druid).unwrap();
        let cat = druid.form(&FormId::from("cat")).unwrap();
        assert!(cat.ap_from_strength);
        assert_eq!(cat.combat_round_time_ms, 1000);
        assert!(druid.form(&FormId::from("bear")).is_none());
    }

    #[test]
    fn test_rejects_bad_k() {
        let toml = r#"
[[classes]]
class = "monk"
diminishing_k = 0.0
"#;
        assert!(matches!(
            parse_class_table(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let toml = r#"
[[classes]]
class = "rogue"

[[classes]]
class = "rogue"
"#;
        assert!(parse_class_table(toml).is_err());
    }

    #[test]
    fn test_rejects_negative_cap() {
        let toml = r#"
[[classes]]
class = "warrior"
parry_cap = -1.0
"#;
        assert!(parse_class_table(toml).is_err());
    }
}
