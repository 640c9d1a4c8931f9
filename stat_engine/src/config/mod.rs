//! Configuration loading from TOML files
//!
//! Tables are immutable once loaded. Entities share one [`StatTables`]
//! through an `Arc`.

mod classes;
mod creatures;
mod engine;
mod pets;

pub use classes::{load_class_table, parse_class_table, ClassInfo, ClassTable, FormInfo};
pub use creatures::{load_creature_table, parse_creature_table, CreatureTable, CreatureTemplate};
pub use engine::{
    BasePercentages, EngineConfig, HealthPerStamina, PowerDefault, RatingConversion, StatLimits,
    UnarmedDamage,
};
pub use pets::{load_pet_table, parse_pet_table, OwnerApSource, PetInfo, PetTable, SchoolCoefficient};

use crate::types::{ClassId, CreatureId, PetSpeciesId, Stat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// One value per primary stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(default)]
    pub strength: f64,
    #[serde(default)]
    pub agility: f64,
    #[serde(default)]
    pub stamina: f64,
    #[serde(default)]
    pub intellect: f64,
}

impl StatLine {
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Agility => self.agility,
            Stat::Stamina => self.stamina,
            Stat::Intellect => self.intellect,
        }
    }
}

/// Every table the engine reads
#[derive(Debug, Clone, Default)]
pub struct StatTables {
    pub classes: ClassTable,
    pub pets: PetTable,
    pub creatures: CreatureTable,
    pub engine: EngineConfig,
}

impl StatTables {
    /// Tables embedded in the crate
    pub fn defaults() -> Self {
        StatTables {
            classes: embedded(
                "classes.toml",
                parse_class_table(include_str!("../../config/classes.toml")),
            ),
            pets: embedded(
                "pets.toml",
                parse_pet_table(include_str!("../../config/pets.toml")),
            ),
            creatures: embedded(
                "creatures.toml",
                parse_creature_table(include_str!("../../config/creatures.toml")),
            ),
            engine: embedded(
                "engine.toml",
                parse_toml(include_str!("../../config/engine.toml")),
            ),
        }
    }

    /// Load `classes.toml`, `pets.toml`, `creatures.toml` and `engine.toml` from `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let tables = StatTables {
            classes: load_class_table(&dir.join("classes.toml"))?,
            pets: load_pet_table(&dir.join("pets.toml"))?,
            creatures: load_creature_table(&dir.join("creatures.toml"))?,
            engine: load_toml(&dir.join("engine.toml"))?,
        };
        tables.classes.validate()?;
        tables.pets.validate()?;
        tables.creatures.validate()?;
        tables.engine.validate()?;
        Ok(tables)
    }

    /// Class row, or a zero-contribution row if the class is missing
    pub fn class(&self, class: ClassId) -> ClassInfo {
        match self.classes.get(class) {
            Some(info) => info.clone(),
            None => {
                tracing::warn!(?class, "no class row, using zero fallback");
                ClassInfo::fallback(class)
            }
        }
    }

    /// Species row, or the table's fallback row if the species is missing
    pub fn pet(&self, species: &PetSpeciesId) -> PetInfo {
        if let Some(info) = self.pets.get(species) {
            return info.clone();
        }
        tracing::warn!(%species, "no pet row, using fallback");
        self.pets.fallback().cloned().unwrap_or_else(PetInfo::fallback)
    }

    /// Creature template, or an empty template if the id is missing
    pub fn creature(&self, id: &CreatureId) -> CreatureTemplate {
        match self.creatures.get(id) {
            Some(template) => template.clone(),
            None => {
                tracing::warn!(creature = %id, "no creature template, using empty template");
                CreatureTemplate::empty(id.clone())
            }
        }
    }
}

fn embedded<T: Default>(name: &str, parsed: Result<T, ConfigError>) -> T {
    parsed.unwrap_or_else(|err| {
        tracing::error!(file = name, error = %err, "embedded table failed to load");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CombatRating, Power};

    #[test]
    fn test_defaults_load() {
        let tables = StatTables::defaults();
        assert_eq!(tables.classes.len(), 12);
        assert!(tables.pets.fallback().is_some());
        assert!(tables.creatures.get(&CreatureId::from("forest_wolf")).is_some());
        assert_eq!(tables.engine.points_per_percent(CombatRating::Dodge), Some(66.0));
        assert_eq!(tables.engine.power_default(Power::Rage), 100.0);
    }

    #[test]
    fn test_default_tables_validate() {
        let tables = StatTables::defaults();
        assert!(tables.classes.validate().is_ok());
        assert!(tables.pets.validate().is_ok());
        assert!(tables.creatures.validate().is_ok());
        assert!(tables.engine.validate().is_ok());
    }

    #[test]
    fn test_missing_rows_fall_back() {
        let tables = StatTables::default();
        let class = tables.class(ClassId::Mage);
        assert_eq!(class.dodge_cap, 0.0);
        let pet = tables.pet(&PetSpeciesId::from("unknown"));
        assert_eq!(pet.pct_of_owner_health, 0.0);
        let creature = tables.creature(&CreatureId::from("nobody"));
        assert_eq!(creature.base_health, 0.0);
    }

    #[test]
    fn test_unknown_species_uses_table_fallback() {
        let tables = StatTables::defaults();
        let pet = tables.pet(&PetSpeciesId::from("dragon"));
        assert_eq!(pet.species, PetSpeciesId::fallback());
    }

    #[test]
    fn test_load_from_missing_dir() {
        let result = StatTables::load_from_dir(Path::new("/nonexistent/stat_tables"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_stat_line_defaults() {
        let line: StatLine = parse_toml("strength = 4.0").unwrap();
        assert_eq!(line.get(Stat::Strength), 4.0);
        assert_eq!(line.get(Stat::Intellect), 0.0);
    }
}
