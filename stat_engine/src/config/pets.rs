//! Dependent species table loading

use super::{ConfigError, StatLine};
use crate::types::{PetSpeciesId, Power, SpellSchool};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Which owner attribute feeds a dependent's attack power
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OwnerApSource {
    #[default]
    None,
    /// Owner's total melee attack power
    Melee { ap: f64, bonus_damage: f64 },
    /// Owner's total ranged attack power
    Ranged { ap: f64, bonus_damage: f64 },
    /// Best of the owner's spell damage in these schools, floored at 0
    SpellSchools {
        schools: Vec<SpellSchool>,
        ap: f64,
        bonus_damage: f64,
    },
}

/// Owner spell damage of one school added to weapon damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchoolCoefficient {
    pub school: SpellSchool,
    pub coefficient: f64,
}

/// Base-value row of one dependent species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetInfo {
    pub species: PetSpeciesId,
    #[serde(default)]
    pub pct_of_owner_armor: f64,
    #[serde(default)]
    pub pct_of_owner_health: f64,
    /// Applied to both owner resistance and owner bonus resistance
    #[serde(default)]
    pub pct_of_owner_resistance: f64,
    #[serde(default)]
    pub owner_attack_power: OwnerApSource,
    #[serde(default)]
    pub spell_damage_bonus: Option<SchoolCoefficient>,
    #[serde(default = "default_ap_per_strength")]
    pub attack_power_per_strength: f64,
    #[serde(default = "default_ap_offset")]
    pub attack_power_offset: f64,
    #[serde(default)]
    pub stats: StatLine,
    #[serde(default)]
    pub power: Option<Power>,
    #[serde(default)]
    pub base_power: f64,
    /// Bonus damage mirrors the owner's magic spell power
    #[serde(default)]
    pub inherits_spell_power: bool,
}

fn default_ap_per_strength() -> f64 {
    2.0
}
fn default_ap_offset() -> f64 {
    -20.0
}

impl PetInfo {
    /// Zero-contribution row used when a table has no fallback of its own
    pub fn fallback() -> Self {
        PetInfo {
            species: PetSpeciesId::fallback(),
            pct_of_owner_armor: 0.0,
            pct_of_owner_health: 0.0,
            pct_of_owner_resistance: 0.0,
            owner_attack_power: OwnerApSource::None,
            spell_damage_bonus: None,
            attack_power_per_strength: default_ap_per_strength(),
            attack_power_offset: default_ap_offset(),
            stats: StatLine::default(),
            power: None,
            base_power: 0.0,
            inherits_spell_power: false,
        }
    }
}

/// Container for species rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetTable {
    #[serde(default)]
    pets: Vec<PetInfo>,
}

impl PetTable {
    pub fn get(&self, species: &PetSpeciesId) -> Option<&PetInfo> {
        self.pets.iter().find(|p| &p.species == species)
    }

    pub fn fallback(&self) -> Option<&PetInfo> {
        self.get(&PetSpeciesId::fallback())
    }

    pub fn species(&self) -> impl Iterator<Item = &PetSpeciesId> {
        self.pets.iter().map(|p| &p.species)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for row in &self.pets {
            if !seen.insert(row.species.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate pet species {}",
                    row.species
                )));
            }
            if row.pct_of_owner_armor < 0.0
                || row.pct_of_owner_health < 0.0
                || row.pct_of_owner_resistance < 0.0
            {
                return Err(ConfigError::ValidationError(format!(
                    "negative owner percentage for {}",
                    row.species
                )));
            }
        }
        if self.fallback().is_none() {
            return Err(ConfigError::ValidationError(
                "pet table has no fallback row".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load species rows from a TOML file
pub fn load_pet_table(path: &Path) -> Result<PetTable, ConfigError> {
    let table: PetTable = super::load_toml(path)?;
    table.validate()?;
    Ok(table)
}

/// Load species rows from a TOML string
pub fn parse_pet_table(content: &str) -> Result<PetTable, ConfigError> {
    let table: PetTable = super::parse_toml(content)?;
    table.validate()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pets() {
        let toml = r#"
[[pets]]
species = "fallback"

[[pets]]
species = "hunter_pet"
pct_of_owner_armor = 170.0
owner_attack_power = { type = "ranged", ap = 0.22, bonus_damage = 0.1287 }

[[pets]]
species = "felguard"
owner_attack_power = { type = "spell_schools", schools = ["fire", "shadow"], ap = 0.57, bonus_damage = 0.15 }
"#;
        let table = parse_pet_table(toml).unwrap();
        let hunter_pet = table.get(&PetSpeciesId::from("hunter_pet")).unwrap();
        assert_eq!(hunter_pet.pct_of_owner_armor, 170.0);
        assert_eq!(hunter_pet.attack_power_per_strength, 2.0);
        assert_eq!(
            hunter_pet.owner_attack_power,
            OwnerApSource::Ranged {
                ap: 0.22,
                bonus_damage: 0.1287
            }
        );

        let felguard = table.get(&PetSpeciesId::from("felguard")).unwrap();
        match &felguard.owner_attack_power {
            OwnerApSource::SpellSchools { schools, .. } => {
                assert_eq!(schools, &vec![SpellSchool::Fire, SpellSchool::Shadow]);
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(table.fallback().unwrap().owner_attack_power, OwnerApSource::None);
    }

    #[test]
    fn test_requires_fallback() {
        let toml = r#"
[[pets]]
species = "imp"
"#;
        assert!(matches!(
            parse_pet_table(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_default_niuzao_row() {
        let table = parse_pet_table(include_str!("../../config/pets.toml")).unwrap();
        let niuzao = table.get(&PetSpeciesId::from("niuzao")).unwrap();
        assert_eq!(niuzao.pct_of_owner_armor, 100.0);
        let imp = table.get(&PetSpeciesId::from("imp")).unwrap();
        assert_eq!(imp.attack_power_offset, -10.0);
    }
}
