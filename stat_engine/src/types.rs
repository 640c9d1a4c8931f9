//! Identifiers shared by every part of the engine

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Agility,
    Stamina,
    Intellect,
}

impl Stat {
    /// Get all primary stats
    pub fn all() -> &'static [Stat] {
        &[Stat::Strength, Stat::Agility, Stat::Stamina, Stat::Intellect]
    }

    /// Decode the stat carried in an aura's secondary misc value
    pub fn from_index(index: i32) -> Option<Stat> {
        match index {
            0 => Some(Stat::Strength),
            1 => Some(Stat::Agility),
            2 => Some(Stat::Stamina),
            3 => Some(Stat::Intellect),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

/// Power pools an entity may have
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Power {
    Mana,
    Rage,
    Focus,
    Energy,
    ComboPoints,
    Runes,
    RunicPower,
    AlternatePower,
}

impl Power {
    /// Get all power pools
    pub fn all() -> &'static [Power] {
        &[
            Power::Mana,
            Power::Rage,
            Power::Focus,
            Power::Energy,
            Power::ComboPoints,
            Power::Runes,
            Power::RunicPower,
            Power::AlternatePower,
        ]
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

/// Spell schools. `Normal` is physical damage and its "resistance" is armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellSchool {
    Normal,
    Holy,
    Fire,
    Nature,
    Frost,
    Shadow,
    Arcane,
}

impl SpellSchool {
    pub fn all() -> &'static [SpellSchool] {
        &[
            SpellSchool::Normal,
            SpellSchool::Holy,
            SpellSchool::Fire,
            SpellSchool::Nature,
            SpellSchool::Frost,
            SpellSchool::Shadow,
            SpellSchool::Arcane,
        ]
    }

    /// Every school except `Normal`
    pub fn magic() -> &'static [SpellSchool] {
        &SpellSchool::all()[1..]
    }

    /// Bit for this school in a school mask
    pub fn mask(self) -> i32 {
        1 << (self as i32)
    }

    /// Whether `mask` contains this school
    pub fn in_mask(self, mask: i32) -> bool {
        mask & self.mask() != 0
    }
}

/// Weapon slot an attack is made with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponAttackType {
    MainHand,
    OffHand,
    Ranged,
}

impl WeaponAttackType {
    pub fn all() -> &'static [WeaponAttackType] {
        &[
            WeaponAttackType::MainHand,
            WeaponAttackType::OffHand,
            WeaponAttackType::Ranged,
        ]
    }
}

/// Combat ratings tracked per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatRating {
    Dodge,
    Parry,
    Block,
    HitMelee,
    HitRanged,
    HitSpell,
    CritMelee,
    CritRanged,
    CritSpell,
    Lifesteal,
    Expertise,
    ArmorPenetration,
    Mastery,
    VersatilityDamageDone,
    VersatilityHealingDone,
}

impl CombatRating {
    pub fn all() -> &'static [CombatRating] {
        &[
            CombatRating::Dodge,
            CombatRating::Parry,
            CombatRating::Block,
            CombatRating::HitMelee,
            CombatRating::HitRanged,
            CombatRating::HitSpell,
            CombatRating::CritMelee,
            CombatRating::CritRanged,
            CombatRating::CritSpell,
            CombatRating::Lifesteal,
            CombatRating::Expertise,
            CombatRating::ArmorPenetration,
            CombatRating::Mastery,
            CombatRating::VersatilityDamageDone,
            CombatRating::VersatilityHealingDone,
        ]
    }

    /// Bit for this rating in a rating mask
    pub fn mask(self) -> i32 {
        1 << (self as i32)
    }

    /// Ratings contained in `mask`
    pub fn from_mask(mask: i32) -> impl Iterator<Item = CombatRating> {
        CombatRating::all()
            .iter()
            .copied()
            .filter(move |rating| mask & rating.mask() != 0)
    }
}

/// Hit chance categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Melee,
    Ranged,
    Spell,
}

impl HitKind {
    pub fn all() -> &'static [HitKind] {
        &[HitKind::Melee, HitKind::Ranged, HitKind::Spell]
    }
}

/// Playable classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassId {
    Warrior,
    Paladin,
    Hunter,
    Rogue,
    Priest,
    DeathKnight,
    Shaman,
    Mage,
    Warlock,
    Monk,
    Druid,
    DemonHunter,
}

impl ClassId {
    pub fn all() -> &'static [ClassId] {
        &[
            ClassId::Warrior,
            ClassId::Paladin,
            ClassId::Hunter,
            ClassId::Rogue,
            ClassId::Priest,
            ClassId::DeathKnight,
            ClassId::Shaman,
            ClassId::Mage,
            ClassId::Warlock,
            ClassId::Monk,
            ClassId::Druid,
            ClassId::DemonHunter,
        ]
    }
}

/// Which base-value policy an entity follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Independently played actor (class tables, items, ratings)
    Independent,
    /// Fully autonomous actor (static species template)
    Autonomous,
    /// Owned actor mirroring fractions of its owner
    Dependent,
}

/// Stable identifier of a dependent species (summon or pet family)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PetSpeciesId(pub String);

impl PetSpeciesId {
    pub fn fallback() -> Self {
        PetSpeciesId("fallback".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PetSpeciesId {
    fn from(s: &str) -> Self {
        PetSpeciesId(s.to_string())
    }
}

impl fmt::Display for PetSpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an autonomous species template
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub String);

impl From<&str> for CreatureId {
    fn from(s: &str) -> Self {
        CreatureId(s.to_string())
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a shapeshift form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormId(pub String);

impl From<&str> for FormId {
    fn from(s: &str) -> Self {
        FormId(s.to_string())
    }
}

/// Min/max damage pair of one weapon slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

impl DamageRange {
    pub const ZERO: DamageRange = DamageRange { min: 0.0, max: 0.0 };

    pub fn new(min: f64, max: f64) -> Self {
        DamageRange { min, max }
    }

    /// Sample one swing inside the range
    pub fn roll(&self, rng: &mut impl Rng) -> f64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}
