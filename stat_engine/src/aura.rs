//! Status-effect outputs consumed by the engine
//!
//! Aura storage and lifecycle belong to the caller. The engine keeps the
//! list of active effects it was notified about and reads totals from it.

use crate::modifier::add_pct;
use serde::{Deserialize, Serialize};

/// Aura effect types that feed derived attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraType {
    ModDodgePercent,
    ModParryPercent,
    ModBlockPercent,
    ModCritPct,
    ModSpellCritChance,
    ModHitChance,
    ModSpellHitChance,
    /// Flat expertise
    ModExpertise,
    Mastery,
    ModVersatility,
    ModLeech,
    ModHealingDonePercent,
    /// misc = school mask
    ModDamagePercentDone,
    /// misc = school mask
    ModDamageDone,
    ModHealingDone,
    /// Percent of attack power added to spell damage, misc = school mask
    ModSpellDamageOfAttackPower,
    /// Percent of attack power added to healing
    ModSpellHealingOfAttackPower,
    /// Attack power replaced by a percent of spell power
    OverrideAttackPowerBySpellPowerPct,
    /// Spell power replaced by a percent of attack power
    OverrideSpellPowerByAttackPowerPct,
    /// misc = school mask, misc_b = stat
    ModResistanceOfStatPercent,
    /// One attack power per `amount` armor
    ModAttackPowerOfArmor,
    /// misc = power
    ModPowerRegen,
    /// misc = power
    ModPowerRegenPercent,
    /// misc = power
    ModManaRegenPct,
    /// misc = rating mask, misc_b = stat
    ModRatingFromStat,
}

/// One active aura effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraEffect {
    pub aura: AuraType,
    pub amount: i32,
    #[serde(default)]
    pub misc_value: i32,
    #[serde(default)]
    pub misc_value_b: i32,
}

impl AuraEffect {
    pub fn new(aura: AuraType, amount: i32) -> Self {
        AuraEffect {
            aura,
            amount,
            misc_value: 0,
            misc_value_b: 0,
        }
    }

    pub fn with_misc(mut self, misc_value: i32) -> Self {
        self.misc_value = misc_value;
        self
    }

    pub fn with_misc_b(mut self, misc_value_b: i32) -> Self {
        self.misc_value_b = misc_value_b;
        self
    }
}

/// Active aura effects of one entity
#[derive(Debug, Clone, Default)]
pub struct AuraEffects {
    effects: Vec<AuraEffect>,
}

impl AuraEffects {
    pub fn add(&mut self, effect: AuraEffect) {
        self.effects.push(effect);
    }

    /// Remove one matching effect. Returns false if none was active.
    pub fn remove(&mut self, effect: &AuraEffect) -> bool {
        match self.effects.iter().position(|e| e == effect) {
            Some(index) => {
                self.effects.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn of_type(&self, aura: AuraType) -> impl Iterator<Item = &AuraEffect> {
        self.effects.iter().filter(move |e| e.aura == aura)
    }

    pub fn has(&self, aura: AuraType) -> bool {
        self.of_type(aura).next().is_some()
    }

    pub fn total(&self, aura: AuraType) -> f64 {
        self.of_type(aura).map(|e| e.amount as f64).sum()
    }

    pub fn total_by_misc(&self, aura: AuraType, misc: i32) -> f64 {
        self.of_type(aura)
            .filter(|e| e.misc_value == misc)
            .map(|e| e.amount as f64)
            .sum()
    }

    pub fn total_by_mask(&self, aura: AuraType, mask: i32) -> f64 {
        self.of_type(aura)
            .filter(|e| e.misc_value & mask != 0)
            .map(|e| e.amount as f64)
            .sum()
    }

    /// Product of `(100 + amount) / 100` over matching effects
    pub fn multiplier_by_misc(&self, aura: AuraType, misc: i32) -> f64 {
        self.of_type(aura)
            .filter(|e| e.misc_value == misc)
            .fold(1.0, |acc, e| add_pct(acc, e.amount as f64))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuraEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
