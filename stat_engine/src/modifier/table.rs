//! Attribute ids and the per-entity table of modifier sets

use super::slot::{ModifierSet, ModifierSlot};
use crate::types::{Power, SpellSchool, Stat, WeaponAttackType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute that owns a modifier set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMod {
    Stat(Stat),
    Health,
    Power(Power),
    Armor,
    Resistance(SpellSchool),
    AttackPower,
    AttackPowerRanged,
    Damage(WeaponAttackType),
}

impl UnitMod {
    /// Resistance id for a school; physical resistance is armor
    pub fn resistance(school: SpellSchool) -> UnitMod {
        match school {
            SpellSchool::Normal => UnitMod::Armor,
            other => UnitMod::Resistance(other),
        }
    }

    fn normalized(self) -> UnitMod {
        match self {
            UnitMod::Resistance(school) => UnitMod::resistance(school),
            other => other,
        }
    }

    /// Ids every entity carries, regardless of power pools
    pub fn common() -> Vec<UnitMod> {
        let mut mods: Vec<UnitMod> = Stat::all().iter().map(|s| UnitMod::Stat(*s)).collect();
        mods.extend([UnitMod::Health, UnitMod::Armor]);
        mods.extend(SpellSchool::magic().iter().map(|s| UnitMod::Resistance(*s)));
        mods.extend([UnitMod::AttackPower, UnitMod::AttackPowerRanged]);
        mods.extend(WeaponAttackType::all().iter().map(|a| UnitMod::Damage(*a)));
        mods
    }
}

/// Modifier sets of one entity, keyed by attribute
///
/// Only attributes the entity has are present. Operations on an absent
/// id are no-ops and return `None`.
#[derive(Debug, Clone, Default)]
pub struct ModifierTable {
    sets: BTreeMap<UnitMod, ModifierSet>,
}

impl ModifierTable {
    pub fn new(mods: impl IntoIterator<Item = UnitMod>) -> Self {
        ModifierTable {
            sets: mods
                .into_iter()
                .map(|m| (m.normalized(), ModifierSet::default()))
                .collect(),
        }
    }

    pub fn contains(&self, unit_mod: UnitMod) -> bool {
        self.sets.contains_key(&unit_mod.normalized())
    }

    pub fn get(&self, unit_mod: UnitMod) -> Option<&ModifierSet> {
        self.sets.get(&unit_mod.normalized())
    }

    /// Slot value, `None` when the attribute is absent
    pub fn slot(&self, unit_mod: UnitMod, slot: ModifierSlot) -> Option<f64> {
        self.get(unit_mod).map(|set| set.get(slot))
    }

    /// Final value, `None` when the attribute is absent
    pub fn value(&self, unit_mod: UnitMod) -> Option<f64> {
        self.get(unit_mod).map(ModifierSet::value)
    }

    /// Add or remove a contribution, returning the effective direction
    pub fn apply(
        &mut self,
        unit_mod: UnitMod,
        slot: ModifierSlot,
        amount: f64,
        apply: bool,
    ) -> Option<bool> {
        self.sets
            .get_mut(&unit_mod.normalized())
            .map(|set| set.apply(slot, amount, apply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_attribute_is_noop() {
        let mut table = ModifierTable::new([UnitMod::Health]);
        assert!(table
            .apply(UnitMod::Power(Power::Rage), ModifierSlot::TotalFlat, 10.0, true)
            .is_none());
        assert!(table.value(UnitMod::Power(Power::Rage)).is_none());
        assert_eq!(table.value(UnitMod::Health), Some(0.0));
    }

    #[test]
    fn test_normal_resistance_is_armor() {
        let mut table = ModifierTable::new(UnitMod::common());
        table.apply(
            UnitMod::Resistance(SpellSchool::Normal),
            ModifierSlot::BaseFlat,
            300.0,
            true,
        );
        assert_eq!(table.value(UnitMod::Armor), Some(300.0));
    }

    #[test]
    fn test_common_mods() {
        let table = ModifierTable::new(UnitMod::common());
        assert!(table.contains(UnitMod::Damage(WeaponAttackType::Ranged)));
        assert!(table.contains(UnitMod::Resistance(SpellSchool::Arcane)));
        assert!(!table.contains(UnitMod::Power(Power::Mana)));
    }
}
