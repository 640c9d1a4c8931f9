//! Field publishing - the outward face of every recomputation
//!
//! Each entity keeps the last value it published per field. Writes are
//! overwrite-only from a single writer, and an attached sink only hears
//! about fields whose value actually changed.

use crate::types::{
    CombatRating, DamageRange, HitKind, Power, SpellSchool, Stat, WeaponAttackType,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

/// Every externally replicated scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitField {
    Stat(Stat),
    Armor,
    BonusArmor,
    Resistance(SpellSchool),
    BonusResistance(SpellSchool),
    MaxHealth,
    MaxPower(Power),
    AttackPower,
    AttackPowerModPos,
    AttackPowerMultiplier,
    RangedAttackPower,
    RangedAttackPowerModPos,
    RangedAttackPowerMultiplier,
    MinDamage(WeaponAttackType),
    MaxDamage(WeaponAttackType),
    Crit(WeaponAttackType),
    SpellCrit,
    Block,
    Parry,
    Dodge,
    Expertise(WeaponAttackType),
    Mastery,
    Versatility,
    Lifesteal,
    HitChance(HitKind),
    HealingDoneBonus,
    DamageDonePos(SpellSchool),
    DamageDoneNeg(SpellSchool),
    HealingDonePercent,
    PowerRegen(Power),
    PowerRegenInterrupted(Power),
    Rating(CombatRating),
    /// Extra damage a dependent draws from its owner
    BonusDamage,
}

fn snake_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::from("?"),
    }
}

impl fmt::Display for UnitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, detail) = match self {
            UnitField::Stat(s) => ("stat", Some(snake_name(s))),
            UnitField::Resistance(s) => ("resistance", Some(snake_name(s))),
            UnitField::BonusResistance(s) => ("bonus_resistance", Some(snake_name(s))),
            UnitField::MaxPower(p) => ("max_power", Some(snake_name(p))),
            UnitField::MinDamage(a) => ("min_damage", Some(snake_name(a))),
            UnitField::MaxDamage(a) => ("max_damage", Some(snake_name(a))),
            UnitField::Crit(a) => ("crit", Some(snake_name(a))),
            UnitField::Expertise(a) => ("expertise", Some(snake_name(a))),
            UnitField::HitChance(k) => ("hit_chance", Some(snake_name(k))),
            UnitField::DamageDonePos(s) => ("damage_done_pos", Some(snake_name(s))),
            UnitField::DamageDoneNeg(s) => ("damage_done_neg", Some(snake_name(s))),
            UnitField::PowerRegen(p) => ("power_regen", Some(snake_name(p))),
            UnitField::PowerRegenInterrupted(p) => ("power_regen_interrupted", Some(snake_name(p))),
            UnitField::Rating(r) => ("rating", Some(snake_name(r))),
            unit => return f.write_str(&snake_name(unit)),
        };
        match detail {
            Some(detail) => write!(f, "{}.{}", name, detail),
            None => f.write_str(name),
        }
    }
}

/// Receiver of published values
pub trait FieldPublisher {
    fn publish(&mut self, field: UnitField, value: f64);
}

/// Last published value of every field of one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedFields {
    values: BTreeMap<UnitField, f64>,
}

impl PublishedFields {
    /// Overwrite a field. Returns true if the value changed.
    pub fn set(&mut self, field: UnitField, value: f64) -> bool {
        match self.values.insert(field, value) {
            Some(previous) => previous.to_bits() != value.to_bits(),
            None => true,
        }
    }

    /// Published value, 0 for a field never published
    pub fn get(&self, field: UnitField) -> f64 {
        self.try_get(field).unwrap_or(0.0)
    }

    pub fn try_get(&self, field: UnitField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitField, f64)> + '_ {
        self.values.iter().map(|(field, value)| (*field, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn stat(&self, stat: Stat) -> f64 {
        self.get(UnitField::Stat(stat))
    }

    /// `(attack_power + mod_pos) × (1 + multiplier)`
    pub fn total_attack_power(&self, ranged: bool) -> f64 {
        let (base, mod_pos, multiplier) = if ranged {
            (
                UnitField::RangedAttackPower,
                UnitField::RangedAttackPowerModPos,
                UnitField::RangedAttackPowerMultiplier,
            )
        } else {
            (
                UnitField::AttackPower,
                UnitField::AttackPowerModPos,
                UnitField::AttackPowerMultiplier,
            )
        };
        (self.get(base) + self.get(mod_pos)) * (1.0 + self.get(multiplier))
    }

    pub fn damage_range(&self, attack: WeaponAttackType) -> DamageRange {
        DamageRange::new(
            self.get(UnitField::MinDamage(attack)),
            self.get(UnitField::MaxDamage(attack)),
        )
    }

    /// Total armor (base plus bonus)
    pub fn total_armor(&self) -> f64 {
        self.get(UnitField::Armor) + self.get(UnitField::BonusArmor)
    }

    /// Spell damage of one school as read by dependents: pos minus neg
    pub fn school_damage_bonus(&self, school: SpellSchool) -> f64 {
        self.get(UnitField::DamageDonePos(school)) - self.get(UnitField::DamageDoneNeg(school))
    }

    /// Export with stable key ordering
    pub fn to_json(&self) -> String {
        let named: BTreeMap<String, f64> = self
            .values
            .iter()
            .map(|(field, value)| (field.to_string(), *value))
            .collect();
        serde_json::to_string_pretty(&named).unwrap_or_default()
    }
}

/// Records every notification; clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    entries: Rc<RefCell<Vec<(UnitField, f64)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(UnitField, f64)> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Most recent value notified for `field`
    pub fn last(&self, field: UnitField) -> Option<f64> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| *value)
    }
}

impl FieldPublisher for RecordingPublisher {
    fn publish(&mut self, field: UnitField, value: f64) {
        self.entries.borrow_mut().push((field, value));
    }
}

/// Frozen copy of an owner's published fields
///
/// This is all a dependent ever sees of its owner. It has no way back
/// into the owner's recomputation.
#[derive(Debug, Clone, Default)]
pub struct OwnerSnapshot(Arc<PublishedFields>);

impl OwnerSnapshot {
    pub fn new(fields: PublishedFields) -> Self {
        OwnerSnapshot(Arc::new(fields))
    }
}

impl Deref for OwnerSnapshot {
    type Target = PublishedFields;

    fn deref(&self) -> &PublishedFields {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut fields = PublishedFields::default();
        assert!(fields.set(UnitField::MaxHealth, 100.0));
        assert!(!fields.set(UnitField::MaxHealth, 100.0));
        assert!(fields.set(UnitField::MaxHealth, 120.0));
        assert_eq!(fields.get(UnitField::MaxHealth), 120.0);
        assert_eq!(fields.get(UnitField::Dodge), 0.0);
        assert!(fields.try_get(UnitField::Dodge).is_none());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(UnitField::MaxHealth.to_string(), "max_health");
        assert_eq!(
            UnitField::MinDamage(WeaponAttackType::OffHand).to_string(),
            "min_damage.off_hand"
        );
        assert_eq!(UnitField::Stat(Stat::Agility).to_string(), "stat.agility");
        assert_eq!(
            UnitField::Rating(CombatRating::VersatilityDamageDone).to_string(),
            "rating.versatility_damage_done"
        );
    }

    #[test]
    fn test_total_attack_power() {
        let mut fields = PublishedFields::default();
        fields.set(UnitField::AttackPower, 100.0);
        fields.set(UnitField::AttackPowerModPos, 20.0);
        fields.set(UnitField::AttackPowerMultiplier, 0.5);
        assert!((fields.total_attack_power(false) - 180.0).abs() < 1e-9);
        assert_eq!(fields.total_attack_power(true), 0.0);
    }

    #[test]
    fn test_json_is_stable() {
        let mut a = PublishedFields::default();
        a.set(UnitField::Dodge, 5.0);
        a.set(UnitField::Armor, 300.0);
        let mut b = PublishedFields::default();
        b.set(UnitField::Armor, 300.0);
        b.set(UnitField::Dodge, 5.0);
        assert_eq!(a.to_json(), b.to_json());
        assert!(a.to_json().contains("\"armor\": 300.0"));
    }

    #[test]
    fn test_recording_publisher_shares_log() {
        let recorder = RecordingPublisher::new();
        let mut sink: Box<dyn FieldPublisher> = Box::new(recorder.clone());
        sink.publish(UnitField::Block, 5.0);
        sink.publish(UnitField::Block, 6.0);
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.last(UnitField::Block), Some(6.0));
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut fields = PublishedFields::default();
        fields.set(UnitField::Armor, 100.0);
        let snapshot = OwnerSnapshot::new(fields.clone());
        fields.set(UnitField::Armor, 200.0);
        assert_eq!(snapshot.get(UnitField::Armor), 100.0);
    }
}
