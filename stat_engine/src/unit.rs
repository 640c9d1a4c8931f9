//! UnitStats - state shared by every entity kind

use crate::aura::{AuraEffects, AuraType};
use crate::config::StatTables;
use crate::modifier::{apply_modifier, calculate_pct, ModifierSlot, ModifierTable, UnitMod};
use crate::publish::{FieldPublisher, PublishedFields, UnitField};
use crate::rating::RatingTable;
use crate::types::{CombatRating, DamageRange, Power, Stat, WeaponAttackType};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Weapon equipped in one attack slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub damage: DamageRange,
    pub attack_time_ms: u32,
}

impl Weapon {
    pub fn new(min: f64, max: f64, attack_time_ms: u32) -> Self {
        Weapon {
            damage: DamageRange::new(min, max),
            attack_time_ms,
        }
    }
}

/// Accumulators, ratings, auras and published fields of one entity
pub struct UnitStats {
    pub id: String,
    pub level: u8,
    pub tables: Arc<StatTables>,
    pub modifiers: ModifierTable,
    pub ratings: RatingTable,
    pub auras: AuraEffects,
    weapons: BTreeMap<WeaponAttackType, Weapon>,
    disarmed: BTreeMap<WeaponAttackType, bool>,
    base_spell_power: f64,
    base_mana_regen: f64,
    base_health_regen: f64,
    /// Level-derived base values added to the stored base-flat slot
    create_stats: BTreeMap<Stat, f64>,
    create_health: f64,
    create_powers: BTreeMap<Power, f64>,
    published: PublishedFields,
    sink: Option<Box<dyn FieldPublisher>>,
}

impl fmt::Debug for UnitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitStats")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("auras", &self.auras.len())
            .field("published", &self.published.len())
            .finish()
    }
}

impl UnitStats {
    pub fn new(
        id: impl Into<String>,
        level: u8,
        tables: Arc<StatTables>,
        modifiers: ModifierTable,
    ) -> Self {
        UnitStats {
            id: id.into(),
            level,
            tables,
            modifiers,
            ratings: RatingTable::default(),
            auras: AuraEffects::default(),
            weapons: BTreeMap::new(),
            disarmed: BTreeMap::new(),
            base_spell_power: 0.0,
            base_mana_regen: 0.0,
            base_health_regen: 0.0,
            create_stats: BTreeMap::new(),
            create_health: 0.0,
            create_powers: BTreeMap::new(),
            published: PublishedFields::default(),
            sink: None,
        }
    }

    // --- Publishing ---

    pub fn published(&self) -> &PublishedFields {
        &self.published
    }

    /// Attach an external sink; it hears about changed fields from now on
    pub fn attach_sink(&mut self, sink: Box<dyn FieldPublisher>) {
        self.sink = Some(sink);
    }

    pub fn detach_sink(&mut self) -> Option<Box<dyn FieldPublisher>> {
        self.sink.take()
    }

    /// Overwrite one published field, notifying the sink on change
    pub fn publish(&mut self, field: UnitField, value: f64) {
        if self.published.set(field, value) {
            if let Some(sink) = self.sink.as_mut() {
                sink.publish(field, value);
            }
        }
    }

    /// Published value of a primary stat
    pub fn stat(&self, stat: Stat) -> f64 {
        self.published.stat(stat)
    }

    // --- Base values ---

    pub fn set_create_stat(&mut self, stat: Stat, value: f64) {
        self.create_stats.insert(stat, value);
    }

    pub fn create_stat(&self, stat: Stat) -> f64 {
        self.create_stats.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn set_create_health(&mut self, value: f64) {
        self.create_health = value;
    }

    pub fn create_health(&self) -> f64 {
        self.create_health
    }

    pub fn set_create_power(&mut self, power: Power, value: f64) {
        self.create_powers.insert(power, value);
    }

    pub fn create_power(&self, power: Power) -> f64 {
        self.create_powers.get(&power).copied().unwrap_or(0.0)
    }

    /// Four-slot value of a primary stat, level base included
    pub fn stat_value(&self, stat: Stat) -> f64 {
        let unit_mod = UnitMod::Stat(stat);
        match self.modifiers.get(unit_mod) {
            Some(set) => set.value_with_base(set.get(ModifierSlot::BaseFlat) + self.create_stat(stat)),
            None => self.create_stat(stat),
        }
    }

    pub fn base_spell_power(&self) -> f64 {
        self.base_spell_power
    }

    pub fn base_mana_regen(&self) -> f64 {
        self.base_mana_regen
    }

    pub fn base_health_regen(&self) -> f64 {
        self.base_health_regen
    }

    pub(crate) fn modify_base_spell_power(&mut self, amount: i32, apply: bool) -> bool {
        let delta = apply_modifier(apply, self.base_spell_power, amount as f64);
        self.base_spell_power = delta.value;
        delta.apply
    }

    pub(crate) fn modify_base_mana_regen(&mut self, amount: i32, apply: bool) -> bool {
        let delta = apply_modifier(apply, self.base_mana_regen, amount as f64);
        self.base_mana_regen = delta.value;
        delta.apply
    }

    pub(crate) fn modify_base_health_regen(&mut self, amount: i32, apply: bool) -> bool {
        let delta = apply_modifier(apply, self.base_health_regen, amount as f64);
        self.base_health_regen = delta.value;
        delta.apply
    }

    // --- Weapons ---

    pub fn weapon(&self, attack: WeaponAttackType) -> Option<&Weapon> {
        self.weapons.get(&attack)
    }

    pub fn set_weapon(&mut self, attack: WeaponAttackType, weapon: Option<Weapon>) {
        match weapon {
            Some(weapon) => self.weapons.insert(attack, weapon),
            None => self.weapons.remove(&attack),
        };
    }

    pub fn has_offhand_weapon(&self) -> bool {
        self.weapons.contains_key(&WeaponAttackType::OffHand)
    }

    pub fn is_disarmed(&self, attack: WeaponAttackType) -> bool {
        self.disarmed.get(&attack).copied().unwrap_or(false)
    }

    pub fn set_disarmed(&mut self, attack: WeaponAttackType, disarmed: bool) {
        self.disarmed.insert(attack, disarmed);
    }

    /// Swing time of a slot, unarmed speed when empty
    pub fn attack_time_ms(&self, attack: WeaponAttackType) -> u32 {
        self.weapon(attack)
            .map(|w| w.attack_time_ms)
            .unwrap_or(self.tables.engine.unarmed.attack_time_ms)
    }

    // --- Ratings ---

    /// Rating amount plus rating-from-stat contributions
    pub fn effective_rating(&self, rating: CombatRating) -> f64 {
        let from_stats: f64 = self
            .auras
            .of_type(AuraType::ModRatingFromStat)
            .filter(|effect| effect.misc_value & rating.mask() != 0)
            .filter_map(|effect| {
                Stat::from_index(effect.misc_value_b)
                    .map(|stat| calculate_pct(self.stat(stat), effect.amount as f64))
            })
            .sum();
        self.ratings.amount(rating) + from_stats
    }

    /// Percentage granted by a rating
    pub fn rating_bonus(&self, rating: CombatRating) -> f64 {
        match self.tables.engine.points_per_percent(rating) {
            Some(points) if points > 0.0 => self.effective_rating(rating) / points,
            _ => {
                tracing::warn!(?rating, "no rating conversion, contributing zero");
                0.0
            }
        }
    }

    /// Union of rating masks of the rating-from-stat auras reading `stat`
    pub fn rating_mask_from_stat(&self, stat: Stat) -> i32 {
        self.auras
            .of_type(AuraType::ModRatingFromStat)
            .filter(|effect| Stat::from_index(effect.misc_value_b) == Some(stat))
            .fold(0, |mask, effect| mask | effect.misc_value)
    }

    /// Union of rating masks of every rating-from-stat aura
    pub fn rating_mask_from_any_stat(&self) -> i32 {
        self.auras
            .of_type(AuraType::ModRatingFromStat)
            .fold(0, |mask, effect| mask | effect.misc_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::AuraEffect;
    use crate::publish::RecordingPublisher;

    fn unit() -> UnitStats {
        UnitStats::new(
            "test",
            1,
            Arc::new(StatTables::defaults()),
            ModifierTable::new(UnitMod::common()),
        )
    }

    #[test]
    fn test_publish_notifies_on_change_only() {
        let mut unit = unit();
        let recorder = RecordingPublisher::new();
        unit.attach_sink(Box::new(recorder.clone()));

        unit.publish(UnitField::Armor, 10.0);
        unit.publish(UnitField::Armor, 10.0);
        unit.publish(UnitField::Armor, 12.0);
        assert_eq!(recorder.len(), 2);
        assert_eq!(unit.published().get(UnitField::Armor), 12.0);
    }

    #[test]
    fn test_stat_value_includes_level_base() {
        let mut unit = unit();
        unit.set_create_stat(Stat::Strength, 20.0);
        unit.modifiers
            .apply(UnitMod::Stat(Stat::Strength), ModifierSlot::BaseFlat, 5.0, true);
        unit.modifiers
            .apply(UnitMod::Stat(Stat::Strength), ModifierSlot::TotalPercent, 10.0, true);
        assert!((unit.stat_value(Stat::Strength) - 27.5).abs() < 1e-9);
    }

    #[test]
    fn test_rating_from_stat() {
        let mut unit = unit();
        unit.publish(UnitField::Stat(Stat::Intellect), 200.0);
        unit.ratings.apply(CombatRating::CritSpell, 35, true);
        unit.auras.add(
            AuraEffect::new(AuraType::ModRatingFromStat, 10)
                .with_misc(CombatRating::CritSpell.mask())
                .with_misc_b(Stat::Intellect.index()),
        );
        // 35 + 10% of 200
        assert!((unit.effective_rating(CombatRating::CritSpell) - 55.0).abs() < 1e-9);
        assert_eq!(unit.rating_mask_from_stat(Stat::Intellect), CombatRating::CritSpell.mask());
        assert_eq!(unit.rating_mask_from_stat(Stat::Agility), 0);
        // 55 / 35 per percent
        assert!((unit.rating_bonus(CombatRating::CritSpell) - 55.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_counters_never_negative() {
        let mut unit = unit();
        unit.modify_base_spell_power(100, true);
        unit.modify_base_spell_power(250, false);
        assert_eq!(unit.base_spell_power(), 0.0);
        unit.modify_base_mana_regen(-5, false);
        assert_eq!(unit.base_mana_regen(), 5.0);
    }

    #[test]
    fn test_unarmed_attack_time() {
        let mut unit = unit();
        assert_eq!(unit.attack_time_ms(WeaponAttackType::MainHand), 2000);
        unit.set_weapon(WeaponAttackType::MainHand, Some(Weapon::new(10.0, 20.0, 2600)));
        assert_eq!(unit.attack_time_ms(WeaponAttackType::MainHand), 2600);
        assert!(!unit.has_offhand_weapon());
    }
}
