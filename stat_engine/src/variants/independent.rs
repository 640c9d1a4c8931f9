//! Independent actor - class-driven, player-like entity
//!
//! Base values come from the class row and level. The actor owns its
//! dependents and pushes a fresh snapshot of its fields to them after
//! every cascade that touched something they mirror.

use super::DependentActor;
use crate::aura::AuraType;
use crate::cascade::{
    dependent_steps_for_owner, independent_stat_steps, CascadeReport, RecalcStep, FULL_PASS,
};
use crate::config::{ClassInfo, FormInfo, StatTables};
use crate::diminishing::{apply_stat_limit, diminishing_returns};
use crate::host::{
    attack_power_from_spell_power, ArmorValue, AttackPowerValue, AttributeHost, Recalculate,
    ResistanceValue, SpellBonus,
};
use crate::modifier::{add_pct, calculate_pct, ModifierSlot, ModifierTable, UnitMod};
use crate::publish::{OwnerSnapshot, UnitField};
use crate::types::{
    ClassId, CombatRating, DamageRange, EntityKind, FormId, HitKind, PetSpeciesId, Power,
    SpellSchool, Stat, WeaponAttackType,
};
use crate::unit::UnitStats;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug)]
pub struct IndependentActor {
    core: UnitStats,
    class: ClassInfo,
    form: Option<FormId>,
    dependents: Vec<DependentActor>,
}

impl IndependentActor {
    /// Spawn at `level` and run a full pass
    pub fn new(id: impl Into<String>, class: ClassId, level: u8, tables: Arc<StatTables>) -> Self {
        let info = tables.class(class);
        let mut mods = UnitMod::common();
        mods.extend(info.powers.iter().map(|power| UnitMod::Power(*power)));
        let core = UnitStats::new(id, level, tables, ModifierTable::new(mods));
        let mut actor = IndependentActor {
            core,
            class: info,
            form: None,
            dependents: Vec::new(),
        };
        actor.rebase();
        actor.update_all_stats();
        actor
    }

    pub fn class(&self) -> &ClassInfo {
        &self.class
    }

    pub fn form(&self) -> Option<&FormId> {
        self.form.as_ref()
    }

    /// Enter or leave a shapeshift form
    pub fn set_form(&mut self, form: Option<FormId>) -> CascadeReport {
        if let Some(id) = &form {
            if self.class.form(id).is_none() {
                tracing::warn!(class = ?self.class.class, form = ?id, "form unknown to class, no effect");
            }
        }
        self.form = form;
        self.run_cascade([RecalcStep::MeleeAttackPower, RecalcStep::RangedAttackPower])
    }

    fn active_form(&self) -> Option<&FormInfo> {
        self.form.as_ref().and_then(|id| self.class.form(id))
    }

    /// Spawn a dependent of `species` that mirrors this actor
    pub fn summon(&mut self, id: impl Into<String>, species: &PetSpeciesId) -> &DependentActor {
        let snapshot = OwnerSnapshot::new(self.core.published().clone());
        let dependent = DependentActor::new(
            id,
            species,
            self.core.level,
            Arc::clone(&self.core.tables),
            snapshot,
        );
        tracing::debug!(owner = %self.core.id, dependent = %dependent.core().id, %species, "summoned");
        self.dependents.push(dependent);
        &self.dependents[self.dependents.len() - 1]
    }

    pub fn dismiss(&mut self, id: &str) -> Option<DependentActor> {
        let index = self.dependents.iter().position(|d| d.core().id == id)?;
        Some(self.dependents.remove(index))
    }

    pub fn dependents(&self) -> &[DependentActor] {
        &self.dependents
    }

    pub fn dependent_mut(&mut self, id: &str) -> Option<&mut DependentActor> {
        self.dependents.iter_mut().find(|d| d.core().id == id)
    }

    fn percent_rating(&self, rating: CombatRating) -> f64 {
        self.core.rating_bonus(rating)
    }

    fn versatility_bonus(&self, rating: CombatRating) -> f64 {
        self.percent_rating(rating) + self.core.auras.total(AuraType::ModVersatility)
    }

    /// Spell power of the schools in `mask` before the negative split
    fn spell_damage_bonus(&self, mask: i32) -> f64 {
        let auras = &self.core.auras;
        if auras.has(AuraType::OverrideSpellPowerByAttackPowerPct) {
            let pct = auras.total(AuraType::OverrideSpellPowerByAttackPowerPct);
            return calculate_pct(self.core.published().total_attack_power(false), pct);
        }
        let mut bonus = self.core.base_spell_power() + auras.total_by_mask(AuraType::ModDamageDone, mask);
        let attack_power = self.core.published().total_attack_power(false);
        bonus += auras
            .of_type(AuraType::ModSpellDamageOfAttackPower)
            .filter(|effect| effect.misc_value & mask != 0)
            .map(|effect| calculate_pct(attack_power, effect.amount as f64))
            .sum::<f64>();
        bonus
    }

    fn spell_healing_bonus(&self) -> f64 {
        let auras = &self.core.auras;
        let attack_power = self.core.published().total_attack_power(false);
        if auras.has(AuraType::OverrideSpellPowerByAttackPowerPct) {
            let pct = auras.total(AuraType::OverrideSpellPowerByAttackPowerPct);
            return calculate_pct(attack_power, pct);
        }
        let mut bonus = self.core.base_spell_power() + auras.total(AuraType::ModHealingDone);
        bonus += auras
            .of_type(AuraType::ModSpellHealingOfAttackPower)
            .map(|effect| calculate_pct(attack_power, effect.amount as f64))
            .sum::<f64>();
        bonus
    }
}

impl AttributeHost for IndependentActor {
    fn core(&self) -> &UnitStats {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitStats {
        &mut self.core
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Independent
    }

    fn stat_dependents(&self, stat: Stat) -> &'static [RecalcStep] {
        independent_stat_steps(stat)
    }

    fn rebase(&mut self) {
        let level = self.core.level;
        for stat in Stat::all() {
            self.core.set_create_stat(*stat, self.class.stat_at(*stat, level));
        }
        self.core.set_create_health(self.class.health_at(level));
        for power in &self.class.powers {
            let base = match power {
                Power::Mana => self.class.mana_at(level),
                other => self.core.tables.engine.power_default(*other),
            };
            self.core.set_create_power(*power, base);
        }
    }

    fn armor(&self) -> Option<ArmorValue> {
        let set = self.core.modifiers.get(UnitMod::Armor)?;
        let base = set.get(ModifierSlot::BaseFlat);
        let mut value = base * set.get(ModifierSlot::BasePercent) + set.get(ModifierSlot::TotalFlat);
        value += self
            .core
            .auras
            .of_type(AuraType::ModResistanceOfStatPercent)
            .filter(|effect| SpellSchool::Normal.in_mask(effect.misc_value))
            .filter_map(|effect| {
                Stat::from_index(effect.misc_value_b)
                    .map(|stat| calculate_pct(self.core.stat(stat), effect.amount as f64))
            })
            .sum::<f64>();
        value *= set.get(ModifierSlot::TotalPercent);
        Some(ArmorValue {
            base: base.trunc(),
            total: value.max(0.0).trunc(),
        })
    }

    fn max_health(&self) -> Option<f64> {
        let set = self.core.modifiers.get(UnitMod::Health)?;
        let base = set.get(ModifierSlot::BaseFlat) + self.core.create_health();
        let from_stamina = self.core.stat(Stat::Stamina).max(0.0)
            * self.core.tables.engine.hp_per_stamina(self.core.level);
        let value = (base * set.get(ModifierSlot::BasePercent)
            + set.get(ModifierSlot::TotalFlat)
            + from_stamina)
            * set.get(ModifierSlot::TotalPercent);
        Some(value.max(0.0).trunc())
    }

    fn max_power(&self, power: Power) -> Option<f64> {
        if !self.class.has_power(power) {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::Power(power))?;
        let value =
            set.value_with_base(set.get(ModifierSlot::BaseFlat) + self.core.create_power(power));
        Some(value.max(0.0).round())
    }

    fn attack_power(&self, ranged: bool) -> Option<AttackPowerValue> {
        let unit_mod = if ranged {
            UnitMod::AttackPowerRanged
        } else {
            UnitMod::AttackPower
        };
        let set = self.core.modifiers.get(unit_mod)?;
        let auras = &self.core.auras;
        let published = self.core.published();

        let value = if attack_power_from_spell_power(auras) {
            let lowest = SpellSchool::magic()
                .iter()
                .map(|school| published.get(UnitField::DamageDonePos(*school)))
                .fold(published.get(UnitField::HealingDoneBonus), f64::min);
            calculate_pct(lowest, auras.total(AuraType::OverrideAttackPowerBySpellPowerPct))
        } else if ranged {
            self.core.stat(Stat::Agility).max(0.0) * self.class.ranged_attack_power_per_agility
        } else {
            let strength = self.core.stat(Stat::Strength);
            let agility = self.core.stat(Stat::Agility);
            let mut value = (strength * self.class.attack_power_per_strength).max(0.0)
                + (agility * self.class.attack_power_per_agility).max(0.0);
            if self.active_form().is_some_and(|form| form.ap_from_strength) {
                value += (agility * self.class.attack_power_per_strength).max(0.0);
            }
            value
        };

        // Stored BaseFlat adds to the computed base (DESIGN.md decision 11)
        let base = (set.get(ModifierSlot::BaseFlat) + value) * set.get(ModifierSlot::BasePercent);
        let mut mod_pos = set.get(ModifierSlot::TotalFlat);
        if !ranged {
            let armor = published.total_armor();
            mod_pos += auras
                .of_type(AuraType::ModAttackPowerOfArmor)
                .filter(|effect| effect.amount > 0)
                .map(|effect| (armor / effect.amount as f64).trunc())
                .sum::<f64>();
        }
        Some(AttackPowerValue {
            base: base.trunc(),
            mod_pos: mod_pos.trunc(),
            multiplier: set.get(ModifierSlot::TotalPercent) - 1.0,
            bonus_damage: None,
        })
    }

    fn damage_range(&self, attack: WeaponAttackType) -> Option<DamageRange> {
        let set = self.core.modifiers.get(UnitMod::Damage(attack))?;
        if attack == WeaponAttackType::OffHand
            && !(self.core.has_offhand_weapon() && self.class.can_dual_wield)
        {
            return Some(DamageRange::ZERO);
        }

        let ranged = attack == WeaponAttackType::Ranged;
        let attack_time = f64::from(self.core.attack_time_ms(attack));
        let ap_mod = (attack_time / 1000.0).max(0.25);
        let base = set.get(ModifierSlot::BaseFlat)
            + self.core.published().total_attack_power(ranged) / 3.5 * ap_mod;
        let versatility = add_pct(
            1.0,
            self.versatility_bonus(CombatRating::VersatilityDamageDone),
        );

        let unarmed = &self.core.tables.engine.unarmed;
        let weapon = self.core.weapon(attack).map(|w| w.damage);
        let round_time = self
            .active_form()
            .map(|form| form.combat_round_time_ms)
            .filter(|ms| *ms > 0);
        let weapon = if let Some(round_time) = round_time {
            let scale = f64::from(round_time) / 1000.0 / ap_mod;
            let damage = weapon.unwrap_or(DamageRange::new(unarmed.min, unarmed.max));
            DamageRange::new(damage.min * scale, damage.max * scale)
        } else if self.core.is_disarmed(attack) {
            if attack != WeaponAttackType::MainHand {
                return Some(DamageRange::ZERO);
            }
            DamageRange::new(unarmed.min, unarmed.max)
        } else {
            match (attack, weapon) {
                (_, Some(damage)) => damage,
                (WeaponAttackType::MainHand, None) => DamageRange::new(unarmed.min, unarmed.max),
                (_, None) => DamageRange::ZERO,
            }
        };

        let compute = |weapon_damage: f64| {
            ((weapon_damage + base) * set.get(ModifierSlot::BasePercent)
                + set.get(ModifierSlot::TotalFlat))
                * set.get(ModifierSlot::TotalPercent)
                * versatility
        };
        Some(DamageRange::new(compute(weapon.min), compute(weapon.max)))
    }

    fn resistance(&self, school: SpellSchool) -> Option<ResistanceValue> {
        if school == SpellSchool::Normal {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::Resistance(school))?;
        let base = set.get(ModifierSlot::BaseFlat);
        Some(ResistanceValue {
            base: base.trunc(),
            bonus: (set.value() - base).trunc(),
        })
    }

    fn crit(&self, attack: WeaponAttackType) -> Option<f64> {
        let rating = match attack {
            WeaponAttackType::Ranged => CombatRating::CritRanged,
            _ => CombatRating::CritMelee,
        };
        let engine = &self.core.tables.engine;
        let value = engine.base_percentages.crit
            + self.core.auras.total(AuraType::ModCritPct)
            + self.percent_rating(rating);
        Some(apply_stat_limit(value, engine.stat_limits.crit()))
    }

    fn spell_crit(&self) -> Option<f64> {
        let auras = &self.core.auras;
        Some(
            self.core.tables.engine.base_percentages.spell_crit
                + auras.total(AuraType::ModSpellCritChance)
                + auras.total(AuraType::ModCritPct)
                + self.percent_rating(CombatRating::CritSpell),
        )
    }

    fn block(&self) -> Option<f64> {
        if !self.class.can_block {
            return Some(0.0);
        }
        let engine = &self.core.tables.engine;
        let value = engine.base_percentages.block
            + self.core.auras.total(AuraType::ModBlockPercent)
            + self.percent_rating(CombatRating::Block);
        Some(apply_stat_limit(value, engine.stat_limits.block()))
    }

    fn parry(&self) -> Option<f64> {
        if !self.class.can_parry {
            return Some(0.0);
        }
        let engine = &self.core.tables.engine;
        let nondiminishing =
            engine.base_percentages.parry + self.core.auras.total(AuraType::ModParryPercent);
        let value = diminishing_returns(
            nondiminishing,
            self.percent_rating(CombatRating::Parry),
            self.class.parry_cap,
            self.class.diminishing_k,
        );
        Some(apply_stat_limit(value, engine.stat_limits.parry()))
    }

    fn dodge(&self) -> Option<f64> {
        let nondiminishing =
            self.class.base_dodge + self.core.auras.total(AuraType::ModDodgePercent);
        let diminishing = self.core.stat(Stat::Agility) * self.class.dodge_per_agility
            + self.percent_rating(CombatRating::Dodge);
        let value = diminishing_returns(
            nondiminishing,
            diminishing,
            self.class.dodge_cap,
            self.class.diminishing_k,
        );
        Some(apply_stat_limit(
            value,
            self.core.tables.engine.stat_limits.dodge(),
        ))
    }

    fn expertise(&self, attack: WeaponAttackType) -> Option<f64> {
        if attack == WeaponAttackType::Ranged {
            return None;
        }
        let value = self.percent_rating(CombatRating::Expertise).trunc()
            + self.core.auras.total(AuraType::ModExpertise);
        Some(value.max(0.0))
    }

    fn mastery(&self) -> Option<f64> {
        if self.core.level < self.class.mastery_level {
            return Some(0.0);
        }
        Some(self.core.auras.total(AuraType::Mastery) + self.percent_rating(CombatRating::Mastery))
    }

    fn versatility(&self) -> Option<f64> {
        Some(
            self.core
                .effective_rating(CombatRating::VersatilityDamageDone)
                .trunc(),
        )
    }

    fn healing_done_percent(&self) -> Option<f64> {
        let mut value = add_pct(
            1.0,
            self.versatility_bonus(CombatRating::VersatilityHealingDone),
        );
        for effect in self.core.auras.of_type(AuraType::ModHealingDonePercent) {
            value = add_pct(value, effect.amount as f64);
        }
        Some(value)
    }

    fn lifesteal(&self) -> Option<f64> {
        Some(self.core.auras.total(AuraType::ModLeech) + self.percent_rating(CombatRating::Lifesteal))
    }

    fn hit_chance(&self, kind: HitKind) -> Option<f64> {
        let base = &self.core.tables.engine.base_percentages;
        let auras = &self.core.auras;
        let value = match kind {
            HitKind::Melee => {
                base.melee_hit
                    + auras.total(AuraType::ModHitChance)
                    + self.percent_rating(CombatRating::HitMelee)
            }
            HitKind::Ranged => {
                base.ranged_hit
                    + auras.total(AuraType::ModHitChance)
                    + self.percent_rating(CombatRating::HitRanged)
            }
            HitKind::Spell => {
                base.spell_hit
                    + auras.total(AuraType::ModSpellHitChance)
                    + self.percent_rating(CombatRating::HitSpell)
            }
        };
        Some(value)
    }

    fn combat_rating(&self, rating: CombatRating) -> Option<f64> {
        Some(self.core.effective_rating(rating).trunc())
    }

    fn spell_bonus(&self) -> Option<SpellBonus> {
        let mut damage_pos = BTreeMap::new();
        let mut damage_neg = BTreeMap::new();
        for school in SpellSchool::magic() {
            let neg: f64 = self
                .core
                .auras
                .of_type(AuraType::ModDamageDone)
                .filter(|effect| effect.amount < 0 && school.in_mask(effect.misc_value))
                .map(|effect| effect.amount as f64)
                .sum();
            let pos = self.spell_damage_bonus(school.mask()).trunc() - neg;
            damage_neg.insert(*school, neg);
            damage_pos.insert(*school, pos);
        }
        Some(SpellBonus {
            healing: self.spell_healing_bonus().trunc(),
            damage_pos,
            damage_neg,
        })
    }

    fn mana_regen(&self) -> Option<f64> {
        if !self.class.has_power(Power::Mana) {
            return None;
        }
        let auras = &self.core.auras;
        let mana = Power::Mana.index();
        let mut regen = self.class.mana_at(self.core.level) / 100.0
            + self.core.base_mana_regen()
            + auras.total_by_misc(AuraType::ModPowerRegen, mana);
        regen *= auras.multiplier_by_misc(AuraType::ModPowerRegenPercent, mana);
        regen *= auras.multiplier_by_misc(AuraType::ModManaRegenPct, mana);
        Some(regen)
    }

    fn after_cascade(&mut self, report: &CascadeReport) {
        if self.dependents.is_empty() {
            return;
        }
        let steps: BTreeSet<RecalcStep> = if report.full_pass {
            FULL_PASS.iter().copied().collect()
        } else {
            report
                .steps
                .iter()
                .flat_map(|step| dependent_steps_for_owner(*step).iter().copied())
                .collect()
        };
        if steps.is_empty() {
            return;
        }
        let snapshot = OwnerSnapshot::new(self.core.published().clone());
        for dependent in &mut self.dependents {
            tracing::debug!(
                owner = %self.core.id,
                dependent = %dependent.core().id,
                steps = steps.len(),
                "propagating to dependent"
            );
            dependent.sync_owner(snapshot.clone(), steps.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::AuraEffect;
    use crate::unit::Weapon;

    const EPS: f64 = 1e-9;

    fn tables() -> Arc<StatTables> {
        Arc::new(StatTables::defaults())
    }

    fn warrior() -> IndependentActor {
        IndependentActor::new("warrior", ClassId::Warrior, 1, tables())
    }

    fn field(actor: &IndependentActor, field: UnitField) -> f64 {
        actor.core().published().get(field)
    }

    #[test]
    fn test_spawn_publishes_class_base() {
        let actor = warrior();
        assert_eq!(field(&actor, UnitField::Stat(Stat::Strength)), 20.0);
        // 90 base + 15 stamina * 10
        assert_eq!(field(&actor, UnitField::MaxHealth), 240.0);
        assert_eq!(field(&actor, UnitField::AttackPower), 20.0);
        assert_eq!(field(&actor, UnitField::MaxPower(Power::Rage)), 100.0);
        assert!(actor
            .core()
            .published()
            .try_get(UnitField::MaxPower(Power::Mana))
            .is_none());
    }

    #[test]
    fn test_unarmed_main_hand_damage() {
        let actor = warrior();
        let range = actor.core().published().damage_range(WeaponAttackType::MainHand);
        // unarmed 1..2 plus 20 AP / 3.5 * 2.0
        let bonus = 20.0 / 3.5 * 2.0;
        assert!((range.min - (1.0 + bonus)).abs() < EPS);
        assert!((range.max - (2.0 + bonus)).abs() < EPS);
        let off = actor.core().published().damage_range(WeaponAttackType::OffHand);
        assert_eq!(off, DamageRange::ZERO);
    }

    #[test]
    fn test_offhand_needs_dual_wield() {
        let mut paladin = IndependentActor::new("paladin", ClassId::Paladin, 1, tables());
        paladin.set_offhand(Some(Weapon::new(10.0, 20.0, 2000)));
        assert_eq!(
            paladin.core().published().damage_range(WeaponAttackType::OffHand),
            DamageRange::ZERO
        );

        let mut actor = warrior();
        actor.set_offhand(Some(Weapon::new(10.0, 20.0, 2000)));
        let off = actor.core().published().damage_range(WeaponAttackType::OffHand);
        assert!(off.min > 10.0);
    }

    #[test]
    fn test_disarm_falls_back_to_unarmed() {
        let mut actor = warrior();
        actor.set_weapon(
            WeaponAttackType::MainHand,
            Some(Weapon::new(50.0, 80.0, 2000)),
        );
        let armed = actor.core().published().damage_range(WeaponAttackType::MainHand);
        actor.set_disarmed(WeaponAttackType::MainHand, true);
        let disarmed = actor.core().published().damage_range(WeaponAttackType::MainHand);
        assert!((armed.min - disarmed.min - 49.0).abs() < EPS);

        actor.set_weapon(WeaponAttackType::Ranged, Some(Weapon::new(30.0, 40.0, 3000)));
        actor.set_disarmed(WeaponAttackType::Ranged, true);
        assert_eq!(
            actor.core().published().damage_range(WeaponAttackType::Ranged),
            DamageRange::ZERO
        );
    }

    #[test]
    fn test_cat_form_redirects_agility() {
        let mut druid = IndependentActor::new("druid", ClassId::Druid, 1, tables());
        let agility = field(&druid, UnitField::Stat(Stat::Agility));
        let before = field(&druid, UnitField::AttackPower);
        druid.set_form(Some(FormId::from("cat")));
        let after = field(&druid, UnitField::AttackPower);
        let per_strength = druid.class().attack_power_per_strength;
        assert_eq!(after - before, (agility * per_strength).max(0.0).trunc());
    }

    #[test]
    fn test_form_round_time_scales_weapon() {
        let mut druid = IndependentActor::new("druid", ClassId::Druid, 1, tables());
        druid.set_weapon(
            WeaponAttackType::MainHand,
            Some(Weapon::new(100.0, 100.0, 2000)),
        );
        let normal = druid.core().published().damage_range(WeaponAttackType::MainHand);
        druid.set_form(Some(FormId::from("moonkin")));
        // moonkin has no round time
        let moonkin = druid.core().published().damage_range(WeaponAttackType::MainHand);
        assert!((normal.min - moonkin.min).abs() < EPS);

        // cat swings every second: 100 * 1.0 / 2.0
        druid.set_form(Some(FormId::from("cat")));
        let ap = druid.core().published().total_attack_power(false);
        let cat = druid.core().published().damage_range(WeaponAttackType::MainHand);
        assert!((cat.min - (50.0 + ap / 3.5 * 2.0)).abs() < EPS);
    }

    #[test]
    fn test_parry_zero_for_class_without_cap() {
        let mut mage = IndependentActor::new("mage", ClassId::Mage, 1, tables());
        mage.apply_rating(CombatRating::Parry, 500, true);
        mage.add_aura(AuraEffect::new(AuraType::ModParryPercent, 10));
        assert_eq!(field(&mage, UnitField::Parry), 0.0);
    }

    #[test]
    fn test_parry_diminishes() {
        let mut actor = warrior();
        assert_eq!(field(&actor, UnitField::Parry), 5.0);
        actor.apply_rating(CombatRating::Parry, 660, true);
        let parry = field(&actor, UnitField::Parry);
        let expected = diminishing_returns(5.0, 10.0, 65.63144, 0.956);
        assert!((parry - expected).abs() < EPS);
        assert!(parry < 15.0);
    }

    #[test]
    fn test_block_and_crit_uncapped_sums() {
        let mut actor = warrior();
        actor.apply_rating(CombatRating::CritMelee, 70, true);
        actor.add_aura(AuraEffect::new(AuraType::ModCritPct, 3));
        let crit = field(&actor, UnitField::Crit(WeaponAttackType::MainHand));
        assert!((crit - 10.0).abs() < EPS);
        let ranged = field(&actor, UnitField::Crit(WeaponAttackType::Ranged));
        assert!((ranged - 8.0).abs() < EPS);
        assert_eq!(field(&actor, UnitField::Block), 5.0);
    }

    #[test]
    fn test_negative_crit_left_unclamped() {
        let mut actor = warrior();
        actor.add_aura(AuraEffect::new(AuraType::ModCritPct, -20));
        assert!((field(&actor, UnitField::Crit(WeaponAttackType::MainHand)) + 15.0).abs() < EPS);
    }

    #[test]
    fn test_expertise_clamped_at_zero() {
        let mut actor = warrior();
        actor.add_aura(AuraEffect::new(AuraType::ModExpertise, -5));
        assert_eq!(field(&actor, UnitField::Expertise(WeaponAttackType::MainHand)), 0.0);
        assert!(actor
            .core()
            .published()
            .try_get(UnitField::Expertise(WeaponAttackType::Ranged))
            .is_none());
    }

    #[test]
    fn test_mastery_locked_below_level() {
        let mut actor = warrior();
        actor.apply_rating(CombatRating::Mastery, 350, true);
        assert_eq!(field(&actor, UnitField::Mastery), 0.0);
        actor.set_level(10);
        assert!((field(&actor, UnitField::Mastery) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_versatility_scales_every_damage_slot() {
        let mut actor = warrior();
        actor.set_offhand(Some(Weapon::new(10.0, 20.0, 2000)));
        actor.set_weapon(WeaponAttackType::Ranged, Some(Weapon::new(10.0, 20.0, 2000)));
        let before: Vec<DamageRange> = WeaponAttackType::all()
            .iter()
            .map(|a| actor.core().published().damage_range(*a))
            .collect();
        let report = actor.apply_rating(CombatRating::VersatilityDamageDone, 400, true);
        for attack in WeaponAttackType::all() {
            assert!(report.ran(RecalcStep::Damage(*attack)));
        }
        for (attack, before) in WeaponAttackType::all().iter().zip(before) {
            let after = actor.core().published().damage_range(*attack);
            assert!((after.min - before.min * 1.1).abs() < 1e-6);
        }
        assert_eq!(field(&actor, UnitField::Versatility), 400.0);
    }

    #[test]
    fn test_spell_bonus_positive_negative_split() {
        let mut mage = IndependentActor::new("mage", ClassId::Mage, 1, tables());
        mage.apply_spell_power_bonus(100, true);
        mage.add_aura(AuraEffect::new(AuraType::ModDamageDone, -30).with_misc(SpellSchool::Fire.mask()));
        assert_eq!(field(&mage, UnitField::DamageDoneNeg(SpellSchool::Fire)), -30.0);
        assert_eq!(field(&mage, UnitField::DamageDonePos(SpellSchool::Fire)), 100.0);
        assert_eq!(field(&mage, UnitField::DamageDonePos(SpellSchool::Frost)), 100.0);
        assert_eq!(mage.core().published().school_damage_bonus(SpellSchool::Fire), 130.0);
        assert_eq!(field(&mage, UnitField::HealingDoneBonus), 100.0);
    }

    #[test]
    fn test_spell_power_override_blocks_bonus() {
        let mut actor = warrior();
        actor.add_aura(AuraEffect::new(
            AuraType::OverrideSpellPowerByAttackPowerPct,
            50,
        ));
        assert!(actor.apply_spell_power_bonus(100, true).is_none());
        assert_eq!(actor.core().base_spell_power(), 0.0);
        // 50% of 20 AP
        assert_eq!(field(&actor, UnitField::DamageDonePos(SpellSchool::Fire)), 10.0);
    }

    #[test]
    fn test_attack_power_from_spell_power() {
        let mut mage = IndependentActor::new("mage", ClassId::Mage, 1, tables());
        mage.apply_spell_power_bonus(200, true);
        let report = mage.add_aura(AuraEffect::new(
            AuraType::OverrideAttackPowerBySpellPowerPct,
            50,
        ));
        assert!(report.dropped.is_empty());
        assert_eq!(field(&mage, UnitField::AttackPower), 100.0);
        assert_eq!(field(&mage, UnitField::RangedAttackPower), 100.0);

        // Raising spell power re-runs attack power through the backward edge
        let report = mage.apply_spell_power_bonus(100, true).unwrap();
        assert!(report.ran(RecalcStep::MeleeAttackPower));
        assert_eq!(field(&mage, UnitField::AttackPower), 150.0);
    }

    #[test]
    fn test_attack_power_of_armor() {
        let mut actor = warrior();
        actor.handle_stat_modifier(UnitMod::Armor, ModifierSlot::BaseFlat, 1000.0, true);
        let before = field(&actor, UnitField::AttackPowerModPos);
        actor.add_aura(AuraEffect::new(AuraType::ModAttackPowerOfArmor, 100));
        assert_eq!(field(&actor, UnitField::AttackPowerModPos) - before, 10.0);

        let report = actor
            .handle_stat_modifier(UnitMod::Armor, ModifierSlot::BaseFlat, 1000.0, true)
            .unwrap();
        assert!(report.ran(RecalcStep::MeleeAttackPower));
        assert_eq!(field(&actor, UnitField::AttackPowerModPos) - before, 20.0);
    }

    #[test]
    fn test_armor_from_intellect_aura() {
        let mut actor = warrior();
        actor.add_aura(
            AuraEffect::new(AuraType::ModResistanceOfStatPercent, 100)
                .with_misc(SpellSchool::Normal.mask())
                .with_misc_b(Stat::Intellect.index()),
        );
        assert_eq!(field(&actor, UnitField::Armor), 0.0);
        assert_eq!(field(&actor, UnitField::BonusArmor), 5.0);
    }

    #[test]
    fn test_absent_power_is_noop() {
        let mut actor = warrior();
        assert!(actor
            .handle_stat_modifier(UnitMod::Power(Power::Mana), ModifierSlot::TotalFlat, 50.0, true)
            .is_none());
        assert!(actor.mana_regen().is_none());
    }

    #[test]
    fn test_mana_regen() {
        let mut mage = IndependentActor::new("mage", ClassId::Mage, 1, tables());
        assert!((field(&mage, UnitField::PowerRegen(Power::Mana)) - 5.0).abs() < EPS);
        mage.add_aura(
            AuraEffect::new(AuraType::ModManaRegenPct, 100).with_misc(Power::Mana.index()),
        );
        assert!((field(&mage, UnitField::PowerRegen(Power::Mana)) - 10.0).abs() < EPS);
        assert_eq!(
            field(&mage, UnitField::PowerRegenInterrupted(Power::Mana)),
            field(&mage, UnitField::PowerRegen(Power::Mana))
        );
        mage.apply_mana_regen_bonus(10, true);
        assert!((field(&mage, UnitField::PowerRegen(Power::Mana)) - 30.0).abs() < EPS);
    }

    #[test]
    fn test_rating_from_stat_follows_stat() {
        let mut actor = warrior();
        actor.add_aura(
            AuraEffect::new(AuraType::ModRatingFromStat, 100)
                .with_misc(CombatRating::CritMelee.mask())
                .with_misc_b(Stat::Strength.index()),
        );
        // 20 strength -> 20 rating
        assert_eq!(field(&actor, UnitField::Rating(CombatRating::CritMelee)), 20.0);
        let report = actor.handle_stat_modifier(
            UnitMod::Stat(Stat::Strength),
            ModifierSlot::TotalFlat,
            15.0,
            true,
        );
        let report = report.unwrap();
        assert!(report.ran(RecalcStep::Crit(WeaponAttackType::MainHand)));
        assert_eq!(field(&actor, UnitField::Rating(CombatRating::CritMelee)), 35.0);
        assert!((field(&actor, UnitField::Crit(WeaponAttackType::MainHand)) - 6.0).abs() < EPS);
    }

    #[test]
    fn test_summon_and_dismiss() {
        let mut hunter = IndependentActor::new("hunter", ClassId::Hunter, 1, tables());
        hunter.summon("cat", &PetSpeciesId::from("hunter_pet"));
        assert_eq!(hunter.dependents().len(), 1);
        assert!(hunter.dependent_mut("cat").is_some());
        assert!(hunter.dismiss("cat").is_some());
        assert!(hunter.dismiss("cat").is_none());
        assert!(hunter.dependents().is_empty());
    }
}
