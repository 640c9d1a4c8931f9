//! Attribute host - the capability every entity kind implements
//!
//! A host supplies pure per-attribute computations over its current
//! state. [`Recalculate`] is implemented for every host and owns the rest:
//! input mutation, the cascade driver, and publishing.

use crate::aura::{AuraEffect, AuraEffects, AuraType};
use crate::cascade::{
    aura_steps, rating_steps, unit_mod_step, CascadeReport, RecalcStep, Schedule,
};
use crate::modifier::{ModifierSlot, UnitMod};
use crate::publish::UnitField;
use crate::types::{
    CombatRating, DamageRange, EntityKind, HitKind, Power, SpellSchool, Stat, WeaponAttackType,
};
use crate::unit::{UnitStats, Weapon};
use std::collections::BTreeMap;

/// Armor split the way it is published
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmorValue {
    pub base: f64,
    pub total: f64,
}

/// Attack power fields of one slot (melee or ranged)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackPowerValue {
    pub base: f64,
    pub mod_pos: f64,
    /// Total percent minus one
    pub multiplier: f64,
    /// Bonus damage drawn from an owner, dependents only
    pub bonus_damage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceValue {
    pub base: f64,
    pub bonus: f64,
}

/// Spell damage and healing bonus, damage split per magic school
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpellBonus {
    pub healing: f64,
    pub damage_pos: BTreeMap<SpellSchool, f64>,
    pub damage_neg: BTreeMap<SpellSchool, f64>,
}

/// Access to an entity's state plus its pure attribute computations
///
/// Every computation reads current accumulators, ratings, auras and
/// published fields without mutating them. `None` means the entity does
/// not have the attribute; nothing is published for it.
pub trait AttributeHost {
    fn core(&self) -> &UnitStats;
    fn core_mut(&mut self) -> &mut UnitStats;
    fn kind(&self) -> EntityKind;

    /// Steps fed by a primary stat
    fn stat_dependents(&self, stat: Stat) -> &'static [RecalcStep];

    /// Re-derive level-dependent base values
    fn rebase(&mut self) {}

    fn armor(&self) -> Option<ArmorValue>;
    fn max_health(&self) -> Option<f64>;
    fn max_power(&self, power: Power) -> Option<f64>;
    fn attack_power(&self, ranged: bool) -> Option<AttackPowerValue>;
    fn damage_range(&self, attack: WeaponAttackType) -> Option<DamageRange>;
    fn resistance(&self, school: SpellSchool) -> Option<ResistanceValue>;

    fn crit(&self, _attack: WeaponAttackType) -> Option<f64> {
        None
    }
    fn spell_crit(&self) -> Option<f64> {
        None
    }
    fn block(&self) -> Option<f64> {
        None
    }
    fn parry(&self) -> Option<f64> {
        None
    }
    fn dodge(&self) -> Option<f64> {
        None
    }
    fn expertise(&self, _attack: WeaponAttackType) -> Option<f64> {
        None
    }
    fn mastery(&self) -> Option<f64> {
        None
    }
    fn versatility(&self) -> Option<f64> {
        None
    }
    fn healing_done_percent(&self) -> Option<f64> {
        None
    }
    fn lifesteal(&self) -> Option<f64> {
        None
    }
    fn hit_chance(&self, _kind: HitKind) -> Option<f64> {
        None
    }
    fn combat_rating(&self, _rating: CombatRating) -> Option<f64> {
        None
    }
    fn spell_bonus(&self) -> Option<SpellBonus> {
        None
    }
    /// Bonus damage mirrored from an owner's spell power
    fn mirrored_spell_power(&self) -> Option<f64> {
        None
    }
    fn mana_regen(&self) -> Option<f64> {
        None
    }

    /// Called once a cascade has published everything it touched
    fn after_cascade(&mut self, _report: &CascadeReport) {}
}

/// Attack power is replaced by spell power. The reverse override wins
/// when both are active.
pub(crate) fn attack_power_from_spell_power(auras: &AuraEffects) -> bool {
    if !auras.has(AuraType::OverrideAttackPowerBySpellPowerPct) {
        return false;
    }
    if auras.has(AuraType::OverrideSpellPowerByAttackPowerPct) {
        tracing::warn!("both attack power and spell power overrides active, ignoring the attack power one");
        return false;
    }
    true
}

fn spell_reads_attack_power(auras: &AuraEffects) -> bool {
    auras.has(AuraType::ModSpellDamageOfAttackPower)
        || auras.has(AuraType::ModSpellHealingOfAttackPower)
        || auras.has(AuraType::OverrideSpellPowerByAttackPowerPct)
}

/// Mutations and cascade driver, available on every host
pub trait Recalculate: AttributeHost {
    /// Compute one step and publish what it owns
    fn publish_step(&mut self, step: RecalcStep) {
        let mut out: Vec<(UnitField, f64)> = Vec::new();
        match step {
            RecalcStep::Stat(stat) => {
                out.push((UnitField::Stat(stat), self.core().stat_value(stat).trunc()));
            }
            RecalcStep::Armor => {
                if let Some(armor) = self.armor() {
                    out.push((UnitField::Armor, armor.base));
                    out.push((UnitField::BonusArmor, armor.total - armor.base));
                }
            }
            RecalcStep::MeleeAttackPower | RecalcStep::RangedAttackPower => {
                let ranged = step == RecalcStep::RangedAttackPower;
                if let Some(ap) = self.attack_power(ranged) {
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
                    out.push((base, ap.base));
                    out.push((mod_pos, ap.mod_pos));
                    out.push((multiplier, ap.multiplier));
                    if let Some(bonus) = ap.bonus_damage {
                        out.push((UnitField::BonusDamage, bonus));
                    }
                }
            }
            RecalcStep::Damage(attack) => {
                if let Some(range) = self.damage_range(attack) {
                    out.push((UnitField::MinDamage(attack), range.min));
                    out.push((UnitField::MaxDamage(attack), range.max));
                }
            }
            RecalcStep::MaxHealth => push_opt(&mut out, UnitField::MaxHealth, self.max_health()),
            RecalcStep::MaxPower(power) => {
                push_opt(&mut out, UnitField::MaxPower(power), self.max_power(power))
            }
            RecalcStep::Ratings => {
                for rating in CombatRating::all() {
                    push_opt(&mut out, UnitField::Rating(*rating), self.combat_rating(*rating));
                }
            }
            RecalcStep::Crit(attack) => push_opt(&mut out, UnitField::Crit(attack), self.crit(attack)),
            RecalcStep::SpellCrit => push_opt(&mut out, UnitField::SpellCrit, self.spell_crit()),
            RecalcStep::Block => push_opt(&mut out, UnitField::Block, self.block()),
            RecalcStep::Parry => push_opt(&mut out, UnitField::Parry, self.parry()),
            RecalcStep::Dodge => push_opt(&mut out, UnitField::Dodge, self.dodge()),
            RecalcStep::Expertise(attack) => {
                push_opt(&mut out, UnitField::Expertise(attack), self.expertise(attack))
            }
            RecalcStep::Mastery => push_opt(&mut out, UnitField::Mastery, self.mastery()),
            RecalcStep::Versatility => {
                push_opt(&mut out, UnitField::Versatility, self.versatility())
            }
            RecalcStep::HealingDonePercent => push_opt(
                &mut out,
                UnitField::HealingDonePercent,
                self.healing_done_percent(),
            ),
            RecalcStep::Lifesteal => push_opt(&mut out, UnitField::Lifesteal, self.lifesteal()),
            RecalcStep::HitChance(kind) => {
                push_opt(&mut out, UnitField::HitChance(kind), self.hit_chance(kind))
            }
            RecalcStep::SpellDamageAndHealing => {
                if let Some(bonus) = self.spell_bonus() {
                    out.push((UnitField::HealingDoneBonus, bonus.healing));
                    for school in SpellSchool::magic() {
                        let neg = bonus.damage_neg.get(school).copied().unwrap_or(0.0);
                        let pos = bonus.damage_pos.get(school).copied().unwrap_or(0.0);
                        out.push((UnitField::DamageDoneNeg(*school), neg));
                        out.push((UnitField::DamageDonePos(*school), pos));
                    }
                }
                push_opt(&mut out, UnitField::BonusDamage, self.mirrored_spell_power());
            }
            RecalcStep::ManaRegen => {
                if let Some(regen) = self.mana_regen() {
                    out.push((UnitField::PowerRegen(Power::Mana), regen));
                    out.push((UnitField::PowerRegenInterrupted(Power::Mana), regen));
                }
            }
            RecalcStep::Resistance(school) => {
                if let Some(resistance) = self.resistance(school) {
                    out.push((UnitField::Resistance(school), resistance.base));
                    out.push((UnitField::BonusResistance(school), resistance.bonus));
                }
            }
        }

        let core = self.core_mut();
        for (field, value) in out {
            core.publish(field, value);
        }
    }

    /// Steps that must run after `step` published
    fn follow_ups(&self, step: RecalcStep) -> Vec<RecalcStep> {
        let core = self.core();
        match step {
            RecalcStep::Stat(stat) => {
                let mut steps = self.stat_dependents(stat).to_vec();
                let mask = core.rating_mask_from_stat(stat);
                steps.extend(CombatRating::from_mask(mask).flat_map(rating_steps));
                steps
            }
            RecalcStep::Armor if self.kind() == EntityKind::Independent => {
                vec![RecalcStep::MeleeAttackPower]
            }
            RecalcStep::MeleeAttackPower => {
                let mut steps = vec![
                    RecalcStep::Damage(WeaponAttackType::MainHand),
                    RecalcStep::Damage(WeaponAttackType::OffHand),
                ];
                if spell_reads_attack_power(&core.auras) {
                    steps.push(RecalcStep::SpellDamageAndHealing);
                }
                steps
            }
            RecalcStep::RangedAttackPower => vec![RecalcStep::Damage(WeaponAttackType::Ranged)],
            RecalcStep::SpellDamageAndHealing if attack_power_from_spell_power(&core.auras) => {
                vec![RecalcStep::MeleeAttackPower, RecalcStep::RangedAttackPower]
            }
            RecalcStep::Ratings => CombatRating::from_mask(core.rating_mask_from_any_stat())
                .flat_map(rating_steps)
                .filter(|s| *s != RecalcStep::Ratings)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Run a cascade seeded with `seeds`
    fn run_cascade(&mut self, seeds: impl IntoIterator<Item = RecalcStep>) -> CascadeReport
    where
        Self: Sized,
    {
        self.drive(Schedule::new(seeds))
    }

    fn drive(&mut self, mut schedule: Schedule) -> CascadeReport {
        while let Some(step) = schedule.next_step() {
            self.publish_step(step);
            let next = self.follow_ups(step);
            schedule.extend(next);
        }
        let report = schedule.finish();
        tracing::debug!(
            entity = %self.core().id,
            steps = report.steps.len(),
            full_pass = report.full_pass,
            "cascade finished"
        );
        self.after_cascade(&report);
        report
    }

    /// Recompute every attribute in safe order
    fn update_all_stats(&mut self) -> CascadeReport {
        self.drive(Schedule::full_pass())
    }

    /// Recompute one primary stat and what it feeds
    fn update_stat(&mut self, stat: Stat) -> CascadeReport {
        self.drive(Schedule::new([RecalcStep::Stat(stat)]))
    }

    /// Add or remove a modifier contribution. `None` if the entity lacks the attribute.
    fn handle_stat_modifier(
        &mut self,
        unit_mod: UnitMod,
        slot: ModifierSlot,
        amount: f64,
        apply: bool,
    ) -> Option<CascadeReport> {
        self.core_mut().modifiers.apply(unit_mod, slot, amount, apply)?;
        Some(self.drive(Schedule::new([unit_mod_step(unit_mod)])))
    }

    fn apply_rating(&mut self, rating: CombatRating, amount: i32, apply: bool) -> CascadeReport {
        self.core_mut().ratings.apply(rating, amount, apply);
        self.drive(Schedule::new(rating_steps(rating)))
    }

    fn add_aura(&mut self, effect: AuraEffect) -> CascadeReport {
        self.core_mut().auras.add(effect);
        self.drive(Schedule::new(aura_seeds(&effect)))
    }

    /// `None` if the effect was not active
    fn remove_aura(&mut self, effect: &AuraEffect) -> Option<CascadeReport> {
        if !self.core_mut().auras.remove(effect) {
            return None;
        }
        Some(self.drive(Schedule::new(aura_seeds(effect))))
    }

    fn set_weapon(&mut self, attack: WeaponAttackType, weapon: Option<Weapon>) -> CascadeReport {
        self.core_mut().set_weapon(attack, weapon);
        self.drive(Schedule::new([RecalcStep::Damage(attack)]))
    }

    /// Change a slot's damage range, keeping its swing time
    fn set_weapon_damage(&mut self, attack: WeaponAttackType, min: f64, max: f64) -> CascadeReport {
        let attack_time_ms = self.core().attack_time_ms(attack);
        self.set_weapon(attack, Some(Weapon::new(min, max, attack_time_ms)))
    }

    fn set_offhand(&mut self, weapon: Option<Weapon>) -> CascadeReport {
        self.set_weapon(WeaponAttackType::OffHand, weapon)
    }

    fn set_disarmed(&mut self, attack: WeaponAttackType, disarmed: bool) -> CascadeReport {
        self.core_mut().set_disarmed(attack, disarmed);
        self.drive(Schedule::new([RecalcStep::Damage(attack)]))
    }

    /// No-op returning `None` while spell power is overridden by attack power
    fn apply_spell_power_bonus(&mut self, amount: i32, apply: bool) -> Option<CascadeReport> {
        if self
            .core()
            .auras
            .has(AuraType::OverrideSpellPowerByAttackPowerPct)
        {
            return None;
        }
        self.core_mut().modify_base_spell_power(amount, apply);
        Some(self.drive(Schedule::new([RecalcStep::SpellDamageAndHealing])))
    }

    fn apply_mana_regen_bonus(&mut self, amount: i32, apply: bool) -> CascadeReport {
        self.core_mut().modify_base_mana_regen(amount, apply);
        self.drive(Schedule::new([RecalcStep::ManaRegen]))
    }

    /// No derived attribute reads health regen; returns the effective direction
    fn apply_health_regen_bonus(&mut self, amount: i32, apply: bool) -> bool {
        self.core_mut().modify_base_health_regen(amount, apply)
    }

    fn set_level(&mut self, level: u8) -> CascadeReport {
        self.core_mut().level = level;
        self.rebase();
        self.update_all_stats()
    }
}

impl<T: AttributeHost> Recalculate for T {}

fn push_opt(out: &mut Vec<(UnitField, f64)>, field: UnitField, value: Option<f64>) {
    if let Some(value) = value {
        out.push((field, value));
    }
}

fn aura_seeds(effect: &AuraEffect) -> Vec<RecalcStep> {
    let mut seeds = aura_steps(effect.aura);
    if effect.aura == AuraType::ModRatingFromStat {
        seeds.extend(CombatRating::from_mask(effect.misc_value).flat_map(rating_steps));
    }
    seeds
}
