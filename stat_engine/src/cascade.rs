//! Recalculation schedule
//!
//! Steps are declared in the order a full pass runs them, so the derived
//! ordering of [`RecalcStep`] doubles as the schedule: a step never reads
//! an attribute owned by a later step. Targeted recomputes seed a worklist
//! that always pops the earliest pending step.

use crate::aura::AuraType;
use crate::modifier::UnitMod;
use crate::types::{CombatRating, HitKind, Power, SpellSchool, Stat, WeaponAttackType};
use std::collections::{BTreeMap, BTreeSet};

/// One unit of recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecalcStep {
    Stat(Stat),
    Armor,
    MeleeAttackPower,
    RangedAttackPower,
    Damage(WeaponAttackType),
    MaxHealth,
    MaxPower(Power),
    Ratings,
    Crit(WeaponAttackType),
    SpellCrit,
    Block,
    Parry,
    Dodge,
    Expertise(WeaponAttackType),
    Mastery,
    Versatility,
    HealingDonePercent,
    Lifesteal,
    HitChance(HitKind),
    SpellDamageAndHealing,
    ManaRegen,
    Resistance(SpellSchool),
}

use RecalcStep as S;
use WeaponAttackType::{MainHand, OffHand, Ranged};

/// Every step, in safe order
pub const FULL_PASS: &[RecalcStep] = &[
    S::Stat(Stat::Strength),
    S::Stat(Stat::Agility),
    S::Stat(Stat::Stamina),
    S::Stat(Stat::Intellect),
    S::Armor,
    S::MeleeAttackPower,
    S::RangedAttackPower,
    S::Damage(MainHand),
    S::Damage(OffHand),
    S::Damage(Ranged),
    S::MaxHealth,
    S::MaxPower(Power::Mana),
    S::MaxPower(Power::Rage),
    S::MaxPower(Power::Focus),
    S::MaxPower(Power::Energy),
    S::MaxPower(Power::ComboPoints),
    S::MaxPower(Power::Runes),
    S::MaxPower(Power::RunicPower),
    S::MaxPower(Power::AlternatePower),
    S::Ratings,
    S::Crit(MainHand),
    S::Crit(OffHand),
    S::Crit(Ranged),
    S::SpellCrit,
    S::Block,
    S::Parry,
    S::Dodge,
    S::Expertise(MainHand),
    S::Expertise(OffHand),
    S::Mastery,
    S::Versatility,
    S::HealingDonePercent,
    S::Lifesteal,
    S::HitChance(HitKind::Melee),
    S::HitChance(HitKind::Ranged),
    S::HitChance(HitKind::Spell),
    S::SpellDamageAndHealing,
    S::ManaRegen,
    S::Resistance(SpellSchool::Holy),
    S::Resistance(SpellSchool::Fire),
    S::Resistance(SpellSchool::Nature),
    S::Resistance(SpellSchool::Frost),
    S::Resistance(SpellSchool::Shadow),
    S::Resistance(SpellSchool::Arcane),
];

const ALL_DAMAGE: &[RecalcStep] = &[S::Damage(MainHand), S::Damage(OffHand), S::Damage(Ranged)];
const ALL_CRIT: &[RecalcStep] = &[S::Crit(MainHand), S::Crit(OffHand), S::Crit(Ranged)];

/// Independent actor: what each primary stat feeds
pub fn independent_stat_steps(stat: Stat) -> &'static [RecalcStep] {
    match stat {
        Stat::Strength => &[S::MeleeAttackPower, S::SpellDamageAndHealing, S::ManaRegen],
        Stat::Agility => &[
            S::Armor,
            S::MeleeAttackPower,
            S::RangedAttackPower,
            S::Crit(MainHand),
            S::Crit(OffHand),
            S::Crit(Ranged),
            S::Dodge,
            S::SpellDamageAndHealing,
            S::ManaRegen,
        ],
        Stat::Stamina => &[S::MaxHealth, S::SpellDamageAndHealing, S::ManaRegen],
        Stat::Intellect => &[
            S::Armor,
            S::SpellCrit,
            S::SpellDamageAndHealing,
            S::ManaRegen,
        ],
    }
}

/// Dependent actor: only strength feeds anything (its attack power)
pub fn dependent_stat_steps(stat: Stat) -> &'static [RecalcStep] {
    match stat {
        Stat::Strength => &[S::MeleeAttackPower],
        _ => &[],
    }
}

/// Steps that read a rating
pub fn rating_steps(rating: CombatRating) -> Vec<RecalcStep> {
    let mut steps = vec![S::Ratings];
    match rating {
        CombatRating::Dodge => steps.push(S::Dodge),
        CombatRating::Parry => steps.push(S::Parry),
        CombatRating::Block => steps.push(S::Block),
        CombatRating::HitMelee => steps.push(S::HitChance(HitKind::Melee)),
        CombatRating::HitRanged => steps.push(S::HitChance(HitKind::Ranged)),
        CombatRating::HitSpell => steps.push(S::HitChance(HitKind::Spell)),
        CombatRating::CritMelee => steps.extend([S::Crit(MainHand), S::Crit(OffHand)]),
        CombatRating::CritRanged => steps.push(S::Crit(Ranged)),
        CombatRating::CritSpell => steps.push(S::SpellCrit),
        CombatRating::Lifesteal => steps.push(S::Lifesteal),
        CombatRating::Expertise => steps.extend([S::Expertise(MainHand), S::Expertise(OffHand)]),
        CombatRating::ArmorPenetration => {}
        CombatRating::Mastery => steps.push(S::Mastery),
        CombatRating::VersatilityDamageDone => {
            steps.push(S::Versatility);
            steps.extend_from_slice(ALL_DAMAGE);
        }
        CombatRating::VersatilityHealingDone => steps.push(S::HealingDonePercent),
    }
    steps
}

/// Steps that read an aura type
pub fn aura_steps(aura: AuraType) -> Vec<RecalcStep> {
    match aura {
        AuraType::ModDodgePercent => vec![S::Dodge],
        AuraType::ModParryPercent => vec![S::Parry],
        AuraType::ModBlockPercent => vec![S::Block],
        AuraType::ModCritPct => {
            let mut steps = ALL_CRIT.to_vec();
            steps.push(S::SpellCrit);
            steps
        }
        AuraType::ModSpellCritChance => vec![S::SpellCrit],
        AuraType::ModHitChance => vec![S::HitChance(HitKind::Melee), S::HitChance(HitKind::Ranged)],
        AuraType::ModSpellHitChance => vec![S::HitChance(HitKind::Spell)],
        AuraType::ModExpertise => vec![S::Expertise(MainHand), S::Expertise(OffHand)],
        AuraType::Mastery => vec![S::Mastery],
        AuraType::ModVersatility => {
            let mut steps = ALL_DAMAGE.to_vec();
            steps.extend([S::Versatility, S::HealingDonePercent]);
            steps
        }
        AuraType::ModLeech => vec![S::Lifesteal],
        AuraType::ModHealingDonePercent => vec![S::HealingDonePercent],
        AuraType::ModDamagePercentDone => ALL_DAMAGE.to_vec(),
        AuraType::ModDamageDone
        | AuraType::ModHealingDone
        | AuraType::ModSpellDamageOfAttackPower
        | AuraType::ModSpellHealingOfAttackPower => vec![S::SpellDamageAndHealing],
        AuraType::OverrideAttackPowerBySpellPowerPct => vec![
            S::MeleeAttackPower,
            S::RangedAttackPower,
            S::SpellDamageAndHealing,
        ],
        AuraType::OverrideSpellPowerByAttackPowerPct => {
            vec![S::MeleeAttackPower, S::SpellDamageAndHealing]
        }
        AuraType::ModResistanceOfStatPercent => vec![S::Armor],
        AuraType::ModAttackPowerOfArmor => vec![S::MeleeAttackPower],
        AuraType::ModPowerRegen | AuraType::ModPowerRegenPercent | AuraType::ModManaRegenPct => {
            vec![S::ManaRegen]
        }
        AuraType::ModRatingFromStat => vec![S::Ratings],
    }
}

/// Step that publishes an attribute
pub fn unit_mod_step(unit_mod: UnitMod) -> RecalcStep {
    match unit_mod {
        UnitMod::Stat(stat) => S::Stat(stat),
        UnitMod::Health => S::MaxHealth,
        UnitMod::Power(power) => S::MaxPower(power),
        UnitMod::Armor | UnitMod::Resistance(SpellSchool::Normal) => S::Armor,
        UnitMod::Resistance(school) => S::Resistance(school),
        UnitMod::AttackPower => S::MeleeAttackPower,
        UnitMod::AttackPowerRanged => S::RangedAttackPower,
        UnitMod::Damage(attack) => S::Damage(attack),
    }
}

/// Steps a dependent re-runs after its owner ran `owner_step`
pub fn dependent_steps_for_owner(owner_step: RecalcStep) -> &'static [RecalcStep] {
    match owner_step {
        S::Armor => &[S::Armor],
        S::MaxHealth => &[S::MaxHealth],
        S::MeleeAttackPower | S::RangedAttackPower => &[S::MeleeAttackPower],
        S::SpellDamageAndHealing => &[S::MeleeAttackPower, S::Damage(MainHand), S::SpellDamageAndHealing],
        S::Resistance(SpellSchool::Holy) => &[S::Resistance(SpellSchool::Holy)],
        S::Resistance(SpellSchool::Fire) => &[S::Resistance(SpellSchool::Fire)],
        S::Resistance(SpellSchool::Nature) => &[S::Resistance(SpellSchool::Nature)],
        S::Resistance(SpellSchool::Frost) => &[S::Resistance(SpellSchool::Frost)],
        S::Resistance(SpellSchool::Shadow) => &[S::Resistance(SpellSchool::Shadow)],
        S::Resistance(SpellSchool::Arcane) => &[S::Resistance(SpellSchool::Arcane)],
        _ => &[],
    }
}

/// Steps run by one cascade, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    pub steps: Vec<RecalcStep>,
    /// Seeded with every step
    pub full_pass: bool,
    /// Steps dropped by the re-entry guard
    pub dropped: Vec<RecalcStep>,
}

impl CascadeReport {
    pub fn ran(&self, step: RecalcStep) -> bool {
        self.steps.contains(&step)
    }
}

/// Worklist of one cascade
///
/// Pending steps pop in schedule order. A step that already ran may be
/// scheduled once more (a backward edge such as spell power feeding
/// attack power); a second re-entry is dropped.
#[derive(Debug, Default)]
pub struct Schedule {
    pending: BTreeSet<RecalcStep>,
    runs: BTreeMap<RecalcStep, u8>,
    report: CascadeReport,
}

const MAX_RUNS_PER_STEP: u8 = 2;

impl Schedule {
    pub fn new(seeds: impl IntoIterator<Item = RecalcStep>) -> Self {
        let mut schedule = Schedule::default();
        schedule.extend(seeds);
        schedule
    }

    pub fn full_pass() -> Self {
        let mut schedule = Schedule::new(FULL_PASS.iter().copied());
        schedule.report.full_pass = true;
        schedule
    }

    pub fn extend(&mut self, steps: impl IntoIterator<Item = RecalcStep>) {
        for step in steps {
            let runs = self.runs.get(&step).copied().unwrap_or(0);
            if runs >= MAX_RUNS_PER_STEP {
                tracing::warn!(?step, "step re-entered twice in one cascade, dropped");
                self.report.dropped.push(step);
                continue;
            }
            self.pending.insert(step);
        }
    }

    /// Earliest pending step, recorded as run
    pub fn next_step(&mut self) -> Option<RecalcStep> {
        let step = self.pending.pop_first()?;
        *self.runs.entry(step).or_insert(0) += 1;
        self.report.steps.push(step);
        Some(step)
    }

    pub fn finish(self) -> CascadeReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pass_is_sorted() {
        let mut sorted = FULL_PASS.to_vec();
        sorted.sort();
        assert_eq!(sorted, FULL_PASS.to_vec());
    }

    #[test]
    fn test_full_pass_order_constraints() {
        let pos = |step: RecalcStep| FULL_PASS.iter().position(|s| *s == step).unwrap();
        assert!(pos(S::Stat(Stat::Intellect)) < pos(S::Armor));
        assert!(pos(S::Armor) < pos(S::MeleeAttackPower));
        assert!(pos(S::MeleeAttackPower) < pos(S::Damage(MainHand)));
        assert!(pos(S::RangedAttackPower) < pos(S::Damage(Ranged)));
        assert!(pos(S::Damage(Ranged)) < pos(S::MaxHealth));
        assert!(pos(S::Ratings) < pos(S::Crit(MainHand)));
        assert!(pos(S::Dodge) < pos(S::SpellDamageAndHealing));
        assert!(pos(S::ManaRegen) < pos(S::Resistance(SpellSchool::Holy)));
    }

    #[test]
    fn test_schedule_pops_in_order() {
        let mut schedule = Schedule::new([S::Damage(MainHand), S::Stat(Stat::Strength)]);
        assert_eq!(schedule.next_step(), Some(S::Stat(Stat::Strength)));
        schedule.extend([S::MeleeAttackPower]);
        assert_eq!(schedule.next_step(), Some(S::MeleeAttackPower));
        assert_eq!(schedule.next_step(), Some(S::Damage(MainHand)));
        assert_eq!(schedule.next_step(), None);
    }

    #[test]
    fn test_duplicate_seeds_run_once() {
        let mut schedule = Schedule::new([S::Armor, S::Armor]);
        schedule.extend([S::Armor]);
        assert_eq!(schedule.next_step(), Some(S::Armor));
        assert_eq!(schedule.next_step(), None);
    }

    #[test]
    fn test_reentry_guard() {
        let mut schedule = Schedule::new([S::MeleeAttackPower]);
        let mut runs = 0;
        while let Some(step) = schedule.next_step() {
            runs += 1;
            // Two steps feeding each other forever
            match step {
                S::MeleeAttackPower => schedule.extend([S::SpellDamageAndHealing]),
                S::SpellDamageAndHealing => schedule.extend([S::MeleeAttackPower]),
                _ => {}
            }
        }
        let report = schedule.finish();
        assert_eq!(runs, 4);
        assert_eq!(report.dropped, vec![S::MeleeAttackPower]);
    }

    #[test]
    fn test_versatility_rating_touches_all_damage() {
        let steps = rating_steps(CombatRating::VersatilityDamageDone);
        for step in ALL_DAMAGE {
            assert!(steps.contains(step));
        }
    }

    #[test]
    fn test_unit_mod_steps() {
        assert_eq!(unit_mod_step(UnitMod::Resistance(SpellSchool::Normal)), S::Armor);
        assert_eq!(unit_mod_step(UnitMod::AttackPowerRanged), S::RangedAttackPower);
        assert_eq!(unit_mod_step(UnitMod::Health), S::MaxHealth);
    }

    #[test]
    fn test_owner_step_mapping() {
        assert_eq!(dependent_steps_for_owner(S::RangedAttackPower), &[S::MeleeAttackPower]);
        assert!(dependent_steps_for_owner(S::Dodge).is_empty());
    }
}
