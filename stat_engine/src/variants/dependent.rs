//! Dependent actor - owned summons and pets
//!
//! Base values are fractions of the owner's last published fields. The
//! owner is only ever seen through an [`OwnerSnapshot`]; nothing here can
//! call back into the owner.

use crate::aura::AuraType;
use crate::cascade::{dependent_stat_steps, CascadeReport, RecalcStep};
use crate::config::{OwnerApSource, PetInfo, StatTables};
use crate::host::{
    ArmorValue, AttackPowerValue, AttributeHost, Recalculate, ResistanceValue,
};
use crate::modifier::{add_pct, calculate_pct, ModifierSlot, ModifierTable, UnitMod};
use crate::publish::{OwnerSnapshot, UnitField};
use crate::types::{
    DamageRange, EntityKind, PetSpeciesId, Power, SpellSchool, Stat, WeaponAttackType,
};
use crate::unit::UnitStats;
use std::sync::Arc;

/// Fixed swing factor of dependent damage
const DEPENDENT_ATTACK_SPEED: f64 = 2.0;

#[derive(Debug)]
pub struct DependentActor {
    core: UnitStats,
    info: PetInfo,
    owner: OwnerSnapshot,
}

impl DependentActor {
    /// Spawn from a species row and the owner's current fields
    pub fn new(
        id: impl Into<String>,
        species: &PetSpeciesId,
        level: u8,
        tables: Arc<StatTables>,
        owner: OwnerSnapshot,
    ) -> Self {
        let info = tables.pet(species);
        if info.pct_of_owner_armor <= 0.0 {
            tracing::warn!(%species, "species inherits no owner armor");
        }
        let mut mods = UnitMod::common();
        if let Some(power) = info.power {
            mods.push(UnitMod::Power(power));
        }
        let core = UnitStats::new(id, level, tables, ModifierTable::new(mods));
        let mut actor = DependentActor { core, info, owner };
        actor.rebase();
        actor.update_all_stats();
        actor
    }

    pub fn info(&self) -> &PetInfo {
        &self.info
    }

    pub fn species(&self) -> &PetSpeciesId {
        &self.info.species
    }

    pub fn owner(&self) -> &OwnerSnapshot {
        &self.owner
    }

    /// Take a fresh owner snapshot and re-run the steps that read it
    pub fn sync_owner(
        &mut self,
        owner: OwnerSnapshot,
        steps: impl IntoIterator<Item = RecalcStep>,
    ) -> CascadeReport {
        self.owner = owner;
        self.run_cascade(steps)
    }

    /// Owner-derived bonus attack power and bonus damage
    fn owner_bonus(&self) -> (f64, Option<f64>) {
        match &self.info.owner_attack_power {
            OwnerApSource::None => (0.0, None),
            OwnerApSource::Melee { ap, bonus_damage } => {
                let total = self.owner.total_attack_power(false);
                (total * ap, Some((total * bonus_damage).trunc()))
            }
            OwnerApSource::Ranged { ap, bonus_damage } => {
                let total = self.owner.total_attack_power(true);
                (total * ap, Some((total * bonus_damage).trunc()))
            }
            OwnerApSource::SpellSchools {
                schools,
                ap,
                bonus_damage,
            } => {
                let best = schools
                    .iter()
                    .map(|school| self.owner.school_damage_bonus(*school).trunc())
                    .fold(0.0, f64::max);
                (best * ap, Some((best * bonus_damage).trunc()))
            }
        }
    }

    fn bonus_weapon_damage(&self) -> f64 {
        match self.info.spell_damage_bonus {
            Some(bonus) => {
                let spell_damage = self.owner.school_damage_bonus(bonus.school).trunc();
                if spell_damage > 0.0 {
                    spell_damage * bonus.coefficient
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}

impl AttributeHost for DependentActor {
    fn core(&self) -> &UnitStats {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitStats {
        &mut self.core
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Dependent
    }

    fn stat_dependents(&self, stat: Stat) -> &'static [RecalcStep] {
        dependent_stat_steps(stat)
    }

    fn rebase(&mut self) {
        for stat in Stat::all() {
            self.core.set_create_stat(*stat, self.info.stats.get(*stat));
        }
        if let Some(power) = self.info.power {
            self.core.set_create_power(power, self.info.base_power);
        }
    }

    fn armor(&self) -> Option<ArmorValue> {
        let set = self.core.modifiers.get(UnitMod::Armor)?;
        // A 0% row gets none of the owner's armor; warned about at spawn
        let from_owner = calculate_pct(
            self.owner.get(UnitField::Armor),
            self.info.pct_of_owner_armor,
        );
        let value = set
            .value_with_base(set.get(ModifierSlot::BaseFlat) + from_owner)
            .trunc();
        // Published as all base, no bonus
        Some(ArmorValue {
            base: value,
            total: value,
        })
    }

    fn max_health(&self) -> Option<f64> {
        let set = self.core.modifiers.get(UnitMod::Health)?;
        let from_owner = calculate_pct(
            self.owner.get(UnitField::MaxHealth),
            self.info.pct_of_owner_health,
        );
        let value = set.value_with_base(set.get(ModifierSlot::BaseFlat) + from_owner);
        Some(value.max(0.0).trunc())
    }

    fn max_power(&self, power: Power) -> Option<f64> {
        if self.info.power != Some(power) {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::Power(power))?;
        let value =
            set.value_with_base(set.get(ModifierSlot::BaseFlat) + self.core.create_power(power));
        Some(value.max(0.0).trunc())
    }

    fn attack_power(&self, ranged: bool) -> Option<AttackPowerValue> {
        if ranged {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::AttackPower)?;
        let own = self.core.stat(Stat::Strength) * self.info.attack_power_per_strength
            + self.info.attack_power_offset;
        let (bonus_ap, bonus_damage) = self.owner_bonus();
        // Stored BaseFlat adds to the computed base (DESIGN.md decision 11)
        let base = (set.get(ModifierSlot::BaseFlat) + own + bonus_ap)
            * set.get(ModifierSlot::BasePercent);
        Some(AttackPowerValue {
            base: base.trunc(),
            mod_pos: set.get(ModifierSlot::TotalFlat).trunc(),
            multiplier: set.get(ModifierSlot::TotalPercent) - 1.0,
            bonus_damage,
        })
    }

    fn damage_range(&self, attack: WeaponAttackType) -> Option<DamageRange> {
        if attack != WeaponAttackType::MainHand {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::Damage(attack))?;
        let base = set.get(ModifierSlot::BaseFlat)
            + self.core.published().total_attack_power(false) / 3.5 * DEPENDENT_ATTACK_SPEED
            + self.bonus_weapon_damage();
        let mut value = set.value_with_base(base);
        for effect in self.core.auras.of_type(AuraType::ModDamagePercentDone) {
            if SpellSchool::Normal.in_mask(effect.misc_value) {
                value = add_pct(value, effect.amount as f64);
            }
        }
        Some(DamageRange::new(value, value))
    }

    fn resistance(&self, school: SpellSchool) -> Option<ResistanceValue> {
        if school == SpellSchool::Normal {
            return None;
        }
        let set = self.core.modifiers.get(UnitMod::Resistance(school))?;
        let base = set.get(ModifierSlot::BaseFlat);
        let bonus = set.value() - base;
        let pct = self.info.pct_of_owner_resistance;
        Some(ResistanceValue {
            base: (base + calculate_pct(self.owner.get(UnitField::Resistance(school)), pct))
                .trunc(),
            bonus: (bonus
                + calculate_pct(self.owner.get(UnitField::BonusResistance(school)), pct))
            .trunc(),
        })
    }

    fn mirrored_spell_power(&self) -> Option<f64> {
        if !self.info.inherits_spell_power {
            return None;
        }
        let best = SpellSchool::magic()
            .iter()
            .map(|school| {
                self.owner.get(UnitField::DamageDonePos(*school))
                    + self.owner.get(UnitField::DamageDoneNeg(*school))
            })
            .fold(0.0, f64::max);
        Some(best.trunc())
    }
}
