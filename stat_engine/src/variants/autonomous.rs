//! Autonomous actor - creature driven by a static species template

use crate::aura::AuraType;
use crate::cascade::RecalcStep;
use crate::config::{CreatureTemplate, StatTables};
use crate::host::{
    ArmorValue, AttackPowerValue, AttributeHost, Recalculate, ResistanceValue,
};
use crate::modifier::{ModifierSlot, ModifierTable, UnitMod};
use crate::types::{
    CreatureId, DamageRange, EntityKind, HitKind, Power, SpellSchool, Stat, WeaponAttackType,
};
use crate::unit::{UnitStats, Weapon};
use std::sync::Arc;

#[derive(Debug)]
pub struct AutonomousActor {
    core: UnitStats,
    template: CreatureTemplate,
}

impl AutonomousActor {
    pub fn new(id: impl Into<String>, creature: &CreatureId, level: u8, tables: Arc<StatTables>) -> Self {
        let template = tables.creature(creature);
        let pools = usable_pools(&template);
        let mut mods = UnitMod::common();
        mods.extend(pools.iter().map(|power| UnitMod::Power(*power)));

        let mut core = UnitStats::new(id, level, tables, ModifierTable::new(mods));
        let seeds = [
            (UnitMod::Health, template.base_health),
            (UnitMod::Armor, template.base_armor),
            (UnitMod::AttackPower, template.base_attack_power),
            (UnitMod::AttackPowerRanged, template.base_ranged_attack_power),
            (UnitMod::Power(template.power), template.base_power),
        ];
        for (unit_mod, value) in seeds {
            core.modifiers.apply(unit_mod, ModifierSlot::BaseFlat, value, true);
        }

        core.set_weapon(
            WeaponAttackType::MainHand,
            Some(Weapon {
                damage: template.main_hand,
                attack_time_ms: template.attack_time_ms,
            }),
        );
        if let Some(damage) = template.off_hand {
            core.set_weapon(
                WeaponAttackType::OffHand,
                Some(Weapon {
                    damage,
                    attack_time_ms: template.attack_time_ms,
                }),
            );
        }
        if let Some(damage) = template.ranged {
            core.set_weapon(
                WeaponAttackType::Ranged,
                Some(Weapon {
                    damage,
                    attack_time_ms: template.ranged_attack_time_ms,
                }),
            );
        }

        let mut actor = AutonomousActor { core, template };
        actor.update_all_stats();
        actor
    }

    pub fn template(&self) -> &CreatureTemplate {
        &self.template
    }
}

/// Primary pool plus the alternate and combo pools
fn usable_pools(template: &CreatureTemplate) -> Vec<Power> {
    let mut pools = vec![template.power];
    for extra in [Power::AlternatePower, Power::ComboPoints] {
        if !pools.contains(&extra) {
            pools.push(extra);
        }
    }
    pools
}

impl AttributeHost for AutonomousActor {
    fn core(&self) -> &UnitStats {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitStats {
        &mut self.core
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Autonomous
    }

    fn stat_dependents(&self, _stat: Stat) -> &'static [RecalcStep] {
        &[]
    }

    fn armor(&self) -> Option<ArmorValue> {
        let set = self.core.modifiers.get(UnitMod::Armor)?;
        Some(ArmorValue {
            base: set.get(ModifierSlot::BaseFlat).trunc(),
            total: set.value().max(0.0).trunc(),
        })
    }

    fn max_health(&self) -> Option<f64> {
        let value = self.core.modifiers.value(UnitMod::Health)?;
        Some(value.max(0.0).trunc())
    }

    fn max_power(&self, power: Power) -> Option<f64> {
        let value = self.core.modifiers.value(UnitMod::Power(power))?;
        Some(value.max(0.0).round())
    }

    fn attack_power(&self, ranged: bool) -> Option<AttackPowerValue> {
        let unit_mod = if ranged {
            UnitMod::AttackPowerRanged
        } else {
            UnitMod::AttackPower
        };
        let set = self.core.modifiers.get(unit_mod)?;
        Some(AttackPowerValue {
            base: (set.get(ModifierSlot::BaseFlat) * set.get(ModifierSlot::BasePercent)).trunc(),
            mod_pos: set.get(ModifierSlot::TotalFlat).trunc(),
            multiplier: set.get(ModifierSlot::TotalPercent) - 1.0,
            bonus_damage: None,
        })
    }

    fn damage_range(&self, attack: WeaponAttackType) -> Option<DamageRange> {
        let set = self.core.modifiers.get(UnitMod::Damage(attack))?;
        if attack == WeaponAttackType::OffHand && !self.core.has_offhand_weapon() {
            return Some(DamageRange::ZERO);
        }
        let variance = match attack {
            WeaponAttackType::Ranged => self.template.range_variance,
            _ => self.template.base_variance,
        };
        let weapon = if self.core.is_disarmed(attack) {
            DamageRange::ZERO
        } else {
            self.core
                .weapon(attack)
                .map(|w| w.damage)
                .unwrap_or(DamageRange::ZERO)
        };

        let ranged = attack == WeaponAttackType::Ranged;
        let attack_power = self.core.published().total_attack_power(ranged);
        let speed = f64::from(self.core.attack_time_ms(attack)) / 1000.0;
        let base = set.get(ModifierSlot::BaseFlat) + attack_power / 3.5 * variance;
        let base_pct = set.get(ModifierSlot::BasePercent) * speed;
        let compute = |weapon_damage: f64| {
            ((weapon_damage + base) * self.template.mod_damage * base_pct
                + set.get(ModifierSlot::TotalFlat))
                * set.get(ModifierSlot::TotalPercent)
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

    fn crit(&self, _attack: WeaponAttackType) -> Option<f64> {
        Some(self.template.base_crit + self.core.auras.total(AuraType::ModCritPct))
    }

    fn spell_crit(&self) -> Option<f64> {
        let auras = &self.core.auras;
        Some(
            self.template.base_crit
                + auras.total(AuraType::ModSpellCritChance)
                + auras.total(AuraType::ModCritPct),
        )
    }

    fn dodge(&self) -> Option<f64> {
        Some(self.template.base_dodge + self.core.auras.total(AuraType::ModDodgePercent))
    }

    fn hit_chance(&self, kind: HitKind) -> Option<f64> {
        let base = &self.core.tables.engine.base_percentages;
        let auras = &self.core.auras;
        Some(match kind {
            HitKind::Melee => base.melee_hit + auras.total(AuraType::ModHitChance),
            HitKind::Ranged => base.ranged_hit + auras.total(AuraType::ModHitChance),
            HitKind::Spell => base.spell_hit + auras.total(AuraType::ModSpellHitChance),
        })
    }
}
