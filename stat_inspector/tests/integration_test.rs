//! Integration test: Spawn owner -> Summon pet -> Mutate -> Roll swings
//!
//! This test walks the same flow the inspector drives from the keyboard.

use rand::rngs::StdRng;
use rand::SeedableRng;
use stat_engine::prelude::*;
use std::sync::Arc;

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

/// Helper to print the fields that matter for a melee swing
fn print_melee(name: &str, actor: &impl AttributeHost) {
    let fields = actor.core().published();
    let range = fields.damage_range(WeaponAttackType::MainHand);
    println!("  {}:", name);
    println!("    Strength:     {}", fields.stat(Stat::Strength));
    println!("    Agility:      {}", fields.stat(Stat::Agility));
    println!("    Attack power: {}", fields.total_attack_power(false));
    println!("    Main hand:    {:.1}-{:.1}", range.min, range.max);
    println!("    Crit:         {:.2}%", fields.get(UnitField::Crit(WeaponAttackType::MainHand)));
}

#[test]
fn test_owner_pet_flow() {
    let tables = Arc::new(StatTables::defaults());

    separator("SPAWN");
    let mut druid = IndependentActor::new("druid", ClassId::Druid, 10, Arc::clone(&tables));
    druid.set_weapon(WeaponAttackType::MainHand, Some(Weapon::new(20.0, 35.0, 2400)));
    druid.summon("wolf", &PetSpeciesId::from("spirit_wolf"));
    print_melee("Druid", &druid);
    print_melee("Wolf", &druid.dependents()[0]);

    let wolf_ap = druid.dependents()[0].core().published().get(UnitField::AttackPower);

    separator("CAT FORM");
    let report = druid.set_form(Some(FormId::from("cat")));
    println!("  Steps run: {:?}", report.steps);
    print_melee("Druid", &druid);
    assert!(report.ran(RecalcStep::Damage(WeaponAttackType::MainHand)));

    separator("STRENGTH +40");
    druid.handle_stat_modifier(UnitMod::Stat(Stat::Strength), ModifierSlot::TotalFlat, 40.0, true);
    print_melee("Druid", &druid);
    print_melee("Wolf", &druid.dependents()[0]);
    let wolf_after = druid.dependents()[0].core().published().get(UnitField::AttackPower);
    assert!(wolf_after > wolf_ap, "pet did not follow owner attack power");

    separator("SWINGS");
    let mut rng = StdRng::seed_from_u64(42);
    let range = druid.core().published().damage_range(WeaponAttackType::MainHand);
    for i in 0..5 {
        let hit = range.roll(&mut rng);
        println!("  Swing {}: {:.1}", i + 1, hit);
        assert!(hit >= range.min && hit <= range.max);
    }

    separator("DISMISS");
    let wolf = druid.dismiss("wolf").unwrap();
    print_melee("Wolf (detached)", &wolf);
    assert!(druid.dependents().is_empty());
}

#[test]
fn test_creature_swings() {
    let tables = Arc::new(StatTables::defaults());
    let ogre = AutonomousActor::new("ogre", &CreatureId::from("ogre_brute"), 12, tables);
    print_melee("Ogre", &ogre);

    let mut rng = StdRng::seed_from_u64(7);
    let range = ogre.core().published().damage_range(WeaponAttackType::MainHand);
    assert!(range.min > 0.0);
    let total: f64 = (0..100).map(|_| range.roll(&mut rng)).sum();
    let average = total / 100.0;
    assert!(average >= range.min && average <= range.max);
}
