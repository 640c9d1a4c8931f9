//! stat_engine - Derived combat attribute recalculation for game entities
//!
//! This library provides:
//! - ModifierTable: four-slot accumulators per modifiable attribute
//! - AuraEffects / RatingTable: aura totals and combat ratings
//! - Recalculate: cascade driver that recomputes exactly the affected attributes
//! - IndependentActor / DependentActor / AutonomousActor: the three entity kinds
//! - FieldPublisher: observable sink for published attribute values

pub mod aura;
pub mod cascade;
pub mod config;
pub mod diminishing;
pub mod host;
pub mod modifier;
pub mod prelude;
pub mod publish;
pub mod rating;
pub mod types;
pub mod unit;
pub mod variants;

// Re-export core types for convenience
pub use aura::{AuraEffect, AuraEffects, AuraType};
pub use cascade::{CascadeReport, RecalcStep, FULL_PASS};
pub use config::{ConfigError, StatTables};
pub use diminishing::diminishing_returns;
pub use host::{AttributeHost, Recalculate};
pub use modifier::{apply_modifier, ModifierDelta, ModifierSlot, ModifierTable, UnitMod};
pub use publish::{FieldPublisher, OwnerSnapshot, PublishedFields, RecordingPublisher, UnitField};
pub use types::{
    ClassId, CombatRating, CreatureId, DamageRange, EntityKind, FormId, HitKind, PetSpeciesId,
    Power, SpellSchool, Stat, WeaponAttackType,
};
pub use unit::{UnitStats, Weapon};
pub use variants::{AutonomousActor, DependentActor, IndependentActor};
