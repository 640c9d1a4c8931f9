//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_engine::prelude::*;
//! ```

// Entities
pub use crate::variants::{AutonomousActor, DependentActor, IndependentActor};
pub use crate::host::{AttributeHost, Recalculate};
pub use crate::unit::Weapon;

// Inputs
pub use crate::aura::{AuraEffect, AuraType};
pub use crate::modifier::{ModifierSlot, UnitMod};

// Outputs
pub use crate::cascade::{CascadeReport, RecalcStep};
pub use crate::publish::{FieldPublisher, PublishedFields, RecordingPublisher, UnitField};

// Config
pub use crate::config::StatTables;

pub use crate::types::{
    ClassId, CombatRating, CreatureId, FormId, PetSpeciesId, Power, SpellSchool, Stat,
    WeaponAttackType,
};
