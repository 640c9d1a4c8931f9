//! Modifier accumulation - four slots per attribute and the signed-delta primitive

mod delta;
mod slot;
mod table;

pub use delta::{add_pct, apply_modifier, calculate_pct, ModifierDelta};
pub use slot::{ModifierSet, ModifierSlot, PercentAccumulator};
pub use table::{ModifierTable, UnitMod};
