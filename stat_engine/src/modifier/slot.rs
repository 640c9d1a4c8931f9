//! ModifierSet - The four-slot accumulator behind every attribute

use super::delta::apply_modifier;
use serde::{Deserialize, Serialize};

/// One of the four composable contributions to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSlot {
    BaseFlat,
    BasePercent,
    TotalFlat,
    TotalPercent,
}

impl ModifierSlot {
    pub fn is_percent(self) -> bool {
        matches!(self, ModifierSlot::BasePercent | ModifierSlot::TotalPercent)
    }
}

/// Multiplicative percentage accumulator
///
/// Each contribution multiplies the factor by `(100 + pct) / 100`.
/// Contributions at or below -100% would zero the factor for good, so
/// they are counted separately and force the value to 0 while present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentAccumulator {
    factor: f64,
    zeroed: u32,
}

impl Default for PercentAccumulator {
    fn default() -> Self {
        PercentAccumulator {
            factor: 1.0,
            zeroed: 0,
        }
    }
}

impl PercentAccumulator {
    pub fn apply(&mut self, pct: f64, apply: bool) {
        if pct <= -100.0 {
            if apply {
                self.zeroed += 1;
            } else {
                self.zeroed = self.zeroed.saturating_sub(1);
            }
            return;
        }

        let multiplier = (100.0 + pct) / 100.0;
        if apply {
            self.factor *= multiplier;
        } else {
            self.factor /= multiplier;
        }
    }

    pub fn value(&self) -> f64 {
        if self.zeroed > 0 {
            0.0
        } else {
            self.factor
        }
    }
}

/// Four accumulator slots of one attribute
///
/// Final value is calculated as:
/// `(base_flat × base_percent + total_flat) × total_percent`
///
/// - `base_flat`: base capacity, never driven below zero
/// - `base_percent`: multiplier on the base capacity
/// - `total_flat`: signed flat bonus added after the base multiplier
/// - `total_percent`: multiplier on everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierSet {
    base_flat: f64,
    base_percent: PercentAccumulator,
    total_flat: f64,
    total_percent: PercentAccumulator,
}

impl ModifierSet {
    /// Create a set with the given base capacity
    pub fn with_base(base_flat: f64) -> Self {
        ModifierSet {
            base_flat: base_flat.max(0.0),
            ..Default::default()
        }
    }

    /// Current value of one slot
    pub fn get(&self, slot: ModifierSlot) -> f64 {
        match slot {
            ModifierSlot::BaseFlat => self.base_flat,
            ModifierSlot::BasePercent => self.base_percent.value(),
            ModifierSlot::TotalFlat => self.total_flat,
            ModifierSlot::TotalPercent => self.total_percent.value(),
        }
    }

    /// Add or remove one contribution. Returns the effective direction.
    pub fn apply(&mut self, slot: ModifierSlot, amount: f64, apply: bool) -> bool {
        match slot {
            ModifierSlot::BaseFlat => {
                let delta = apply_modifier(apply, self.base_flat, amount);
                self.base_flat = delta.value;
                delta.apply
            }
            ModifierSlot::TotalFlat => {
                self.total_flat += if apply { amount } else { -amount };
                apply
            }
            ModifierSlot::BasePercent => {
                self.base_percent.apply(amount, apply);
                apply
            }
            ModifierSlot::TotalPercent => {
                self.total_percent.apply(amount, apply);
                apply
            }
        }
    }

    /// Final value from the stored slots
    pub fn value(&self) -> f64 {
        self.value_with_base(self.base_flat)
    }

    /// Final value with `base_flat` substituted for the stored base
    pub fn value_with_base(&self, base_flat: f64) -> f64 {
        (base_flat * self.base_percent.value() + self.total_flat) * self.total_percent.value()
    }
}
