//! Signed-delta primitives for accumulators

/// Outcome of [`apply_modifier`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierDelta {
    /// Accumulator value after the change
    pub value: f64,
    /// Magnitude actually used (non-negative, clamped on removal)
    pub amount: f64,
    /// Effective direction: `true` added, `false` subtracted
    pub apply: bool,
}

impl ModifierDelta {
    /// Arguments for `apply_modifier` that undo this change
    pub fn revert(&self) -> (bool, f64, f64) {
        (!self.apply, self.value, self.amount)
    }
}

/// Apply a signed delta to a non-negative accumulator
///
/// A negative `amount` flips the direction, so removing a negative bonus
/// adds to the accumulator. Subtraction never takes more than `current`,
/// the result is never negative.
pub fn apply_modifier(apply: bool, current: f64, amount: f64) -> ModifierDelta {
    let (apply, amount) = if amount < 0.0 {
        (!apply, -amount)
    } else {
        (apply, amount)
    };

    if apply {
        ModifierDelta {
            value: current + amount,
            amount,
            apply,
        }
    } else {
        let amount = amount.min(current.max(0.0));
        ModifierDelta {
            value: current - amount,
            amount,
            apply,
        }
    }
}

/// `value * (1 + pct / 100)`
pub fn add_pct(value: f64, pct: f64) -> f64 {
    value * (100.0 + pct) / 100.0
}

/// `pct` percent of `value`
pub fn calculate_pct(value: f64, pct: f64) -> f64 {
    value * pct / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_adds() {
        let delta = apply_modifier(true, 100.0, 30.0);
        assert_eq!(delta.value, 130.0);
        assert!(delta.apply);
    }

    #[test]
    fn test_sign_flip_equivalence() {
        let negative = apply_modifier(true, 100.0, -30.0);
        let removal = apply_modifier(false, 100.0, 30.0);
        assert_eq!((negative.value, negative.apply), (removal.value, removal.apply));
        assert_eq!(negative.value, 70.0);
        assert!(!negative.apply);
    }

    #[test]
    fn test_removal_clamps_at_zero() {
        let delta = apply_modifier(false, 50.0, 80.0);
        assert_eq!(delta.value, 0.0);
        assert_eq!(delta.amount, 50.0);
    }

    #[test]
    fn test_revert_undoes_clamped_removal() {
        let delta = apply_modifier(false, 50.0, 80.0);
        let (apply, current, amount) = delta.revert();
        assert_eq!(apply_modifier(apply, current, amount).value, 50.0);
    }

    #[test]
    fn test_add_pct() {
        assert!((add_pct(200.0, 10.0) - 220.0).abs() < 1e-9);
        assert!((add_pct(200.0, -100.0)).abs() < 1e-9);
        assert!((calculate_pct(80.0, 40.0) - 32.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_remove_then_add_restores(base in 0.0f64..1e6, amount in 0.0f64..1e6) {
            let removed = apply_modifier(false, base, amount);
            let restored = apply_modifier(true, removed.value, removed.amount);
            prop_assert!((restored.value - base).abs() < 1e-6);
        }

        #[test]
        fn prop_remove_without_clamp_restores(base in 0.0f64..1e6, amount in 0.0f64..1e6) {
            prop_assume!(amount <= base);
            let removed = apply_modifier(false, base, amount);
            let restored = apply_modifier(true, removed.value, amount);
            prop_assert!((restored.value - base).abs() < 1e-6);
        }

        #[test]
        fn prop_never_negative(apply: bool, base in 0.0f64..1e6, amount in -1e6f64..1e6) {
            prop_assert!(apply_modifier(apply, base, amount).value >= 0.0);
        }

        #[test]
        fn prop_sign_flip(apply: bool, base in 0.0f64..1e6, amount in 0.001f64..1e6) {
            let a = apply_modifier(apply, base, -amount);
            let b = apply_modifier(!apply, base, amount);
            prop_assert_eq!(a, b);
        }
    }
}
