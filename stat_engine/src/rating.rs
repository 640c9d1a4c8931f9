//! Combat rating amounts

use crate::modifier::apply_modifier;
use crate::types::CombatRating;
use std::collections::BTreeMap;

/// Rating amounts of one entity
///
/// Amounts never go negative: removal is clamped by [`apply_modifier`].
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    amounts: BTreeMap<CombatRating, f64>,
}

impl RatingTable {
    pub fn amount(&self, rating: CombatRating) -> f64 {
        self.amounts.get(&rating).copied().unwrap_or(0.0)
    }

    /// Add or remove rating points. Returns the effective direction.
    pub fn apply(&mut self, rating: CombatRating, amount: i32, apply: bool) -> bool {
        let delta = apply_modifier(apply, self.amount(rating), amount as f64);
        self.amounts.insert(rating, delta.value);
        delta.apply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_clamp() {
        let mut ratings = RatingTable::default();
        assert!(ratings.apply(CombatRating::Dodge, 120, true));
        assert_eq!(ratings.amount(CombatRating::Dodge), 120.0);

        assert!(!ratings.apply(CombatRating::Dodge, 500, false));
        assert_eq!(ratings.amount(CombatRating::Dodge), 0.0);
    }

    #[test]
    fn test_negative_rating_item() {
        let mut ratings = RatingTable::default();
        ratings.apply(CombatRating::Mastery, 50, true);
        // Equipping a -20 mastery item subtracts
        assert!(!ratings.apply(CombatRating::Mastery, -20, true));
        assert_eq!(ratings.amount(CombatRating::Mastery), 30.0);
        // Unequipping it adds the points back
        assert!(ratings.apply(CombatRating::Mastery, -20, false));
        assert_eq!(ratings.amount(CombatRating::Mastery), 50.0);
    }
}
