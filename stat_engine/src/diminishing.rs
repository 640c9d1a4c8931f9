//! Diminishing returns for capped percentages (dodge, parry)

/// Convert a rating-derived contribution into a capped percentage
///
/// `nondiminishing + diminishing × cap / (diminishing + cap × k)`
///
/// A `cap` of 0 means the class cannot perform the action at all; the
/// result is 0 no matter what the other terms are. A negative diminishing
/// term that zeroes the denominator yields `nondiminishing`.
pub fn diminishing_returns(nondiminishing: f64, diminishing: f64, cap: f64, k: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    if diminishing == 0.0 {
        return nondiminishing;
    }
    let denominator = diminishing + cap * k;
    if denominator == 0.0 {
        return nondiminishing;
    }
    nondiminishing + diminishing * cap / denominator
}

/// Clamp a percentage to an optional server-wide ceiling
pub fn apply_stat_limit(value: f64, limit: Option<f64>) -> f64 {
    match limit {
        Some(limit) => value.min(limit),
        None => value,
    }
}
