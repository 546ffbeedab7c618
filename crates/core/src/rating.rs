// crates/core/src/rating.rs
//! Pure math for a player's derived performance figures.
//!
//! Both functions are total and deterministic: bad or missing data
//! degrades to 0.0, never to an error. Dashboards recompute these on
//! every read, so identical inputs must always produce identical
//! output.

use crate::types::{AttributeSnapshot, PerformanceEntry};

// Weight constants for the overall rating. Fields outside this table
// (overall, trainingPoints) carry no weight.
const W_SHOOTING: f64 = 0.15;
const W_PACE: f64 = 0.15;
const W_POSITIONING: f64 = 0.15;
const W_PASSING: f64 = 0.15;
const W_BALL_CONTROL: f64 = 0.15;
const W_CROSSING: f64 = 0.15;
const W_SESSION_RATING: f64 = 0.10;

/// Weighted overall rating from the current attributes blended with the
/// most recent history snapshot.
///
/// When history is non-empty and its last entry carries attributes,
/// every field present in *both* snapshots becomes the mean of the two;
/// fields present on one side only keep the current value. The weighted
/// sum is divided by the summed weights of the fields actually present,
/// so missing fields never drag the score toward zero. One decimal.
pub fn overall_rating(attributes: &AttributeSnapshot, history: &[PerformanceEntry]) -> f64 {
    let blended = match history.last().and_then(|entry| entry.attributes.as_ref()) {
        Some(prior) => blend(attributes, prior),
        None => *attributes,
    };

    let fields = [
        (blended.shooting, W_SHOOTING),
        (blended.pace, W_PACE),
        (blended.positioning, W_POSITIONING),
        (blended.passing, W_PASSING),
        (blended.ball_control, W_BALL_CONTROL),
        (blended.crossing, W_CROSSING),
        (blended.session_rating, W_SESSION_RATING),
    ];

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (value, weight) in fields {
        if let Some(v) = value {
            weighted_sum += v * weight;
            weight_total += weight;
        }
    }

    if weight_total == 0.0 {
        return 0.0;
    }
    round1(weighted_sum / weight_total)
}

/// Mean of the usable ratings across a player's history. 0.0 when no
/// entry exposes one. One decimal.
pub fn average_performance(history: &[PerformanceEntry]) -> f64 {
    let ratings: Vec<f64> = history.iter().filter_map(usable_rating).collect();
    if ratings.is_empty() {
        return 0.0;
    }
    round1(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

/// Resolve the rating an entry exposes, across the shapes history has
/// accumulated: `sessionRating` on the entry, bare `rating` on the
/// entry, or `sessionRating` nested in the attribute snapshot.
pub fn usable_rating(entry: &PerformanceEntry) -> Option<f64> {
    entry
        .session_rating
        .or(entry.rating)
        .or_else(|| entry.attributes.as_ref().and_then(|a| a.session_rating))
}

/// Per-field blend: mean where both sides are present, otherwise the
/// current side (including "still absent").
fn blend(current: &AttributeSnapshot, prior: &AttributeSnapshot) -> AttributeSnapshot {
    AttributeSnapshot {
        shooting: blend_field(current.shooting, prior.shooting),
        pace: blend_field(current.pace, prior.pace),
        positioning: blend_field(current.positioning, prior.positioning),
        passing: blend_field(current.passing, prior.passing),
        ball_control: blend_field(current.ball_control, prior.ball_control),
        crossing: blend_field(current.crossing, prior.crossing),
        session_rating: blend_field(current.session_rating, prior.session_rating),
        overall: blend_field(current.overall, prior.overall),
        training_points: blend_field(current.training_points, prior.training_points),
    }
}

fn blend_field(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    match (current, prior) {
        (Some(c), Some(p)) => Some((c + p) / 2.0),
        (current, _) => current,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
