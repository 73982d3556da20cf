//! Response evaluation for exponents and piecewise-linear curves.
//!
//! These functions are the single source of truth for what output a curve
//! produces: previews, exports and tests all call them.

use crate::models::{CurveMode, Point, SettingsRecord, IDENTITY_EXPONENT};

/// Evaluates a power curve: `input ^ exponent`.
///
/// The caller clamps `input` to `[0, 1]` and rejects non-positive or
/// non-finite exponents. An exponent of exactly 1 returns `input` unchanged.
///
/// ```
/// use joymapper::services::curve_math::evaluate_exponent;
///
/// assert_eq!(evaluate_exponent(0.5, 1.0), 0.5);
/// assert_eq!(evaluate_exponent(0.5, 2.0), 0.25);
/// ```
#[must_use]
pub fn evaluate_exponent(input: f64, exponent: f64) -> f64 {
    if exponent == IDENTITY_EXPONENT {
        return input;
    }
    input.powf(exponent)
}

/// Evaluates a piecewise-linear curve at `input`.
///
/// Points are sorted by input first, so authoring order does not matter.
/// Below the first point the output scales linearly from the origin; past
/// the last point it extrapolates linearly toward `(1, 1)`. An empty point
/// list is the identity.
///
/// ```
/// use joymapper::models::Point;
/// use joymapper::services::curve_math::evaluate_piecewise;
///
/// let points = [Point::new(0.2, 0.05), Point::new(0.8, 0.65)];
/// assert!((evaluate_piecewise(0.5, &points) - 0.35).abs() < 1e-12);
/// ```
#[must_use]
pub fn evaluate_piecewise(input: f64, points: &[Point]) -> f64 {
    if points.is_empty() {
        return input;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.input.total_cmp(&b.input));

    let first = sorted[0];
    if input <= first.input {
        if first.input == 0.0 {
            return first.output;
        }
        return first.output * (input / first.input);
    }

    let last = sorted[sorted.len() - 1];
    if input >= last.input {
        if last.input == 1.0 {
            return last.output;
        }
        return last.output + (input - last.input) / (1.0 - last.input) * (1.0 - last.output);
    }

    // first.input < input < last.input, so a bracketing pair exists
    let upper_index = sorted
        .iter()
        .position(|p| p.input >= input)
        .unwrap_or(sorted.len() - 1);
    let lower = sorted[upper_index.saturating_sub(1)];
    let upper = sorted[upper_index];

    if upper.input == input {
        return upper.output;
    }
    if lower.input == upper.input {
        return lower.output;
    }

    let t = (input - lower.input) / (upper.input - lower.input);
    lower.output + t * (upper.output - lower.output)
}

/// Evaluates a record's active response representation at `input`.
///
/// Curve mode with at least one point uses the curve; exponent mode uses
/// the stored exponent. Anything else is linear.
#[must_use]
pub fn evaluate_response(input: f64, record: &SettingsRecord) -> f64 {
    match record.curve_mode {
        Some(CurveMode::Curve) => match record.curve.as_ref() {
            Some(curve) if curve.has_points() => evaluate_piecewise(input, &curve.points),
            _ => input,
        },
        Some(CurveMode::Exponent) => {
            evaluate_exponent(input, record.exponent.unwrap_or(IDENTITY_EXPONENT))
        }
        None => input,
    }
}

/// Applies a response to a signed axis value in `[-1, 1]`.
///
/// The curve is evaluated on the magnitude and the sign is restored, then
/// flipped when `invert` is set.
#[must_use]
pub fn apply_axis(value: f64, record: &SettingsRecord, invert: bool) -> f64 {
    let magnitude = value.abs().clamp(0.0, 1.0);
    let shaped = evaluate_response(magnitude, record).copysign(value);
    if invert {
        -shaped
    } else {
        shaped
    }
}

/// Samples a curve at `steps + 1` evenly spaced inputs from 0 to 1.
///
/// Used for previews; `steps` of 0 is treated as 1.
#[must_use]
pub fn sample_curve(points: &[Point], steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let input = i as f64 / steps as f64;
            Point::new(input, evaluate_piecewise(input, points))
        })
        .collect()
}

/// Samples a power curve the same way as [`sample_curve`].
#[must_use]
pub fn sample_exponent(exponent: f64, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let input = i as f64 / steps as f64;
            Point::new(input, evaluate_exponent(input, exponent))
        })
        .collect()
}
