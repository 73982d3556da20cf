//! Response curve data structures and named presets.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A control point on a response curve.
///
/// Both coordinates are normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Input deflection
    #[serde(rename = "in")]
    pub input: f64,
    /// Output response
    #[serde(rename = "out")]
    pub output: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }
}

/// A custom nonlinear response curve.
///
/// # Invariants
///
/// - When `reset` is true, `points` is empty (the curve behaves linearly)
/// - Points are stored in authoring order; evaluation sorts by `input`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    /// True means "no custom curve"
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
    /// Control points
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Curve {
    /// A reset (linear) curve with no points.
    #[must_use]
    pub fn reset() -> Self {
        Self {
            reset: true,
            points: Vec::new(),
        }
    }

    /// Builds a curve from authored points, rejecting malformed coordinates.
    ///
    /// This is the authoring boundary: evaluation assumes every point has
    /// finite coordinates inside `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use joymapper::models::{Curve, Point};
    ///
    /// let curve = Curve::from_points(vec![Point::new(0.5, 0.25)]).unwrap();
    /// assert_eq!(curve.points.len(), 1);
    /// assert!(Curve::from_points(vec![Point::new(1.5, 0.25)]).is_err());
    /// ```
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        for (index, point) in points.iter().enumerate() {
            for (axis, value) in [("in", point.input), ("out", point.output)] {
                if !value.is_finite() {
                    anyhow::bail!("Curve point {} has a non-numeric '{}' value", index, axis);
                }
                if !(0.0..=1.0).contains(&value) {
                    anyhow::bail!(
                        "Curve point {} has '{}' = {} outside the range 0..1",
                        index,
                        axis,
                        value
                    );
                }
            }
        }

        Ok(Self {
            reset: false,
            points,
        })
    }

    /// Returns true if the curve has at least one control point.
    #[must_use]
    pub fn has_points(&self) -> bool {
        !self.reset && !self.points.is_empty()
    }
}

/// Named curve shapes that replace a curve wholesale when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurvePreset {
    /// Straight line, no points
    Linear,
    /// Gentle reduction near center
    Smooth,
    /// Strong reduction near center, fast ramp at the edge
    Aggressive,
    /// Very fine control for small deflections
    Precision,
    /// Soft center and soft edges
    SCurve,
}

impl CurvePreset {
    /// All presets in menu order.
    pub const ALL: [CurvePreset; 5] = [
        Self::Linear,
        Self::Smooth,
        Self::Aggressive,
        Self::Precision,
        Self::SCurve,
    ];

    /// Preset identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Smooth => "smooth",
            Self::Aggressive => "aggressive",
            Self::Precision => "precision",
            Self::SCurve => "s_curve",
        }
    }

    /// Builds the preset's curve.
    #[must_use]
    pub fn curve(self) -> Curve {
        let points: &[(f64, f64)] = match self {
            Self::Linear => return Curve::reset(),
            Self::Smooth => &[(0.25, 0.15), (0.5, 0.38), (0.75, 0.66)],
            Self::Aggressive => &[(0.3, 0.08), (0.6, 0.3), (0.85, 0.65)],
            Self::Precision => &[(0.2, 0.03), (0.4, 0.12), (0.6, 0.28), (0.8, 0.55)],
            Self::SCurve => &[(0.2, 0.1), (0.5, 0.5), (0.8, 0.9)],
        };

        Curve {
            reset: false,
            points: points.iter().map(|&(i, o)| Point::new(i, o)).collect(),
        }
    }
}

impl fmt::Display for CurvePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurvePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown curve preset '{}'", s))
    }
}
