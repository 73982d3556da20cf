//! Curve command for evaluating response curves.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::{Curve, CurveMode, CurvePreset, Point, SettingsRecord};
use crate::services::curve_math::{apply_axis, sample_curve, sample_exponent};
use clap::Args;

/// Evaluate an exponent or response curve
#[derive(Debug, Clone, Args)]
pub struct CurveArgs {
    /// Power exponent (e.g. 1.5)
    #[arg(long, conflicts_with_all = ["points", "preset"])]
    pub exponent: Option<f64>,

    /// Control points as IN:OUT pairs separated by commas (e.g. "0.2:0.05,0.8:0.65")
    #[arg(long, conflicts_with = "preset")]
    pub points: Option<String>,

    /// Named preset (linear, smooth, aggressive, precision, or s_curve)
    #[arg(long)]
    pub preset: Option<CurvePreset>,

    /// Axis value to evaluate, in [-1, 1] (repeatable)
    #[arg(short, long = "input", value_name = "VALUE", allow_negative_numbers = true)]
    pub inputs: Vec<f64>,

    /// Number of sample steps from 0 to 1 when no inputs are given
    #[arg(long, default_value_t = 10)]
    pub steps: usize,

    /// Invert the axis
    #[arg(long)]
    pub invert: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CurveArgs {
    /// Execute the curve command
    pub fn execute(&self) -> CliResult<()> {
        let record = self.record()?;

        let results: Vec<Point> = if self.inputs.is_empty() {
            let samples = match (record.curve_mode, record.exponent, record.curve.as_ref()) {
                (Some(CurveMode::Exponent), Some(exponent), _) => {
                    sample_exponent(exponent, self.steps)
                }
                (_, _, Some(curve)) => sample_curve(&curve.points, self.steps),
                _ => sample_curve(&[], self.steps),
            };
            samples
                .into_iter()
                .map(|p| Point::new(p.input, if self.invert { -p.output } else { p.output }))
                .collect()
        } else {
            self.inputs
                .iter()
                .map(|&x| {
                    if !x.is_finite() || !(-1.0..=1.0).contains(&x) {
                        return Err(CliError::validation(format!(
                            "Input {x} is outside the axis range [-1, 1]"
                        )));
                    }
                    Ok(Point::new(x, apply_axis(x, &record, self.invert)))
                })
                .collect::<CliResult<_>>()?
        };

        if self.json {
            return print_json(&results);
        }

        for point in &results {
            println!("{:>7.3} -> {:>7.4}", point.input, point.output);
        }
        Ok(())
    }

    fn record(&self) -> CliResult<SettingsRecord> {
        if let Some(exponent) = self.exponent {
            if !exponent.is_finite() || exponent <= 0.0 {
                return Err(CliError::validation(format!(
                    "Exponent must be a positive number, got {exponent}"
                )));
            }
            return Ok(SettingsRecord {
                curve_mode: Some(CurveMode::Exponent),
                exponent: Some(exponent),
                ..Default::default()
            });
        }

        let curve = match (&self.points, self.preset) {
            (Some(text), _) => parse_points(text)?,
            (None, Some(preset)) => preset.curve(),
            (None, None) => Curve::reset(),
        };

        Ok(SettingsRecord {
            curve_mode: Some(CurveMode::Curve),
            curve: Some(curve),
            ..Default::default()
        })
    }
}

/// Parses `IN:OUT` pairs separated by commas into a validated curve.
fn parse_points(text: &str) -> CliResult<Curve> {
    let mut points = Vec::new();
    for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (input, output) = pair
            .split_once(':')
            .ok_or_else(|| CliError::validation(format!("Expected IN:OUT, got '{pair}'")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| CliError::validation(format!("Invalid number '{v}' in '{pair}'")))
        };
        points.push(Point::new(parse(input)?, parse(output)?));
    }

    Curve::from_points(points).map_err(|e| CliError::validation(format!("{e:#}")))
}
