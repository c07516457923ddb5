//! Impact-test input table and unit conversion.

use crate::config::HammerConfig;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Acceleration measurement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// `accel_x`
    #[default]
    X,
    /// `accel_y`
    Y,
    /// `accel_z`
    Z,
}

impl Axis {
    /// All axes in column order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Column name used in input tables.
    pub fn column_name(self) -> &'static str {
        match self {
            Axis::X => "accel_x",
            Axis::Y => "accel_y",
            Axis::Z => "accel_z",
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(label)
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" | "accel_x" => Ok(Axis::X),
            "y" | "accel_y" => Ok(Axis::Y),
            "z" | "accel_z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{other}' (expected x, y or z)")),
        }
    }
}

/// A cleaned impact-test table: time, hammer force and up to three
/// acceleration axes, all in the sensor units (force and acceleration in g).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactRecord {
    /// Timestamps in seconds.
    pub time: Vec<f64>,
    /// Hammer force sensor signal (g).
    pub force: Vec<f64>,
    accel: [Option<Vec<f64>>; 3],
}

impl ImpactRecord {
    /// Create a record from time and force columns.
    pub fn new(time: Vec<f64>, force: Vec<f64>) -> Result<Self, AnalysisError> {
        if force.len() != time.len() {
            return Err(AnalysisError::LengthMismatch {
                column: "force".to_string(),
                expected: time.len(),
                actual: force.len(),
            });
        }
        Ok(Self {
            time,
            force,
            accel: [None, None, None],
        })
    }

    /// Build a record sampled uniformly at `sample_rate`, starting at t = 0.
    pub fn uniform(sample_rate: f64, force: Vec<f64>) -> Self {
        let time = (0..force.len()).map(|i| i as f64 / sample_rate).collect();
        Self {
            time,
            force,
            accel: [None, None, None],
        }
    }

    /// Attach an acceleration column.
    pub fn with_axis(mut self, axis: Axis, samples: Vec<f64>) -> Result<Self, AnalysisError> {
        self.set_axis(axis, samples)?;
        Ok(self)
    }

    /// Replace an acceleration column.
    pub fn set_axis(&mut self, axis: Axis, samples: Vec<f64>) -> Result<(), AnalysisError> {
        if samples.len() != self.time.len() {
            return Err(AnalysisError::LengthMismatch {
                column: axis.column_name().to_string(),
                expected: self.time.len(),
                actual: samples.len(),
            });
        }
        self.accel[axis.index()] = Some(samples);
        Ok(())
    }

    /// Acceleration column for `axis`, if present.
    pub fn axis(&self, axis: Axis) -> Option<&[f64]> {
        self.accel[axis.index()].as_deref()
    }

    /// Axes present in the record.
    pub fn axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|a| self.accel[a.index()].is_some())
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the record has no rows.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Keep only the rows whose index is in `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        let pick = |v: &Vec<f64>| v[range.clone()].to_vec();
        Self {
            time: pick(&self.time),
            force: pick(&self.force),
            accel: [
                self.accel[0].as_ref().map(pick),
                self.accel[1].as_ref().map(pick),
                self.accel[2].as_ref().map(pick),
            ],
        }
    }
}

/// Validate a hammer mass, returning the mass to use and a message.
///
/// Missing, non-positive or non-finite masses fall back to the default;
/// out-of-range masses are clamped to the configured limits.
pub fn validate_hammer_mass(mass: Option<f64>, config: &HammerConfig) -> (f64, String) {
    match mass {
        None => (
            config.default_mass,
            format!(
                "hammer mass not specified, using {} kg",
                config.default_mass
            ),
        ),
        Some(m) if !m.is_finite() || m <= 0.0 => (
            config.default_mass,
            format!(
                "hammer mass must be positive, using {} kg",
                config.default_mass
            ),
        ),
        Some(m) if m < config.min_mass => (
            config.min_mass,
            format!("hammer mass too small ({m} kg), clamped to {} kg", config.min_mass),
        ),
        Some(m) if m > config.max_mass => (
            config.max_mass,
            format!("hammer mass too large ({m} kg), clamped to {} kg", config.max_mass),
        ),
        Some(m) => (m, format!("hammer mass: {m} kg")),
    }
}

/// Convert a force signal in g to newtons for the given hammer mass.
pub fn force_to_newtons(force_g: &[f64], mass_kg: f64, gravity: f64) -> Vec<f64> {
    force_g.iter().map(|&f| f * mass_kg * gravity).collect()
}

/// Convert an acceleration signal in g to m/s².
pub fn accel_to_si(accel_g: &[f64], gravity: f64) -> Vec<f64> {
    accel_g.iter().map(|&a| a * gravity).collect()
}
