//! Reduced feature schema for single transit-candidate records.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Canonical column order of the reduced feature schema. Artifacts fitted
/// for reduced mode declare exactly these columns in exactly this order.
pub const REDUCED_FEATURES: [&str; 12] = [
    "log_planet_insol",
    "planet_radius",
    "signal_to_noise",
    "planet_to_star_ratio",
    "planet_teq",
    "planet_insol",
    "transit_duration",
    "orbital_period",
    "impact_parameter",
    "orbital_velocity_proxy",
    "log_orbital_period",
    "temp_ratio",
];

/// One validated transit candidate in the reduced feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFeatures {
    /// Log of incident stellar flux.
    pub log_planet_insol: f64,
    /// Planetary radius in Earth radii.
    pub planet_radius: f64,
    /// Transit signal-to-noise ratio.
    pub signal_to_noise: f64,
    /// Planet-to-star radius ratio.
    pub planet_to_star_ratio: f64,
    /// Planetary equilibrium temperature in Kelvin.
    pub planet_teq: f64,
    /// Incident stellar flux in Earth flux units.
    pub planet_insol: f64,
    /// Transit duration in hours.
    pub transit_duration: f64,
    /// Orbital period in days.
    pub orbital_period: f64,
    /// Transit impact parameter.
    pub impact_parameter: f64,
    /// Radius over period, a proxy for orbital velocity.
    pub orbital_velocity_proxy: f64,
    /// Log of orbital period.
    pub log_orbital_period: f64,
    /// Planet-to-star temperature ratio.
    pub temp_ratio: f64,
}

impl CandidateFeatures {
    /// Validates a JSON object against the reduced schema. Every field must
    /// be present and carry a finite number; all offending fields are
    /// collected and reported together.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::MalformedInput {
            reason: "expected a JSON object".to_string(),
        })?;

        let mut offending = Vec::new();
        let mut row = Vec::with_capacity(REDUCED_FEATURES.len());
        for name in REDUCED_FEATURES {
            match object.get(name).and_then(|v| v.as_f64()) {
                Some(v) if v.is_finite() => row.push(v),
                _ => offending.push(name.to_string()),
            }
        }
        if !offending.is_empty() {
            return Err(Error::SchemaValidation { fields: offending });
        }

        Ok(Self {
            log_planet_insol: row[0],
            planet_radius: row[1],
            signal_to_noise: row[2],
            planet_to_star_ratio: row[3],
            planet_teq: row[4],
            planet_insol: row[5],
            transit_duration: row[6],
            orbital_period: row[7],
            impact_parameter: row[8],
            orbital_velocity_proxy: row[9],
            log_orbital_period: row[10],
            temp_ratio: row[11],
        })
    }

    /// Feature values in canonical column order.
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.log_planet_insol,
            self.planet_radius,
            self.signal_to_noise,
            self.planet_to_star_ratio,
            self.planet_teq,
            self.planet_insol,
            self.transit_duration,
            self.orbital_period,
            self.impact_parameter,
            self.orbital_velocity_proxy,
            self.log_orbital_period,
            self.temp_ratio,
        ]
    }
}
