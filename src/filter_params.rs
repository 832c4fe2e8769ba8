//! Filter parameter sets
//!
//! A `FilterParams` value fixes the physical constants of one simulation run.
//! Parameter sets can be written as TOML; any key left out takes its default.
//!
//! ```toml
//! w0 = 0.0628318
//! distortion_rate = 1.0
//! res = 15.0
//! cft = 1.2e-4
//! lp_bp = 1.414
//! ```

use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest resonance setting (4-bit register)
pub const MAX_RESONANCE: f64 = 15.0;

/// Immutable constants for one filter run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Integrator step per sample (angular cutoff at 1 MHz)
    pub w0: f64,
    /// Gain of the raw input fed straight into the high-pass node
    pub distortion_rate: f64,
    /// Resonance, 0-15
    pub res: f64,
    /// Cross-leak between the three integrator nodes
    pub cft: f64,
    /// Fixed gain ratio between low-pass and band-pass paths
    pub lp_bp: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            w0: 0.0628318,
            distortion_rate: 1.0,
            res: 15.0,
            cft: 1.2e-4,
            lp_bp: 1.414,
        }
    }
}

impl FilterParams {
    /// Quality factor derived from the resonance setting
    pub fn q(&self) -> f64 {
        0.707 + self.res / MAX_RESONANCE
    }

    /// Parse a parameter set from TOML text
    pub fn from_toml_str(content: &str) -> FilterResult<Self> {
        let params: FilterParams = toml::from_str(content)?;
        Ok(params)
    }

    /// Load a parameter set from a TOML file
    pub fn load(path: &Path) -> FilterResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> FilterResult<String> {
        toml::to_string_pretty(self).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Check that every value is usable by the recurrence.
    ///
    /// This does not check stability: some finite parameter sets make the
    /// filter self-oscillate and diverge, which the analyzer reports as
    /// [`FilterError::NumericInstability`].
    pub fn validate(&self) -> FilterResult<()> {
        let fields = [
            ("w0", self.w0),
            ("distortion_rate", self.distortion_rate),
            ("res", self.res),
            ("cft", self.cft),
            ("lp_bp", self.lp_bp),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(FilterError::InvalidParameter {
                    name,
                    reason: format!("must be finite, got {}", value),
                });
            }
        }

        if !(0.0..=MAX_RESONANCE).contains(&self.res) {
            return Err(FilterError::InvalidParameter {
                name: "res",
                reason: format!("must be within 0-{}, got {}", MAX_RESONANCE, self.res),
            });
        }

        // Vhp divides by lp_bp every step
        if self.lp_bp == 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "lp_bp",
                reason: "must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
