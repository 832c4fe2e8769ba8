//! Output taps
//!
//! A tap selects which combination of filter nodes is observed as the output
//! signal. The chip's mode bits route any subset of LP/BP/HP to the mixer, so
//! the seven non-empty subsets cover every filter mode.

use crate::error::FilterError;
use crate::sid_filter::FilterState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Combination of filter nodes observed after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterTap {
    /// Low-pass node alone
    #[serde(rename = "Vlp")]
    LowPass,
    /// Band-pass node alone
    #[serde(rename = "Vbp")]
    BandPass,
    /// High-pass node alone
    #[serde(rename = "Vhp")]
    HighPass,
    /// All three nodes
    #[serde(rename = "sum")]
    Sum,
    /// Low-pass + band-pass
    #[serde(rename = "sum_lo")]
    SumLow,
    /// Band-pass + high-pass
    #[serde(rename = "sum_hi")]
    SumHigh,
    /// Low-pass + high-pass
    #[serde(rename = "sum_notch")]
    Notch,
}

impl FilterTap {
    pub const ALL: [FilterTap; 7] = [
        FilterTap::LowPass,
        FilterTap::BandPass,
        FilterTap::HighPass,
        FilterTap::Sum,
        FilterTap::SumLow,
        FilterTap::SumHigh,
        FilterTap::Notch,
    ];

    /// Name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            FilterTap::LowPass => "Vlp",
            FilterTap::BandPass => "Vbp",
            FilterTap::HighPass => "Vhp",
            FilterTap::Sum => "sum",
            FilterTap::SumLow => "sum_lo",
            FilterTap::SumHigh => "sum_hi",
            FilterTap::Notch => "sum_notch",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FilterTap::LowPass => "low-pass",
            FilterTap::BandPass => "band-pass",
            FilterTap::HighPass => "high-pass",
            FilterTap::Sum => "low + band + high",
            FilterTap::SumLow => "low + band",
            FilterTap::SumHigh => "band + high",
            FilterTap::Notch => "low + high (notch)",
        }
    }

    /// Evaluate the tap on the current node voltages
    #[inline]
    pub fn sample(&self, state: &FilterState) -> f64 {
        match self {
            FilterTap::LowPass => state.vlp,
            FilterTap::BandPass => state.vbp,
            FilterTap::HighPass => state.vhp,
            FilterTap::Sum => state.vlp + state.vbp + state.vhp,
            FilterTap::SumLow => state.vlp + state.vbp,
            FilterTap::SumHigh => state.vbp + state.vhp,
            FilterTap::Notch => state.vlp + state.vhp,
        }
    }
}

impl fmt::Display for FilterTap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterTap {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterTap::ALL
            .iter()
            .copied()
            .find(|tap| tap.name() == s)
            .ok_or_else(|| FilterError::InvalidTap(s.to_string()))
    }
}
