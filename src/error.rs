//! Error types for filter simulation and spectral analysis

use std::fmt;

/// Where in a run a non-finite value was first observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstabilityStage {
    /// A state variable diverged while stepping the recurrence
    Simulation,
    /// A transform coefficient came out non-finite
    Transform,
}

impl fmt::Display for InstabilityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstabilityStage::Simulation => write!(f, "simulation"),
            InstabilityStage::Transform => write!(f, "transform"),
        }
    }
}

/// Errors raised by the filter engine, the analyzer and parameter loading
#[derive(Debug)]
pub enum FilterError {
    /// Requested output tap is not one of the known combinations
    InvalidTap(String),
    /// Impulse amplitude is zero, negative or not finite
    InvalidAmplitude(f64),
    /// Filter state or spectrum went non-finite
    NumericInstability {
        stage: InstabilityStage,
        /// Sample index (simulation) or bin index (transform)
        index: usize,
    },
    /// A filter parameter is outside its usable domain
    InvalidParameter { name: &'static str, reason: String },
    /// Parameter file could not be parsed
    Config(String),
    /// Spectra could not be written in the requested layout
    Output(String),
    /// IO error
    Io(std::io::Error),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidTap(name) => write!(
                f,
                "Unknown tap: {} (expected one of Vlp, Vbp, Vhp, sum, sum_lo, sum_hi, sum_notch)",
                name
            ),
            FilterError::InvalidAmplitude(value) => {
                write!(f, "Impulse amplitude must be a positive finite number, got {}", value)
            }
            FilterError::NumericInstability { stage, index } => write!(
                f,
                "Numeric instability: non-finite value during {} at index {}",
                stage, index
            ),
            FilterError::InvalidParameter { name, reason } => {
                write!(f, "Invalid filter parameter {}: {}", name, reason)
            }
            FilterError::Config(msg) => write!(f, "Parameter file error: {}", msg),
            FilterError::Output(msg) => write!(f, "Output error: {}", msg),
            FilterError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FilterError {
    fn from(e: std::io::Error) -> Self {
        FilterError::Io(e)
    }
}

impl From<toml::de::Error> for FilterError {
    fn from(e: toml::de::Error) -> Self {
        FilterError::Config(e.to_string())
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instability_display_names_stage_and_index() {
        let err = FilterError::NumericInstability {
            stage: InstabilityStage::Simulation,
            index: 42,
        };
        assert_eq!(
            format!("{}", err),
            "Numeric instability: non-finite value during simulation at index 42"
        );
    }

    #[test]
    fn test_invalid_tap_display_lists_names() {
        let msg = format!("{}", FilterError::InvalidTap("Vmid".to_string()));
        assert!(msg.starts_with("Unknown tap: Vmid"));
        assert!(msg.contains("sum_notch"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FilterError = io.into();
        assert!(matches!(err, FilterError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
