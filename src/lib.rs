//! # sidfilter - SID 6581 filter response simulator
//!
//! Models the nonlinear state-variable filter of the MOS 6581 sound chip as a
//! discrete-time recurrence clocked at 1 MHz, and measures its frequency
//! response by feeding it an impulse and taking the DFT of one output tap.
//!
//! ## Quick Start
//!
//! ```rust
//! use sidfilter::{analyze, FilterParams, FilterTap};
//!
//! let params = FilterParams::default();
//! let spectrum = analyze(&params, FilterTap::LowPass, 1.0).unwrap();
//!
//! assert_eq!(spectrum.len(), 4096);
//! let peak = spectrum.peak().unwrap();
//! println!("resonance at {:.0} Hz ({:.1} dB)", peak.frequency_hz, peak.magnitude_db);
//! ```
//!
//! ## Driving the filter directly
//!
//! ```rust
//! use sidfilter::{FilterParams, SidFilter};
//!
//! let mut filter = SidFilter::new(FilterParams { res: 4.0, ..FilterParams::default() });
//! let first = *filter.process(1.0);
//! let second = *filter.process(0.0);
//! assert_ne!(first.vlp, second.vlp);
//! ```
//!
//! ## Modules
//!
//! - [`sid_filter`] - the filter recurrence and its state
//! - [`tap`] - which node combination is observed
//! - [`spectrum`] - impulse response, DFT and dB conversion
//! - [`filter_params`] - parameter sets and TOML loading
//! - [`output`] - text / JSON / table writers used by the CLI

pub mod error;
pub mod filter_params;
pub mod output;
pub mod sid_filter;
pub mod spectrum;
pub mod tap;

pub use error::{FilterError, FilterResult, InstabilityStage};
pub use filter_params::FilterParams;
pub use sid_filter::{FilterState, SidFilter};
pub use spectrum::{
    analyze, analyze_taps, impulse_response, ResponseAnalyzer, Spectrum, SpectrumBin, FFT_SIZE,
};
pub use tap::FilterTap;
