//! Frequency response measurement
//!
//! The filter is excited with a single-sample impulse, one tap is recorded for
//! `FFT_SIZE` samples, and the DFT of that impulse response gives the transfer
//! function. Power is reported in dB for the non-negative half of the spectrum.
//!
//! Every term of the recurrence, the `distortion_rate` feed-through included,
//! is linear in the input, so dividing by the impulse amplitude makes the
//! result independent of it up to rounding.

use crate::error::{FilterError, FilterResult, InstabilityStage};
use crate::filter_params::FilterParams;
use crate::sid_filter::SidFilter;
use crate::tap::FilterTap;
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Samples simulated per run, and DFT length
pub const FFT_SIZE: usize = 8192;

/// Implied sample rate of the model in Hz (the filter clock)
pub const SAMPLE_RATE: f64 = 1_000_000.0;

/// Powers below this are reported as `DB_FLOOR`
pub const POWER_FLOOR: f64 = 1e-9;

/// Magnitude reported for bins with (near) zero power
pub const DB_FLOOR: f64 = -99.0;

/// Convert a power ratio to decibels, clamped at `DB_FLOOR`
pub fn power_to_db(power: f64) -> f64 {
    if power < POWER_FLOOR {
        return DB_FLOOR;
    }
    10.0 * power.log10()
}

/// Centre frequency of DFT bin `index` in Hz
pub fn bin_frequency(index: usize) -> f64 {
    index as f64 / FFT_SIZE as f64 * SAMPLE_RATE
}

/// One line of the frequency response
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumBin {
    pub frequency_hz: f64,
    pub magnitude_db: f64,
}

/// Frequency response of one tap at one impulse amplitude
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub tap: FilterTap,
    pub amplitude: f64,
    /// `FFT_SIZE / 2` bins in ascending frequency order
    pub bins: Vec<SpectrumBin>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin with the highest magnitude, i.e. the resonance peak
    pub fn peak(&self) -> Option<&SpectrumBin> {
        self.bins
            .iter()
            .max_by(|a, b| a.magnitude_db.total_cmp(&b.magnitude_db))
    }

    /// Magnitude of the bin nearest to `frequency_hz`
    pub fn magnitude_at(&self, frequency_hz: f64) -> Option<f64> {
        if !frequency_hz.is_finite() || frequency_hz < 0.0 {
            return None;
        }
        let index = (frequency_hz / SAMPLE_RATE * FFT_SIZE as f64).round() as usize;
        self.bins.get(index).map(|bin| bin.magnitude_db)
    }
}

fn check_amplitude(amplitude: f64) -> FilterResult<()> {
    if amplitude.is_finite() && amplitude > 0.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidAmplitude(amplitude))
    }
}

/// Record `FFT_SIZE` samples of `tap` after an impulse of `amplitude`.
///
/// The engine starts from rest. An amplitude of zero is allowed here and gives
/// an all-zero sequence.
pub fn impulse_response(
    params: &FilterParams,
    tap: FilterTap,
    amplitude: f64,
) -> FilterResult<Vec<f64>> {
    let mut filter = SidFilter::new(*params);
    let mut samples = Vec::with_capacity(FFT_SIZE);

    for n in 0..FFT_SIZE {
        let vi = if n == 0 { amplitude } else { 0.0 };
        let state = filter.process(vi);
        if !state.is_finite() {
            warn!(tap = %tap, amplitude, sample = n, "filter state diverged");
            return Err(FilterError::NumericInstability {
                stage: InstabilityStage::Simulation,
                index: n,
            });
        }
        samples.push(tap.sample(state));
    }

    Ok(samples)
}

/// Measures frequency responses for one parameter set
///
/// Holds a planned FFT that can be shared across threads; every measurement
/// runs its own `SidFilter`.
pub struct ResponseAnalyzer {
    params: FilterParams,
    fft: Arc<dyn Fft<f64>>,
}

impl ResponseAnalyzer {
    pub fn new(params: FilterParams) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        Self { params, fft }
    }

    /// Full `FFT_SIZE`-point transform of the impulse response, divided by
    /// the impulse amplitude
    pub fn transfer_function(
        &self,
        tap: FilterTap,
        amplitude: f64,
    ) -> FilterResult<Vec<Complex<f64>>> {
        check_amplitude(amplitude)?;

        let samples = impulse_response(&self.params, tap, amplitude)?;
        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);

        for (index, coeff) in buffer.iter_mut().enumerate() {
            *coeff /= amplitude;
            if !coeff.re.is_finite() || !coeff.im.is_finite() {
                warn!(tap = %tap, amplitude, bin = index, "non-finite transform coefficient");
                return Err(FilterError::NumericInstability {
                    stage: InstabilityStage::Transform,
                    index,
                });
            }
        }

        Ok(buffer)
    }

    /// Frequency response of `tap` in dB over bins `0..FFT_SIZE / 2`
    pub fn analyze(&self, tap: FilterTap, amplitude: f64) -> FilterResult<Spectrum> {
        debug!(tap = %tap, amplitude, "measuring frequency response");

        let transform = self.transfer_function(tap, amplitude)?;
        let bins = transform[..FFT_SIZE / 2]
            .iter()
            .enumerate()
            .map(|(i, coeff)| {
                // A finite coefficient can still overflow once squared
                let power = coeff.norm_sqr();
                if !power.is_finite() {
                    warn!(tap = %tap, amplitude, bin = i, "non-finite bin power");
                    return Err(FilterError::NumericInstability {
                        stage: InstabilityStage::Transform,
                        index: i,
                    });
                }
                Ok(SpectrumBin {
                    frequency_hz: bin_frequency(i),
                    magnitude_db: power_to_db(power),
                })
            })
            .collect::<FilterResult<Vec<_>>>()?;

        let spectrum = Spectrum {
            tap,
            amplitude,
            bins,
        };
        if let Some(peak) = spectrum.peak() {
            debug!(
                tap = %tap,
                peak_hz = peak.frequency_hz,
                peak_db = peak.magnitude_db,
                "frequency response done"
            );
        }
        Ok(spectrum)
    }

    /// Measure several taps in parallel. Fails as a whole if any tap fails.
    pub fn analyze_taps(&self, taps: &[FilterTap], amplitude: f64) -> FilterResult<Vec<Spectrum>> {
        taps.par_iter()
            .map(|&tap| self.analyze(tap, amplitude))
            .collect()
    }
}

/// Frequency response of `tap` for `params` at impulse `amplitude`
pub fn analyze(params: &FilterParams, tap: FilterTap, amplitude: f64) -> FilterResult<Spectrum> {
    ResponseAnalyzer::new(*params).analyze(tap, amplitude)
}

/// Parallel [`analyze`] over several taps, results in the order given
pub fn analyze_taps(
    params: &FilterParams,
    taps: &[FilterTap],
    amplitude: f64,
) -> FilterResult<Vec<Spectrum>> {
    ResponseAnalyzer::new(*params).analyze_taps(taps, amplitude)
}
