//! SID 6581 state-variable filter, discrete-time model
//!
//! Three coupled integrator nodes (high-pass, band-pass, low-pass) advanced one
//! sample at a time at an implied 1 MHz clock. On top of the textbook
//! Chamberlin loop the model adds:
//! - a resonance-scaled leak of the raw input into the low-pass path
//! - a small cross-leak pulling every node toward the sum of all three
//! - a direct feed-through of the input into the high-pass node, scaled by
//!   `distortion_rate`
//!
//! The update order below is part of the model. Vlp is integrated first, Vbp
//! then integrates the *previous* Vhp, and Vhp is recomputed last from the new
//! Vbp and Vlp. Reordering these lines changes the transfer function.

use crate::filter_params::{FilterParams, MAX_RESONANCE};

/// Node voltages of the filter plus the input currently applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    /// Input sample
    pub vi: f64,
    /// Low-pass node
    pub vlp: f64,
    /// Band-pass node
    pub vbp: f64,
    /// High-pass node
    pub vhp: f64,
}

impl FilterState {
    /// True when none of the node voltages has diverged
    pub fn is_finite(&self) -> bool {
        self.vlp.is_finite() && self.vbp.is_finite() && self.vhp.is_finite()
    }
}

/// Filter engine owning its parameters and state
///
/// Each analysis run owns one engine; engines are never shared between runs.
#[derive(Debug, Clone)]
pub struct SidFilter {
    params: FilterParams,
    state: FilterState,
}

impl SidFilter {
    /// Create an engine at rest (all nodes at zero)
    pub fn new(params: FilterParams) -> Self {
        Self {
            params,
            state: FilterState::default(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Set the input applied by the next `step()`
    pub fn set_input(&mut self, vi: f64) {
        self.state.vi = vi;
    }

    /// Clear all nodes and the input
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    /// Advance the filter by one sample
    #[inline]
    pub fn step(&mut self) {
        let p = &self.params;
        let s = &mut self.state;

        let q = p.q();
        let lpleak = s.vi * p.res / MAX_RESONANCE / 10.0;

        let sum = s.vlp + s.vbp + s.vhp;
        s.vlp += (sum - s.vlp) * p.cft;
        s.vbp += (sum - s.vbp) * p.cft;
        s.vhp += (sum - s.vhp) * p.cft;

        s.vlp -= p.w0 * (s.vbp - lpleak) * p.lp_bp;
        s.vbp -= p.w0 * s.vhp;
        s.vhp = (s.vbp + lpleak) / q - s.vlp / p.lp_bp - s.vi * p.distortion_rate;
    }

    /// Apply `vi` and advance one sample
    #[inline]
    pub fn process(&mut self, vi: f64) -> &FilterState {
        self.set_input(vi);
        self.step();
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filter_is_at_rest() {
        let filter = SidFilter::new(FilterParams::default());
        assert_eq!(*filter.state(), FilterState::default());
    }

    #[test]
    fn test_zero_input_stays_zero() {
        let mut filter = SidFilter::new(FilterParams::default());
        for _ in 0..8192 {
            let state = filter.process(0.0);
            assert_eq!(state.vlp, 0.0);
            assert_eq!(state.vbp, 0.0);
            assert_eq!(state.vhp, 0.0);
        }
    }

    #[test]
    fn test_first_step_from_rest() {
        // From rest only the leak and feed-through terms move the nodes:
        // Vlp = w0 * lpleak * lp_bp, Vbp = 0, Vhp = lpleak / Q - Vlp / lp_bp - Vi
        let params = FilterParams::default();
        let mut filter = SidFilter::new(params);
        let state = *filter.process(1.0);

        let lpleak = 1.0 * 15.0 / 15.0 / 10.0;
        let vlp = params.w0 * lpleak * params.lp_bp;
        let vhp = lpleak / params.q() - vlp / params.lp_bp - 1.0;

        assert_eq!(state.vbp, 0.0);
        assert!((state.vlp - vlp).abs() < 1e-15, "vlp = {}", state.vlp);
        assert!((state.vhp - vhp).abs() < 1e-15, "vhp = {}", state.vhp);
    }

    #[test]
    fn test_band_pass_integrates_previous_high_pass() {
        let params = FilterParams::default();
        let mut filter = SidFilter::new(params);
        let first = *filter.process(1.0);
        let second = *filter.process(0.0);

        // Second step: Vbp picks up the cross-leak, then integrates the Vhp
        // left over from the first step (after its own cross-leak)
        let sum = first.vlp + first.vbp + first.vhp;
        let vbp_leaked = first.vbp + (sum - first.vbp) * params.cft;
        let vhp_leaked = first.vhp + (sum - first.vhp) * params.cft;
        let expected = vbp_leaked - params.w0 * vhp_leaked;

        assert!((second.vbp - expected).abs() < 1e-15);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = SidFilter::new(FilterParams::default());
        filter.process(1.0);
        filter.process(0.0);
        assert_ne!(*filter.state(), FilterState::default());

        filter.reset();
        assert_eq!(*filter.state(), FilterState::default());
    }

    #[test]
    fn test_unstable_parameters_diverge() {
        let params = FilterParams {
            w0: 2.0,
            ..FilterParams::default()
        };
        let mut filter = SidFilter::new(params);
        filter.process(1.0);

        let diverged = (0..8192).any(|_| !filter.process(0.0).is_finite());
        assert!(diverged, "w0 = 2.0 should blow up within one FFT frame");
    }

    #[test]
    fn test_default_impulse_decays() {
        let mut filter = SidFilter::new(FilterParams::default());
        filter.process(1.0);
        for _ in 1..8192 {
            filter.process(0.0);
        }
        let state = filter.state();
        assert!(state.vlp.abs() < 1e-12);
        assert!(state.vbp.abs() < 1e-12);
        assert!(state.vhp.abs() < 1e-12);
    }
}
