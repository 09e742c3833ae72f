//! Cross-signal derivation model.
//!
//! Maps a primary (ECG) value to four derived EEG band values. The same
//! deterministic core serves two callers:
//!
//! - synthesis, which adds a small uniform noise term on top, and
//! - the cross-signal detector, which uses it as an oracle for the
//!   "expected" bands through [`expected_at`] and never adds noise.
//!
//! ```text
//!   value ──► |value| · gain ──┬──► + oscillator(t) ──┬──► BandValues
//!                              │                      │
//!                          (alpha: no osc.)     NoiseSource (synthesis only)
//! ```

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::samples::{Band, BandSample, PrimarySample};

/// Default upper bound of the synthesis noise term.
pub const DEFAULT_NOISE_AMPLITUDE: f64 = 0.2;

const ALPHA_GAIN: f64 = 0.7;
const BETA_GAIN: f64 = 0.5;
const THETA_GAIN: f64 = 0.3;
const DELTA_GAIN: f64 = 0.2;

// Oscillator amplitudes and angular rates (radians per millisecond).
const BETA_OSC: (f64, f64) = (0.2, 0.001);
const THETA_OSC: (f64, f64) = (0.15, 0.0005);
const DELTA_OSC: (f64, f64) = (0.1, 0.0002);

// ── Band values ─────────────────────────────────────────────────────────

/// Four derived band values, without a timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandValues {
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
}

impl BandValues {
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Theta => self.theta,
            Band::Delta => self.delta,
        }
    }

    /// Multiply every band by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            alpha: self.alpha * factor,
            beta: self.beta * factor,
            theta: self.theta * factor,
            delta: self.delta * factor,
        }
    }

    /// Add the same offset to every band.
    pub fn offset(self, by: f64) -> Self {
        Self {
            alpha: self.alpha + by,
            beta: self.beta + by,
            theta: self.theta + by,
            delta: self.delta + by,
        }
    }

    /// Attach a timestamp.
    pub fn at(self, timestamp: i64) -> BandSample {
        BandSample::new(timestamp, self.alpha, self.beta, self.theta, self.delta)
    }
}

/// Deterministic derivation of the four bands at time `at_ms`.
///
/// Pure: identical inputs always give identical outputs.
pub fn derive_at(value: f64, at_ms: i64) -> BandValues {
    let magnitude = value.abs();
    let t = at_ms as f64;
    BandValues {
        alpha: magnitude * ALPHA_GAIN,
        beta: magnitude * BETA_GAIN + BETA_OSC.0 * (t * BETA_OSC.1).sin(),
        theta: magnitude * THETA_GAIN + THETA_OSC.0 * (t * THETA_OSC.1).cos(),
        delta: magnitude * DELTA_GAIN + DELTA_OSC.0 * (t * DELTA_OSC.1).sin(),
    }
}

/// Oracle values: the deterministic bands at `at_ms` scaled by `headroom`.
///
/// Never draws noise, so cross-signal verdicts do not depend on a model
/// instance or its random state.
pub fn expected_at(value: f64, at_ms: i64, headroom: f64) -> BandValues {
    derive_at(value, at_ms).scaled(headroom)
}

// ── Clock ───────────────────────────────────────────────────────────────

/// Source of the wall-clock time used by [`CrossSignalModel::derive`].
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

// ── Noise ───────────────────────────────────────────────────────────────

/// Source of the additive synthesis noise term.
pub trait NoiseSource: Send + Sync {
    /// One draw, applied to all four bands of a single derivation.
    fn next_offset(&self) -> f64;
}

/// Always zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn next_offset(&self) -> f64 {
        0.0
    }
}

/// Uniform noise in `[0, amplitude)`.
pub struct UniformNoise {
    amplitude: f64,
    rng: Mutex<StdRng>,
}

impl UniformNoise {
    /// Seeded from OS entropy.
    pub fn new(amplitude: f64) -> Self {
        Self {
            amplitude,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl NoiseSource for UniformNoise {
    fn next_offset(&self) -> f64 {
        // NaN, infinite and non-positive amplitudes have no sampling range.
        if !(self.amplitude > 0.0 && self.amplitude.is_finite()) {
            return 0.0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0.0..self.amplitude)
    }
}

impl std::fmt::Debug for UniformNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformNoise")
            .field("amplitude", &self.amplitude)
            .finish_non_exhaustive()
    }
}

// ── Model ───────────────────────────────────────────────────────────────

/// Derivation model with injected clock and noise source.
#[derive(Clone)]
pub struct CrossSignalModel {
    clock: Arc<dyn Clock>,
    noise: Arc<dyn NoiseSource>,
}

impl CrossSignalModel {
    pub fn new(clock: Arc<dyn Clock>, noise: Arc<dyn NoiseSource>) -> Self {
        Self { clock, noise }
    }

    /// System clock and entropy-seeded noise of the given amplitude.
    pub fn with_noise_amplitude(amplitude: f64) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UniformNoise::new(amplitude)))
    }

    /// A model that never adds noise, reading time from `clock`.
    pub fn deterministic(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Arc::new(NoNoise))
    }

    /// Derive bands at the clock's current time.
    pub fn derive(&self, value: f64, include_noise: bool) -> BandValues {
        self.derive_at(value, self.clock.now_ms(), include_noise)
    }

    /// Derive bands at an explicit time.
    pub fn derive_at(&self, value: f64, at_ms: i64, include_noise: bool) -> BandValues {
        let bands = derive_at(value, at_ms);
        if include_noise {
            bands.offset(self.noise.next_offset())
        } else {
            bands
        }
    }

    /// Synthesize a band series from a primary series.
    ///
    /// Each output sample keeps its source timestamp, and the oscillators are
    /// evaluated at that timestamp.
    pub fn synthesize(&self, primary: &[PrimarySample]) -> Vec<BandSample> {
        primary
            .iter()
            .map(|p| self.derive_at(p.value, p.timestamp, true).at(p.timestamp))
            .collect()
    }
}

impl Default for CrossSignalModel {
    fn default() -> Self {
        Self::with_noise_amplitude(DEFAULT_NOISE_AMPLITUDE)
    }
}

impl std::fmt::Debug for CrossSignalModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossSignalModel").finish_non_exhaustive()
    }
}
