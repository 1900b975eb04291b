//! Streaming mean and variance.
//!
//! # Algorithm
//! Welford's online update. For each new value `x`:
//!
//! ```text
//! delta  = x − mean_before
//! mean  += delta / count
//! M2    += delta × (x − mean_after)
//! ```
//!
//! The second factor uses the *updated* mean. Reusing `delta` twice gives
//! a different recurrence that loses precision on large offsets.
//!
//! Reference: Welford (1962), "Note on a Method for Calculating
//! Corrected Sums of Squares and Products", *Technometrics* 4(3).

use crate::error::{KernelError, Result};
use crate::random::UniformSource;

/// Snapshot of an estimator's state.
///
/// `m2` is the running sum of squared deviations from the mean.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MomentAccumulator {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
}

/// Single-pass mean/variance estimator.
///
/// # Examples
/// ```
/// use u_probkit::moments::StreamingMomentEstimator;
/// let mut est = StreamingMomentEstimator::new();
/// for &x in &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     est.accumulate(x).unwrap();
/// }
/// assert!((est.mean().unwrap() - 5.0).abs() < 1e-15);
/// assert!((est.population_variance().unwrap() - 4.0).abs() < 1e-12);
/// assert!((est.sample_variance().unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamingMomentEstimator {
    state: MomentAccumulator,
}

impl StreamingMomentEstimator {
    /// Creates an empty estimator.
    pub fn new() -> Self {
        Self {
            state: MomentAccumulator::default(),
        }
    }

    /// Feeds one value into the estimator.
    ///
    /// # Errors
    /// Returns `InvalidValue` for NaN or infinite input, and for finite
    /// input whose update would overflow the running mean or M2. In both
    /// cases the estimator is left untouched.
    pub fn accumulate(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(KernelError::InvalidValue(value));
        }
        let s = self.state;
        let count = s.count + 1;
        let delta = value - s.mean;
        let mean = s.mean + delta / count as f64;
        let m2 = s.m2 + delta * (value - mean);
        if !(mean.is_finite() && m2.is_finite()) {
            return Err(KernelError::InvalidValue(value));
        }
        self.state = MomentAccumulator { count, mean, m2 };
        Ok(())
    }

    /// Feeds every value from `values`, all or nothing.
    ///
    /// The whole batch is checked first; if any value is non-finite, or the
    /// batch overflows partway through, the estimator is left untouched and
    /// the offending value is reported.
    pub fn accumulate_all<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = f64>,
    {
        let batch: Vec<f64> = values.into_iter().collect();
        if let Some(&bad) = batch.iter().find(|v| !v.is_finite()) {
            return Err(KernelError::InvalidValue(bad));
        }
        let mut staged = self.clone();
        for x in batch {
            staged.accumulate(x)?;
        }
        *self = staged;
        Ok(())
    }

    /// Feeds `n` draws of `scale × U[0, 1)` from `source`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `scale` is not finite, and
    /// `InvalidValue` if the draws overflow the running moments. Either
    /// way nothing is applied.
    pub fn accumulate_uniform<S: UniformSource>(
        &mut self,
        n: u64,
        scale: f64,
        source: &mut S,
    ) -> Result<()> {
        if !scale.is_finite() {
            return Err(KernelError::InvalidArgument(format!(
                "uniform scale must be finite, got {scale}"
            )));
        }
        let mut staged = self.clone();
        for _ in 0..n {
            staged.accumulate(scale * source.next_uniform())?;
        }
        *self = staged;
        Ok(())
    }

    /// Returns the estimator to `{count: 0, mean: 0, m2: 0}`.
    pub fn reset(&mut self) {
        self.state = MomentAccumulator::default();
    }

    /// Returns the number of samples seen so far.
    pub fn count(&self) -> u64 {
        self.state.count
    }

    /// Returns the running mean, or `None` if no samples have been added.
    pub fn mean(&self) -> Option<f64> {
        if self.state.count == 0 {
            None
        } else {
            Some(self.state.mean)
        }
    }

    /// Running sum of squared deviations (M2).
    pub fn sum_squared_deviations(&self) -> f64 {
        self.state.m2
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> MomentAccumulator {
        self.state
    }

    /// Population variance, `M2 / n`.
    ///
    /// # Errors
    /// `InsufficientData` when no samples have been added.
    pub fn population_variance(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.state.m2 / self.state.count as f64)
    }

    /// Sample variance with Bessel's correction, `M2 / (n − 1)`.
    ///
    /// # Errors
    /// `InsufficientData` when fewer than 2 samples have been added.
    pub fn sample_variance(&self) -> Result<f64> {
        self.require(2)?;
        Ok(self.state.m2 / (self.state.count - 1) as f64)
    }

    /// Square root of [`population_variance`](Self::population_variance).
    pub fn population_std_dev(&self) -> Result<f64> {
        self.population_variance().map(f64::sqrt)
    }

    /// Square root of [`sample_variance`](Self::sample_variance).
    pub fn sample_std_dev(&self) -> Result<f64> {
        self.sample_variance().map(f64::sqrt)
    }

    fn require(&self, required: u64) -> Result<()> {
        if self.state.count < required {
            Err(KernelError::InsufficientData {
                required,
                available: self.state.count,
            })
        } else {
            Ok(())
        }
    }
}

impl From<MomentAccumulator> for StreamingMomentEstimator {
    fn from(state: MomentAccumulator) -> Self {
        Self { state }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
