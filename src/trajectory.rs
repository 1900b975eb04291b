//! Stochastic sample paths.
//!
//! Two generation modes, both pure functions of their parameters and an
//! injected [`UniformSource`]:
//!
//! - **Poisson counting process**, approximated by `n` Bernoulli trials of
//!   probability `λ/n` over a horizon `T`.
//! - **Bernoulli trials** read either as a ±1 random walk (partial sums)
//!   or as the running success frequency (law of large numbers).
//!
//! Ensemble helpers run many trajectories at once and summarise their end
//! points as histograms, with binomial or normal (CLT) reference curves.
//!
//! # Examples
//! ```
//! use u_probkit::random::create_rng;
//! use u_probkit::trajectory::{poisson_path, PoissonPathConfig};
//!
//! let mut rng = create_rng(7);
//! let path = poisson_path(&PoissonPathConfig::default(), &mut rng).unwrap();
//! assert_eq!(path.first().unwrap().position, 0.0);
//! assert_eq!(path.last().unwrap().position, 1.0);
//! ```

use crate::combinatorics::{check_probability, LogFactorialCache};
use crate::error::{KernelError, Result};
use crate::random::UniformSource;
use crate::special::normal_pdf;

// ============================================================================
// Sample paths
// ============================================================================

/// One `(position, value)` sample of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPoint {
    pub position: f64,
    pub value: f64,
}

impl PathPoint {
    /// Point with the given position and value.
    pub fn new(position: f64, value: f64) -> Self {
        Self { position, value }
    }
}

/// Ordered, immutable sequence of path points.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplePath {
    points: Vec<PathPoint>,
}

impl SamplePath {
    fn from_points(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    /// Path whose `i`-th value sits at position `i + 1`.
    fn from_step_values(values: Vec<f64>) -> Self {
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| PathPoint::new((i + 1) as f64, v))
            .collect();
        Self { points }
    }

    /// All points in path order.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a path with no points (a zero-step walk).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    pub fn first(&self) -> Option<&PathPoint> {
        self.points.first()
    }

    /// Last point, if any.
    pub fn last(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    /// Value of the last point, if any.
    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Point values in path order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Iterates over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, PathPoint> {
        self.points.iter()
    }

    /// `(x, y)` pairs ready for a line chart.
    pub fn xy_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.position, p.value)).collect()
    }
}

impl<'a> IntoIterator for &'a SamplePath {
    type Item = &'a PathPoint;
    type IntoIter = std::slice::Iter<'a, PathPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

// ============================================================================
// Poisson process
// ============================================================================

/// Parameters of a Bernoulli-approximated Poisson path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoissonPathConfig {
    /// Arrival rate λ.
    pub rate: f64,
    /// Number of sub-intervals `n`.
    pub steps: u64,
    /// Time horizon `T`.
    pub horizon: f64,
}

impl Default for PoissonPathConfig {
    fn default() -> Self {
        Self {
            rate: 50.0,
            steps: 2000,
            horizon: 1.0,
        }
    }
}

impl PoissonPathConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// See [`validate`](Self::validate).
    pub fn new(rate: f64, steps: u64, horizon: f64) -> Result<Self> {
        let config = Self {
            rate,
            steps,
            horizon,
        };
        config.validate()?;
        Ok(config)
    }

    /// Per-step event probability `λ / n`.
    pub fn step_probability(&self) -> f64 {
        self.rate / self.steps as f64
    }

    /// Width of one sub-interval, `T / n`.
    pub fn step_width(&self) -> f64 {
        self.horizon / self.steps as f64
    }

    /// # Errors
    /// `InvalidArgument` unless `λ >= 0`, `n > 0`, `T > 0` (all finite)
    /// and `λ / n < 1`.
    pub fn validate(&self) -> Result<()> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(KernelError::InvalidArgument(format!(
                "rate must be finite and non-negative, got {}",
                self.rate
            )));
        }
        if self.steps == 0 {
            return Err(KernelError::InvalidArgument(
                "step count must be positive".into(),
            ));
        }
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(KernelError::InvalidArgument(format!(
                "horizon must be finite and positive, got {}",
                self.horizon
            )));
        }
        let prob = self.step_probability();
        if prob >= 1.0 {
            return Err(KernelError::InvalidArgument(format!(
                "rate {} is too large for {} steps (per-step probability {prob} >= 1); \
                 increase the step count or lower the rate",
                self.rate, self.steps
            )));
        }
        Ok(())
    }
}

/// Simulates one counting-process path `N(t)` on `[0, T]`.
///
/// The path starts at `(0, 0)`, gains a point `(i·dt, count)` at every
/// successful trial, and ends at `(T, final_count)`. A success on the last
/// trial is recorded at exactly `T`, and the terminal point is appended only
/// when needed, so positions are strictly increasing.
///
/// # Errors
/// `InvalidArgument` if the configuration is invalid, in particular when
/// `λ / n >= 1`.
pub fn poisson_path<S: UniformSource>(
    config: &PoissonPathConfig,
    source: &mut S,
) -> Result<SamplePath> {
    config.validate()?;
    let prob = config.step_probability();
    let dt = config.step_width();
    let horizon = config.horizon;

    let mut points = vec![PathPoint::new(0.0, 0.0)];
    let mut count = 0_u64;
    for i in 1..=config.steps {
        if source.bernoulli(prob) {
            count += 1;
            let t = if i == config.steps {
                horizon
            } else {
                i as f64 * dt
            };
            points.push(PathPoint::new(t, count as f64));
        }
    }

    let needs_terminal = points.last().map_or(true, |p| p.position < horizon);
    if needs_terminal {
        points.push(PathPoint::new(horizon, count as f64));
    }
    Ok(SamplePath::from_points(points))
}

/// Mean path `E[N(t)] = λt` as the straight line `(0, 0) → (T, λT)`.
///
/// # Errors
/// `InvalidArgument` for a negative/non-finite rate or a non-positive
/// horizon.
pub fn expected_arrivals(rate: f64, horizon: f64) -> Result<SamplePath> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(KernelError::InvalidArgument(format!(
            "rate must be finite and non-negative, got {rate}"
        )));
    }
    if !horizon.is_finite() || horizon <= 0.0 {
        return Err(KernelError::InvalidArgument(format!(
            "horizon must be finite and positive, got {horizon}"
        )));
    }
    Ok(SamplePath::from_points(vec![
        PathPoint::new(0.0, 0.0),
        PathPoint::new(horizon, rate * horizon),
    ]))
}

// ============================================================================
// Bernoulli trials: random walk and running frequency
// ============================================================================

/// A run of independent Bernoulli trials.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BernoulliTrials {
    pub trials: u64,
    pub success_probability: f64,
}

impl Default for BernoulliTrials {
    fn default() -> Self {
        Self {
            trials: 100,
            success_probability: 0.5,
        }
    }
}

impl BernoulliTrials {
    /// # Errors
    /// `InvalidArgument` if `success_probability` is outside `[0, 1]`.
    pub fn new(trials: u64, success_probability: f64) -> Result<Self> {
        let config = Self {
            trials,
            success_probability,
        };
        config.validate()?;
        Ok(config)
    }

    /// Symmetric ±1 walk of `trials` steps.
    pub fn symmetric(trials: u64) -> Self {
        Self {
            trials,
            success_probability: 0.5,
        }
    }

    /// # Errors
    /// `InvalidArgument` if `success_probability` is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_probability(self.success_probability)
    }
}

/// Random walk: `trials` partial sums of +1 (probability `p`) or −1 steps.
///
/// Point `i` sits at position `i + 1` (the step number).
///
/// # Examples
/// ```
/// use u_probkit::random::create_rng;
/// use u_probkit::trajectory::{random_walk, BernoulliTrials};
///
/// let mut rng = create_rng(3);
/// let walk = random_walk(&BernoulliTrials::symmetric(50), &mut rng).unwrap();
/// assert_eq!(walk.len(), 50);
/// assert!(walk.values().all(|v| v.abs() <= 50.0));
/// ```
pub fn random_walk<S: UniformSource>(config: &BernoulliTrials, source: &mut S) -> Result<SamplePath> {
    config.validate()?;
    let mut score = 0_i64;
    let values = (0..config.trials)
        .map(|_| {
            score += walk_step(config.success_probability, source);
            score as f64
        })
        .collect();
    Ok(SamplePath::from_step_values(values))
}

/// Running success frequency `successes / n` after each trial.
///
/// # Errors
/// `InvalidArgument` if the success probability is outside `[0, 1]`.
pub fn running_frequency<S: UniformSource>(
    config: &BernoulliTrials,
    source: &mut S,
) -> Result<SamplePath> {
    config.validate()?;
    let mut successes = 0_u64;
    let values = (1..=config.trials)
        .map(|n| {
            if source.bernoulli(config.success_probability) {
                successes += 1;
            }
            successes as f64 / n as f64
        })
        .collect();
    Ok(SamplePath::from_step_values(values))
}

fn walk_step<S: UniformSource>(p: f64, source: &mut S) -> i64 {
    if source.bernoulli(p) {
        1
    } else {
        -1
    }
}

// ============================================================================
// Ensembles
// ============================================================================

/// Parameters for running many independent trajectories.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnsembleConfig {
    /// Number of trajectories `m`.
    pub trajectories: u64,
    /// Trials per trajectory and their success probability.
    pub trials: BernoulliTrials,
    /// How many full paths to keep for plotting; the rest only report
    /// their end point.
    pub kept_paths: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            trajectories: 1000,
            trials: BernoulliTrials::default(),
            kept_paths: 30,
        }
    }
}

impl EnsembleConfig {
    /// Creates a validated ensemble configuration.
    ///
    /// # Errors
    /// See [`validate`](Self::validate).
    pub fn new(trajectories: u64, trials: BernoulliTrials, kept_paths: usize) -> Result<Self> {
        let config = Self {
            trajectories,
            trials,
            kept_paths,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `InvalidArgument` if the per-trajectory trials are invalid.
    pub fn validate(&self) -> Result<()> {
        self.trials.validate()
    }
}

/// Outcome of [`simulate_walk_ensemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct WalkEnsemble {
    /// Full paths of the first `kept_paths` walks.
    pub paths: Vec<SamplePath>,
    /// Final score of every walk, in simulation order.
    pub final_scores: Vec<i64>,
}

/// Outcome of [`simulate_frequency_ensemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEnsemble {
    /// Full running-frequency paths of the first `kept_paths` runs.
    pub paths: Vec<SamplePath>,
    /// Final frequency `f_n` of every run, in simulation order.
    pub final_frequencies: Vec<f64>,
}

/// Runs `m` independent random walks.
pub fn simulate_walk_ensemble<S: UniformSource>(
    config: &EnsembleConfig,
    source: &mut S,
) -> Result<WalkEnsemble> {
    config.validate()?;
    let p = config.trials.success_probability;
    let mut paths = Vec::with_capacity(config.kept_paths.min(config.trajectories as usize));
    let mut final_scores = Vec::with_capacity(config.trajectories as usize);

    for i in 0..config.trajectories {
        if (i as usize) < config.kept_paths {
            let path = random_walk(&config.trials, source)?;
            final_scores.push(path.final_value().unwrap_or(0.0) as i64);
            paths.push(path);
        } else {
            let score: i64 = (0..config.trials.trials).map(|_| walk_step(p, source)).sum();
            final_scores.push(score);
        }
    }
    Ok(WalkEnsemble {
        paths,
        final_scores,
    })
}

/// Runs `m` independent running-frequency experiments.
///
/// With zero trials per run the final frequency is reported as 0.
pub fn simulate_frequency_ensemble<S: UniformSource>(
    config: &EnsembleConfig,
    source: &mut S,
) -> Result<FrequencyEnsemble> {
    config.validate()?;
    let n = config.trials.trials;
    let p = config.trials.success_probability;
    let mut paths = Vec::with_capacity(config.kept_paths.min(config.trajectories as usize));
    let mut final_frequencies = Vec::with_capacity(config.trajectories as usize);

    for i in 0..config.trajectories {
        if (i as usize) < config.kept_paths {
            let path = running_frequency(&config.trials, source)?;
            final_frequencies.push(path.final_value().unwrap_or(0.0));
            paths.push(path);
        } else {
            let successes = (0..n).filter(|_| source.bernoulli(p)).count();
            let freq = if n == 0 {
                0.0
            } else {
                successes as f64 / n as f64
            };
            final_frequencies.push(freq);
        }
    }
    Ok(FrequencyEnsemble {
        paths,
        final_frequencies,
    })
}

// ============================================================================
// Histograms
// ============================================================================

/// One bin of a [`ScoreHistogram`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBin {
    /// Final score `2k − n`.
    pub score: i64,
    /// Number of successes `k`.
    pub successes: u64,
    /// Walks that ended at this score.
    pub observed: u64,
    /// `m · P(Bin(n, p) = k)`.
    pub expected: f64,
}

/// Final random-walk scores against the scaled binomial law.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreHistogram {
    pub bins: Vec<ScoreBin>,
    /// Scores that cannot come from an `n`-step walk (wrong parity or
    /// `|score| > n`).
    pub ignored: u64,
}

impl ScoreHistogram {
    /// Number of scores that landed in a bin.
    pub fn total_observed(&self) -> u64 {
        self.bins.iter().map(|b| b.observed).sum()
    }

    /// Sum of the expected curve.
    pub fn total_expected(&self) -> f64 {
        self.bins.iter().map(|b| b.expected).sum()
    }
}

/// Bins `final_scores` of `trials`-step walks by success count.
///
/// A score `s` comes from `k = (s + n) / 2` successes. The expected curve
/// is scaled by the number of scores supplied.
///
/// # Errors
/// `InvalidArgument` if `p` is outside `[0, 1]` or `trials` does not fit
/// in an `i64`.
pub fn score_histogram(
    final_scores: &[i64],
    trials: u64,
    p: f64,
    cache: &mut LogFactorialCache,
) -> Result<ScoreHistogram> {
    check_probability(p)?;
    let n = i64::try_from(trials).map_err(|_| {
        KernelError::InvalidArgument(format!("trial count {trials} is too large"))
    })?;
    let table = cache.binomial_table(n, p)?;
    let expected = table.scaled(final_scores.len() as u64);

    let mut observed = vec![0_u64; expected.len()];
    let mut ignored = 0_u64;
    for &score in final_scores {
        let shifted = score.checked_add(n);
        match shifted {
            Some(s) if s >= 0 && s % 2 == 0 && s / 2 <= n => observed[(s / 2) as usize] += 1,
            _ => ignored += 1,
        }
    }

    let bins = observed
        .into_iter()
        .zip(expected)
        .enumerate()
        .map(|(k, (obs, exp))| ScoreBin {
            score: 2 * k as i64 - n,
            successes: k as u64,
            observed: obs,
            expected: exp,
        })
        .collect();
    Ok(ScoreHistogram { bins, ignored })
}

/// Equal-width histogram of real values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    min: f64,
    bin_width: f64,
    counts: Vec<u64>,
}

impl Histogram {
    /// Bins `values` into `max(10, ⌈√len⌉)` equal-width bins spanning
    /// `[min, max]`. The maximum lands in the last bin. If every value is
    /// identical the range is widened to `[v − 0.01, v + 0.01]`.
    ///
    /// # Errors
    /// `InsufficientData` on empty input, `InvalidValue` on non-finite input,
    /// `InvalidArgument` when the range is too wide (or too close to the
    /// `f64` limits) for finite, non-zero bin widths.
    ///
    /// # Examples
    /// ```
    /// use u_probkit::trajectory::Histogram;
    /// let h = Histogram::equal_width(&[0.0, 0.5, 1.0]).unwrap();
    /// assert_eq!(h.counts().len(), 10);
    /// assert_eq!(h.total(), 3);
    /// assert_eq!(h.counts()[9], 1);
    /// ```
    pub fn equal_width(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(KernelError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(KernelError::InvalidValue(bad));
        }

        let num_bins = ((values.len() as f64).sqrt().ceil() as usize).max(10);
        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            min -= 0.01;
            max += 0.01;
        }
        let bin_width = (max - min) / num_bins as f64;
        if !(bin_width.is_finite() && bin_width > 0.0) {
            return Err(KernelError::InvalidArgument(format!(
                "value range [{min}, {max}] cannot be split into {num_bins} finite bins"
            )));
        }

        let mut counts = vec![0_u64; num_bins];
        for &v in values {
            let idx = (((v - min) / bin_width).floor() as usize).min(num_bins - 1);
            counts[idx] += 1;
        }
        Ok(Self {
            min,
            bin_width,
            counts,
        })
    }

    /// Count per bin, left to right.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Common width of every bin.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Left edge of the first bin.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Number of values binned.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(left edge, count)` per bin.
    pub fn bins(&self) -> Vec<(f64, u64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.min + i as f64 * self.bin_width, c))
            .collect()
    }

    /// Expected count per bin under `density`, evaluated at bin centres.
    pub fn expected_counts<F: Fn(f64) -> f64>(&self, density: F) -> Vec<f64> {
        let total = self.total() as f64;
        (0..self.counts.len())
            .map(|i| {
                let centre = self.min + (i as f64 + 0.5) * self.bin_width;
                total * self.bin_width * density(centre)
            })
            .collect()
    }
}

/// Limiting density of the final frequency `f_n`: N(p, p(1 − p)/n).
///
/// # Errors
/// `InvalidArgument` if `trials == 0` or `p` is not strictly inside
/// `(0, 1)` (the limit is degenerate there).
///
/// # Examples
/// ```
/// use u_probkit::trajectory::clt_reference_density;
/// let peak = clt_reference_density(0.5, 100, 0.5).unwrap();
/// assert!((peak - 7.978845608).abs() < 1e-6);
/// ```
pub fn clt_reference_density(x: f64, trials: u64, p: f64) -> Result<f64> {
    if trials == 0 {
        return Err(KernelError::InvalidArgument(
            "trial count must be positive".into(),
        ));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(KernelError::InvalidArgument(format!(
            "CLT density needs 0 < p < 1, got {p}"
        )));
    }
    let sd = (p * (1.0 - p) / trials as f64).sqrt();
    Ok(normal_pdf(x, p, sd))
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn poisson_path_well_formed(
            seed in 0_u64..10_000,
            rate in 0.0_f64..100.0,
            steps in 101_u64..3000,
            horizon in 0.1_f64..10.0,
        ) {
            let config = PoissonPathConfig::new(rate, steps, horizon).unwrap();
            let path = poisson_path(&config, &mut create_rng(seed)).unwrap();
            prop_assert_eq!(path.first().copied(), Some(PathPoint::new(0.0, 0.0)));
            prop_assert_eq!(path.last().unwrap().position, horizon);
            for w in path.points().windows(2) {
                prop_assert!(w[0].position < w[1].position);
                prop_assert!(w[0].value <= w[1].value);
            }
        }

        #[test]
        fn walk_steps_are_unit(seed in 0_u64..10_000, n in 1_u64..300, p in 0.0_f64..=1.0) {
            let config = BernoulliTrials::new(n, p).unwrap();
            let walk = random_walk(&config, &mut create_rng(seed)).unwrap();
            let values: Vec<f64> = walk.values().collect();
            prop_assert_eq!(values.len() as u64, n);
            prop_assert!(values[0] == 1.0 || values[0] == -1.0);
            for w in values.windows(2) {
                prop_assert_eq!((w[1] - w[0]).abs(), 1.0);
            }
        }

        #[test]
        fn seeded_generation_reproducible(seed in 0_u64..10_000) {
            let config = BernoulliTrials::symmetric(64);
            let a = random_walk(&config, &mut create_rng(seed)).unwrap();
            let b = random_walk(&config, &mut create_rng(seed)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn histogram_conserves_count(
            values in proptest::collection::vec(-1e3_f64..1e3, 1..500)
        ) {
            let h = Histogram::equal_width(&values).unwrap();
            prop_assert_eq!(h.total(), values.len() as u64);
        }
    }
}
