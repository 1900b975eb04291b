//! Injectable uniform random sources.
//!
//! Every simulation in this crate draws its randomness through the
//! [`UniformSource`] trait, so callers decide between a real generator,
//! a seeded one, or a fully scripted sequence.
//!
//! # Reproducibility
//!
//! For reproducible experiments, use [`create_rng`] with a fixed seed.
//! The underlying algorithm (SmallRng) is deterministic for a given seed
//! on the same platform.

use rand::rngs::{SmallRng, StdRng, ThreadRng};
use rand::Rng;

use crate::error::{KernelError, Result};

/// A source of uniform draws on `[0, 1)`.
pub trait UniformSource {
    /// Returns the next draw, in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Bernoulli trial: `true` with probability `p`.
    ///
    /// Uses the `u < p` comparison, so `p = 0` never succeeds and `p = 1`
    /// always does.
    fn bernoulli(&mut self, p: f64) -> bool {
        self.next_uniform() < p
    }
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

impl UniformSource for SmallRng {
    fn next_uniform(&mut self) -> f64 {
        self.random()
    }
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.random()
    }
}

impl UniformSource for ThreadRng {
    fn next_uniform(&mut self) -> f64 {
        self.random()
    }
}

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++) for high performance.
/// The sequence is deterministic for a given seed on the same platform.
///
/// # Examples
/// ```
/// use u_probkit::random::{create_rng, UniformSource};
/// let mut rng = create_rng(42);
/// let x = rng.next_uniform();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    use rand::SeedableRng;
    SmallRng::seed_from_u64(seed)
}

/// Replays a fixed cycle of uniform values.
///
/// Once the script is exhausted it starts over from the first value.
///
/// # Examples
/// ```
/// use u_probkit::random::{ScriptedUniform, UniformSource};
/// let mut src = ScriptedUniform::new(vec![0.1, 0.9]).unwrap();
/// assert_eq!(src.next_uniform(), 0.1);
/// assert_eq!(src.next_uniform(), 0.9);
/// assert_eq!(src.next_uniform(), 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedUniform {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedUniform {
    /// Creates a scripted source.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `values` is empty or any value lies
    /// outside `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(KernelError::InvalidArgument(
                "scripted source needs at least one value".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(KernelError::InvalidArgument(format!(
                "scripted values must lie in [0, 1), got {bad}"
            )));
        }
        Ok(Self { values, cursor: 0 })
    }

    /// Number of draws handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedUniform {
    fn next_uniform(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

// ============================================================================
// Tests
// ============================================================================
