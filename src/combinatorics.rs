//! Log-space combinatorics and the binomial distribution.
//!
//! Factorials overflow `f64` past 170!, so everything here works with
//! `ln(n!)` and only exponentiates the final log-probability.
//!
//! # Algorithm
//! `ln(n!)` is built incrementally as `Σ ln(i)` and cached; extending the
//! cache from index K to n costs O(n − K) and earlier entries are never
//! recomputed.
//!
//! ```text
//! ln C(n, k)  = ln n! − ln k! − ln (n−k)!
//! P(X = k)    = exp( ln C(n, k) + k·ln p + (n−k)·ln(1−p) )
//! ```

use crate::error::{KernelError, Result};

/// Append-only cache of `ln(i!)` for `i = 0..len()`.
///
/// Entries are immutable once written; the cache only grows.
///
/// # Examples
/// ```
/// use u_probkit::combinatorics::LogFactorialCache;
/// let mut cache = LogFactorialCache::new();
/// assert!((cache.log_factorial(5).unwrap() - 120.0_f64.ln()).abs() < 1e-12);
/// let c = cache.log_combinations(30, 15).unwrap().exp();
/// assert!((c - 155_117_520.0).abs() / 155_117_520.0 < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct LogFactorialCache {
    entries: Vec<f64>,
}

impl Default for LogFactorialCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFactorialCache {
    /// Creates a cache holding only `ln(0!) = 0`.
    pub fn new() -> Self {
        Self { entries: vec![0.0] }
    }

    /// Number of cached entries (the cache covers `0..len()`).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: `ln(0!)` is cached from construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `ln(n!)` if it is already cached.
    pub fn get(&self, n: usize) -> Option<f64> {
        self.entries.get(n).copied()
    }

    /// Grows the cache so that it covers index `n`.
    ///
    /// Does nothing if `n` is already cached.
    ///
    /// # Errors
    /// `InvalidArgument` if a table of `n + 1` entries cannot be allocated;
    /// the cache is left as it was.
    pub fn extend_to(&mut self, n: usize) -> Result<()> {
        if n < self.entries.len() {
            return Ok(());
        }
        let too_large = || {
            KernelError::InvalidArgument(format!("log-factorial table up to {n} is too large"))
        };
        let additional = (n - self.entries.len()).checked_add(1).ok_or_else(too_large)?;
        self.entries.try_reserve(additional).map_err(|_| too_large())?;
        let mut sum = self.entries[self.entries.len() - 1];
        for i in self.entries.len()..=n {
            sum += (i as f64).ln();
            self.entries.push(sum);
        }
        Ok(())
    }

    /// Returns `ln(n!)`, extending the cache if needed.
    ///
    /// # Errors
    /// `InvalidArgument` if `n < 0` or the table up to `n` cannot be
    /// allocated.
    pub fn log_factorial(&mut self, n: i64) -> Result<f64> {
        let idx = to_index(n, "n")?;
        self.extend_to(idx)?;
        Ok(self.entries[idx])
    }

    /// Returns `ln C(n, k)`.
    ///
    /// An impossible selection (`k < 0` or `k > n`) is not an error: it
    /// has zero ways, so the result is `-∞`.
    ///
    /// # Errors
    /// `InvalidArgument` if `n < 0`.
    pub fn log_combinations(&mut self, n: i64, k: i64) -> Result<f64> {
        let n_idx = to_index(n, "n")?;
        if k < 0 || k > n {
            return Ok(f64::NEG_INFINITY);
        }
        self.extend_to(n_idx)?;
        let k_idx = k as usize;
        Ok(self.entries[n_idx] - self.entries[k_idx] - self.entries[n_idx - k_idx])
    }

    /// Binomial probability mass `P(X = k)` for `X ~ Bin(n, p)`.
    ///
    /// `p = 0` and `p = 1` are point masses at `k = 0` and `k = n`
    /// respectively, so `ln 0` never leaks into a non-zero bin.
    /// Out-of-range `k` has probability 0.
    ///
    /// # Errors
    /// `InvalidArgument` if `n < 0` or `p` is not in `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use u_probkit::combinatorics::LogFactorialCache;
    /// let mut cache = LogFactorialCache::new();
    /// let p = cache.binomial_pmf(10, 5, 0.5).unwrap();
    /// assert!((p - 252.0 / 1024.0).abs() < 1e-12);
    /// assert_eq!(cache.binomial_pmf(10, 0, 0.0).unwrap(), 1.0);
    /// ```
    pub fn binomial_pmf(&mut self, n: i64, k: i64, p: f64) -> Result<f64> {
        to_index(n, "n")?;
        check_probability(p)?;
        if k < 0 || k > n {
            return Ok(0.0);
        }
        if p == 0.0 {
            return Ok(if k == 0 { 1.0 } else { 0.0 });
        }
        if p == 1.0 {
            return Ok(if k == n { 1.0 } else { 0.0 });
        }
        let log_c = self.log_combinations(n, k)?;
        let log_prob = log_c + k as f64 * p.ln() + (n - k) as f64 * (-p).ln_1p();
        Ok(log_prob.exp())
    }

    /// Full `Bin(n, p)` table, `P(k)` for every `k` in `[0, n]`.
    ///
    /// # Errors
    /// Same as [`binomial_pmf`](Self::binomial_pmf).
    pub fn binomial_table(&mut self, n: i64, p: f64) -> Result<BinomialDistributionTable> {
        let n_idx = to_index(n, "n")?;
        check_probability(p)?;
        self.extend_to(n_idx)?;
        let probabilities = (0..=n)
            .map(|k| self.binomial_pmf(n, k, p))
            .collect::<Result<Vec<f64>>>()?;
        Ok(BinomialDistributionTable {
            n: n as u64,
            p,
            probabilities,
        })
    }
}

/// Probability mass of `Bin(n, p)` over `k = 0..=n`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinomialDistributionTable {
    n: u64,
    p: f64,
    probabilities: Vec<f64>,
}

impl BinomialDistributionTable {
    /// Number of trials `n`.
    pub fn trials(&self) -> u64 {
        self.n
    }

    /// Success probability `p`.
    pub fn success_probability(&self) -> f64 {
        self.p
    }

    /// `P(X = k)`; zero outside `[0, n]`.
    pub fn probability(&self, k: i64) -> f64 {
        usize::try_from(k)
            .ok()
            .and_then(|i| self.probabilities.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Probabilities indexed by `k`.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// `(k, P(k))` pairs in ascending `k`.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(k, &p)| (k as u64, p))
    }

    /// Σ P(k); 1 up to rounding.
    pub fn total_mass(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Σ k·P(k); equals `n·p` up to rounding.
    pub fn mean(&self) -> f64 {
        self.iter().map(|(k, p)| k as f64 * p).sum()
    }

    /// Expected count per `k` over `m` independent experiments.
    pub fn scaled(&self, m: u64) -> Vec<f64> {
        let m = m as f64;
        self.probabilities.iter().map(|p| p * m).collect()
    }
}

fn to_index(n: i64, name: &str) -> Result<usize> {
    usize::try_from(n).map_err(|_| {
        KernelError::InvalidArgument(format!("{name} must be non-negative, got {n}"))
    })
}

pub(crate) fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(KernelError::InvalidArgument(format!(
            "probability must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
