//! # u-probkit
//!
//! Numerical kernels for probability and statistics teaching demos.
//!
//! This crate computes; it does not draw. Charts, forms, and navigation
//! live in the caller, which feeds inputs in and renders the paths,
//! tables, and histograms that come back out.
//!
//! ## Modules
//!
//! - [`moments`]: Streaming mean/variance (Welford)
//! - [`modular`]: Modular exponentiation with overflow-free intermediates
//! - [`combinatorics`]: Cached log-factorials, log-binomials, binomial PMF
//! - [`trajectory`]: Poisson paths, random walks, running frequencies,
//!   ensembles and histograms
//! - [`special`]: ln Γ, normal density/CDF, incomplete gamma, χ²
//! - [`random`]: Injectable uniform sources and seeded RNGs
//! - [`cipher`]: Caesar cipher and χ² shift recovery
//! - [`rsa`]: Per-letter toy RSA and its frequency attack
//! - [`error`]: Shared error type
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: two-delta Welford updates, log-space
//!   binomials, `u128` modular products
//! - **Injected randomness**: every simulation takes a [`random::UniformSource`],
//!   so tests can script the draws
//! - **Validate, then mutate**: a rejected input never changes state
//! - **Property-based testing**: Mathematical invariants verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_probkit::moments::StreamingMomentEstimator;
//!
//! let mut est = StreamingMomentEstimator::new();
//! est.accumulate_all([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
//! assert!((est.mean().unwrap() - 5.0).abs() < 1e-12);
//! assert!((est.population_variance().unwrap() - 4.0).abs() < 1e-12);
//! ```

pub mod cipher;
pub mod combinatorics;
pub mod error;
pub mod modular;
pub mod moments;
pub mod random;
pub mod rsa;
pub mod special;
pub mod trajectory;

pub use error::{KernelError, Result};
