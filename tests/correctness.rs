//! Cross-module correctness tests for u-probkit
//!
//! These exercise the kernels the way a demo front-end drives them: several
//! modules chained together, seeded randomness, and the invariants the
//! rendered charts rely on.
//!
//! Run with: cargo test --test correctness

use u_probkit::cipher::{caesar_shift, find_shift_key, letter_distribution};
use u_probkit::combinatorics::LogFactorialCache;
use u_probkit::modular::mod_pow;
use u_probkit::moments::StreamingMomentEstimator;
use u_probkit::random::{create_rng, ScriptedUniform};
use u_probkit::rsa::{decrypt_numbers, encrypt_letters, frequency_attack, ToyRsaKey};
use u_probkit::trajectory::{
    clt_reference_density, poisson_path, random_walk, running_frequency, score_histogram,
    simulate_frequency_ensemble, simulate_walk_ensemble, BernoulliTrials, EnsembleConfig,
    Histogram, PoissonPathConfig,
};
use u_probkit::KernelError;

// ============================================================================
// Streaming moments
// ============================================================================

mod moments {
    use super::*;

    #[test]
    fn welford_reference_stream() {
        let mut est = StreamingMomentEstimator::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            est.accumulate(x).unwrap();
        }
        assert_eq!(est.count(), 8);
        assert!((est.mean().unwrap() - 5.0).abs() < 1e-12);
        assert!((est.population_variance().unwrap() - 4.0).abs() < 1e-12);
        assert!((est.sample_variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single_sample() {
        let mut est = StreamingMomentEstimator::new();
        assert_eq!(est.mean(), None);
        assert!(matches!(
            est.population_variance(),
            Err(KernelError::InsufficientData { required: 1, available: 0 })
        ));

        est.accumulate(3.5).unwrap();
        assert_eq!(est.population_variance(), Ok(0.0));
        assert!(matches!(
            est.sample_variance(),
            Err(KernelError::InsufficientData { required: 2, available: 1 })
        ));
    }

    #[test]
    fn random_button_stream_is_uniform_like() {
        // 10_000 draws of 100·U[0,1): mean ≈ 50, variance ≈ 10_000 / 12
        let mut est = StreamingMomentEstimator::new();
        est.accumulate_uniform(10_000, 100.0, &mut create_rng(42)).unwrap();
        assert_eq!(est.count(), 10_000);
        assert!((est.mean().unwrap() - 50.0).abs() < 1.5);
        assert!((est.population_variance().unwrap() - 833.33).abs() < 40.0);
    }

    #[test]
    fn rejected_value_leaves_snapshot_unchanged() {
        let mut est = StreamingMomentEstimator::new();
        est.accumulate_all([1.0, 2.0, 3.0]).unwrap();
        let before = est.snapshot();
        assert!(est.accumulate(f64::NAN).is_err());
        assert!(est.accumulate_all([4.0, f64::NEG_INFINITY]).is_err());
        assert_eq!(est.snapshot(), before);
    }

    #[test]
    fn reset_then_reuse() {
        let mut est = StreamingMomentEstimator::new();
        est.accumulate_all([10.0, 20.0]).unwrap();
        est.reset();
        assert_eq!(est.count(), 0);
        est.accumulate(7.0).unwrap();
        assert_eq!(est.mean(), Some(7.0));
    }
}

// ============================================================================
// Modular arithmetic and toy RSA
// ============================================================================

mod rsa {
    use super::*;

    #[test]
    fn mod_pow_reference_and_edges() {
        assert_eq!(mod_pow(4, 13, 497), Ok(445));
        assert_eq!(mod_pow(5, 0, 1), Ok(0));
        assert!(mod_pow(2, -1, 7).is_err());
        assert!(mod_pow(2, 3, 0).is_err());
    }

    #[test]
    fn demo_key_roundtrip_on_prose() {
        let key = ToyRsaKey::demo();
        let plain = "il criptosistema rsa cifra ogni lettera separatamente";
        let cipher = encrypt_letters(plain, &key).unwrap();
        let letters: String = plain.chars().filter(|c| c.is_ascii_lowercase()).collect();
        assert_eq!(decrypt_numbers(&cipher, &key).unwrap(), letters);
    }

    #[test]
    fn attack_maps_most_frequent_symbol_to_e() {
        let key = ToyRsaKey::demo();
        let plain = "e le sere belle e le vele e le stelle";
        let cipher = encrypt_letters(plain, &key).unwrap();
        let attack = frequency_attack(&cipher);

        let e_symbol = key.encrypt('e' as i64).unwrap();
        assert_eq!(attack.mapping[&e_symbol], 'e');
        assert_eq!(attack.decoded.chars().count(), cipher.len());
    }
}

// ============================================================================
// Caesar cipher
// ============================================================================

mod caesar {
    use super::*;

    const PROSE: &str = "Considerate la vostra semenza: fatti non foste a viver come bruti, \
        ma per seguir virtute e canoscenza. Li miei compagni fec'io si aguti, \
        con questa orazion picciola, al cammino, che a pena poscia li avrei ritenuti.";

    #[test]
    fn encrypt_then_recover_shift() {
        for shift in [1, 3, 13, 25, -4, 40] {
            let cipher = caesar_shift(PROSE, shift);
            let est = find_shift_key(&cipher);
            assert_eq!(est.shift as i64, shift.rem_euclid(26));
            assert_eq!(est.decrypt(&cipher), PROSE);
        }
    }

    #[test]
    fn distribution_is_shift_invariant_up_to_rotation() {
        let plain = letter_distribution(PROSE);
        let cipher = letter_distribution(&caesar_shift(PROSE, 11));
        assert_eq!(plain.total(), cipher.total());
        let mut sorted_plain = *plain.counts();
        let mut sorted_cipher = *cipher.counts();
        sorted_plain.sort_unstable();
        sorted_cipher.sort_unstable();
        assert_eq!(sorted_plain, sorted_cipher);
    }
}

// ============================================================================
// Combinatorics
// ============================================================================

mod combinatorics {
    use super::*;

    #[test]
    fn binomial_table_is_a_distribution() {
        let mut cache = LogFactorialCache::new();
        for (n, p) in [(10, 0.5), (100, 0.3), (1000, 0.01), (5000, 0.5)] {
            let table = cache.binomial_table(n, p).unwrap();
            assert!((table.total_mass() - 1.0).abs() < 1e-9, "n={n} p={p}");
            assert!((table.mean() - n as f64 * p).abs() < 1e-6 * n as f64, "n={n} p={p}");
        }
    }

    #[test]
    fn huge_factorials_stay_finite() {
        let mut cache = LogFactorialCache::new();
        let lf = cache.log_factorial(100_000).unwrap();
        assert!(lf.is_finite() && lf > 0.0);
        assert!(cache.len() > 100_000);
        let pmf = cache.binomial_pmf(100_000, 50_000, 0.5).unwrap();
        assert!(pmf > 0.0 && pmf < 0.01);
    }

    #[test]
    fn out_of_range_and_degenerate() {
        let mut cache = LogFactorialCache::new();
        assert_eq!(cache.log_combinations(5, 6).unwrap(), f64::NEG_INFINITY);
        assert_eq!(cache.binomial_pmf(5, 6, 0.5).unwrap(), 0.0);
        assert_eq!(cache.binomial_pmf(5, 0, 0.0).unwrap(), 1.0);
        assert_eq!(cache.binomial_pmf(5, 5, 1.0).unwrap(), 1.0);
        assert!(cache.binomial_pmf(5, 2, 1.5).is_err());
        assert!(cache.log_factorial(-1).is_err());
    }

    #[test]
    fn unallocatable_cache_growth_is_recoverable() {
        let mut cache = LogFactorialCache::new();
        assert!(matches!(
            cache.log_factorial(i64::MAX),
            Err(KernelError::InvalidArgument(_))
        ));
        assert!(cache.binomial_table(i64::MAX, 0.5).is_err());
        let table = cache.binomial_table(10, 0.5).unwrap();
        assert!((table.total_mass() - 1.0).abs() < 1e-12);
    }
}

// ============================================================================
// Trajectories
// ============================================================================

mod trajectories {
    use super::*;

    #[test]
    fn poisson_default_demo() {
        let mut rng = create_rng(1);
        let path = poisson_path(&PoissonPathConfig::default(), &mut rng).unwrap();
        let pts = path.xy_pairs();
        assert_eq!(pts[0], (0.0, 0.0));
        assert_eq!(pts.last().unwrap().0, 1.0);
        assert!(pts.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn poisson_rate_too_large() {
        let config = PoissonPathConfig {
            rate: 10.0,
            steps: 10,
            horizon: 1.0,
        };
        assert!(matches!(
            poisson_path(&config, &mut create_rng(1)),
            Err(KernelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn scripted_walk_and_frequency_agree() {
        let draws = vec![0.1, 0.8, 0.4, 0.6, 0.2];
        let trials = BernoulliTrials::symmetric(5);
        let walk = random_walk(&trials, &mut ScriptedUniform::new(draws.clone()).unwrap()).unwrap();
        let freq = running_frequency(&trials, &mut ScriptedUniform::new(draws).unwrap()).unwrap();
        // score = 2·successes − n at every step
        for (i, (w, f)) in walk.values().zip(freq.values()).enumerate() {
            let n = (i + 1) as f64;
            assert!((w - (2.0 * f * n - n)).abs() < 1e-12);
        }
    }

    #[test]
    fn walk_ensemble_histogram_sums_to_m() {
        let mut rng = create_rng(2);
        let mut cache = LogFactorialCache::new();
        let config = EnsembleConfig::new(1000, BernoulliTrials::symmetric(100), 30).unwrap();
        let ens = simulate_walk_ensemble(&config, &mut rng).unwrap();
        assert_eq!(ens.paths.len(), 30);

        let h = score_histogram(&ens.final_scores, 100, 0.5, &mut cache).unwrap();
        assert_eq!(h.ignored, 0);
        assert_eq!(h.total_observed(), 1000);
        assert!((h.total_expected() - 1000.0).abs() < 1e-6);
        assert_eq!(h.bins.len(), 101);
    }

    #[test]
    fn lln_ensemble_concentrates_around_p() {
        let mut rng = create_rng(3);
        let trials = BernoulliTrials::new(500, 0.5).unwrap();
        let config = EnsembleConfig::new(100, trials, 30).unwrap();
        let ens = simulate_frequency_ensemble(&config, &mut rng).unwrap();

        let h = Histogram::equal_width(&ens.final_frequencies).unwrap();
        assert_eq!(h.counts().len(), 10);
        assert_eq!(h.total(), 100);

        let mut est = StreamingMomentEstimator::new();
        est.accumulate_all(ens.final_frequencies.iter().copied()).unwrap();
        // Var(f_n) = p(1 − p)/n = 0.0005
        assert!((est.mean().unwrap() - 0.5).abs() < 0.01);
        assert!((est.sample_variance().unwrap() - 0.0005).abs() < 0.0003);

        let peak = clt_reference_density(0.5, 500, 0.5).unwrap();
        assert!(peak > clt_reference_density(0.55, 500, 0.5).unwrap());
    }
}

// ============================================================================
// Serde
// ============================================================================

#[cfg(feature = "serde")]
mod serde_roundtrip {
    use super::*;
    use u_probkit::moments::MomentAccumulator;

    #[test]
    fn configs_roundtrip_through_json() {
        let config = PoissonPathConfig::new(20.0, 500, 2.0).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: PoissonPathConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);

        let ensemble = EnsembleConfig::default();
        let json = serde_json::to_string(&ensemble).unwrap();
        let back: EnsembleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(ensemble, back);
    }

    #[test]
    fn snapshot_restores_estimator() {
        let mut est = StreamingMomentEstimator::new();
        est.accumulate_all([1.0, 2.0, 4.0]).unwrap();
        let json = serde_json::to_string(&est.snapshot()).unwrap();
        let snap: MomentAccumulator = serde_json::from_str(&json).unwrap();
        let restored = StreamingMomentEstimator::from(snap);
        assert_eq!(restored.snapshot(), est.snapshot());
    }
}
