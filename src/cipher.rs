//! Caesar cipher and letter-frequency analysis.
//!
//! # Shift recovery
//! For each candidate shift `s` in `0..26` the ciphertext letter counts are
//! compared against Italian reference frequencies with Pearson's statistic
//!
//! ```text
//! χ²(s) = Σ_c (O_c − E_c)² / E_c,   E_c = f[(c − s) mod 26] · N
//! ```
//!
//! and the shift with the smallest χ² wins. The reference table has no
//! zero entries, so every `E_c` is strictly positive.
//!
//! Reference: Pearson (1900), *Phil. Mag.* 50(302), 157-175.

use crate::special::chi_squared_sf;

/// Letters in the Latin alphabet.
pub const ALPHABET_LEN: usize = 26;

/// Italian letter frequencies in percent, indexed `a..=z`.
///
/// Letters foreign to Italian (j, k, w, x, y) carry a token 0.01% so the
/// χ² statistic stays finite.
pub const ITALIAN_FREQUENCIES: [f64; ALPHABET_LEN] = [
    11.74, // a
    0.92,  // b
    4.50,  // c
    3.73,  // d
    11.79, // e
    0.95,  // f
    1.64,  // g
    1.54,  // h
    11.28, // i
    0.01,  // j
    0.01,  // k
    6.51,  // l
    2.51,  // m
    6.88,  // n
    9.83,  // o
    3.05,  // p
    0.51,  // q
    6.37,  // r
    4.98,  // s
    5.62,  // t
    3.01,  // u
    2.10,  // v
    0.01,  // w
    0.01,  // x
    0.01,  // y
    0.49,  // z
];

/// Degrees of freedom of the 26-cell goodness-of-fit test.
const FIT_DEGREES_OF_FREEDOM: f64 = (ALPHABET_LEN - 1) as f64;

/// Shifts every ASCII letter by `shift` positions, wrapping within its case.
///
/// Any integer shift is accepted and reduced modulo 26, so negative shifts
/// decrypt. Non-letters (including non-ASCII characters) pass through.
///
/// # Examples
/// ```
/// use u_probkit::cipher::caesar_shift;
/// assert_eq!(caesar_shift("Ciao, Mondo!", 3), "Fldr, Prqgr!");
/// assert_eq!(caesar_shift("abc", -1), "zab");
/// assert_eq!(caesar_shift("xyz", 29), "abc");
/// ```
pub fn caesar_shift(text: &str, shift: i64) -> String {
    let k = shift.rem_euclid(ALPHABET_LEN as i64) as u8;
    text.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                rotate(c, b'A', k)
            } else if c.is_ascii_lowercase() {
                rotate(c, b'a', k)
            } else {
                c
            }
        })
        .collect()
}

fn rotate(c: char, base: u8, k: u8) -> char {
    let offset = (c as u8 - base + k) % ALPHABET_LEN as u8;
    (base + offset) as char
}

/// Case-insensitive counts of the letters `a..=z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LetterDistribution {
    counts: [u64; ALPHABET_LEN],
}

impl LetterDistribution {
    /// Counts `text`; anything outside `a..=z` / `A..=Z` is ignored.
    pub fn from_text(text: &str) -> Self {
        let mut counts = [0_u64; ALPHABET_LEN];
        for c in text.chars().map(|c| c.to_ascii_lowercase()) {
            if c.is_ascii_lowercase() {
                counts[(c as u8 - b'a') as usize] += 1;
            }
        }
        Self { counts }
    }

    /// Count of `letter` (case-insensitive); 0 for non-letters.
    pub fn count(&self, letter: char) -> u64 {
        let c = letter.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            self.counts[(c as u8 - b'a') as usize]
        } else {
            0
        }
    }

    /// Counts indexed `a..=z`.
    pub fn counts(&self) -> &[u64; ALPHABET_LEN] {
        &self.counts
    }

    /// Total number of letters counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(letter, count)` pairs from `a` to `z`, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &n)| ((b'a' + i as u8) as char, n))
    }

    /// Pearson χ² of these counts against Italian after undoing `shift`.
    ///
    /// Returns 0 when no letters were counted.
    pub fn chi_squared_against_italian(&self, shift: u8) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let s = shift as usize % ALPHABET_LEN;
        (0..ALPHABET_LEN)
            .map(|i| {
                let original = (i + ALPHABET_LEN - s) % ALPHABET_LEN;
                let expected = ITALIAN_FREQUENCIES[original] / 100.0 * total;
                let diff = self.counts[i] as f64 - expected;
                diff * diff / expected
            })
            .sum()
    }
}

/// Case-insensitive letter counts of `text`.
pub fn letter_distribution(text: &str) -> LetterDistribution {
    LetterDistribution::from_text(text)
}

/// Best-fitting Caesar shift for a ciphertext.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftEstimate {
    /// Recovered encryption shift in `0..26`.
    pub shift: u8,
    /// χ² statistic at that shift.
    pub chi_squared: f64,
    /// Upper-tail probability of `chi_squared` on 25 degrees of freedom.
    pub p_value: f64,
    /// Number of letters the estimate is based on.
    pub letters: u64,
}

impl ShiftEstimate {
    /// Undoes the recovered shift.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        caesar_shift(ciphertext, -(self.shift as i64))
    }
}

/// Recovers the Caesar shift of `ciphertext` by minimum χ² against Italian.
///
/// Ties keep the smallest shift. A ciphertext with no letters yields shift
/// 0 with χ² 0 and p-value 1.
///
/// # Examples
/// ```
/// use u_probkit::cipher::{caesar_shift, find_shift_key};
/// let plain = "nel mezzo del cammin di nostra vita mi ritrovai per una selva oscura";
/// let est = find_shift_key(&caesar_shift(plain, 7));
/// assert_eq!(est.shift, 7);
/// assert_eq!(est.decrypt(&caesar_shift(plain, 7)), plain);
/// ```
pub fn find_shift_key(ciphertext: &str) -> ShiftEstimate {
    let dist = LetterDistribution::from_text(ciphertext);
    let letters = dist.total();
    if letters == 0 {
        return ShiftEstimate {
            shift: 0,
            chi_squared: 0.0,
            p_value: 1.0,
            letters,
        };
    }

    let mut best_shift = 0_u8;
    let mut best_chi = f64::INFINITY;
    for shift in 0..ALPHABET_LEN as u8 {
        let chi = dist.chi_squared_against_italian(shift);
        if chi < best_chi {
            best_chi = chi;
            best_shift = shift;
        }
    }

    ShiftEstimate {
        shift: best_shift,
        chi_squared: best_chi,
        p_value: chi_squared_sf(best_chi, FIT_DEGREES_OF_FREEDOM),
        letters,
    }
}
