//! Letter-by-letter toy RSA and its frequency attack.
//!
//! Encrypting each letter on its own turns RSA into a substitution cipher:
//! equal letters give equal ciphertext numbers, so the letter frequencies of
//! the plaintext survive encryption. [`frequency_attack`] exploits exactly
//! that by matching ciphertext symbols to Italian letters rank by rank.
//!
//! The attack is a heuristic. Symbols whose counts tie, or whose rank does
//! not match the language table, decode to the wrong letter.

use std::collections::BTreeMap;

use crate::cipher::{ALPHABET_LEN, ITALIAN_FREQUENCIES};
use crate::error::{KernelError, Result};
use crate::modular::mod_pow;

/// Placeholder for ciphertext symbols the attack cannot assign.
pub const UNKNOWN_SYMBOL: char = '?';

/// An RSA key pair small enough to encrypt single ASCII letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToyRsaKey {
    modulus: i64,
    public_exponent: i64,
    private_exponent: i64,
}

impl ToyRsaKey {
    /// The classroom key: `n = 13 × 17 = 221`, `e = 5`, `d = 77`.
    pub const fn demo() -> Self {
        Self {
            modulus: 221,
            public_exponent: 5,
            private_exponent: 77,
        }
    }

    /// Builds a key and checks that it round-trips every lowercase letter.
    ///
    /// # Errors
    /// `InvalidArgument` if the modulus cannot hold the code of `'z'`, an
    /// exponent is not positive, or `d` does not invert `e` on `a..=z`.
    ///
    /// # Examples
    /// ```
    /// use u_probkit::rsa::ToyRsaKey;
    /// // p = 11, q = 23, φ = 220, 3 × 147 = 441 ≡ 1
    /// assert!(ToyRsaKey::new(253, 3, 147).is_ok());
    /// assert!(ToyRsaKey::new(253, 3, 148).is_err());
    /// ```
    pub fn new(modulus: i64, public_exponent: i64, private_exponent: i64) -> Result<Self> {
        if modulus <= b'z' as i64 {
            return Err(KernelError::InvalidArgument(format!(
                "modulus must exceed {} to encode lowercase letters, got {modulus}",
                b'z'
            )));
        }
        if public_exponent <= 0 || private_exponent <= 0 {
            return Err(KernelError::InvalidArgument(format!(
                "exponents must be positive, got e = {public_exponent}, d = {private_exponent}"
            )));
        }
        let key = Self {
            modulus,
            public_exponent,
            private_exponent,
        };
        for code in b'a'..=b'z' {
            let m = code as i64;
            if key.decrypt(key.encrypt(m)?)? != m {
                return Err(KernelError::InvalidArgument(format!(
                    "private exponent {private_exponent} does not invert e = {public_exponent} \
                     modulo {modulus} (fails on '{}')",
                    code as char
                )));
            }
        }
        Ok(key)
    }

    /// Public modulus `n`.
    pub fn modulus(&self) -> i64 {
        self.modulus
    }

    /// Encryption exponent `e`.
    pub fn public_exponent(&self) -> i64 {
        self.public_exponent
    }

    /// Decryption exponent `d`.
    pub fn private_exponent(&self) -> i64 {
        self.private_exponent
    }

    /// `m^e mod n`.
    pub fn encrypt(&self, m: i64) -> Result<i64> {
        mod_pow(m, self.public_exponent, self.modulus)
    }

    /// `c^d mod n`.
    pub fn decrypt(&self, c: i64) -> Result<i64> {
        mod_pow(c, self.private_exponent, self.modulus)
    }
}

impl Default for ToyRsaKey {
    fn default() -> Self {
        Self::demo()
    }
}

/// Encrypts each lowercase ASCII letter of `text` by its character code.
///
/// Every other character (uppercase, digits, spaces, punctuation) is dropped.
///
/// # Examples
/// ```
/// use u_probkit::rsa::{encrypt_letters, ToyRsaKey};
/// let c = encrypt_letters("ab a", &ToyRsaKey::demo()).unwrap();
/// assert_eq!(c.len(), 3);
/// assert_eq!(c[0], c[2]);
/// ```
pub fn encrypt_letters(text: &str, key: &ToyRsaKey) -> Result<Vec<i64>> {
    text.chars()
        .filter(char::is_ascii_lowercase)
        .map(|c| key.encrypt(c as i64))
        .collect()
}

/// Decrypts numbers produced by [`encrypt_letters`].
///
/// Numbers that do not decrypt to a lowercase letter become
/// [`UNKNOWN_SYMBOL`].
///
/// # Errors
/// `InvalidArgument` for a negative ciphertext number.
pub fn decrypt_numbers(ciphertext: &[i64], key: &ToyRsaKey) -> Result<String> {
    ciphertext
        .iter()
        .map(|&c| {
            let m = key.decrypt(c)?;
            Ok(u8::try_from(m)
                .ok()
                .filter(u8::is_ascii_lowercase)
                .map_or(UNKNOWN_SYMBOL, char::from))
        })
        .collect()
}

/// Occurrences of each ciphertext number, in ascending numeric order.
pub fn number_distribution(ciphertext: &[i64]) -> BTreeMap<i64, u64> {
    let mut dist = BTreeMap::new();
    for &c in ciphertext {
        *dist.entry(c).or_insert(0) += 1;
    }
    dist
}

/// Italian letters from most to least frequent.
///
/// Equal frequencies keep alphabetical order.
pub fn italian_letters_by_frequency() -> [char; ALPHABET_LEN] {
    let mut order: [usize; ALPHABET_LEN] = std::array::from_fn(|i| i);
    order.sort_by(|&a, &b| ITALIAN_FREQUENCIES[b].total_cmp(&ITALIAN_FREQUENCIES[a]));
    order.map(|i| (b'a' + i as u8) as char)
}

/// Result of a rank-matching frequency attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyAttack {
    /// Ciphertext symbol to guessed letter.
    pub mapping: BTreeMap<i64, char>,
    /// The ciphertext read through `mapping`.
    pub decoded: String,
}

impl FrequencyAttack {
    /// Fraction of positions where `decoded` agrees with `plaintext_letters`.
    ///
    /// Compares position by position over the shorter of the two; 0 for
    /// empty input.
    pub fn accuracy(&self, plaintext_letters: &str) -> f64 {
        let pairs = self.decoded.chars().zip(plaintext_letters.chars());
        let (hits, total) = pairs.fold((0_u64, 0_u64), |(h, t), (a, b)| {
            (h + u64::from(a == b), t + 1)
        });
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Guesses the plaintext by pairing the i-th most frequent ciphertext
/// symbol with the i-th most frequent Italian letter.
///
/// Symbols with equal counts rank in ascending numeric order. Symbols
/// ranked past the 26th map to [`UNKNOWN_SYMBOL`].
///
/// # Examples
/// ```
/// use u_probkit::rsa::{encrypt_letters, frequency_attack, ToyRsaKey};
/// let c = encrypt_letters("eeeeaaai", &ToyRsaKey::demo()).unwrap();
/// assert_eq!(frequency_attack(&c).decoded, "eeeeaaai");
/// ```
pub fn frequency_attack(ciphertext: &[i64]) -> FrequencyAttack {
    let mut ranked: Vec<(i64, u64)> = number_distribution(ciphertext).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let letters = italian_letters_by_frequency();
    let mapping: BTreeMap<i64, char> = ranked
        .iter()
        .enumerate()
        .map(|(rank, &(symbol, _))| (symbol, letters.get(rank).copied().unwrap_or(UNKNOWN_SYMBOL)))
        .collect();

    let decoded = ciphertext
        .iter()
        .map(|c| mapping.get(c).copied().unwrap_or(UNKNOWN_SYMBOL))
        .collect();
    FrequencyAttack { mapping, decoded }
}
