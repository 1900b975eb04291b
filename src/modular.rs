//! Modular exponentiation.
//!
//! # Algorithm
//! Right-to-left binary (square-and-multiply) exponentiation. The
//! exponent is halved each round; the running base is squared modulo
//! `modulus`, and multiplied into the result whenever the low bit is set.
//!
//! Reference: Knuth (1997), *TAOCP* Vol. 2, §4.6.3, Algorithm A.
//!
//! # Complexity
//! Time: O(log exponent), Space: O(1)

use crate::error::{KernelError, Result};

/// Computes `base^exponent mod modulus`.
///
/// Products are formed in `u128`, so `(modulus − 1)²` never overflows for
/// any positive `i64` modulus.
///
/// `modulus == 1` always yields 0, and `exponent == 0` yields 1 for any
/// larger modulus.
///
/// # Errors
/// `InvalidArgument` if `base < 0`, `exponent < 0`, or `modulus <= 0`.
///
/// # Examples
/// ```
/// use u_probkit::modular::mod_pow;
/// assert_eq!(mod_pow(4, 13, 497).unwrap(), 445);
/// assert_eq!(mod_pow(7, 0, 10).unwrap(), 1);
/// assert_eq!(mod_pow(7, 3, 1).unwrap(), 0);
/// assert!(mod_pow(2, -1, 7).is_err());
/// ```
pub fn mod_pow(base: i64, exponent: i64, modulus: i64) -> Result<i64> {
    if modulus <= 0 {
        return Err(KernelError::InvalidArgument(format!(
            "modulus must be positive, got {modulus}"
        )));
    }
    if exponent < 0 {
        return Err(KernelError::InvalidArgument(format!(
            "exponent must be non-negative, got {exponent}"
        )));
    }
    if base < 0 {
        return Err(KernelError::InvalidArgument(format!(
            "base must be non-negative, got {base}"
        )));
    }
    if modulus == 1 {
        return Ok(0);
    }

    let m = modulus as u128;
    let mut b = base as u128 % m;
    let mut e = exponent as u64;
    let mut result: u128 = 1;
    while e > 0 {
        if e & 1 == 1 {
            result = result * b % m;
        }
        e >>= 1;
        b = b * b % m;
    }
    // result < modulus <= i64::MAX
    Ok(result as i64)
}
