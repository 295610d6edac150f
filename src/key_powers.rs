//! Precomputed powers of the POLYVAL hash key.

use crate::{backend, field_element::FieldElement, Key};
use core::fmt::{self, Debug};

/// Number of precomputed key powers, which is also the number of blocks
/// absorbed by one full stride of the streaming update.
pub const NUM_POWERS: usize = 8;

/// Table of the first eight powers of the hash key `H`, in Montgomery form.
///
/// The raw key bytes already carry the implicit `x^128` factor of the
/// Montgomery representation of `H^1`, so chained Montgomery multiplications
/// produce every higher power without a conversion step.
///
/// Entries are stored highest power first (`H^8, H^7, …, H^1`), contiguous
/// and 16-byte aligned: a full stride reads the table front to back, and a
/// ragged tail of `r` blocks reads the suffix starting at entry `8 - r`.
/// The table is read-only once constructed and may be shared across threads.
#[derive(Clone)]
pub struct KeyPowers {
    /// Powers of H in descending order: `(H^8, H^7, …, H)`.
    pow: [FieldElement; NUM_POWERS],

    /// Cached CPU feature detection token.
    token: backend::InitToken,
}

impl KeyPowers {
    /// Precompute the power table from a raw 16-byte hash key.
    #[must_use]
    pub fn new(h: &Key) -> Self {
        let (token, _) = backend::init_get();
        let h = FieldElement::from(*h);

        let mut pow = [h; NUM_POWERS];
        for i in (0..NUM_POWERS - 1).rev() {
            pow[i] = backend::polymul(pow[i + 1], h, token);
        }

        Self { pow, token }
    }

    /// The full table, highest power first.
    #[inline]
    pub fn powers(&self) -> &[FieldElement; NUM_POWERS] {
        &self.pow
    }

    /// `H^1`: the power applied by single-block absorption.
    #[inline]
    pub(crate) fn h(&self) -> FieldElement {
        self.pow[NUM_POWERS - 1]
    }

    #[inline]
    pub(crate) fn token(&self) -> backend::InitToken {
        self.token
    }
}

impl Debug for KeyPowers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPowers").finish_non_exhaustive()
    }
}

impl Drop for KeyPowers {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        {
            use zeroize::Zeroize;
            self.pow.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn power_chain() {
        let key: Key = hex!("25629347589242761d31f826ba4b757b").into();
        let keys = KeyPowers::new(&key);

        // pow[i] holds H^(8-i); each entry is the next one times H
        let h = keys.h();
        for i in 0..NUM_POWERS - 1 {
            assert_eq!(keys.pow[i], keys.pow[i + 1] * h);
        }
    }
}
