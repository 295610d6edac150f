#![no_std]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg"
)]

#[cfg(feature = "hazmat")]
pub mod hazmat;

mod backend;
mod field_element;
mod key_powers;

pub use universal_hash;

use crate::{field_element::FieldElement, key_powers::KeyPowers};
use core::fmt::{self, Debug};
use universal_hash::{
    consts::{U16, U8},
    crypto_common::{BlockSizeUser, KeySizeUser, ParBlocksSizeUser},
    KeyInit, Reset, UhfBackend, UhfClosure, UniversalHash,
};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Size of a POLYVAL block in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of a POLYVAL key in bytes
pub const KEY_SIZE: usize = 16;

/// POLYVAL keys (16-bytes)
pub type Key = universal_hash::Key<Polyval>;

/// POLYVAL blocks (16-bytes)
pub type Block = universal_hash::Block<Polyval>;

/// POLYVAL parallel blocks: one full 8-block stride
pub type ParBlocks = universal_hash::crypto_common::ParBlocks<Polyval>;

/// POLYVAL tags (16-bytes)
pub type Tag = universal_hash::Block<Polyval>;

/// **POLYVAL**: GHASH-like universal hash over GF(2^128), but optimized for little-endian
/// architectures.
#[derive(Clone)]
pub struct Polyval {
    /// Precomputed powers of the hash key, `H^8` down to `H^1`.
    keys: KeyPowers,

    /// Accumulator (the `S` field element of the hash being computed).
    y: FieldElement,
}

impl Polyval {
    /// Initialize POLYVAL with the given `H` field element (i.e. hash key).
    #[must_use]
    pub fn new(h: &Key) -> Self {
        Self {
            keys: KeyPowers::new(h),
            y: FieldElement::default(),
        }
    }
}

impl KeySizeUser for Polyval {
    type KeySize = U16;
}

impl KeyInit for Polyval {
    fn new(h: &Key) -> Self {
        Self::new(h)
    }
}

impl BlockSizeUser for Polyval {
    type BlockSize = U16;
}

impl ParBlocksSizeUser for Polyval {
    // One full stride: the number of key powers in the table
    type ParBlocksSize = U8;
}

impl UhfBackend for Polyval {
    fn proc_block(&mut self, x: &Block) {
        self.y = backend::polymul(self.y + x.into(), self.keys.h(), self.keys.token());
    }

    fn proc_par_blocks(&mut self, blocks: &ParBlocks) {
        self.y = backend::update_blocks(
            self.keys.powers(),
            self.y,
            blocks.as_slice(),
            self.keys.token(),
        );
    }
}

impl UniversalHash for Polyval {
    fn update_with_backend(&mut self, f: impl UhfClosure<BlockSize = Self::BlockSize>) {
        f.call(self);
    }

    /// Get POLYVAL result (i.e. computed `S` field element)
    fn finalize(self) -> Tag {
        self.y.into()
    }
}

impl Reset for Polyval {
    fn reset(&mut self) {
        self.y = FieldElement::default();
    }
}

impl Debug for Polyval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Polyval").finish_non_exhaustive()
    }
}

impl Drop for Polyval {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.y.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use crate::{universal_hash::UniversalHash, Polyval, BLOCK_SIZE};
    use hex_literal::hex;

    //
    // Test vectors for POLYVAL from RFC 8452 Appendix A
    // <https://tools.ietf.org/html/rfc8452#appendix-A>
    //

    const H: [u8; BLOCK_SIZE] = hex!("25629347589242761d31f826ba4b757b");
    const X_1: [u8; BLOCK_SIZE] = hex!("4f4f95668c83dfb6401762bb2d01a262");
    const X_2: [u8; BLOCK_SIZE] = hex!("d1a24ddd2721d006bbe45f20d3c9f362");

    /// POLYVAL(H, X_1)
    const POLYVAL_X1: [u8; BLOCK_SIZE] = hex!("cedac64537ff50989c16011551086d77");

    /// POLYVAL(H, X_1, X_2)
    const POLYVAL_X1_X2: [u8; BLOCK_SIZE] = hex!("f7a3b47b846119fae5b7866cf5e5b77e");

    #[test]
    fn polyval_one_block() {
        let mut poly = Polyval::new(&H.into());
        poly.update(&[X_1.into()]);
        assert_eq!(&POLYVAL_X1[..], poly.finalize().as_slice());
    }

    #[test]
    fn polyval_two_blocks() {
        let mut poly = Polyval::new(&H.into());
        poly.update(&[X_1.into(), X_2.into()]);
        assert_eq!(&POLYVAL_X1_X2[..], poly.finalize().as_slice());
    }
}
