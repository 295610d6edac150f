//! Portable constant-time software implementation of POLYVAL.
//!
//! The carryless multiply is adapted from BearSSL's `ghash_ctmul64.c`:
//!
//! <https://bearssl.org/gitweb/?p=BearSSL;a=blob;f=src/hash/ghash_ctmul64.c;hb=4b6046412>
//!
//! Copyright (c) 2016 Thomas Pornin <pornin@bolet.org>
//!
//! POLYVAL multiplication is the little-endian counterpart of GHASH
//! multiplication, minus the one-bit shift the bit-reversed convention
//! forces on GHASH:
//!
//! <https://crypto.stackexchange.com/questions/66448/how-does-bearssls-gcm-modular-reduction-work/66462#66462>

use crate::{field_element::FieldElement, key_powers::NUM_POWERS, Block};
use core::num::Wrapping;

/// 256-bit carryless product as four little-endian 64-bit limbs.
type U64x4 = (u64, u64, u64, u64);

/// Montgomery product `a · b · x^-128` modulo POLYVAL's polynomial.
pub(crate) fn polymul(a: FieldElement, b: FieldElement) -> FieldElement {
    mont_reduce(karatsuba(a.into(), b.into())).into()
}

/// Absorb a sequence of whole blocks into the accumulator `y`.
///
/// The software path gains nothing from the precomputed table: each block is
/// folded in and multiplied by `H` one at a time, which evaluates the same
/// polynomial as the wide SIMD strides.
pub(crate) fn update_blocks(
    powers: &[FieldElement; NUM_POWERS],
    y: FieldElement,
    blocks: &[Block],
) -> FieldElement {
    let h = powers[NUM_POWERS - 1];
    blocks.iter().fold(y, |y, block| (y + block.into()) * h)
}

/// Unreduced 256-bit carryless product of two 128-bit field elements.
///
/// Three 64x64 multiplications via Karatsuba; the upper half of each 64x64
/// product is recovered with the bit-reversal identity
/// `rev(x) * rev(y) == rev(x * y)` over GF(2)[X].
fn karatsuba(x: u128, y: u128) -> U64x4 {
    let x0 = x as u64;
    let x1 = (x >> 64) as u64;
    let y0 = y as u64;
    let y1 = (y >> 64) as u64;

    let x0r = x0.reverse_bits();
    let x1r = x1.reverse_bits();
    let y0r = y0.reverse_bits();
    let y1r = y1.reverse_bits();

    let z0 = bmul64(x0, y0);
    let z1 = bmul64(x1, y1);
    let mut z2 = bmul64(x0 ^ x1, y0 ^ y1);
    let mut z0h = bmul64(x0r, y0r);
    let mut z1h = bmul64(x1r, y1r);
    let mut z2h = bmul64(x0r ^ x1r, y0r ^ y1r);

    z2 ^= z0 ^ z1;
    z2h ^= z0h ^ z1h;
    z0h = z0h.reverse_bits() >> 1;
    z1h = z1h.reverse_bits() >> 1;
    z2h = z2h.reverse_bits() >> 1;

    (z0, z0h ^ z2, z1 ^ z2h, z1h)
}

/// Montgomery reduction of the 256-bit product modulo
/// `x^128 + x^127 + x^126 + x^121 + 1`, expressed as shift/XOR folds of the
/// two low limbs into the two high limbs.
fn mont_reduce(v: U64x4) -> u128 {
    let (v0, mut v1, mut v2, mut v3) = v;
    v2 ^= v0 ^ (v0 >> 1) ^ (v0 >> 2) ^ (v0 >> 7);
    v1 ^= (v0 << 63) ^ (v0 << 62) ^ (v0 << 57);
    v3 ^= v1 ^ (v1 >> 1) ^ (v1 >> 2) ^ (v1 >> 7);
    v2 ^= (v1 << 63) ^ (v1 << 62) ^ (v1 << 57);
    u128::from(v2) | (u128::from(v3) << 64)
}

/// Carryless multiplication in GF(2)[X], truncated to the low 64 bits.
///
/// Integer multiplications with every fourth bit live; carries land in the
/// "holes" and are masked back out, keeping the multiply constant-time on
/// CPUs with data-independent integer multipliers.
fn bmul64(x: u64, y: u64) -> u64 {
    const M0: u64 = 0x1111_1111_1111_1111;
    const M1: u64 = 0x2222_2222_2222_2222;
    const M2: u64 = 0x4444_4444_4444_4444;
    const M3: u64 = 0x8888_8888_8888_8888;

    let x0 = Wrapping(x & M0);
    let x1 = Wrapping(x & M1);
    let x2 = Wrapping(x & M2);
    let x3 = Wrapping(x & M3);

    let y0 = Wrapping(y & M0);
    let y1 = Wrapping(y & M1);
    let y2 = Wrapping(y & M2);
    let y3 = Wrapping(y & M3);

    let z0 = (x0 * y0) ^ (x1 * y3) ^ (x2 * y2) ^ (x3 * y1);
    let z1 = (x0 * y1) ^ (x1 * y0) ^ (x2 * y3) ^ (x3 * y2);
    let z2 = (x0 * y2) ^ (x1 * y1) ^ (x2 * y0) ^ (x3 * y3);
    let z3 = (x0 * y3) ^ (x1 * y2) ^ (x2 * y1) ^ (x3 * y0);

    (z0.0 & M0) | (z1.0 & M1) | (z2.0 & M2) | (z3.0 & M3)
}
