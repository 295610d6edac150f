//! ARMv8 `PMULL`-accelerated implementation of POLYVAL.
//!
//! Based on this C intrinsics implementation:
//! <https://github.com/noloader/AES-Intrinsics/blob/master/clmul-arm.c>
//!
//! Original C written and placed in public domain by Jeffrey Walton.
//! Based on code from ARM, and by Johannes Schneiders, Skip Hovsmith and
//! Barry O'Rourke for the mbedTLS project.
//!
//! PMULL only produces two of the four half-products per instruction pair,
//! so this backend uses three-multiply Karatsuba per block and combines the
//! partials once per stride.
//!
//! For more information about PMULL, see:
//! - <https://developer.arm.com/documentation/100069/0608/A64-SIMD-Vector-Instructions/PMULL--PMULL2--vector->
//! - <https://eprint.iacr.org/2015/688.pdf>

use crate::{field_element::FieldElement, key_powers::NUM_POWERS, Block};
use core::{arch::aarch64::*, mem};

/// 128-bit SIMD register type.
pub(super) type Simd128 = uint8x16_t;

/// The low half of POLYVAL's polynomial, replicated into both halves so a
/// single low-half or high-half polynomial multiply produces the reduction
/// quotient.
const GSTAR: u128 = 0xC200_0000_0000_0000_C200_0000_0000_0000;

/// Montgomery product `x · y · x^-128` of two field elements.
///
/// # Safety
///
/// The NEON and AES (PMULL) target features must be enabled.
#[inline]
#[target_feature(enable = "neon,aes")]
pub(super) unsafe fn polymul(x: Simd128, y: Simd128) -> Simd128 {
    let mut acc = Unreduced::new();
    acc.absorb(x, y);
    acc.reduce()
}

/// Absorb a sequence of whole blocks into the accumulator `y`.
///
/// Consumes the ragged head (`len mod 8` blocks against the highest powers
/// of `H`) first, then full 8-block strides with one deferred Montgomery
/// reduction per stride.
///
/// # Safety
///
/// The NEON and AES (PMULL) target features must be enabled.
#[target_feature(enable = "neon,aes")]
pub(super) unsafe fn update_blocks(
    powers: &[FieldElement; NUM_POWERS],
    y: FieldElement,
    blocks: &[Block],
) -> FieldElement {
    let mut y: Simd128 = y.into();

    let (head, body) = blocks.split_at(blocks.len() % NUM_POWERS);
    if !head.is_empty() {
        y = tail(powers, y, head);
    }

    for stride in body.chunks_exact(NUM_POWERS) {
        // Only the first multiply of a stride consumes the carry reduced
        // from the previous one; the other seven are independent of it.
        let mut acc = Unreduced::new();
        absorb_run::<NUM_POWERS>(&mut acc, y, stride, powers);
        y = acc.reduce();
    }

    y.into()
}

/// Absorb `r < 8` blocks against the `r` highest precomputed powers.
///
/// Block `j` pairs with `H^(r-j)`, i.e. the contiguous table suffix starting
/// at entry `8 - r`; the final suffix entry is `H^1`, so the load run never
/// passes the end of the table. Load sizing is selected per remainder: a
/// four-block group for `r >= 4`, then a `{3, 2, 1}` group for the rest.
#[target_feature(enable = "neon,aes")]
unsafe fn tail(powers: &[FieldElement; NUM_POWERS], y: Simd128, blocks: &[Block]) -> Simd128 {
    let r = blocks.len();
    debug_assert!(r >= 1 && r < NUM_POWERS);
    let keys = &powers[NUM_POWERS - r..];

    let mut acc = Unreduced::new();
    match r {
        1 => absorb_run::<1>(&mut acc, y, blocks, keys),
        2 => absorb_run::<2>(&mut acc, y, blocks, keys),
        3 => absorb_run::<3>(&mut acc, y, blocks, keys),
        _ => {
            absorb_run::<4>(&mut acc, y, blocks, keys);
            let zero = vdupq_n_u8(0);
            match r - 4 {
                3 => absorb_run::<3>(&mut acc, zero, &blocks[4..], &keys[4..]),
                2 => absorb_run::<2>(&mut acc, zero, &blocks[4..], &keys[4..]),
                1 => absorb_run::<1>(&mut acc, zero, &blocks[4..], &keys[4..]),
                _ => (),
            }
        }
    }

    acc.reduce()
}

/// Multiply `K` consecutive blocks by `K` consecutive key powers into the
/// shared accumulator, XORing `carry` into the first block before it is
/// multiplied.
#[inline]
#[target_feature(enable = "neon,aes")]
unsafe fn absorb_run<const K: usize>(
    acc: &mut Unreduced,
    carry: Simd128,
    blocks: &[Block],
    keys: &[FieldElement],
) {
    for j in 0..K {
        let mut x = vld1q_u8(blocks[j].as_ptr());
        if j == 0 {
            x = veorq_u8(x, carry);
        }
        acc.absorb(x, keys[j].into());
    }
}

/// 256-bit product accumulator holding uncombined Karatsuba partials.
#[derive(Clone, Copy)]
struct Unreduced {
    h: Simd128,
    m: Simd128,
    l: Simd128,
}

impl Unreduced {
    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn new() -> Self {
        let zero = vdupq_n_u8(0);
        Self {
            h: zero,
            m: zero,
            l: zero,
        }
    }

    /// Karatsuba multiply-accumulate: three polynomial multiplies per pair.
    #[inline]
    #[target_feature(enable = "neon,aes")]
    unsafe fn absorb(&mut self, x: Simd128, h: Simd128) {
        let (hh, mm, ll) = karatsuba1(x, h);
        self.h = veorq_u8(self.h, hh);
        self.m = veorq_u8(self.m, mm);
        self.l = veorq_u8(self.l, ll);
    }

    /// Combine the accumulated partials into a 256-bit product and reduce.
    #[inline]
    #[target_feature(enable = "neon,aes")]
    unsafe fn reduce(self) -> Simd128 {
        let (x23, x01) = karatsuba2(self.h, self.m, self.l);
        mont_reduce(x23, x01)
    }
}

/// Karatsuba decomposition for `x*y`.
#[inline]
#[target_feature(enable = "neon,aes")]
unsafe fn karatsuba1(x: Simd128, y: Simd128) -> (Simd128, Simd128, Simd128) {
    // First Karatsuba step: decompose x and y.
    //
    // (x1*y0 + x0*y1) = (x1+x0) * (y1+y0) + (x1*y1) + (x0*y0)
    //        M                                 H         L
    //
    // m = x.hi^x.lo * y.hi^y.lo
    let m = pmull(
        veorq_u8(x, vextq_u8(x, x, 8)), // x.hi^x.lo
        veorq_u8(y, vextq_u8(y, y, 8)), // y.hi^y.lo
    );
    let h = pmull2(x, y); // h = x.hi * y.hi
    let l = pmull(x, y); // l = x.lo * y.lo
    (h, m, l)
}

/// Karatsuba combine.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn karatsuba2(h: Simd128, m: Simd128, l: Simd128) -> (Simd128, Simd128) {
    // Second Karatsuba step: combine into a 2n-bit product.
    //
    // m0 ^= l0 ^ h0 // = m0^(l0^h0)
    // m1 ^= l1 ^ h1 // = m1^(l1^h1)
    // l1 ^= m0      // = l1^(m0^l0^h0)
    // h0 ^= l0 ^ m1 // = h0^(l0^m1^l1^h1)
    // h1 ^= l1      // = h1^(l1^m0^l0^h0)
    let t = {
        //   {m0, m1} ^ {l1, h0}
        // = {m0^l1, m1^h0}
        let t0 = veorq_u8(m, vextq_u8(l, h, 8));

        //   {h0, h1} ^ {l0, l1}
        // = {h0^l0, h1^l1}
        let t1 = veorq_u8(h, l);

        //   {m0^l1, m1^h0} ^ {h0^l0, h1^l1}
        // = {m0^l1^h0^l0, m1^h0^h1^l1}
        veorq_u8(t0, t1)
    };

    // {m0^l1^h0^l0, l0}
    let x01 = vextq_u8(
        vextq_u8(l, l, 8), // {l1, l0}
        t,
        8,
    );

    // {h1, m1^h0^h1^l1}
    let x23 = vextq_u8(
        t,
        vextq_u8(h, h, 8), // {h1, h0}
        8,
    );

    (x23, x01)
}

/// Montgomery reduction of the 256-bit product `[x23 : x01]` to a field
/// element `[x23 : x01] · x^-128 mod P`.
#[inline]
#[target_feature(enable = "neon,aes")]
unsafe fn mont_reduce(x23: Simd128, x01: Simd128) -> Simd128 {
    // Two-step fast reduction with g*:
    //    A  = x01.lo • g*
    //    B  = x01 ⊕ swap64(A)
    //    C  = B.hi • g*
    // Output: x23 ⊕ B ⊕ C
    let gstar = vreinterpretq_u8_p128(GSTAR);
    let a = pmull(x01, gstar);
    let b = veorq_u8(x01, vextq_u8(a, a, 8));
    let c = pmull2(b, gstar);
    veorq_u8(x23, veorq_u8(c, b))
}

impl From<FieldElement> for Simd128 {
    #[inline]
    fn from(fe: FieldElement) -> Simd128 {
        unsafe { vld1q_u8(fe.0.as_ptr()) }
    }
}

impl From<Simd128> for FieldElement {
    #[inline]
    fn from(fe: Simd128) -> FieldElement {
        let mut ret = FieldElement::default();
        unsafe { vst1q_u8(ret.0.as_mut_ptr(), fe) }
        ret
    }
}

/// Multiplies the low halves of `a` and `b`.
#[inline]
#[target_feature(enable = "neon,aes")]
unsafe fn pmull(a: Simd128, b: Simd128) -> Simd128 {
    mem::transmute(vmull_p64(
        vgetq_lane_u64(vreinterpretq_u64_u8(a), 0),
        vgetq_lane_u64(vreinterpretq_u64_u8(b), 0),
    ))
}

/// Multiplies the high halves of `a` and `b`.
#[inline]
#[target_feature(enable = "neon,aes")]
unsafe fn pmull2(a: Simd128, b: Simd128) -> Simd128 {
    mem::transmute(vmull_p64(
        vgetq_lane_u64(vreinterpretq_u64_u8(a), 1),
        vgetq_lane_u64(vreinterpretq_u64_u8(b), 1),
    ))
}
