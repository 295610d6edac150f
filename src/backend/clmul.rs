//! Intel `CLMUL`-accelerated implementation for modern x86/x86_64 CPUs
//! (i.e. Intel Sandy Bridge-compatible or newer).
//!
//! PCLMULQDQ provides all four 64x64 half-products at the same cost, so this
//! backend multiplies schoolbook-style and defers folding the middle terms
//! across the 64-bit boundary until a whole stride has been accumulated.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::{field_element::FieldElement, key_powers::NUM_POWERS, Block};
use core::ptr;

/// 128-bit SIMD register type.
pub(super) type Simd128 = __m128i;

/// The low half of POLYVAL's polynomial, replicated into both halves of a
/// 128-bit register so that a single low-half or high-half carryless
/// multiply produces the reduction quotient.
static GSTAR: u128 = 0xC200_0000_0000_0000_C200_0000_0000_0000;

/// Montgomery product `x · y · x^-128` of two field elements.
///
/// # Safety
///
/// The SSE2 and pclmulqdq target features must be enabled.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
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
/// The SSE2 and pclmulqdq target features must be enabled.
#[target_feature(enable = "sse2,pclmulqdq")]
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
/// passes the end of the table. Loads are unrolled in groups of four and a
/// `{3, 2, 1}` remainder.
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn tail(powers: &[FieldElement; NUM_POWERS], y: Simd128, blocks: &[Block]) -> Simd128 {
    let r = blocks.len();
    debug_assert!(r >= 1 && r < NUM_POWERS);
    let keys = &powers[NUM_POWERS - r..];

    let mut acc = Unreduced::new();
    let mut carry = y;
    let mut done = 0;

    while r - done >= 4 {
        absorb_run::<4>(&mut acc, carry, &blocks[done..], &keys[done..]);
        carry = _mm_setzero_si128();
        done += 4;
    }
    match r - done {
        3 => absorb_run::<3>(&mut acc, carry, &blocks[done..], &keys[done..]),
        2 => absorb_run::<2>(&mut acc, carry, &blocks[done..], &keys[done..]),
        1 => absorb_run::<1>(&mut acc, carry, &blocks[done..], &keys[done..]),
        _ => (),
    }

    acc.reduce()
}

/// Multiply `K` consecutive blocks by `K` consecutive key powers into the
/// shared accumulator, XORing `carry` into the first block before it is
/// multiplied.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn absorb_run<const K: usize>(
    acc: &mut Unreduced,
    carry: Simd128,
    blocks: &[Block],
    keys: &[FieldElement],
) {
    for j in 0..K {
        let mut x = _mm_loadu_si128(blocks[j].as_ptr().cast());
        if j == 0 {
            x = _mm_xor_si128(x, carry);
        }
        acc.absorb(x, keys[j].into());
    }
}

/// 256-bit product accumulator with the middle terms still unfolded.
#[derive(Clone, Copy)]
struct Unreduced {
    lo: Simd128,
    mid: Simd128,
    hi: Simd128,
}

impl Unreduced {
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn new() -> Self {
        let zero = _mm_setzero_si128();
        Self {
            lo: zero,
            mid: zero,
            hi: zero,
        }
    }

    /// Schoolbook multiply-accumulate: four half-products per block pair.
    #[inline]
    #[target_feature(enable = "sse2,pclmulqdq")]
    unsafe fn absorb(&mut self, x: Simd128, h: Simd128) {
        self.lo = _mm_xor_si128(self.lo, clmul_ll(x, h));
        self.hi = _mm_xor_si128(self.hi, clmul_hh(x, h));
        let mid = _mm_xor_si128(clmul_hl(x, h), clmul_lh(x, h));
        self.mid = _mm_xor_si128(self.mid, mid);
    }

    /// Fold the deferred middle terms across the 64-bit boundary and reduce.
    #[inline]
    #[target_feature(enable = "sse2,pclmulqdq")]
    unsafe fn reduce(self) -> Simd128 {
        let x01 = _mm_xor_si128(self.lo, _mm_slli_si128(self.mid, 8));
        let x23 = _mm_xor_si128(self.hi, _mm_srli_si128(self.mid, 8));
        mont_reduce(x23, x01)
    }
}

/// Montgomery reduction of the 256-bit product `[x23 : x01]` to a field
/// element `[x23 : x01] · x^-128 mod P`.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn mont_reduce(x23: Simd128, x01: Simd128) -> Simd128 {
    // Two-step fast reduction with g*:
    //    A  = x01.lo • g*
    //    B  = x01 ⊕ swap64(A)
    //    C  = B.hi • g*
    // Output: x23 ⊕ B ⊕ C
    let gstar = _mm_loadu_si128(ptr::addr_of!(GSTAR).cast());
    let a = clmul_ll(x01, gstar);
    let b = _mm_xor_si128(x01, _mm_shuffle_epi32(a, 0x4e));
    let c = clmul_hh(b, gstar);
    _mm_xor_si128(x23, _mm_xor_si128(c, b))
}

impl From<FieldElement> for Simd128 {
    #[inline]
    fn from(fe: FieldElement) -> Simd128 {
        unsafe { _mm_loadu_si128(fe.0.as_ptr().cast()) }
    }
}

impl From<Simd128> for FieldElement {
    #[inline]
    fn from(fe: Simd128) -> FieldElement {
        let mut ret = FieldElement::default();
        unsafe { _mm_store_si128(ret.0.as_mut_ptr().cast(), fe) }
        ret
    }
}

/// Multiplies the low halves of `a` and `b`.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn clmul_ll(a: Simd128, b: Simd128) -> Simd128 {
    _mm_clmulepi64_si128(a, b, 0x00)
}

/// Multiplies the low half of `a` by the high half of `b`.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn clmul_lh(a: Simd128, b: Simd128) -> Simd128 {
    _mm_clmulepi64_si128(a, b, 0x10)
}

/// Multiplies the high half of `a` by the low half of `b`.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn clmul_hl(a: Simd128, b: Simd128) -> Simd128 {
    _mm_clmulepi64_si128(a, b, 0x01)
}

/// Multiplies the high halves of `a` and `b`.
#[inline]
#[target_feature(enable = "sse2,pclmulqdq")]
unsafe fn clmul_hh(a: Simd128, b: Simd128) -> Simd128 {
    _mm_clmulepi64_si128(a, b, 0x11)
}
