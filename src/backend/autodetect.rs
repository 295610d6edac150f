//! Autodetection for CPU intrinsics, with fallback to the "soft" backend
//! when they are unavailable.

#[cfg(target_arch = "aarch64")]
use super::pmull as intrinsics;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use super::clmul as intrinsics;

use super::soft;
use crate::{field_element::FieldElement, key_powers::NUM_POWERS, Block};

#[cfg(target_arch = "aarch64")]
cpufeatures::new!(detect_intrinsics, "aes"); // `aes` implies PMULL
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
cpufeatures::new!(detect_intrinsics, "pclmulqdq");

pub(crate) use detect_intrinsics::{init_get, InitToken};

/// Montgomery product `a · b · x^-128`, dispatching on the detected CPU
/// features.
#[inline]
pub(crate) fn polymul(a: FieldElement, b: FieldElement, token: InitToken) -> FieldElement {
    if token.get() {
        // SAFETY: the token witnesses that the required intrinsics exist
        unsafe { intrinsics::polymul(a.into(), b.into()).into() }
    } else {
        soft::polymul(a, b)
    }
}

/// Absorb a sequence of whole blocks into the accumulator `y`, dispatching
/// on the detected CPU features.
#[inline]
pub(crate) fn update_blocks(
    powers: &[FieldElement; NUM_POWERS],
    y: FieldElement,
    blocks: &[Block],
    token: InitToken,
) -> FieldElement {
    if token.get() {
        // SAFETY: the token witnesses that the required intrinsics exist
        unsafe { intrinsics::update_blocks(powers, y, blocks) }
    } else {
        soft::update_blocks(powers, y, blocks)
    }
}
