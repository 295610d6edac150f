//! POLYVAL backends.
//!
//! The accelerated kernels are selected at runtime by [`autodetect`]; the
//! portable `soft` implementation is always compiled and doubles as the
//! scalar reference for the others.

pub(crate) mod soft;

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(feature = "force-soft")
))]
pub(crate) mod clmul;

#[cfg(all(target_arch = "aarch64", not(feature = "force-soft")))]
pub(crate) mod pmull;

#[cfg(all(
    any(target_arch = "aarch64", target_arch = "x86", target_arch = "x86_64"),
    not(feature = "force-soft")
))]
mod autodetect;

#[cfg(all(
    any(target_arch = "aarch64", target_arch = "x86", target_arch = "x86_64"),
    not(feature = "force-soft")
))]
pub(crate) use autodetect::{init_get, polymul, update_blocks, InitToken};

#[cfg(any(
    not(any(target_arch = "aarch64", target_arch = "x86", target_arch = "x86_64")),
    feature = "force-soft"
))]
mod fallback {
    use super::soft;
    use crate::{field_element::FieldElement, key_powers::NUM_POWERS, Block};

    /// Stub CPU-feature token for builds without an accelerated backend.
    pub(crate) type InitToken = ();

    /// Stub detection for compatibility with real CPU feature detection.
    #[inline]
    pub(crate) fn init_get() -> (InitToken, bool) {
        ((), false)
    }

    #[inline]
    pub(crate) fn polymul(a: FieldElement, b: FieldElement, _token: InitToken) -> FieldElement {
        soft::polymul(a, b)
    }

    #[inline]
    pub(crate) fn update_blocks(
        powers: &[FieldElement; NUM_POWERS],
        y: FieldElement,
        blocks: &[Block],
        _token: InitToken,
    ) -> FieldElement {
        soft::update_blocks(powers, y, blocks)
    }
}

#[cfg(any(
    not(any(target_arch = "aarch64", target_arch = "x86", target_arch = "x86_64")),
    feature = "force-soft"
))]
pub(crate) use fallback::{init_get, polymul, update_blocks, InitToken};
