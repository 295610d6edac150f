//! Hazardous materials: functionality which can be misused and needs to be used with care.
//!
//! <div class="warning">
//! Functionality provided in this module is low-level and intended for constructing higher-level
//! primitives as opposed to being used directly.
//! </div>

pub use crate::field_element::FieldElement;
pub use crate::key_powers::{KeyPowers, NUM_POWERS};

use crate::{backend, Block};

/// Replace `op1` with the Montgomery product `op1 · op2 · x^-128 mod P`.
///
/// When both operands are in Montgomery form the result is the Montgomery
/// form of their product; with exactly one Montgomery operand the result is
/// the ordinary product. The latter mode is how an accumulator leaves
/// Montgomery form at finalization.
pub fn block_mul(op1: &mut Block, op2: &Block) {
    let (token, _) = backend::init_get();
    *op1 = backend::polymul((*op1).into(), op2.into(), token).into();
}

/// Absorb a sequence of whole 16-byte blocks into the accumulator `acc`.
///
/// On return `acc` holds
///
/// ```text
/// H^N · acc  +  H^N · M_0  +  H^(N-1) · M_1  +  …  +  H^1 · M_(N-1)
/// ```
///
/// where `N = blocks.len()` and `H` is the hash key `keys` was built from.
/// An empty sequence leaves `acc` unchanged. Partial blocks are the
/// caller's problem: pad or buffer before calling.
pub fn update(blocks: &[Block], keys: &KeyPowers, acc: &mut Block) {
    *acc = backend::update_blocks(keys.powers(), (*acc).into(), blocks, keys.token()).into();
}
