//! Property-based tests.

#![cfg(all(any(unix, windows), feature = "hazmat"))]

use hex_literal::hex;
use polyval_core::{
    hazmat::{self, FieldElement, KeyPowers},
    universal_hash::UniversalHash,
    Block, Polyval, BLOCK_SIZE, KEY_SIZE,
};
use proptest::{collection::vec, prelude::*, sample::Index};

/// `x^128 mod P`: the Montgomery representation of 1.
const MONTGOMERY_ONE: [u8; BLOCK_SIZE] = hex!("010000000000000000000000000000c2");

fn mul(a: [u8; BLOCK_SIZE], b: [u8; BLOCK_SIZE]) -> Block {
    let mut out = Block::from(a);
    hazmat::block_mul(&mut out, &b.into());
    out
}

fn xor(a: [u8; BLOCK_SIZE], b: [u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut out = a;
    for (o, b) in out.iter_mut().zip(b) {
        *o ^= b;
    }
    out
}

proptest! {
    /// Multiplication is commutative.
    #[test]
    fn block_mul_commutes(
        a in any::<[u8; BLOCK_SIZE]>(),
        b in any::<[u8; BLOCK_SIZE]>(),
    ) {
        prop_assert_eq!(mul(a, b), mul(b, a));
    }

    /// Multiplication is associative (the Montgomery factors cancel the
    /// same way on both sides).
    #[test]
    fn block_mul_associates(
        a in any::<[u8; BLOCK_SIZE]>(),
        b in any::<[u8; BLOCK_SIZE]>(),
        c in any::<[u8; BLOCK_SIZE]>(),
    ) {
        prop_assert_eq!(mul(mul(a, b).into(), c), mul(a, mul(b, c).into()));
    }

    /// `x^128 mod P` is the multiplicative identity in Montgomery form.
    #[test]
    fn montgomery_one_is_identity(a in any::<[u8; BLOCK_SIZE]>()) {
        prop_assert_eq!(mul(a, MONTGOMERY_ONE), Block::from(a));
    }

    /// Multiplication distributes over addition (XOR).
    #[test]
    fn block_mul_distributes_over_xor(
        a in any::<[u8; BLOCK_SIZE]>(),
        b in any::<[u8; BLOCK_SIZE]>(),
        c in any::<[u8; BLOCK_SIZE]>(),
    ) {
        let lhs = mul(a, xor(b, c));
        let rhs = Block::from(xor(mul(a, b).into(), mul(a, c).into()));
        prop_assert_eq!(lhs, rhs);
    }

    /// Each table entry is the next one multiplied by `H`.
    #[test]
    fn key_power_chain(key in any::<[u8; KEY_SIZE]>()) {
        let keys = KeyPowers::new(&key.into());
        let pow = keys.powers();

        for i in 0..pow.len() - 1 {
            let mut stepped = Block::from(pow[i + 1]);
            hazmat::block_mul(&mut stepped, &Block::from(pow[pow.len() - 1]));
            prop_assert_eq!(stepped, Block::from(pow[i]));
        }
    }

    /// Splitting a message across two update calls never changes the digest,
    /// whichever tail/stride combination each half lands on.
    #[test]
    fn update_splits_associate(
        key in any::<[u8; KEY_SIZE]>(),
        msg in vec(any::<[u8; BLOCK_SIZE]>(), 0..24),
        split in any::<Index>(),
    ) {
        let keys = KeyPowers::new(&key.into());
        let msg: Vec<Block> = msg.into_iter().map(Block::from).collect();
        let split = split.index(msg.len() + 1);

        let mut joint = Block::default();
        hazmat::update(&msg, &keys, &mut joint);

        let mut acc = Block::default();
        hazmat::update(&msg[..split], &keys, &mut acc);
        hazmat::update(&msg[split..], &keys, &mut acc);

        prop_assert_eq!(joint, acc);
    }

    /// A one-block update starting from a zero accumulator is exactly one
    /// multiplication by `H`.
    #[test]
    fn single_block_update_is_block_mul(
        key in any::<[u8; KEY_SIZE]>(),
        m in any::<[u8; BLOCK_SIZE]>(),
    ) {
        let keys = KeyPowers::new(&key.into());

        let mut acc = Block::default();
        hazmat::update(&[m.into()], &keys, &mut acc);

        prop_assert_eq!(acc, mul(m, key));
    }

    /// The autodetected backend against the scalar `FieldElement` fold
    /// (which always runs the software implementation).
    #[test]
    fn backends_agree(
        key in any::<[u8; KEY_SIZE]>(),
        msg in vec(any::<[u8; BLOCK_SIZE]>(), 0..40),
    ) {
        let msg: Vec<Block> = msg.into_iter().map(Block::from).collect();

        let mut polyval = Polyval::new(&key.into());
        polyval.update(&msg);
        let actual = polyval.finalize();

        let h = FieldElement::from(Block::from(key));
        let mut y = FieldElement::default();
        for block in &msg {
            y = (y + block.into()) * h;
        }

        prop_assert_eq!(actual, Block::from(y));
    }
}
