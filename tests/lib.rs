use hex_literal::hex;
use polyval_core::{universal_hash::UniversalHash, Block, Polyval, BLOCK_SIZE};

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
fn polyval_test_vector_one_block() {
    let mut poly = Polyval::new(&H.into());
    poly.update(&[X_1.into()]);

    let result = poly.finalize();
    assert_eq!(&POLYVAL_X1[..], result.as_slice());
}

#[test]
fn polyval_test_vector_two_blocks() {
    let mut poly = Polyval::new(&H.into());
    poly.update(&[X_1.into(), X_2.into()]);

    let result = poly.finalize();
    assert_eq!(&POLYVAL_X1_X2[..], result.as_slice());
}

#[test]
fn split_updates_match_joint_update() {
    let mut poly = Polyval::new(&H.into());
    poly.update(&[X_1.into()]);
    poly.update(&[X_2.into()]);

    let result = poly.finalize();
    assert_eq!(&POLYVAL_X1_X2[..], result.as_slice());
}

/// Longer input to ensure the wide-stride path and the one-block-at-a-time
/// path agree.
#[test]
fn update_padded_matches_blockwise_update() {
    let inp = (1..=4096).map(|n| (n * 47) as u8).collect::<Vec<_>>();

    // Try computing polyval all at once.
    let mut poly = Polyval::new(&H.into());
    poly.update_padded(&inp);
    let result1 = poly.finalize_reset();

    // Try computing polyval one block at a time.
    for block in inp.chunks(BLOCK_SIZE) {
        poly.update(&[Block::clone_from_slice(block)]);
    }
    let result2 = poly.finalize();

    assert_eq!(result1, result2);
}
