//! Proof-of-work for AuraChain
//!
//! A proof `p'` solves the previous proof `p` when `sha256("{p}{p'}")` starts with
//! four hex zeros. Difficulty is fixed.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::crypto::sha256_hex;

/// Required prefix of the hex digest.
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Guesses tried between two looks at the cancellation flag.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Hex digest checked by [`valid_proof`].
pub fn proof_digest(last_proof: u64, proof: u64) -> String {
    sha256_hex(format!("{}{}", last_proof, proof).as_bytes())
}

/// Whether `proof` solves the challenge set by `last_proof`.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let digest = Sha256::digest(format!("{}{}", last_proof, proof).as_bytes());
    // "0000" in hex is the first two bytes being zero.
    digest[0] == 0 && digest[1] == 0
}

/// Smallest non-negative proof solving `last_proof`. Unbounded search.
pub fn solve(last_proof: u64) -> u64 {
    let mut proof = 0;
    while !valid_proof(last_proof, proof) {
        proof += 1;
    }
    proof
}

/// Same search as [`solve`], giving up with `None` once `cancel` is set.
pub fn solve_cancellable(last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
    let mut proof = 0;
    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return None;
        }
        if valid_proof(last_proof, proof) {
            return Some(proof);
        }
        proof += 1;
    }
}
