use crate::blockchain::core::chain::{Block, PreviousHash};
use crate::error::ChainError;
use crate::miner::valid_proof;

/// Check every adjacent pair of `chain` for hash linkage and proof-of-work.
///
/// The walk is bounded by `chain` itself, never by any local chain. The genesis block
/// is trusted as-is; chains of zero or one block are valid.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    for (pos, pair) in chain.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let pos = pos + 1;

        match &cur.previous_hash {
            PreviousHash::Digest(hash) if *hash == prev.hash() => {}
            _ => return Err(ChainError::InvalidBlockLinkage(pos)),
        }

        if !valid_proof(prev.proof, cur.proof) {
            return Err(ChainError::InvalidProofOfWork(pos));
        }
    }
    Ok(())
}

pub fn is_valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}
