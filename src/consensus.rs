use crate::blockchain::{validate_chain, Block, Ledger};
use crate::network::{ChainFetcher, ChainResponse, PeerError};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Ledger handle shared between the API, the miner and the reconciliation loop.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Longest-valid-chain conflict resolution.
pub struct Consensus;

impl Consensus {
    /// Pick the chain to adopt from peer responses, in the order given.
    ///
    /// A response wins only if it is strictly longer than everything seen so far
    /// (starting from `local_len`) and passes validation. Failed responses are skipped.
    pub fn select_longest_valid<I, P>(local_len: usize, responses: I) -> Option<Vec<Block>>
    where
        I: IntoIterator<Item = (P, Result<ChainResponse, PeerError>)>,
        P: AsRef<str>,
    {
        let mut max_length = local_len;
        let mut best = None;

        for (peer, response) in responses {
            let peer = peer.as_ref();
            let response = match response.and_then(|r| check_reported_length(peer, r)) {
                Ok(r) => r,
                Err(e) => {
                    warn!(peer, error = %e, "consensus.peer_skipped");
                    continue;
                }
            };

            if response.length <= max_length {
                debug!(peer, length = response.length, max_length, "consensus.not_longer");
                continue;
            }

            match validate_chain(&response.chain) {
                Ok(()) => {
                    debug!(peer, length = response.length, "consensus.candidate");
                    max_length = response.length;
                    best = Some(response.chain);
                }
                Err(e) => warn!(peer, error = %e, "consensus.invalid_chain"),
            }
        }

        best
    }

    /// Query every known peer and adopt the longest valid chain if it beats ours.
    ///
    /// Returns whether the local chain was replaced. Peers are queried concurrently
    /// without holding the ledger lock; the write lock is only taken for the swap.
    pub async fn resolve_conflicts<F: ChainFetcher>(ledger: &RwLock<Ledger>, fetcher: &F) -> bool {
        let (peers, local_len) = {
            let ledger = ledger.read().await;
            (ledger.peers().iter().cloned().collect::<Vec<_>>(), ledger.len())
        };

        if peers.is_empty() {
            debug!("consensus.no_peers");
            return false;
        }

        let responses = join_all(peers.iter().map(|peer| fetcher.fetch_chain(peer))).await;
        let Some(candidate) = Self::select_longest_valid(local_len, peers.iter().zip(responses))
        else {
            info!(peers = peers.len(), length = local_len, "consensus.local_chain_authoritative");
            return false;
        };

        let mut ledger = ledger.write().await;
        // The local chain may have grown while peers were being queried.
        if candidate.len() <= ledger.len() {
            info!(
                candidate = candidate.len(),
                local = ledger.len(),
                "consensus.candidate_overtaken"
            );
            return false;
        }

        info!(from = ledger.len(), to = candidate.len(), "consensus.chain_replaced");
        ledger.replace_chain(candidate);
        true
    }
}

fn check_reported_length(peer: &str, response: ChainResponse) -> Result<ChainResponse, PeerError> {
    if response.length != response.chain.len() {
        return Err(PeerError::LengthMismatch {
            peer: peer.to_string(),
            reported: response.length,
            actual: response.chain.len(),
        });
    }
    Ok(response)
}
