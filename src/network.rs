//! Peer addressing and the chain-fetching client
//!
//! Peers are stored as normalised `host:port` strings. Remote chains are read from
//! `GET http://{peer}/chain`, which answers with a [`ChainResponse`].

use crate::blockchain::Block;
use crate::error::ChainError;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Known peers, deduplicated. Iteration is in address order.
pub type PeerSet = BTreeSet<String>;

/// Default per-request timeout when querying a peer.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of `GET /chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainResponse {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// Why a peer contributed no chain to a reconciliation round.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("request to peer {peer} failed: {reason}")]
    Transport { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent an unreadable chain: {reason}")]
    Body { peer: String, reason: String },
    #[error("peer {peer} reported length {reported} for a chain of {actual} blocks")]
    LengthMismatch {
        peer: String,
        reported: usize,
        actual: usize,
    },
}

/// Turn a user-supplied address (`http://10.0.0.2:5000`, `10.0.0.2:5000`, ...) into `host:port`.
///
/// A missing scheme is read as `http`; a missing port becomes the scheme's default.
pub fn normalize_peer_address(address: &str) -> Result<String, ChainError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidPeerAddress("empty address".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ChainError::InvalidPeerAddress(format!("{}: {}", address, e)))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ChainError::InvalidPeerAddress(format!("{}: missing host", address)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| ChainError::InvalidPeerAddress(format!("{}: missing port", address)))?;

    Ok(format!("{}:{}", host, port))
}

/// Source of remote chains used by conflict resolution.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainResponse, PeerError>> + Send;
}

/// [`ChainFetcher`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: reqwest::Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ChainError> {
        // Peers are addressed directly; proxy settings from the environment do not apply.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ChainError::NetworkError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainResponse, PeerError>> + Send {
        let client = self.client.clone();
        let peer = peer.to_string();
        async move {
            let url = format!("http://{}/chain", peer);
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| PeerError::Transport {
                    peer: peer.clone(),
                    reason: e.to_string(),
                })?;

            if response.status() != StatusCode::OK {
                return Err(PeerError::Status {
                    peer,
                    status: response.status().as_u16(),
                });
            }

            response
                .json::<ChainResponse>()
                .await
                .map_err(|e| PeerError::Body {
                    peer,
                    reason: e.to_string(),
                })
        }
    }
}
