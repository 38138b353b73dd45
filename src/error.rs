//! Error types for AuraChain

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Block at the given chain position does not link to its predecessor's hash.
    InvalidBlockLinkage(usize),
    /// Block at the given chain position carries a proof that does not solve its predecessor's.
    InvalidProofOfWork(usize),
    InvalidPeerAddress(String),
    NetworkError(String),
    MiningError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidBlockLinkage(pos) => {
                write!(f, "Invalid block linkage at chain position {}", pos)
            }
            ChainError::InvalidProofOfWork(pos) => {
                write!(f, "Invalid proof of work at chain position {}", pos)
            }
            ChainError::InvalidPeerAddress(addr) => write!(f, "Invalid peer address: {}", addr),
            ChainError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ChainError::MiningError(msg) => write!(f, "Mining error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
