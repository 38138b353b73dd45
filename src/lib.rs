//! AuraChain - a minimal proof-of-work ledger node
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger and candidate-chain validation
//! - [`mempool`] - Pending transactions awaiting the next block
//! - [`crypto`] - Canonical block hashing (SHA-256)
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work search and verification
//! - [`consensus`] - Longest-valid-chain conflict resolution
//! - [`network`] - Peer addresses and the chain-fetching client
//!
//! ## Node
//! - [`node`] - Node orchestration: mining workflow and periodic reconciliation
//! - [`api`] - HTTP API
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod crypto;
pub mod mempool;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;
pub mod network;

// ============================================================================
// Node
// ============================================================================
pub mod node;

#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
