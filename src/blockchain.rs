// Thin re-export module: implementation is in `blockchain/core.rs`, split into the
// chain/ledger types and candidate-chain validation.

pub mod core;
pub use core::*;
