use crate::crypto::hash_block;
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::network::{normalize_peer_address, PeerSet};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Number, Value};

/// Proof stored in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Wire value of the genesis block's `previousHash`.
pub const GENESIS_PREVIOUS_HASH: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    /// Kept as the JSON number it arrived as, so integers never turn into floats.
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: amount.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "sender": self.sender,
            "receiver": self.receiver,
            "amount": self.amount,
        })
    }
}

/// Link from a block to its predecessor.
///
/// The genesis block has no predecessor and carries the integer `1` on the wire instead
/// of a digest. Every other block carries the hex hash of the block before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousHash {
    Genesis,
    Digest(String),
}

impl PreviousHash {
    pub fn is_genesis(&self) -> bool {
        matches!(self, PreviousHash::Genesis)
    }

    pub fn to_json(&self) -> Value {
        match self {
            PreviousHash::Genesis => json!(GENESIS_PREVIOUS_HASH),
            PreviousHash::Digest(hash) => json!(hash),
        }
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PreviousHash::Genesis => serializer.serialize_u64(GENESIS_PREVIOUS_HASH),
            PreviousHash::Digest(hash) => serializer.serialize_str(hash),
        }
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Sentinel(u64),
            Digest(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Sentinel(GENESIS_PREVIOUS_HASH) => Ok(PreviousHash::Genesis),
            Raw::Sentinel(other) => Err(D::Error::custom(format!(
                "previousHash must be a hash string or the genesis sentinel 1, got {}",
                other
            ))),
            Raw::Digest(hash) => Ok(PreviousHash::Digest(hash)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    #[serde(rename = "previousHash")]
    pub previous_hash: PreviousHash,
}

impl Block {
    pub fn hash(&self) -> String {
        hash_block(self)
    }

    /// JSON form of the block, field names as they appear on the wire.
    pub fn to_json(&self) -> Value {
        let transactions: Vec<Value> = self.transactions.iter().map(Transaction::to_json).collect();
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": transactions,
            "proof": self.proof,
            "previousHash": self.previous_hash.to_json(),
        })
    }
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// A node's chain, its pending transactions and its known peers.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    mempool: Mempool,
    peers: PeerSet,
}

impl Ledger {
    /// Create a ledger seeded with the genesis block.
    pub fn new() -> Self {
        let mut ledger = Ledger {
            blocks: Vec::new(),
            mempool: Mempool::new(),
            peers: PeerSet::new(),
        };
        ledger.create_genesis_block();
        ledger
    }

    fn create_genesis_block(&mut self) {
        debug_assert!(self.blocks.is_empty());
        self.blocks.push(Block {
            index: 1,
            timestamp: now_seconds(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: PreviousHash::Genesis,
        });
    }

    /// Queue a transaction for the next block and return that block's index.
    pub fn queue_transaction(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<Number>,
    ) -> u64 {
        self.mempool
            .add_transaction(Transaction::new(sender, receiver, amount));
        self.last_block().index + 1
    }

    /// Seal every pending transaction into a new block and append it.
    ///
    /// `previous_hash` defaults to the hash of the current last block.
    pub fn mine_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let block = Block {
            index: self.blocks.len() as u64 + 1,
            timestamp: now_seconds(),
            transactions: self.mempool.drain(),
            proof,
            previous_hash: PreviousHash::Digest(previous_hash),
        };
        self.blocks.push(block.clone());
        block
    }

    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    /// Overwrite the chain. Callers validate `chain` first.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        self.blocks = chain;
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.get_all_transactions()
    }

    pub fn pending_count(&self) -> usize {
        self.mempool.len()
    }

    /// Normalise `address` to `host:port` and add it to the peer set.
    pub fn register_peer(&mut self, address: &str) -> Result<String, ChainError> {
        let normalized = normalize_peer_address(address)?;
        self.peers.insert(normalized.clone());
        Ok(normalized)
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
