use crate::blockchain::{Block, Ledger};
use crate::config::Config;
use crate::consensus::{Consensus, SharedLedger};
use crate::error::ChainError;
use crate::miner::solve_cancellable;
use crate::network::HttpChainFetcher;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Sender of the reward transaction a node pays itself for forging a block.
pub const MINING_REWARD_SENDER: &str = "0";

/// A running ledger node: the shared ledger plus everything needed to mine and reconcile.
pub struct Node {
    pub config: Config,
    pub ledger: SharedLedger,
    /// Random identifier that receives this node's mining rewards.
    pub node_id: String,
    fetcher: HttpChainFetcher,
    shutdown: Arc<AtomicBool>,
    blocks_mined: AtomicU64,
}

impl Node {
    pub fn new(config: Config) -> Result<Self, ChainError> {
        Self::with_ledger(config, Ledger::new())
    }

    /// Build a node around an existing ledger, registering the configured bootstrap peers.
    pub fn with_ledger(config: Config, mut ledger: Ledger) -> Result<Self, ChainError> {
        for peer in &config.network.bootstrap_peers {
            match ledger.register_peer(peer) {
                Ok(addr) => info!(peer = %addr, "node.bootstrap_peer"),
                Err(e) => warn!(peer = %peer, error = %e, "node.bootstrap_peer_rejected"),
            }
        }

        let fetcher = HttpChainFetcher::new(config.network.peer_timeout())?;
        Ok(Self {
            config,
            ledger: Arc::new(RwLock::new(ledger)),
            node_id: new_node_id(),
            fetcher,
            shutdown: Arc::new(AtomicBool::new(false)),
            blocks_mined: AtomicU64::new(0),
        })
    }

    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    /// Solve the next proof, pay the mining reward and append a new block.
    ///
    /// The search runs off the ledger lock. If the tip changed meanwhile (a chain swap or
    /// another mine), the proof is stale and the search restarts against the new tip.
    pub async fn mine(&self) -> Result<Block, ChainError> {
        loop {
            let (last_proof, last_hash) = {
                let ledger = self.ledger.read().await;
                let last = ledger.last_block();
                (last.proof, last.hash())
            };

            let cancel = self.shutdown.clone();
            let proof = tokio::task::spawn_blocking(move || solve_cancellable(last_proof, &cancel))
                .await
                .map_err(|e| ChainError::MiningError(format!("proof search panicked: {}", e)))?
                .ok_or_else(|| ChainError::MiningError("proof search cancelled".to_string()))?;

            match self.forge(proof, last_hash).await {
                Some(block) => return Ok(block),
                None => info!(proof, "node.mine_tip_moved"),
            }
        }
    }

    /// Append a block sealed by `proof` if the tip still hashes to `expected_tip`.
    ///
    /// Returns `None` without touching the ledger when the tip has moved.
    async fn forge(&self, proof: u64, expected_tip: String) -> Option<Block> {
        let mut ledger = self.ledger.write().await;
        if ledger.last_block().hash() != expected_tip {
            return None;
        }

        ledger.queue_transaction(
            MINING_REWARD_SENDER,
            self.node_id.as_str(),
            self.config.miner.reward,
        );
        let block = ledger.mine_block(proof, Some(expected_tip));
        self.blocks_mined.fetch_add(1, Ordering::Relaxed);
        info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            "node.block_forged"
        );
        Some(block)
    }

    pub async fn resolve_conflicts(&self) -> bool {
        Consensus::resolve_conflicts(&self.ledger, &self.fetcher).await
    }

    /// Start the periodic reconciliation loop when an interval is configured.
    pub fn spawn_resolver(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let interval = self.config.network.resolve_interval()?;
        let node = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so peers have time to start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if node.is_shutting_down() {
                    break;
                }
                let replaced = node.resolve_conflicts().await;
                let height = node.ledger.read().await.len();
                info!(replaced, height, "node.periodic_resolve");
            }
            info!("node.resolver_stopped");
        }))
    }

    /// Stop background work and abort any proof search in progress.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Serve the HTTP API until ctrl-c.
    #[cfg(feature = "api")]
    pub async fn start(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.network.host, self.config.network.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("API address {} unavailable: {}", addr, e))?;

        let peers = self.ledger.read().await.peers().len();
        info!(address = %addr, node_id = %self.node_id, peers, "node.started");

        let resolver = self.spawn_resolver();
        let node = self.clone();
        crate::api::serve(listener, self.clone(), async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "node.signal_handler_failed");
            }
            info!("node.shutting_down");
            node.shutdown();
        })
        .await?;

        if let Some(task) = resolver {
            task.abort();
        }
        Ok(())
    }
}

fn new_node_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
