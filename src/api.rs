//! HTTP API for an AuraChain node
//!
//! Route names and JSON field names are shared by every node on the network, so peers
//! can register with and reconcile against each other.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Number};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::ChainError;
use crate::network::{normalize_peer_address, ChainResponse};
use crate::node::Node;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(e @ ChainError::InvalidPeerAddress(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::BlockchainError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Every field is optional so a missing one is reported as "Missing Values".
#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub amount: Option<Number>,
}

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct NodesResponse {
    message: String,
    #[serde(rename = "totalNodes")]
    total_nodes: Vec<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status, duration and chain height of every request.
async fn logging_middleware(State(node): State<Arc<Node>>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();
    let height = node.ledger.read().await.len();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        height,
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/mine", get(mine))
        .route("/transaction/new", post(new_transaction))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/show", get(show_nodes))
        .route("/nodes/resolve", get(resolve))
        .route("/chain", get(full_chain))
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(node.clone(), logging_middleware))
        .with_state(node)
        .layer(cors)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    node: Arc<Node>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_api_router(node);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn index() -> Html<&'static str> {
    Html("<center><h1>Aura Blockchain</h1></center>")
}

async fn mine(State(node): State<Arc<Node>>) -> Result<impl IntoResponse, ApiError> {
    if node.is_shutting_down() {
        return Err(ApiError::ServiceUnavailable("Node is shutting down".to_string()));
    }
    let block = node.mine().await?;

    Ok(Json(json!({
        "message": "New Block Forged",
        "index": block.index,
        "transactions": block.transactions,
        "proof": block.proof,
        "previousHash": block.previous_hash,
    })))
}

async fn new_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let (Some(sender), Some(receiver), Some(amount)) = (req.sender, req.receiver, req.amount)
    else {
        return Err(ApiError::InvalidInput("Missing Values".to_string()));
    };

    let index = node
        .ledger
        .write()
        .await
        .queue_transaction(sender, receiver, amount);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to the Block{}", index),
        }),
    ))
}

async fn register_nodes(
    State(node): State<Arc<Node>>,
    payload: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> Result<Json<NodesResponse>, ApiError> {
    let Json(req) = payload?;
    let nodes = req.nodes.ok_or_else(|| {
        ApiError::InvalidInput("Error: Please supply a valid list of nodes".to_string())
    })?;

    // Reject the whole request before touching the peer set if any address is bad.
    for address in &nodes {
        normalize_peer_address(address)?;
    }

    let mut ledger = node.ledger.write().await;
    for address in &nodes {
        ledger.register_peer(address)?;
    }

    Ok(Json(NodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes: ledger.peers().iter().cloned().collect(),
    }))
}

async fn show_nodes(State(node): State<Arc<Node>>) -> Json<NodesResponse> {
    let ledger = node.ledger.read().await;
    Json(NodesResponse {
        message: "These are the current nodes:".to_string(),
        total_nodes: ledger.peers().iter().cloned().collect(),
    })
}

async fn resolve(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let replaced = node.resolve_conflicts().await;
    let ledger = node.ledger.read().await;

    if replaced {
        Json(json!({
            "message": "Our Chain was replaced",
            "new chain": ledger.chain(),
        }))
    } else {
        Json(json!({
            "message": "Our chain is the Authoritative",
            "chain": ledger.chain(),
        }))
    }
}

async fn full_chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let ledger = node.ledger.read().await;
    Json(ChainResponse::new(ledger.chain().to_vec()))
}

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let ledger = node.ledger.read().await;
    Json(json!({
        "status": "healthy",
        "height": ledger.len(),
        "peers": ledger.peers().len(),
        "pending": ledger.pending_count(),
        "blocks_mined": node.blocks_mined(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
