//! Integration tests for the AuraChain HTTP API
//!
//! These tests drive every route through the router and check status codes and the
//! JSON field names other nodes rely on.

use aurachain::api::build_api_router;
use aurachain::config::Config;
use aurachain::node::{Node, MINING_REWARD_SENDER};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server() -> (TestServer, Arc<Node>) {
    let node = Arc::new(Node::new(Config::default()).expect("Failed to create node"));
    let app = build_api_router(node.clone());
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, node)
}

#[tokio::test]
async fn test_fresh_chain_endpoint() {
    let (server, _node) = test_server();

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["proof"], 100);
    assert_eq!(json["chain"][0]["previousHash"], 1);
    assert!(json["chain"][0]["transactions"].as_array().unwrap().is_empty());
    assert!(json["chain"][0]["timestamp"].is_f64());
}

#[tokio::test]
async fn test_index_page() {
    let (server, _node) = test_server();

    let response = server.get("/").await;
    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Aura Blockchain"));
}

#[tokio::test]
async fn test_new_transaction() {
    let (server, node) = test_server();

    let response = server
        .post("/transaction/new")
        .json(&json!({"sender": "alice", "receiver": "bob", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "Transaction will be added to the Block2");

    let ledger = node.ledger.read().await;
    assert_eq!(ledger.pending_count(), 1);
    assert_eq!(ledger.pending_transactions()[0].receiver, "bob");
}

#[tokio::test]
async fn test_new_transaction_missing_values() {
    let (server, node) = test_server();

    let response = server
        .post("/transaction/new")
        .json(&json!({"sender": "alice", "receiver": "bob"}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "Missing Values");
    assert!(node.ledger.read().await.pending_transactions().is_empty());
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let (server, node) = test_server();

    let response = server.post("/transaction/new").text("sender=alice").await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/transaction/new")
        .json(&json!({"sender": "alice", "receiver": "bob", "amount": "5"}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": "127.0.0.1:5001"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let ledger = node.ledger.read().await;
    assert_eq!(ledger.pending_count(), 0);
    assert!(ledger.peers().is_empty());
}

#[tokio::test]
async fn test_mine_forges_block() {
    let (server, node) = test_server();

    server
        .post("/transaction/new")
        .json(&json!({"sender": "alice", "receiver": "bob", "amount": 2.5}))
        .await;

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New Block Forged");
    assert_eq!(json["index"], 2);
    assert!(json["proof"].is_u64());
    assert!(json["previousHash"].is_string());

    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["amount"], 2.5);
    assert_eq!(transactions[1]["sender"], MINING_REWARD_SENDER);
    assert_eq!(transactions[1]["receiver"], node.node_id.as_str());

    let chain: Value = server.get("/chain").await.json();
    assert_eq!(chain["length"], 2);
    assert_eq!(chain["chain"][1]["previousHash"], json["previousHash"]);
}

#[tokio::test]
async fn test_register_and_show_nodes() {
    let (server, _node) = test_server();

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": ["http://127.0.0.1:5001", "127.0.0.1:5001", "127.0.0.1:5002"]}))
        .await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New nodes have been added");
    assert_eq!(json["totalNodes"], json!(["127.0.0.1:5001", "127.0.0.1:5002"]));

    let response = server.get("/nodes/show").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["totalNodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_register_nodes_rejects_bad_input() {
    let (server, node) = test_server();

    let response = server.post("/nodes/register").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "Error: Please supply a valid list of nodes");

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": ["127.0.0.1:5001", "http://"]}))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(node.ledger.read().await.peers().is_empty());
}

#[tokio::test]
async fn test_resolve_without_peers_is_authoritative() {
    let (server, _node) = test_server();

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "Our chain is the Authoritative");
    assert_eq!(json["chain"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health() {
    let (server, _node) = test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["height"], 1);
    assert_eq!(json["peers"], 0);
    assert_eq!(json["pending"], 0);
    assert_eq!(json["blocks_mined"], 0);
    assert!(json["timestamp"].is_string());
}
