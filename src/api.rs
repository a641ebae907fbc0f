//! REST API for PowLedger
//!
//! Exposes the ledger over HTTP: mining, transaction submission, chain
//! inspection and validation, and peer registration. The JSON field names of
//! blocks and transactions (`index`, `timestamp`, `transactions`, `proof`,
//! `previous_hash`, `sender`, `recipient`, `amount`) are part of the contract.

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{validate_chain, Block, Blockchain, ChainViolation};
use crate::error::ChainError;
use crate::network::{parse_netloc, NodeRegistry};
use crate::node::NodeState;
use crate::transaction::Transaction;

/// Shared handle the HTTP handlers operate on
#[derive(Clone)]
pub struct Node {
    pub blockchain: Arc<RwLock<Blockchain>>,
    pub registry: Arc<parking_lot::RwLock<NodeRegistry>>,
    // Optional shared orchestrator state (NodeState) for health checks and logging
    pub state: Option<Arc<RwLock<NodeState>>>,
    node_id: Arc<str>,
    // Only one proof search runs at a time
    mining_lock: Arc<Mutex<()>>,
    blocks_mined: Arc<AtomicU64>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    transactions_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl Node {
    /// Create a node owning a fresh ledger handle and an empty peer registry.
    pub fn new(blockchain: Blockchain, node_id: impl Into<String>) -> Self {
        Self::new_shared(
            Arc::new(RwLock::new(blockchain)),
            Arc::new(parking_lot::RwLock::new(NodeRegistry::new())),
            node_id,
            None,
        )
    }

    /// Create an API node over ledger and registry handles owned elsewhere,
    /// so the orchestrator and the HTTP layer observe the same state.
    pub fn new_shared(
        blockchain: Arc<RwLock<Blockchain>>,
        registry: Arc<parking_lot::RwLock<NodeRegistry>>,
        node_id: impl Into<String>,
        state: Option<Arc<RwLock<NodeState>>>,
    ) -> Self {
        let node_id: String = node_id.into();
        Self {
            blockchain,
            registry,
            state,
            node_id: Arc::from(node_id),
            mining_lock: Arc::new(Mutex::new(())),
            blocks_mined: Arc::new(AtomicU64::new(0)),
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Get total blocks mined through this node
    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    /// Search the proof for the current last block, then pay this node and
    /// seal the pending pool into a new block.
    ///
    /// The search runs on a blocking thread without holding the ledger lock;
    /// transactions submitted meanwhile are included in the block. The reward
    /// and the seal happen under a single write lock.
    pub async fn mine(&self) -> Result<Block, ApiError> {
        let _guard = self.mining_lock.lock().await;

        let (last_proof, previous_hash, pow) = {
            let bc = self.blockchain.read().await;
            let last_block = bc.last_block();
            (last_block.proof, last_block.hash(), *bc.proof_of_work_engine())
        };

        let started = Instant::now();
        let proof = tokio::task::spawn_blocking(move || pow.proof_of_work(last_proof))
            .await
            .map_err(|e| ApiError::InternalError(format!("Proof search failed: {}", e)))?;

        let block = {
            let mut bc = self.blockchain.write().await;
            bc.reward_and_seal(proof, &self.node_id, previous_hash)
        };

        self.blocks_mined.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            search_ms = %started.elapsed().as_millis(),
            "forged new block"
        );
        Ok(block)
    }

    /// Get API statistics
    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            transactions_submitted: stats.transactions_submitted,
            uptime_seconds: uptime,
            blocks_mined: self.blocks_mined(),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
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

/// Body of `POST /transactions/new`. Fields are optional so a missing one is
/// reported as `Missing values` rather than a generic decoding failure.
#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<u64>,
}

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Deserialize)]
pub struct ValidateChainRequest {
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<ChainViolation>,
}

impl ValidationResponse {
    fn from_result(length: usize, result: Result<(), ChainViolation>) -> Self {
        let violation = result.err();
        ValidationResponse {
            valid: violation.is_none(),
            length,
            violation,
        }
    }
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transactions_submitted: u64,
    pub uptime_seconds: u64,
    pub blocks_mined: u64,
}

// ============================================================================
// Middleware
// ============================================================================

/// Request statistics middleware
async fn stats_middleware(State(node): State<Arc<Node>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = node.api_stats.write().await;
    stats.record_request(success);

    response
}

/// Detailed request logging middleware. Logs method, path, status, duration
/// and current `NodeState` (when available).
async fn logging_middleware(
    State(node): State<Arc<Node>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    let node_state = if let Some(s) = &node.state {
        format!("{:?}", s.read().await.clone())
    } else {
        "unknown".to_string()
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        node_state = %node_state,
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the router with all endpoints
pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        // Ledger endpoints
        .route("/mine", get(mine_block))
        .route("/chain", get(full_chain))
        .route("/chain/validate", get(validate_local_chain).post(validate_candidate_chain))
        .route("/block/:index", get(get_block_by_index))
        // Transaction endpoints
        .route("/transactions/new", post(new_transaction))
        .route("/transactions/pending", get(pending_transactions))
        // Peer endpoints
        .route("/nodes", get(list_nodes))
        .route("/nodes/register", post(register_nodes))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing and node-state
        .layer(middleware::from_fn_with_state(node.clone(), logging_middleware))
        .layer(middleware::from_fn_with_state(node.clone(), stats_middleware))
        .with_state(node)
        .layer(cors)
}

/// Bind `addr` and serve the API until the process stops.
pub async fn run_api_server(node: Arc<Node>, addr: SocketAddr) -> Result<(), ChainError> {
    let app = build_api_router(node);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn mine_block(State(node): State<Arc<Node>>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine().await?;

    Ok(Json(MineResponse {
        message: "New Block Forged".to_string(),
        index: block.index,
        timestamp: block.timestamp,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn new_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let Json(req) = payload?;

    let (sender, recipient, amount) = match (req.sender, req.recipient, req.amount) {
        (Some(sender), Some(recipient), Some(amount)) => (sender, recipient, amount),
        _ => {
            tracing::warn!("rejected transaction with missing fields");
            return Err(ApiError::InvalidInput("Missing values".to_string()));
        }
    };

    let index = node
        .blockchain
        .write()
        .await
        .new_transaction(sender, recipient, amount);

    {
        let mut stats = node.api_stats.write().await;
        stats.transactions_submitted += 1;
    }

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            message: format!("Transaction will be added to Block {}", index),
            index,
        }),
    ))
}

async fn full_chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let blockchain = node.blockchain.read().await;
    Json(ChainResponse {
        chain: blockchain.chain().to_vec(),
        length: blockchain.len(),
    })
}

async fn get_block_by_index(
    State(node): State<Arc<Node>>,
    Path(index): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    let blockchain = node.blockchain.read().await;

    blockchain
        .chain()
        .iter()
        .find(|b| b.index == index)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Block {} not found", index)))
}

async fn pending_transactions(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let blockchain = node.blockchain.read().await;
    let transactions = blockchain.pending_transactions();
    Json(serde_json::json!({
        "count": transactions.len(),
        "transactions": transactions,
        "next_index": blockchain.next_index(),
    }))
}

async fn validate_local_chain(State(node): State<Arc<Node>>) -> Json<ValidationResponse> {
    let blockchain = node.blockchain.read().await;
    Json(ValidationResponse::from_result(
        blockchain.len(),
        blockchain.is_valid(),
    ))
}

async fn validate_candidate_chain(
    State(node): State<Arc<Node>>,
    payload: Result<Json<ValidateChainRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let Json(req) = payload?;
    let pow = *node.blockchain.read().await.proof_of_work_engine();

    let result = validate_chain(&req.chain, &pow);
    if let Err(violation) = &result {
        tracing::warn!(%violation, "candidate chain rejected");
    }
    Ok(Json(ValidationResponse::from_result(req.chain.len(), result)))
}

async fn list_nodes(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let nodes = node.registry.read().nodes();
    Json(serde_json::json!({
        "count": nodes.len(),
        "nodes": nodes,
    }))
}

async fn register_nodes(
    State(node): State<Arc<Node>>,
    payload: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterNodesResponse>), ApiError> {
    let Json(req) = payload?;

    if req.nodes.is_empty() {
        return Err(ApiError::InvalidInput(
            "Please supply a valid list of nodes".to_string(),
        ));
    }

    // Reject the whole batch before touching the registry.
    for address in &req.nodes {
        if let Err(e) = parse_netloc(address) {
            tracing::warn!(%address, error = %e, "rejected peer address");
            return Err(e.into());
        }
    }

    let total_nodes = {
        let mut registry = node.registry.write();
        for address in &req.nodes {
            registry.register_node(address)?;
        }
        registry.nodes()
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterNodesResponse {
            message: "New nodes have been added".to_string(),
            total_nodes,
        }),
    ))
}

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    // If the orchestrator provided a `NodeState`, use it to determine health.
    if let Some(s) = &node.state {
        let state = s.read().await.clone();
        let status = if state == NodeState::Ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (
            status,
            Json(serde_json::json!({
                "status": if status == StatusCode::OK { "healthy" } else { "unhealthy" },
                "node_state": format!("{:?}", state),
                "node_id": node.node_id(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "node_id": node.node_id(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response()
    }
}

async fn get_api_stats(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let stats = node.get_stats().await;
    Json(stats)
}
