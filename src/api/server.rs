//! API Server Module
//! 
//! This module implements a JSON-RPC server over the validator.
//! Every request is answered from the shared validator; validation results
//! are only ever produced by running `validate` against the store.

use crate::{config::ApiConfig, state::SharedValidator, Transaction, Txid};
use axum::{extract::State, routing::post, Json, Router};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Shared application state accessible across all request handlers
#[derive(Clone)]
pub struct AppState {
    validator: SharedValidator,
}

/// The main API server struct
pub struct Server {
    config: ApiConfig,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    /// 
    /// # Arguments
    /// * `config` - Listening address
    /// * `validator` - The validator every request is answered from
    pub fn new(config: ApiConfig, validator: SharedValidator) -> Self {
        Self {
            config,
            state: AppState { validator },
        }
    }

    /// Starts the API server and begins listening for incoming requests
    /// 
    /// # Returns
    /// `Ok(())` once the server stops, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.state.validator);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Router with the single JSON-RPC endpoint at "/"
pub fn router(validator: SharedValidator) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .with_state(AppState { validator })
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Value,
}

/// JSON-RPC 2.0 response structure
/// 
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Value,
}

/// JSON-RPC error object
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
const NOT_VALID: i32 = -32000;

impl JsonRpcResponse {
    fn success(id: Value, result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id,
            },
            Err(e) => Self::failure(id, INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    fn failure(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TxidParams {
    txid: Txid,
}

#[derive(Debug, Deserialize)]
struct TransactionParams {
    transaction: Transaction,
}

/// Result of the "validate" method
#[derive(Debug, Serialize)]
struct ValidationReport {
    txid: Txid,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    /// Whether a later query may succeed once more history is ingested
    retryable: bool,
}

/// Result of the "graphSearch" method
#[derive(Debug, Serialize)]
struct GraphSearchResult {
    txid: Txid,
    txids: Vec<Txid>,
}

/// Main RPC request handler
/// 
/// Routes the request to the appropriate handler based on the method name.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);

    let response = match request.method.as_str() {
        "validate" => handle_validate(&state, request).await,
        "graphSearch" => handle_graph_search(&state, request).await,
        "addTransaction" => handle_add_transaction(&state, request).await,
        "removeTransaction" => handle_remove_transaction(&state, request).await,
        "addValidTxid" => handle_add_valid_txid(&state, request).await,
        "stats" => JsonRpcResponse::success(request.id, state.validator.stats().await),
        _ => JsonRpcResponse::failure(request.id, METHOD_NOT_FOUND, "Method not found".to_string()),
    };

    Json(response)
}

/// Deserialize method parameters, mapping failures to an invalid params error
fn parse_params<T: DeserializeOwned>(request: &JsonRpcRequest) -> Result<T, JsonRpcResponse> {
    serde_json::from_value(request.params.clone()).map_err(|e| {
        warn!("Invalid params for {}: {}", request.method, e);
        JsonRpcResponse::failure(request.id.clone(), INVALID_PARAMS, format!("Invalid params: {}", e))
    })
}

/// Handles the "validate" RPC method
async fn handle_validate(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: TxidParams = match parse_params(&request) {
        Ok(params) => params,
        Err(response) => return response,
    };

    let report = match state.validator.try_validate(&params.txid).await {
        Ok(()) => ValidationReport {
            txid: params.txid,
            valid: true,
            reason: None,
            retryable: false,
        },
        Err(e) => ValidationReport {
            txid: params.txid,
            valid: false,
            reason: Some(e.to_string()),
            retryable: e.is_retryable(),
        },
    };
    JsonRpcResponse::success(request.id, report)
}

/// Handles the "graphSearch" RPC method
/// 
/// Returns the txids of the token graph backing a valid transaction.
async fn handle_graph_search(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: TxidParams = match parse_params(&request) {
        Ok(params) => params,
        Err(response) => return response,
    };

    match state.validator.graph_search(&params.txid).await {
        Some(txids) => JsonRpcResponse::success(
            request.id,
            GraphSearchResult {
                txid: params.txid,
                txids,
            },
        ),
        None => JsonRpcResponse::failure(
            request.id,
            NOT_VALID,
            format!("{} is not a valid token transaction", params.txid),
        ),
    }
}

async fn handle_add_transaction(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: TransactionParams = match parse_params(&request) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let changed = state.validator.add_tx(params.transaction).await;
    JsonRpcResponse::success(request.id, changed)
}

async fn handle_remove_transaction(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: TxidParams = match parse_params(&request) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let removed = state.validator.remove_tx(&params.txid).await;
    JsonRpcResponse::success(request.id, removed)
}

async fn handle_add_valid_txid(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: TxidParams = match parse_params(&request) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let changed = state.validator.add_valid_txid(params.txid).await;
    JsonRpcResponse::success(request.id, changed)
}
