//! Tests for the JSON-RPC API
//! 
//! Requests are driven through the router in-process.

#[cfg(test)]
mod tests {
    use crate::{api::router, SharedValidator, SlpValidator};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const GENESIS: &str = "00000000000000000000000000000000000000000000000000000000000000a1";
    const SEND: &str = "00000000000000000000000000000000000000000000000000000000000000a2";
    const OVERSPEND: &str = "00000000000000000000000000000000000000000000000000000000000000a3";

    fn genesis() -> Value {
        json!({
            "id": GENESIS,
            "output_values": [0, 546],
            "slp": {
                "token_type": "FUNGIBLE",
                "transaction_kind": "GENESIS",
                "token_id": GENESIS,
                "output_quantities": ["1000"]
            }
        })
    }

    fn send(id: &str, quantity: &str) -> Value {
        json!({
            "id": id,
            "inputs": [{ "txid": GENESIS, "vout": 1 }],
            "output_values": [0, 546],
            "slp": {
                "token_type": "FUNGIBLE",
                "transaction_kind": "SEND",
                "token_id": GENESIS,
                "output_quantities": [quantity]
            }
        })
    }

    /// Helper function to send one JSON-RPC call and decode the response
    async fn call(app: &Router, method: &str, params: Value) -> Value {
        let body = json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 });
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        router(SharedValidator::new(SlpValidator::default()))
    }

    #[tokio::test]
    async fn test_add_and_validate_over_rpc() {
        let app = app();

        let added = call(&app, "addTransaction", json!({ "transaction": genesis() })).await;
        assert_eq!(added["result"], json!(true));
        call(&app, "addTransaction", json!({ "transaction": send(SEND, "1000") })).await;
        call(&app, "addTransaction", json!({ "transaction": send(OVERSPEND, "1001") })).await;

        let valid = call(&app, "validate", json!({ "txid": SEND })).await;
        assert_eq!(valid["result"]["valid"], json!(true));
        assert_eq!(valid["result"]["txid"], json!(SEND));

        let invalid = call(&app, "validate", json!({ "txid": OVERSPEND })).await;
        assert_eq!(invalid["result"]["valid"], json!(false));
        assert_eq!(invalid["result"]["retryable"], json!(false));
        assert!(invalid["result"]["reason"].as_str().unwrap().contains("conservation"));

        let stats = call(&app, "stats", Value::Null).await;
        assert_eq!(stats["result"]["validations_passed"], json!(1));
        assert_eq!(stats["result"]["validations_failed"], json!(1));
    }

    #[tokio::test]
    async fn test_missing_ancestor_is_reported_retryable() {
        let app = app();
        call(&app, "addTransaction", json!({ "transaction": send(SEND, "1000") })).await;

        let pending = call(&app, "validate", json!({ "txid": SEND })).await;
        assert_eq!(pending["result"]["valid"], json!(false));
        assert_eq!(pending["result"]["retryable"], json!(true));

        call(&app, "addTransaction", json!({ "transaction": genesis() })).await;
        let valid = call(&app, "validate", json!({ "txid": SEND })).await;
        assert_eq!(valid["result"]["valid"], json!(true));
    }

    #[tokio::test]
    async fn test_graph_search_over_rpc() {
        let app = app();
        call(&app, "addTransaction", json!({ "transaction": genesis() })).await;
        call(&app, "addTransaction", json!({ "transaction": send(SEND, "1000") })).await;
        call(&app, "addTransaction", json!({ "transaction": send(OVERSPEND, "1001") })).await;

        let found = call(&app, "graphSearch", json!({ "txid": SEND })).await;
        assert_eq!(found["result"]["txids"], json!([SEND, GENESIS]));

        let rejected = call(&app, "graphSearch", json!({ "txid": OVERSPEND })).await;
        assert_eq!(rejected["error"]["code"], json!(-32000));
    }

    #[tokio::test]
    async fn test_checkpoint_and_removal_over_rpc() {
        let app = app();
        call(&app, "addTransaction", json!({ "transaction": genesis() })).await;

        let seeded = call(&app, "addValidTxid", json!({ "txid": GENESIS })).await;
        assert_eq!(seeded["result"], json!(true));

        let removed = call(&app, "removeTransaction", json!({ "txid": GENESIS })).await;
        assert_eq!(removed["result"], json!(true));
        let removed_again = call(&app, "removeTransaction", json!({ "txid": GENESIS })).await;
        assert_eq!(removed_again["result"], json!(false));
    }

    #[tokio::test]
    async fn test_rpc_errors() {
        let app = app();

        let unknown = call(&app, "mint", json!({})).await;
        assert_eq!(unknown["error"]["code"], json!(-32601));

        let bad_txid = call(&app, "validate", json!({ "txid": "not-hex" })).await;
        assert_eq!(bad_txid["error"]["code"], json!(-32602));

        let missing_params = call(&app, "addTransaction", json!({})).await;
        assert_eq!(missing_params["error"]["code"], json!(-32602));
    }
}
