//! # JSON-Lines RPC
//!
//! One request per line in, one response per line out.
//!
//! ## Protocol
//! ```text
//! stdin  ──► {"id": 1, "method": "getTransactionById", "params": {"id": "…"}}
//! stdout ◄── {"id": 1, "result": { … }}
//!
//! stdin  ──► {"id": 2, "method": "createTransaction", "params": { … }}
//! stdout ◄── {"id": 2, "error": {"code": "INSUFFICIENT_STOCK", "message": "…",
//!                               "retryable": false}}
//! ```
//!
//! ## Concurrency
//! ```text
//! reader ──► line 1 ──► spawn ──► dispatch ──┐
//!        ──► line 2 ──► spawn ──► dispatch ──┼──► mpsc ──► writer ──► stdout
//!        ──► line 3 ──► spawn ──► dispatch ──┘
//! ```
//! Requests run concurrently against the shared pool, so responses may
//! come back out of order; clients match them by `id`.

use std::io;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::commands::{receipt, report, transaction};
use crate::error::ApiError;
use crate::state::AppState;

/// Incoming request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Outgoing response envelope: exactly one of `result` / `error`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl RpcResponse {
    fn from_result(id: Value, result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(value) => RpcResponse {
                id,
                result: Some(value),
                error: None,
            },
            Err(err) => RpcResponse {
                id,
                result: None,
                error: Some(err),
            },
        }
    }
}

/// Routes a request to its command.
pub async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    debug!(method = %request.method, "Dispatching request");

    let result = route(state, &request.method, request.params).await;
    if let Err(err) = &result {
        debug!(method = %request.method, code = ?err.code, "Request failed");
    }

    RpcResponse::from_result(request.id, result)
}

async fn route(state: &AppState, method: &str, params: Value) -> Result<Value, ApiError> {
    match method {
        "createTransaction" => {
            respond(transaction::create_transaction(state, parse(params)?).await)
        }
        "updateTransactionStatus" => {
            respond(transaction::update_transaction_status(state, parse(params)?).await)
        }
        "getTransactions" => respond(transaction::get_transactions(state, parse(params)?).await),
        "getTransactionById" => {
            respond(transaction::get_transaction_by_id(state, parse(params)?).await)
        }
        "getTransactionByNumber" => {
            respond(transaction::get_transaction_by_number(state, parse(params)?).await)
        }
        "getTodaySalesSummary" => respond(report::get_today_sales_summary(state).await),
        "getMonthlyRevenue" => respond(report::get_monthly_revenue(state).await),
        "getLowStockProducts" => {
            respond(report::get_low_stock_products(state, parse(params)?).await)
        }
        "getReceipt" => respond(receipt::get_receipt(state, parse(params)?).await),
        other => Err(ApiError::validation(format!("Unknown method: {}", other))),
    }
}

/// Missing or `null` params are treated as `{}`.
fn parse<T: DeserializeOwned>(params: Value) -> Result<T, ApiError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ApiError::validation(format!("Invalid params: {}", e)))
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Result<Value, ApiError> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| {
        error!("Failed to serialize response: {}", e);
        ApiError::internal("Failed to serialize response")
    })
}

/// Handles one raw input line.
pub async fn handle_line(state: &AppState, line: &str) -> RpcResponse {
    match serde_json::from_str::<RpcRequest>(line) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => {
            warn!("Malformed request: {}", e);
            // Salvage the id if the envelope is valid JSON
            let id = serde_json::from_str::<Value>(line)
                .ok()
                .and_then(|v| v.get("id").cloned())
                .unwrap_or(Value::Null);
            RpcResponse::from_result(
                id,
                Err(ApiError::validation(format!("Malformed request: {}", e))),
            )
        }
    }
}

/// Serves requests from `reader` until EOF, writing responses to `writer`.
///
/// Returns the writer once every in-flight request has been answered.
pub async fn serve<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<W, io::Error>(writer)
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let state = state.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&state, &line).await;
            match serde_json::to_string(&response) {
                Ok(json) => {
                    // Receiver only closes after every sender is dropped
                    let _ = tx.send(json);
                }
                Err(e) => error!("Failed to encode response: {}", e),
            }
        });
    }

    drop(tx);
    writer_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{product, state};
    use serde_json::json;
    use std::collections::HashMap;

    async fn call(state: &AppState, method: &str, params: Value) -> RpcResponse {
        dispatch(
            state,
            RpcRequest {
                id: json!(1),
                method: method.to_string(),
                params,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_create_via_rpc_uses_decimal_amounts_and_whole_percent() {
        let state = state().await;
        let a = product(&state, "A", 1500, 100).await;
        let b = product(&state, "B", 3000, 100).await;

        let response = call(
            &state,
            "createTransaction",
            json!({
                "items": [{"product_id": a, "quantity": 2}, {"product_id": b, "quantity": 1}],
                "discount_percentage": 10,
                "payment_method": "cash",
                "payment_amount": 100.00,
                "creator_id": "cashier-1"
            }),
        )
        .await;

        assert!(response.error.is_none(), "{:?}", response.error);
        let result = response.result.unwrap();
        assert_eq!(result["subtotal"], 60.0);
        assert_eq!(result["discount_percentage"], 10.0);
        assert_eq!(result["discount_amount"], 6.0);
        assert_eq!(result["total_amount"], 54.0);
        assert_eq!(result["change_amount"], 46.0);
        assert_eq!(result["items"][0]["unit_price"], 15.0);
        assert_eq!(result["items"][0]["total_price"], 30.0);
        assert_eq!(result["status"], "completed");
        assert_eq!(result["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_amount_with_three_decimals_is_rejected() {
        let state = state().await;
        let a = product(&state, "A", 1500, 100).await;

        let response = call(
            &state,
            "createTransaction",
            json!({
                "items": [{"product_id": a, "quantity": 1}],
                "payment_method": "cash",
                "payment_amount": 15.005,
                "creator_id": "cashier-1"
            }),
        )
        .await;

        let err = serde_json::to_value(response.error.unwrap()).unwrap();
        assert_eq!(err["code"], "VALIDATION_ERROR");
        let p = state.db.products().get_by_id(&a).await.unwrap().unwrap();
        assert_eq!(p.stock_quantity, 100);
    }

    #[tokio::test]
    async fn test_errors_carry_code() {
        let state = state().await;

        let unknown = call(&state, "dropTables", Value::Null).await;
        assert_eq!(serde_json::to_value(unknown.error.unwrap()).unwrap()["code"], "VALIDATION_ERROR");

        let bad_status = call(&state, "updateTransactionStatus", json!({"id": "x", "status": "refunded"})).await;
        assert!(bad_status.error.is_some());

        let missing = call(&state, "getTransactionById", json!({"id": "x"})).await;
        let err = serde_json::to_value(missing.error.unwrap()).unwrap();
        assert_eq!(err["code"], "NOT_FOUND");
        assert_eq!(err["retryable"], false);

        // Reports take no params; null is fine
        let summary = call(&state, "getTodaySalesSummary", Value::Null).await;
        assert_eq!(summary.result.unwrap()["total_transactions"], 0);
        let revenue = call(&state, "getMonthlyRevenue", json!({})).await;
        assert_eq!(revenue.result.unwrap(), json!(0.0));
    }

    #[tokio::test]
    async fn test_serve_answers_every_line() {
        let state = Arc::new(state().await);
        let a = product(&state, "A", 1000, 5).await;

        let input = format!(
            concat!(
                "{{\"id\": 1, \"method\": \"getTodaySalesSummary\"}}\n",
                "\n",
                "not json\n",
                "{{\"id\": \"two\", \"method\": \"createTransaction\", \"params\": ",
                "{{\"items\": [{{\"product_id\": \"{}\", \"quantity\": 1}}], ",
                "\"payment_method\": \"qris\", \"payment_amount\": 10.00, \"creator_id\": \"c\"}}}}\n",
                "{{\"id\": 3, \"method\": \"getLowStockProducts\", \"params\": {{\"limit\": 5}}}}\n",
            ),
            a
        );

        let output = serve(state.clone(), input.as_bytes(), Vec::new()).await.unwrap();
        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);

        let by_id: HashMap<String, &Value> = responses
            .iter()
            .map(|r| (r["id"].to_string(), r))
            .collect();
        assert!(by_id["1"].get("result").is_some());
        assert_eq!(by_id["null"]["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(by_id["\"two\""]["result"]["payment_method"], "qris");
        assert!(by_id["3"]["result"].is_array());

        let p = state.db.products().get_by_id(&a).await.unwrap().unwrap();
        assert_eq!(p.stock_quantity, 4);
    }
}
