//! JSON-RPC ledger client (`eth_blockNumber`, `eth_getLogs`).

use super::abi::{self, DecodedEvent, RawLog};
use super::{ChunkEvents, LedgerSource, LedgerSourceError};
use crate::domain::{sort_chronological, BlockNumber, BlockRange};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Ledger source backed by a public JSON-RPC endpoint.
#[derive(Debug)]
pub struct JsonRpcLedgerSource {
    client: Client,
    rpc_url: String,
    contract_address: String,
    next_id: AtomicU64,
}

impl JsonRpcLedgerSource {
    /// Create a new client for one auction contract.
    pub fn new(rpc_url: String, contract_address: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            contract_address: contract_address.to_lowercase(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerSourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LedgerSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(LedgerSourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(LedgerSourceError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            });
        }

        let mut body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| LedgerSourceError::ParseError(e.to_string()))?;

        extract_result(&mut body)
    }
}

/// Pull `result` out of a JSON-RPC response, mapping an `error` object.
fn extract_result(body: &mut serde_json::Value) -> Result<serde_json::Value, LedgerSourceError> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(LedgerSourceError::RpcError { code, message });
    }

    body.get_mut("result")
        .map(serde_json::Value::take)
        .ok_or_else(|| LedgerSourceError::ParseError("Missing result field".to_string()))
}

/// Decode a `eth_getLogs` result, skipping logs that cannot be decoded.
///
/// Only a result that is not an array fails the chunk; a malformed element
/// is dropped with a warning.
pub fn decode_logs(result: serde_json::Value) -> Result<ChunkEvents, LedgerSourceError> {
    let entries: Vec<serde_json::Value> = serde_json::from_value(result)
        .map_err(|e| LedgerSourceError::ParseError(format!("Invalid log array: {}", e)))?;

    let mut events = ChunkEvents::default();
    for entry in entries {
        let log = match RawLog::deserialize(&entry) {
            Ok(log) => log,
            Err(e) => {
                let tx = entry
                    .get("transactionHash")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                warn!(tx = %tx, error = %e, "Skipping malformed log");
                continue;
            }
        };
        if log.removed {
            debug!("Skipping removed log in tx {}", log.transaction_hash);
            continue;
        }
        match abi::decode_log(&log) {
            Ok(DecodedEvent::Bid(bid)) => events.bid_events.push(bid),
            Ok(DecodedEvent::Exit(exit)) => events.exit_events.push(exit),
            Err(e) => {
                warn!(tx = %log.transaction_hash, error = %e, "Failed to decode log");
            }
        }
    }

    sort_chronological(&mut events.bid_events);
    sort_chronological(&mut events.exit_events);
    Ok(events)
}

#[async_trait]
impl LedgerSource for JsonRpcLedgerSource {
    async fn head_block(&self) -> Result<BlockNumber, LedgerSourceError> {
        let result = self.call("eth_blockNumber", serde_json::json!([])).await?;
        let quantity = result
            .as_str()
            .ok_or_else(|| LedgerSourceError::ParseError("Expected hex quantity".to_string()))?;

        abi::parse_quantity("blockNumber", quantity)
            .map(BlockNumber::new)
            .map_err(|e| LedgerSourceError::ParseError(e.to_string()))
    }

    async fn fetch_events(&self, range: BlockRange) -> Result<ChunkEvents, LedgerSourceError> {
        debug!("Fetching logs for blocks {}", range);

        let filter = serde_json::json!({
            "address": self.contract_address,
            "fromBlock": abi::to_quantity(range.from.as_u64()),
            "toBlock": abi::to_quantity(range.to.as_u64()),
            "topics": [[
                abi::topic_hex(abi::bid_submitted_topic()),
                abi::topic_hex(abi::bid_exited_topic()),
            ]],
        });

        let result = self.call("eth_getLogs", serde_json::json!([filter])).await?;
        decode_logs(result)
    }
}
