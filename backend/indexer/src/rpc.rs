//! Soroban RPC client — polls `getEvents` and decodes FundMe events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Value shapes
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive as
//! JSON renderings of `ScVal`s (`{"symbol":"funded"}`, `{"i128":"10000000"}`,
//! `{"map":[{"key":…,"val":…}]}`). Older nodes that ignore the flag may send
//! pre-flattened values; both are accepted.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, FundMeEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawEvent {
    #[serde(default)]
    pub topic: Vec<Value>,
    #[serde(rename = "topicJson", default)]
    pub topic_json: Vec<Value>,
    pub value: Option<Value>,
    #[serde(rename = "valueJson")]
    pub value_json: Option<Value>,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

impl RawEvent {
    fn topics(&self) -> &[Value] {
        if self.topic_json.is_empty() {
            &self.topic
        } else {
            &self.topic_json
        }
    }

    fn data(&self) -> Option<&Value> {
        self.value_json.as_ref().or(self.value.as_ref())
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("empty result".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

/// Malformed requests and unknown methods will not succeed on retry.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601 | -32602)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`FundMeEvent`]s, dropping events from failed
/// calls and kinds the ledger does not emit.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<FundMeEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<FundMeEvent> {
    let topics = raw.topics();
    let kind = EventKind::from_topic(&scalar(topics.first()?)?);
    if kind == EventKind::Unknown {
        return None;
    }

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let account_field = match kind {
        EventKind::Funded => "funder",
        EventKind::Withdrawn => "owner",
        EventKind::Unknown => return None,
    };
    let data = raw.data();
    let account = topics
        .get(1)
        .and_then(scalar)
        .or_else(|| data.and_then(|v| field(v, account_field)));
    let amount = data.and_then(|v| field(v, "amount"));

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{}-{}-{}-{}",
            ledger,
            raw.tx_hash.as_deref().unwrap_or(""),
            kind.as_str(),
            account.as_deref().unwrap_or("")
        )
    });

    Some(FundMeEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        account,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Look up `key` in a struct-shaped event body, either a rendered `ScMap`
/// or a plain JSON object.
fn field(value: &Value, key: &str) -> Option<String> {
    if let Some(entries) = value.get("map").and_then(Value::as_array) {
        return entries
            .iter()
            .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
            .and_then(|entry| entry.get("val"))
            .and_then(scalar);
    }
    value.get(key).and_then(scalar)
}

/// Flatten a rendered `ScVal` (or a plain JSON scalar) into a string.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ Value::Object(_)) => scalar(&inner),
            _ => Some(s.clone()),
        },
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let (Some(hi), Some(lo)) = (map.get("hi"), map.get("lo")) {
                return join_hi_lo(hi, lo);
            }
            ["symbol", "address", "string", "i128", "u128", "i64", "u64", "i32", "u32", "value"]
                .iter()
                .find_map(|k| map.get(*k))
                .and_then(scalar)
        }
        _ => None,
    }
}

/// Rebuild a 128-bit integer rendered as `{"hi": …, "lo": …}`.
fn join_hi_lo(hi: &Value, lo: &Value) -> Option<String> {
    let hi = hi
        .as_i64()
        .or_else(|| hi.as_str().and_then(|s| s.parse().ok()))?;
    let lo = lo
        .as_u64()
        .or_else(|| lo.as_str().and_then(|s| s.parse().ok()))?;
    Some((((hi as i128) << 64) | lo as i128).to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
