//! HTTP JSON-RPC client.

use crate::subscription::EventSubscription;
use crate::types::{
	Coin, DevInspectResults, EffectsStatus, EventEnvelope, ExecutionResult, ObjectSnapshot,
	ReturnValue,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use solver_types::{Result, SolverError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed wrapper over the node's JSON-RPC endpoint.
pub struct RpcClient {
	http: reqwest::Client,
	rpc_url: String,
	ws_url: String,
	request_id: AtomicU64,
}

impl RpcClient {
	pub fn new(rpc_url: impl Into<String>, ws_url: impl Into<String>) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(RPC_TIMEOUT)
			.build()
			.map_err(|e| SolverError::Config(format!("failed to build HTTP client: {e}")))?;

		Ok(Self {
			http,
			rpc_url: rpc_url.into(),
			ws_url: ws_url.into(),
			request_id: AtomicU64::new(1),
		})
	}

	/// Issues one JSON-RPC call and deserialises the `result` member.
	async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
		let id = self.request_id.fetch_add(1, Ordering::Relaxed);
		let body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});

		debug!(method, id, "rpc call");

		let response = self
			.http
			.post(&self.rpc_url)
			.json(&body)
			.send()
			.await
			.map_err(map_transport_error)?;

		let status = response.status();
		if status.is_server_error() {
			return Err(SolverError::Transient(format!("rpc returned {status}")));
		}
		if !status.is_success() {
			return Err(SolverError::InvalidArgument(format!("rpc returned {status}")));
		}

		let envelope: Value = response
			.json()
			.await
			.map_err(|e| SolverError::Transient(format!("malformed rpc response: {e}")))?;

		if let Some(error) = envelope.get("error") {
			return Err(map_rpc_error(method, error));
		}

		let result = envelope
			.get("result")
			.cloned()
			.ok_or_else(|| SolverError::Transient(format!("{method}: response missing result")))?;

		serde_json::from_value(result)
			.map_err(|e| SolverError::Transient(format!("{method}: cannot decode result: {e}")))
	}

	/// Reads one object with type and content.
	pub async fn get_object(&self, object_id: &str) -> Result<ObjectSnapshot> {
		let result: Value = self
			.call(
				"sui_getObject",
				json!([object_id, {"showType": true, "showContent": true, "showOwner": false}]),
			)
			.await?;

		if let Some(error) = result.get("error") {
			let code = error.get("code").and_then(Value::as_str).unwrap_or("");
			return Err(SolverError::NotFound(format!(
				"object {object_id}: {code}"
			)));
		}

		let data = result
			.get("data")
			.ok_or_else(|| SolverError::NotFound(format!("object {object_id} has no data")))?;

		Ok(ObjectSnapshot {
			object_id: str_field(data, "objectId").unwrap_or_else(|| object_id.to_string()),
			version: u64_field(data, "version").unwrap_or_default(),
			type_string: str_field(data, "type")
				.ok_or_else(|| SolverError::NotFound(format!("object {object_id} has no type")))?,
			fields: data
				.pointer("/content/fields")
				.cloned()
				.unwrap_or(Value::Null),
		})
	}

	/// Lists coins of `coin_type` owned by `owner`, in RPC-native order.
	pub async fn get_coins(&self, owner: &str, coin_type: &str) -> Result<Vec<Coin>> {
		let result: Value = self
			.call("suix_getCoins", json!([owner, coin_type, null, null]))
			.await?;

		let data = result
			.get("data")
			.and_then(Value::as_array)
			.cloned()
			.unwrap_or_default();

		let mut coins = Vec::with_capacity(data.len());
		for entry in data {
			coins.push(Coin {
				coin_id: str_field(&entry, "coinObjectId")
					.ok_or_else(|| SolverError::Transient("coin entry missing id".into()))?,
				balance: u64_field(&entry, "balance").unwrap_or_default(),
				version: u64_field(&entry, "version").unwrap_or_default(),
				digest: str_field(&entry, "digest").unwrap_or_default(),
			});
		}
		Ok(coins)
	}

	/// Total balance of `coin_type` held by `owner`.
	pub async fn get_balance(&self, owner: &str, coin_type: &str) -> Result<u64> {
		let result: Value = self
			.call("suix_getBalance", json!([owner, coin_type]))
			.await?;

		result
			.get("totalBalance")
			.and_then(parse_u64_value)
			.ok_or_else(|| SolverError::Transient("balance response missing totalBalance".into()))
	}

	/// Queries events of one Move event type; newest-first iff `descending`.
	pub async fn query_events(
		&self,
		move_event_type: &str,
		limit: usize,
		descending: bool,
	) -> Result<Vec<EventEnvelope>> {
		let result: Value = self
			.call(
				"suix_queryEvents",
				json!([{"MoveEventType": move_event_type}, null, limit, descending]),
			)
			.await?;

		let data = result
			.get("data")
			.and_then(Value::as_array)
			.cloned()
			.unwrap_or_default();

		Ok(data.iter().filter_map(parse_event_envelope).collect())
	}

	/// Subscribes to a Move event type over WebSocket. Delivery is
	/// at-least-once and unordered relative to polling. Dropping the
	/// returned handle cancels the subscription.
	pub async fn subscribe_events(
		&self,
		move_event_type: &str,
		handler: Arc<dyn Fn(EventEnvelope) + Send + Sync>,
	) -> Result<EventSubscription> {
		EventSubscription::connect(self.ws_url.clone(), move_event_type.to_string(), handler).await
	}

	/// Runs a read-only simulation of `tx_bytes` and returns the Move
	/// return values of the first command.
	pub async fn dev_inspect(&self, tx_bytes_b64: &str, sender: &str) -> Result<DevInspectResults> {
		let result: Value = self
			.call(
				"sui_devInspectTransactionBlock",
				json!([sender, tx_bytes_b64, null, null]),
			)
			.await?;

		if let Some(status) = result.pointer("/effects/status") {
			if status.get("status").and_then(Value::as_str) == Some("failure") {
				let error = status
					.get("error")
					.and_then(Value::as_str)
					.unwrap_or("dev-inspect failed");
				return Err(map_execution_failure(error));
			}
		}

		let mut return_values = Vec::new();
		if let Some(first) = result
			.get("results")
			.and_then(Value::as_array)
			.and_then(|r| r.first())
		{
			for entry in first
				.get("returnValues")
				.and_then(Value::as_array)
				.cloned()
				.unwrap_or_default()
			{
				let bytes = entry
					.get(0)
					.and_then(Value::as_array)
					.map(|a| {
						a.iter()
							.filter_map(Value::as_u64)
							.map(|b| b as u8)
							.collect::<Vec<u8>>()
					})
					.unwrap_or_default();
				let type_tag = entry
					.get(1)
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string();
				return_values.push(ReturnValue {
					bcs_bytes: bytes,
					type_tag,
				});
			}
		}

		Ok(DevInspectResults { return_values })
	}

	/// Submits a signed transaction and waits for effects.
	pub async fn execute_signed(
		&self,
		tx_bytes_b64: &str,
		signature_b64: &str,
	) -> Result<ExecutionResult> {
		let result: Value = self
			.call(
				"sui_executeTransactionBlock",
				json!([
					tx_bytes_b64,
					[signature_b64],
					{"showEffects": true, "showEvents": true},
					"WaitForLocalExecution"
				]),
			)
			.await?;

		let digest = str_field(&result, "digest")
			.ok_or_else(|| SolverError::Transient("execution response missing digest".into()))?;

		let status = match result
			.pointer("/effects/status/status")
			.and_then(Value::as_str)
		{
			Some("success") => EffectsStatus::Success,
			_ => {
				let error = result
					.pointer("/effects/status/error")
					.and_then(Value::as_str)
					.unwrap_or("execution failed")
					.to_string();
				EffectsStatus::Failure(error)
			}
		};

		if let EffectsStatus::Failure(reason) = &status {
			if let Some(code) = parse_abort_code(reason) {
				return Err(SolverError::reverted(code));
			}
		}

		let gas_used = result
			.pointer("/effects/gasUsed")
			.map(net_gas)
			.unwrap_or_default();

		let events = result
			.get("events")
			.and_then(Value::as_array)
			.map(|entries| entries.iter().filter_map(parse_event_envelope).collect())
			.unwrap_or_default();

		Ok(ExecutionResult {
			digest,
			status,
			gas_used,
			events,
		})
	}

	/// Asks the node to assemble unsigned transaction bytes for a plan the
	/// caller serialised. Used by the wallet-safe build endpoints.
	pub async fn build_unsigned(
		&self,
		plan: &Value,
		sender: &str,
		gas_budget: u64,
	) -> Result<String> {
		let result: Value = self
			.call(
				"unsafe_buildTransactionBlock",
				json!([sender, plan, null, gas_budget.to_string()]),
			)
			.await?;

		str_field(&result, "txBytes")
			.ok_or_else(|| SolverError::Transient("build response missing txBytes".into()))
	}
}

fn map_transport_error(e: reqwest::Error) -> SolverError {
	if e.is_timeout() || e.is_connect() {
		SolverError::Transient(format!("rpc transport: {e}"))
	} else {
		SolverError::Transient(format!("rpc request failed: {e}"))
	}
}

fn map_rpc_error(method: &str, error: &Value) -> SolverError {
	let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
	let message = error
		.get("message")
		.and_then(Value::as_str)
		.unwrap_or("unknown rpc error");

	if let Some(abort) = parse_abort_code(message) {
		return SolverError::reverted(abort);
	}
	match code {
		-32602 => SolverError::InvalidArgument(format!("{method}: {message}")),
		_ if message.contains("not found") || message.contains("notExists") => {
			SolverError::NotFound(format!("{method}: {message}"))
		}
		_ => SolverError::Transient(format!("{method}: rpc error {code}: {message}")),
	}
}

fn map_execution_failure(error: &str) -> SolverError {
	match parse_abort_code(error) {
		Some(code) => SolverError::reverted(code),
		None => SolverError::Transient(format!("execution failed: {error}")),
	}
}

/// Extracts the abort code from an effects error string of the shape
/// `MoveAbort(MoveLocation { .. }, 3) in command 1`.
fn parse_abort_code(error: &str) -> Option<u64> {
	let start = error.find("MoveAbort(")?;
	let tail = &error[start..];
	let close = tail.find(')')?;
	let inner = &tail[..close];
	let code_str = inner.rsplit(',').next()?.trim();
	code_str.parse::<u64>().ok()
}

fn net_gas(gas: &Value) -> u64 {
	let computation = gas
		.get("computationCost")
		.and_then(parse_u64_value)
		.unwrap_or_default() as i128;
	let storage = gas
		.get("storageCost")
		.and_then(parse_u64_value)
		.unwrap_or_default() as i128;
	let rebate = gas
		.get("storageRebate")
		.and_then(parse_u64_value)
		.unwrap_or_default() as i128;
	(computation + storage - rebate).max(0) as u64
}

fn parse_event_envelope(entry: &Value) -> Option<EventEnvelope> {
	Some(EventEnvelope {
		type_string: str_field(entry, "type")?,
		parsed_json: entry.get("parsedJson").cloned().unwrap_or(Value::Null),
		timestamp_ms: entry
			.get("timestampMs")
			.and_then(parse_u64_value)
			.unwrap_or_default(),
	})
}

fn str_field(value: &Value, field: &str) -> Option<String> {
	value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Numeric fields arrive either as JSON numbers or as decimal strings.
fn parse_u64_value(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) => n.as_u64(),
		Value::String(s) => s.parse::<u64>().ok(),
		_ => None,
	}
}

fn u64_field(value: &Value, field: &str) -> Option<u64> {
	value.get(field).and_then(parse_u64_value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn abort_code_parsing() {
		let error = "MoveAbort(MoveLocation { module: 0xabc::intents, function: 4 }, 2) in command 1";
		assert_eq!(parse_abort_code(error), Some(2));
		assert_eq!(parse_abort_code("InsufficientGas"), None);
		assert_eq!(parse_abort_code("MoveAbort(x, 15)"), Some(15));
	}

	#[test]
	fn rpc_error_mapping() {
		let invalid = map_rpc_error("sui_getObject", &json!({"code": -32602, "message": "bad"}));
		assert!(matches!(invalid, SolverError::InvalidArgument(_)));

		let missing = map_rpc_error(
			"sui_getObject",
			&json!({"code": -32000, "message": "object not found"}),
		);
		assert!(matches!(missing, SolverError::NotFound(_)));

		let flaky = map_rpc_error("sui_getObject", &json!({"code": -32000, "message": "busy"}));
		assert!(flaky.is_transient());
	}

	#[test]
	fn numeric_fields_accept_strings_and_numbers() {
		assert_eq!(parse_u64_value(&json!("42")), Some(42));
		assert_eq!(parse_u64_value(&json!(42)), Some(42));
		assert_eq!(parse_u64_value(&json!(null)), None);
	}

	#[test]
	fn net_gas_floors_at_zero() {
		let gas = json!({
			"computationCost": "1000",
			"storageCost": "500",
			"storageRebate": "2000",
		});
		assert_eq!(net_gas(&gas), 0);

		let gas = json!({
			"computationCost": "1000000",
			"storageCost": "2000",
			"storageRebate": "500",
		});
		assert_eq!(net_gas(&gas), 1_001_500);
	}

	#[test]
	fn event_envelope_parsing() {
		let entry = json!({
			"type": "0xabc::intents::IntentCreated",
			"parsedJson": {"intent_id": "0x1"},
			"timestampMs": "1722550000000",
		});
		let envelope = parse_event_envelope(&entry).unwrap();
		assert_eq!(envelope.type_string, "0xabc::intents::IntentCreated");
		assert_eq!(envelope.timestamp_ms, 1_722_550_000_000);
	}
}
