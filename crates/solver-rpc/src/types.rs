//! Wire types returned by the RPC surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A shared or owned object as read from the node, with its declared Move
/// type and raw JSON field content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
	pub object_id: String,
	pub version: u64,
	/// Full parameterised type string, e.g. `0xpkg::intents::Intent<A, B>`.
	pub type_string: String,
	pub fields: Value,
}

/// One coin object owned by an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
	pub coin_id: String,
	pub balance: u64,
	pub version: u64,
	pub digest: String,
}

/// One event as returned by queries and subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
	pub type_string: String,
	pub parsed_json: Value,
	pub timestamp_ms: u64,
}

/// A single Move return value from dev-inspect: raw BCS plus its type tag.
#[derive(Debug, Clone)]
pub struct ReturnValue {
	pub bcs_bytes: Vec<u8>,
	pub type_tag: String,
}

/// Return values of the first command of a dev-inspect run.
#[derive(Debug, Clone, Default)]
pub struct DevInspectResults {
	pub return_values: Vec<ReturnValue>,
}

/// Effects-level status of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectsStatus {
	Success,
	Failure(String),
}

impl EffectsStatus {
	pub fn is_success(&self) -> bool {
		matches!(self, EffectsStatus::Success)
	}
}

/// Outcome of a signed-transaction submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
	pub digest: String,
	pub status: EffectsStatus,
	/// Net gas charged: computation + storage - rebate, floored at zero.
	pub gas_used: u64,
	pub events: Vec<EventEnvelope>,
}
