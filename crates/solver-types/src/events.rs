//! Typed records for the events emitted by the intent contract.

use crate::assets::AssetType;
use serde::{Deserialize, Serialize};

/// Emitted when a user posts a new intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentCreatedEvent {
	pub intent_id: String,
	pub owner: String,
	pub input_type: AssetType,
	pub output_type: AssetType,
	pub input_amount: u64,
	pub min_output_amount: u64,
	pub deadline_ms: u64,
}

/// Emitted when a solver fills an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentExecutedEvent {
	pub intent_id: String,
	pub solver: String,
	pub input_amount: u64,
	pub output_amount: u64,
	pub fee_amount: u64,
	pub execution_time_ms: u64,
}

/// Emitted when the owner cancels an open intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentCancelledEvent {
	pub intent_id: String,
	pub owner: String,
}

/// Emitted when anyone expires an intent past its deadline. The refund goes
/// to `owner`, never to `triggered_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentExpiredEvent {
	pub intent_id: String,
	pub owner: String,
	pub triggered_by: String,
	pub refund_amount: u64,
}

/// Any event the intent contract emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntentEvent {
	Created(IntentCreatedEvent),
	Executed(IntentExecutedEvent),
	Cancelled(IntentCancelledEvent),
	Expired(IntentExpiredEvent),
}

impl IntentEvent {
	pub fn intent_id(&self) -> &str {
		match self {
			IntentEvent::Created(e) => &e.intent_id,
			IntentEvent::Executed(e) => &e.intent_id,
			IntentEvent::Cancelled(e) => &e.intent_id,
			IntentEvent::Expired(e) => &e.intent_id,
		}
	}
}
