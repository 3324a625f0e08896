//! Request handlers, grouped by surface.

pub mod build;
pub mod intents;
pub mod market;
pub mod system;
pub mod wallet;

use crate::convert::raw_to_human;
use crate::AppState;
use serde_json::{json, Value};
use solver_types::Intent;

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
	chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Renders an intent with human amounts, aliases, and an expiry flag.
pub(crate) fn intent_json(state: &AppState, intent: &Intent) -> Value {
	let input_decimals = state.aliases.decimals_for(&intent.input_type);
	let output_decimals = state.aliases.decimals_for(&intent.output_type);
	json!({
		"id": intent.id,
		"owner": intent.owner,
		"inputType": intent.input_type,
		"outputType": intent.output_type,
		"inputAlias": state.aliases.alias_of(&intent.input_type),
		"outputAlias": state.aliases.alias_of(&intent.output_type),
		"inputAmount": raw_to_human(intent.input_balance, input_decimals),
		"inputAmountRaw": intent.input_balance.to_string(),
		"minOutput": raw_to_human(intent.min_output_amount, output_decimals),
		"minOutputRaw": intent.min_output_amount.to_string(),
		"deadlineMs": intent.deadline_ms,
		"status": intent.status,
		"solver": intent.solver,
		"expired": intent.is_expired(now_ms()),
	})
}
