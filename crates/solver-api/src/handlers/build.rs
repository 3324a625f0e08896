//! Wallet-safe transaction building and signed submission.
//!
//! The build endpoints never touch a key: they return base64 transaction
//! bytes for the caller's wallet to sign, and `/tx/execute` submits the
//! wallet's signature alongside those bytes.

use super::{intents::find_funding_coin, now_ms};
use crate::convert::human_to_raw;
use crate::error::{invalid, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use solver_core::execution::{buffered_output, select_coins};
use solver_types::IntentStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildCreateRequest {
	pub sender: String,
	pub from: String,
	pub to: String,
	pub amount: Decimal,
	pub min_output: Decimal,
	pub deadline_seconds: u64,
}

/// POST /intent/build/create: unsigned create transaction.
pub async fn build_create(
	State(state): State<AppState>,
	Json(request): Json<BuildCreateRequest>,
) -> ApiResult<Json<Value>> {
	let from = state.aliases.resolve(&request.from);
	let to = state.aliases.resolve(&request.to);
	if from == to {
		return Err(invalid("from and to must differ"));
	}

	let amount_raw = human_to_raw(request.amount, state.aliases.decimals_for(&from))?;
	let min_output_raw = human_to_raw(request.min_output, state.aliases.decimals_for(&to))?;
	if amount_raw == 0 {
		return Err(invalid("amount must be non-zero"));
	}

	let coin = find_funding_coin(&state, &request.sender, from.as_str(), amount_raw).await?;
	let plan = state.registry.plan_create_exact(
		&coin,
		amount_raw,
		from.as_str(),
		to.as_str(),
		min_output_raw,
		request.deadline_seconds.saturating_mul(1_000),
	);

	let tx_bytes = state
		.rpc
		.build_unsigned(&plan.to_json(), &request.sender, state.config.max_gas_price)
		.await?;

	Ok(Json(json!({
		"success": true,
		"txBytes": tx_bytes,
		"sender": request.sender,
	})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildIntentRequest {
	pub sender: String,
	pub intent_id: String,
}

/// POST /intent/build/execute: unsigned fill transaction for an external
/// solver wallet. The output payment is drawn from the sender's coins.
pub async fn build_execute(
	State(state): State<AppState>,
	Json(request): Json<BuildIntentRequest>,
) -> ApiResult<Json<Value>> {
	let intent = state.engine.load_intent(&request.intent_id).await?;
	if intent.status != IntentStatus::Open {
		return Err(invalid(format!("intent is {:?}, not OPEN", intent.status)));
	}
	if intent.is_expired(now_ms()) {
		return Err(invalid("intent deadline has passed"));
	}

	// The wallet needs one coin covering the buffered payment; merging is
	// left to the wallet to keep the built transaction simple.
	let needed = buffered_output(intent.min_output_amount);
	let coins = state
		.rpc
		.get_coins(&request.sender, intent.output_type.as_str())
		.await?;
	let selection = select_coins(coins, needed)?;
	if !selection.merged.is_empty() {
		return Err(invalid(
			"no single coin covers the payment; merge coins in the wallet first",
		));
	}

	let plan = state.registry.plan_execute(
		&intent.id,
		&selection.primary.coin_id,
		intent.input_type.as_str(),
		intent.output_type.as_str(),
		&request.sender,
	);

	let tx_bytes = state
		.rpc
		.build_unsigned(&plan.to_json(), &request.sender, state.config.max_gas_price)
		.await?;

	Ok(Json(json!({
		"success": true,
		"txBytes": tx_bytes,
		"sender": request.sender,
		"intentId": intent.id,
	})))
}

/// POST /intent/build/cancel: unsigned cancel for the owner's wallet.
pub async fn build_cancel(
	State(state): State<AppState>,
	Json(request): Json<BuildIntentRequest>,
) -> ApiResult<Json<Value>> {
	let intent = state.engine.load_intent(&request.intent_id).await?;
	if intent.owner != request.sender {
		return Err(invalid("sender does not own this intent"));
	}

	let plan = state.registry.plan_cancel(
		&intent.id,
		intent.input_type.as_str(),
		intent.output_type.as_str(),
		&intent.owner,
	);

	let tx_bytes = state
		.rpc
		.build_unsigned(&plan.to_json(), &request.sender, state.config.max_gas_price)
		.await?;

	Ok(Json(json!({
		"success": true,
		"txBytes": tx_bytes,
		"sender": request.sender,
		"intentId": intent.id,
	})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTxRequest {
	pub tx_bytes: String,
	pub signature: String,
}

/// POST /tx/execute: submit wallet-signed bytes.
pub async fn execute_signed_tx(
	State(state): State<AppState>,
	Json(request): Json<ExecuteTxRequest>,
) -> ApiResult<Json<Value>> {
	if request.tx_bytes.is_empty() || request.signature.is_empty() {
		return Err(invalid("txBytes and signature are required"));
	}

	let result = state
		.rpc
		.execute_signed(&request.tx_bytes, &request.signature)
		.await?;

	Ok(Json(json!({
		"success": true,
		"digest": result.digest,
		"status": result.status,
		"gasUsed": result.gas_used,
		"events": result.events.len(),
	})))
}
