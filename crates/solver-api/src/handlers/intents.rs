//! Intent read, lifecycle, and listing endpoints.

use super::{intent_json, now_ms};
use crate::convert::human_to_raw;
use crate::error::{invalid, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use solver_account::Signer;
use solver_core::execution::sign_and_submit;
use solver_registry::{parse_event, parse_intent};
use solver_types::{IntentEvent, IntentStatus, Result, SolverError};
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
	pub id: String,
}

/// POST /intent: one intent with human amounts and an expiry flag.
pub async fn get_intent(
	State(state): State<AppState>,
	Json(request): Json<IntentRequest>,
) -> ApiResult<Json<Value>> {
	let intent = state.engine.load_intent(&request.id).await?;
	Ok(Json(json!({
		"success": true,
		"intent": intent_json(&state, &intent),
	})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
	pub from: String,
	pub to: String,
	pub amount: Decimal,
	pub min_output: Decimal,
	pub deadline_seconds: u64,
}

/// POST /intent/create: test path signing with the server-held user key.
pub async fn create_intent(
	State(state): State<AppState>,
	Json(request): Json<CreateIntentRequest>,
) -> ApiResult<Json<Value>> {
	let signer = user_signer(&state)?;
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

	let coin = find_funding_coin(&state, signer.address(), from.as_str(), amount_raw).await?;
	let plan = state.registry.plan_create_exact(
		&coin,
		amount_raw,
		from.as_str(),
		to.as_str(),
		min_output_raw,
		request.deadline_seconds.saturating_mul(1_000),
	);

	let result = sign_and_submit(
		&state.rpc,
		signer.as_ref(),
		&plan,
		state.config.max_gas_price,
	)
	.await?;

	let intent_id = result.events.iter().find_map(|envelope| {
		match parse_event(envelope) {
			Ok(IntentEvent::Created(event)) => Some(event.intent_id),
			_ => None,
		}
	});

	Ok(Json(json!({
		"success": true,
		"intentId": intent_id,
		"digest": result.digest,
		"status": result.status,
	})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentIdRequest {
	pub intent_id: String,
}

/// POST /intent/execute: full engine execute path under the solver key.
pub async fn execute_intent(
	State(state): State<AppState>,
	Json(request): Json<IntentIdRequest>,
) -> ApiResult<Json<Value>> {
	let intent = state.engine.load_intent(&request.intent_id).await?;
	if intent.status != IntentStatus::Open {
		return Err(invalid(format!(
			"intent is {:?}, not OPEN",
			intent.status
		)));
	}
	if intent.is_expired(now_ms()) {
		return Err(invalid("intent deadline has passed"));
	}

	let quote = state.engine.quote_intent(&intent).await?;
	let result = state.engine.fill_intent(&intent).await?;

	Ok(Json(json!({
		"success": true,
		"intentId": intent.id,
		"digest": result.digest,
		"status": result.status,
		"gasUsed": result.gas_used,
		"quotedOutputRaw": quote.output_raw.to_string(),
	})))
}

/// POST /intent/cancel: owner-key cancellation.
pub async fn cancel_intent(
	State(state): State<AppState>,
	Json(request): Json<IntentIdRequest>,
) -> ApiResult<Json<Value>> {
	let signer = user_signer(&state)?;
	let intent = state.engine.load_intent(&request.intent_id).await?;
	if intent.owner != signer.address() {
		return Err(invalid("configured user key does not own this intent"));
	}

	let plan = state.registry.plan_cancel(
		&intent.id,
		intent.input_type.as_str(),
		intent.output_type.as_str(),
		&intent.owner,
	);
	let result = sign_and_submit(
		&state.rpc,
		signer.as_ref(),
		&plan,
		state.config.max_gas_price,
	)
	.await?;

	Ok(Json(json!({
		"success": true,
		"intentId": intent.id,
		"digest": result.digest,
		"status": result.status,
	})))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIntentsRequest {
	pub limit: Option<usize>,
	#[serde(default)]
	pub include_expired: bool,
}

/// POST /intents/open: enriched open intents, fetched in parallel.
pub async fn open_intents(
	State(state): State<AppState>,
	Json(request): Json<OpenIntentsRequest>,
) -> ApiResult<Json<Value>> {
	let limit = request
		.limit
		.unwrap_or(DEFAULT_LIST_LIMIT)
		.min(MAX_LIST_LIMIT);
	let envelopes = state
		.rpc
		.query_events(&state.registry.created_event_type(), limit, true)
		.await?;

	let ids: Vec<String> = envelopes
		.iter()
		.filter_map(|envelope| match parse_event(envelope) {
			Ok(IntentEvent::Created(event)) => Some(event.intent_id),
			_ => None,
		})
		.collect();

	let fetched = join_all(ids.iter().map(|id| fetch_intent(&state, id))).await;
	let mut loaded = Vec::new();
	for result in fetched {
		if let Some(intent) = result? {
			loaded.push(intent);
		}
	}

	let now = now_ms();
	let intents: Vec<Value> = loaded
		.into_iter()
		.filter(|intent| intent.status == IntentStatus::Open)
		.filter(|intent| request.include_expired || !intent.is_expired(now))
		.map(|intent| intent_json(&state, &intent))
		.collect();

	Ok(Json(json!({
		"success": true,
		"count": intents.len(),
		"intents": intents,
	})))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryRequest {
	pub limit: Option<usize>,
}

/// POST /intents/history: merged creation and execution history.
pub async fn history(
	State(state): State<AppState>,
	Json(request): Json<HistoryRequest>,
) -> ApiResult<Json<Value>> {
	let limit = request
		.limit
		.unwrap_or(DEFAULT_LIST_LIMIT)
		.min(MAX_LIST_LIMIT);

	let created_event_type = state.registry.created_event_type();
	let executed_event_type = state.registry.executed_event_type();
	let (created, executed) = tokio::join!(
		state.rpc.query_events(&created_event_type, limit, true),
		state.rpc.query_events(&executed_event_type, limit, true),
	);

	let mut entries: Vec<(u64, Value)> = Vec::new();
	for envelope in created?.iter().chain(executed?.iter()) {
		let Ok(event) = parse_event(envelope) else {
			continue;
		};
		let entry = match &event {
			IntentEvent::Created(e) => json!({
				"type": "created",
				"intentId": e.intent_id,
				"owner": e.owner,
				"inputType": e.input_type,
				"outputType": e.output_type,
				"inputAmountRaw": e.input_amount.to_string(),
				"minOutputRaw": e.min_output_amount.to_string(),
				"deadlineMs": e.deadline_ms,
				"timestampMs": envelope.timestamp_ms,
			}),
			IntentEvent::Executed(e) => json!({
				"type": "executed",
				"intentId": e.intent_id,
				"solver": e.solver,
				"inputAmountRaw": e.input_amount.to_string(),
				"outputAmountRaw": e.output_amount.to_string(),
				"feeAmountRaw": e.fee_amount.to_string(),
				"timestampMs": envelope.timestamp_ms,
			}),
			_ => continue,
		};
		entries.push((envelope.timestamp_ms, entry));
	}

	entries.sort_by(|a, b| b.0.cmp(&a.0));
	entries.truncate(limit);
	let history: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();

	Ok(Json(json!({
		"success": true,
		"count": history.len(),
		"history": history,
	})))
}

fn user_signer(state: &AppState) -> ApiResult<Arc<dyn Signer>> {
	state
		.user_signer
		.clone()
		.ok_or_else(|| invalid("no user key configured on this server"))
}

/// Reads one intent, treating a missing object as absent rather than fatal.
async fn fetch_intent(
	state: &AppState,
	intent_id: &str,
) -> Result<Option<solver_types::Intent>> {
	match state.rpc.get_object(intent_id).await {
		Ok(snapshot) => match parse_intent(&snapshot) {
			Ok(intent) => Ok(Some(intent)),
			Err(SolverError::NotFound(_)) => Ok(None),
			Err(e) => Err(e),
		},
		Err(SolverError::NotFound(_)) => Ok(None),
		Err(e) => Err(e),
	}
}

/// Picks the first coin able to fund `amount_raw` on its own.
pub(crate) async fn find_funding_coin(
	state: &AppState,
	owner: &str,
	coin_type: &str,
	amount_raw: u64,
) -> Result<String> {
	let coins = state.rpc.get_coins(owner, coin_type).await?;
	let available = coins.iter().map(|c| c.balance).sum();
	coins
		.into_iter()
		.find(|c| c.balance >= amount_raw)
		.map(|c| c.coin_id)
		.ok_or(SolverError::InsufficientBalance {
			needed: amount_raw,
			available,
		})
}
