//! Wallet balance endpoint.

use crate::convert::raw_to_human;
use crate::error::{invalid, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
	pub address: String,
}

/// POST /wallet/balance: raw and human balances for every known alias.
pub async fn balance(
	State(state): State<AppState>,
	Json(request): Json<BalanceRequest>,
) -> ApiResult<Json<Value>> {
	if !request.address.starts_with("0x") {
		return Err(invalid("address must be 0x-prefixed"));
	}

	let entries: Vec<(String, String)> = state
		.aliases
		.entries()
		.map(|(alias, type_string)| (alias.to_string(), type_string.to_string()))
		.collect();

	let lookups = join_all(entries.iter().map(|(_, type_string)| {
		state.rpc.get_balance(&request.address, type_string)
	}))
	.await;

	let mut balances = serde_json::Map::new();
	for ((alias, type_string), lookup) in entries.into_iter().zip(lookups) {
		let raw = lookup?;
		let decimals = state
			.aliases
			.decimals_for(&state.aliases.resolve(&alias));
		balances.insert(
			alias,
			json!({
				"coinType": type_string,
				"raw": raw.to_string(),
				"human": raw_to_human(raw, decimals),
			}),
		);
	}

	Ok(Json(json!({
		"success": true,
		"address": request.address,
		"balances": balances,
	})))
}
