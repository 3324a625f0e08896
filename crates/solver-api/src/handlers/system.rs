//! Health, pools, protocol config, and metrics endpoints.

use crate::error::ApiResult;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use solver_registry::parse_protocol_config;

/// GET /health: configuration summary.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
	Json(json!({
		"success": true,
		"status": "ok",
		"rpcUrl": state.config.rpc_url,
		"packageId": state.config.package_id,
		"protocolConfigId": state.config.protocol_config_id,
		"deepbookPackageId": state.config.deepbook_package_id,
		"minProfitBps": state.config.min_profit_bps,
		"pollingIntervalMs": state.config.polling_interval_ms,
		"eventsEnabled": state.config.enable_events,
		"pools": state.quoter.registry().pools().len(),
		"solverAddress": state.engine.solver_address(),
		"timestamp": chrono::Utc::now().timestamp_millis(),
	}))
}

/// GET /pools: pool registry plus the alias table.
pub async fn pools(State(state): State<AppState>) -> Json<Value> {
	let pools: Vec<Value> = state
		.quoter
		.registry()
		.pools()
		.iter()
		.map(|pool| {
			json!({
				"poolId": pool.pool_id,
				"baseType": pool.base_type,
				"quoteType": pool.quote_type,
				"baseAlias": state.aliases.alias_of(&pool.base_type),
				"quoteAlias": state.aliases.alias_of(&pool.quote_type),
				"baseScalar": pool.base_scalar,
				"quoteScalar": pool.quote_scalar,
				"tickSize": pool.tick_size,
				"lotSize": pool.lot_size,
			})
		})
		.collect();

	let aliases: Value = state
		.aliases
		.entries()
		.map(|(alias, type_string)| (alias.to_string(), json!(type_string)))
		.collect::<serde_json::Map<String, Value>>()
		.into();

	Json(json!({
		"success": true,
		"pools": pools,
		"aliases": aliases,
	}))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
	pub config_id: Option<String>,
}

/// POST /config: the shared protocol configuration object.
pub async fn protocol_config(
	State(state): State<AppState>,
	Json(request): Json<ConfigRequest>,
) -> ApiResult<Json<Value>> {
	let config_id = request
		.config_id
		.unwrap_or_else(|| state.config.protocol_config_id.clone());
	let snapshot = state.rpc.get_object(&config_id).await?;
	let config = parse_protocol_config(&snapshot)?;

	Ok(Json(json!({
		"success": true,
		"configId": config.id,
		"feeBps": config.fee_bps,
		"feeRecipient": config.fee_recipient,
		"paused": config.paused,
	})))
}

/// GET /solver/metrics: engine counters as JSON.
pub async fn metrics(State(state): State<AppState>) -> Json<Value> {
	let snapshot = state.engine.metrics();
	let attempted = snapshot.executed + snapshot.skipped;
	let success_rate = if attempted > 0 {
		snapshot.executed as f64 / attempted as f64 * 100.0
	} else {
		0.0
	};

	Json(json!({
		"success": true,
		"processed": snapshot.processed,
		"executed": snapshot.executed,
		"skipped": snapshot.skipped,
		"gasSpent": snapshot.gas_spent,
		"profitRaw": snapshot.profit_raw,
		"successRatePct": success_rate,
		"processingInFlight": state.engine.in_flight(),
		"timestamp": chrono::Utc::now().timestamp_millis(),
	}))
}

/// GET /solver/metrics/prometheus: counters in exposition format.
pub async fn metrics_prometheus(State(state): State<AppState>) -> String {
	let snapshot = state.engine.metrics();
	let mut out = String::new();

	for (name, help, value) in [
		(
			"solver_intents_processed_total",
			"Intents entered into the pipeline",
			snapshot.processed,
		),
		(
			"solver_intents_executed_total",
			"Fills confirmed on-chain",
			snapshot.executed,
		),
		(
			"solver_intents_skipped_total",
			"Intents skipped by the profitability gate",
			snapshot.skipped,
		),
		(
			"solver_gas_spent_total",
			"Net gas charged across fills",
			snapshot.gas_spent,
		),
		(
			"solver_profit_raw_total",
			"Accumulated output-denominated margin",
			snapshot.profit_raw,
		),
	] {
		out.push_str(&format!("# HELP {name} {help}\n"));
		out.push_str(&format!("# TYPE {name} counter\n"));
		out.push_str(&format!("{name} {value}\n"));
	}
	out
}
