//! Quote, order-book, and price endpoints.

use crate::convert::{human_to_raw, raw_to_human};
use crate::error::{invalid, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use solver_types::Level2Book;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
	pub from: String,
	pub to: String,
	/// Human-unit amount of the `from` asset.
	pub amount: Decimal,
}

/// POST /quote: simulate a swap against live depth.
pub async fn quote(
	State(state): State<AppState>,
	Json(request): Json<QuoteRequest>,
) -> ApiResult<Json<Value>> {
	let from = state.aliases.resolve(&request.from);
	let to = state.aliases.resolve(&request.to);
	if from == to {
		return Err(invalid("from and to must differ"));
	}

	let from_decimals = state.aliases.decimals_for(&from);
	let to_decimals = state.aliases.decimals_for(&to);
	let input_raw = human_to_raw(request.amount, from_decimals)?;

	let quote = state.quoter.quote(&from, &to, input_raw).await?;

	Ok(Json(json!({
		"success": true,
		"from": from,
		"to": to,
		"amountIn": request.amount,
		"amountInRaw": quote.input_raw.to_string(),
		"amountOut": raw_to_human(quote.output_raw, to_decimals),
		"amountOutRaw": quote.output_raw.to_string(),
		"midPrice": quote.mid_price,
		"bestBid": quote.best_bid,
		"bestAsk": quote.best_ask,
		"priceImpactPct": quote.price_impact_pct,
		"route": quote.route,
	})))
}

#[derive(Debug, Deserialize)]
pub struct OrderbookRequest {
	pub base: String,
	pub quote: String,
}

/// POST /orderbook: Level-2 depth plus a top-of-book summary.
pub async fn orderbook(
	State(state): State<AppState>,
	Json(request): Json<OrderbookRequest>,
) -> ApiResult<Json<Value>> {
	let base = state.aliases.resolve(&request.base);
	let quote = state.aliases.resolve(&request.quote);
	let (pool, book) = state.quoter.level2_for_pair(&base, &quote).await?;

	Ok(Json(json!({
		"success": true,
		"poolId": pool.pool_id,
		"base": pool.base_type,
		"quote": pool.quote_type,
		"bids": levels_json(&book.bids),
		"asks": levels_json(&book.asks),
		"summary": summary_json(&book),
	})))
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
	/// Pair formatted `BASE_QUOTE`, e.g. `SUI_USDC`.
	pub pair: String,
}

/// POST /price: convenience mid-price for a pair.
pub async fn price(
	State(state): State<AppState>,
	Json(request): Json<PriceRequest>,
) -> ApiResult<Json<Value>> {
	let (base_alias, quote_alias) = request
		.pair
		.split_once('_')
		.ok_or_else(|| invalid(format!("pair {:?} is not BASE_QUOTE", request.pair)))?;

	let base = state.aliases.resolve(base_alias);
	let quote = state.aliases.resolve(quote_alias);
	let (pool, book) = state.quoter.level2_for_pair(&base, &quote).await?;

	Ok(Json(json!({
		"success": true,
		"pair": request.pair,
		"poolId": pool.pool_id,
		"midPrice": book.mid_price(),
		"bestBid": book.best_bid(),
		"bestAsk": book.best_ask(),
	})))
}

fn levels_json(levels: &[solver_types::PriceLevel]) -> Vec<Value> {
	levels
		.iter()
		.map(|l| json!({"price": l.price, "quantity": l.quantity}))
		.collect()
}

fn summary_json(book: &Level2Book) -> Value {
	let bid_depth: Decimal = book.bids.iter().map(|l| l.quantity).sum();
	let ask_depth: Decimal = book.asks.iter().map(|l| l.quantity).sum();
	let spread = match (book.best_bid(), book.best_ask()) {
		(Some(b), Some(a)) => Some(a - b),
		_ => None,
	};
	json!({
		"bestBid": book.best_bid(),
		"bestAsk": book.best_ask(),
		"midPrice": book.mid_price(),
		"spread": spread,
		"bidLevels": book.bids.len(),
		"askLevels": book.asks.len(),
		"bidDepth": bid_depth,
		"askDepth": ask_depth,
	})
}
