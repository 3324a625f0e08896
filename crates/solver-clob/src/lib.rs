//! CLOB quoter.
//!
//! Produces swap quotes by walking live DeepBook Level-2 depth. Depth is
//! retrieved with a dev-inspect call against the pool's read-only
//! `get_level2_ticks_from_mid` view, decoded from its BCS-packed vectors,
//! and simulated against. There is no fallback pricing: a missing pool or
//! an empty book is an error the caller sees.

pub mod book;
pub mod decode;
pub mod registry;
pub mod simulate;

use book::build_book;
use decode::decode_u64_vec;
use registry::PoolRegistry;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use solver_registry::{pure_u64, PlanArg, PlanBuilder};
use solver_rpc::RpcClient;
use solver_types::{AssetType, Level2Book, Pool, Result, SolverError, SwapQuote};
use std::sync::Arc;
use tracing::debug;

/// Depth requested from the view function, in ticks either side of mid.
const TICKS_FROM_MID: u64 = 100;

/// Budget attached to the unsigned dev-inspect transaction.
const DEV_INSPECT_GAS_BUDGET: u64 = 50_000_000;

/// Quoter over the registered pools.
pub struct ClobQuoter {
	rpc: Arc<RpcClient>,
	registry: PoolRegistry,
	deepbook_package_id: String,
	/// Sender address used for read-only simulation.
	sender: String,
}

impl ClobQuoter {
	pub fn new(
		rpc: Arc<RpcClient>,
		registry: PoolRegistry,
		deepbook_package_id: impl Into<String>,
		sender: impl Into<String>,
	) -> Self {
		Self {
			rpc,
			registry,
			deepbook_package_id: deepbook_package_id.into(),
			sender: sender.into(),
		}
	}

	pub fn registry(&self) -> &PoolRegistry {
		&self.registry
	}

	pub fn deepbook_package_id(&self) -> &str {
		&self.deepbook_package_id
	}

	/// The registered pool for the unordered pair, or `NoPool`.
	pub fn find_pool(&self, a: &AssetType, b: &AssetType) -> Result<&Pool> {
		self.registry
			.find_pool(a, b)
			.ok_or_else(|| SolverError::NoPool(format!("{a} / {b}")))
	}

	/// Fetches and reconstructs Level-2 depth for one pool. Fails with
	/// `NoLiquidity` when both sides are empty after filtering.
	pub async fn level2(&self, pool: &Pool) -> Result<Level2Book> {
		let mut builder = PlanBuilder::new();
		builder.move_call(
			&self.deepbook_package_id,
			"pool",
			"get_level2_ticks_from_mid",
			vec![
				pool.base_type.as_str().to_string(),
				pool.quote_type.as_str().to_string(),
			],
			vec![
				PlanArg::SharedObject {
					id: pool.pool_id.clone(),
					mutable: false,
				},
				pure_u64(TICKS_FROM_MID),
				PlanArg::SharedObject {
					id: "0x6".to_string(),
					mutable: false,
				},
			],
		);
		let plan = builder.finish(Some(DEV_INSPECT_GAS_BUDGET));

		let tx_bytes = self
			.rpc
			.build_unsigned(&plan.to_json(), &self.sender, DEV_INSPECT_GAS_BUDGET)
			.await?;
		let inspect = self.rpc.dev_inspect(&tx_bytes, &self.sender).await?;

		if inspect.return_values.len() < 4 {
			return Err(SolverError::Transient(format!(
				"level2 view returned {} values, expected 4",
				inspect.return_values.len()
			)));
		}

		let bid_prices = decode_u64_vec(&inspect.return_values[0].bcs_bytes)?;
		let bid_quantities = decode_u64_vec(&inspect.return_values[1].bcs_bytes)?;
		let ask_prices = decode_u64_vec(&inspect.return_values[2].bcs_bytes)?;
		let ask_quantities = decode_u64_vec(&inspect.return_values[3].bcs_bytes)?;

		let book = build_book(pool, &bid_prices, &bid_quantities, &ask_prices, &ask_quantities);
		debug!(
			pool_id = %pool.pool_id,
			bids = book.bids.len(),
			asks = book.asks.len(),
			"level2 snapshot"
		);

		if book.is_empty() {
			return Err(SolverError::NoLiquidity(pool.pool_id.clone()));
		}
		Ok(book)
	}

	/// Depth for an unordered pair, resolving the pool first.
	pub async fn level2_for_pair(
		&self,
		a: &AssetType,
		b: &AssetType,
	) -> Result<(Pool, Level2Book)> {
		let pool = self.find_pool(a, b)?.clone();
		let book = self.level2(&pool).await?;
		Ok((pool, book))
	}

	/// Simulates converting `input_raw` of `input_type` into `output_type`
	/// against the live book.
	pub async fn quote(
		&self,
		input_type: &AssetType,
		output_type: &AssetType,
		input_raw: u64,
	) -> Result<SwapQuote> {
		let (pool, book) = self.level2_for_pair(input_type, output_type).await?;
		Ok(quote_against_book(&pool, &book, input_type, input_raw))
	}
}

/// Pure quoting core, shared by the async path and the tests.
pub fn quote_against_book(
	pool: &Pool,
	book: &Level2Book,
	input_type: &AssetType,
	input_raw: u64,
) -> SwapQuote {
	let is_sell_base = input_type == &pool.base_type;
	let (input_scalar, output_scalar) = if is_sell_base {
		(pool.base_scalar, pool.quote_scalar)
	} else {
		(pool.quote_scalar, pool.base_scalar)
	};

	let input_human = Decimal::from(input_raw) / Decimal::from(input_scalar);

	let (result, impact) = if is_sell_base {
		let fill = simulate::market_sell(&book.bids, input_human);
		let impact = simulate::sell_impact(
			book.best_bid().unwrap_or_default(),
			fill.last_price,
		);
		(fill, impact)
	} else {
		let fill = simulate::market_buy(&book.asks, input_human);
		let impact = simulate::buy_impact(
			book.best_ask().unwrap_or_default(),
			fill.last_price,
		);
		(fill, impact)
	};

	let output_raw = (result.output * Decimal::from(output_scalar))
		.floor()
		.to_u64()
		.unwrap_or(0);

	SwapQuote {
		input_raw,
		output_raw,
		mid_price: book.mid_price().unwrap_or_default(),
		best_bid: book.best_bid(),
		best_ask: book.best_ask(),
		price_impact_pct: impact,
		route: vec![pool.pool_id.clone()],
	}
}
