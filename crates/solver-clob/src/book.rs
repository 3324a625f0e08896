//! Level-2 price reconstruction.
//!
//! The view function returns prices scaled by `FLOAT_SCALAR` and raw
//! quantities in base units. Reconstruction converts both to human-unit
//! decimals:
//!
//! ```text
//! price_human    = raw_price / FLOAT_SCALAR * base_scalar / quote_scalar
//! quantity_human = raw_quantity / base_scalar
//! ```

use rust_decimal::Decimal;
use solver_types::{Level2Book, Pool, PriceLevel};

/// Fixed-point scale the contract applies to prices.
pub const FLOAT_SCALAR: u64 = 1_000_000_000;

/// Builds a Level-2 book from the four decoded vectors. Bids arrive sorted
/// descending and asks ascending; order is preserved. Levels with a
/// non-positive price or quantity are dropped.
pub fn build_book(
	pool: &Pool,
	bid_prices: &[u64],
	bid_quantities: &[u64],
	ask_prices: &[u64],
	ask_quantities: &[u64],
) -> Level2Book {
	Level2Book {
		bids: build_side(pool, bid_prices, bid_quantities),
		asks: build_side(pool, ask_prices, ask_quantities),
	}
}

fn build_side(pool: &Pool, prices: &[u64], quantities: &[u64]) -> Vec<PriceLevel> {
	prices
		.iter()
		.zip(quantities.iter())
		.filter(|(p, q)| **p > 0 && **q > 0)
		.map(|(p, q)| PriceLevel {
			price: human_price(pool, *p),
			quantity: human_quantity(pool, *q),
		})
		.collect()
}

/// Converts one contract price into quote-per-base human units.
pub fn human_price(pool: &Pool, raw_price: u64) -> Decimal {
	Decimal::from(raw_price) / Decimal::from(FLOAT_SCALAR) * Decimal::from(pool.base_scalar)
		/ Decimal::from(pool.quote_scalar)
}

/// Converts one raw base quantity into human units.
pub fn human_quantity(pool: &Pool, raw_quantity: u64) -> Decimal {
	Decimal::from(raw_quantity) / Decimal::from(pool.base_scalar)
}

#[cfg(test)]
mod tests {
	use super::*;
	use solver_types::AssetType;

	fn sui_usdc_pool() -> Pool {
		Pool {
			pool_id: "0xpool".into(),
			base_type: AssetType::new("0x2::sui::SUI"),
			quote_type: AssetType::new("0xdba::usdc::USDC"),
			base_scalar: 1_000_000_000,
			quote_scalar: 1_000_000,
			tick_size: 1_000,
			lot_size: 100_000_000,
		}
	}

	fn d(s: &str) -> Decimal {
		Decimal::from_str_exact(s).unwrap()
	}

	#[test]
	fn price_reconstruction_applies_both_scalars() {
		let pool = sui_usdc_pool();
		// 1_900_000 / 1e9 * 1e9 / 1e6 = 1.90 USDC per SUI.
		assert_eq!(human_price(&pool, 1_900_000), d("1.90"));
		assert_eq!(human_quantity(&pool, 2_500_000_000), d("2.5"));
	}

	#[test]
	fn zero_levels_are_dropped() {
		let pool = sui_usdc_pool();
		let book = build_book(
			&pool,
			&[1_900_000, 0, 1_880_000],
			&[1_000_000_000, 5, 0],
			&[1_910_000],
			&[2_000_000_000],
		);
		assert_eq!(book.bids.len(), 1);
		assert_eq!(book.asks.len(), 1);
		assert_eq!(book.bids[0].price, d("1.90"));
	}

	#[test]
	fn bid_order_is_preserved_descending() {
		let pool = sui_usdc_pool();
		let book = build_book(
			&pool,
			&[1_900_000, 1_890_000, 1_880_000],
			&[1_000_000_000, 1_000_000_000, 1_000_000_000],
			&[],
			&[],
		);
		assert!(book.bids.windows(2).all(|w| w[0].price >= w[1].price));
	}
}
