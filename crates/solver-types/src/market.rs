//! CLOB pool descriptors, Level-2 depth snapshots, and quote results.
//!
//! Prices and quantities in a [`Level2Book`] are human-unit decimals; raw
//! chain amounts stay `u64` and only appear on [`SwapQuote`] boundaries.

use crate::assets::AssetType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Descriptor for one DeepBook pool in the solver's registry.
///
/// `base_scalar` and `quote_scalar` are the decimal-to-raw multipliers for
/// the two assets (1e9 for a 9-decimal coin, 1e6 for a 6-decimal coin).
/// `tick_size` and `lot_size` are kept for order placement, not quoting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
	pub pool_id: String,
	pub base_type: AssetType,
	pub quote_type: AssetType,
	pub base_scalar: u64,
	pub quote_scalar: u64,
	pub tick_size: u64,
	pub lot_size: u64,
}

impl Pool {
	/// True when the pool trades exactly the unordered pair `{a, b}`.
	pub fn matches_pair(&self, a: &AssetType, b: &AssetType) -> bool {
		(&self.base_type == a && &self.quote_type == b)
			|| (&self.base_type == b && &self.quote_type == a)
	}
}

/// One resting price level: `(price, quantity)` in human units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
	pub price: Decimal,
	pub quantity: Decimal,
}

/// Level-2 depth for a pool: bids descending by price, asks ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level2Book {
	pub bids: Vec<PriceLevel>,
	pub asks: Vec<PriceLevel>,
}

impl Level2Book {
	pub fn best_bid(&self) -> Option<Decimal> {
		self.bids.first().map(|l| l.price)
	}

	pub fn best_ask(&self) -> Option<Decimal> {
		self.asks.first().map(|l| l.price)
	}

	/// Midpoint of top-of-book; one-sided books fall back to the live side.
	pub fn mid_price(&self) -> Option<Decimal> {
		match (self.best_bid(), self.best_ask()) {
			(Some(b), Some(a)) => Some((b + a) / Decimal::TWO),
			(Some(b), None) => Some(b),
			(None, Some(a)) => Some(a),
			(None, None) => None,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.bids.is_empty() && self.asks.is_empty()
	}
}

/// Result of simulating a market order against a Level-2 snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
	pub input_raw: u64,
	pub output_raw: u64,
	pub mid_price: Decimal,
	pub best_bid: Option<Decimal>,
	pub best_ask: Option<Decimal>,
	/// Top-of-book to last-filled-level gap, as a fraction of top-of-book.
	pub price_impact_pct: Decimal,
	/// Ordered pool ids traversed; length 1 while routing is single-pool.
	pub route: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn d(s: &str) -> Decimal {
		Decimal::from_str_exact(s).unwrap()
	}

	#[test]
	fn pair_matching_is_unordered() {
		let pool = Pool {
			pool_id: "0xp".into(),
			base_type: AssetType::new("0x2::sui::SUI"),
			quote_type: AssetType::new("0xdba::usdc::USDC"),
			base_scalar: 1_000_000_000,
			quote_scalar: 1_000_000,
			tick_size: 1_000,
			lot_size: 100_000_000,
		};
		let sui = AssetType::new("0x2::sui::SUI");
		let usdc = AssetType::new("0xdba::usdc::USDC");
		let deep = AssetType::new("0xdee::deep::DEEP");
		assert!(pool.matches_pair(&sui, &usdc));
		assert!(pool.matches_pair(&usdc, &sui));
		assert!(!pool.matches_pair(&sui, &deep));
	}

	#[test]
	fn mid_price_handles_one_sided_books() {
		let mut book = Level2Book::default();
		assert_eq!(book.mid_price(), None);

		book.bids.push(PriceLevel {
			price: d("1.90"),
			quantity: d("10"),
		});
		assert_eq!(book.mid_price(), Some(d("1.90")));

		book.asks.push(PriceLevel {
			price: d("2.10"),
			quantity: d("5"),
		});
		assert_eq!(book.mid_price(), Some(d("2.00")));
	}
}
