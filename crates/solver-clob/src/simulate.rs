//! Market-order simulation against a Level-2 snapshot.
//!
//! Both walks consume levels in book order and stop when the remaining
//! input reaches zero or the book runs dry. Price impact is measured from
//! top-of-book to the last level touched, even when that level was only
//! partially consumed.

use rust_decimal::Decimal;
use solver_types::PriceLevel;

/// Outcome of walking one side of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillResult {
	/// Total output produced by the walk, in human units.
	pub output: Decimal,
	/// Input that could not be filled because the book ran dry.
	pub unfilled_input: Decimal,
	/// Price of the last level touched; zero when nothing filled.
	pub last_price: Decimal,
}

/// Sells `amount_base` of base into the bids: each level absorbs up to its
/// quantity, paying `consumed * price` in quote.
pub fn market_sell(bids: &[PriceLevel], amount_base: Decimal) -> FillResult {
	let mut remaining = amount_base;
	let mut out_quote = Decimal::ZERO;
	let mut last_price = Decimal::ZERO;

	for level in bids {
		if remaining <= Decimal::ZERO {
			break;
		}
		let consumed = remaining.min(level.quantity);
		out_quote += consumed * level.price;
		remaining -= consumed;
		last_price = level.price;
	}

	FillResult {
		output: out_quote,
		unfilled_input: remaining.max(Decimal::ZERO),
		last_price,
	}
}

/// Spends `amount_quote` of quote into the asks: at each level the buyable
/// base is `min(remaining / price, level.quantity)`.
pub fn market_buy(asks: &[PriceLevel], amount_quote: Decimal) -> FillResult {
	let mut remaining = amount_quote;
	let mut out_base = Decimal::ZERO;
	let mut last_price = Decimal::ZERO;

	for level in asks {
		if remaining <= Decimal::ZERO {
			break;
		}
		if level.price <= Decimal::ZERO {
			continue;
		}
		let affordable = remaining / level.price;
		let filled = affordable.min(level.quantity);
		out_base += filled;
		remaining -= filled * level.price;
		last_price = level.price;
	}

	FillResult {
		output: out_base,
		unfilled_input: remaining.max(Decimal::ZERO),
		last_price,
	}
}

/// Impact of a sell as a fraction of top-of-book: `(top - last) / top`.
pub fn sell_impact(top_bid: Decimal, last_price: Decimal) -> Decimal {
	if top_bid <= Decimal::ZERO || last_price <= Decimal::ZERO {
		return Decimal::ZERO;
	}
	(top_bid - last_price) / top_bid
}

/// Impact of a buy as a fraction of top-of-book: `(last - top) / top`.
pub fn buy_impact(top_ask: Decimal, last_price: Decimal) -> Decimal {
	if top_ask <= Decimal::ZERO || last_price <= Decimal::ZERO {
		return Decimal::ZERO;
	}
	(last_price - top_ask) / top_ask
}

#[cfg(test)]
mod tests {
	use super::*;

	fn d(s: &str) -> Decimal {
		Decimal::from_str_exact(s).unwrap()
	}

	fn level(price: &str, quantity: &str) -> PriceLevel {
		PriceLevel {
			price: d(price),
			quantity: d(quantity),
		}
	}

	fn bids() -> Vec<PriceLevel> {
		vec![
			level("2.00", "1"),
			level("1.95", "2"),
			level("1.90", "10"),
		]
	}

	fn asks() -> Vec<PriceLevel> {
		vec![
			level("2.05", "1"),
			level("2.10", "2"),
			level("2.20", "10"),
		]
	}

	#[test]
	fn zero_input_fills_nothing() {
		let result = market_sell(&bids(), Decimal::ZERO);
		assert_eq!(result.output, Decimal::ZERO);
		assert_eq!(result.last_price, Decimal::ZERO);
		assert_eq!(sell_impact(d("2.00"), result.last_price), Decimal::ZERO);
	}

	#[test]
	fn single_level_sell_is_linear() {
		let result = market_sell(&bids(), d("0.5"));
		assert_eq!(result.output, d("1.000"));
		assert_eq!(result.last_price, d("2.00"));
		assert_eq!(result.unfilled_input, Decimal::ZERO);
	}

	#[test]
	fn sell_walks_levels_in_order() {
		// 1 @ 2.00 + 2 @ 1.95 + 1 @ 1.90 = 7.80.
		let result = market_sell(&bids(), d("4"));
		assert_eq!(result.output, d("7.80"));
		assert_eq!(result.last_price, d("1.90"));
	}

	#[test]
	fn sell_output_is_monotone_in_input() {
		let book = bids();
		let mut previous = Decimal::ZERO;
		for input in ["0", "0.5", "1", "2", "3", "5", "13", "50"] {
			let output = market_sell(&book, d(input)).output;
			assert!(output >= previous, "output shrank at input {input}");
			previous = output;
		}
	}

	#[test]
	fn sell_impact_grows_with_size_and_is_bounded() {
		let book = bids();
		let top = book[0].price;
		let small = sell_impact(top, market_sell(&book, d("0.5")).last_price);
		let medium = sell_impact(top, market_sell(&book, d("2")).last_price);
		let large = sell_impact(top, market_sell(&book, d("13")).last_price);
		assert!(small <= medium && medium <= large);

		// Bounded by the top-to-worst-level gap.
		let worst = book.last().unwrap().price;
		let bound = (top - worst) / top;
		assert!(large <= bound);
	}

	#[test]
	fn partial_level_fill_still_counts_its_price() {
		// 1.5 base: exhausts level one, half of level two.
		let result = market_sell(&bids(), d("1.5"));
		assert_eq!(result.last_price, d("1.95"));
		let impact = sell_impact(d("2.00"), result.last_price);
		assert_eq!(impact, d("0.025"));
	}

	#[test]
	fn buy_respects_affordability_per_level() {
		// 2.05 quote buys exactly level one.
		let result = market_buy(&asks(), d("2.05"));
		assert_eq!(result.output, d("1"));
		assert_eq!(result.last_price, d("2.05"));

		// 6.25 quote: 1 @ 2.05 plus 2 @ 2.10 consumes it exactly.
		let result = market_buy(&asks(), d("6.25"));
		assert_eq!(result.output, d("3"));
		assert_eq!(result.last_price, d("2.10"));
	}

	#[test]
	fn buy_impact_uses_last_filled_level() {
		let result = market_buy(&asks(), d("10"));
		let impact = buy_impact(d("2.05"), result.last_price);
		assert!(impact > Decimal::ZERO);
		assert_eq!(result.last_price, d("2.20"));
	}

	#[test]
	fn dry_book_reports_unfilled_remainder() {
		let result = market_sell(&bids(), d("100"));
		assert_eq!(result.unfilled_input, d("87"));
		// Everything available was converted.
		assert_eq!(result.output, d("2.00") + d("3.90") + d("19.00"));
	}
}
