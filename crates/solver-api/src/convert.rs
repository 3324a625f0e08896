//! Human/raw unit conversion.
//!
//! All request amounts are human-unit decimals; everything on the wire to
//! the chain is a raw integer. `human_to_raw` rounds half-up at the last
//! raw digit; `raw_to_human` is exact.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use solver_types::{Result, SolverError};

/// Converts a human amount to raw units: `round(x * 10^decimals)`.
pub fn human_to_raw(amount: Decimal, decimals: u32) -> Result<u64> {
	if amount.is_sign_negative() {
		return Err(SolverError::InvalidArgument(format!(
			"amount {amount} is negative"
		)));
	}
	let scaled = amount * Decimal::from(10u64.pow(decimals));
	scaled
		.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
		.to_u64()
		.ok_or_else(|| SolverError::InvalidArgument(format!("amount {amount} out of range")))
}

/// Converts raw units to a human amount: `raw / 10^decimals`.
pub fn raw_to_human(raw: u64, decimals: u32) -> Decimal {
	Decimal::from(raw) / Decimal::from(10u64.pow(decimals))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn d(s: &str) -> Decimal {
		Decimal::from_str_exact(s).unwrap()
	}

	#[test]
	fn whole_amounts_scale_exactly() {
		assert_eq!(human_to_raw(d("1"), 9).unwrap(), 1_000_000_000);
		assert_eq!(human_to_raw(d("2.5"), 6).unwrap(), 2_500_000);
		assert_eq!(human_to_raw(d("0"), 9).unwrap(), 0);
	}

	#[test]
	fn sub_raw_digits_round_half_up() {
		// 0.0000000015 SUI = 1.5 raw units.
		assert_eq!(human_to_raw(d("0.0000000015"), 9).unwrap(), 2);
		assert_eq!(human_to_raw(d("0.0000000014"), 9).unwrap(), 1);
	}

	#[test]
	fn negative_amounts_are_rejected() {
		assert!(human_to_raw(d("-1"), 9).is_err());
	}

	#[test]
	fn raw_to_human_is_exact() {
		assert_eq!(raw_to_human(1_800_000, 6), d("1.8"));
		assert_eq!(raw_to_human(1, 9), d("0.000000001"));
	}

	#[test]
	fn round_trips_at_supported_precision() {
		for raw in [0u64, 1, 999, 1_000_000_000, 123_456_789_012] {
			assert_eq!(human_to_raw(raw_to_human(raw, 9), 9).unwrap(), raw);
		}
	}
}
