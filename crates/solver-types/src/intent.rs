//! The on-chain intent record and its lifecycle.

use crate::assets::AssetType;
use serde::{Deserialize, Serialize};

/// Object id of a shared intent, as a `0x`-prefixed hex string.
pub type IntentId = String;

/// Lifecycle status of an intent. Transitions are monotone and one-shot:
/// OPEN -> COMPLETED on a successful fill, OPEN -> CANCELLED by the owner,
/// OPEN -> EXPIRED by anyone after the deadline. There is no re-opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentStatus {
	Open,
	Completed,
	Cancelled,
	Expired,
}

impl IntentStatus {
	pub fn from_u8(raw: u8) -> Option<Self> {
		match raw {
			0 => Some(Self::Open),
			1 => Some(Self::Completed),
			2 => Some(Self::Cancelled),
			3 => Some(Self::Expired),
			_ => None,
		}
	}

	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Open)
	}
}

/// A user-posted swap intent: pay `input_balance` of `input_type`, receive
/// at least `min_output_amount` of `output_type` before `deadline_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
	pub id: IntentId,
	/// Address that posted the intent and alone may cancel it.
	pub owner: String,
	pub input_type: AssetType,
	pub output_type: AssetType,
	/// Escrowed input quantity, non-zero while the intent is OPEN.
	pub input_balance: u64,
	pub min_output_amount: u64,
	/// Absolute wall-clock deadline in milliseconds.
	pub deadline_ms: u64,
	pub status: IntentStatus,
	/// Populated on the transition to COMPLETED.
	pub solver: Option<String>,
}

impl Intent {
	pub fn is_expired(&self, now_ms: u64) -> bool {
		now_ms > self.deadline_ms
	}

	pub fn is_terminal(&self) -> bool {
		self.status.is_terminal()
	}
}

/// Shared protocol configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
	pub id: String,
	/// Fee in basis points, withheld from the input side. Range [0, 500].
	pub fee_bps: u64,
	pub fee_recipient: String,
	pub paused: bool,
}

/// Protocol fee on `amount` at `fee_bps`, integer arithmetic truncating
/// toward zero. The solver receives `amount - fee(amount, fee_bps)`.
pub fn fee(amount: u64, fee_bps: u64) -> u64 {
	((amount as u128 * fee_bps as u128) / 10_000) as u64
}

#[cfg(test)]
mod tests {
	use super::*;

	fn intent(status: IntentStatus, deadline_ms: u64) -> Intent {
		Intent {
			id: "0x1".into(),
			owner: "0xaaa".into(),
			input_type: AssetType::new("0x2::sui::SUI"),
			output_type: AssetType::new("0xdba::usdc::USDC"),
			input_balance: 1_000_000_000,
			min_output_amount: 1_800_000,
			deadline_ms,
			status,
			solver: None,
		}
	}

	#[test]
	fn status_round_trip_and_terminality() {
		assert_eq!(IntentStatus::from_u8(0), Some(IntentStatus::Open));
		assert_eq!(IntentStatus::from_u8(3), Some(IntentStatus::Expired));
		assert_eq!(IntentStatus::from_u8(4), None);
		assert!(!IntentStatus::Open.is_terminal());
		assert!(IntentStatus::Completed.is_terminal());
		assert!(IntentStatus::Cancelled.is_terminal());
		assert!(IntentStatus::Expired.is_terminal());
	}

	#[test]
	fn expiry_is_strictly_after_deadline() {
		let i = intent(IntentStatus::Open, 1_000);
		assert!(!i.is_expired(999));
		assert!(!i.is_expired(1_000));
		assert!(i.is_expired(1_001));
	}

	#[test]
	fn fee_truncates_toward_zero() {
		// 1% of 1 SUI.
		assert_eq!(fee(1_000_000_000, 100), 10_000_000);
		assert_eq!(fee(1_000_000_000, 0), 0);
		// 0.5% of 999 truncates: 999 * 50 / 10000 = 4.995.
		assert_eq!(fee(999, 50), 4);
		// No overflow near u64::MAX.
		assert_eq!(fee(u64::MAX, 10_000), u64::MAX);
	}
}
