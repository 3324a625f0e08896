//! Domain error taxonomy shared by every service.
//!
//! The taxonomy is transport-independent: the RPC client maps JSON-RPC and
//! network failures into it, the quoter and engine add their own kinds, and
//! the HTTP facade maps each kind to a response status. No service retries
//! inside this taxonomy; retry policy lives with the engine's polling loop.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
	/// Network-level failure: timeout, 5xx, dropped connection. The next
	/// polling pass covers re-discovery; nothing in-process retries.
	#[error("transient: {0}")]
	Transient(String),

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("not found: {0}")]
	NotFound(String),

	/// On-chain Move abort surfaced by dev-inspect or execution effects.
	#[error("reverted with code {code}: {reason}")]
	Reverted { code: u64, reason: String },

	#[error("no pool registered for pair {0}")]
	NoPool(String),

	#[error("no liquidity in pool {0}")]
	NoLiquidity(String),

	#[error("insufficient balance: need {needed}, have {available}")]
	InsufficientBalance { needed: u64, available: u64 },

	/// Solver inventory holds no DEEP coin to pay CLOB trading fees with.
	#[error("no DEEP fee coin in solver inventory")]
	NoFeeCoin,

	#[error("configuration error: {0}")]
	Config(String),

	/// Startup-time failure that must abort the process.
	#[error("fatal: {0}")]
	Fatal(String),
}

impl SolverError {
	/// True when the failure is worth re-observing on the next poll.
	pub fn is_transient(&self) -> bool {
		matches!(self, SolverError::Transient(_))
	}

	/// Builds a `Reverted` error with the human-readable reason for a known
	/// intent-contract abort code.
	pub fn reverted(code: u64) -> Self {
		SolverError::Reverted {
			code,
			reason: abort_reason(code).to_string(),
		}
	}
}

/// Human-readable reason for each intent-contract abort code.
pub fn abort_reason(code: u64) -> &'static str {
	match code {
		0 => "intent is not in a valid status for this operation",
		1 => "caller is not the intent owner",
		2 => "provided output is below the intent's minimum",
		3 => "intent deadline has passed",
		4 => "input and output asset types are identical",
		5 => "intent deadline has not passed yet",
		6 => "intent is not in a terminal status",
		7 => "amount must be non-zero",
		8 => "deadline duration is invalid",
		9 => "fee basis points out of range",
		_ => "unknown abort code",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reverted_carries_known_reason() {
		let err = SolverError::reverted(2);
		match err {
			SolverError::Reverted { code, reason } => {
				assert_eq!(code, 2);
				assert!(reason.contains("below the intent's minimum"));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn transient_classification() {
		assert!(SolverError::Transient("timeout".into()).is_transient());
		assert!(!SolverError::NotFound("0x1".into()).is_transient());
	}
}
