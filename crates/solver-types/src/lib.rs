//! Shared types for the swap-intent settlement backend.
//!
//! This crate defines the canonical data model that flows between services:
//! asset types and their decimal exponents, the on-chain intent record and
//! its lifecycle, protocol configuration, CLOB pool descriptors and Level-2
//! snapshots, quote results, the typed event records emitted by the intent
//! contract, and the domain error taxonomy every service reports in.

pub mod assets;
pub mod errors;
pub mod events;
pub mod intent;
pub mod market;

pub use assets::{AliasTable, AssetType};
pub use errors::{Result, SolverError};
pub use events::{
	IntentCancelledEvent, IntentCreatedEvent, IntentEvent, IntentExecutedEvent, IntentExpiredEvent,
};
pub use intent::{fee, Intent, IntentId, IntentStatus, ProtocolConfig};
pub use market::{Level2Book, Pool, PriceLevel, SwapQuote};

/// Truncates an object id for log output: first 8 hex chars plus "..".
pub fn truncate_id(id: &str) -> String {
	let stripped = id.strip_prefix("0x").unwrap_or(id);
	if stripped.len() <= 8 {
		id.to_string()
	} else {
		format!("0x{}..", &stripped[..8])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncate_shortens_long_ids() {
		assert_eq!(truncate_id("0xdeadbeefcafebabe"), "0xdeadbeef..");
		assert_eq!(truncate_id("0xabc"), "0xabc");
	}
}
