//! Typed JSON-RPC client for the ledger.
//!
//! Thin wrapper over the full node's JSON-RPC surface: object reads, coin
//! queries, event queries and subscriptions, dev-inspect simulation, and
//! signed-transaction submission. Failures are mapped into the shared
//! [`SolverError`](solver_types::SolverError) taxonomy; this crate applies
//! no retries of its own.

mod client;
mod subscription;
mod types;

pub use client::RpcClient;
pub use subscription::EventSubscription;
pub use types::{
	Coin, DevInspectResults, EffectsStatus, EventEnvelope, ExecutionResult, ObjectSnapshot,
	ReturnValue,
};
