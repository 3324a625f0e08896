//! Engine counters.
//!
//! Monotonic counters written from many pipeline tasks; readers take any
//! recent consistent snapshot. Relaxed atomics suffice since no ordering
//! between counters is promised.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for the engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
	processed: AtomicU64,
	executed: AtomicU64,
	skipped: AtomicU64,
	gas_spent: AtomicU64,
	profit_raw: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
	pub processed: u64,
	pub executed: u64,
	pub skipped: u64,
	pub gas_spent: u64,
	pub profit_raw: u64,
}

impl EngineMetrics {
	pub fn inc_processed(&self) {
		self.processed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_executed(&self) {
		self.executed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_skipped(&self) {
		self.skipped.fetch_add(1, Ordering::Relaxed);
	}

	pub fn add_gas_spent(&self, gas: u64) {
		self.gas_spent.fetch_add(gas, Ordering::Relaxed);
	}

	pub fn add_profit_raw(&self, profit: u64) {
		self.profit_raw.fetch_add(profit, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		MetricsSnapshot {
			processed: self.processed.load(Ordering::Relaxed),
			executed: self.executed.load(Ordering::Relaxed),
			skipped: self.skipped.load(Ordering::Relaxed),
			gas_spent: self.gas_spent.load(Ordering::Relaxed),
			profit_raw: self.profit_raw.load(Ordering::Relaxed),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counters_accumulate() {
		let metrics = EngineMetrics::default();
		metrics.inc_processed();
		metrics.inc_processed();
		metrics.inc_skipped();
		metrics.add_gas_spent(1_500);
		metrics.add_profit_raw(42);

		let snapshot = metrics.snapshot();
		assert_eq!(snapshot.processed, 2);
		assert_eq!(snapshot.skipped, 1);
		assert_eq!(snapshot.executed, 0);
		assert_eq!(snapshot.gas_spent, 1_500);
		assert_eq!(snapshot.profit_raw, 42);
	}
}
