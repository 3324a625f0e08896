//! Duplicate suppression for intent pipelines.
//!
//! Subscription delivery is at-least-once and the poller re-discovers open
//! intents every pass, so the same intent id arrives repeatedly. The
//! processing set collapses that to at most one concurrent pipeline per id:
//! insertion happens before the pipeline task is spawned, and removal is
//! tied to guard drop so it runs on every exit path, including panics.

use dashmap::DashSet;
use solver_types::IntentId;
use std::sync::Arc;

/// Set of intent ids with a pipeline currently in flight. Cheap to clone;
/// clones share the same underlying set.
#[derive(Debug, Default, Clone)]
pub struct ProcessingSet {
	inner: Arc<DashSet<IntentId>>,
}

impl ProcessingSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Claims `id` for processing. Returns `None` when a pipeline for the
	/// id is already in flight.
	pub fn try_begin(&self, id: &str) -> Option<ProcessingGuard> {
		if self.inner.insert(id.to_string()) {
			Some(ProcessingGuard {
				set: self.clone(),
				id: id.to_string(),
			})
		} else {
			None
		}
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

/// Scoped claim on one intent id; dropping it releases the id.
#[derive(Debug)]
pub struct ProcessingGuard {
	set: ProcessingSet,
	id: IntentId,
}

impl ProcessingGuard {
	pub fn id(&self) -> &str {
		&self.id
	}
}

impl Drop for ProcessingGuard {
	fn drop(&mut self) {
		self.set.inner.remove(&self.id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_claim_on_same_id_is_refused() {
		let set = ProcessingSet::new();
		let guard = set.try_begin("0x1").expect("first claim");
		assert!(set.try_begin("0x1").is_none());
		assert!(set.try_begin("0x2").is_some());
		drop(guard);
		assert!(set.try_begin("0x1").is_some());
	}

	#[test]
	fn guard_releases_on_panic() {
		let set = ProcessingSet::new();
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			let _guard = set.try_begin("0x1").expect("claim");
			panic!("pipeline blew up");
		}));
		assert!(result.is_err());
		assert!(set.is_empty());
	}

	#[tokio::test]
	async fn concurrent_claims_admit_exactly_one() {
		let set = ProcessingSet::new();
		let barrier = Arc::new(tokio::sync::Barrier::new(16));
		let mut handles = Vec::new();
		for _ in 0..16 {
			let set = set.clone();
			let barrier = Arc::clone(&barrier);
			handles.push(tokio::spawn(async move {
				barrier.wait().await;
				let guard = set.try_begin("0xdup");
				let admitted = guard.is_some();
				// Hold the claim across every competitor's attempt.
				barrier.wait().await;
				admitted
			}));
		}
		let mut admitted = 0;
		for handle in handles {
			if handle.await.unwrap() {
				admitted += 1;
			}
		}
		assert_eq!(admitted, 1);
		assert!(set.is_empty());
	}
}
