//! Solver engine.
//!
//! Coordinates the full intent lifecycle: discovery (polling plus event
//! subscription), duplicate suppression, profitability analysis against the
//! CLOB, atomic settlement submission, metrics, and expired-intent cleanup.
//! Pipelines are shared-nothing per intent; the only cross-task state is
//! the processing set and the counters.

pub mod dedup;
pub mod execution;
pub mod metrics;

use dedup::ProcessingSet;
use metrics::{EngineMetrics, MetricsSnapshot};
use solver_account::Signer;
use solver_clob::ClobQuoter;
use solver_registry::{parse_event, parse_intent, IntentRegistryClient, TransactionPlan};
use solver_rpc::{EventSubscription, ExecutionResult, RpcClient};
use solver_types::{
	truncate_id, AssetType, Intent, IntentEvent, IntentStatus, Result, SolverError, SwapQuote,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long `stop` waits for in-flight pipelines to drain.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables the service resolves from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
	pub min_profit_bps: u64,
	pub max_gas_price: u64,
	pub polling_interval: Duration,
	pub event_query_limit: usize,
	pub enable_events: bool,
	/// Pair used for the startup connectivity quote.
	pub cold_start_pair: (AssetType, AssetType),
	/// Raw input amount for the startup quote (1 unit of the pair's base).
	pub cold_start_amount_raw: u64,
	/// Fee token the CLOB swaps charge their taker fee in.
	pub deep_fee_type: AssetType,
}

/// Outcome of the profitability gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDecision {
	/// Fill the intent; carries the expected margin.
	Execute { profit_raw: u64, profit_bps: u64 },
	/// Leave the intent for someone else.
	Skip { profit_bps: u64 },
}

/// Basis-point margin of a fill: output-denominated profit over the
/// input-denominated size. The unit mismatch is deliberate and gates real
/// execution decisions; both sides of that trade-off are visible to tests.
pub fn profit_bps(profit_raw: u64, input_amount: u64) -> u64 {
	if input_amount == 0 {
		return 0;
	}
	((profit_raw as u128 * 10_000) / input_amount as u128) as u64
}

/// Applies the profitability gate to a quote.
pub fn decide(quote_output_raw: u64, intent: &Intent, min_profit_bps: u64) -> ExecutionDecision {
	let profit_raw = quote_output_raw.saturating_sub(intent.min_output_amount);
	let bps = profit_bps(profit_raw, intent.input_balance);
	if bps < min_profit_bps {
		ExecutionDecision::Skip { profit_bps: bps }
	} else {
		ExecutionDecision::Execute {
			profit_raw,
			profit_bps: bps,
		}
	}
}

/// The engine. Construct with [`SolverEngine::new`], then [`start`].
///
/// [`start`]: SolverEngine::start
pub struct SolverEngine {
	rpc: Arc<RpcClient>,
	registry: IntentRegistryClient,
	quoter: Arc<ClobQuoter>,
	signer: Arc<dyn Signer>,
	settings: EngineSettings,
	metrics: Arc<EngineMetrics>,
	processing: ProcessingSet,
	tasks: Mutex<Vec<JoinHandle<()>>>,
	subscription: Mutex<Option<EventSubscription>>,
}

impl SolverEngine {
	pub fn new(
		rpc: Arc<RpcClient>,
		registry: IntentRegistryClient,
		quoter: Arc<ClobQuoter>,
		signer: Arc<dyn Signer>,
		settings: EngineSettings,
	) -> Arc<Self> {
		Arc::new(Self {
			rpc,
			registry,
			quoter,
			signer,
			settings,
			metrics: Arc::new(EngineMetrics::default()),
			processing: ProcessingSet::new(),
			tasks: Mutex::new(Vec::new()),
			subscription: Mutex::new(None),
		})
	}

	pub fn metrics(&self) -> MetricsSnapshot {
		self.metrics.snapshot()
	}

	/// Number of pipelines currently in flight.
	pub fn in_flight(&self) -> usize {
		self.processing.len()
	}

	pub fn solver_address(&self) -> &str {
		self.signer.address()
	}

	/// Starts discovery. Fails fast when the CLOB is unreachable.
	pub async fn start(self: Arc<Self>) -> Result<()> {
		self.cold_start_check().await?;

		let mut tasks = self.tasks.lock().await;
		tasks.push(Self::spawn_poller(Arc::clone(&self)));

		if self.settings.enable_events {
			let (event_tx, event_rx) = mpsc::unbounded_channel::<String>();
			let subscription = self
				.rpc
				.subscribe_events(
					&self.registry.created_event_type(),
					Arc::new(move |envelope| {
						if let Ok(IntentEvent::Created(event)) = parse_event(&envelope) {
							let _ = event_tx.send(event.intent_id);
						}
					}),
				)
				.await?;
			*self.subscription.lock().await = Some(subscription);
			tasks.push(Self::spawn_dispatcher(Arc::clone(&self), event_rx));
			info!("event subscription active");
		}

		info!(
			poll_interval_ms = self.settings.polling_interval.as_millis() as u64,
			min_profit_bps = self.settings.min_profit_bps,
			"solver engine started"
		);
		Ok(())
	}

	/// One synchronous quote against the default pair to prove CLOB
	/// connectivity before any discovery runs.
	async fn cold_start_check(&self) -> Result<()> {
		let (from, to) = self.settings.cold_start_pair.clone();
		let quote = self
			.quoter
			.quote(&from, &to, self.settings.cold_start_amount_raw)
			.await
			.map_err(|e| SolverError::Fatal(format!("cold-start quote failed: {e}")))?;
		info!(
			output_raw = quote.output_raw,
			mid_price = %quote.mid_price,
			"cold-start quote ok"
		);
		Ok(())
	}

	fn spawn_poller(engine: Arc<Self>) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(engine.settings.polling_interval);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
			loop {
				ticker.tick().await;
				match SolverEngine::poll_once(&engine).await {
					Ok(count) if count > 0 => debug!(count, "poll pass dispatched intents"),
					Ok(_) => {}
					Err(e) => warn!(error = %e, "poll pass failed"),
				}
			}
		})
	}

	fn spawn_dispatcher(
		engine: Arc<Self>,
		mut rx: mpsc::UnboundedReceiver<String>,
	) -> JoinHandle<()> {
		tokio::spawn(async move {
			while let Some(intent_id) = rx.recv().await {
				debug!(intent_id = %truncate_id(&intent_id), "push discovery");
				SolverEngine::process(&engine, &intent_id);
			}
		})
	}

	/// One pull pass: the newest creation events, each fed to `process`.
	pub async fn poll_once(engine: &Arc<Self>) -> Result<usize> {
		let envelopes = engine
			.rpc
			.query_events(
				&engine.registry.created_event_type(),
				engine.settings.event_query_limit,
				true,
			)
			.await?;

		let mut dispatched = 0;
		for envelope in &envelopes {
			if let Ok(IntentEvent::Created(event)) = parse_event(envelope) {
				SolverEngine::process(engine, &event.intent_id);
				dispatched += 1;
			}
		}
		Ok(dispatched)
	}

	/// Entry point for both discovery paths. A no-op when a pipeline for
	/// the id is already in flight; otherwise claims the id and spawns the
	/// pipeline. The claim is released on every exit path.
	pub fn process(engine: &Arc<Self>, intent_id: &str) {
		let Some(guard) = engine.processing.try_begin(intent_id) else {
			debug!(intent_id = %truncate_id(intent_id), "already processing");
			return;
		};

		let engine = Arc::clone(engine);
		tokio::spawn(async move {
			// The guard lives for the whole pipeline; drop releases the id.
			engine.metrics.inc_processed();
			if let Err(e) = engine.run_pipeline(guard.id()).await {
				if e.is_transient() {
					info!(
						intent_id = %truncate_id(guard.id()),
						error = %e,
						"pipeline hit a transient failure; next poll re-discovers"
					);
				} else {
					warn!(
						intent_id = %truncate_id(guard.id()),
						error = %e,
						"pipeline failed"
					);
				}
			}
		});
	}

	/// The per-intent pipeline: read, expiry check, quote, gate, execute.
	async fn run_pipeline(&self, intent_id: &str) -> Result<()> {
		let intent = match self.read_intent(intent_id).await? {
			Some(intent) => intent,
			None => return Ok(()),
		};

		if intent.status != IntentStatus::Open {
			debug!(intent_id = %truncate_id(intent_id), status = ?intent.status, "not open");
			return Ok(());
		}

		if intent.is_expired(now_ms()) {
			self.cleanup_expired(&intent).await;
			return Ok(());
		}

		// What the market pays us for the asset the user gives up.
		let quote = match self
			.quoter
			.quote(&intent.input_type, &intent.output_type, intent.input_balance)
			.await
		{
			Ok(quote) => quote,
			Err(e @ (SolverError::NoPool(_) | SolverError::NoLiquidity(_))) => {
				self.metrics.inc_skipped();
				info!(intent_id = %truncate_id(intent_id), reason = %e, "skipped");
				return Ok(());
			}
			Err(e) => return Err(e),
		};

		match decide(quote.output_raw, &intent, self.settings.min_profit_bps) {
			ExecutionDecision::Skip { profit_bps } => {
				self.metrics.inc_skipped();
				info!(
					intent_id = %truncate_id(intent_id),
					profit_bps,
					threshold = self.settings.min_profit_bps,
					"below profit threshold"
				);
			}
			ExecutionDecision::Execute {
				profit_raw,
				profit_bps,
			} => {
				info!(
					intent_id = %truncate_id(intent_id),
					profit_raw,
					profit_bps,
					"executing fill"
				);
				self.try_fill(&intent, profit_raw).await;
			}
		}
		Ok(())
	}

	async fn read_intent(&self, intent_id: &str) -> Result<Option<Intent>> {
		let snapshot = match self.rpc.get_object(intent_id).await {
			Ok(snapshot) => snapshot,
			Err(SolverError::NotFound(_)) => return Ok(None),
			Err(e) => return Err(e),
		};
		match parse_intent(&snapshot) {
			Ok(intent) => Ok(Some(intent)),
			Err(SolverError::NotFound(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	async fn try_fill(&self, intent: &Intent, expected_profit_raw: u64) {
		match self.fill_intent(intent).await {
			Ok(result) if !result.status.is_success() => {
				// Landed but failed without a Move abort (e.g. an object
				// version conflict from concurrent coin use). Dropped; the
				// next poll re-attempts.
				warn!(
					intent_id = %truncate_id(&intent.id),
					digest = %result.digest,
					status = ?result.status,
					"fill landed with failed effects"
				);
			}
			Ok(result) => {
				self.metrics.inc_executed();
				self.metrics.add_gas_spent(result.gas_used);
				self.metrics.add_profit_raw(expected_profit_raw);
				info!(
					intent_id = %truncate_id(&intent.id),
					digest = %result.digest,
					gas_used = result.gas_used,
					"fill confirmed"
				);
			}
			Err(SolverError::Reverted { code, reason }) => {
				// The intent stays OPEN on-chain; another solver may take it.
				warn!(
					intent_id = %truncate_id(&intent.id),
					abort_code = code,
					reason,
					"fill reverted"
				);
			}
			Err(e @ (SolverError::InsufficientBalance { .. } | SolverError::NoFeeCoin)) => {
				self.metrics.inc_skipped();
				warn!(intent_id = %truncate_id(&intent.id), error = %e, "inventory short; skipped");
			}
			Err(e) if e.is_transient() => {
				info!(
					intent_id = %truncate_id(&intent.id),
					error = %e,
					"fill submission failed; next poll re-discovers"
				);
			}
			Err(e) => {
				warn!(intent_id = %truncate_id(&intent.id), error = %e, "fill failed");
			}
		}
	}

	/// Builds, signs, and submits the atomic settlement transaction for one
	/// open intent. Also the backing for the facade's manual execute path.
	pub async fn fill_intent(&self, intent: &Intent) -> Result<ExecutionResult> {
		let plan = execution::build_settlement_plan(
			&self.rpc,
			&self.registry,
			&self.quoter,
			self.signer.address(),
			&self.settings.deep_fee_type,
			intent,
			self.settings.max_gas_price,
		)
		.await?;
		self.submit_plan(&plan).await
	}

	/// Quote an intent the way the pipeline would; used by the facade.
	pub async fn quote_intent(&self, intent: &Intent) -> Result<SwapQuote> {
		self.quoter
			.quote(&intent.input_type, &intent.output_type, intent.input_balance)
			.await
	}

	/// Reads an intent object for the facade; `NotFound` when missing.
	pub async fn load_intent(&self, intent_id: &str) -> Result<Intent> {
		self.read_intent(intent_id)
			.await?
			.ok_or_else(|| SolverError::NotFound(format!("intent {intent_id}")))
	}

	/// Submits a cleanup transaction for an expired intent. Failures are
	/// logged and swallowed; any participant can clean up later.
	async fn cleanup_expired(&self, intent: &Intent) {
		info!(intent_id = %truncate_id(&intent.id), "cleaning up expired intent");
		let plan = self.registry.plan_cleanup_expired(
			&intent.id,
			intent.input_type.as_str(),
			intent.output_type.as_str(),
		);
		let plan = TransactionPlan {
			gas_budget: Some(self.settings.max_gas_price),
			..plan
		};
		match self.submit_plan(&plan).await {
			Ok(result) if result.status.is_success() => {
				info!(intent_id = %truncate_id(&intent.id), digest = %result.digest, "expired intent cleaned up")
			}
			Ok(result) => {
				warn!(intent_id = %truncate_id(&intent.id), status = ?result.status, "cleanup landed with failed effects")
			}
			Err(e) => {
				warn!(intent_id = %truncate_id(&intent.id), error = %e, "cleanup failed; leaving for later")
			}
		}
	}

	/// Build-sign-submit for a complete plan under the solver key.
	async fn submit_plan(&self, plan: &TransactionPlan) -> Result<ExecutionResult> {
		execution::sign_and_submit(
			&self.rpc,
			self.signer.as_ref(),
			plan,
			self.settings.max_gas_price,
		)
		.await
	}

	/// Stops discovery and lets in-flight pipelines drain.
	pub async fn stop(&self) {
		info!("stopping solver engine");
		for task in self.tasks.lock().await.drain(..) {
			task.abort();
		}
		// Dropping the handle cancels the subscription.
		*self.subscription.lock().await = None;

		let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
		while !self.processing.is_empty() && tokio::time::Instant::now() < deadline {
			tokio::time::sleep(Duration::from_millis(100)).await;
		}
		if self.processing.is_empty() {
			info!("solver engine stopped; pipelines drained");
		} else {
			warn!(
				in_flight = self.processing.len(),
				"solver engine stopped with pipelines still in flight"
			);
		}
	}
}

fn now_ms() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn intent(input_balance: u64, min_output_amount: u64) -> Intent {
		Intent {
			id: "0x1".into(),
			owner: "0xaaa".into(),
			input_type: AssetType::new("0x2::sui::SUI"),
			output_type: AssetType::new("0xdba::usdc::USDC"),
			input_balance,
			min_output_amount,
			deadline_ms: u64::MAX,
			status: IntentStatus::Open,
			solver: None,
		}
	}

	#[test]
	fn profit_bps_uses_input_denominator() {
		// 1 SUI in, 400 micro-USDC of margin: the mixed-unit ratio rounds
		// to zero, so the fill is skipped at any positive threshold.
		assert_eq!(profit_bps(400, 1_000_000_000), 0);
		assert_eq!(profit_bps(0, 0), 0);
		assert_eq!(profit_bps(5_000_000, 1_000_000_000), 50);
	}

	#[test]
	fn thin_margin_is_skipped() {
		// CLOB pays 10_000_400 against a 10_000_000 minimum.
		let decision = decide(10_000_400, &intent(1_000_000_000, 10_000_000), 50);
		assert_eq!(decision, ExecutionDecision::Skip { profit_bps: 0 });
	}

	#[test]
	fn fat_margin_executes() {
		let decision = decide(12_000_000, &intent(1_000_000_000, 10_000_000), 50);
		// 2_000_000 * 10_000 / 1_000_000_000 = 20 bps; below 50 skips.
		assert_eq!(decision, ExecutionDecision::Skip { profit_bps: 20 });

		let decision = decide(20_000_000, &intent(1_000_000_000, 10_000_000), 50);
		assert_eq!(
			decision,
			ExecutionDecision::Execute {
				profit_raw: 10_000_000,
				profit_bps: 100
			}
		);
	}

	#[test]
	fn zero_threshold_admits_zero_profit() {
		let decision = decide(9_000_000, &intent(1_000_000_000, 10_000_000), 0);
		assert_eq!(
			decision,
			ExecutionDecision::Execute {
				profit_raw: 0,
				profit_bps: 0
			}
		);
		// With any real threshold the zero-profit fill is skipped.
		let decision = decide(9_000_000, &intent(1_000_000_000, 10_000_000), 1);
		assert_eq!(decision, ExecutionDecision::Skip { profit_bps: 0 });
	}
}
