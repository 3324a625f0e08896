//! HTTP facade.
//!
//! A thin JSON request/response layer over the core: alias resolution,
//! human/raw unit conversion, and routing into the quoter, the intent
//! registry client, and the engine. The facade trusts its caller; there is
//! no authentication.

pub mod convert;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use solver_account::Signer;
use solver_clob::ClobQuoter;
use solver_config::Config;
use solver_core::SolverEngine;
use solver_registry::IntentRegistryClient;
use solver_rpc::RpcClient;
use solver_types::{AliasTable, Result, SolverError};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for every handler.
pub struct ApiContext {
	pub rpc: Arc<RpcClient>,
	pub registry: IntentRegistryClient,
	pub quoter: Arc<ClobQuoter>,
	pub engine: Arc<SolverEngine>,
	pub aliases: AliasTable,
	pub config: Config,
	/// Server-held user key for the test-path endpoints; absent in
	/// production deployments.
	pub user_signer: Option<Arc<dyn Signer>>,
}

pub type AppState = Arc<ApiContext>;

/// Builds the full route table.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(handlers::system::health))
		.route("/pools", get(handlers::system::pools))
		.route("/config", post(handlers::system::protocol_config))
		.route("/solver/metrics", get(handlers::system::metrics))
		.route(
			"/solver/metrics/prometheus",
			get(handlers::system::metrics_prometheus),
		)
		.route("/quote", post(handlers::market::quote))
		.route("/orderbook", post(handlers::market::orderbook))
		.route("/price", post(handlers::market::price))
		.route("/intent", post(handlers::intents::get_intent))
		.route("/intent/create", post(handlers::intents::create_intent))
		.route("/intent/execute", post(handlers::intents::execute_intent))
		.route("/intent/cancel", post(handlers::intents::cancel_intent))
		.route("/intents/open", post(handlers::intents::open_intents))
		.route("/intents/history", post(handlers::intents::history))
		.route("/intent/build/create", post(handlers::build::build_create))
		.route("/intent/build/execute", post(handlers::build::build_execute))
		.route("/intent/build/cancel", post(handlers::build::build_cancel))
		.route("/tx/execute", post(handlers::build::execute_signed_tx))
		.route("/wallet/balance", post(handlers::wallet::balance))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Serves the facade until the process shuts down.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
	let app = router(state);
	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
		.await
		.map_err(|e| SolverError::Fatal(format!("cannot bind API port {port}: {e}")))?;

	info!(port, "API server listening");
	axum::serve(listener, app)
		.await
		.map_err(|e| SolverError::Fatal(format!("API server failed: {e}")))
}
