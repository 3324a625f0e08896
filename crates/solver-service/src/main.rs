//! Service entry point.
//!
//! Takes no command-line flags; all configuration comes from the process
//! environment. Exit codes: 0 on a normal stop, 1 on a fatal startup
//! failure (bad configuration or a failed cold-start quote), 2 when the
//! serving layer dies unrecoverably.

use anyhow::{Context, Result};
use solver_account::LocalKeySigner;
use solver_api::ApiContext;
use solver_clob::{registry::PoolRegistry, ClobQuoter};
use solver_config::Config;
use solver_core::{EngineSettings, SolverEngine};
use solver_registry::IntentRegistryClient;
use solver_rpc::RpcClient;
use solver_types::AliasTable;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Raw amount for the startup connectivity quote: 1 SUI.
const COLD_START_AMOUNT: u64 = 1_000_000_000;

#[tokio::main]
async fn main() -> ExitCode {
	setup_tracing();

	match run().await {
		Ok(code) => code,
		Err(e) => {
			error!(error = %format!("{e:#}"), "fatal startup failure");
			ExitCode::from(1)
		}
	}
}

async fn run() -> Result<ExitCode> {
	let config = Config::from_env().context("configuration")?;
	info!(?config, "configuration loaded");

	let rpc = Arc::new(
		RpcClient::new(config.rpc_url.clone(), config.ws_url.clone()).context("rpc client")?,
	);

	let aliases = AliasTable::with_overrides(&config.type_overrides, &config.decimal_overrides);
	let pools = PoolRegistry::from_overrides(&aliases, &config.pool_overrides)
		.context("pool registry")?;
	info!(pools = pools.pools().len(), "pool registry ready");

	let solver_key = config
		.solver_key_hex
		.as_deref()
		.context("SOLVER_PRIVATE_KEY is required")?;
	let solver_address = config
		.solver_address
		.clone()
		.context("SOLVER_ADDRESS is required")?;
	let signer = Arc::new(
		LocalKeySigner::from_hex(solver_key, solver_address.clone()).context("solver key")?,
	);

	let registry =
		IntentRegistryClient::new(config.package_id.clone(), config.protocol_config_id.clone());
	let quoter = Arc::new(ClobQuoter::new(
		Arc::clone(&rpc),
		pools,
		config.deepbook_package_id.clone(),
		solver_address,
	));

	let settings = EngineSettings {
		min_profit_bps: config.min_profit_bps,
		max_gas_price: config.max_gas_price,
		polling_interval: Duration::from_millis(config.polling_interval_ms),
		event_query_limit: config.event_query_limit,
		enable_events: config.enable_events,
		cold_start_pair: (aliases.resolve("SUI"), aliases.resolve("USDC")),
		cold_start_amount_raw: COLD_START_AMOUNT,
		deep_fee_type: aliases.resolve("DEEP"),
	};

	let engine = SolverEngine::new(
		Arc::clone(&rpc),
		registry.clone(),
		Arc::clone(&quoter),
		signer,
		settings,
	);

	// A failed cold-start quote aborts the process before serving anything.
	Arc::clone(&engine).start().await.context("engine startup")?;

	let user_signer = match (&config.user_key_hex, &config.user_address) {
		(Some(key), Some(address)) => Some(Arc::new(
			LocalKeySigner::from_hex(key, address.clone()).context("user key")?,
		) as Arc<dyn solver_account::Signer>),
		_ => None,
	};

	let state = Arc::new(ApiContext {
		rpc,
		registry,
		quoter,
		engine: Arc::clone(&engine),
		aliases,
		config: config.clone(),
		user_signer,
	});

	let api_port = config.api_port;
	let mut api_task = tokio::spawn(solver_api::serve(state, api_port));

	info!("service started");

	let exit_code = tokio::select! {
		_ = shutdown_signal() => {
			info!("shutdown signal received");
			ExitCode::from(0)
		}
		result = &mut api_task => {
			match result {
				Ok(Err(e)) => error!(error = %e, "API server failed"),
				Err(e) => error!(error = %e, "API task aborted"),
				Ok(Ok(())) => error!("API server stopped unexpectedly"),
			}
			ExitCode::from(2)
		}
	};

	engine.stop().await;
	api_task.abort();
	info!("service stopped");

	Ok(exit_code)
}

fn setup_tracing() {
	let default_level =
		std::env::var("SOLVER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
