//! Atomic settlement transaction construction.
//!
//! One plan pays the user, collects the escrowed input, and resells it on
//! the CLOB. Every step shares the transaction: an abort at any point
//! leaves the intent OPEN and the solver's inventory untouched (the output
//! buffer split simply stays in the solver wallet).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solver_account::Signer;
use solver_clob::ClobQuoter;
use solver_registry::{pure_u64, IntentRegistryClient, PlanArg, PlanBuilder, TransactionPlan};
use solver_rpc::{Coin, ExecutionResult, RpcClient};
use solver_types::{AssetType, Intent, Result, SolverError};
use tracing::debug;

/// Safety margin over `min_output_amount` held ready in the payment coin.
const OUTPUT_BUFFER_BPS: u64 = 500;

/// Selection of solver coins able to cover a payment.
#[derive(Debug)]
pub struct CoinSelection {
	/// First coin; merge target when more than one is needed.
	pub primary: Coin,
	/// Additional coins merged into the primary.
	pub merged: Vec<Coin>,
}

/// Picks coins until their combined balance covers `needed`, in the order
/// the RPC returned them. Fails with `InsufficientBalance` otherwise.
pub fn select_coins(coins: Vec<Coin>, needed: u64) -> Result<CoinSelection> {
	let available: u64 = coins.iter().map(|c| c.balance).sum();
	let mut total = 0u64;
	let mut selected = Vec::new();
	for coin in coins {
		total = total.saturating_add(coin.balance);
		selected.push(coin);
		if total >= needed {
			let mut iter = selected.into_iter();
			let primary = iter.next().expect("at least one coin selected");
			return Ok(CoinSelection {
				primary,
				merged: iter.collect(),
			});
		}
	}
	Err(SolverError::InsufficientBalance { needed, available })
}

/// The payment amount the settlement plan keeps on hand: the intent's
/// minimum plus a 5% buffer.
pub fn buffered_output(min_output_amount: u64) -> u64 {
	min_output_amount.saturating_add((min_output_amount as u128 * OUTPUT_BUFFER_BPS as u128 / 10_000) as u64)
}

/// Builds the full settlement plan for one intent:
///
/// 1. merge solver coins of the output asset and split the exact payment,
/// 2. `execute_intent`, yielding the escrowed input balance,
/// 3. convert the balance to a coin,
/// 4. resell it on the CLOB (base or quote side as the pool dictates),
/// 5. transfer all proceeds to the solver.
pub async fn build_settlement_plan(
	rpc: &RpcClient,
	registry: &IntentRegistryClient,
	quoter: &ClobQuoter,
	solver_address: &str,
	deep_fee_type: &AssetType,
	intent: &Intent,
	max_gas_price: u64,
) -> Result<TransactionPlan> {
	let pool = quoter.find_pool(&intent.input_type, &intent.output_type)?.clone();

	// Coin inventory for the payment side.
	let needed = buffered_output(intent.min_output_amount);
	let output_coins = rpc
		.get_coins(solver_address, intent.output_type.as_str())
		.await?;
	let selection = select_coins(output_coins, needed)?;

	// A DEEP coin pays the CLOB taker fee; leftovers come back in the swap
	// result, so the whole coin is supplied.
	let deep_coins = rpc.get_coins(solver_address, deep_fee_type.as_str()).await?;
	let fee_coin = deep_coins
		.into_iter()
		.find(|c| c.balance > 0)
		.ok_or(SolverError::NoFeeCoin)?;

	debug!(
		intent_id = %solver_types::truncate_id(&intent.id),
		payment = intent.min_output_amount,
		buffer = needed - intent.min_output_amount,
		merged_coins = selection.merged.len(),
		"building settlement plan"
	);

	let mut builder = PlanBuilder::new();

	// 1. Merge inventory and split the exact payment.
	let primary = PlanArg::Object {
		id: selection.primary.coin_id.clone(),
	};
	if !selection.merged.is_empty() {
		builder.merge_coins(
			primary.clone(),
			selection
				.merged
				.iter()
				.map(|c| PlanArg::Object {
					id: c.coin_id.clone(),
				})
				.collect(),
		);
	}
	let payment = builder.split_coins(primary, vec![pure_u64(intent.min_output_amount)]);

	// 2. Fill the intent; the escrowed input balance is the result.
	let escrow = registry.execute_call(
		&mut builder,
		&intent.id,
		payment.nested(0),
		intent.input_type.as_str(),
		intent.output_type.as_str(),
	);

	// 3. Balance -> coin.
	let input_coin = registry.coin_from_balance(&mut builder, escrow, intent.input_type.as_str());

	// 4. Reverse-swap the collected input against the pool.
	let selling_base = intent.input_type == pool.base_type;
	let swap_function = if selling_base {
		"swap_exact_base_for_quote"
	} else {
		"swap_exact_quote_for_base"
	};
	let swap = builder.move_call(
		quoter.deepbook_package_id(),
		"pool",
		swap_function,
		vec![
			pool.base_type.as_str().to_string(),
			pool.quote_type.as_str().to_string(),
		],
		vec![
			PlanArg::SharedObject {
				id: pool.pool_id.clone(),
				mutable: true,
			},
			input_coin.into(),
			PlanArg::Object {
				id: fee_coin.coin_id.clone(),
			},
			pure_u64(0),
			PlanArg::SharedObject {
				id: "0x6".to_string(),
				mutable: false,
			},
		],
	);

	// 5. The swap returns (base, quote, deep) leftovers; keep all three.
	builder.transfer_objects(
		vec![swap.nested(0), swap.nested(1), swap.nested(2)],
		solver_registry::pure_address(solver_address),
	);

	Ok(builder.finish(Some(max_gas_price)))
}

/// Asks the node for unsigned bytes, signs them, and submits. Shared by the
/// engine (solver key) and the facade's key-holding test endpoints.
pub async fn sign_and_submit(
	rpc: &RpcClient,
	signer: &dyn Signer,
	plan: &TransactionPlan,
	default_gas_budget: u64,
) -> Result<ExecutionResult> {
	let gas_budget = plan.gas_budget.unwrap_or(default_gas_budget);
	let tx_bytes_b64 = rpc
		.build_unsigned(&plan.to_json(), signer.address(), gas_budget)
		.await?;

	let tx_bytes = BASE64
		.decode(&tx_bytes_b64)
		.map_err(|e| SolverError::Transient(format!("node returned malformed tx bytes: {e}")))?;
	let signature = signer
		.sign(&tx_bytes)
		.map_err(|e| SolverError::Fatal(format!("signing failed: {e}")))?;

	rpc.execute_signed(&tx_bytes_b64, &signature).await
}

#[cfg(test)]
mod tests {
	use super::*;

	fn coin(id: &str, balance: u64) -> Coin {
		Coin {
			coin_id: id.into(),
			balance,
			version: 1,
			digest: String::new(),
		}
	}

	#[test]
	fn buffer_is_five_percent() {
		assert_eq!(buffered_output(2_000_000), 2_100_000);
		assert_eq!(buffered_output(0), 0);
		// Truncating division on odd amounts.
		assert_eq!(buffered_output(99), 99 + 4);
	}

	#[test]
	fn single_coin_covers_payment() {
		let selection = select_coins(vec![coin("0xa", 5_000_000)], 2_100_000).unwrap();
		assert_eq!(selection.primary.coin_id, "0xa");
		assert!(selection.merged.is_empty());
	}

	#[test]
	fn multiple_coins_merge_in_rpc_order() {
		let selection = select_coins(
			vec![coin("0xa", 1_000_000), coin("0xb", 600_000), coin("0xc", 600_000)],
			2_100_000,
		)
		.unwrap();
		assert_eq!(selection.primary.coin_id, "0xa");
		assert_eq!(selection.merged.len(), 2);
	}

	#[test]
	fn shortfall_reports_totals() {
		let err = select_coins(vec![coin("0xa", 1_000)], 2_100_000).unwrap_err();
		match err {
			SolverError::InsufficientBalance { needed, available } => {
				assert_eq!(needed, 2_100_000);
				assert_eq!(available, 1_000);
			}
			other => panic!("unexpected error: {other}"),
		}
	}
}
