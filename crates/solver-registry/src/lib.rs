//! Client for the on-chain intent protocol.
//!
//! Pure transaction-plan builders for create/execute/cancel/cleanup/destroy
//! plus parsers from raw RPC shapes into the typed records in
//! `solver-types`. Nothing here performs I/O; callers hand the plans to the
//! RPC client and the parsers the snapshots it returns.

pub mod parse;
pub mod plan;

pub use parse::{parse_event, parse_intent, parse_protocol_config};
pub use plan::{pure_address, pure_u64, Command, PlanArg, PlanBuilder, ResultRef, TransactionPlan};

/// Module within the intent package that exports the entry points.
const INTENT_MODULE: &str = "intents";

/// The singleton clock object every deadline check reads.
const CLOCK_ID: &str = "0x6";

/// Framework package holding `coin::from_balance`.
const FRAMEWORK_PACKAGE: &str = "0x2";

/// Builder/parser facade bound to one deployed intent package.
#[derive(Debug, Clone)]
pub struct IntentRegistryClient {
	package_id: String,
	protocol_config_id: String,
}

impl IntentRegistryClient {
	pub fn new(package_id: impl Into<String>, protocol_config_id: impl Into<String>) -> Self {
		Self {
			package_id: package_id.into(),
			protocol_config_id: protocol_config_id.into(),
		}
	}

	pub fn package_id(&self) -> &str {
		&self.package_id
	}

	pub fn protocol_config_id(&self) -> &str {
		&self.protocol_config_id
	}

	/// Fully-qualified Move event type for an event struct name.
	pub fn event_type(&self, name: &str) -> String {
		format!("{}::{}::{}", self.package_id, INTENT_MODULE, name)
	}

	pub fn created_event_type(&self) -> String {
		self.event_type("IntentCreated")
	}

	pub fn executed_event_type(&self) -> String {
		self.event_type("IntentExecuted")
	}

	/// Appends `create_intent<In, Out>` consuming `input_coin`.
	/// `deadline_delta_ms` is a duration; the contract adds the current
	/// chain time itself.
	pub fn create_call(
		&self,
		builder: &mut PlanBuilder,
		input_coin: PlanArg,
		input_type: &str,
		output_type: &str,
		min_output_raw: u64,
		deadline_delta_ms: u64,
	) -> ResultRef {
		builder.move_call(
			&self.package_id,
			INTENT_MODULE,
			"create_intent",
			vec![input_type.to_string(), output_type.to_string()],
			vec![
				input_coin,
				pure_u64(min_output_raw),
				pure_u64(deadline_delta_ms),
				clock_arg(),
			],
		)
	}

	/// Standalone plan escrowing one whole coin object.
	pub fn plan_create(
		&self,
		input_coin_id: &str,
		input_type: &str,
		output_type: &str,
		min_output_raw: u64,
		deadline_delta_ms: u64,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		self.create_call(
			&mut builder,
			PlanArg::Object {
				id: input_coin_id.to_string(),
			},
			input_type,
			output_type,
			min_output_raw,
			deadline_delta_ms,
		);
		builder.finish(None)
	}

	/// Standalone plan that splits `amount_raw` off `input_coin_id` and
	/// escrows exactly that much.
	pub fn plan_create_exact(
		&self,
		input_coin_id: &str,
		amount_raw: u64,
		input_type: &str,
		output_type: &str,
		min_output_raw: u64,
		deadline_delta_ms: u64,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		let escrow = builder.split_coins(
			PlanArg::Object {
				id: input_coin_id.to_string(),
			},
			vec![pure_u64(amount_raw)],
		);
		self.create_call(
			&mut builder,
			escrow.nested(0),
			input_type,
			output_type,
			min_output_raw,
			deadline_delta_ms,
		);
		builder.finish(None)
	}

	/// Appends `execute_intent<In, Out>` to an existing plan and returns the
	/// reference to the escrowed input balance it yields, so the caller can
	/// thread it into a follow-up command.
	pub fn execute_call(
		&self,
		builder: &mut PlanBuilder,
		intent_id: &str,
		output_coin: PlanArg,
		input_type: &str,
		output_type: &str,
	) -> ResultRef {
		builder.move_call(
			&self.package_id,
			INTENT_MODULE,
			"execute_intent",
			vec![input_type.to_string(), output_type.to_string()],
			vec![
				shared_mut(intent_id),
				output_coin,
				PlanArg::SharedObject {
					id: self.protocol_config_id.clone(),
					mutable: false,
				},
				clock_arg(),
			],
		)
	}

	/// Appends `coin::from_balance<T>` converting a balance result into a
	/// transferable coin.
	pub fn coin_from_balance(
		&self,
		builder: &mut PlanBuilder,
		balance: ResultRef,
		coin_type: &str,
	) -> ResultRef {
		builder.move_call(
			FRAMEWORK_PACKAGE,
			"coin",
			"from_balance",
			vec![coin_type.to_string()],
			vec![balance.into()],
		)
	}

	/// Standalone plan for a fill: execute, convert the returned balance to
	/// a coin, transfer it to `recipient`.
	pub fn plan_execute(
		&self,
		intent_id: &str,
		output_coin_id: &str,
		input_type: &str,
		output_type: &str,
		recipient: &str,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		let balance = self.execute_call(
			&mut builder,
			intent_id,
			PlanArg::Object {
				id: output_coin_id.to_string(),
			},
			input_type,
			output_type,
		);
		let coin = self.coin_from_balance(&mut builder, balance, input_type);
		builder.transfer_objects(vec![coin.into()], pure_address(recipient));
		builder.finish(None)
	}

	/// Plan for an owner cancellation: cancel, convert the refunded balance,
	/// transfer it back to the owner.
	pub fn plan_cancel(
		&self,
		intent_id: &str,
		input_type: &str,
		output_type: &str,
		owner: &str,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		let balance = builder.move_call(
			&self.package_id,
			INTENT_MODULE,
			"cancel_intent",
			vec![input_type.to_string(), output_type.to_string()],
			vec![shared_mut(intent_id)],
		);
		let coin = self.coin_from_balance(&mut builder, balance, input_type);
		builder.transfer_objects(vec![coin.into()], pure_address(owner));
		builder.finish(None)
	}

	/// Plan for `cleanup_expired<In, Out>`; callable by anyone after the
	/// deadline. The contract refunds the owner internally.
	pub fn plan_cleanup_expired(
		&self,
		intent_id: &str,
		input_type: &str,
		output_type: &str,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		builder.move_call(
			&self.package_id,
			INTENT_MODULE,
			"cleanup_expired",
			vec![input_type.to_string(), output_type.to_string()],
			vec![shared_mut(intent_id), clock_arg()],
		);
		builder.finish(None)
	}

	/// Plan for `destroy_intent<In, Out>`; the contract aborts unless the
	/// intent is terminal with a zero balance.
	pub fn plan_destroy(
		&self,
		intent_id: &str,
		input_type: &str,
		output_type: &str,
	) -> TransactionPlan {
		let mut builder = PlanBuilder::new();
		builder.move_call(
			&self.package_id,
			INTENT_MODULE,
			"destroy_intent",
			vec![input_type.to_string(), output_type.to_string()],
			vec![shared_mut(intent_id)],
		);
		builder.finish(None)
	}
}

fn clock_arg() -> PlanArg {
	PlanArg::SharedObject {
		id: CLOCK_ID.to_string(),
		mutable: false,
	}
}

fn shared_mut(id: &str) -> PlanArg {
	PlanArg::SharedObject {
		id: id.to_string(),
		mutable: true,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SUI: &str = "0x2::sui::SUI";
	const USDC: &str = "0xdba::usdc::USDC";

	fn client() -> IntentRegistryClient {
		IntentRegistryClient::new("0xabc", "0xcfg")
	}

	#[test]
	fn event_types_are_fully_qualified() {
		assert_eq!(
			client().created_event_type(),
			"0xabc::intents::IntentCreated"
		);
	}

	#[test]
	fn create_plan_passes_deadline_as_duration() {
		let plan = client().plan_create("0xcoin", SUI, USDC, 1_800_000, 3_600_000);
		assert_eq!(plan.commands.len(), 1);
		match &plan.commands[0] {
			Command::MoveCall {
				function,
				type_args,
				args,
				..
			} => {
				assert_eq!(function, "create_intent");
				assert_eq!(type_args, &[SUI.to_string(), USDC.to_string()]);
				assert_eq!(args.len(), 4);
				assert_eq!(args[2], pure_u64(3_600_000));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn execute_plan_threads_balance_into_transfer() {
		let plan = client().plan_execute("0xintent", "0xout", SUI, USDC, "0x50");
		assert_eq!(plan.commands.len(), 3);
		match &plan.commands[1] {
			Command::MoveCall {
				function, args, ..
			} => {
				assert_eq!(function, "from_balance");
				assert_eq!(args[0], PlanArg::Result { command: 0 });
			}
			other => panic!("unexpected command: {other:?}"),
		}
		match &plan.commands[2] {
			Command::TransferObjects { objects, .. } => {
				assert_eq!(objects[0], PlanArg::Result { command: 1 });
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn cleanup_plan_is_two_args_only() {
		let plan = client().plan_cleanup_expired("0xintent", SUI, USDC);
		match &plan.commands[0] {
			Command::MoveCall {
				function, args, ..
			} => {
				assert_eq!(function, "cleanup_expired");
				assert_eq!(args.len(), 2);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn destroy_plan_targets_the_intent_alone() {
		let plan = client().plan_destroy("0xintent", SUI, USDC);
		assert_eq!(plan.commands.len(), 1);
		match &plan.commands[0] {
			Command::MoveCall {
				function, args, ..
			} => {
				assert_eq!(function, "destroy_intent");
				assert_eq!(
					args[0],
					PlanArg::SharedObject {
						id: "0xintent".into(),
						mutable: true
					}
				);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn split_create_escrows_the_split_result() {
		let plan = client().plan_create_exact("0xcoin", 500, SUI, USDC, 900, 60_000);
		assert_eq!(plan.commands.len(), 2);
		match &plan.commands[1] {
			Command::MoveCall { args, .. } => {
				assert_eq!(
					args[0],
					PlanArg::NestedResult {
						command: 0,
						index: 0
					}
				);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
