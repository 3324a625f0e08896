//! Transaction-plan model.
//!
//! A [`TransactionPlan`] is an ordered list of commands sharing one atomic
//! transaction; command results are referenced by later commands through
//! [`ResultRef`]. The plan is pure data: the node assembles the native
//! transaction bytes from its JSON form, so no chain-specific wire encoding
//! lives here.

use serde::{Deserialize, Serialize};

/// Reference to the result of an earlier command in the same plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRef(pub u16);

/// One argument to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanArg {
	/// Owned object passed by reference.
	Object { id: String },
	/// Shared object; `mutable` selects the reference kind.
	SharedObject { id: String, mutable: bool },
	/// BCS-encoded pure value.
	Pure { bytes: Vec<u8> },
	/// Result of an earlier command.
	Result { command: u16 },
	/// One element of an earlier command's tuple result.
	NestedResult { command: u16, index: u16 },
	/// The gas coin.
	GasCoin,
}

impl ResultRef {
	/// The `index`-th element of this command's tuple result.
	pub fn nested(self, index: u16) -> PlanArg {
		PlanArg::NestedResult {
			command: self.0,
			index,
		}
	}
}

impl From<ResultRef> for PlanArg {
	fn from(r: ResultRef) -> Self {
		PlanArg::Result { command: r.0 }
	}
}

/// One command in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
	MoveCall {
		package: String,
		module: String,
		function: String,
		type_args: Vec<String>,
		args: Vec<PlanArg>,
	},
	SplitCoins {
		coin: PlanArg,
		amounts: Vec<PlanArg>,
	},
	MergeCoins {
		primary: PlanArg,
		sources: Vec<PlanArg>,
	},
	TransferObjects {
		objects: Vec<PlanArg>,
		recipient: PlanArg,
	},
}

/// A complete, submittable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPlan {
	pub commands: Vec<Command>,
	pub gas_budget: Option<u64>,
}

impl TransactionPlan {
	/// JSON form handed to the node's transaction builder.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::to_value(self).expect("plan serialization is infallible")
	}
}

/// Incremental plan builder. Each append returns a [`ResultRef`] for the
/// command just added, which later commands may consume.
#[derive(Debug, Default)]
pub struct PlanBuilder {
	commands: Vec<Command>,
}

impl PlanBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	fn push(&mut self, command: Command) -> ResultRef {
		let index = self.commands.len() as u16;
		self.commands.push(command);
		ResultRef(index)
	}

	pub fn move_call(
		&mut self,
		package: &str,
		module: &str,
		function: &str,
		type_args: Vec<String>,
		args: Vec<PlanArg>,
	) -> ResultRef {
		self.push(Command::MoveCall {
			package: package.to_string(),
			module: module.to_string(),
			function: function.to_string(),
			type_args,
			args,
		})
	}

	pub fn split_coins(&mut self, coin: PlanArg, amounts: Vec<PlanArg>) -> ResultRef {
		self.push(Command::SplitCoins { coin, amounts })
	}

	pub fn merge_coins(&mut self, primary: PlanArg, sources: Vec<PlanArg>) -> ResultRef {
		self.push(Command::MergeCoins { primary, sources })
	}

	pub fn transfer_objects(&mut self, objects: Vec<PlanArg>, recipient: PlanArg) -> ResultRef {
		self.push(Command::TransferObjects { objects, recipient })
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}

	pub fn finish(self, gas_budget: Option<u64>) -> TransactionPlan {
		TransactionPlan {
			commands: self.commands,
			gas_budget,
		}
	}
}

/// BCS-encodes a pure u64 argument.
pub fn pure_u64(value: u64) -> PlanArg {
	PlanArg::Pure {
		bytes: bcs::to_bytes(&value).expect("u64 encoding is infallible"),
	}
}

/// BCS-encodes a pure address argument.
pub fn pure_address(address: &str) -> PlanArg {
	let stripped = address.strip_prefix("0x").unwrap_or(address);
	let mut bytes = [0u8; 32];
	// Left-pad odd or short addresses into the 32-byte form.
	let hex_bytes: Vec<u8> = {
		let padded = if stripped.len() % 2 == 1 {
			format!("0{stripped}")
		} else {
			stripped.to_string()
		};
		(0..padded.len())
			.step_by(2)
			.filter_map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
			.collect()
	};
	let offset = 32usize.saturating_sub(hex_bytes.len());
	bytes[offset..].copy_from_slice(&hex_bytes[..hex_bytes.len().min(32)]);
	PlanArg::Pure {
		bytes: bytes.to_vec(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn result_refs_index_commands_in_order() {
		let mut builder = PlanBuilder::new();
		let first = builder.move_call("0x2", "coin", "zero", vec![], vec![]);
		let second = builder.split_coins(first.into(), vec![pure_u64(5)]);
		assert_eq!(first, ResultRef(0));
		assert_eq!(second, ResultRef(1));

		let plan = builder.finish(Some(1_000));
		assert_eq!(plan.commands.len(), 2);
		assert_eq!(plan.gas_budget, Some(1_000));
	}

	#[test]
	fn pure_u64_is_little_endian() {
		match pure_u64(1) {
			PlanArg::Pure { bytes } => assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0]),
			other => panic!("unexpected arg: {other:?}"),
		}
	}

	#[test]
	fn pure_address_pads_to_32_bytes() {
		match pure_address("0x6") {
			PlanArg::Pure { bytes } => {
				assert_eq!(bytes.len(), 32);
				assert_eq!(bytes[31], 6);
				assert!(bytes[..31].iter().all(|b| *b == 0));
			}
			other => panic!("unexpected arg: {other:?}"),
		}
	}

	#[test]
	fn plan_serializes_to_tagged_json() {
		let mut builder = PlanBuilder::new();
		builder.move_call(
			"0xabc",
			"intents",
			"cleanup_expired",
			vec!["0x2::sui::SUI".into()],
			vec![PlanArg::SharedObject {
				id: "0x1".into(),
				mutable: true,
			}],
		);
		let json = builder.finish(None).to_json();
		assert_eq!(json["commands"][0]["command"], "moveCall");
		assert_eq!(json["commands"][0]["function"], "cleanup_expired");
	}
}
