//! Parsers from raw RPC shapes into typed records.
//!
//! The node's JSON is loosely versioned: integers arrive as numbers or
//! decimal strings, and escrowed balances appear either flat (`"123"`) or
//! wrapped (`{fields: {value: "123"}}`). These parsers accept every shape
//! observed in the wild and reject everything else loudly.

use serde_json::Value;
use solver_rpc::{EventEnvelope, ObjectSnapshot};
use solver_types::{
	AssetType, Intent, IntentCancelledEvent, IntentCreatedEvent, IntentEvent, IntentExecutedEvent,
	IntentExpiredEvent, IntentStatus, ProtocolConfig, Result, SolverError,
};

/// Parses a shared intent object. Fails with `NotFound` when the snapshot
/// is not an intent, `Transient` when a field is malformed.
pub fn parse_intent(snapshot: &ObjectSnapshot) -> Result<Intent> {
	let (input_type, output_type) = type_params(&snapshot.type_string).ok_or_else(|| {
		SolverError::NotFound(format!(
			"object {} is not an intent: {}",
			snapshot.object_id, snapshot.type_string
		))
	})?;

	let fields = &snapshot.fields;
	let status_raw = u64_value(field(fields, "status")?).ok_or_else(|| malformed("status"))?;
	let status = IntentStatus::from_u8(status_raw as u8)
		.ok_or_else(|| SolverError::Transient(format!("unknown intent status {status_raw}")))?;

	Ok(Intent {
		id: snapshot.object_id.clone(),
		owner: str_value(field(fields, "owner")?).ok_or_else(|| malformed("owner"))?,
		input_type: AssetType::new(input_type),
		output_type: AssetType::new(output_type),
		input_balance: balance_value(field(fields, "input_balance")?)
			.ok_or_else(|| malformed("input_balance"))?,
		min_output_amount: u64_value(field(fields, "min_output_amount")?)
			.ok_or_else(|| malformed("min_output_amount"))?,
		deadline_ms: u64_value(field(fields, "deadline")?).ok_or_else(|| malformed("deadline"))?,
		status,
		solver: optional_address(fields.get("solver")),
	})
}

/// Parses the shared protocol configuration object.
pub fn parse_protocol_config(snapshot: &ObjectSnapshot) -> Result<ProtocolConfig> {
	let fields = &snapshot.fields;
	Ok(ProtocolConfig {
		id: snapshot.object_id.clone(),
		fee_bps: u64_value(field(fields, "fee_bps")?).ok_or_else(|| malformed("fee_bps"))?,
		fee_recipient: str_value(field(fields, "fee_recipient")?)
			.ok_or_else(|| malformed("fee_recipient"))?,
		paused: field(fields, "paused")?.as_bool().unwrap_or(false),
	})
}

/// Parses one event envelope into its typed record, matching on the event
/// struct name suffix.
pub fn parse_event(envelope: &EventEnvelope) -> Result<IntentEvent> {
	let json = &envelope.parsed_json;
	let name = envelope
		.type_string
		.rsplit("::")
		.next()
		.unwrap_or(&envelope.type_string);

	match name {
		"IntentCreated" => Ok(IntentEvent::Created(IntentCreatedEvent {
			intent_id: required_str(json, "intent_id")?,
			owner: required_str(json, "owner")?,
			input_type: AssetType::new(required_type_name(json, "input_type")?),
			output_type: AssetType::new(required_type_name(json, "output_type")?),
			input_amount: required_u64(json, "input_amount")?,
			min_output_amount: required_u64(json, "min_output_amount")?,
			deadline_ms: required_u64(json, "deadline")?,
		})),
		"IntentExecuted" => Ok(IntentEvent::Executed(IntentExecutedEvent {
			intent_id: required_str(json, "intent_id")?,
			solver: required_str(json, "solver")?,
			input_amount: required_u64(json, "input_amount")?,
			output_amount: required_u64(json, "output_amount")?,
			fee_amount: required_u64(json, "fee_amount")?,
			execution_time_ms: required_u64(json, "execution_time")?,
		})),
		"IntentCancelled" => Ok(IntentEvent::Cancelled(IntentCancelledEvent {
			intent_id: required_str(json, "intent_id")?,
			owner: required_str(json, "owner")?,
		})),
		"IntentExpired" => Ok(IntentEvent::Expired(IntentExpiredEvent {
			intent_id: required_str(json, "intent_id")?,
			owner: required_str(json, "owner")?,
			triggered_by: required_str(json, "triggered_by")?,
			refund_amount: required_u64(json, "refund_amount")?,
		})),
		other => Err(SolverError::InvalidArgument(format!(
			"unrecognised intent event type: {other}"
		))),
	}
}

/// Extracts the two type parameters from a parameterised intent type string
/// such as `0xabc::intents::Intent<0x2::sui::SUI, 0xd::usdc::USDC>`.
fn type_params(type_string: &str) -> Option<(String, String)> {
	let open = type_string.find('<')?;
	let inner = type_string.get(open + 1..type_string.rfind('>')?)?;

	// Split on the single top-level comma; the params may themselves be
	// parameterised.
	let mut depth = 0usize;
	for (i, c) in inner.char_indices() {
		match c {
			'<' => depth += 1,
			'>' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				let first = inner[..i].trim().to_string();
				let second = inner[i + 1..].trim().to_string();
				if first.is_empty() || second.is_empty() {
					return None;
				}
				return Some((first, second));
			}
			_ => {}
		}
	}
	None
}

fn field<'a>(fields: &'a Value, name: &str) -> Result<&'a Value> {
	fields
		.get(name)
		.ok_or_else(|| SolverError::Transient(format!("intent object missing field {name}")))
}

fn malformed(name: &str) -> SolverError {
	SolverError::Transient(format!("intent object field {name} is malformed"))
}

fn u64_value(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) => n.as_u64(),
		Value::String(s) => s.parse::<u64>().ok(),
		_ => None,
	}
}

fn str_value(value: &Value) -> Option<String> {
	value.as_str().map(str::to_string)
}

/// Accepts both serialized balance shapes: flat string/number, and the
/// wrapped `{fields: {value: ...}}` form emitted by newer node versions.
fn balance_value(value: &Value) -> Option<u64> {
	if let Some(flat) = u64_value(value) {
		return Some(flat);
	}
	value.pointer("/fields/value").and_then(u64_value)
}

/// Move `TypeName` fields arrive either flat or as `{fields: {name: ...}}`.
fn type_name_value(value: &Value) -> Option<String> {
	if let Some(flat) = value.as_str() {
		return Some(normalise_type(flat));
	}
	value
		.pointer("/fields/name")
		.and_then(Value::as_str)
		.map(normalise_type)
}

/// TypeName drops the `0x` prefix on package addresses; put it back.
fn normalise_type(raw: &str) -> String {
	if raw.starts_with("0x") {
		raw.to_string()
	} else {
		format!("0x{raw}")
	}
}

/// An optional on-chain address: missing, null, flat string, or `{vec: []}`.
fn optional_address(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Object(_) => value?
			.pointer("/vec/0")
			.and_then(Value::as_str)
			.map(str::to_string),
		_ => None,
	}
}

fn required_str(json: &Value, name: &str) -> Result<String> {
	json.get(name)
		.and_then(str_value)
		.ok_or_else(|| SolverError::Transient(format!("event missing field {name}")))
}

fn required_u64(json: &Value, name: &str) -> Result<u64> {
	json.get(name)
		.and_then(u64_value)
		.ok_or_else(|| SolverError::Transient(format!("event missing field {name}")))
}

fn required_type_name(json: &Value, name: &str) -> Result<String> {
	json.get(name)
		.and_then(type_name_value)
		.ok_or_else(|| SolverError::Transient(format!("event missing field {name}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn snapshot(fields: Value) -> ObjectSnapshot {
		ObjectSnapshot {
			object_id: "0xint".into(),
			version: 7,
			type_string: "0xabc::intents::Intent<0x2::sui::SUI, 0xdba::usdc::USDC>".into(),
			fields,
		}
	}

	#[test]
	fn parses_flat_balance_shape() {
		let intent = parse_intent(&snapshot(json!({
			"owner": "0xaaa",
			"input_balance": "1000000000",
			"min_output_amount": "1800000",
			"deadline": "1722550000000",
			"status": 0,
			"solver": null,
		})))
		.unwrap();

		assert_eq!(intent.input_balance, 1_000_000_000);
		assert_eq!(intent.input_type.as_str(), "0x2::sui::SUI");
		assert_eq!(intent.output_type.as_str(), "0xdba::usdc::USDC");
		assert_eq!(intent.status, IntentStatus::Open);
		assert_eq!(intent.solver, None);
	}

	#[test]
	fn parses_wrapped_balance_shape() {
		let intent = parse_intent(&snapshot(json!({
			"owner": "0xaaa",
			"input_balance": {"fields": {"value": "42"}},
			"min_output_amount": 5,
			"deadline": 1000,
			"status": 1,
			"solver": "0x50",
		})))
		.unwrap();

		assert_eq!(intent.input_balance, 42);
		assert_eq!(intent.status, IntentStatus::Completed);
		assert_eq!(intent.solver.as_deref(), Some("0x50"));
	}

	#[test]
	fn rejects_non_intent_objects() {
		let mut s = snapshot(json!({}));
		s.type_string = "0x2::coin::Coin<0x2::sui::SUI>".into();
		assert!(matches!(
			parse_intent(&s),
			Err(SolverError::NotFound(_))
		));
	}

	#[test]
	fn type_param_extraction_handles_nesting() {
		let (a, b) =
			type_params("0xabc::intents::Intent<0x2::table::Table<u64, u8>, 0x2::sui::SUI>")
				.unwrap();
		assert_eq!(a, "0x2::table::Table<u64, u8>");
		assert_eq!(b, "0x2::sui::SUI");

		assert!(type_params("0x2::coin::Coin<0x2::sui::SUI>").is_none());
		assert!(type_params("0xabc::intents::Registry").is_none());
	}

	fn envelope(name: &str, json: Value) -> EventEnvelope {
		EventEnvelope {
			type_string: format!("0xabc::intents::{name}"),
			parsed_json: json,
			timestamp_ms: 1,
		}
	}

	#[test]
	fn parses_created_event_with_wrapped_type_names() {
		let event = parse_event(&envelope(
			"IntentCreated",
			json!({
				"intent_id": "0x1",
				"owner": "0xaaa",
				"input_type": {"fields": {"name": "2::sui::SUI"}},
				"output_type": "0xdba::usdc::USDC",
				"input_amount": "1000000000",
				"min_output_amount": "1800000",
				"deadline": "1722550000000",
			}),
		))
		.unwrap();

		match event {
			IntentEvent::Created(e) => {
				assert_eq!(e.input_type.as_str(), "0x2::sui::SUI");
				assert_eq!(e.output_type.as_str(), "0xdba::usdc::USDC");
				assert_eq!(e.input_amount, 1_000_000_000);
			}
			other => panic!("unexpected event: {other:?}"),
		}
	}

	#[test]
	fn parses_executed_cancelled_and_expired_events() {
		let executed = parse_event(&envelope(
			"IntentExecuted",
			json!({
				"intent_id": "0x1",
				"solver": "0x50",
				"input_amount": "990000000",
				"output_amount": "2000000",
				"fee_amount": "10000000",
				"execution_time": "1722550001000",
			}),
		))
		.unwrap();
		assert!(matches!(executed, IntentEvent::Executed(_)));

		let cancelled = parse_event(&envelope(
			"IntentCancelled",
			json!({"intent_id": "0x1", "owner": "0xaaa"}),
		))
		.unwrap();
		assert!(matches!(cancelled, IntentEvent::Cancelled(_)));

		let expired = parse_event(&envelope(
			"IntentExpired",
			json!({
				"intent_id": "0x1",
				"owner": "0xaaa",
				"triggered_by": "0xbbb",
				"refund_amount": "1000000000",
			}),
		))
		.unwrap();
		match expired {
			IntentEvent::Expired(e) => assert_eq!(e.owner, "0xaaa"),
			other => panic!("unexpected event: {other:?}"),
		}

		assert!(parse_event(&envelope("SomethingElse", json!({}))).is_err());
	}

	#[test]
	fn parses_protocol_config() {
		let config = parse_protocol_config(&ObjectSnapshot {
			object_id: "0xcfg".into(),
			version: 1,
			type_string: "0xabc::intents::ProtocolConfig".into(),
			fields: json!({
				"fee_bps": "100",
				"fee_recipient": "0xfee",
				"paused": false,
			}),
		})
		.unwrap();

		assert_eq!(config.fee_bps, 100);
		assert_eq!(config.fee_recipient, "0xfee");
		assert!(!config.paused);
	}
}
