//! Environment-driven configuration.
//!
//! The service takes no command-line flags; everything is read from the
//! process environment at startup and validated before any component is
//! built. Private keys are held as opaque strings and never logged.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// DeepBook v3 package on mainnet, overridable via `DEEPBOOK_PACKAGE_ID`.
pub const DEFAULT_DEEPBOOK_PACKAGE_ID: &str =
	"0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("required environment variable {0} is not set")]
	MissingVar(&'static str),

	#[error("invalid value for {name}: {reason}")]
	InvalidVar { name: String, reason: String },
}

/// Complete service configuration, resolved from the environment.
#[derive(Clone, Serialize)]
pub struct Config {
	pub rpc_url: String,
	/// WebSocket endpoint; derived from `rpc_url` when not set explicitly.
	pub ws_url: String,
	pub api_port: u16,
	/// Intent protocol package id.
	pub package_id: String,
	/// Shared ProtocolConfig object id.
	pub protocol_config_id: String,
	pub deepbook_package_id: String,
	pub min_profit_bps: u64,
	pub max_gas_price: u64,
	pub polling_interval_ms: u64,
	/// Newest-events page size for the discovery poller.
	pub event_query_limit: usize,
	/// Enables the push (WebSocket subscription) discovery path.
	pub enable_events: bool,
	/// Pool-id overrides keyed by `BASE_QUOTE` alias pair.
	pub pool_overrides: HashMap<String, String>,
	/// Asset-type overrides keyed by alias.
	pub type_overrides: HashMap<String, String>,
	/// Decimal-exponent overrides keyed by alias.
	pub decimal_overrides: HashMap<String, u32>,
	#[serde(skip_serializing)]
	pub solver_key_hex: Option<String>,
	/// Address paired with `SOLVER_PRIVATE_KEY`; required when the key is set.
	pub solver_address: Option<String>,
	#[serde(skip_serializing)]
	pub user_key_hex: Option<String>,
	/// Address paired with `USER_PRIVATE_KEY`; required when the key is set.
	pub user_address: Option<String>,
}

// Keys are deliberately excluded from Debug output.
impl std::fmt::Debug for Config {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Config")
			.field("rpc_url", &self.rpc_url)
			.field("ws_url", &self.ws_url)
			.field("api_port", &self.api_port)
			.field("package_id", &self.package_id)
			.field("protocol_config_id", &self.protocol_config_id)
			.field("deepbook_package_id", &self.deepbook_package_id)
			.field("min_profit_bps", &self.min_profit_bps)
			.field("max_gas_price", &self.max_gas_price)
			.field("polling_interval_ms", &self.polling_interval_ms)
			.field("event_query_limit", &self.event_query_limit)
			.field("enable_events", &self.enable_events)
			.field("solver_key", &self.solver_key_hex.as_ref().map(|_| "<set>"))
			.field("user_key", &self.user_key_hex.as_ref().map(|_| "<set>"))
			.finish()
	}
}

impl Config {
	/// Reads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		let vars: HashMap<String, String> = std::env::vars().collect();
		Self::from_lookup(&vars)
	}

	/// Builds configuration from an explicit variable map. `from_env` is a
	/// thin wrapper; tests inject maps here directly.
	pub fn from_lookup(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
		let get = |name: &str| vars.get(name).map(|s| s.trim().to_string());

		let rpc_url = get("RPC_URL").ok_or(ConfigError::MissingVar("RPC_URL"))?;
		let ws_url = match get("WS_URL") {
			Some(url) => url,
			None => derive_ws_url(&rpc_url),
		};

		let mut pool_overrides = HashMap::new();
		let mut type_overrides = HashMap::new();
		let mut decimal_overrides = HashMap::new();
		for (key, value) in vars {
			if let Some(pair) = key.strip_prefix("POOL_") {
				pool_overrides.insert(pair.to_string(), value.trim().to_string());
			} else if let Some(alias) = key.strip_prefix("TYPE_") {
				type_overrides.insert(alias.to_string(), value.trim().to_string());
			} else if let Some(alias) = key.strip_prefix("COIN_DECIMALS_") {
				let decimals = value.trim().parse::<u32>().map_err(|e| {
					ConfigError::InvalidVar {
						name: key.clone(),
						reason: e.to_string(),
					}
				})?;
				decimal_overrides.insert(alias.to_string(), decimals);
			}
		}

		let config = Self {
			rpc_url,
			ws_url,
			api_port: parse_or(&get("API_PORT"), "API_PORT", 3000)?,
			package_id: get("PACKAGE_ID").ok_or(ConfigError::MissingVar("PACKAGE_ID"))?,
			protocol_config_id: get("PROTOCOL_CONFIG_ID")
				.ok_or(ConfigError::MissingVar("PROTOCOL_CONFIG_ID"))?,
			deepbook_package_id: get("DEEPBOOK_PACKAGE_ID")
				.unwrap_or_else(|| DEFAULT_DEEPBOOK_PACKAGE_ID.to_string()),
			min_profit_bps: parse_or(&get("MIN_PROFIT_BPS"), "MIN_PROFIT_BPS", 50)?,
			max_gas_price: parse_or(&get("MAX_GAS_PRICE"), "MAX_GAS_PRICE", 50_000_000)?,
			polling_interval_ms: parse_or(&get("POLLING_INTERVAL_MS"), "POLLING_INTERVAL_MS", 10_000)?,
			event_query_limit: parse_or(&get("EVENT_QUERY_LIMIT"), "EVENT_QUERY_LIMIT", 100)?,
			enable_events: parse_or(&get("ENABLE_EVENTS"), "ENABLE_EVENTS", true)?,
			pool_overrides,
			type_overrides,
			decimal_overrides,
			solver_key_hex: get("SOLVER_PRIVATE_KEY"),
			solver_address: get("SOLVER_ADDRESS"),
			user_key_hex: get("USER_PRIVATE_KEY"),
			user_address: get("USER_ADDRESS"),
		};

		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		validate_object_id("PACKAGE_ID", &self.package_id)?;
		validate_object_id("PROTOCOL_CONFIG_ID", &self.protocol_config_id)?;
		validate_object_id("DEEPBOOK_PACKAGE_ID", &self.deepbook_package_id)?;
		for (pair, id) in &self.pool_overrides {
			validate_object_id(&format!("POOL_{pair}"), id)?;
		}

		if self.min_profit_bps >= 10_000 {
			return Err(ConfigError::InvalidVar {
				name: "MIN_PROFIT_BPS".into(),
				reason: "must be below 10000".into(),
			});
		}
		if self.polling_interval_ms == 0 {
			return Err(ConfigError::InvalidVar {
				name: "POLLING_INTERVAL_MS".into(),
				reason: "must be non-zero".into(),
			});
		}
		if self.event_query_limit == 0 {
			return Err(ConfigError::InvalidVar {
				name: "EVENT_QUERY_LIMIT".into(),
				reason: "must be non-zero".into(),
			});
		}

		for (name, key, address) in [
			("SOLVER_PRIVATE_KEY", &self.solver_key_hex, &self.solver_address),
			("USER_PRIVATE_KEY", &self.user_key_hex, &self.user_address),
		] {
			if let Some(key) = key {
				if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
					return Err(ConfigError::InvalidVar {
						name: name.into(),
						reason: "expected 64 hex characters".into(),
					});
				}
				if address.is_none() {
					return Err(ConfigError::InvalidVar {
						name: name.into(),
						reason: "the matching address variable must be set with the key".into(),
					});
				}
			}
		}

		Ok(())
	}
}

fn derive_ws_url(rpc_url: &str) -> String {
	if let Some(rest) = rpc_url.strip_prefix("https://") {
		format!("wss://{rest}")
	} else if let Some(rest) = rpc_url.strip_prefix("http://") {
		format!("ws://{rest}")
	} else {
		rpc_url.to_string()
	}
}

fn validate_object_id(name: &str, id: &str) -> Result<(), ConfigError> {
	let hex_part = id.strip_prefix("0x").unwrap_or("");
	if hex_part.is_empty() || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(ConfigError::InvalidVar {
			name: name.to_string(),
			reason: format!("{id:?} is not a 0x-prefixed hex object id"),
		});
	}
	Ok(())
}

fn parse_or<T: std::str::FromStr>(
	value: &Option<String>,
	name: &str,
	default: T,
) -> Result<T, ConfigError>
where
	T::Err: std::fmt::Display,
{
	match value {
		None => Ok(default),
		Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidVar {
			name: name.to_string(),
			reason: e.to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_vars() -> HashMap<String, String> {
		HashMap::from([
			("RPC_URL".to_string(), "https://fullnode.example.com:443".to_string()),
			("PACKAGE_ID".to_string(), "0xabc123".to_string()),
			("PROTOCOL_CONFIG_ID".to_string(), "0xdef456".to_string()),
		])
	}

	#[test]
	fn defaults_apply() {
		let config = Config::from_lookup(&base_vars()).unwrap();
		assert_eq!(config.api_port, 3000);
		assert_eq!(config.min_profit_bps, 50);
		assert_eq!(config.polling_interval_ms, 10_000);
		assert_eq!(config.event_query_limit, 100);
		assert!(config.enable_events);
		assert_eq!(config.deepbook_package_id, DEFAULT_DEEPBOOK_PACKAGE_ID);
		assert_eq!(config.ws_url, "wss://fullnode.example.com:443");
	}

	#[test]
	fn missing_rpc_url_fails() {
		let mut vars = base_vars();
		vars.remove("RPC_URL");
		assert!(matches!(
			Config::from_lookup(&vars),
			Err(ConfigError::MissingVar("RPC_URL"))
		));
	}

	#[test]
	fn prefixed_overrides_are_collected() {
		let mut vars = base_vars();
		vars.insert("POOL_SUI_USDC".into(), "0xdead01".into());
		vars.insert("TYPE_WAL".into(), "0x356a::wal::WAL".into());
		vars.insert("COIN_DECIMALS_USDC".into(), "6".into());

		let config = Config::from_lookup(&vars).unwrap();
		assert_eq!(config.pool_overrides.get("SUI_USDC").unwrap(), "0xdead01");
		assert_eq!(
			config.type_overrides.get("WAL").unwrap(),
			"0x356a::wal::WAL"
		);
		assert_eq!(config.decimal_overrides.get("USDC"), Some(&6));
	}

	#[test]
	fn key_format_is_enforced() {
		let mut vars = base_vars();
		vars.insert("SOLVER_PRIVATE_KEY".into(), "deadbeef".into());
		assert!(matches!(
			Config::from_lookup(&vars),
			Err(ConfigError::InvalidVar { name, .. }) if name == "SOLVER_PRIVATE_KEY"
		));

		// A well-formed key still fails without its paired address.
		let mut vars = base_vars();
		vars.insert("SOLVER_PRIVATE_KEY".into(), "ab".repeat(32));
		assert!(Config::from_lookup(&vars).is_err());

		vars.insert("SOLVER_ADDRESS".into(), "0x5001".into());
		assert!(Config::from_lookup(&vars).is_ok());
	}

	#[test]
	fn out_of_range_profit_threshold_fails() {
		let mut vars = base_vars();
		vars.insert("MIN_PROFIT_BPS".into(), "10000".into());
		assert!(Config::from_lookup(&vars).is_err());
	}

	#[test]
	fn debug_never_echoes_keys() {
		let mut vars = base_vars();
		vars.insert("SOLVER_PRIVATE_KEY".into(), "ab".repeat(32));
		vars.insert("SOLVER_ADDRESS".into(), "0x5001".into());
		let config = Config::from_lookup(&vars).unwrap();
		let rendered = format!("{config:?}");
		assert!(!rendered.contains(&"ab".repeat(32)));
		assert!(rendered.contains("<set>"));
	}
}
