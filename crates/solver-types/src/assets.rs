//! Asset-type identifiers.
//!
//! An asset is identified by its fully-qualified Move type string, e.g.
//! `0x2::sui::SUI`. Two asset types are equal iff their identifiers are
//! byte-equal; no normalisation is attempted here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fully-qualified Move coin type, e.g. `0x2::sui::SUI`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AssetType(String);

impl AssetType {
	pub fn new(s: impl Into<String>) -> Self {
		Self(s.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The package address portion of the type, up to the first `::`.
	pub fn package(&self) -> &str {
		self.0.split("::").next().unwrap_or(&self.0)
	}
}

impl fmt::Display for AssetType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for AssetType {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<String> for AssetType {
	fn from(s: String) -> Self {
		Self(s)
	}
}

/// Native gas coin.
pub const SUI_TYPE: &str = "0x2::sui::SUI";

/// Circle USDC on mainnet.
pub const USDC_TYPE: &str =
	"0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";

/// DeepBook's fee token.
pub const DEEP_TYPE: &str =
	"0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP";

/// DeepBook testnet USDC.
pub const DBUSDC_TYPE: &str =
	"0xf7152c05930480cd740d7311b5b8b45c6f488e3a53a11c3f74a6fac36a52e0d7::DBUSDC::DBUSDC";

/// Decimal exponent assumed for asset types with no configured override.
pub const DEFAULT_DECIMALS: u32 = 9;

/// Configurable alias table: short symbols to full type strings, plus the
/// decimal exponent per alias. Unknown aliases pass through untouched as
/// raw type identifiers; unknown types default to [`DEFAULT_DECIMALS`].
#[derive(Debug, Clone)]
pub struct AliasTable {
	aliases: HashMap<String, String>,
	decimals: HashMap<String, u32>,
}

impl Default for AliasTable {
	fn default() -> Self {
		Self {
			aliases: HashMap::from([
				("SUI".to_string(), SUI_TYPE.to_string()),
				("USDC".to_string(), USDC_TYPE.to_string()),
				("DBUSDC".to_string(), DBUSDC_TYPE.to_string()),
				("DEEP".to_string(), DEEP_TYPE.to_string()),
			]),
			decimals: HashMap::from([
				("SUI".to_string(), 9),
				("USDC".to_string(), 6),
				("DBUSDC".to_string(), 6),
				("DEEP".to_string(), 6),
			]),
		}
	}
}

impl AliasTable {
	/// Applies configured overrides on top of the defaults.
	pub fn with_overrides(
		type_overrides: &HashMap<String, String>,
		decimal_overrides: &HashMap<String, u32>,
	) -> Self {
		let mut table = Self::default();
		for (alias, type_string) in type_overrides {
			table.aliases.insert(alias.clone(), type_string.clone());
		}
		for (alias, decimals) in decimal_overrides {
			table.decimals.insert(alias.clone(), *decimals);
		}
		table
	}

	/// Resolves an alias to its asset type; raw type identifiers pass
	/// through unchanged.
	pub fn resolve(&self, alias_or_type: &str) -> AssetType {
		match self.aliases.get(alias_or_type) {
			Some(full) => AssetType::new(full.clone()),
			None => AssetType::new(alias_or_type),
		}
	}

	/// Decimal exponent for an asset type, defaulting to 9.
	pub fn decimals_for(&self, asset: &AssetType) -> u32 {
		self.alias_of(asset)
			.and_then(|alias| self.decimals.get(alias).copied())
			.unwrap_or(DEFAULT_DECIMALS)
	}

	/// Reverse lookup: the alias whose type string equals `asset`.
	pub fn alias_of(&self, asset: &AssetType) -> Option<&str> {
		self.aliases
			.iter()
			.find(|(_, t)| t.as_str() == asset.as_str())
			.map(|(alias, _)| alias.as_str())
	}

	/// All known aliases with their resolved types.
	pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn equality_is_byte_equality() {
		let a = AssetType::new(SUI_TYPE);
		let b = AssetType::new("0x2::sui::SUI");
		let c = AssetType::new("0x02::sui::SUI");
		assert_eq!(a, b);
		assert_ne!(a, c);
	}

	#[test]
	fn package_prefix() {
		assert_eq!(AssetType::new(SUI_TYPE).package(), "0x2");
	}

	#[test]
	fn alias_resolution_and_passthrough() {
		let table = AliasTable::default();
		assert_eq!(table.resolve("SUI").as_str(), SUI_TYPE);
		assert_eq!(table.resolve("0x9::x::X").as_str(), "0x9::x::X");
	}

	#[test]
	fn decimals_default_to_nine() {
		let table = AliasTable::default();
		assert_eq!(table.decimals_for(&AssetType::new(USDC_TYPE)), 6);
		assert_eq!(table.decimals_for(&AssetType::new("0x9::x::X")), 9);
	}

	#[test]
	fn overrides_extend_defaults() {
		let types = HashMap::from([("WAL".to_string(), "0x356a::wal::WAL".to_string())]);
		let decimals = HashMap::from([("WAL".to_string(), 9u32), ("USDC".to_string(), 8u32)]);
		let table = AliasTable::with_overrides(&types, &decimals);
		assert_eq!(table.resolve("WAL").as_str(), "0x356a::wal::WAL");
		assert_eq!(table.decimals_for(&AssetType::new(USDC_TYPE)), 8);
	}
}
