//! Pool registry.
//!
//! Populated once at startup from defaults plus configured overrides, then
//! read-only. The set of unordered `{base, quote}` pairs must be unique.

use solver_types::{AliasTable, AssetType, Pool, Result, SolverError};
use std::collections::HashMap;

/// DeepBook v3 SUI/USDC pool on mainnet; overridable via `POOL_SUI_USDC`.
pub const DEFAULT_SUI_USDC_POOL: &str =
	"0xe05dafb5133bcffb8d59f4e12465dc0e9faeaa05e3e342a08fe135800e3e4407";

/// Registry of quotable pools, keyed by unordered asset pair.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
	pools: Vec<Pool>,
}

impl PoolRegistry {
	/// Builds a registry from explicit pools, enforcing pair uniqueness.
	pub fn new(pools: Vec<Pool>) -> Result<Self> {
		for (i, a) in pools.iter().enumerate() {
			for b in &pools[i + 1..] {
				if a.matches_pair(&b.base_type, &b.quote_type) {
					return Err(SolverError::Config(format!(
						"duplicate pool for pair {} / {}",
						b.base_type, b.quote_type
					)));
				}
			}
		}
		Ok(Self { pools })
	}

	/// Builds the default registry: the SUI/USDC pool plus one pool per
	/// configured `BASE_QUOTE` override. Scalars come from the alias
	/// table's decimal exponents.
	pub fn from_overrides(
		table: &AliasTable,
		pool_overrides: &HashMap<String, String>,
	) -> Result<Self> {
		let mut pools = Vec::new();
		let mut seen_default = false;

		for (pair, pool_id) in pool_overrides {
			let (base_alias, quote_alias) = pair.split_once('_').ok_or_else(|| {
				SolverError::Config(format!("pool override key {pair:?} is not BASE_QUOTE"))
			})?;
			if pair == "SUI_USDC" {
				seen_default = true;
			}
			pools.push(make_pool(table, base_alias, quote_alias, pool_id));
		}

		if !seen_default {
			pools.push(make_pool(table, "SUI", "USDC", DEFAULT_SUI_USDC_POOL));
		}

		Self::new(pools)
	}

	/// The unique pool trading the unordered pair `{a, b}`, if registered.
	pub fn find_pool(&self, a: &AssetType, b: &AssetType) -> Option<&Pool> {
		self.pools.iter().find(|pool| pool.matches_pair(a, b))
	}

	pub fn pools(&self) -> &[Pool] {
		&self.pools
	}
}

fn make_pool(table: &AliasTable, base_alias: &str, quote_alias: &str, pool_id: &str) -> Pool {
	let base_type = table.resolve(base_alias);
	let quote_type = table.resolve(quote_alias);
	let base_scalar = 10u64.pow(table.decimals_for(&base_type));
	let quote_scalar = 10u64.pow(table.decimals_for(&quote_type));
	Pool {
		pool_id: pool_id.to_string(),
		base_type,
		quote_type,
		base_scalar,
		quote_scalar,
		tick_size: 1_000,
		lot_size: 100_000_000,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use solver_types::assets::{SUI_TYPE, USDC_TYPE};

	#[test]
	fn default_registry_has_sui_usdc() {
		let table = AliasTable::default();
		let registry = PoolRegistry::from_overrides(&table, &HashMap::new()).unwrap();
		let pool = registry
			.find_pool(&AssetType::new(SUI_TYPE), &AssetType::new(USDC_TYPE))
			.unwrap();
		assert_eq!(pool.pool_id, DEFAULT_SUI_USDC_POOL);
		assert_eq!(pool.base_scalar, 1_000_000_000);
		assert_eq!(pool.quote_scalar, 1_000_000);
	}

	#[test]
	fn lookup_is_unordered() {
		let table = AliasTable::default();
		let registry = PoolRegistry::from_overrides(&table, &HashMap::new()).unwrap();
		assert!(registry
			.find_pool(&AssetType::new(USDC_TYPE), &AssetType::new(SUI_TYPE))
			.is_some());
	}

	#[test]
	fn override_replaces_default_pool_id() {
		let table = AliasTable::default();
		let overrides = HashMap::from([("SUI_USDC".to_string(), "0xcustom".to_string())]);
		let registry = PoolRegistry::from_overrides(&table, &overrides).unwrap();
		assert_eq!(registry.pools().len(), 1);
		assert_eq!(registry.pools()[0].pool_id, "0xcustom");
	}

	#[test]
	fn duplicate_pairs_are_rejected() {
		let table = AliasTable::default();
		let a = make_pool(&table, "SUI", "USDC", "0x1");
		let b = make_pool(&table, "USDC", "SUI", "0x2");
		assert!(PoolRegistry::new(vec![a, b]).is_err());
	}

	#[test]
	fn malformed_override_key_fails() {
		let table = AliasTable::default();
		let overrides = HashMap::from([("SUIUSDC".to_string(), "0x1".to_string())]);
		assert!(PoolRegistry::from_overrides(&table, &overrides).is_err());
	}
}
