//! Chain query capability injected into the runtime evaluator.

use alloy::primitives::Address;

use crate::models::Chain;

/// Historical chain state lookups exposed to expressions as `balance` and
/// `token_balance`.
///
/// Implementations perform the actual network calls; this crate only binds them
/// into evaluation contexts.
#[cfg_attr(test, mockall::automock)]
pub trait ChainFunctionProvider: Send + Sync {
	/// Native balance of `address` on `chain` at `block`
	fn balance(&self, chain: Chain, address: Address, block: u64) -> anyhow::Result<f64>;

	/// Balance of `token` held by `account` on `chain` at `block`
	fn token_balance(
		&self,
		chain: Chain,
		account: Address,
		token: Address,
		block: u64,
	) -> anyhow::Result<f64>;
}
