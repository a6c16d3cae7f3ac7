//! Mock implementation of the chain function provider.
//!
//! Lets tests assert which chain and block `balance` and `token_balance` were
//! bound to without any network access.

use alloy::primitives::Address;
use chainquery::{models::Chain, services::blockchain::ChainFunctionProvider};
use mockall::mock;

mock! {
	/// Mock implementation of the chain function provider.
	pub ChainProvider {}

	impl ChainFunctionProvider for ChainProvider {
		fn balance(&self, chain: Chain, address: Address, block: u64) -> anyhow::Result<f64>;

		fn token_balance(
			&self,
			chain: Chain,
			account: Address,
			token: Address,
			block: u64,
		) -> anyhow::Result<f64>;
	}
}
