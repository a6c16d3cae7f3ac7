//! Blockchain capability interfaces.
//!
//! Chain access is provided by the host application; this module defines the
//! capability the expression engine calls into.

mod provider;

pub use provider::ChainFunctionProvider;

#[cfg(test)]
pub use provider::MockChainFunctionProvider;
