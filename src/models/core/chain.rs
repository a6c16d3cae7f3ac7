use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Chains a query can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
	Ethereum,
	Arbitrum,
	Optimism,
	Polygon,
}

impl Chain {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ethereum => "ethereum",
			Self::Arbitrum => "arbitrum",
			Self::Optimism => "optimism",
			Self::Polygon => "polygon",
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Chain {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"ethereum" => Ok(Self::Ethereum),
			"arbitrum" => Ok(Self::Arbitrum),
			"optimism" => Ok(Self::Optimism),
			"polygon" => Ok(Self::Polygon),
			other => Err(format!("unsupported chain `{}`", other)),
		}
	}
}
