use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct Config {
	pub chain: ChainConfig,
	// absent section means no wallet is injected for this session
	#[serde(default)]
	pub wallet: Option<WalletConfig>,
}

#[derive(Eq, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct ChainConfig {
	pub url: String,
	// address of the deployed marketplace contract
	pub contract: String,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct WalletConfig {
	// hex encoded secp256k1 private keys, the first entry is the active account
	pub keys: Vec<String>,
}

impl Config {
	pub fn load_from_json(config_path: &Path) -> Result<Self> {
		let file = File::open(config_path)?;
		let res = serde_json::from_reader(file)?;
		Ok(res)
	}
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("Open Config File Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Json Parse to Config Error: {0}")]
	JsonParseError(#[from] serde_json::Error),
	#[error("Other Error: {0}")]
	OtherError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	#[test]
	fn config_parse_should_work() {
		let path = PathBuf::from("./res/config-example.json");
		let config = Config::load_from_json(&path).unwrap();
		let expect = Config {
			chain: ChainConfig {
				url: "http://127.0.0.1:8545".to_string(),
				contract: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
			},
			wallet: Some(WalletConfig {
				keys: vec![
					"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
						.to_string(),
				],
			}),
		};

		assert_eq!(config, expect);
	}

	#[test]
	fn wallet_section_is_optional() {
		let config: Config = serde_json::from_str(
			r#"{ "chain": { "url": "http://127.0.0.1:8545", "contract": "0x00" } }"#,
		)
		.unwrap();
		assert_eq!(config.wallet, None);
	}
}
