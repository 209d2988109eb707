use std::str::FromStr;

use secp256k1::SecretKey;
use web3::{
	signing::{Key, SecretKeyRef},
	types::Address,
};

use market_primitives::WalletConfig;

use crate::error::{Error, Result};

/// Session wallet, the counterpart of the browser injected wallet: a set of
/// authorized accounts of which the first one signs every call.
#[derive(Clone, Debug)]
pub struct Wallet {
	keys: Vec<SecretKey>,
	account: Address,
}

impl Wallet {
	pub fn from_config(config: Option<&WalletConfig>) -> Result<Self> {
		let config = config.ok_or(Error::WalletUnavailable)?;
		if config.keys.is_empty() {
			return Err(Error::NoAccounts)
		}

		let mut keys = Vec::with_capacity(config.keys.len());
		for raw in &config.keys {
			let raw = raw.strip_prefix("0x").unwrap_or(raw);
			let key =
				SecretKey::from_str(raw).map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
			keys.push(key);
		}

		let account = SecretKeyRef::new(&keys[0]).address();
		Ok(Wallet { keys, account })
	}

	/// The active account address.
	pub fn account(&self) -> Address {
		self.account
	}

	pub(crate) fn signer(&self) -> SecretKeyRef<'_> {
		SecretKeyRef::new(&self.keys[0])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_wallet_section_is_unavailable() {
		assert!(matches!(Wallet::from_config(None), Err(Error::WalletUnavailable)));
	}

	#[test]
	fn empty_key_list_has_no_accounts() {
		let config = WalletConfig { keys: vec![] };
		assert!(matches!(Wallet::from_config(Some(&config)), Err(Error::NoAccounts)));
	}

	#[test]
	fn malformed_key_is_rejected() {
		let config = WalletConfig { keys: vec!["0xzz".to_owned()] };
		assert!(matches!(Wallet::from_config(Some(&config)), Err(Error::InvalidPrivateKey(_))));
	}

	#[test]
	fn account_is_derived_from_the_first_key() {
		// well known test vector: key 0x..01 owns 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
		let config = WalletConfig {
			keys: vec![
				"0x0000000000000000000000000000000000000000000000000000000000000001"
					.to_owned(),
			],
		};
		let wallet = Wallet::from_config(Some(&config)).unwrap();
		assert_eq!(
			wallet.account(),
			Address::from_str("7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap()
		);
	}
}
