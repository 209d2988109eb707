use web3::types::H256;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("No wallet configured, cannot bind the marketplace contract")]
	WalletUnavailable,

	#[error("Wallet holds no authorized accounts")]
	NoAccounts,

	#[error("Invalid wallet private key: {0}")]
	InvalidPrivateKey(String),

	#[error("Marketplace connection Error: {0}")]
	ClientCreation(String),

	#[error("Invalid Ethereum Address: {0}")]
	InvalidAddress(String),

	#[error("Chain read Error, err: {0}")]
	ChainRead(#[from] web3::contract::Error),

	#[error("Ethereum Abi Error, err: {0}")]
	EthAbi(#[from] web3::ethabi::Error),

	#[error("Transaction rejected before inclusion, err: {0}")]
	TransactionRejected(#[source] web3::Error),

	#[error("Transaction reverted on chain, tx: {0:?}")]
	TransactionReverted(H256),

	#[error("Invalid call input: {0}")]
	InvalidInput(String),

	#[error("Invalid token amount, err: {0}")]
	Amount(#[from] market_primitives::amount::Error),

	#[error("Session is not connected")]
	NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;
