use async_trait::async_trait;
use web3::{
	api::Eth,
	contract::{
		tokens::{Detokenize, Tokenize},
		Contract, Options as Web3Options,
	},
	transports::Http,
	types::{Address, U256, U64},
	Web3,
};

use market_primitives::{types::checked_u64, ChainConfig, RawResource, RawTask};

use crate::{
	api::MarketplaceApi,
	error::{Error, Result},
	types::*,
	wallet::Wallet,
};

const CONTRACT_ABI: &[u8] = include_bytes!("../contracts/ComputeMarketplace.json");

/// One live connection: transport, bound marketplace contract and wallet.
/// Holds everything a session needs to read and mutate chain state.
#[derive(Clone, Debug)]
pub struct MarketClient {
	web3: Web3<Http>,
	contract: Contract<Http>,
	wallet: Wallet,
}

impl MarketClient {
	pub fn connect(chain: &ChainConfig, wallet: Wallet) -> Result<Self> {
		if !chain.url.starts_with("http") {
			return Err(Error::ClientCreation("Wrong marketplace connection url".to_owned()))
		}
		let transport =
			Http::new(&chain.url).map_err(|e| Error::ClientCreation(e.to_string()))?;
		let web3 = Web3::new(transport);

		let address = trim_address_str(&chain.contract)?;
		let contract = Contract::from_json(web3.eth(), address, CONTRACT_ABI)?;

		Ok(MarketClient { web3, contract, wallet })
	}

	/// The account signing every write call.
	pub fn account(&self) -> Address {
		self.wallet.account()
	}

	pub fn eth(&self) -> Eth<Http> {
		self.web3.eth()
	}

	pub(crate) fn contract(&self) -> &Contract<Http> {
		&self.contract
	}

	pub async fn best_number(&self) -> Result<U64> {
		let maybe_best = self.web3.eth().block_number().await;
		maybe_best.map_err(|e| Error::ChainRead(web3::contract::Error::Api(e)))
	}

	// supplemental contract surface, read only
	pub async fn owner(&self) -> Result<Address> {
		self.read(OWNER_QUERY, ()).await
	}

	pub async fn payment_token(&self) -> Result<Address> {
		self.read(PAYMENT_TOKEN_QUERY, ()).await
	}

	pub async fn bidding_period(&self) -> Result<U256> {
		self.read(BIDDING_PERIOD_QUERY, ()).await
	}

	pub async fn reputation_factor(&self) -> Result<U256> {
		self.read(REPUTATION_FACTOR_QUERY, ()).await
	}

	pub async fn specialization_bonus(&self) -> Result<U256> {
		self.read(SPECIALIZATION_BONUS_QUERY, ()).await
	}

	async fn read<R>(&self, func: &str, params: impl Tokenize + Send) -> Result<R>
	where
		R: Detokenize + Send,
	{
		self.contract
			.query(func, params, None, Web3Options::default(), None)
			.await
			.map_err(Error::ChainRead)
	}

	async fn read_count(&self, func: &'static str) -> Result<u64> {
		let count: U256 = self.read(func, ()).await?;
		checked_u64(count, func).map_err(Error::ChainRead)
	}

	/// Sign, send and await confirmation of one contract call. An error from
	/// the send path means the transaction never entered a block.
	async fn submit(&self, func: &'static str, params: impl Tokenize + Send) -> Result<Confirmation> {
		let mut options = Web3Options::default();
		options.gas = Some(DEFAULT_GAS_LIMIT.into());

		let receipt = self
			.contract
			.signed_call_with_confirmations(
				func,
				params,
				options,
				TRANSACTION_CONFIRMATIONS,
				self.wallet.signer(),
			)
			.await
			.map_err(Error::TransactionRejected)?;

		let confirmation = Confirmation::try_from_receipt(receipt)?;
		log::info!(
			target: MARKET_SUBMIT_LOG_TARGET,
			"{} confirmed, tx: {:?} in block {:?}",
			func,
			confirmation.tx_hash,
			confirmation.block_number,
		);
		Ok(confirmation)
	}
}

#[async_trait]
impl MarketplaceApi for MarketClient {
	async fn task_count(&self) -> Result<u64> {
		self.read_count(TASK_COUNT_QUERY).await
	}

	async fn resource_count(&self) -> Result<u64> {
		self.read_count(RESOURCE_COUNT_QUERY).await
	}

	async fn task(&self, id: u64) -> Result<RawTask> {
		self.read(TASK_QUERY, U256::from(id)).await
	}

	async fn resource(&self, id: u64) -> Result<RawResource> {
		self.read(RESOURCE_QUERY, U256::from(id)).await
	}

	async fn create_task(&self, call: &CreateTask) -> Result<Confirmation> {
		let payment = call.validate()?;
		log::info!(
			target: MARKET_SUBMIT_LOG_TARGET,
			"createTask: {} | {} tokens | type {}",
			call.description,
			call.payment,
			call.task_type,
		);
		self.submit(
			CREATE_TASK_CALL,
			(call.description.clone(), call.duration_hours, payment, call.task_type.clone()),
		)
		.await
	}

	async fn register_resource(&self, call: &RegisterResource) -> Result<Confirmation> {
		let base_price = call.validate()?;
		log::info!(
			target: MARKET_SUBMIT_LOG_TARGET,
			"registerResource: power {} | {} tokens | {:?}",
			call.compute_power,
			call.base_price,
			call.specializations,
		);
		self.submit(
			REGISTER_RESOURCE_CALL,
			(call.compute_power, base_price, call.specializations.clone()),
		)
		.await
	}

	async fn place_bid(&self, call: &PlaceBid) -> Result<Confirmation> {
		let bid_price = call.validate()?;
		log::info!(
			target: MARKET_SUBMIT_LOG_TARGET,
			"placeBid: task {} | resource {} | {} tokens",
			call.task_id,
			call.resource_id,
			call.bid_price,
		);
		self.submit(
			PLACE_BID_CALL,
			(U256::from(call.task_id), U256::from(call.resource_id), bid_price),
		)
		.await
	}

	async fn finalize_task(&self, task_id: u64) -> Result<Confirmation> {
		if task_id == 0 {
			return Err(Error::InvalidInput("task id must be positive".to_owned()))
		}
		self.submit(FINALIZE_TASK_CALL, U256::from(task_id)).await
	}

	async fn rate_resource(&self, task_id: u64, rating: u32) -> Result<Confirmation> {
		if task_id == 0 {
			return Err(Error::InvalidInput("task id must be positive".to_owned()))
		}
		if !(1..=5).contains(&rating) {
			return Err(Error::InvalidInput("rating must be within 1..=5".to_owned()))
		}
		self.submit(RATE_RESOURCE_CALL, (U256::from(task_id), rating)).await
	}
}

fn trim_address_str(addr: &str) -> Result<Address> {
	let addr = addr.strip_prefix("0x").unwrap_or(addr);
	let hex_res = hex::decode(addr).map_err(|e| Error::InvalidAddress(format!("{:}", e)))?;
	// check length
	if hex_res.len() != 20 {
		return Err(Error::InvalidAddress(format!("Address is not equal to 20 bytes: {:}", addr)))
	}
	Ok(Address::from_slice(&hex_res))
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_primitives::WalletConfig;

	fn wallet() -> Wallet {
		let config = WalletConfig {
			keys: vec![
				"0x0000000000000000000000000000000000000000000000000000000000000001"
					.to_owned(),
			],
		};
		Wallet::from_config(Some(&config)).unwrap()
	}

	#[test]
	fn abi_should_embed() {
		assert!(!CONTRACT_ABI.is_empty());
	}

	#[test]
	fn connect_should_reject_non_http_url() {
		let chain = ChainConfig {
			url: "ws://127.0.0.1:8545".to_owned(),
			contract: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_owned(),
		};
		assert!(matches!(
			MarketClient::connect(&chain, wallet()),
			Err(Error::ClientCreation(_))
		));
	}

	#[test]
	fn connect_should_reject_short_contract_address() {
		let chain = ChainConfig {
			url: "http://127.0.0.1:8545".to_owned(),
			contract: "0x1234".to_owned(),
		};
		assert!(matches!(
			MarketClient::connect(&chain, wallet()),
			Err(Error::InvalidAddress(_))
		));
	}

	#[test]
	fn connect_should_bind_the_contract() {
		let chain = ChainConfig {
			url: "http://127.0.0.1:8545".to_owned(),
			contract: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_owned(),
		};
		let client = MarketClient::connect(&chain, wallet()).unwrap();
		assert_eq!(
			client.account(),
			Address::from_slice(&hex::decode("7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap())
		);
	}

	#[test]
	fn address_trimming_accepts_both_prefixes() {
		let plain = trim_address_str("5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
		let prefixed = trim_address_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
		assert_eq!(plain, prefixed);
	}
}
