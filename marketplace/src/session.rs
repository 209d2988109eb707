use futures::{stream, StreamExt, TryStreamExt};
use web3::types::Address;

use market_primitives::{Config, RawResource, RawTask, Resource, Task};

use crate::{
	api::MarketplaceApi,
	client::MarketClient,
	error::{Error, Result},
	types::{Confirmation, CreateTask, PlaceBid, RegisterResource, MARKET_LOAD_LOG_TARGET},
	wallet::Wallet,
};

/// Per-id reads in flight during one collection reload.
pub const LOAD_CONCURRENCY: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
	Uninitialized,
	Connecting,
	Ready,
	Failed,
}

/// Owned session binding one api handle to the two mirrored collections.
/// The collections are snapshots of chain state: they go stale the moment
/// another actor mutates the contract and are refreshed only by explicit
/// reload, unconditionally after every confirmed write of our own.
pub struct Session<C> {
	api: Option<C>,
	account: Option<Address>,
	state: SessionState,
	tasks: Vec<Task>,
	resources: Vec<Resource>,
}

impl<C> Default for Session<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C> Session<C> {
	pub fn new() -> Self {
		Session {
			api: None,
			account: None,
			state: SessionState::Uninitialized,
			tasks: Vec::new(),
			resources: Vec::new(),
		}
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn account(&self) -> Option<Address> {
		self.account
	}

	pub fn tasks(&self) -> &[Task] {
		&self.tasks
	}

	pub fn resources(&self) -> &[Resource] {
		&self.resources
	}

	/// Drop the binding and all mirrored state.
	pub fn close(&mut self) {
		self.api = None;
		self.account = None;
		self.state = SessionState::Uninitialized;
		self.tasks.clear();
		self.resources.clear();
	}
}

impl<C: MarketplaceApi> Session<C> {
	/// Bind an already connected api handle and mark the session ready.
	pub fn attach(&mut self, api: C, account: Address) {
		self.api = Some(api);
		self.account = Some(account);
		self.state = SessionState::Ready;
	}

	fn connected(&self) -> Result<&C> {
		match self.state {
			SessionState::Ready => self.api.as_ref().ok_or(Error::NotConnected),
			_ => Err(Error::NotConnected),
		}
	}

	/// Re-mirror the task collection: read the count, fetch `1..=count` and
	/// publish the whole snapshot in one assignment. A failure leaves the
	/// previous snapshot in place.
	pub async fn load_tasks(&mut self) -> Result<usize> {
		let api = self.connected()?;
		let count = api.task_count().await?;
		let raw: Vec<RawTask> = stream::iter((1..=count).map(|id| api.task(id)))
			.buffered(LOAD_CONCURRENCY)
			.try_collect()
			.await?;

		let tasks: Vec<Task> = raw
			.into_iter()
			.zip(1u64..)
			.map(|(raw, id)| Task::from_raw(raw, id))
			.collect();
		log::info!(target: MARKET_LOAD_LOG_TARGET, "loaded {} tasks", tasks.len());
		self.tasks = tasks;
		Ok(self.tasks.len())
	}

	pub async fn load_resources(&mut self) -> Result<usize> {
		let api = self.connected()?;
		let count = api.resource_count().await?;
		let raw: Vec<RawResource> = stream::iter((1..=count).map(|id| api.resource(id)))
			.buffered(LOAD_CONCURRENCY)
			.try_collect()
			.await?;

		let resources: Vec<Resource> = raw
			.into_iter()
			.zip(1u64..)
			.map(|(raw, id)| Resource::from_raw(raw, id))
			.collect();
		log::info!(target: MARKET_LOAD_LOG_TARGET, "loaded {} resources", resources.len());
		self.resources = resources;
		Ok(self.resources.len())
	}

	pub async fn reload(&mut self) -> Result<()> {
		self.load_tasks().await?;
		self.load_resources().await?;
		Ok(())
	}

	pub async fn create_task(&mut self, call: &CreateTask) -> Result<Confirmation> {
		let confirmation = self.connected()?.create_task(call).await?;
		// reload only follows a confirmed write
		self.load_tasks().await?;
		Ok(confirmation)
	}

	pub async fn register_resource(&mut self, call: &RegisterResource) -> Result<Confirmation> {
		let confirmation = self.connected()?.register_resource(call).await?;
		self.load_resources().await?;
		Ok(confirmation)
	}

	pub async fn place_bid(&mut self, call: &PlaceBid) -> Result<Confirmation> {
		let confirmation = self.connected()?.place_bid(call).await?;
		self.load_tasks().await?;
		Ok(confirmation)
	}

	pub async fn finalize_task(&mut self, task_id: u64) -> Result<Confirmation> {
		let confirmation = self.connected()?.finalize_task(task_id).await?;
		// assignment also flips the winning resource's availability
		self.load_tasks().await?;
		self.load_resources().await?;
		Ok(confirmation)
	}

	pub async fn rate_resource(&mut self, task_id: u64, rating: u32) -> Result<Confirmation> {
		let confirmation = self.connected()?.rate_resource(task_id, rating).await?;
		self.load_resources().await?;
		Ok(confirmation)
	}
}

impl Session<MarketClient> {
	/// Connect against the configured chain and mirror both collections.
	/// A connectivity failure leaves the session failed with empty
	/// collections; a failure during the initial mirror leaves it ready with
	/// whatever loaded.
	pub async fn connect(&mut self, config: &Config) -> Result<()> {
		self.state = SessionState::Connecting;

		let wallet = match Wallet::from_config(config.wallet.as_ref()) {
			Ok(wallet) => wallet,
			Err(e) => {
				self.state = SessionState::Failed;
				return Err(e)
			},
		};
		let client = match MarketClient::connect(&config.chain, wallet) {
			Ok(client) => client,
			Err(e) => {
				self.state = SessionState::Failed;
				return Err(e)
			},
		};

		let account = client.account();
		self.attach(client, account);
		self.reload().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	use async_trait::async_trait;
	use web3::types::{H256, U256};

	use market_primitives::{ChainConfig, TaskStatus};

	#[derive(Default)]
	struct FakeState {
		tasks: Vec<RawTask>,
		resources: Vec<RawResource>,
		count_reads: usize,
		item_reads: usize,
		reject_writes: bool,
	}

	#[derive(Default)]
	struct FakeMarket {
		state: Mutex<FakeState>,
	}

	impl FakeMarket {
		fn with_tasks(count: u64) -> Self {
			let fake = FakeMarket::default();
			{
				let mut state = fake.state.lock().unwrap();
				for id in 1..=count {
					state.tasks.push(raw_task(id));
				}
			}
			fake
		}

		fn confirmation() -> Confirmation {
			Confirmation { tx_hash: H256::zero(), block_number: None, gas_used: None }
		}

		fn write(&self) -> Result<Confirmation> {
			if self.state.lock().unwrap().reject_writes {
				return Err(Error::TransactionRejected(web3::Error::Unreachable))
			}
			Ok(Self::confirmation())
		}
	}

	fn raw_task(id: u64) -> RawTask {
		RawTask {
			task_id: id,
			client: Address::zero(),
			description: format!("task {}", id),
			duration: 4,
			payment_amount: U256::exp10(18),
			status: 0,
			provider: Address::zero(),
			task_start_time: 0,
			result_hash: String::new(),
			allocated_resource_id: 0,
			final_price: U256::zero(),
			task_type: "AI".to_owned(),
			is_allocated: false,
		}
	}

	fn raw_resource(id: u64) -> RawResource {
		RawResource {
			owner: Address::zero(),
			compute_power: id * 100,
			base_price: U256::exp10(18),
			is_available: true,
			reputation: 50,
			total_rating_score: 0,
			number_of_ratings: 0,
		}
	}

	#[async_trait]
	impl MarketplaceApi for FakeMarket {
		async fn task_count(&self) -> Result<u64> {
			let mut state = self.state.lock().unwrap();
			state.count_reads += 1;
			Ok(state.tasks.len() as u64)
		}

		async fn resource_count(&self) -> Result<u64> {
			let mut state = self.state.lock().unwrap();
			state.count_reads += 1;
			Ok(state.resources.len() as u64)
		}

		async fn task(&self, id: u64) -> Result<RawTask> {
			let mut state = self.state.lock().unwrap();
			state.item_reads += 1;
			Ok(state.tasks[(id - 1) as usize].clone())
		}

		async fn resource(&self, id: u64) -> Result<RawResource> {
			let mut state = self.state.lock().unwrap();
			state.item_reads += 1;
			Ok(state.resources[(id - 1) as usize].clone())
		}

		async fn create_task(&self, call: &CreateTask) -> Result<Confirmation> {
			let confirmation = self.write()?;
			let mut state = self.state.lock().unwrap();
			let id = state.tasks.len() as u64 + 1;
			let mut raw = raw_task(id);
			raw.description = call.description.clone();
			state.tasks.push(raw);
			Ok(confirmation)
		}

		async fn register_resource(&self, _call: &RegisterResource) -> Result<Confirmation> {
			let confirmation = self.write()?;
			let mut state = self.state.lock().unwrap();
			let id = state.resources.len() as u64 + 1;
			let raw = raw_resource(id);
			state.resources.push(raw);
			Ok(confirmation)
		}

		async fn place_bid(&self, call: &PlaceBid) -> Result<Confirmation> {
			call.validate()?;
			self.write()
		}

		async fn finalize_task(&self, _task_id: u64) -> Result<Confirmation> {
			self.write()
		}

		async fn rate_resource(&self, _task_id: u64, _rating: u32) -> Result<Confirmation> {
			self.write()
		}
	}

	fn ready_session(fake: FakeMarket) -> Session<FakeMarket> {
		let mut session = Session::new();
		session.attach(fake, Address::zero());
		session
	}

	#[tokio::test]
	async fn load_yields_dense_ascending_ids() {
		let mut session = ready_session(FakeMarket::with_tasks(25));
		let loaded = session.load_tasks().await.unwrap();
		assert_eq!(loaded, 25);
		let ids: Vec<u64> = session.tasks().iter().map(|t| t.id).collect();
		assert_eq!(ids, (1..=25).collect::<Vec<u64>>());
	}

	#[tokio::test]
	async fn empty_market_issues_no_item_reads() {
		let mut session = ready_session(FakeMarket::default());
		session.load_tasks().await.unwrap();
		assert!(session.tasks().is_empty());
		assert_eq!(session.api.as_ref().unwrap().state.lock().unwrap().item_reads, 0);
	}

	#[tokio::test]
	async fn operations_require_a_ready_session() {
		let mut session: Session<FakeMarket> = Session::new();
		assert!(matches!(session.load_tasks().await, Err(Error::NotConnected)));
		assert_eq!(session.state(), SessionState::Uninitialized);
	}

	#[tokio::test]
	async fn create_task_reloads_tasks_once() {
		let mut session = ready_session(FakeMarket::with_tasks(2));
		session.load_tasks().await.unwrap();
		let counts_before = session.api.as_ref().unwrap().state.lock().unwrap().count_reads;

		let call = CreateTask {
			description: "verify proofs".to_owned(),
			duration_hours: 2,
			payment: "1".to_owned(),
			task_type: "Crypto".to_owned(),
		};
		session.create_task(&call).await.unwrap();

		let counts_after = session.api.as_ref().unwrap().state.lock().unwrap().count_reads;
		assert_eq!(counts_after - counts_before, 1);
		assert_eq!(session.tasks().len(), 3);
		let created = session.tasks().last().unwrap();
		assert_eq!(created.status, TaskStatus::Open);
		assert_eq!(created.description, "verify proofs");
	}

	#[tokio::test]
	async fn rejected_create_keeps_the_snapshot() {
		let mut session = ready_session(FakeMarket::with_tasks(2));
		session.load_tasks().await.unwrap();
		session.api.as_ref().unwrap().state.lock().unwrap().reject_writes = true;
		let reads_before = session.api.as_ref().unwrap().state.lock().unwrap().count_reads;

		let call = CreateTask {
			description: "never lands".to_owned(),
			duration_hours: 1,
			payment: "1".to_owned(),
			task_type: "AI".to_owned(),
		};
		let res = session.create_task(&call).await;
		assert!(matches!(res, Err(Error::TransactionRejected(_))));

		// no reload happened, the old snapshot is still displayed
		let reads_after = session.api.as_ref().unwrap().state.lock().unwrap().count_reads;
		assert_eq!(reads_after, reads_before);
		assert_eq!(session.tasks().len(), 2);
	}

	#[tokio::test]
	async fn bids_clear_the_client_without_price_rules() {
		let mut session = ready_session(FakeMarket::with_tasks(1));
		// both below and above any base price look the same from here
		for price in ["0.5", "500"] {
			let call = PlaceBid {
				task_id: 1,
				resource_id: 1,
				bid_price: price.to_owned(),
			};
			assert!(session.place_bid(&call).await.is_ok());
		}
	}

	#[tokio::test]
	async fn register_resource_reloads_resources() {
		let mut session = ready_session(FakeMarket::default());
		let call = RegisterResource {
			compute_power: 256,
			base_price: "0.1".to_owned(),
			specializations: vec!["AI".to_owned()],
		};
		session.register_resource(&call).await.unwrap();
		assert_eq!(session.resources().len(), 1);
		assert_eq!(session.resources()[0].id, 1);
	}

	#[tokio::test]
	async fn close_resets_the_session() {
		let mut session = ready_session(FakeMarket::with_tasks(3));
		session.load_tasks().await.unwrap();
		session.close();
		assert_eq!(session.state(), SessionState::Uninitialized);
		assert!(session.tasks().is_empty());
		assert!(matches!(session.load_tasks().await, Err(Error::NotConnected)));
	}

	#[tokio::test]
	async fn connect_without_wallet_fails_the_session() {
		let config = Config {
			chain: ChainConfig {
				url: "http://127.0.0.1:8545".to_owned(),
				contract: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_owned(),
			},
			wallet: None,
		};
		let mut session = Session::new();
		let res = session.connect(&config).await;
		assert!(matches!(res, Err(Error::WalletUnavailable)));
		assert_eq!(session.state(), SessionState::Failed);
		assert!(session.tasks().is_empty());
		assert!(session.resources().is_empty());
	}

	#[tokio::test]
	async fn connect_with_bad_url_fails_the_session() {
		let config = Config {
			chain: ChainConfig {
				url: "ftp://127.0.0.1:8545".to_owned(),
				contract: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_owned(),
			},
			wallet: Some(market_primitives::WalletConfig {
				keys: vec![
					"0x0000000000000000000000000000000000000000000000000000000000000001"
						.to_owned(),
				],
			}),
		};
		let mut session = Session::new();
		let res = session.connect(&config).await;
		assert!(matches!(res, Err(Error::ClientCreation(_))));
		assert_eq!(session.state(), SessionState::Failed);
	}
}
