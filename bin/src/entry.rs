use anyhow::Context;
use tokio::time::{sleep, Duration};

use market_primitives::{display::format_address, Config, U64};
use marketplace::{
	events::{scan_events, scan_range},
	types::{BLOCK_DURATION_SECS, MARKET_WATCH_LOG_TARGET},
	CreateTask, MarketClient, PlaceBid, RegisterResource, Session, Wallet,
};

use crate::{
	command::{CommonOptions, Opt},
	render,
};

pub async fn run(opt: Opt) -> anyhow::Result<()> {
	match opt {
		Opt::Dashboard { options } => {
			let session = open_session(&options).await?;
			render::dashboard(session.tasks(), session.resources());
		},
		Opt::Tasks { options } => {
			let session = open_session(&options).await?;
			render::tasks(session.tasks(), options.json)?;
		},
		Opt::Resources { options } => {
			let session = open_session(&options).await?;
			render::resources(session.resources(), options.json)?;
		},
		Opt::Info { options } => {
			let client = open_client(&options)?;
			render::info(&client).await?;
		},
		Opt::CreateTask { options, description, duration, payment, task_type } => {
			let mut session = open_session(&options).await?;
			let call = CreateTask {
				description,
				duration_hours: duration,
				payment,
				task_type,
			};
			let confirmation = session.create_task(&call).await?;
			render::confirmation("task created", &confirmation);
			render::tasks(session.tasks(), options.json)?;
		},
		Opt::RegisterResource { options, compute_power, base_price, specializations } => {
			let mut session = open_session(&options).await?;
			let call = RegisterResource { compute_power, base_price, specializations };
			let confirmation = session.register_resource(&call).await?;
			render::confirmation("resource registered", &confirmation);
			render::resources(session.resources(), options.json)?;
		},
		Opt::PlaceBid { options, task_id, resource_id, price } => {
			let mut session = open_session(&options).await?;
			let call = PlaceBid { task_id, resource_id, bid_price: price };
			let confirmation = session.place_bid(&call).await?;
			render::confirmation("bid placed", &confirmation);
			render::tasks(session.tasks(), options.json)?;
		},
		Opt::FinalizeTask { options, task_id } => {
			let mut session = open_session(&options).await?;
			let confirmation = session.finalize_task(task_id).await?;
			render::confirmation("task finalized", &confirmation);
			render::tasks(session.tasks(), options.json)?;
		},
		Opt::RateResource { options, task_id, rating } => {
			let mut session = open_session(&options).await?;
			let confirmation = session.rate_resource(task_id, rating).await?;
			render::confirmation("resource rated", &confirmation);
			render::resources(session.resources(), options.json)?;
		},
		Opt::Watch { options, start_number } => {
			let client = open_client(&options)?;
			watch(&client, start_number).await?;
		},
	}
	Ok(())
}

async fn open_session(options: &CommonOptions) -> anyhow::Result<Session<MarketClient>> {
	let config = load_config(options)?;
	let mut session = Session::new();
	session.connect(&config).await.context("fail to connect the marketplace session")?;
	if let Some(account) = session.account() {
		log::info!("session ready, account: {}", format_address(&account));
	}
	Ok(session)
}

fn open_client(options: &CommonOptions) -> anyhow::Result<MarketClient> {
	let config = load_config(options)?;
	let wallet = Wallet::from_config(config.wallet.as_ref())?;
	let client = MarketClient::connect(&config.chain, wallet)?;
	Ok(client)
}

fn load_config(options: &CommonOptions) -> anyhow::Result<Config> {
	let config = Config::load_from_json(&options.config)
		.with_context(|| format!("fail to load config from {:?}", options.config))?;
	Ok(config)
}

// tail new events span by span, sleeping the block duration at the head
async fn watch(client: &MarketClient, start_number: Option<u64>) -> anyhow::Result<()> {
	let mut start: U64 = match start_number {
		Some(number) => number.into(),
		None => client.best_number().await?,
	};

	loop {
		let best = client.best_number().await?;
		if start > best {
			sleep(Duration::from_secs(BLOCK_DURATION_SECS)).await;
			continue
		}

		let (from, to) = scan_range(start, best);
		log::info!(
			target: MARKET_WATCH_LOG_TARGET,
			"scan marketplace log from block [{:}] - [{:}] | best:{:}",
			from,
			to,
			best
		);

		let events = scan_events(client, from, to).await?;
		for event in &events {
			println!("{}", event);
		}

		if to == best {
			sleep(Duration::from_secs(BLOCK_DURATION_SECS)).await;
		}
		start = to + U64::from(1u64);
	}
}
