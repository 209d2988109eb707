use market_primitives::{
	amount::{format_token_amount, scale_to_base_units},
	display::format_address,
	Resource, Task, TaskStatus, U256,
};
use marketplace::{types::Confirmation, MarketClient};

pub fn tasks(tasks: &[Task], json: bool) -> anyhow::Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(tasks)?);
		return Ok(())
	}

	println!("{} task(s)", tasks.len());
	for task in tasks {
		let provider = match &task.provider {
			Some(provider) => format_address(provider),
			None => "-".to_owned(),
		};
		println!(
			"#{:<4} {:<10} {:<12} {:>5}h {:>14} tokens  client {}  provider {}  {}",
			task.id,
			task.status,
			task.task_type,
			task.duration_hours,
			task.payment,
			format_address(&task.client),
			provider,
			task.description,
		);
	}
	Ok(())
}

pub fn resources(resources: &[Resource], json: bool) -> anyhow::Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(resources)?);
		return Ok(())
	}

	println!("{} resource(s)", resources.len());
	for resource in resources {
		println!(
			"#{:<4} owner {}  power {:>8}  base {:>12} tokens  reputation {:>3} ({} ratings)  {}",
			resource.id,
			format_address(&resource.owner),
			resource.compute_power,
			resource.base_price,
			resource.reputation,
			resource.number_of_ratings,
			if resource.is_available { "available" } else { "busy" },
		);
	}
	Ok(())
}

pub fn dashboard(tasks: &[Task], resources: &[Resource]) {
	let open = count_status(tasks, TaskStatus::Open);
	let in_progress = count_status(tasks, TaskStatus::InProgress);
	let completed = count_status(tasks, TaskStatus::Completed);
	let verified = count_status(tasks, TaskStatus::Verified);

	// volume is summed in base units so display rounding never accumulates
	let mut volume = U256::zero();
	for task in tasks {
		volume = volume
			.saturating_add(scale_to_base_units(&task.payment).unwrap_or_default());
	}

	let total_hours: u64 = tasks.iter().map(|t| u64::from(t.duration_hours)).sum();
	let avg_hours =
		if tasks.is_empty() { 0.0 } else { total_hours as f64 / tasks.len() as f64 };

	println!("tasks: {} total", tasks.len());
	println!(
		"  open {} | in progress {} | completed {} | verified {}",
		open, in_progress, completed, verified
	);
	println!("  payment volume: {} tokens", format_token_amount(volume));
	println!("  avg duration: {:.1} hours", avg_hours);

	let available = resources.iter().filter(|r| r.is_available).count();
	println!("resources: {} total, {} available", resources.len(), available);
}

fn count_status(tasks: &[Task], status: TaskStatus) -> usize {
	tasks.iter().filter(|t| t.status == status).count()
}

pub fn confirmation(label: &str, confirmation: &Confirmation) {
	match confirmation.block_number {
		Some(number) => {
			println!("{}, tx: {:?} in block {}", label, confirmation.tx_hash, number)
		},
		None => println!("{}, tx: {:?}", label, confirmation.tx_hash),
	}
}

pub async fn info(client: &MarketClient) -> anyhow::Result<()> {
	let owner = client.owner().await?;
	let payment_token = client.payment_token().await?;
	let bidding_period = client.bidding_period().await?;
	let reputation_factor = client.reputation_factor().await?;
	let specialization_bonus = client.specialization_bonus().await?;

	println!("contract owner:       {}", format_address(&owner));
	println!("payment token:        {}", format_address(&payment_token));
	println!("bidding period:       {} secs", bidding_period);
	println!("reputation factor:    {}", reputation_factor);
	println!("specialization bonus: {}", specialization_bonus);
	Ok(())
}
