use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "marketplace", about = "Compute marketplace contract client")]
pub enum Opt {
	///Show aggregate marketplace stats
	Dashboard {
		#[structopt(flatten)]
		options: CommonOptions,
	},

	///List every task in ascending id order
	Tasks {
		#[structopt(flatten)]
		options: CommonOptions,
	},

	///List every registered compute resource
	Resources {
		#[structopt(flatten)]
		options: CommonOptions,
	},

	///Show contract ownership and pricing constants
	Info {
		#[structopt(flatten)]
		options: CommonOptions,
	},

	///Create a task and await confirmation
	CreateTask {
		#[structopt(flatten)]
		options: CommonOptions,

		///What the task does
		#[structopt(long)]
		description: String,

		///Expected duration in hours
		#[structopt(long)]
		duration: u32,

		///Payment in tokens, e.g. "2.5"
		#[structopt(long)]
		payment: String,

		///Task category, e.g. "AI"
		#[structopt(long)]
		task_type: String,
	},

	///Register a compute resource
	RegisterResource {
		#[structopt(flatten)]
		options: CommonOptions,

		///Offered compute power
		#[structopt(long)]
		compute_power: u64,

		///Base price in tokens
		#[structopt(long)]
		base_price: String,

		///Comma separated specializations
		#[structopt(long, use_delimiter = true)]
		specializations: Vec<String>,
	},

	///Bid a resource on an open task
	PlaceBid {
		#[structopt(flatten)]
		options: CommonOptions,

		#[structopt(long)]
		task_id: u64,

		#[structopt(long)]
		resource_id: u64,

		///Bid price in tokens
		#[structopt(long)]
		price: String,
	},

	///Close the bidding round of a task
	FinalizeTask {
		#[structopt(flatten)]
		options: CommonOptions,

		#[structopt(long)]
		task_id: u64,
	},

	///Rate the resource that served a completed task
	RateResource {
		#[structopt(flatten)]
		options: CommonOptions,

		#[structopt(long)]
		task_id: u64,

		///Rating from 1 to 5
		#[structopt(long)]
		rating: u32,
	},

	///Tail marketplace events from the chain head
	Watch {
		#[structopt(flatten)]
		options: CommonOptions,

		///The block number to start scanning from, defaults to the head
		#[structopt(short, long)]
		start_number: Option<u64>,
	},
}

#[derive(Debug, Clone, StructOpt)]
pub struct CommonOptions {
	///The client config file path
	#[structopt(long, parse(from_os_str))]
	pub config: PathBuf,

	///Print listings as json instead of tables
	#[structopt(long)]
	pub json: bool,
}
