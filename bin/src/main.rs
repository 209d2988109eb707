use structopt::StructOpt;

mod command;
mod entry;
mod render;

use command::Opt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let opt = Opt::from_args();
	entry::run(opt).await
}
