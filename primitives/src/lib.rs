pub use web3::types::{Address, H256, U256, U64};

pub use serde::{Deserialize, Serialize};

pub mod amount;
pub mod config;
pub mod display;
pub mod types;

pub use config::{ChainConfig, Config, WalletConfig};
pub use types::{RawResource, RawTask, Resource, Task, TaskStatus};
