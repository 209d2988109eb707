pub mod api;
pub mod client;
pub mod error;
pub mod events;
pub mod session;
pub mod types;
pub mod wallet;

pub use api::MarketplaceApi;
pub use client::MarketClient;
pub use error::{Error, Result};
pub use events::{MarketEvent, ScannedEvent};
pub use session::{Session, SessionState};
pub use types::{Confirmation, CreateTask, PlaceBid, RegisterResource};
pub use wallet::Wallet;
