use async_trait::async_trait;

use market_primitives::{RawResource, RawTask};

use crate::{
	error::Result,
	types::{Confirmation, CreateTask, PlaceBid, RegisterResource},
};

/// The fixed operation set of the marketplace contract, as the session
/// consumes it. Implemented by [`crate::MarketClient`] for the real chain and
/// by an in-memory double in the session tests.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
	async fn task_count(&self) -> Result<u64>;
	async fn resource_count(&self) -> Result<u64>;

	/// Read one task tuple. Callers derive `id` from [`Self::task_count`],
	/// out of range ids are never issued.
	async fn task(&self, id: u64) -> Result<RawTask>;
	async fn resource(&self, id: u64) -> Result<RawResource>;

	async fn create_task(&self, call: &CreateTask) -> Result<Confirmation>;
	async fn register_resource(&self, call: &RegisterResource) -> Result<Confirmation>;
	async fn place_bid(&self, call: &PlaceBid) -> Result<Confirmation>;
	async fn finalize_task(&self, task_id: u64) -> Result<Confirmation>;
	async fn rate_resource(&self, task_id: u64, rating: u32) -> Result<Confirmation>;
}
