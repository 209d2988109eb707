use market_primitives::amount;
use web3::types::{TransactionReceipt, H256, U256, U64};

use crate::error::{Error, Result};

/// Confirmations awaited before a write call is treated as settled.
pub const TRANSACTION_CONFIRMATIONS: usize = 1;
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Blocks covered by one event scan round.
pub const SCAN_SPAN: u64 = 10;
pub const BLOCK_DURATION_SECS: u64 = 12;

pub const MARKET_LOAD_LOG_TARGET: &str = "MarketLoad";
pub const MARKET_SUBMIT_LOG_TARGET: &str = "MarketSubmit";
pub const MARKET_WATCH_LOG_TARGET: &str = "MarketWatch";

// contract read accessors
pub const TASK_COUNT_QUERY: &str = "taskCount";
pub const RESOURCE_COUNT_QUERY: &str = "resourceCount";
pub const TASK_QUERY: &str = "tasks";
pub const RESOURCE_QUERY: &str = "resources";
pub const OWNER_QUERY: &str = "owner";
pub const PAYMENT_TOKEN_QUERY: &str = "paymentToken";
pub const BIDDING_PERIOD_QUERY: &str = "BIDDING_PERIOD";
pub const REPUTATION_FACTOR_QUERY: &str = "REPUTATION_FACTOR";
pub const SPECIALIZATION_BONUS_QUERY: &str = "SPECIALIZATION_BONUS";

// contract calls the client submits
pub const CREATE_TASK_CALL: &str = "createTask";
pub const REGISTER_RESOURCE_CALL: &str = "registerResource";
pub const PLACE_BID_CALL: &str = "placeBid";
pub const FINALIZE_TASK_CALL: &str = "finalizeTask";
pub const RATE_RESOURCE_CALL: &str = "rateResource";

/// Settled outcome of a write call.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirmation {
	pub tx_hash: H256,
	pub block_number: Option<U64>,
	pub gas_used: Option<U256>,
}

impl Confirmation {
	/// A mined receipt with zero status is a contract side revert.
	pub fn try_from_receipt(receipt: TransactionReceipt) -> Result<Self> {
		if receipt.status == Some(0.into()) {
			return Err(Error::TransactionReverted(receipt.transaction_hash))
		}
		Ok(Confirmation {
			tx_hash: receipt.transaction_hash,
			block_number: receipt.block_number,
			gas_used: receipt.gas_used,
		})
	}
}

/// `createTask(string,uint32,uint256,string)` input, amounts in human units.
#[derive(Clone, Debug)]
pub struct CreateTask {
	pub description: String,
	pub duration_hours: u32,
	pub payment: String,
	pub task_type: String,
}

impl CreateTask {
	/// Check the call preconditions and scale the payment to base units.
	pub fn validate(&self) -> Result<U256> {
		if self.description.trim().is_empty() {
			return Err(Error::InvalidInput("task description must not be empty".to_owned()))
		}
		if self.duration_hours == 0 {
			return Err(Error::InvalidInput("task duration must be positive".to_owned()))
		}
		if self.task_type.trim().is_empty() {
			return Err(Error::InvalidInput("task type must not be empty".to_owned()))
		}
		let payment = amount::scale_to_base_units(&self.payment)?;
		if payment.is_zero() {
			return Err(Error::InvalidInput("task payment must be positive".to_owned()))
		}
		Ok(payment)
	}
}

/// `registerResource(uint64,uint256,string[])` input.
#[derive(Clone, Debug)]
pub struct RegisterResource {
	pub compute_power: u64,
	pub base_price: String,
	pub specializations: Vec<String>,
}

impl RegisterResource {
	pub fn validate(&self) -> Result<U256> {
		if self.compute_power == 0 {
			return Err(Error::InvalidInput("compute power must be positive".to_owned()))
		}
		if self.specializations.is_empty() {
			return Err(Error::InvalidInput("at least one specialization is required".to_owned()))
		}
		if self.specializations.iter().any(|s| s.trim().is_empty()) {
			return Err(Error::InvalidInput("specializations must not be empty".to_owned()))
		}
		let base_price = amount::scale_to_base_units(&self.base_price)?;
		if base_price.is_zero() {
			return Err(Error::InvalidInput("base price must be positive".to_owned()))
		}
		Ok(base_price)
	}
}

/// `placeBid(uint256,uint256,uint256)` input. The client imposes no rule on
/// how the bid relates to the resource base price, that check is on chain.
#[derive(Clone, Debug)]
pub struct PlaceBid {
	pub task_id: u64,
	pub resource_id: u64,
	pub bid_price: String,
}

impl PlaceBid {
	pub fn validate(&self) -> Result<U256> {
		if self.task_id == 0 {
			return Err(Error::InvalidInput("task id must be positive".to_owned()))
		}
		if self.resource_id == 0 {
			return Err(Error::InvalidInput("resource id must be positive".to_owned()))
		}
		let bid_price = amount::scale_to_base_units(&self.bid_price)?;
		if bid_price.is_zero() {
			return Err(Error::InvalidInput("bid price must be positive".to_owned()))
		}
		Ok(bid_price)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_task() -> CreateTask {
		CreateTask {
			description: "render frames".to_owned(),
			duration_hours: 12,
			payment: "2.5".to_owned(),
			task_type: "Graphics".to_owned(),
		}
	}

	#[test]
	fn create_task_scales_payment() {
		assert_eq!(create_task().validate().unwrap(), U256::exp10(17) * U256::from(25));
	}

	#[test]
	fn create_task_rejects_bad_input() {
		let mut call = create_task();
		call.description = "  ".to_owned();
		assert!(matches!(call.validate(), Err(Error::InvalidInput(_))));

		let mut call = create_task();
		call.duration_hours = 0;
		assert!(matches!(call.validate(), Err(Error::InvalidInput(_))));

		let mut call = create_task();
		call.payment = "0".to_owned();
		assert!(matches!(call.validate(), Err(Error::InvalidInput(_))));

		let mut call = create_task();
		call.payment = "1.2.3".to_owned();
		assert!(matches!(call.validate(), Err(Error::Amount(_))));
	}

	#[test]
	fn register_resource_rejects_empty_specializations() {
		let call = RegisterResource {
			compute_power: 128,
			base_price: "1".to_owned(),
			specializations: vec![],
		};
		assert!(matches!(call.validate(), Err(Error::InvalidInput(_))));

		let call = RegisterResource {
			compute_power: 128,
			base_price: "1".to_owned(),
			specializations: vec!["AI".to_owned(), " ".to_owned()],
		};
		assert!(matches!(call.validate(), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn place_bid_accepts_any_positive_price() {
		// no client side comparison against the resource base price
		for price in ["0.000000000000000001", "1", "1000000"] {
			let call = PlaceBid {
				task_id: 1,
				resource_id: 1,
				bid_price: price.to_owned(),
			};
			assert!(call.validate().is_ok());
		}
	}

	#[test]
	fn reverted_receipt_is_an_error() {
		let receipt = TransactionReceipt {
			status: Some(0.into()),
			..Default::default()
		};
		assert!(matches!(
			Confirmation::try_from_receipt(receipt),
			Err(Error::TransactionReverted(_))
		));

		let receipt = TransactionReceipt {
			status: Some(1.into()),
			..Default::default()
		};
		assert!(Confirmation::try_from_receipt(receipt).is_ok());
	}
}
