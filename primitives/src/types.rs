use std::fmt;

use serde::Serialize;
use web3::{
	contract::{tokens::Detokenize, Error as Web3ContractErr},
	ethabi::Token,
	types::{Address, U256},
};

use crate::amount;

/// Contract side task lifecycle. Transitions are owned entirely by the
/// contract, the client only displays the last fetched value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TaskStatus {
	Open,
	InProgress,
	Completed,
	Verified,
	Unknown,
}

impl TaskStatus {
	/// Contract enum layout: 0 Open, 1 InProgress, 2 Completed, 3 Verified.
	/// Anything else renders as Unknown instead of failing.
	pub fn from_raw(raw: u8) -> Self {
		match raw {
			0 => TaskStatus::Open,
			1 => TaskStatus::InProgress,
			2 => TaskStatus::Completed,
			3 => TaskStatus::Verified,
			_ => TaskStatus::Unknown,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TaskStatus::Open => "Open",
			TaskStatus::InProgress => "InProgress",
			TaskStatus::Completed => "Completed",
			TaskStatus::Verified => "Verified",
			TaskStatus::Unknown => "Unknown",
		}
	}
}

impl fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// `tasks(uint256)` return tuple, field order and typing enforced once here.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTask {
	pub task_id: u64,
	pub client: Address,
	pub description: String,
	pub duration: u32,
	pub payment_amount: U256,
	pub status: u8,
	pub provider: Address,
	pub task_start_time: u32,
	pub result_hash: String,
	pub allocated_resource_id: u64,
	pub final_price: U256,
	pub task_type: String,
	pub is_allocated: bool,
}

impl Detokenize for RawTask {
	fn from_tokens(tokens: Vec<Token>) -> Result<Self, Web3ContractErr> {
		if tokens.len() != 13 {
			return Err(Web3ContractErr::InvalidOutputType(format!(
				"task tuple holds {} fields, expected 13",
				tokens.len()
			)))
		}
		let mut fields = tokens.into_iter();
		Ok(RawTask {
			task_id: next_u64(&mut fields, "taskId")?,
			client: next_address(&mut fields, "client")?,
			description: next_string(&mut fields, "description")?,
			duration: next_u32(&mut fields, "duration")?,
			payment_amount: next_uint(&mut fields, "paymentAmount")?,
			status: next_u8(&mut fields, "status")?,
			provider: next_address(&mut fields, "provider")?,
			task_start_time: next_u32(&mut fields, "taskStartTime")?,
			result_hash: next_string(&mut fields, "resultHash")?,
			allocated_resource_id: next_u64(&mut fields, "allocatedResourceId")?,
			final_price: next_uint(&mut fields, "finalPrice")?,
			task_type: next_string(&mut fields, "taskType")?,
			is_allocated: next_bool(&mut fields, "isAllocated")?,
		})
	}
}

/// `resources(uint256)` return tuple.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResource {
	pub owner: Address,
	pub compute_power: u64,
	pub base_price: U256,
	pub is_available: bool,
	pub reputation: u32,
	pub total_rating_score: u32,
	pub number_of_ratings: u32,
}

impl Detokenize for RawResource {
	fn from_tokens(tokens: Vec<Token>) -> Result<Self, Web3ContractErr> {
		if tokens.len() != 7 {
			return Err(Web3ContractErr::InvalidOutputType(format!(
				"resource tuple holds {} fields, expected 7",
				tokens.len()
			)))
		}
		let mut fields = tokens.into_iter();
		Ok(RawResource {
			owner: next_address(&mut fields, "owner")?,
			compute_power: next_u64(&mut fields, "computePower")?,
			base_price: next_uint(&mut fields, "basePrice")?,
			is_available: next_bool(&mut fields, "isAvailable")?,
			reputation: next_u32(&mut fields, "reputation")?,
			total_rating_score: next_u32(&mut fields, "totalRatingScore")?,
			number_of_ratings: next_u32(&mut fields, "numberOfRatings")?,
		})
	}
}

/// Display record for one task. The id is the 1-based fetch index, never the
/// tuple's own id field, so list order stays dense.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Task {
	pub id: u64,
	pub description: String,
	pub client: Address,
	pub duration_hours: u32,
	pub payment: String,
	pub status: TaskStatus,
	pub provider: Option<Address>,
	pub result_hash: String,
	pub allocated_resource_id: u64,
	pub final_price: String,
	pub task_type: String,
}

impl Task {
	pub fn from_raw(raw: RawTask, id: u64) -> Self {
		Task {
			id,
			description: raw.description,
			client: raw.client,
			duration_hours: raw.duration,
			payment: amount::format_token_amount(raw.payment_amount),
			status: TaskStatus::from_raw(raw.status),
			// the contract leaves the provider zeroed until assignment
			provider: if raw.provider.is_zero() { None } else { Some(raw.provider) },
			result_hash: raw.result_hash,
			allocated_resource_id: raw.allocated_resource_id,
			final_price: amount::format_token_amount(raw.final_price),
			task_type: raw.task_type,
		}
	}
}

/// Display record for one compute resource. Reputation comes from the chain
/// as is and is never recomputed locally.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resource {
	pub id: u64,
	pub owner: Address,
	pub compute_power: u64,
	pub base_price: String,
	pub is_available: bool,
	pub reputation: u32,
	pub total_rating_score: u32,
	pub number_of_ratings: u32,
}

impl Resource {
	pub fn from_raw(raw: RawResource, id: u64) -> Self {
		Resource {
			id,
			owner: raw.owner,
			compute_power: raw.compute_power,
			base_price: amount::format_token_amount(raw.base_price),
			is_available: raw.is_available,
			reputation: raw.reputation,
			total_rating_score: raw.total_rating_score,
			number_of_ratings: raw.number_of_ratings,
		}
	}
}

/// Narrow a U256 counter to u64, the widest id width the client iterates with.
pub fn checked_u64(value: U256, field: &str) -> Result<u64, Web3ContractErr> {
	if value.bits() > 64 {
		return Err(Web3ContractErr::InvalidOutputType(format!(
			"`{}` does not fit in u64: {}",
			field, value
		)))
	}
	Ok(value.low_u64())
}

fn next_token(
	fields: &mut std::vec::IntoIter<Token>,
	field: &str,
) -> Result<Token, Web3ContractErr> {
	fields
		.next()
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("`{}` missing in tuple", field)))
}

fn next_uint(
	fields: &mut std::vec::IntoIter<Token>,
	field: &str,
) -> Result<U256, Web3ContractErr> {
	next_token(fields, field)?
		.into_uint()
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("`{}` is not a uint", field)))
}

fn next_u64(fields: &mut std::vec::IntoIter<Token>, field: &str) -> Result<u64, Web3ContractErr> {
	checked_u64(next_uint(fields, field)?, field)
}

fn next_u32(fields: &mut std::vec::IntoIter<Token>, field: &str) -> Result<u32, Web3ContractErr> {
	let value = next_uint(fields, field)?;
	if value.bits() > 32 {
		return Err(Web3ContractErr::InvalidOutputType(format!(
			"`{}` does not fit in u32: {}",
			field, value
		)))
	}
	Ok(value.low_u64() as u32)
}

fn next_u8(fields: &mut std::vec::IntoIter<Token>, field: &str) -> Result<u8, Web3ContractErr> {
	let value = next_uint(fields, field)?;
	if value.bits() > 8 {
		return Err(Web3ContractErr::InvalidOutputType(format!(
			"`{}` does not fit in u8: {}",
			field, value
		)))
	}
	Ok(value.low_u64() as u8)
}

fn next_address(
	fields: &mut std::vec::IntoIter<Token>,
	field: &str,
) -> Result<Address, Web3ContractErr> {
	next_token(fields, field)?
		.into_address()
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("`{}` is not an address", field)))
}

fn next_string(
	fields: &mut std::vec::IntoIter<Token>,
	field: &str,
) -> Result<String, Web3ContractErr> {
	next_token(fields, field)?
		.into_string()
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("`{}` is not a string", field)))
}

fn next_bool(fields: &mut std::vec::IntoIter<Token>, field: &str) -> Result<bool, Web3ContractErr> {
	next_token(fields, field)?
		.into_bool()
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("`{}` is not a bool", field)))
}
