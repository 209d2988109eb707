use std::fmt;

use web3::{
	contract::{tokens::Detokenize, Error as Web3ContractErr},
	ethabi::{self, Token},
	types::{Address, BlockNumber, FilterBuilder, U256, U64},
};

use market_primitives::{amount, display};

use crate::{
	client::MarketClient,
	error::{Error, Result},
	types::SCAN_SPAN,
};

pub const TASK_CREATED_EVENT: &str = "TaskCreated";
pub const TASK_ASSIGNED_EVENT: &str = "TaskAssigned";
pub const BID_PLACED_EVENT: &str = "BidPlaced";
pub const REPUTATION_UPDATED_EVENT: &str = "ReputationUpdated";

#[derive(Clone, Debug, PartialEq)]
pub struct TaskCreated {
	pub task_id: U256,
	pub client: Address,
	pub payment_amount: U256,
}

impl Detokenize for TaskCreated {
	fn from_tokens(tokens: Vec<Token>) -> std::result::Result<Self, Web3ContractErr> {
		let (task_id, client, payment_amount) = event_fields(tokens, TASK_CREATED_EVENT)?;
		Ok(TaskCreated { task_id, client, payment_amount })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskAssigned {
	pub task_id: U256,
	pub provider: Address,
	pub final_price: U256,
}

impl Detokenize for TaskAssigned {
	fn from_tokens(tokens: Vec<Token>) -> std::result::Result<Self, Web3ContractErr> {
		let (task_id, provider, final_price) = event_fields(tokens, TASK_ASSIGNED_EVENT)?;
		Ok(TaskAssigned { task_id, provider, final_price })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BidPlaced {
	pub task_id: U256,
	pub resource_id: U256,
	pub bid_price: U256,
}

impl Detokenize for BidPlaced {
	fn from_tokens(tokens: Vec<Token>) -> std::result::Result<Self, Web3ContractErr> {
		if tokens.len() != 3 {
			return Err(invalid_event(BID_PLACED_EVENT, tokens.len()))
		}
		let mut fields = tokens.into_iter();
		Ok(BidPlaced {
			task_id: uint_field(&mut fields, BID_PLACED_EVENT)?,
			resource_id: uint_field(&mut fields, BID_PLACED_EVENT)?,
			bid_price: uint_field(&mut fields, BID_PLACED_EVENT)?,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReputationUpdated {
	pub resource_id: U256,
	pub new_reputation: U256,
}

impl Detokenize for ReputationUpdated {
	fn from_tokens(tokens: Vec<Token>) -> std::result::Result<Self, Web3ContractErr> {
		if tokens.len() != 2 {
			return Err(invalid_event(REPUTATION_UPDATED_EVENT, tokens.len()))
		}
		let mut fields = tokens.into_iter();
		Ok(ReputationUpdated {
			resource_id: uint_field(&mut fields, REPUTATION_UPDATED_EVENT)?,
			new_reputation: uint_field(&mut fields, REPUTATION_UPDATED_EVENT)?,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarketEvent {
	TaskCreated(TaskCreated),
	TaskAssigned(TaskAssigned),
	BidPlaced(BidPlaced),
	ReputationUpdated(ReputationUpdated),
}

/// One decoded contract event with the block it landed in.
#[derive(Clone, Debug, PartialEq)]
pub struct ScannedEvent {
	pub block_number: Option<U64>,
	pub event: MarketEvent,
}

impl fmt::Display for ScannedEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.block_number {
			Some(number) => write!(f, "[{}] ", number)?,
			None => write!(f, "[pending] ")?,
		}
		match &self.event {
			MarketEvent::TaskCreated(e) => write!(
				f,
				"TaskCreated: task {} by {} for {} tokens",
				e.task_id,
				display::format_address(&e.client),
				amount::format_token_amount(e.payment_amount),
			),
			MarketEvent::TaskAssigned(e) => write!(
				f,
				"TaskAssigned: task {} to {} at {} tokens",
				e.task_id,
				display::format_address(&e.provider),
				amount::format_token_amount(e.final_price),
			),
			MarketEvent::BidPlaced(e) => write!(
				f,
				"BidPlaced: resource {} bid {} tokens on task {}",
				e.resource_id,
				amount::format_token_amount(e.bid_price),
				e.task_id,
			),
			MarketEvent::ReputationUpdated(e) => write!(
				f,
				"ReputationUpdated: resource {} now at {}",
				e.resource_id, e.new_reputation,
			),
		}
	}
}

/// Clamp one scan round to `[start, min(start + span, best)]`.
pub fn scan_range(start: U64, best: U64) -> (U64, U64) {
	let start = if start > best { best } else { start };
	let span = U64::from(SCAN_SPAN);
	let end = if start + span > best { best } else { start + span };
	(start, end)
}

/// Decode every marketplace event between two blocks, in block order. Display
/// only: scanning never feeds the session collections, which stay consistent
/// through reload-after-write alone.
pub async fn scan_events(client: &MarketClient, from: U64, to: U64) -> Result<Vec<ScannedEvent>> {
	let mut found = Vec::new();

	for (record, number) in decode_logs::<TaskCreated>(client, TASK_CREATED_EVENT, from, to).await? {
		found.push(ScannedEvent { block_number: number, event: MarketEvent::TaskCreated(record) });
	}
	for (record, number) in decode_logs::<TaskAssigned>(client, TASK_ASSIGNED_EVENT, from, to).await? {
		found.push(ScannedEvent { block_number: number, event: MarketEvent::TaskAssigned(record) });
	}
	for (record, number) in decode_logs::<BidPlaced>(client, BID_PLACED_EVENT, from, to).await? {
		found.push(ScannedEvent { block_number: number, event: MarketEvent::BidPlaced(record) });
	}
	for (record, number) in
		decode_logs::<ReputationUpdated>(client, REPUTATION_UPDATED_EVENT, from, to).await?
	{
		found
			.push(ScannedEvent { block_number: number, event: MarketEvent::ReputationUpdated(record) });
	}

	found.sort_by_key(|e| e.block_number.map(|n| n.as_u64()).unwrap_or(u64::MAX));
	Ok(found)
}

async fn decode_logs<R: Detokenize>(
	client: &MarketClient,
	name: &str,
	from: U64,
	to: U64,
) -> Result<Vec<(R, Option<U64>)>> {
	let contract = client.contract();
	let event = contract.abi().event(name)?;

	let filter = FilterBuilder::default()
		.address(vec![contract.address()])
		.topics(Some(vec![event.signature()]), None, None, None)
		.from_block(BlockNumber::Number(from))
		.to_block(BlockNumber::Number(to))
		.build();

	let logs = client
		.eth()
		.logs(filter)
		.await
		.map_err(|e| Error::ChainRead(Web3ContractErr::Api(e)))?;

	logs.into_iter()
		.map(|log| {
			let parsed = event.parse_log(ethabi::RawLog {
				topics: log.topics.clone(),
				data: log.data.0.clone(),
			})?;
			let record =
				R::from_tokens(parsed.params.into_iter().map(|p| p.value).collect::<Vec<_>>())?;
			Ok((record, log.block_number))
		})
		.collect()
}

fn invalid_event(event: &str, arity: usize) -> Web3ContractErr {
	Web3ContractErr::InvalidOutputType(format!("{} holds {} params", event, arity))
}

fn uint_field(
	fields: &mut std::vec::IntoIter<Token>,
	event: &str,
) -> std::result::Result<U256, Web3ContractErr> {
	fields
		.next()
		.and_then(Token::into_uint)
		.ok_or_else(|| Web3ContractErr::InvalidOutputType(format!("{} param is not a uint", event)))
}

fn event_fields(
	tokens: Vec<Token>,
	event: &str,
) -> std::result::Result<(U256, Address, U256), Web3ContractErr> {
	if tokens.len() != 3 {
		return Err(invalid_event(event, tokens.len()))
	}
	let mut fields = tokens.into_iter();
	let id = uint_field(&mut fields, event)?;
	let address = fields.next().and_then(Token::into_address).ok_or_else(|| {
		Web3ContractErr::InvalidOutputType(format!("{} param is not an address", event))
	})?;
	let value = uint_field(&mut fields, event)?;
	Ok((id, address, value))
}
