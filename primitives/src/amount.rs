use web3::types::U256;

/// The payment token carries 18 decimal places on chain.
pub const TOKEN_DECIMALS: usize = 18;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
	#[error("Invalid token amount: {0}")]
	InvalidAmount(String),

	#[error("Token amount has more than {TOKEN_DECIMALS} fractional digits: {0}")]
	TooManyDecimals(String),

	#[error("Token amount overflows: {0}")]
	Overflow(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn base_unit_factor() -> U256 {
	U256::exp10(TOKEN_DECIMALS)
}

/// Scale a human unit decimal string ("1.5") to on-chain base units.
/// Integer arithmetic only, the base unit value is never rounded.
pub fn scale_to_base_units(amount: &str) -> Result<U256> {
	let trimmed = amount.trim();
	let (integer, fraction) = match trimmed.split_once('.') {
		Some((integer, fraction)) => (integer, fraction),
		None => (trimmed, ""),
	};

	if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::InvalidAmount(amount.to_owned()))
	}
	if !fraction.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::InvalidAmount(amount.to_owned()))
	}
	if fraction.len() > TOKEN_DECIMALS {
		return Err(Error::TooManyDecimals(amount.to_owned()))
	}

	let whole = U256::from_dec_str(integer)
		.map_err(|_| Error::InvalidAmount(amount.to_owned()))?
		.checked_mul(base_unit_factor())
		.ok_or_else(|| Error::Overflow(amount.to_owned()))?;

	if fraction.is_empty() {
		return Ok(whole)
	}

	// right-pad the fraction to 18 digits, e.g. "5" -> 5 * 10^17
	let fraction_units = U256::from_dec_str(fraction)
		.map_err(|_| Error::InvalidAmount(amount.to_owned()))? *
		U256::exp10(TOKEN_DECIMALS - fraction.len());

	whole.checked_add(fraction_units).ok_or_else(|| Error::Overflow(amount.to_owned()))
}

/// Render base units back to a human unit decimal string. Trailing zeros are
/// trimmed and whole amounts carry no decimal point, so canonical inputs to
/// [`scale_to_base_units`] round-trip exactly.
pub fn format_token_amount(base_units: U256) -> String {
	let factor = base_unit_factor();
	let whole = base_units / factor;
	let remainder = base_units % factor;

	if remainder.is_zero() {
		return whole.to_string()
	}

	let mut fraction = format!("{:0>width$}", remainder.to_string(), width = TOKEN_DECIMALS);
	while fraction.ends_with('0') {
		fraction.pop();
	}
	format!("{}.{}", whole, fraction)
}
