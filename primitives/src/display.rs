use web3::types::Address;

/// Truncated display form of an account address,
/// e.g. `0x1234567890abcdef1234567890abcdef12345678` -> `0x1234...5678`.
pub fn format_address(address: &Address) -> String {
	let hex = format!("0x{}", hex::encode(address));
	format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
}
