use snafu::ResultExt;

use crate::error::{InvalidHexSnafu, Result};

/// Encodes `bytes` as a `0x`-prefixed hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes a hex string, with or without the `0x` prefix.
///
/// # Returns
/// * `Ok(Vec<u8>)` - The decoded bytes.
/// * `Err(Error::InvalidHex)` - If the string is not valid hex.
pub fn from_hex(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.trim_start_matches("0x");
    hex::decode(hex_str).context(InvalidHexSnafu)
}

/// Shortened form of a hex payload for log lines.
pub fn short_hex(hex_str: &str) -> &str {
    hex_str.get(..18).unwrap_or(hex_str)
}
