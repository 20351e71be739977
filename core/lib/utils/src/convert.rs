/// Decodes a hex string with an optional `0x` prefix.
pub fn decode_0x_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.trim().trim_start_matches("0x"))
}
