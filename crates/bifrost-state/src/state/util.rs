use super::*;

/// Helper function to pad block heights for lexicographic ordering.
///
/// Uses 20 digits to accommodate the full u64 range.
pub fn pad_height(height: Height) -> String {
    format!("{:020}", height.value())
}

/// Hex key segment for an account address.
pub fn address_key(address: &Address) -> String {
    hex::encode(address.as_bytes())
}

/// Key segment for a topup sequence, zero-padded to 39 digits (the full u128 range) so that keys
/// sort in numeric order.
pub fn pad_sequence(sequence: &TopupSequence) -> String {
    format!("{:0>39}", sequence.as_str())
}

/// Read back a sequence from its padded key segment.
pub fn unpad_sequence(segment: &str) -> Result<TopupSequence, Report> {
    Ok(segment.parse::<u128>()?.to_string().parse()?)
}
