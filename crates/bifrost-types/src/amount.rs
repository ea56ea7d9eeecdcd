use crate::ParseError;

/// Parse a non-negative integer amount from its decimal string form.
///
/// Only ASCII digits are accepted: signs, whitespace and the empty string are rejected.
pub fn parse_amount(s: &str) -> Result<u128, ParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new::<u128>(s));
    }
    s.parse().map_err(|_| ParseError::new::<u128>(s))
}

pub fn format_amount(amount: u128) -> String {
    amount.to_string()
}
