use std::fmt;

use bifrost_proto::state as proto;
use serde::{Deserialize, Serialize};

use crate::{Address, DomainType, ParseError, format_amount, parse_amount};

/// Log indices must stay below this bound so that sequences of different blocks never collide.
pub const MAX_LOG_INDEX: u64 = 100_000;

/// The identifier of a main chain event: `block_number * 100000 + log_index`, in decimal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopupSequence(String);

impl TopupSequence {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        let sequence = u128::from(block_number) * u128::from(MAX_LOG_INDEX) + u128::from(log_index);
        TopupSequence(sequence.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopupSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TopupSequence {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_amount(s).map_err(|_| ParseError::new::<TopupSequence>(s))?;
        Ok(TopupSequence(s.to_string()))
    }
}

/// The total fees a user has withdrawn, accumulated for the dividend merkle tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendAccount {
    pub user: Address,
    #[serde(with = "amount_string")]
    pub fee_amount: u128,
}

impl DividendAccount {
    pub fn new(user: Address) -> Self {
        Self {
            user,
            fee_amount: 0,
        }
    }
}

impl DomainType for DividendAccount {
    type Proto = proto::DividendAccount;

    fn to_proto(&self) -> Self::Proto {
        proto::DividendAccount {
            user: self.user.to_string(),
            fee_amount: format_amount(self.fee_amount),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Ok(DividendAccount {
            user: proto.user.parse()?,
            fee_amount: parse_amount(&proto.fee_amount)?,
        })
    }
}

/// Serialize `u128` amounts as decimal strings, since JSON numbers cannot hold them.
pub mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequence_combines_block_and_log_index() {
        assert_eq!(TopupSequence::new(12, 7).as_str(), "1200007");
        assert_eq!(TopupSequence::new(0, 0).as_str(), "0");
    }

    #[test]
    fn sequence_does_not_overflow() {
        let expected = u128::from(u64::MAX) * 100_000 + 99_999;
        assert_eq!(
            TopupSequence::new(u64::MAX, 99_999).as_str(),
            expected.to_string()
        );
    }

    #[test]
    fn dividend_account_json_uses_strings() {
        let account = DividendAccount {
            user: Address([9; 20]),
            fee_amount: 5,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["fee_amount"], "5");
        assert_eq!(
            serde_json::from_value::<DividendAccount>(json).unwrap(),
            account
        );
    }
}
