//! API response types for bifrost query endpoints.
//!
//! These types are used for serializing responses from the query API and
//! deserializing them in clients and tests.

use serde::{Deserialize, Serialize};

use crate::{Address, topup::amount_string};

/// Envelope for every successful query: the result, and the height of the state it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWithHeight<T> {
    pub height: u64,
    pub result: T,
}

/// Body of every failed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response structure from the `/topup/sequence` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupSequenceResponse {
    /// Decimal sequence of the main chain event
    pub sequence: String,
    /// Whether the event has already been credited
    pub processed: bool,
}

/// Response structure from the `/topup/isoldtx` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsOldTxResponse {
    pub is_old: bool,
}

/// Response structure from the `/topup/dividend-account-root` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendAccountRootResponse {
    /// Hex-encoded keccak-256 merkle root over all dividend accounts
    pub account_root_hash: String,
}

/// Response structure from the `/topup/account-proof/{address}` query endpoint.
///
/// The proof is the concatenation of the sibling hashes from the leaf up to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProofResponse {
    pub address: Address,
    /// Hex-encoded concatenated 32-byte sibling hashes
    pub account_proof: String,
    /// Position of the account's leaf among the sorted leaves
    pub index: u64,
}

/// Response structure from the `/topup/account-proof/{address}/verify` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyAccountProofResponse {
    pub is_verified: bool,
}

/// Response structure from the `/bank/balance/{address}` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: Address,
    #[serde(with = "amount_string")]
    pub amount: u128,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn envelope_shape() {
        let response = ResponseWithHeight {
            height: 7,
            result: IsOldTxResponse { is_old: true },
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "height": 7, "result": { "is_old": true } })
        );
    }
}
