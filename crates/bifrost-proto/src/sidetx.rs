//! Messages exchanged between validators through ABCI vote extensions.

use prost::{Message as _, bytes::Bytes};
use ring::signature::{ED25519, UnparsedPublicKey};

use crate::transaction::VerifyError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Vote {
    Unspecified = 0,
    Yes = 1,
    No = 2,
}

/// One validator's verdict on one side transaction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SideTxResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub tx_hash: Bytes,
    #[prost(enumeration = "Vote", tag = "2")]
    pub result: i32,
}

/// The payload a validator attaches to its precommit for block `height`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VoteExtension {
    #[prost(bytes = "bytes", tag = "1")]
    pub block_hash: Bytes,
    #[prost(int64, tag = "2")]
    pub height: i64,
    #[prost(message, repeated, tag = "3")]
    pub side_tx_responses: ::prost::alloc::vec::Vec<SideTxResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExtendedVote {
    #[prost(bytes = "bytes", tag = "1")]
    pub validator_address: Bytes,
    #[prost(int64, tag = "2")]
    pub power: i64,
    #[prost(int32, tag = "3")]
    pub block_id_flag: i32,
    #[prost(bytes = "bytes", tag = "4")]
    pub vote_extension: Bytes,
    #[prost(bytes = "bytes", tag = "5")]
    pub extension_signature: Bytes,
}

/// The extended commit of the previous block, injected by the proposer as the first transaction
/// of a block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExtendedCommit {
    #[prost(int32, tag = "1")]
    pub round: i32,
    #[prost(message, repeated, tag = "2")]
    pub votes: ::prost::alloc::vec::Vec<ExtendedVote>,
}

/// CometBFT's canonical form of a vote extension, which is what validators actually sign.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CanonicalVoteExtension {
    #[prost(bytes = "bytes", tag = "1")]
    pub extension: Bytes,
    #[prost(sfixed64, tag = "2")]
    pub height: i64,
    #[prost(sfixed64, tag = "3")]
    pub round: i64,
    #[prost(string, tag = "4")]
    pub chain_id: ::prost::alloc::string::String,
}

impl CanonicalVoteExtension {
    pub fn new(chain_id: &str, height: i64, round: i64, extension: &[u8]) -> Self {
        Self {
            extension: Bytes::copy_from_slice(extension),
            height,
            round,
            chain_id: chain_id.to_owned(),
        }
    }

    /// The bytes covered by the extension signature (length-delimited, as CometBFT signs them).
    pub fn sign_bytes(&self) -> Vec<u8> {
        self.encode_length_delimited_to_vec()
    }
}

/// Verify a validator's Ed25519 signature over its vote extension.
pub fn verify_vote_extension_signature(
    chain_id: &str,
    height: i64,
    round: i64,
    extension: &[u8],
    public_key: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let sign_bytes = CanonicalVoteExtension::new(chain_id, height, round, extension).sign_bytes();
    UnparsedPublicKey::new(&ED25519, public_key).verify(&sign_bytes, signature)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transaction::KeyPair;

    #[test]
    fn extension_signature_verifies() {
        let keypair = KeyPair::generate().unwrap();
        let extension = VoteExtension {
            block_hash: Bytes::from_static(&[7; 32]),
            height: 10,
            side_tx_responses: vec![SideTxResponse {
                tx_hash: Bytes::from_static(&[1; 32]),
                result: Vote::Yes as i32,
            }],
        }
        .encode_to_vec();

        let signature =
            keypair.sign(&CanonicalVoteExtension::new("chain", 10, 0, &extension).sign_bytes());

        verify_vote_extension_signature(
            "chain",
            10,
            0,
            &extension,
            keypair.public_key(),
            &signature,
        )
        .unwrap();

        // Any change to the signed context invalidates the signature:
        assert!(
            verify_vote_extension_signature(
                "other",
                10,
                0,
                &extension,
                keypair.public_key(),
                &signature
            )
            .is_err()
        );
        assert!(
            verify_vote_extension_signature(
                "chain",
                11,
                0,
                &extension,
                keypair.public_key(),
                &signature
            )
            .is_err()
        );
    }
}
