use bifrost_proto::transaction::{self as proto, SignError};
use prost::bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{fmt, ops::Deref};

use crate::{Address, topup::TopupSequence};

/// Type conversions between the protobuf types and the domain types.
mod convert;

mod authenticated;
pub use authenticated::AuthenticatedTx;

mod build;
pub use build::Builder;

mod validate;
pub use validate::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub chain_id: ChainId,
    pub msg: Msg,
}

impl Transaction {
    /// Encode the transaction to bytes, signing its message with the given signer.
    pub fn sign_to_proto(self, signer: impl proto::Signer) -> Result<Vec<u8>, SignError> {
        proto::Transaction::from(self).sign_to_proto(signer)
    }
}

/// The hash identifying a transaction: the SHA-256 of its raw bytes as included in a block.
pub fn tx_hash(tx_bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(tx_bytes).into()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    TopupTx(TopupTx),
    WithdrawFeeTx(WithdrawFeeTx),
}

impl Msg {
    /// Whether this message must be checked against the main chain by every validator before
    /// its effects are applied.
    pub fn is_side_tx(&self) -> bool {
        match self {
            Msg::TopupTx(_) => true,
            Msg::WithdrawFeeTx(_) => false,
        }
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            Msg::TopupTx(_) => "/bifrost.topup.MsgTopupTx",
            Msg::WithdrawFeeTx(_) => "/bifrost.topup.MsgWithdrawFeeTx",
        }
    }

    /// The account which signed this message.
    pub fn signer(&self) -> &Signer {
        match self {
            Msg::TopupTx(TopupTx { proposer, .. })
            | Msg::WithdrawFeeTx(WithdrawFeeTx { proposer, .. }) => proposer,
        }
    }
}

/// The public key expected to sign a message.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signer {
    pub public_key: Bytes,
}

impl Signer {
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signer({})", hex::encode(&self.public_key))
    }
}

impl From<&crate::KeyPair> for Signer {
    fn from(keypair: &crate::KeyPair) -> Self {
        Signer {
            public_key: Bytes::copy_from_slice(keypair.public_key()),
        }
    }
}

/// A claim that `user` paid `fee` on the main chain, carried by the event at `log_index` of
/// transaction `tx_hash` in main chain block `block_number`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopupTx {
    pub proposer: Signer,
    pub user: Address,
    pub fee: u128,
    pub tx_hash: [u8; 32],
    pub log_index: u64,
    pub block_number: u64,
}

impl TopupTx {
    pub fn sequence(&self) -> TopupSequence {
        TopupSequence::new(self.block_number, self.log_index)
    }
}

/// Withdraw fees from the proposer's balance into its dividend account.
///
/// An amount of zero withdraws the whole balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawFeeTx {
    pub proposer: Signer,
    pub amount: u128,
}
