use prost::bytes::Bytes;

mod sign;
pub use sign::{KeyPair, KeyPairs, SignError, Signer, VerifyError};

/// A signature slot: the public key of the expected signer, and the signature itself once
/// filled in.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Signature {
    #[prost(bytes = "bytes", tag = "1")]
    pub public_key: Bytes,
    #[prost(bytes = "bytes", tag = "2")]
    pub signature: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(string, tag = "1")]
    pub chain_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub msg: ::core::option::Option<Msg>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Msg {
    #[prost(oneof = "msg::Msg", tags = "1, 2")]
    pub msg: ::core::option::Option<msg::Msg>,
}

pub mod msg {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Msg {
        #[prost(message, tag = "1")]
        TopupTx(super::MsgTopupTx),
        #[prost(message, tag = "2")]
        WithdrawFeeTx(super::MsgWithdrawFeeTx),
    }
}

/// Claim that `user` paid `fee` on the main chain in the log `log_index` of transaction
/// `tx_hash`, included in main chain block `block_number`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgTopupTx {
    #[prost(message, optional, tag = "1")]
    pub signature: ::core::option::Option<Signature>,
    #[prost(string, tag = "2")]
    pub user: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub fee: ::prost::alloc::string::String,
    #[prost(bytes = "bytes", tag = "4")]
    pub tx_hash: Bytes,
    #[prost(uint64, tag = "5")]
    pub log_index: u64,
    #[prost(uint64, tag = "6")]
    pub block_number: u64,
}

/// Move fees from the signer's balance into its dividend account.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgWithdrawFeeTx {
    #[prost(message, optional, tag = "1")]
    pub signature: ::core::option::Option<Signature>,
    #[prost(string, tag = "2")]
    pub amount: ::prost::alloc::string::String,
}
