//! Values stored in the chain state.

use prost::bytes::Bytes;

pub use tendermint_proto::google::protobuf::Timestamp;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct U64 {
    #[prost(uint64, tag = "1")]
    pub value: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Text {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
}

/// A non-negative token amount, as a decimal string.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Amount {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
}

/// The fees a user has withdrawn into the dividend pool.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DividendAccount {
    #[prost(string, tag = "1")]
    pub user: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub fee_amount: ::prost::alloc::string::String,
}

/// A side transaction included in a block, waiting for the votes of the next block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PendingSideTx {
    #[prost(bytes = "bytes", tag = "1")]
    pub tx_hash: Bytes,
    #[prost(bytes = "bytes", tag = "2")]
    pub tx: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Config {
    #[prost(message, optional, tag = "1")]
    pub chain: ::core::option::Option<ChainConfig>,
    #[prost(message, optional, tag = "2")]
    pub topup: ::core::option::Option<TopupConfig>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChainConfig {
    #[prost(uint64, tag = "1")]
    pub main_chain_tx_confirmations: u64,
    #[prost(string, tag = "2")]
    pub staking_info_address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TopupConfig {
    #[prost(string, tag = "1")]
    pub default_fee_wanted_per_tx: ::prost::alloc::string::String,
}
