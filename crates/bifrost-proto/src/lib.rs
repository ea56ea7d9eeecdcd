//! Protobuf wire types for bifrost transactions, side-transaction votes and stored state.
//!
//! The messages are declared with `prost` derives directly rather than generated from `.proto`
//! files, so the tag numbers here are the wire contract.

pub mod sidetx;
pub mod state;
pub mod transaction;
