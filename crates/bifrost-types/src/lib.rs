use bifrost_proto::transaction::VerifyError;

#[derive(thiserror::Error, Debug)]
#[error("Cannot parse invalid {type_name}: {value:?}")]
pub struct ParseError {
    type_name: &'static str,
    value: String,
}

impl ParseError {
    pub fn new<T: ?Sized>(value: impl Into<String>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: value.into(),
        }
    }
}

impl From<VerifyError> for ParseError {
    fn from(_: VerifyError) -> Self {
        Self::new::<VerifyError>("signature verification failed")
    }
}

impl From<prost::DecodeError> for ParseError {
    fn from(e: prost::DecodeError) -> Self {
        Self::new::<prost::DecodeError>(e.to_string())
    }
}

mod domain;
pub use domain::DomainType;

mod address;
pub use address::Address;

mod amount;
pub use amount::{format_amount, parse_amount};

pub mod config;
pub mod response;
pub mod sidetx;
pub mod topup;
pub mod transaction;

pub use bifrost_proto::transaction::{KeyPair, KeyPairs, SignError};
