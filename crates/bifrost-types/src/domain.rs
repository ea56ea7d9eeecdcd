use bifrost_proto::state as proto;
use prost::Message;
use tendermint::{Time, block::Height, vote::Power};

use crate::{ParseError, transaction::ChainId};

/// A domain type with a canonical protobuf encoding, used to store it in the chain state.
pub trait DomainType: Clone + Send + Sync + Sized + 'static {
    type Proto: Message + Default;

    fn to_proto(&self) -> Self::Proto;

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError>;

    fn encode_to_vec(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::from_proto(Self::Proto::decode(bytes)?)
    }
}

impl DomainType for () {
    type Proto = proto::Empty;

    fn to_proto(&self) -> Self::Proto {
        proto::Empty {}
    }

    fn from_proto(_: Self::Proto) -> Result<Self, ParseError> {
        Ok(())
    }
}

impl DomainType for u64 {
    type Proto = proto::U64;

    fn to_proto(&self) -> Self::Proto {
        proto::U64 { value: *self }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Ok(proto.value)
    }
}

impl DomainType for u128 {
    type Proto = proto::Amount;

    fn to_proto(&self) -> Self::Proto {
        proto::Amount {
            value: crate::format_amount(*self),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        crate::parse_amount(&proto.value)
    }
}

impl DomainType for String {
    type Proto = proto::Text;

    fn to_proto(&self) -> Self::Proto {
        proto::Text {
            value: self.clone(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Ok(proto.value)
    }
}

impl DomainType for ChainId {
    type Proto = proto::Text;

    fn to_proto(&self) -> Self::Proto {
        proto::Text {
            value: self.0.clone(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        ChainId::try_from(proto.value)
    }
}

impl DomainType for Height {
    type Proto = proto::U64;

    fn to_proto(&self) -> Self::Proto {
        proto::U64 {
            value: self.value(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Height::try_from(proto.value).map_err(|_| ParseError::new::<Height>(proto.value.to_string()))
    }
}

impl DomainType for Power {
    type Proto = proto::U64;

    fn to_proto(&self) -> Self::Proto {
        proto::U64 {
            value: self.value(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Power::try_from(proto.value).map_err(|_| ParseError::new::<Power>(proto.value.to_string()))
    }
}

impl DomainType for Time {
    type Proto = proto::Timestamp;

    fn to_proto(&self) -> Self::Proto {
        (*self).into()
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Time::try_from(proto).map_err(|e| ParseError::new::<Time>(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn amounts_are_stored_as_decimal_strings() {
        let bytes = u128::MAX.encode_to_vec();
        let proto = proto::Amount::decode(bytes.as_slice()).unwrap();
        assert_eq!(proto.value, u128::MAX.to_string());
        assert_eq!(u128::decode(&bytes).unwrap(), u128::MAX);
    }

    #[test]
    fn negative_stored_amount_is_rejected() {
        let bytes = proto::Amount {
            value: "-5".to_string(),
        }
        .encode_to_vec();
        assert!(u128::decode(&bytes).is_err());
    }

    #[test]
    fn height_rejects_out_of_range() {
        let bytes = proto::U64 { value: u64::MAX }.encode_to_vec();
        assert!(Height::decode(&bytes).is_err());
    }
}
