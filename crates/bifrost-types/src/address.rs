use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::ParseError;

/// A 20-byte account address, written as `0x`-prefixed hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    /// The account address controlled by an Ed25519 public key: the first 20 bytes of the
    /// SHA-256 hash of the key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let hash: [u8; 32] = Sha256::digest(public_key).into();
        let mut address = [0; 20];
        address.copy_from_slice(&hash[..20]);
        Address(address)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| ParseError::new::<Address>(s))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ParseError::new::<Address>(s))?;
        Ok(Address(bytes))
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Address(
            bytes
                .try_into()
                .map_err(|_| ParseError::new::<Address>(hex::encode(bytes)))?,
        ))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        let text = "0x00000000000000000000000000000000000000ff";
        let address: Address = text.parse().unwrap();
        assert_eq!(address.0[19], 0xff);
        assert_eq!(address.to_string(), text);

        // Prefix is optional and case does not matter:
        let bare: Address = "00000000000000000000000000000000000000FF".parse().unwrap();
        assert_eq!(bare, address);
    }

    #[test]
    fn rejects_bad_lengths_and_hex() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!(
            "0x00000000000000000000000000000000000000ff00"
                .parse::<Address>()
                .is_err()
        );
        assert!(
            "0xzz000000000000000000000000000000000000ff"
                .parse::<Address>()
                .is_err()
        );
    }

    #[test]
    fn address_of_public_key_is_truncated_sha256() {
        let public_key = [3u8; 32];
        let hash = Sha256::digest(public_key);
        assert_eq!(
            Address::from_public_key(&public_key).as_bytes(),
            &hash[..20]
        );
    }

    #[test]
    fn serde_uses_hex_text() {
        let address = Address([0xab; 20]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
