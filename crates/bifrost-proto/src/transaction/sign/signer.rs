use std::collections::HashMap;

use ring::{
    rand::SystemRandom,
    signature::{Ed25519KeyPair, KeyPair as _},
};

use super::*;

/// A signer is something that can sign a digest using one or more Ed25519 keypairs.
pub trait Signer {
    /// This should return the signature if and only if the public key matches a keypair that can
    /// produce a signature through the signer.
    fn sign_with(&self, public_key: &[u8], digest: Digest) -> Option<Vec<u8>>;
}

impl<S: Signer + ?Sized> Signer for &S {
    fn sign_with(&self, public_key: &[u8], digest: Digest) -> Option<Vec<u8>> {
        (**self).sign_with(public_key, digest)
    }
}

/// An Ed25519 keypair which remembers its PKCS#8 encoding, so it can be written back to disk.
pub struct KeyPair {
    pkcs8: Vec<u8>,
    inner: Ed25519KeyPair,
}

impl KeyPair {
    /// Generate a fresh keypair from the system's secure random source.
    pub fn generate() -> Result<Self, VerifyError> {
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new())?;
        Self::decode(pkcs8.as_ref())
    }

    /// Decode a keypair from its PKCS#8 v2 document.
    pub fn decode(pkcs8: &[u8]) -> Result<Self, VerifyError> {
        let inner = Ed25519KeyPair::from_pkcs8(pkcs8).map_err(|_| VerifyError)?;
        Ok(Self {
            pkcs8: pkcs8.to_vec(),
            inner,
        })
    }

    /// The PKCS#8 v2 document for this keypair.
    pub fn encode(&self) -> Vec<u8> {
        self.pkcs8.clone()
    }

    /// The raw 32-byte Ed25519 public key.
    pub fn public_key(&self) -> &[u8] {
        self.inner.public_key().as_ref()
    }

    /// Sign an arbitrary message.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.inner.sign(message).as_ref().to_vec()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

impl Signer for KeyPair {
    fn sign_with(&self, public_key: &[u8], digest: Digest) -> Option<Vec<u8>> {
        if self.public_key() == public_key {
            Some(self.sign(digest.as_ref()))
        } else {
            None
        }
    }
}

/// A collection of Ed25519 keypairs, indexed by public key.
#[derive(Default)]
pub struct KeyPairs {
    keypairs: HashMap<Bytes, KeyPair>,
}

impl KeyPairs {
    /// Create an empty collection of keypairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keypair into the collection.
    pub fn insert(&mut self, keypair: KeyPair) {
        self.keypairs
            .insert(Bytes::copy_from_slice(keypair.public_key()), keypair);
    }

    /// Remove a keypair from the collection by its public key.
    pub fn remove(&mut self, public_key: &[u8]) -> Option<KeyPair> {
        self.keypairs.remove(public_key)
    }
}

impl FromIterator<KeyPair> for KeyPairs {
    fn from_iter<T: IntoIterator<Item = KeyPair>>(iter: T) -> Self {
        let mut keypairs = Self::new();
        for kp in iter {
            keypairs.insert(kp);
        }
        keypairs
    }
}

impl Signer for KeyPairs {
    fn sign_with(&self, public_key: &[u8], digest: Digest) -> Option<Vec<u8>> {
        self.keypairs
            .get(public_key)
            .and_then(|kp| kp.sign_with(public_key, digest))
    }
}
