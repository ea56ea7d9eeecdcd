use prost::{Message as _, bytes::Bytes};
pub use ring::error::Unspecified as VerifyError;
use ring::{
    digest::{Context, Digest, SHA256},
    signature::{ED25519, UnparsedPublicKey},
};

mod signer;
pub use signer::{KeyPair, KeyPairs, Signer};

#[cfg(test)]
mod test;

#[derive(thiserror::Error, Debug)]
pub enum SignError {
    #[error("No keypair available for public key in transaction")]
    MissingKeypair,
    #[error("Transaction already contains a signature")]
    AlreadySigned,
    #[error("Transaction has no message to sign")]
    MissingMessage,
}

impl super::Signature {
    /// Create a new blank signature for the given public key.
    pub fn unsigned(public_key: Bytes) -> Self {
        Self {
            public_key,
            signature: Bytes::new(),
        }
    }
}

impl super::Msg {
    /// The signature slot of whichever message this is, if present.
    fn signature_mut(&mut self) -> Option<&mut super::Signature> {
        use super::msg::Msg::*;
        match self.msg.as_mut()? {
            TopupTx(msg) => msg.signature.as_mut(),
            WithdrawFeeTx(msg) => msg.signature.as_mut(),
        }
    }
}

impl super::Transaction {
    /// Decode a transaction and verify all its signatures, stripping them in the process.
    pub fn authenticate_from_proto<B: AsRef<[u8]>>(buf: B) -> Result<Self, VerifyError> {
        let tx = Self::decode(buf.as_ref()).map_err(|_| VerifyError)?;
        let mut tx = tx.verify_all()?;
        tx.unsign_all();
        Ok(tx)
    }

    /// Encode a transaction and fill in all its signatures using the given signer.
    pub fn sign_to_proto(self, signer: impl Signer) -> Result<Vec<u8>, SignError> {
        let tx = self.sign_all(signer)?;
        Ok(tx.encode_to_vec())
    }

    /// Compute the hash of the transaction as a protobuf message.
    ///
    /// The hash is computed after removing all signatures from the transaction, so that it can
    /// be computed as an *input* to signing.
    pub fn hash(&self) -> Digest {
        let mut unbound = self.clone();
        unbound.unsign_all();
        let mut context = Context::new(&SHA256);
        context.update(&unbound.encode_to_vec());
        context.finish()
    }

    /// Fill in every blank signature with a valid signature over the hash of the transaction.
    fn sign_all(mut self, signer: impl Signer) -> Result<Self, SignError> {
        let digest = self.hash();

        let signature = self
            .msg
            .as_mut()
            .and_then(super::Msg::signature_mut)
            .ok_or(SignError::MissingMessage)?;

        if !signature.signature.is_empty() {
            return Err(SignError::AlreadySigned);
        }

        let sig = signer
            .sign_with(signature.public_key.as_ref(), digest)
            .ok_or(SignError::MissingKeypair)?;
        signature.signature = sig.into();

        Ok(self)
    }

    /// Remove all signatures from this object and its sub-objects.
    fn unsign_all(&mut self) {
        if let Some(signature) = self.msg.as_mut().and_then(super::Msg::signature_mut) {
            signature.signature.clear();
        }
    }

    /// Verify every signature in the transaction against the hash of the transaction.
    ///
    /// A missing or blank signature is an error.
    fn verify_all(mut self) -> Result<Self, VerifyError> {
        let digest = self.hash();
        let super::Signature {
            public_key,
            signature,
        } = self
            .msg
            .as_mut()
            .and_then(super::Msg::signature_mut)
            .ok_or(VerifyError)?;

        if signature.is_empty() {
            return Err(VerifyError);
        }

        UnparsedPublicKey::new(&ED25519, public_key.as_ref())
            .verify(digest.as_ref(), signature.as_ref())?;

        Ok(self)
    }
}
