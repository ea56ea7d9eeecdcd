use super::*;

/// A transaction whose signature has been verified.
///
/// This transaction is not necessarily valid, either internally or against the current state.
/// However, it is guaranteed that it was signed by the claimed public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedTx(Transaction);

impl Deref for AuthenticatedTx {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AuthenticatedTx {
    /// Decode a transaction from bytes, verify its signature, and convert it into the domain
    /// type.
    pub fn from_proto<B: AsRef<[u8]>>(buf: B) -> Result<AuthenticatedTx, crate::ParseError> {
        Ok(AuthenticatedTx(
            proto::Transaction::authenticate_from_proto(buf)?.try_into()?,
        ))
    }

    pub fn into_inner(self) -> Transaction {
        self.0
    }
}
