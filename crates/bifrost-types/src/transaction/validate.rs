use super::*;
use crate::topup::MAX_LOG_INDEX;

/// Stateless checks a message must pass before it is looked at against the chain state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid signer public key: expected 32 bytes, got {0}")]
    InvalidPublicKey(usize),
    #[error("invalid user address: zero address")]
    ZeroUser,
    #[error("invalid main chain tx hash: zero hash")]
    ZeroTxHash,
    #[error("invalid log index {0}: must be below {MAX_LOG_INDEX}")]
    InvalidLogIndex(u64),
}

impl Signer {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.public_key.len() != 32 {
            return Err(ValidationError::InvalidPublicKey(self.public_key.len()));
        }
        Ok(())
    }
}

impl TopupTx {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        self.proposer.validate_basic()?;
        if self.user.is_zero() {
            return Err(ValidationError::ZeroUser);
        }
        if self.tx_hash == [0; 32] {
            return Err(ValidationError::ZeroTxHash);
        }
        if self.log_index >= MAX_LOG_INDEX {
            return Err(ValidationError::InvalidLogIndex(self.log_index));
        }
        Ok(())
    }
}

impl WithdrawFeeTx {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        self.proposer.validate_basic()
    }
}

impl Msg {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        match self {
            Msg::TopupTx(topup) => topup.validate_basic(),
            Msg::WithdrawFeeTx(withdraw) => withdraw.validate_basic(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::KeyPair;

    fn topup(keypair: &KeyPair) -> TopupTx {
        TopupTx {
            proposer: keypair.into(),
            user: Address([1; 20]),
            fee: 1_000,
            tx_hash: [2; 32],
            log_index: 3,
            block_number: 4,
        }
    }

    #[test]
    fn valid_topup_passes() {
        let keypair = KeyPair::generate().unwrap();
        topup(&keypair).validate_basic().unwrap();
    }

    #[test]
    fn topup_rejects_zero_fields() {
        let keypair = KeyPair::generate().unwrap();

        let mut tx = topup(&keypair);
        tx.user = Address::ZERO;
        assert_eq!(tx.validate_basic(), Err(ValidationError::ZeroUser));

        let mut tx = topup(&keypair);
        tx.tx_hash = [0; 32];
        assert_eq!(tx.validate_basic(), Err(ValidationError::ZeroTxHash));
    }

    #[test]
    fn topup_rejects_colliding_log_index() {
        let keypair = KeyPair::generate().unwrap();
        let mut tx = topup(&keypair);
        tx.log_index = MAX_LOG_INDEX;
        assert_eq!(
            tx.validate_basic(),
            Err(ValidationError::InvalidLogIndex(MAX_LOG_INDEX))
        );
    }

    #[test]
    fn short_public_key_is_rejected() {
        let tx = WithdrawFeeTx {
            proposer: Signer {
                public_key: Bytes::from_static(&[1; 31]),
            },
            amount: 0,
        };
        assert_eq!(
            tx.validate_basic(),
            Err(ValidationError::InvalidPublicKey(31))
        );
    }

    #[test]
    fn signed_transaction_authenticates() {
        let keypair = KeyPair::generate().unwrap();
        let tx = Builder::new(ChainId("bifrost".into()), &keypair).topup(
            Address([1; 20]),
            1_000,
            [2; 32],
            3,
            4,
        );

        let bytes = tx.clone().sign_to_proto(&keypair).unwrap();
        let authenticated = AuthenticatedTx::from_proto(&bytes).unwrap();
        assert_eq!(*authenticated, tx);
        assert!(authenticated.msg.is_side_tx());
        assert_eq!(authenticated.msg.signer().address(), Address::from_public_key(keypair.public_key()));
    }

    #[test]
    fn tampered_transaction_does_not_authenticate() {
        let keypair = KeyPair::generate().unwrap();
        let tx = Builder::new(ChainId("bifrost".into()), &keypair).withdraw_fee(10);
        let mut bytes = tx.sign_to_proto(&keypair).unwrap();

        // Flip a bit in the last byte, which belongs to the amount string:
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(AuthenticatedTx::from_proto(&bytes).is_err());
    }
}
