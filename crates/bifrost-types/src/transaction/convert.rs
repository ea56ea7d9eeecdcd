use super::*;
use crate::{ParseError, format_amount, parse_amount};

impl TryFrom<proto::Transaction> for Transaction {
    type Error = ParseError;

    fn try_from(tx: proto::Transaction) -> Result<Self, Self::Error> {
        let proto::Transaction { chain_id, msg } = tx;

        let chain_id = ChainId::try_from(chain_id)?;
        let msg = msg
            .ok_or_else(|| ParseError::new::<Msg>("missing"))?
            .try_into()?;

        Ok(Transaction { chain_id, msg })
    }
}

impl From<Transaction> for proto::Transaction {
    fn from(tx: Transaction) -> Self {
        let Transaction { chain_id, msg } = tx;
        proto::Transaction {
            chain_id: chain_id.into(),
            msg: Some(msg.into()),
        }
    }
}

impl TryFrom<String> for ChainId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(ParseError::new::<ChainId>(value))
        } else {
            Ok(ChainId(value))
        }
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.0
    }
}

impl TryFrom<Option<proto::Signature>> for Signer {
    type Error = ParseError;

    fn try_from(value: Option<proto::Signature>) -> Result<Self, Self::Error> {
        let signature = value.ok_or_else(|| ParseError::new::<Signer>("missing"))?;
        Ok(Signer {
            public_key: signature.public_key,
        })
    }
}

impl From<Signer> for proto::Signature {
    fn from(signer: Signer) -> Self {
        proto::Signature::unsigned(signer.public_key)
    }
}

impl TryFrom<proto::Msg> for Msg {
    type Error = ParseError;

    fn try_from(value: proto::Msg) -> Result<Self, Self::Error> {
        match value.msg {
            Some(proto::msg::Msg::TopupTx(topup)) => Ok(Msg::TopupTx(topup.try_into()?)),
            Some(proto::msg::Msg::WithdrawFeeTx(withdraw)) => {
                Ok(Msg::WithdrawFeeTx(withdraw.try_into()?))
            }
            None => Err(ParseError::new::<Msg>("missing")),
        }
    }
}

impl From<Msg> for proto::Msg {
    fn from(msg: Msg) -> Self {
        proto::Msg {
            msg: Some(match msg {
                Msg::TopupTx(topup) => proto::msg::Msg::TopupTx(topup.into()),
                Msg::WithdrawFeeTx(withdraw) => proto::msg::Msg::WithdrawFeeTx(withdraw.into()),
            }),
        }
    }
}

impl TryFrom<proto::MsgTopupTx> for TopupTx {
    type Error = ParseError;

    fn try_from(value: proto::MsgTopupTx) -> Result<Self, Self::Error> {
        let proto::MsgTopupTx {
            signature,
            user,
            fee,
            tx_hash,
            log_index,
            block_number,
        } = value;

        Ok(TopupTx {
            proposer: signature.try_into()?,
            user: user.parse()?,
            fee: parse_amount(&fee)?,
            tx_hash: tx_hash
                .as_ref()
                .try_into()
                .map_err(|_| ParseError::new::<[u8; 32]>(hex::encode(&tx_hash)))?,
            log_index,
            block_number,
        })
    }
}

impl From<TopupTx> for proto::MsgTopupTx {
    fn from(value: TopupTx) -> Self {
        let TopupTx {
            proposer,
            user,
            fee,
            tx_hash,
            log_index,
            block_number,
        } = value;

        proto::MsgTopupTx {
            signature: Some(proposer.into()),
            user: user.to_string(),
            fee: format_amount(fee),
            tx_hash: Bytes::copy_from_slice(&tx_hash),
            log_index,
            block_number,
        }
    }
}

impl TryFrom<proto::MsgWithdrawFeeTx> for WithdrawFeeTx {
    type Error = ParseError;

    fn try_from(value: proto::MsgWithdrawFeeTx) -> Result<Self, Self::Error> {
        let proto::MsgWithdrawFeeTx { signature, amount } = value;
        Ok(WithdrawFeeTx {
            proposer: signature.try_into()?,
            amount: parse_amount(&amount)?,
        })
    }
}

impl From<WithdrawFeeTx> for proto::MsgWithdrawFeeTx {
    fn from(value: WithdrawFeeTx) -> Self {
        let WithdrawFeeTx { proposer, amount } = value;
        proto::MsgWithdrawFeeTx {
            signature: Some(proposer.into()),
            amount: format_amount(amount),
        }
    }
}
