use super::*;

/// Assembles an unsigned transaction for a signer.
pub struct Builder {
    chain_id: ChainId,
    proposer: Signer,
}

impl Builder {
    pub fn new(chain_id: ChainId, proposer: impl Into<Signer>) -> Self {
        Self {
            chain_id,
            proposer: proposer.into(),
        }
    }

    fn build(self, msg: impl FnOnce(Signer) -> Msg) -> Transaction {
        Transaction {
            chain_id: self.chain_id,
            msg: msg(self.proposer),
        }
    }

    pub fn topup(
        self,
        user: Address,
        fee: u128,
        tx_hash: [u8; 32],
        log_index: u64,
        block_number: u64,
    ) -> Transaction {
        self.build(|proposer| {
            Msg::TopupTx(TopupTx {
                proposer,
                user,
                fee,
                tx_hash,
                log_index,
                block_number,
            })
        })
    }

    pub fn withdraw_fee(self, amount: u128) -> Transaction {
        self.build(|proposer| Msg::WithdrawFeeTx(WithdrawFeeTx { proposer, amount }))
    }
}
