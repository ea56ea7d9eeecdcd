use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Deliver transaction bytes to the state, as the `index`th transaction of the current block.
    ///
    /// Side transactions only pass their state checks here; they are remembered as pending, to
    /// be applied once validators have voted on them.
    pub async fn deliver_tx(&mut self, index: usize, tx_bytes: &Bytes) -> Result<(), Report> {
        let tx = AuthenticatedTx::from_proto(tx_bytes)?;
        self.deliver_authenticated_tx(&tx).await?;

        if tx.msg.is_side_tx() {
            let height = self.block_height().await?;
            self.record_pending_side_tx(height, index, tx_bytes).await?;
            debug!(
                tx_hash = hex::encode(tx_hash(tx_bytes)),
                %height,
                index,
                "side tx pending"
            );
        }

        Ok(())
    }

    /// Check transaction bytes against the latest committed state, as a candidate for the next
    /// block. Only meaningful on a throwaway fork of the state.
    pub async fn check_tx(&mut self, tx_bytes: &Bytes) -> Result<(), Report> {
        let next_height = self.block_height().await?.increment();
        self.set_block_height(next_height).await?;
        let tx = AuthenticatedTx::from_proto(tx_bytes)?;
        self.deliver_authenticated_tx(&tx).await
    }

    /// Execute a transaction against the current state, without committing the results yet.
    async fn deliver_authenticated_tx(&mut self, tx: &AuthenticatedTx) -> Result<(), Report> {
        let Transaction { chain_id, msg } = &**tx;

        // First, check the chain ID to see if it matches the current chain ID.
        let current_chain_id = self.chain_id().await?;
        if *chain_id != current_chain_id {
            bail!(
                "transaction chain ID {} does not match current chain ID {}",
                chain_id.0,
                current_chain_id.0,
            );
        }

        msg.validate_basic()?;

        if msg.is_side_tx() && !self.side_txs_enabled_at(self.block_height().await?).await? {
            bail!(
                "{} is a side transaction, but vote extensions are not enabled",
                msg.type_url()
            );
        }

        match msg {
            Msg::TopupTx(topup) => self.create_topup_tx(topup).await,
            Msg::WithdrawFeeTx(withdraw) => self.withdraw_fee(withdraw).await,
        }
    }
}
