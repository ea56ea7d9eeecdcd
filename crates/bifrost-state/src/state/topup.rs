use alloy::primitives::B256;
use bifrost_evm::{decode_topup_fee_event, merkle};

use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Whether the main chain event with this sequence has already been credited.
    pub async fn has_topup_sequence(&self, sequence: &TopupSequence) -> Result<bool, Report> {
        Ok(self
            .store
            .get::<()>(Topup, &format!("sequence/{}", util::pad_sequence(sequence)))
            .await?
            .is_some())
    }

    /// All credited sequences, in ascending order.
    pub async fn topup_sequences(&self) -> Result<Vec<TopupSequence>, Report> {
        collect(self.store.keys_with_prefix(Topup, "sequence/"))
            .await?
            .into_iter()
            .map(|key| util::unpad_sequence(key.trim_start_matches("sequence/")))
            .collect()
    }

    pub async fn dividend_account(&self, user: &Address) -> Result<Option<DividendAccount>, Report> {
        self.store
            .get::<DividendAccount>(Topup, &format!("dividend/{}", util::address_key(user)))
            .await
    }

    /// All dividend accounts, ordered by address.
    pub async fn dividend_accounts(&self) -> Result<Vec<DividendAccount>, Report> {
        Ok(collect(self.store.prefix::<DividendAccount>(Topup, "dividend/"))
            .await?
            .into_iter()
            .map(|(_, account)| account)
            .collect())
    }

    /// The merkle root committing to every dividend account.
    pub async fn dividend_account_root(&self) -> Result<B256, Report> {
        Ok(merkle::account_root(&self.dividend_accounts().await?))
    }

    /// The merkle proof of a user's dividend account, and the position of its leaf.
    pub async fn dividend_account_proof(
        &self,
        user: &Address,
    ) -> Result<(Vec<B256>, u64), Report> {
        merkle::account_proof(&self.dividend_accounts().await?, *user)
            .ok_or_else(|| eyre!("no dividend account for {user}"))
    }

    /// Whether `proof` proves the user's current dividend account against the current root.
    pub async fn verify_account_proof(&self, user: &Address, proof: &[u8]) -> Result<bool, Report> {
        let Some(proof) = merkle::split_proof(proof) else {
            return Ok(false);
        };
        let accounts = self.dividend_accounts().await?;
        let Some((_, index)) = merkle::account_proof(&accounts, *user) else {
            return Ok(false);
        };
        let Some(account) = accounts.iter().find(|account| account.user == *user) else {
            return Ok(false);
        };
        Ok(merkle::verify_account_proof(
            merkle::account_root(&accounts),
            account,
            index,
            &proof,
        ))
    }

    /// Accept a topup message into a block, checking it against the current state only.
    pub(crate) async fn create_topup_tx(&self, msg: &TopupTx) -> Result<(), Report> {
        msg.validate_basic()?;

        let config = self.config().await?;
        if msg.fee < config.topup.default_fee_wanted_per_tx {
            bail!(
                "topup fee {} is below the minimum of {}",
                msg.fee,
                config.topup.default_fee_wanted_per_tx
            );
        }

        if self.has_topup_sequence(&msg.sequence()).await? {
            bail!("old tx: sequence {} already processed", msg.sequence());
        }

        Ok(())
    }

    /// Check a topup message against the main chain, and vote on it.
    ///
    /// Votes YES only if the confirmed transaction succeeded and emitted a `TopUpFee` event from the
    /// staking info contract at the claimed log index, for the claimed user and fee, and the event
    /// has not been credited yet.
    #[instrument(skip_all, fields(sequence = %msg.sequence()))]
    pub(crate) async fn side_handle_topup_tx(
        &self,
        msg: &TopupTx,
        caller: &impl ContractCaller,
    ) -> Result<Vote, Report> {
        let config = self.config().await?;

        let receipt = caller
            .get_confirmed_tx_receipt(
                B256::from(msg.tx_hash),
                config.chain.main_chain_tx_confirmations,
            )
            .await?;
        let Some(receipt) = receipt else {
            debug!("no confirmed receipt");
            return Ok(Vote::No);
        };

        if !receipt.status {
            debug!("transaction reverted");
            return Ok(Vote::No);
        }

        if receipt.block_number != msg.block_number {
            debug!(receipt_block = receipt.block_number, "block number mismatch");
            return Ok(Vote::No);
        }

        let Some(event) =
            decode_topup_fee_event(&receipt, config.chain.staking_info_address, msg.log_index)
        else {
            debug!("no topup event at log index");
            return Ok(Vote::No);
        };

        if event.user != msg.user {
            debug!(event_user = %event.user, "user mismatch");
            return Ok(Vote::No);
        }

        if event.fee != msg.fee {
            debug!(event_fee = event.fee, "fee mismatch");
            return Ok(Vote::No);
        }

        if self.has_topup_sequence(&msg.sequence()).await? {
            debug!("sequence already processed");
            return Ok(Vote::No);
        }

        Ok(Vote::Yes)
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub(crate) async fn set_topup_sequence(&mut self, sequence: &TopupSequence) {
        self.store.put(
            Topup,
            &format!("sequence/{}", util::pad_sequence(sequence)),
            (),
        );
    }

    pub(crate) async fn set_dividend_account(&mut self, account: DividendAccount) {
        self.store.put(
            Topup,
            &format!("dividend/{}", util::address_key(&account.user)),
            account,
        );
    }

    /// Add to a user's dividend account, creating it if needed.
    pub(crate) async fn add_fee_to_dividend_account(
        &mut self,
        user: &Address,
        amount: u128,
    ) -> Result<(), Report> {
        let mut account = self
            .dividend_account(user)
            .await?
            .unwrap_or_else(|| DividendAccount::new(*user));
        account.fee_amount = account
            .fee_amount
            .checked_add(amount)
            .ok_or_eyre("dividend account overflow")?;
        self.set_dividend_account(account).await;
        Ok(())
    }

    /// Apply the consensus vote on a topup: on YES, credit the fee to the user, pay the proposer
    /// its share, and mark the event as processed. Any other vote changes nothing.
    #[instrument(skip_all, fields(sequence = %msg.sequence(), ?vote))]
    pub(crate) async fn post_handle_topup_tx(
        &mut self,
        msg: &TopupTx,
        vote: Vote,
    ) -> Result<(), Report> {
        if vote != Vote::Yes {
            debug!("topup not approved; skipping");
            return Ok(());
        }

        let sequence = msg.sequence();
        if self.has_topup_sequence(&sequence).await? {
            bail!("old tx: sequence {sequence} already processed");
        }

        let proposer = msg.proposer.address();
        let proposer_fee = self.config().await?.topup.default_fee_wanted_per_tx;
        let user_balance = self.balance(&msg.user).await?;
        if user_balance.saturating_add(msg.fee) < proposer_fee {
            bail!("topup fee {} cannot cover proposer fee {proposer_fee}", msg.fee);
        }

        self.mint(&msg.user, msg.fee).await?;
        if proposer_fee > 0 {
            self.transfer(&msg.user, &proposer, proposer_fee).await?;
        }
        self.set_topup_sequence(&sequence).await;

        info!(user = %msg.user, fee = msg.fee, %proposer, "topup credited");
        Ok(())
    }

    /// Move fees from the proposer's balance into its dividend account; zero means everything.
    #[instrument(skip_all, fields(user = %msg.proposer.address(), amount = msg.amount))]
    pub(crate) async fn withdraw_fee(&mut self, msg: &WithdrawFeeTx) -> Result<(), Report> {
        msg.validate_basic()?;

        let user = msg.proposer.address();
        let balance = self.balance(&user).await?;
        if balance == 0 {
            bail!("no fee balance to withdraw for {user}");
        }

        let amount = if msg.amount == 0 { balance } else { msg.amount };
        if amount > balance {
            bail!("insufficient fee balance: {user} has {balance}, requested {amount}");
        }

        self.burn(&user, amount).await?;
        self.add_fee_to_dividend_account(&user, amount).await?;

        info!(amount, "fee withdrawn");
        Ok(())
    }
}
