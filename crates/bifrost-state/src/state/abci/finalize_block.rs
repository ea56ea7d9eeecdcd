use std::num::NonZero;

use super::*;
use tendermint::abci::{Code, types::ExecTxResult};

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Finalize a block by processing all transactions and returning the app hash.
    /// This replaces BeginBlock, DeliverTx (for all txs), and EndBlock in ABCI 2.0.
    #[instrument(skip_all, fields(height = %request.height))]
    pub async fn finalize_block(
        &mut self,
        request: request::FinalizeBlock,
    ) -> Result<response::FinalizeBlock, Report> {
        let request::FinalizeBlock {
            txs,
            misbehavior,
            hash,
            height,
            time,
            ..
        } = request;

        // Apply the votes on the previous block's side transactions, carried by the first tx:
        let carries_commit = self.carries_extended_commit(height).await?;
        if carries_commit {
            let commit_bytes = txs
                .first()
                .ok_or_eyre("block is missing the extended commit")?;
            let commit = ExtendedCommit::decode(commit_bytes)
                .map_err(|e| eyre!("block carries a malformed extended commit: {e}"))?;
            self.validate_extended_commit(height, &commit).await?;
            self.apply_side_tx_votes(height, &commit).await?;
        }

        // Tombstone byzantine validators
        let mut validator_updates = Vec::new();
        for evidence in misbehavior {
            if let Some(update) = self.tombstone_validator(height, evidence).await? {
                validator_updates.push(update);
            }
        }

        // Record the current block height, hash and time:
        self.set_block_height(height).await?;
        self.set_block_time(time).await?;
        self.set_last_block_hash(hash.as_bytes()).await?;

        let mut tx_results = Vec::new();
        for (index, tx_bytes) in txs.iter().enumerate() {
            let result = if carries_commit && index == 0 {
                Ok(())
            } else {
                self.deliver_tx(index, tx_bytes).await
            };
            let result = match result {
                Ok(()) => ExecTxResult {
                    code: Code::Ok,
                    data: Bytes::new(),
                    log: String::new(),
                    info: String::new(),
                    gas_wanted: 0,
                    gas_used: 0,
                    events: vec![],
                    codespace: String::new(),
                },
                Err(e) => {
                    warn!(index, %e, "transaction failed in finalize_block");
                    ExecTxResult {
                        code: Code::Err(NonZero::new(1).expect("1 != 0")),
                        data: Bytes::new(),
                        log: e.to_string(),
                        info: String::new(),
                        gas_wanted: 0,
                        gas_used: 0,
                        events: vec![],
                        codespace: String::new(),
                    }
                }
            };
            tx_results.push(result);
        }

        Ok(response::FinalizeBlock {
            tx_results,
            validator_updates,
            consensus_param_updates: None,
            app_hash: Default::default(), // This gets filled in by the caller!
            events: vec![],
        })
    }
}
