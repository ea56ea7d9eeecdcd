use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Build the transactions of a block we propose.
    ///
    /// Once vote extensions have been collected for the previous block, they are injected as the
    /// first transaction; then come the mempool transactions which still authenticate, in order,
    /// for as long as they fit.
    #[instrument(skip(self, request), fields(height = %request.height))]
    pub async fn prepare_proposal(
        &self,
        request: request::PrepareProposal,
    ) -> Result<response::PrepareProposal, Report> {
        let max_tx_bytes = usize::try_from(request.max_tx_bytes).unwrap_or(0);
        let mut txs = Vec::new();
        let mut size = 0usize;

        if self.carries_extended_commit(request.height).await? {
            let local_last_commit = request
                .local_last_commit
                .as_ref()
                .ok_or_eyre("missing local last commit while vote extensions are enabled")?;
            let commit = Bytes::from(ExtendedCommit::from(local_last_commit).encode_to_vec());
            // The block cannot go without the commit, and CometBFT refuses oversized proposals.
            if commit.len() > max_tx_bytes {
                bail!(
                    "extended commit of {} bytes exceeds the {max_tx_bytes} bytes allowed for txs",
                    commit.len()
                );
            }
            size += commit.len();
            txs.push(commit);
        }

        for tx_bytes in request.txs {
            if let Err(e) = AuthenticatedTx::from_proto(&tx_bytes) {
                debug!(%e, "dropping unauthenticated tx from proposal");
                continue;
            }
            if size + tx_bytes.len() > max_tx_bytes {
                break;
            }
            size += tx_bytes.len();
            txs.push(tx_bytes);
        }

        Ok(response::PrepareProposal { txs })
    }
}
