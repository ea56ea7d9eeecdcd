use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Decide whether to vote for a block proposed by someone else.
    #[instrument(skip(self, request), fields(height = %request.height))]
    pub async fn process_proposal(
        &self,
        request: request::ProcessProposal,
    ) -> Result<response::ProcessProposal, Report> {
        let mut txs = request.txs.iter();

        if self.carries_extended_commit(request.height).await? {
            let Some(commit_bytes) = txs.next() else {
                warn!("proposal is missing the extended commit");
                return Ok(response::ProcessProposal::Reject);
            };
            let commit = match ExtendedCommit::decode(commit_bytes) {
                Ok(commit) => commit,
                Err(e) => {
                    warn!(%e, "proposal carries a malformed extended commit");
                    return Ok(response::ProcessProposal::Reject);
                }
            };
            if let Err(e) = self.validate_extended_commit(request.height, &commit).await {
                warn!(%e, "proposal carries an invalid extended commit");
                return Ok(response::ProcessProposal::Reject);
            }
        }

        for tx_bytes in txs {
            if let Err(e) = AuthenticatedTx::from_proto(tx_bytes) {
                warn!(tx_hash = hex::encode(tx_hash(tx_bytes)), %e, "proposal carries an unauthenticated tx");
                return Ok(response::ProcessProposal::Reject);
            }
        }

        Ok(response::ProcessProposal::Accept)
    }
}
