use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Vote on the side transactions of the block being precommitted.
    ///
    /// Every side transaction gets a response: when its handler fails, the vote is NO.
    #[instrument(skip(self, request, caller), fields(height = %request.height))]
    pub async fn extend_vote(
        &self,
        request: request::ExtendVote,
        caller: &impl ContractCaller,
    ) -> Result<response::ExtendVote, Report> {
        let skip = usize::from(self.carries_extended_commit(request.height).await?);

        let mut seen = BTreeSet::new();
        let mut responses = Vec::new();
        for tx_bytes in request.txs.iter().skip(skip) {
            let Ok(tx) = AuthenticatedTx::from_proto(tx_bytes) else {
                continue;
            };
            if !tx.msg.is_side_tx() {
                continue;
            }
            let hash = tx_hash(tx_bytes);
            if !seen.insert(hash) {
                continue;
            }

            let vote = match self.side_handle_msg(&tx.msg, caller).await {
                Ok(vote) => vote,
                Err(e) => {
                    warn!(tx_hash = hex::encode(hash), %e, "side handler failed; voting no");
                    Vote::No
                }
            };
            debug!(tx_hash = hex::encode(hash), ?vote, "side tx vote");
            responses.push(SideTxResponse {
                tx_hash: hash,
                vote,
            });
        }

        let extension = VoteExtension {
            block_hash: Bytes::copy_from_slice(request.hash.as_bytes()),
            height: request.height.value(),
            responses,
        };
        info!(votes = extension.responses.len(), "extending vote");

        Ok(response::ExtendVote {
            vote_extension: extension.encode_to_vec().into(),
        })
    }
}
