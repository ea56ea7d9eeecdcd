//! Side transactions: messages whose effects depend on the main chain, applied only once a
//! supermajority of validators has voted on them in the vote extensions of the following block.

use bifrost_proto::sidetx::verify_vote_extension_signature;
use bifrost_types::sidetx::VoteFlag;

use super::*;

/// Decode a vote extension received for the block at `height` with hash `block_hash`, and check
/// that it is well formed: it names that block, votes at most once per transaction, and never
/// abstains.
///
/// Shared by VerifyVoteExtension and the extended commit check.
pub fn verify_vote_extension(
    height: Height,
    block_hash: &[u8],
    bytes: &[u8],
) -> Result<VoteExtension, Report> {
    let extension = VoteExtension::decode(bytes)?;

    if extension.height != height.value() {
        bail!(
            "vote extension is for height {}, expected {height}",
            extension.height
        );
    }

    if extension.block_hash.as_ref() != block_hash {
        bail!(
            "vote extension is for block {}, expected {}",
            hex::encode(&extension.block_hash),
            hex::encode(block_hash)
        );
    }

    let mut seen = BTreeSet::new();
    for SideTxResponse { tx_hash, vote } in &extension.responses {
        if !seen.insert(*tx_hash) {
            bail!("duplicate vote for side tx {}", hex::encode(tx_hash));
        }
        if *vote == Vote::Unspecified {
            bail!("unspecified vote for side tx {}", hex::encode(tx_hash));
        }
    }

    Ok(extension)
}

/// Count the votes of the extended commit on each pending side transaction.
///
/// A transaction is decided YES or NO once the power voting that way reaches two thirds of the
/// total power plus one; undecided transactions are absent from the result. Only votes committed
/// for the block, from validators known to the state, are counted, each with the power the state
/// gives it.
pub fn tally(
    commit: &ExtendedCommit,
    validators: &BTreeMap<[u8; 20], ActiveValidator>,
    pending: &[PendingSideTx],
) -> BTreeMap<[u8; 32], Vote> {
    let total: u128 = validators.values().map(|v| u128::from(v.power)).sum();
    let threshold = total * 2 / 3 + 1;

    let pending_hashes: BTreeSet<[u8; 32]> = pending.iter().map(|tx| tx.tx_hash).collect();
    let mut yes: BTreeMap<[u8; 32], u128> = BTreeMap::new();
    let mut no: BTreeMap<[u8; 32], u128> = BTreeMap::new();
    let mut counted = BTreeSet::new();

    for vote in &commit.votes {
        if vote.flag != VoteFlag::Commit {
            continue;
        }
        let Some(validator) = validators.get(&vote.validator_address) else {
            continue;
        };
        // One extension per validator.
        if !counted.insert(vote.validator_address) {
            continue;
        }
        let Ok(extension) = VoteExtension::decode(&vote.vote_extension) else {
            continue;
        };

        let mut voted = BTreeSet::new();
        for response in extension.responses {
            if !pending_hashes.contains(&response.tx_hash) || !voted.insert(response.tx_hash) {
                continue;
            }
            let tally = match response.vote {
                Vote::Yes => &mut yes,
                Vote::No => &mut no,
                Vote::Unspecified => continue,
            };
            *tally.entry(response.tx_hash).or_default() += u128::from(validator.power);
        }
    }

    let mut results = BTreeMap::new();
    for tx_hash in pending_hashes {
        if yes.get(&tx_hash).copied().unwrap_or(0) >= threshold {
            results.insert(tx_hash, Vote::Yes);
        } else if no.get(&tx_hash).copied().unwrap_or(0) >= threshold {
            results.insert(tx_hash, Vote::No);
        }
    }
    results
}

fn pending_key(height: Height, index: usize) -> String {
    format!("pending/{}/{index:010}", util::pad_height(height))
}

impl<S: StateReadExt + 'static> State<S> {
    /// The side transactions included in the block at `height`, in inclusion order.
    pub async fn pending_side_txs(&self, height: Height) -> Result<Vec<PendingSideTx>, Report> {
        Ok(collect(
            self.store
                .prefix::<PendingSideTx>(SideTx, &format!("pending/{}/", util::pad_height(height))),
        )
        .await?
        .into_iter()
        .map(|(_, tx)| tx)
        .collect())
    }

    /// Check the extended commit injected into the block at `height`, which carries the votes on
    /// the side transactions of the block before it.
    pub async fn validate_extended_commit(
        &self,
        height: Height,
        commit: &ExtendedCommit,
    ) -> Result<(), Report> {
        let Some(voted_height) = height.value().checked_sub(1).filter(|h| *h > 0) else {
            bail!("no block precedes height {height}");
        };
        let voted_height = Height::try_from(voted_height)?;
        let chain_id = self.chain_id().await?;
        let validators = self.validators_at(voted_height).await?;
        let last_block_hash = self
            .last_block_hash()
            .await?
            .ok_or_eyre("no block hash recorded for the previous block")?;

        let total: u128 = validators.values().map(|v| u128::from(v.power)).sum();
        let mut committed: u128 = 0;
        let mut seen = BTreeSet::new();

        for vote in &commit.votes {
            let address = hex::encode(vote.validator_address);
            if !seen.insert(vote.validator_address) {
                bail!("validator {address} appears twice in extended commit");
            }
            let Some(validator) = validators.get(&vote.validator_address) else {
                bail!("unknown validator {address} in extended commit");
            };

            if vote.flag != VoteFlag::Commit {
                continue;
            }

            verify_vote_extension_signature(
                &chain_id.0,
                i64::try_from(voted_height.value())?,
                i64::from(commit.round),
                &vote.vote_extension,
                &validator.public_key,
                &vote.extension_signature,
            )
            .map_err(|_| eyre!("invalid vote extension signature from validator {address}"))?;

            verify_vote_extension(voted_height, &last_block_hash, &vote.vote_extension)
                .map_err(|e| eyre!("invalid vote extension from validator {address}: {e}"))?;

            committed += u128::from(validator.power);
        }

        if committed * 3 <= total * 2 {
            bail!("extended commit has {committed} of {total} voting power; need more than 2/3");
        }

        Ok(())
    }

    /// Run the side handler of a message: check it against the main chain and vote on it.
    pub async fn side_handle_msg(
        &self,
        msg: &Msg,
        caller: &impl ContractCaller,
    ) -> Result<Vote, Report> {
        match msg {
            Msg::TopupTx(topup) => self.side_handle_topup_tx(topup, caller).await,
            Msg::WithdrawFeeTx(_) => bail!("{} is not a side transaction", msg.type_url()),
        }
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Remember a side transaction included at `height`, to apply once it has been voted on.
    pub(crate) async fn record_pending_side_tx(
        &mut self,
        height: Height,
        index: usize,
        tx: &Bytes,
    ) -> Result<(), Report> {
        self.store.put(
            SideTx,
            &pending_key(height, index),
            PendingSideTx {
                tx_hash: tx_hash(tx),
                tx: tx.clone(),
            },
        );
        Ok(())
    }

    pub(crate) async fn clear_pending_side_txs(&mut self, height: Height) -> Result<(), Report> {
        let keys = collect(
            self.store
                .keys_with_prefix(SideTx, &format!("pending/{}/", util::pad_height(height))),
        )
        .await?;
        for key in keys {
            self.store.remove(SideTx, &key);
        }
        Ok(())
    }

    /// Run the post handler of a message with the vote consensus reached on it.
    pub(crate) async fn post_handle_msg(&mut self, msg: &Msg, vote: Vote) -> Result<(), Report> {
        match msg {
            Msg::TopupTx(topup) => self.post_handle_topup_tx(topup, vote).await,
            Msg::WithdrawFeeTx(_) => bail!("{} is not a side transaction", msg.type_url()),
        }
    }

    /// Tally the votes of the extended commit carried by the block at `height`, and apply the
    /// decided side transactions of the previous block, in the order they were included.
    #[instrument(skip(self, commit))]
    pub(crate) async fn apply_side_tx_votes(
        &mut self,
        height: Height,
        commit: &ExtendedCommit,
    ) -> Result<(), Report> {
        let voted_height = Height::try_from(height.value() - 1)?;
        let validators = self.validators_at(voted_height).await?;
        let pending = self.pending_side_txs(voted_height).await?;
        let results = tally(commit, &validators, &pending);

        for PendingSideTx { tx_hash, tx } in &pending {
            let hash = hex::encode(tx_hash);
            let Some(vote) = results.get(tx_hash).copied() else {
                info!(tx_hash = %hash, "side tx did not reach a supermajority; skipping");
                continue;
            };
            let tx = match AuthenticatedTx::from_proto(tx) {
                Ok(tx) => tx,
                Err(e) => {
                    warn!(tx_hash = %hash, %e, "pending side tx no longer decodes");
                    continue;
                }
            };
            match self.post_handle_msg(&tx.msg, vote).await {
                Ok(()) => info!(tx_hash = %hash, ?vote, "side tx applied"),
                Err(e) => warn!(tx_hash = %hash, ?vote, %e, "side tx post handler failed"),
            }
        }

        self.clear_pending_side_txs(voted_height).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bifrost_types::sidetx::ExtendedVote;
    use proptest::prelude::*;

    fn validator(byte: u8, power: u64) -> ActiveValidator {
        ActiveValidator {
            address: [byte; 20],
            public_key: vec![byte; 32],
            power,
        }
    }

    fn vote(address: u8, flag: VoteFlag, responses: &[([u8; 32], Vote)]) -> ExtendedVote {
        let extension = VoteExtension {
            block_hash: Bytes::from_static(&[9; 32]),
            height: 1,
            responses: responses
                .iter()
                .map(|(tx_hash, vote)| SideTxResponse {
                    tx_hash: *tx_hash,
                    vote: *vote,
                })
                .collect(),
        };
        ExtendedVote {
            validator_address: [address; 20],
            power: 1,
            flag,
            vote_extension: extension.encode_to_vec().into(),
            extension_signature: Bytes::new(),
        }
    }

    fn pending(byte: u8) -> PendingSideTx {
        PendingSideTx {
            tx_hash: [byte; 32],
            tx: Bytes::new(),
        }
    }

    fn validators(powers: &[u64]) -> BTreeMap<[u8; 20], ActiveValidator> {
        powers
            .iter()
            .enumerate()
            .map(|(i, power)| {
                let v = validator(i as u8, *power);
                (v.address, v)
            })
            .collect()
    }

    #[test]
    fn supermajority_yes_is_decided() {
        let validators = validators(&[10, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(1, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(2, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
            ],
        };
        let results = tally(&commit, &validators, &[pending(1)]);
        assert_eq!(results.get(&[1; 32]), Some(&Vote::Yes));
    }

    #[test]
    fn exactly_two_thirds_is_not_enough() {
        // total 30, threshold 21: two validators of 10 do not decide
        let validators = validators(&[10, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(1, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(2, VoteFlag::Commit, &[([1; 32], Vote::No)]),
            ],
        };
        assert!(tally(&commit, &validators, &[pending(1)]).is_empty());
    }

    #[test]
    fn supermajority_no_is_decided() {
        let validators = validators(&[1, 10, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(1, VoteFlag::Commit, &[([1; 32], Vote::No)]),
                vote(2, VoteFlag::Commit, &[([1; 32], Vote::No)]),
                vote(3, VoteFlag::Commit, &[([1; 32], Vote::No)]),
            ],
        };
        let results = tally(&commit, &validators, &[pending(1)]);
        assert_eq!(results.get(&[1; 32]), Some(&Vote::No));
    }

    #[test]
    fn ignored_votes() {
        let validators = validators(&[10, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes), ([2; 32], Vote::Yes)]),
                // not committed for the block
                vote(1, VoteFlag::Nil, &[([1; 32], Vote::Yes)]),
                // unknown validator
                vote(7, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(2, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
            ],
        };
        let results = tally(&commit, &validators, &[pending(1)]);
        assert!(results.is_empty());
    }

    #[test]
    fn repeated_validator_counts_once() {
        let validators = validators(&[10, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
            ],
        };
        assert!(tally(&commit, &validators, &[pending(1)]).is_empty());
    }

    #[test]
    fn tombstoned_validator_has_no_weight() {
        let validators = validators(&[0, 10, 10]);
        let commit = ExtendedCommit {
            round: 0,
            votes: vec![
                vote(0, VoteFlag::Commit, &[([1; 32], Vote::No)]),
                vote(1, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
                vote(2, VoteFlag::Commit, &[([1; 32], Vote::Yes)]),
            ],
        };
        let results = tally(&commit, &validators, &[pending(1)]);
        assert_eq!(results.get(&[1; 32]), Some(&Vote::Yes));
    }

    #[test]
    fn extension_checks() {
        let height = Height::from(5u32);
        let hash = [5; 32];
        let good = VoteExtension {
            block_hash: Bytes::copy_from_slice(&hash),
            height: 5,
            responses: vec![
                SideTxResponse {
                    tx_hash: [1; 32],
                    vote: Vote::Yes,
                },
                SideTxResponse {
                    tx_hash: [2; 32],
                    vote: Vote::No,
                },
            ],
        };
        assert!(verify_vote_extension(height, &hash, &good.encode_to_vec()).is_ok());

        let mut wrong_height = good.clone();
        wrong_height.height = 4;
        assert!(verify_vote_extension(height, &hash, &wrong_height.encode_to_vec()).is_err());

        assert!(verify_vote_extension(height, &[6; 32], &good.encode_to_vec()).is_err());
        let mut unbound = good.clone();
        unbound.block_hash = Bytes::new();
        assert!(verify_vote_extension(height, &hash, &unbound.encode_to_vec()).is_err());

        let mut duplicate = good.clone();
        duplicate.responses[1].tx_hash = [1; 32];
        assert!(verify_vote_extension(height, &hash, &duplicate.encode_to_vec()).is_err());

        let mut unspecified = good.clone();
        unspecified.responses[0].vote = Vote::Unspecified;
        assert!(verify_vote_extension(height, &hash, &unspecified.encode_to_vec()).is_err());

        assert!(verify_vote_extension(height, &hash, b"\xff\xff").is_err());
    }

    proptest! {
        #[test]
        fn decisions_need_a_supermajority(
            powers in prop::collection::vec(0u64..1_000, 1..8),
            votes in prop::collection::vec(prop::option::of(any::<bool>()), 8),
        ) {
            let validators = validators(&powers);
            let commit = ExtendedCommit {
                round: 0,
                votes: validators
                    .keys()
                    .zip(&votes)
                    .filter_map(|(address, vote_yes)| {
                        let v = if (*vote_yes)? { Vote::Yes } else { Vote::No };
                        Some(vote(address[0], VoteFlag::Commit, &[([1; 32], v)]))
                    })
                    .collect(),
            };

            let total: u128 = powers.iter().map(|p| u128::from(*p)).sum();
            let power_for = |want: bool| -> u128 {
                validators
                    .values()
                    .zip(&votes)
                    .filter(|(_, vote_yes)| **vote_yes == Some(want))
                    .map(|(v, _)| u128::from(v.power))
                    .sum()
            };

            let results = tally(&commit, &validators, &[pending(1)]);
            match results.get(&[1; 32]) {
                Some(Vote::Yes) => prop_assert!(power_for(true) * 3 > total * 2),
                Some(Vote::No) => prop_assert!(power_for(false) * 3 > total * 2),
                Some(Vote::Unspecified) => prop_assert!(false),
                None => {
                    prop_assert!(power_for(true) < total * 2 / 3 + 1);
                    prop_assert!(power_for(false) < total * 2 / 3 + 1);
                }
            }

            // Votes for transactions that are not pending never appear.
            prop_assert!(tally(&commit, &validators, &[pending(2)]).is_empty());
        }
    }
}
