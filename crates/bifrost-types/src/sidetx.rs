//! Validator votes on side transactions, as carried in CometBFT vote extensions.

use bifrost_proto::{sidetx as proto, state as state_proto};
use prost::bytes::Bytes;
use serde::{Deserialize, Serialize};
use tendermint::{
    abci::types::{BlockSignatureInfo, ExtendedCommitInfo, ExtendedVoteInfo},
    block::BlockIdFlag,
};

use crate::{DomainType, ParseError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vote {
    Unspecified,
    Yes,
    No,
}

impl From<proto::Vote> for Vote {
    fn from(vote: proto::Vote) -> Self {
        match vote {
            proto::Vote::Unspecified => Vote::Unspecified,
            proto::Vote::Yes => Vote::Yes,
            proto::Vote::No => Vote::No,
        }
    }
}

impl From<Vote> for proto::Vote {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Unspecified => proto::Vote::Unspecified,
            Vote::Yes => proto::Vote::Yes,
            Vote::No => proto::Vote::No,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideTxResponse {
    pub tx_hash: [u8; 32],
    pub vote: Vote,
}

/// What a validator attaches to its precommit for a block: one vote per side transaction in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteExtension {
    pub block_hash: Bytes,
    pub height: u64,
    pub responses: Vec<SideTxResponse>,
}

impl DomainType for VoteExtension {
    type Proto = proto::VoteExtension;

    fn to_proto(&self) -> Self::Proto {
        proto::VoteExtension {
            block_hash: self.block_hash.clone(),
            height: self.height as i64,
            side_tx_responses: self
                .responses
                .iter()
                .map(|response| proto::SideTxResponse {
                    tx_hash: Bytes::copy_from_slice(&response.tx_hash),
                    result: proto::Vote::from(response.vote) as i32,
                })
                .collect(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        let height = u64::try_from(proto.height)
            .map_err(|_| ParseError::new::<VoteExtension>(format!("height {}", proto.height)))?;
        let responses = proto
            .side_tx_responses
            .into_iter()
            .map(|response| {
                let vote = proto::Vote::try_from(response.result)
                    .map_err(|_| ParseError::new::<Vote>(response.result.to_string()))?;
                Ok(SideTxResponse {
                    tx_hash: response.tx_hash.as_ref().try_into().map_err(|_| {
                        ParseError::new::<SideTxResponse>(hex::encode(&response.tx_hash))
                    })?,
                    vote: vote.into(),
                })
            })
            .collect::<Result<_, ParseError>>()?;
        Ok(VoteExtension {
            block_hash: proto.block_hash,
            height,
            responses,
        })
    }
}

/// How a validator's precommit was recorded in the commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteFlag {
    Absent,
    Commit,
    Nil,
}

impl From<VoteFlag> for i32 {
    fn from(flag: VoteFlag) -> Self {
        match flag {
            VoteFlag::Absent => 1,
            VoteFlag::Commit => 2,
            VoteFlag::Nil => 3,
        }
    }
}

impl TryFrom<i32> for VoteFlag {
    type Error = ParseError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteFlag::Absent),
            2 => Ok(VoteFlag::Commit),
            3 => Ok(VoteFlag::Nil),
            _ => Err(ParseError::new::<VoteFlag>(value.to_string())),
        }
    }
}

impl From<&BlockSignatureInfo> for VoteFlag {
    fn from(info: &BlockSignatureInfo) -> Self {
        match info {
            BlockSignatureInfo::Flag(BlockIdFlag::Absent) => VoteFlag::Absent,
            BlockSignatureInfo::Flag(BlockIdFlag::Commit) | BlockSignatureInfo::LegacySigned => {
                VoteFlag::Commit
            }
            BlockSignatureInfo::Flag(BlockIdFlag::Nil) => VoteFlag::Nil,
        }
    }
}

/// One validator's precommit, with its vote extension and the signature over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedVote {
    pub validator_address: [u8; 20],
    pub power: u64,
    pub flag: VoteFlag,
    pub vote_extension: Bytes,
    pub extension_signature: Bytes,
}

impl From<&ExtendedVoteInfo> for ExtendedVote {
    fn from(vote: &ExtendedVoteInfo) -> Self {
        ExtendedVote {
            validator_address: vote.validator.address,
            power: vote.validator.power.value(),
            flag: (&vote.sig_info).into(),
            vote_extension: vote.vote_extension.clone(),
            extension_signature: vote
                .extension_signature
                .as_ref()
                .map(|signature| Bytes::copy_from_slice(signature.as_bytes()))
                .unwrap_or_default(),
        }
    }
}

/// The extended commit of the previous block, which the proposer injects as the first
/// transaction of its block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedCommit {
    pub round: u32,
    pub votes: Vec<ExtendedVote>,
}

impl From<&ExtendedCommitInfo> for ExtendedCommit {
    fn from(info: &ExtendedCommitInfo) -> Self {
        ExtendedCommit {
            round: info.round.value(),
            votes: info.votes.iter().map(Into::into).collect(),
        }
    }
}

impl DomainType for ExtendedCommit {
    type Proto = proto::ExtendedCommit;

    fn to_proto(&self) -> Self::Proto {
        proto::ExtendedCommit {
            round: self.round as i32,
            votes: self
                .votes
                .iter()
                .map(|vote| proto::ExtendedVote {
                    validator_address: Bytes::copy_from_slice(&vote.validator_address),
                    power: vote.power as i64,
                    block_id_flag: vote.flag.into(),
                    vote_extension: vote.vote_extension.clone(),
                    extension_signature: vote.extension_signature.clone(),
                })
                .collect(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        let round = u32::try_from(proto.round)
            .map_err(|_| ParseError::new::<ExtendedCommit>(format!("round {}", proto.round)))?;
        let votes = proto
            .votes
            .into_iter()
            .map(|vote| {
                Ok(ExtendedVote {
                    validator_address: vote.validator_address.as_ref().try_into().map_err(
                        |_| ParseError::new::<ExtendedVote>(hex::encode(&vote.validator_address)),
                    )?,
                    power: u64::try_from(vote.power)
                        .map_err(|_| ParseError::new::<ExtendedVote>(vote.power.to_string()))?,
                    flag: vote.block_id_flag.try_into()?,
                    vote_extension: vote.vote_extension,
                    extension_signature: vote.extension_signature,
                })
            })
            .collect::<Result<_, ParseError>>()?;
        Ok(ExtendedCommit { round, votes })
    }
}

/// A side transaction included in a block, awaiting the votes carried by the next block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSideTx {
    pub tx_hash: [u8; 32],
    pub tx: Bytes,
}

impl DomainType for PendingSideTx {
    type Proto = state_proto::PendingSideTx;

    fn to_proto(&self) -> Self::Proto {
        state_proto::PendingSideTx {
            tx_hash: Bytes::copy_from_slice(&self.tx_hash),
            tx: self.tx.clone(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        Ok(PendingSideTx {
            tx_hash: proto
                .tx_hash
                .as_ref()
                .try_into()
                .map_err(|_| ParseError::new::<PendingSideTx>(hex::encode(&proto.tx_hash)))?,
            tx: proto.tx,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_vote_value_is_rejected() {
        let mut extension = VoteExtension {
            block_hash: Bytes::from_static(&[1; 32]),
            height: 5,
            responses: vec![SideTxResponse {
                tx_hash: [2; 32],
                vote: Vote::Yes,
            }],
        }
        .to_proto();
        extension.side_tx_responses[0].result = 7;
        assert!(VoteExtension::from_proto(extension).is_err());
    }

    #[test]
    fn short_tx_hash_is_rejected() {
        let mut extension = VoteExtension {
            block_hash: Bytes::new(),
            height: 5,
            responses: vec![SideTxResponse {
                tx_hash: [2; 32],
                vote: Vote::No,
            }],
        }
        .to_proto();
        extension.side_tx_responses[0].tx_hash = Bytes::from_static(&[2; 31]);
        assert!(VoteExtension::from_proto(extension).is_err());
    }

    #[test]
    fn unknown_block_id_flag_is_rejected() {
        let mut commit = ExtendedCommit {
            round: 0,
            votes: vec![ExtendedVote {
                validator_address: [3; 20],
                power: 10,
                flag: VoteFlag::Commit,
                vote_extension: Bytes::new(),
                extension_signature: Bytes::new(),
            }],
        }
        .to_proto();
        commit.votes[0].block_id_flag = 0;
        assert!(ExtendedCommit::from_proto(commit).is_err());
    }
}
