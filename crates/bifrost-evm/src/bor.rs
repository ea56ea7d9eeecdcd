use alloy::{
    eips::BlockNumberOrTag,
    primitives::{B256, U64},
    rpc::{
        client::{ClientBuilder, RpcClient},
        types::{Block, Header},
    },
    transports::http::ReqwestTransport,
};
use reqwest::Url;

use crate::{CallerError, TxReceipt, retry_with_backoff};

/// Client for a Bor execution node, exposing the Bor-specific JSON-RPC methods along with the
/// standard ones validators need.
#[derive(Clone, Debug)]
pub struct BorClient {
    rpc: RpcClient<ReqwestTransport>,
    max_retries: usize,
}

impl BorClient {
    pub fn new(url: Url, max_retries: usize) -> Self {
        Self {
            rpc: ClientBuilder::default().http(url),
            max_retries,
        }
    }

    pub fn rpc(&self) -> &RpcClient<ReqwestTransport> {
        &self.rpc
    }

    /// The root hash of the headers in `start..=end`, as computed by Bor for checkpoints.
    pub async fn root_hash(&self, start: u64, end: u64) -> Result<String, CallerError> {
        Ok(retry_with_backoff(self.max_retries, || {
            self.rpc.request("bor_getRootHash", (start, end))
        })
        .await?)
    }

    /// Whether Bor agrees that `root_hash` is the hash of the milestone `start..=end`.
    pub async fn vote_on_hash(
        &self,
        start: u64,
        end: u64,
        root_hash: &str,
        milestone_id: &str,
    ) -> Result<bool, CallerError> {
        let params = (start, end, root_hash.to_string(), milestone_id.to_string());
        Ok(retry_with_backoff(self.max_retries, || {
            self.rpc.request("bor_getVoteOnHash", params.clone())
        })
        .await?)
    }

    /// The header of block `number`, or of the latest block if `None`.
    pub async fn header_by_number(&self, number: Option<u64>) -> Result<Option<Header>, CallerError> {
        let tag = number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number);
        let block: Option<Block> = retry_with_backoff(self.max_retries, || {
            self.rpc.request("eth_getBlockByNumber", (tag, false))
        })
        .await?;
        Ok(block.map(|block| block.header))
    }

    /// The latest block number.
    pub async fn block_number(&self) -> Result<u64, CallerError> {
        let head: U64 = retry_with_backoff(self.max_retries, || {
            self.rpc.request("eth_blockNumber", ())
        })
        .await?;
        Ok(head.to())
    }

    /// The receipt of a transaction, if it has been mined.
    pub async fn tx_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, CallerError> {
        let receipt: Option<alloy::rpc::types::TransactionReceipt> =
            retry_with_backoff(self.max_retries, || {
                self.rpc.request("eth_getTransactionReceipt", (tx_hash,))
            })
            .await?;
        match receipt {
            Some(receipt) if receipt.block_number.is_some() => Ok(Some(receipt.try_into()?)),
            _ => Ok(None),
        }
    }
}
