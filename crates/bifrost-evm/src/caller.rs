use std::{future::Future, num::NonZeroUsize, sync::Arc};

use alloy::{
    primitives::{Address, B256, Bytes, U64},
    rpc::{
        client::{ClientBuilder, RpcClient},
        types::TransactionReceipt,
    },
    transports::{TransportError, http::ReqwestTransport},
};
use lru::LruCache;
use reqwest::Url;
use tokio::sync::Mutex;

use crate::retry_with_backoff;

#[derive(thiserror::Error, Debug)]
pub enum CallerError {
    #[error("main chain request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("receipt for {0} has no block number")]
    PendingReceipt(B256),
}

/// The parts of a main chain transaction receipt which side handlers look at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub status: bool,
    pub logs: Vec<ReceiptLog>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub log_index: u64,
}

impl TryFrom<TransactionReceipt> for TxReceipt {
    type Error = CallerError;

    fn try_from(receipt: TransactionReceipt) -> Result<Self, Self::Error> {
        let block_number = receipt
            .block_number
            .ok_or(CallerError::PendingReceipt(receipt.transaction_hash))?;

        let logs = receipt
            .inner
            .logs()
            .iter()
            .enumerate()
            .map(|(i, log)| ReceiptLog {
                address: log.inner.address,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
                log_index: log.log_index.unwrap_or(i as u64),
            })
            .collect();

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number,
            status: receipt.inner.status(),
            logs,
        })
    }
}

/// Read access to the main chain, as needed to check side transactions.
pub trait ContractCaller: Send + Sync {
    /// The receipt of a transaction, if it is known and has at least `confirmations` blocks
    /// built on top of it.
    fn get_confirmed_tx_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
    ) -> impl Future<Output = Result<Option<TxReceipt>, CallerError>> + Send;

    /// The main chain block which included a transaction, if it is known.
    fn get_main_chain_tx_block_number(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<u64>, CallerError>> + Send;
}

impl<C: ContractCaller> ContractCaller for Arc<C> {
    fn get_confirmed_tx_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
    ) -> impl Future<Output = Result<Option<TxReceipt>, CallerError>> + Send {
        (**self).get_confirmed_tx_receipt(tx_hash, confirmations)
    }

    fn get_main_chain_tx_block_number(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<u64>, CallerError>> + Send {
        (**self).get_main_chain_tx_block_number(tx_hash)
    }
}

/// A [`ContractCaller`] talking JSON-RPC to a main chain node over HTTP.
///
/// Confirmed receipts never change, so they are kept in an LRU cache.
pub struct EvmContractCaller {
    rpc: RpcClient<ReqwestTransport>,
    receipts: Mutex<LruCache<B256, TxReceipt>>,
    max_retries: usize,
}

impl EvmContractCaller {
    pub fn new(url: Url, receipt_cache_size: usize, max_retries: usize) -> Self {
        let capacity = NonZeroUsize::new(receipt_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            rpc: ClientBuilder::default().http(url),
            receipts: Mutex::new(LruCache::new(capacity)),
            max_retries,
        }
    }

    /// The underlying JSON-RPC client.
    pub fn rpc(&self) -> &RpcClient<ReqwestTransport> {
        &self.rpc
    }

    /// The latest main chain block number.
    pub async fn block_number(&self) -> Result<u64, CallerError> {
        let head: U64 = retry_with_backoff(self.max_retries, || {
            self.rpc.request("eth_blockNumber", ())
        })
        .await?;
        Ok(head.to())
    }

    /// Fetch a receipt from the node, bypassing the cache.
    async fn fetch_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, CallerError> {
        let receipt: Option<TransactionReceipt> = retry_with_backoff(self.max_retries, || {
            self.rpc.request("eth_getTransactionReceipt", (tx_hash,))
        })
        .await?;

        match receipt {
            // A receipt without a block number is not mined yet, as far as we are concerned:
            Some(receipt) if receipt.block_number.is_some() => Ok(Some(receipt.try_into()?)),
            _ => Ok(None),
        }
    }
}

impl ContractCaller for EvmContractCaller {
    #[instrument(skip(self))]
    async fn get_confirmed_tx_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
    ) -> Result<Option<TxReceipt>, CallerError> {
        let cached = self.receipts.lock().await.get(&tx_hash).cloned();
        if let Some(receipt) = cached {
            debug!("receipt cache hit");
            return Ok(Some(receipt));
        }

        let Some(receipt) = self.fetch_receipt(tx_hash).await? else {
            debug!("receipt not found");
            return Ok(None);
        };

        let head = self.block_number().await?;
        if head.saturating_sub(receipt.block_number) < confirmations {
            debug!(
                head,
                receipt_block = receipt.block_number,
                "not enough confirmations"
            );
            return Ok(None);
        }

        self.receipts.lock().await.put(tx_hash, receipt.clone());
        Ok(Some(receipt))
    }

    #[instrument(skip(self))]
    async fn get_main_chain_tx_block_number(
        &self,
        tx_hash: B256,
    ) -> Result<Option<u64>, CallerError> {
        if let Some(receipt) = self.receipts.lock().await.get(&tx_hash) {
            return Ok(Some(receipt.block_number));
        }
        Ok(self
            .fetch_receipt(tx_hash)
            .await?
            .map(|receipt| receipt.block_number))
    }
}
