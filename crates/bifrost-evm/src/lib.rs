//! Access to the main chain: transaction receipts, topup events, fees, and the Bor execution
//! client, plus the merkle commitment over dividend accounts which main chain contracts verify.

#[macro_use]
extern crate tracing;

mod retry;
pub use retry::retry_with_backoff;

mod caller;
pub use caller::{CallerError, ContractCaller, EvmContractCaller, ReceiptLog, TxReceipt};

mod event;
pub use event::{TopupFeeEvent, decode_topup_fee_event};

mod bor;
pub use bor::BorClient;

pub mod fees;
pub mod merkle;

/// How many times a main chain request is retried before giving up.
pub const DEFAULT_MAX_RETRIES: usize = 5;
