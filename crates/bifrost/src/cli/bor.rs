use alloy::primitives::B256;
use bifrost_evm::{BorClient, DEFAULT_MAX_RETRIES, fees::Eip1559Fees};
use bifrost_types::parse_amount;
use color_eyre::eyre::eyre;
use reqwest::Url;

use super::Run;

#[derive(clap::Args)]
pub struct Endpoint {
    /// JSON-RPC endpoint of the Bor node.
    #[clap(long, env = "BIFROST_BOR_RPC_URL", default_value = "http://localhost:8545")]
    pub bor_rpc_url: Url,
}

impl Endpoint {
    fn client(self) -> BorClient {
        BorClient::new(self.bor_rpc_url, DEFAULT_MAX_RETRIES)
    }
}

#[derive(clap::Subcommand)]
pub enum Bor {
    /// Print the root hash Bor computes over the headers of a block range.
    RootHash {
        /// First block of the range.
        start: u64,
        /// Last block of the range, inclusive.
        end: u64,
        #[clap(flatten)]
        endpoint: Endpoint,
    },
    /// Ask Bor whether it agrees with a milestone's root hash.
    VoteOnHash {
        start: u64,
        end: u64,
        root_hash: String,
        milestone_id: String,
        #[clap(flatten)]
        endpoint: Endpoint,
    },
    /// Print a block header as JSON.
    Header {
        /// Block number (defaults to the latest block).
        number: Option<u64>,
        #[clap(flatten)]
        endpoint: Endpoint,
    },
    /// Print the receipt of a mined transaction.
    Receipt {
        tx_hash: B256,
        #[clap(flatten)]
        endpoint: Endpoint,
    },
    /// Print EIP-1559 fee parameters for a transaction sent now.
    Fees {
        /// Upper bound on the max fee per gas, in wei.
        #[clap(long, value_parser = parse_amount)]
        max_fee_cap: Option<u128>,
        #[clap(flatten)]
        endpoint: Endpoint,
    },
    /// Print the latest block number.
    BlockNumber {
        #[clap(flatten)]
        endpoint: Endpoint,
    },
}

impl Run for Bor {
    async fn run(self) -> color_eyre::Result<()> {
        match self {
            Bor::RootHash {
                start,
                end,
                endpoint,
            } => {
                if start > end {
                    return Err(eyre!("empty block range {start}..={end}"));
                }
                println!("{}", endpoint.client().root_hash(start, end).await?);
            }
            Bor::VoteOnHash {
                start,
                end,
                root_hash,
                milestone_id,
                endpoint,
            } => {
                let vote = endpoint
                    .client()
                    .vote_on_hash(start, end, &root_hash, &milestone_id)
                    .await?;
                println!("{vote}");
            }
            Bor::Header { number, endpoint } => {
                let header = endpoint
                    .client()
                    .header_by_number(number)
                    .await?
                    .ok_or_else(|| match number {
                        Some(number) => eyre!("no block {number}"),
                        None => eyre!("no latest block"),
                    })?;
                println!("{}", serde_json::to_string_pretty(&header)?);
            }
            Bor::Receipt { tx_hash, endpoint } => {
                let receipt = endpoint
                    .client()
                    .tx_receipt(tx_hash)
                    .await?
                    .ok_or_else(|| eyre!("transaction {tx_hash} is not mined"))?;
                println!("{receipt:#?}");
            }
            Bor::Fees {
                max_fee_cap,
                endpoint,
            } => {
                let client = endpoint.client();
                let fees = Eip1559Fees::estimate(client.rpc(), max_fee_cap).await?;
                println!("max_fee_per_gas: {}", fees.max_fee_per_gas);
                println!("max_priority_fee_per_gas: {}", fees.max_priority_fee_per_gas);
            }
            Bor::BlockNumber { endpoint } => {
                println!("{}", endpoint.client().block_number().await?);
            }
        }

        Ok(())
    }
}
