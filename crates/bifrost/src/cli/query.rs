//! Query subcommands for interacting with the bifrost query server.

use bifrost_types::{
    Address,
    config::Config as ChainConfig,
    response::{
        AccountProofResponse, BalanceResponse, DividendAccountRootResponse, ErrorResponse,
        IsOldTxResponse, ResponseWithHeight, TopupSequenceResponse, VerifyAccountProofResponse,
    },
    topup::DividendAccount,
};
use color_eyre::eyre::eyre;
use reqwest::Url;
use serde::{Serialize, de::DeserializeOwned};

use super::Run;

#[derive(clap::Args)]
pub struct Query {
    /// Bifrost query server URL.
    #[clap(long, visible_alias = "node-url", default_value = "http://localhost:1317")]
    pub query_url: Url,

    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(clap::Subcommand)]
pub enum QueryCommand {
    /// Query current chain configuration.
    Config,
    /// Query whether the main chain event at a block and log index was credited.
    Sequence {
        #[clap(long)]
        block_number: u64,
        #[clap(long)]
        log_index: u64,
    },
    /// Query whether the event at a log index of a main chain transaction was credited.
    IsOldTx {
        #[clap(long)]
        tx_hash: String,
        #[clap(long)]
        log_index: u64,
    },
    /// Query the dividend account of a user.
    DividendAccount { address: Address },
    /// Query every dividend account.
    DividendAccounts,
    /// Query the merkle root over all dividend accounts.
    DividendAccountRoot,
    /// Query the merkle proof of a user's dividend account.
    AccountProof { address: Address },
    /// Check a merkle proof of a user's dividend account against the current root.
    VerifyAccountProof {
        address: Address,
        /// Hex-encoded concatenated sibling hashes.
        #[clap(long)]
        proof: String,
    },
    /// Query the balance of an account.
    Balance { address: Address },
}

impl Run for Query {
    async fn run(self) -> color_eyre::Result<()> {
        let client = QueryClient {
            url: self.query_url,
            http: reqwest::Client::new(),
        };

        match self.command {
            QueryCommand::Config => client.print::<ChainConfig>("/config", &[]).await,
            QueryCommand::Sequence {
                block_number,
                log_index,
            } => {
                client
                    .print::<TopupSequenceResponse>(
                        "/topup/sequence",
                        &[
                            ("block_number", block_number.to_string()),
                            ("log_index", log_index.to_string()),
                        ],
                    )
                    .await
            }
            QueryCommand::IsOldTx { tx_hash, log_index } => {
                client
                    .print::<IsOldTxResponse>(
                        "/topup/isoldtx",
                        &[("tx_hash", tx_hash), ("log_index", log_index.to_string())],
                    )
                    .await
            }
            QueryCommand::DividendAccount { address } => {
                client
                    .print::<DividendAccount>(&format!("/topup/dividend-account/{address}"), &[])
                    .await
            }
            QueryCommand::DividendAccounts => {
                client
                    .print::<Vec<DividendAccount>>("/topup/dividend-accounts", &[])
                    .await
            }
            QueryCommand::DividendAccountRoot => {
                client
                    .print::<DividendAccountRootResponse>("/topup/dividend-account-root", &[])
                    .await
            }
            QueryCommand::AccountProof { address } => {
                client
                    .print::<AccountProofResponse>(&format!("/topup/account-proof/{address}"), &[])
                    .await
            }
            QueryCommand::VerifyAccountProof { address, proof } => {
                client
                    .print::<VerifyAccountProofResponse>(
                        &format!("/topup/account-proof/{address}/verify"),
                        &[("proof", proof)],
                    )
                    .await
            }
            QueryCommand::Balance { address } => {
                client
                    .print::<BalanceResponse>(&format!("/bank/balance/{address}"), &[])
                    .await
            }
        }
    }
}

struct QueryClient {
    url: Url,
    http: reqwest::Client,
}

impl QueryClient {
    /// Fetch a query result, turning an error body from the server into an error.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> color_eyre::Result<ResponseWithHeight<T>> {
        let response = self
            .http
            .get(self.url.join(path)?)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = match response.json::<ErrorResponse>().await {
                Ok(ErrorResponse { error }) => error,
                Err(_) => status.to_string(),
            };
            return Err(eyre!("query failed ({status}): {error}"));
        }

        Ok(response.json().await?)
    }

    async fn print<T: DeserializeOwned + Serialize>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> color_eyre::Result<()> {
        let response: ResponseWithHeight<T> = self.get(path, params).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
