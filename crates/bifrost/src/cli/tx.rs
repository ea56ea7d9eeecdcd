use std::path::PathBuf;

use alloy::primitives::B256;
use bifrost_types::{
    Address, KeyPair, parse_amount,
    transaction::{Builder, ChainId, Transaction, tx_hash},
};
use color_eyre::eyre::eyre;
use reqwest::Url;
use tendermint_rpc::{HttpClient, client::Client};

use super::{Run, key::keypair};

/// Where and how to submit a transaction.
#[derive(clap::Args)]
pub struct Broadcast {
    /// Node to which to send the transaction.
    #[clap(long, short, default_value = "http://localhost:26657")]
    pub node: Url,
    /// Chain ID of the target chain (fetched from the node if not given).
    #[clap(long, short)]
    pub chain: Option<String>,
    /// Home directory for storing keys (defaults to platform-specific directory).
    #[clap(long)]
    pub homedir: Option<PathBuf>,
}

impl Broadcast {
    /// Sign the transaction built by `build` with the local key, and submit it to the node.
    async fn submit(
        self,
        build: impl FnOnce(Builder) -> Transaction,
    ) -> color_eyre::Result<()> {
        let keypair: KeyPair = keypair(self.homedir.as_deref()).await?;

        let rpc_url = tendermint_rpc::Url::try_from(self.node.clone())
            .map_err(|e| eyre!("invalid RPC URL: {}", e))?;
        let rpc_client =
            HttpClient::new(rpc_url).map_err(|e| eyre!("failed to create RPC client: {}", e))?;

        let chain_id = if let Some(chain_id) = self.chain {
            chain_id
        } else {
            let genesis: tendermint::Genesis<serde_json::Value> = rpc_client.genesis().await?;
            let chain_id = genesis.chain_id.to_string();
            info!(chain_id = %chain_id, "fetched chain ID from node");
            chain_id
        };

        let tx = build(Builder::new(ChainId(chain_id), &keypair));
        let tx_bytes = tx.sign_to_proto(&keypair)?;
        let hash = tx_hash(&tx_bytes);

        let broadcast_result = rpc_client.broadcast_tx_sync(tx_bytes).await?;
        if broadcast_result.code.is_err() {
            return Err(eyre!("transaction rejected: {}", broadcast_result.log));
        }

        info!(
            hash = %hex::encode(hash),
            code = ?broadcast_result.code,
            "submitted transaction"
        );

        Ok(())
    }
}

#[derive(clap::Args)]
pub struct Topup {
    /// Account credited by the main chain payment.
    #[clap(long)]
    pub user: Address,
    /// Amount paid on the main chain.
    #[clap(long, value_parser = parse_amount)]
    pub fee: u128,
    /// Hash of the main chain transaction that emitted the `TopUpFee` event.
    #[clap(long)]
    pub tx_hash: B256,
    /// Index of the event among the logs of its block.
    #[clap(long)]
    pub log_index: u64,
    /// Main chain block which included the transaction.
    #[clap(long)]
    pub block_number: u64,
    #[clap(flatten)]
    pub broadcast: Broadcast,
}

impl Run for Topup {
    async fn run(self) -> color_eyre::Result<()> {
        let Self {
            user,
            fee,
            tx_hash,
            log_index,
            block_number,
            broadcast,
        } = self;

        broadcast
            .submit(|builder| builder.topup(user, fee, tx_hash.0, log_index, block_number))
            .await
    }
}

#[derive(clap::Args)]
pub struct WithdrawFee {
    /// Amount to withdraw; zero withdraws the whole balance.
    #[clap(long, value_parser = parse_amount, default_value = "0")]
    pub amount: u128,
    #[clap(flatten)]
    pub broadcast: Broadcast,
}

impl Run for WithdrawFee {
    async fn run(self) -> color_eyre::Result<()> {
        let amount = self.amount;
        self.broadcast
            .submit(|builder| builder.withdraw_fee(amount))
            .await
    }
}
