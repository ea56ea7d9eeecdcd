use clap::Parser;

#[derive(Parser)]
#[clap(version, about = "Side-transaction consensus for main chain topups")]
pub enum Options {
    /// Run the ABCI application and its query server.
    Start(start::Start),
    /// Delete all local chain state.
    Reset(reset::Reset),
    /// Manage the local signing key.
    #[command(subcommand)]
    Key(key::Key),
    /// Claim a main chain topup for a user.
    Topup(tx::Topup),
    /// Move collected fees into the dividend account.
    WithdrawFee(tx::WithdrawFee),
    /// Read the chain state through a query server.
    Query(query::Query),
    /// Talk to a Bor execution client.
    #[command(subcommand)]
    Bor(bor::Bor),
}

// One module per top-level subcommand
mod bor;
mod key;
mod query;
mod reset;
mod start;
mod tx;

pub trait Run {
    fn run(self) -> impl Future<Output = color_eyre::Result<()>> + Send;
}

impl Run for Options {
    async fn run(self) -> color_eyre::Result<()> {
        match self {
            Self::Start(cmd) => cmd.run().await,
            Self::Reset(cmd) => cmd.run().await,
            Self::Key(cmd) => cmd.run().await,
            Self::Topup(cmd) => cmd.run().await,
            Self::WithdrawFee(cmd) => cmd.run().await,
            Self::Query(cmd) => cmd.run().await,
            Self::Bor(cmd) => cmd.run().await,
        }
    }
}

/// The default directory for local node data: chain state and keys.
fn data_dir() -> color_eyre::Result<std::path::PathBuf> {
    use color_eyre::eyre::OptionExt;

    let directories = directories::ProjectDirs::from("network", "bifrost", "bifrost")
        .ok_or_eyre("could not determine local data directory")?;
    Ok(directories.data_local_dir().to_path_buf())
}
