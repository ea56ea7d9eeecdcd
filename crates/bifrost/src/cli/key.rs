use std::path::{Path, PathBuf};

use bifrost_types::{Address, KeyPair};
use color_eyre::eyre::eyre;

use super::Run;

#[derive(clap::Subcommand)]
pub enum Key {
    /// Generate a new signing keypair and store it locally.
    ///
    /// The key only signs transactions; it is unrelated to the CometBFT validator key.
    Init(Init),
    /// Display the public key of the local keypair.
    Identity(Identity),
    /// Display the account address controlled by the local keypair.
    Address(ShowAddress),
}

impl Run for Key {
    async fn run(self) -> color_eyre::Result<()> {
        match self {
            Self::Init(cmd) => cmd.run().await,
            Self::Identity(cmd) => cmd.run().await,
            Self::Address(cmd) => cmd.run().await,
        }
    }
}

#[derive(clap::Args)]
pub struct Init {
    /// Home directory for storing keys (defaults to platform-specific directory).
    #[clap(long)]
    pub homedir: Option<PathBuf>,
}

impl Run for Init {
    async fn run(self) -> color_eyre::Result<()> {
        let keypath = keypath(self.homedir.as_deref()).await?;
        if keypath.exists() {
            return Err(eyre!("keypair already exists at: {}", keypath.display()));
        }

        let keypair = KeyPair::generate()?;
        println!("Writing new keypair to: {}", keypath.display());
        tokio::fs::write(&keypath, hex::encode(keypair.encode())).await?;
        println!("{}", Address::from_public_key(keypair.public_key()));

        Ok(())
    }
}

#[derive(clap::Args)]
pub struct Identity {
    /// Home directory for storing keys (defaults to platform-specific directory).
    #[clap(long)]
    pub homedir: Option<PathBuf>,
}

impl Run for Identity {
    async fn run(self) -> color_eyre::Result<()> {
        let keypair = keypair(self.homedir.as_deref()).await?;
        println!("{}", hex::encode(keypair.public_key()));

        Ok(())
    }
}

#[derive(clap::Args)]
pub struct ShowAddress {
    /// Home directory for storing keys (defaults to platform-specific directory).
    #[clap(long)]
    pub homedir: Option<PathBuf>,
}

impl Run for ShowAddress {
    async fn run(self) -> color_eyre::Result<()> {
        let keypair = keypair(self.homedir.as_deref()).await?;
        println!("{}", Address::from_public_key(keypair.public_key()));

        Ok(())
    }
}

pub(super) async fn keypath(homedir: Option<&Path>) -> color_eyre::Result<PathBuf> {
    let key_dir = match homedir {
        Some(homedir) => homedir.to_path_buf(),
        None => super::data_dir()?,
    };

    tokio::fs::create_dir_all(&key_dir).await?;

    Ok(key_dir.join("signing_key.pkcs8.hex"))
}

pub(super) async fn keypair(homedir: Option<&Path>) -> color_eyre::Result<KeyPair> {
    let keypath = keypath(homedir).await?;
    let keyhex = tokio::fs::read_to_string(&keypath)
        .await
        .map_err(|_| eyre!("could not read keypair at: {}", keypath.display()))?;
    let keybytes = hex::decode(keyhex.trim())
        .map_err(|_| eyre!("could not decode keypair hex at: {}", keypath.display()))?;
    let keypair = KeyPair::decode(&keybytes)
        .map_err(|_| eyre!("could not parse keypair at: {}", keypath.display()))?;
    Ok(keypair)
}
