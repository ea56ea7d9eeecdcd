use std::path::PathBuf;

use super::Run;

#[derive(clap::Parser)]
pub struct Reset {
    /// Directory holding the chain state (defaults to platform-specific directory).
    #[clap(long)]
    home: Option<PathBuf>,
}

impl Run for Reset {
    async fn run(self) -> Result<(), color_eyre::Report> {
        let home = match self.home {
            Some(home) => home,
            None => super::data_dir()?,
        };

        // Remove the chain state, but leave the signing key alone:
        let storage_dir = home.join("state");
        if storage_dir.exists() {
            println!("Removing storage directory: {}", storage_dir.display());
            tokio::fs::remove_dir_all(&storage_dir).await?;
        } else {
            println!(
                "Storage directory does not exist: {}",
                storage_dir.display()
            );
        }

        Ok(())
    }
}
