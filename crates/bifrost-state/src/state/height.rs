use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Get the current block height from the state, else default to 0.
    pub async fn block_height(&self) -> Result<Height, Report> {
        Ok(self
            .store
            .get::<Height>(Internal, "current/block_height")
            .await?
            .unwrap_or(Height::from(0u32)))
    }

    /// The hash of the last finalized block, if any.
    pub async fn last_block_hash(&self) -> Result<Option<Vec<u8>>, Report> {
        self.store
            .get::<String>(Internal, "current/block_hash")
            .await?
            .map(|hash| Ok(hex::decode(hash)?))
            .transpose()
    }

    /// The height from which validators attach vote extensions to their precommits, or `None` if
    /// vote extensions are disabled.
    pub async fn vote_extensions_enable_height(&self) -> Result<Option<Height>, Report> {
        let height = self
            .store
            .get::<Height>(Internal, "parameters/vote_extensions_enable_height")
            .await?;
        Ok(height.filter(|h| h.value() > 0))
    }

    /// Whether side transactions included at `height` will be voted on by validators.
    pub async fn side_txs_enabled_at(&self, height: Height) -> Result<bool, Report> {
        Ok(self
            .vote_extensions_enable_height()
            .await?
            .is_some_and(|enable| height >= enable))
    }

    /// Whether the block at `height` must carry the extended commit of the previous block as its
    /// first transaction.
    pub async fn carries_extended_commit(&self, height: Height) -> Result<bool, Report> {
        Ok(self
            .vote_extensions_enable_height()
            .await?
            .is_some_and(|enable| height > enable))
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Set the current block height in the state.
    pub(crate) async fn set_block_height(&mut self, height: Height) -> Result<(), Report> {
        self.store.put(Internal, "current/block_height", height);
        Ok(())
    }

    pub(crate) async fn set_last_block_hash(&mut self, hash: &[u8]) -> Result<(), Report> {
        self.store
            .put(Internal, "current/block_hash", hex::encode(hash));
        Ok(())
    }

    pub(crate) async fn set_vote_extensions_enable_height(
        &mut self,
        height: Option<Height>,
    ) -> Result<(), Report> {
        self.store.put(
            Internal,
            "parameters/vote_extensions_enable_height",
            height.unwrap_or(Height::from(0u32)),
        );
        Ok(())
    }
}
