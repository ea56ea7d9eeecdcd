use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Get the current block time from the state.
    pub async fn block_time(&self) -> Result<Time, Report> {
        self.store
            .get::<Time>(Internal, "current/block_time")
            .await?
            .ok_or_eyre("block time not found in state; is the state initialized?")
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Set the current block time in the state.
    pub(crate) async fn set_block_time(&mut self, time: Time) -> Result<(), Report> {
        self.store.put(Internal, "current/block_time", time);
        Ok(())
    }
}
