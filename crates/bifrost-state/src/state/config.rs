use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Get the current config from the state.
    pub async fn config(&self) -> Result<Config, Report> {
        self.store
            .get::<Config>(Internal, "parameters/config")
            .await?
            .ok_or_eyre("config not found in state; is the state initialized?")
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Set the current config in the state.
    pub(crate) async fn set_config(&mut self, config: Config) -> Result<(), Report> {
        self.store.put(Internal, "parameters/config", config);
        Ok(())
    }
}
