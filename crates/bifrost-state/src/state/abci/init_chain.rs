use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Initialize the chain state.
    ///
    /// The returned app hash is left empty: it is the root hash of the state once committed,
    /// which only the caller can compute.
    #[instrument(skip(self, request,))]
    pub async fn init_chain(
        &mut self,
        request: request::InitChain,
    ) -> Result<response::InitChain, Report> {
        // Ensure that the initial height is 1:
        if request.initial_height.value() != 1 {
            bail!("initial height must be 1");
        }

        // Set the chain ID in the state:
        self.set_chain_id(ChainId(request.chain_id)).await?;
        self.set_block_height(Height::from(0u32)).await?;
        self.set_block_time(request.time).await?;

        // Record when validators start voting on side transactions:
        let enable_height = request.consensus_params.abci.vote_extensions_enable_height;
        self.set_vote_extensions_enable_height(enable_height).await?;
        match enable_height.filter(|h| h.value() > 0) {
            Some(height) => info!(%height, "vote extensions enabled"),
            None => warn!("vote extensions disabled; side transactions will be rejected"),
        }

        // Load the initial config from the genesis file, or use a default if not provided:
        let config = genesis_config(&request.app_state_bytes)?;
        info!(?config, "initial config");

        // Set the initial config in the state:
        self.set_config(config).await?;

        // Declare the initial validator set:
        for validator in request.validators.iter() {
            self.declare_validator(validator.clone()).await?;
        }

        Ok(response::InitChain {
            consensus_params: Some(request.consensus_params),
            validators: request.validators,
            app_hash: Default::default(), // This gets filled in by the caller!
        })
    }
}

/// The chain config found under the `config` key of the genesis app state, or the default one.
pub(crate) fn genesis_config(app_state_bytes: &[u8]) -> Result<Config, Report> {
    if app_state_bytes.is_empty() {
        return Ok(Config::default());
    }

    // The genesis file has app_state as JSON, which gets serialized to bytes
    let app_state: serde_json::Value = serde_json::from_slice(app_state_bytes)
        .map_err(|e| eyre!("failed to parse app_state as JSON: {}", e))?;

    match app_state.get("config") {
        Some(config_value) => serde_json::from_value(config_value.clone())
            .map_err(|e| eyre!("failed to deserialize config from app_state.config: {}", e)),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_app_state_gives_default_config() {
        assert_eq!(genesis_config(b"").unwrap(), Config::default());
        assert_eq!(genesis_config(b"{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = genesis_config(
            br#"{"config": {"topup": {"default_fee_wanted_per_tx": "1000"}}}"#,
        )
        .unwrap();
        assert_eq!(config.topup.default_fee_wanted_per_tx, 1000);
        assert_eq!(config.chain.main_chain_tx_confirmations, 6);
    }

    #[test]
    fn full_config() {
        let config = genesis_config(
            br#"{"config": {
                "chain": {
                    "main_chain_tx_confirmations": 12,
                    "staking_info_address": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
                },
                "topup": {"default_fee_wanted_per_tx": "7"}
            }}"#,
        )
        .unwrap();
        assert_eq!(config.chain.main_chain_tx_confirmations, 12);
        assert_eq!(config.chain.staking_info_address, Address([0x5a; 20]));
        assert_eq!(config.topup.default_fee_wanted_per_tx, 7);
    }

    #[test]
    fn malformed_app_state_is_an_error() {
        assert!(genesis_config(b"not json").is_err());
        assert!(genesis_config(br#"{"config": {"chain": {"main_chain_tx_confirmations": "many"}}}"#).is_err());
    }
}
