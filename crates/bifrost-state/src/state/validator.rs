use super::*;

/// A validator known to the state, with its consensus key and voting power.
///
/// Tombstoned validators stay known with zero power, so that their votes can be recognized and
/// ignored once CometBFT has dropped them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveValidator {
    pub address: [u8; 20],
    pub public_key: Vec<u8>,
    pub power: u64,
}

impl<S: StateReadExt + 'static> State<S> {
    /// Get all validators ever declared, keyed by address, including tombstoned ones.
    pub async fn validators(&self) -> Result<BTreeMap<[u8; 20], ActiveValidator>, Report> {
        let mut validators = BTreeMap::new();
        for (key, power) in collect(self.store.prefix::<Power>(Internal, "current/validators/")).await? {
            let public_key = hex::decode(key.trim_start_matches("current/validators/"))?;
            let address = *Address::from_public_key(&public_key).as_bytes();
            validators.insert(
                address,
                ActiveValidator {
                    address,
                    public_key,
                    power: power.value(),
                },
            );
        }
        Ok(validators)
    }

    /// Get the validator set CometBFT used to sign the block at `height`, keyed by address.
    ///
    /// A validator tombstoned while finalizing block T leaves the consensus set at T + 2, so its
    /// former power still counts for blocks T and T + 1.
    pub async fn validators_at(
        &self,
        height: Height,
    ) -> Result<BTreeMap<[u8; 20], ActiveValidator>, Report> {
        let mut validators = self.validators().await?;
        for validator in validators.values_mut() {
            let key = hex::encode(&validator.public_key);
            let tombstoned_at: Option<Height> = self
                .store
                .get(Internal, &format!("current/tombstoned/{key}/height"))
                .await?;
            let Some(tombstoned_at) = tombstoned_at else {
                continue;
            };
            if height.value() <= tombstoned_at.value() + 1 {
                let power: Option<Power> = self
                    .store
                    .get(Internal, &format!("current/tombstoned/{key}/power"))
                    .await?;
                validator.power = power.map(|p| p.value()).unwrap_or_default();
            }
        }
        Ok(validators)
    }

    /// Get all active validators.
    pub async fn active_validators(&self) -> Result<Vec<Update>, Report> {
        let mut updates = vec![];
        for validator in self.validators().await?.into_values() {
            // FYI the CometBFT convention is to set power to 0 to remove a validator.
            if validator.power > 0 {
                updates.push(Update {
                    pub_key: tendermint::PublicKey::from_raw_ed25519(&validator.public_key)
                        .ok_or_eyre("invalid ed25519 public key")?,
                    power: Power::try_from(validator.power)?,
                });
            }
        }
        Ok(updates)
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Declare a new validator by its public key.
    pub(crate) async fn declare_validator(&mut self, validator: Update) -> Result<(), Report> {
        let key = format!(
            "current/validators/{}",
            hex::encode(validator.pub_key.to_bytes())
        );

        // Check to ensure the validator does not exist already (prevents redeclaring tombstoned
        // validators to set their power back to non-zero):
        let existing: Option<Power> = self.store.get(Internal, &key).await?;
        if let Some(existing) = existing {
            bail!(
                "validator {} already exists with power {}",
                hex::encode(validator.pub_key.to_bytes()),
                existing,
            );
        }

        self.store.put(Internal, &key, validator.power);
        Ok(())
    }

    /// Tombstone a validator by its address while finalizing the block at `height`, setting its
    /// power to zero for good.
    ///
    /// Returns the validator update removing it from the consensus set, if it was active.
    pub(crate) async fn tombstone_validator(
        &mut self,
        height: Height,
        Misbehavior {
            validator: bad_validator,
            ..
        }: Misbehavior,
    ) -> Result<Option<Update>, Report> {
        let validators = self.validators().await?;
        let Some(bad) = validators
            .get(&bad_validator.address)
            .filter(|v| v.power > 0)
        else {
            warn!(
                "could not find validator with address {}; it may have already been tombstoned",
                hex::encode(bad_validator.address)
            );
            return Ok(None);
        };

        info!(
            pub_key = hex::encode(&bad.public_key),
            "tombstoning validator",
        );
        let key = hex::encode(&bad.public_key);
        self.store
            .put(Internal, &format!("current/tombstoned/{key}/height"), height);
        self.store.put(
            Internal,
            &format!("current/tombstoned/{key}/power"),
            Power::try_from(bad.power)?,
        );
        let zero_power = Power::from(0u32);
        self.store
            .put(Internal, &format!("current/validators/{key}"), zero_power);

        Ok(Some(Update {
            pub_key: tendermint::PublicKey::from_raw_ed25519(&bad.public_key)
                .ok_or_eyre("invalid ed25519 public key")?,
            power: zero_power,
        }))
    }
}
