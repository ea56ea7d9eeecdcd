use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// The fee token balance of an account.
    pub async fn balance(&self, address: &Address) -> Result<u128, Report> {
        Ok(self
            .store
            .get::<u128>(Bank, &format!("balance/{}", util::address_key(address)))
            .await?
            .unwrap_or(0))
    }

    /// The total amount of fee tokens in existence.
    pub async fn supply(&self) -> Result<u128, Report> {
        Ok(self.store.get::<u128>(Bank, "supply").await?.unwrap_or(0))
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    fn set_balance(&mut self, address: &Address, amount: u128) {
        let key = format!("balance/{}", util::address_key(address));
        if amount == 0 {
            self.store.remove(Bank, &key);
        } else {
            self.store.put(Bank, &key, amount);
        }
    }

    /// Create new tokens in an account.
    pub(crate) async fn mint(&mut self, address: &Address, amount: u128) -> Result<(), Report> {
        let balance = self
            .balance(address)
            .await?
            .checked_add(amount)
            .ok_or_eyre("balance overflow")?;
        let supply = self
            .supply()
            .await?
            .checked_add(amount)
            .ok_or_eyre("supply overflow")?;

        self.set_balance(address, balance);
        self.store.put(Bank, "supply", supply);
        debug!(%address, amount, "minted");
        Ok(())
    }

    /// Destroy tokens held by an account.
    pub(crate) async fn burn(&mut self, address: &Address, amount: u128) -> Result<(), Report> {
        let balance = self.balance(address).await?;
        let Some(balance) = balance.checked_sub(amount) else {
            bail!("insufficient funds: {address} has {balance}, needs {amount}");
        };
        let supply = self
            .supply()
            .await?
            .checked_sub(amount)
            .ok_or_eyre("supply underflow")?;

        self.set_balance(address, balance);
        self.store.put(Bank, "supply", supply);
        debug!(%address, amount, "burned");
        Ok(())
    }

    /// Move tokens between accounts.
    pub(crate) async fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), Report> {
        let from_balance = self.balance(from).await?;
        let Some(from_balance) = from_balance.checked_sub(amount) else {
            bail!("insufficient funds: {from} has {from_balance}, needs {amount}");
        };
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(to)
            .await?
            .checked_add(amount)
            .ok_or_eyre("balance overflow")?;

        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        debug!(%from, %to, amount, "transferred");
        Ok(())
    }
}
