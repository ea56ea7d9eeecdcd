use std::fmt::Display;
use std::path::PathBuf;

use bifrost_types::DomainType;
use cnidarium::{RootHash, Snapshot, StateDelta, StateRead, StateWrite, Storage};
use color_eyre::{Report, eyre};
use futures::{
    FutureExt, Stream, StreamExt,
    future::BoxFuture,
    stream::BoxStream,
};

/// Handle on the persistent storage backing the chain state.
#[derive(Clone)]
pub struct Store {
    storage: Storage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Substore {
    /// Chain parameters, block height and time, validators.
    Internal,
    /// Account balances and total supply.
    Bank,
    /// Processed topup sequences and dividend accounts.
    Topup,
    /// Side transactions awaiting their votes.
    SideTx,
}

impl Substore {
    pub const ALL: [Substore; 4] = [
        Substore::Internal,
        Substore::Bank,
        Substore::Topup,
        Substore::SideTx,
    ];

    pub fn prefix(&self, key: &str) -> String {
        format!("{}/{}", self, key)
    }

    pub fn unprefix<'a>(&self, prefixed_key: &'a str) -> Option<&'a str> {
        prefixed_key.strip_prefix(&format!("{}/", self))
    }
}

impl Display for Substore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Substore::Internal => write!(f, "internal"),
            Substore::Bank => write!(f, "bank"),
            Substore::Topup => write!(f, "topup"),
            Substore::SideTx => write!(f, "sidetx"),
        }
    }
}

impl Store {
    pub async fn init(path: PathBuf) -> Result<Self, Report> {
        let storage = Storage::init(path, Substore::ALL.map(|s| s.to_string()).to_vec())
            .await
            .map_err(|e| eyre::eyre!(e))?;
        Ok(Self { storage })
    }

    /// A read-only view of the latest committed state.
    pub fn latest_snapshot(&self) -> Snapshot {
        self.storage.latest_snapshot()
    }

    /// A fresh set of pending changes on top of the latest committed state.
    pub fn delta(&self) -> StateDelta<Snapshot> {
        StateDelta::new(self.storage.latest_snapshot())
    }

    /// The version of the latest committed state, if anything was ever committed.
    pub fn latest_version(&self) -> Option<u64> {
        match self.storage.latest_version() {
            u64::MAX => None,
            version => Some(version),
        }
    }

    /// Commit pending changes to the underlying storage, returning the new root hash.
    pub async fn commit(&self, delta: StateDelta<Snapshot>) -> Result<RootHash, Report> {
        self.storage
            .commit(delta)
            .await
            .map_err(|e| eyre::eyre!(e))
    }

    /// The root hash of the latest committed state.
    pub async fn root_hash(&self) -> Result<RootHash, Report> {
        self.storage
            .latest_snapshot()
            .root_hash()
            .await
            .map_err(|e| eyre::eyre!(e))
    }

    pub async fn release(self) {
        self.storage.release().await
    }
}

/// Typed reads over any cnidarium state, keyed by substore.
pub trait StateReadExt: StateRead {
    /// Get a value from the state by key, decoding it into the given domain type.
    fn get<V: DomainType>(
        &self,
        substore: Substore,
        key: &str,
    ) -> BoxFuture<'static, Result<Option<V>, Report>> {
        let raw = self.get_raw(&substore.prefix(key));
        async move {
            match raw.await.map_err(|e| eyre::eyre!(e))? {
                Some(bytes) => Ok(Some(V::decode(&bytes)?)),
                None => Ok(None),
            }
        }
        .boxed()
    }

    /// Get a stream over all key-value pairs in the state with the given prefix, decoding the
    /// values into the given domain type. Keys are returned without the substore prefix.
    fn prefix<V: DomainType>(
        &self,
        substore: Substore,
        prefix: &str,
    ) -> BoxStream<'static, Result<(String, V), Report>> {
        self.prefix_raw(&substore.prefix(prefix))
            .map(move |res| match res {
                Ok((key, bytes)) => {
                    let v = V::decode(&bytes)?;
                    Ok((
                        substore
                            .unprefix(&key)
                            .expect("key from wrong substore")
                            .to_string(),
                        v,
                    ))
                }
                Err(e) => Err(eyre::eyre!(e)),
            })
            .boxed()
    }

    /// Get a stream over all keys in the state with the given prefix.
    fn keys_with_prefix(
        &self,
        substore: Substore,
        prefix: &str,
    ) -> BoxStream<'static, Result<String, Report>> {
        self.prefix_keys(&substore.prefix(prefix))
            .map(move |res| match res {
                Ok(key) => Ok(substore
                    .unprefix(&key)
                    .expect("key from wrong substore")
                    .to_string()),
                Err(e) => Err(eyre::eyre!(e)),
            })
            .boxed()
    }
}

impl<T: StateRead + ?Sized> StateReadExt for T {}

/// Typed writes over any cnidarium state, keyed by substore.
pub trait StateWriteExt: StateWrite {
    /// Set a value in the state by key, encoding it from the given domain type.
    fn put<V: DomainType>(&mut self, substore: Substore, key: &str, value: V) {
        self.put_raw(substore.prefix(key), value.encode_to_vec());
    }

    /// Remove a value from the state by key.
    fn remove(&mut self, substore: Substore, key: &str) {
        self.delete(substore.prefix(key));
    }
}

impl<T: StateWrite + ?Sized> StateWriteExt for T {}

/// Collect a fallible stream into a vector, stopping at the first error.
pub async fn collect<T>(
    stream: impl Stream<Item = Result<T, Report>>,
) -> Result<Vec<T>, Report> {
    let mut stream = Box::pin(stream);
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item?);
    }
    Ok(items)
}
