use std::collections::{BTreeMap, BTreeSet};

use bifrost_evm::ContractCaller;
use bifrost_types::{
    Address, DomainType,
    config::Config,
    sidetx::{ExtendedCommit, PendingSideTx, SideTxResponse, Vote, VoteExtension},
    topup::{DividendAccount, TopupSequence},
    transaction::{AuthenticatedTx, ChainId, Msg, TopupTx, Transaction, WithdrawFeeTx, tx_hash},
};
use color_eyre::{
    Report,
    eyre::{OptionExt, bail, eyre},
};
use prost::bytes::Bytes;
use tendermint::{
    Time,
    abci::{request, response, types::Misbehavior},
    block::Height,
    validator::Update,
    vote::Power,
};

use crate::store::{
    StateReadExt, StateWriteExt, collect,
    Substore::{Bank, Internal, SideTx, Topup},
};

mod abci;
mod bank;
mod chain_id;
mod config;
mod height;
pub mod sidetx;
mod time;
mod topup;
mod util;
mod validator;

pub use validator::ActiveValidator;


/// The chain state, over some cnidarium view of storage.
///
/// Read-only operations work over any [`StateReadExt`], such as a committed snapshot; operations
/// which change the state need a writable delta.
#[derive(Debug, Clone)]
pub struct State<S> {
    store: S,
}

impl<S> State<S> {
    /// Create a new state with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Take back the underlying store, e.g. to commit it.
    pub fn into_inner(self) -> S {
        self.store
    }
}
