use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZero,
    path::PathBuf,
    sync::Arc,
    task::{Context, Poll},
};

use bifrost_evm::{DEFAULT_MAX_RETRIES, EvmContractCaller};
use bifrost_state::{State, Store};
use clap::Parser;
use color_eyre::eyre::{OptionExt, eyre};
use futures::future::BoxFuture;
use reqwest::Url;
use tendermint::{
    AppHash,
    abci::Code,
    v0_38::abci::{
        self, ConsensusRequest, ConsensusResponse, InfoRequest, InfoResponse, MempoolRequest,
        MempoolResponse, SnapshotRequest,
    },
};
use tower::{BoxError, Service};
use tracing::Instrument;

use super::Run;

mod query;

#[cfg(test)]
mod tests;

#[derive(Parser)]
pub struct Start {
    /// Which port should the ABCI server listen on?
    #[clap(long, default_value = "26658")]
    abci: u16,
    /// Which port should the query server listen on?
    #[clap(long, default_value = "1317")]
    query: u16,
    /// Directory holding the chain state (defaults to platform-specific directory).
    #[clap(long)]
    home: Option<PathBuf>,
    /// JSON-RPC endpoint of a main chain node.
    #[clap(long, env = "BIFROST_ETH_RPC_URL", default_value = "http://localhost:8545")]
    eth_rpc_url: Url,
    /// How many confirmed main chain receipts to keep in memory.
    #[clap(long, default_value = "1000")]
    receipt_cache_size: usize,
}

/// The ABCI application: every request works on a fresh view of the shared storage.
#[derive(Clone)]
pub struct CoreService {
    store: Store,
    caller: Arc<EvmContractCaller>,
}

impl Service<MempoolRequest> for CoreService {
    type Response = MempoolResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: MempoolRequest) -> Self::Future {
        debug!(?req);

        // Fork the state so we can run delivery checks without affecting the committed state:
        let mut state = State::new(self.store.delta());

        Box::pin(
            async move {
                let MempoolRequest::CheckTx(abci::request::CheckTx { tx, kind: _ }) = req;

                if let Err(e) = state.check_tx(&tx).await {
                    warn!(%e, "rejecting transaction");
                    // Rejecting a transaction means returning a non-zero code
                    return Ok(MempoolResponse::CheckTx(abci::response::CheckTx {
                        code: Code::Err(NonZero::new(1).expect("1 != 0")),
                        log: e.to_string(),
                        ..Default::default()
                    }));
                }

                Ok(MempoolResponse::CheckTx(abci::response::CheckTx::default()))
            }
            .instrument(info_span!("CheckTx")),
        )
    }
}

impl Service<ConsensusRequest> for CoreService {
    type Response = ConsensusResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConsensusRequest) -> Self::Future {
        debug!(?req);

        let store = self.store.clone();
        let caller = self.caller.clone();

        Box::pin(async move {
            Ok(match req {
                ConsensusRequest::InitChain(init_chain) => {
                    let mut state = State::new(store.delta());
                    let mut response = state
                        .init_chain(init_chain)
                        .instrument(info_span!("InitChain"))
                        .await?;
                    let root = store.commit(state.into_inner()).await?;
                    response.app_hash = AppHash::try_from(root.0.to_vec())?;
                    ConsensusResponse::InitChain(response)
                }

                ConsensusRequest::PrepareProposal(prepare_proposal) => {
                    let state = State::new(store.latest_snapshot());
                    ConsensusResponse::PrepareProposal(
                        state
                            .prepare_proposal(prepare_proposal)
                            .instrument(info_span!("PrepareProposal"))
                            .await?,
                    )
                }

                ConsensusRequest::ProcessProposal(process_proposal) => {
                    let state = State::new(store.latest_snapshot());
                    ConsensusResponse::ProcessProposal(
                        state
                            .process_proposal(process_proposal)
                            .instrument(info_span!("ProcessProposal"))
                            .await?,
                    )
                }

                ConsensusRequest::ExtendVote(extend_vote) => {
                    let state = State::new(store.latest_snapshot());
                    ConsensusResponse::ExtendVote(
                        state
                            .extend_vote(extend_vote, &caller)
                            .instrument(info_span!("ExtendVote"))
                            .await?,
                    )
                }

                ConsensusRequest::VerifyVoteExtension(verify_vote_extension) => {
                    let state = State::new(store.latest_snapshot());
                    ConsensusResponse::VerifyVoteExtension(
                        state
                            .verify_vote_extension(verify_vote_extension)
                            .instrument(info_span!("VerifyVoteExtension"))
                            .await?,
                    )
                }

                ConsensusRequest::FinalizeBlock(finalize_block) => {
                    let mut state = State::new(store.delta());
                    let mut response = state
                        .finalize_block(finalize_block)
                        .instrument(info_span!("FinalizeBlock"))
                        .await?;
                    // The state is committed here rather than at Commit, so that the app hash
                    // can be returned with the block:
                    let root = store.commit(state.into_inner()).await?;
                    response.app_hash = AppHash::try_from(root.0.to_vec())?;
                    info!(app_hash = %hex::encode(root.0), "block finalized");
                    ConsensusResponse::FinalizeBlock(response)
                }

                ConsensusRequest::Commit => {
                    ConsensusResponse::Commit(abci::response::Commit::default())
                }
            })
        })
    }
}

impl Service<InfoRequest> for CoreService {
    type Response = InfoResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: InfoRequest) -> Self::Future {
        debug!(?req);

        let store = self.store.clone();

        Box::pin(async move {
            Ok(match req {
                InfoRequest::Info(_info) => {
                    let state = State::new(store.latest_snapshot());
                    let last_block_height = state.block_height().await?;
                    let last_block_app_hash = match store.latest_version() {
                        Some(_) => AppHash::try_from(store.root_hash().await?.0.to_vec())?,
                        None => AppHash::default(),
                    };

                    InfoResponse::Info(abci::response::Info {
                        data: env!("CARGO_PKG_NAME").to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        app_version: 1,
                        last_block_height,
                        last_block_app_hash,
                    })
                }
                InfoRequest::Query(_query) => InfoResponse::Query(abci::response::Query {
                    code: Code::Err(NonZero::new(1).expect("1 != 0")),
                    log: "ABCI query is not implemented; use the query server".to_string(),
                    ..Default::default()
                }),
                InfoRequest::Echo(abci::request::Echo { message }) => {
                    InfoResponse::Echo(abci::response::Echo { message })
                }
            })
        })
    }
}

impl Service<SnapshotRequest> for CoreService {
    type Response = abci::SnapshotResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SnapshotRequest) -> Self::Future {
        debug!(?req);

        Box::pin(async move { Err("snapshots are not implemented".into()) })
    }
}

impl Run for Start {
    async fn run(self) -> color_eyre::Result<()> {
        let Self {
            abci,
            query,
            home,
            eth_rpc_url,
            receipt_cache_size,
        } = self;

        // Load up the storage backend:
        let home = match home {
            Some(home) => home,
            None => super::data_dir()?,
        };
        let storage_dir = home.join("state");
        tokio::fs::create_dir_all(&storage_dir).await?;
        let store = Store::init(storage_dir.clone())
            .await
            .map_err(|e| eyre!("could not open storage at {}: {e}", storage_dir.display()))?;
        info!(path = %storage_dir.display(), version = ?store.latest_version(), "opened storage");

        let caller = Arc::new(EvmContractCaller::new(
            eth_rpc_url,
            receipt_cache_size,
            DEFAULT_MAX_RETRIES,
        ));

        // Start the query server:
        let app = query::app(store.clone(), caller.clone());
        let listener =
            tokio::net::TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), query))
                .await
                .map_err(|e| eyre!("could not bind query server to port {query}: {e}"))?;
        info!(port = query, "query server listening");
        let query_server = tokio::spawn(async move { axum::serve(listener, app).await });

        // All the ABCI services share the same core state:
        let core = CoreService { store, caller };

        // Start the ABCI server:
        info!(port = abci, "ABCI server listening");
        let abci_server = tower_abci::v038::ServerBuilder::default()
            .mempool(core.clone())
            .consensus(core.clone())
            .info(core.clone())
            .snapshot(core)
            .finish()
            .ok_or_eyre("could not construct ABCI server")?
            .listen_tcp((IpAddr::V4(Ipv4Addr::LOCALHOST), abci));

        tokio::select! {
            result = abci_server => result
                .map_err(|e| eyre!("ABCI server on port {abci} failed: {e}"))?,
            result = query_server => result?
                .map_err(|e| eyre!("query server on port {query} failed: {e}"))?,
        }

        Ok(())
    }
}
