use std::time::Duration;

use bifrost_types::{
    config::Config,
    response::{BalanceResponse, ErrorResponse, ResponseWithHeight, TopupSequenceResponse},
};
use tempfile::TempDir;
use tendermint::{
    Time,
    block::{self, Height},
    consensus::{
        self,
        params::{AbciParams, ValidatorParams, VersionParams},
    },
    evidence,
    public_key::Algorithm,
};

use super::*;

async fn core_service() -> (CoreService, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::init(dir.path().to_path_buf()).await.unwrap();
    // Nothing in these tests reaches the main chain:
    let caller = Arc::new(EvmContractCaller::new(
        "http://127.0.0.1:1".parse().unwrap(),
        16,
        0,
    ));
    (CoreService { store, caller }, dir)
}

fn init_chain_request(app_state: &str) -> abci::request::InitChain {
    abci::request::InitChain {
        time: Time::from_unix_timestamp(1_700_000_000, 0).unwrap(),
        chain_id: "bifrost-test".to_string(),
        consensus_params: consensus::Params {
            block: block::Size {
                max_bytes: 22020096,
                max_gas: -1,
                time_iota_ms: 1000,
            },
            evidence: evidence::Params {
                max_age_num_blocks: 100000,
                max_age_duration: evidence::Duration(Duration::from_secs(48 * 3600)),
                max_bytes: 1048576,
            },
            validator: ValidatorParams {
                pub_key_types: vec![Algorithm::Ed25519],
            },
            version: Some(VersionParams { app: 1 }),
            abci: AbciParams {
                vote_extensions_enable_height: Some(Height::from(1u32)),
            },
        },
        validators: vec![],
        app_state_bytes: app_state.as_bytes().to_vec().into(),
        initial_height: Height::from(1u32),
    }
}

#[tokio::test]
async fn init_chain_commits_and_reports_the_app_hash() {
    let (mut core, _dir) = core_service().await;

    let ConsensusResponse::InitChain(init) = core
        .call(ConsensusRequest::InitChain(init_chain_request(
            r#"{"config": {"topup": {"default_fee_wanted_per_tx": "250"}}}"#,
        )))
        .await
        .unwrap()
    else {
        panic!("wrong response type");
    };
    assert_ne!(init.app_hash, AppHash::default());

    let InfoResponse::Info(info) = core
        .call(InfoRequest::Info(abci::request::Info {
            version: String::new(),
            block_version: 0,
            p2p_version: 0,
            abci_version: String::new(),
        }))
        .await
        .unwrap()
    else {
        panic!("wrong response type");
    };
    assert_eq!(info.last_block_height.value(), 0);
    assert_eq!(info.last_block_app_hash, init.app_hash);

    let state = State::new(core.store.latest_snapshot());
    assert_eq!(state.config().await.unwrap().topup.default_fee_wanted_per_tx, 250);
}

#[tokio::test]
async fn garbage_is_rejected_by_check_tx() {
    let (mut core, _dir) = core_service().await;
    core.call(ConsensusRequest::InitChain(init_chain_request("")))
        .await
        .unwrap();

    let MempoolResponse::CheckTx(response) = core
        .call(MempoolRequest::CheckTx(abci::request::CheckTx {
            tx: vec![0xde, 0xad, 0xbe, 0xef].into(),
            kind: abci::request::CheckTxKind::New,
        }))
        .await
        .unwrap();
    assert!(response.code.is_err());
    assert!(!response.log.is_empty());
}

#[tokio::test]
async fn query_server_answers_with_height() {
    let (mut core, _dir) = core_service().await;
    core.call(ConsensusRequest::InitChain(init_chain_request("")))
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url: Url = format!("http://{}", listener.local_addr().unwrap())
        .parse()
        .unwrap();
    let app = query::app(core.store.clone(), core.caller.clone());
    tokio::spawn(async move { axum::serve(listener, app).await });
    let client = reqwest::Client::new();

    let config: ResponseWithHeight<Config> = client
        .get(url.join("/config").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config.height, 0);
    assert_eq!(config.result, Config::default());

    let balance: ResponseWithHeight<BalanceResponse> = client
        .get(
            url.join("/bank/balance/0x0101010101010101010101010101010101010101")
                .unwrap(),
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(balance.result.amount, 0);

    let sequence: ResponseWithHeight<TopupSequenceResponse> = client
        .get(url.join("/topup/sequence?block_number=12&log_index=3").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sequence.result.sequence, "1200003");
    assert!(!sequence.result.processed);

    let response = client
        .get(url.join("/bank/balance/not-an-address").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert!(!error.error.is_empty());

    let response = client
        .get(
            url.join("/topup/dividend-account/0x0101010101010101010101010101010101010101")
                .unwrap(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
