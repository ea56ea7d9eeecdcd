use std::sync::Arc;

use alloy::primitives::B256;
use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bifrost_evm::{ContractCaller, EvmContractCaller};
use bifrost_state::{State, Store};
use bifrost_types::{
    Address,
    response::{
        AccountProofResponse, BalanceResponse, DividendAccountRootResponse, ErrorResponse,
        IsOldTxResponse, ResponseWithHeight, TopupSequenceResponse, VerifyAccountProofResponse,
    },
    topup::TopupSequence,
};
use cnidarium::Snapshot;
use color_eyre::{Report, eyre::eyre};
use serde::{Deserialize, Serialize};

/// A failed query: the status to answer with, and why.
struct QueryError(StatusCode, String);

impl From<Report> for QueryError {
    fn from(e: Report) -> Self {
        QueryError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let QueryError(status, error) = self;
        (status, Json(ErrorResponse { error })).into_response()
    }
}

fn bad_request(e: impl ToString) -> QueryError {
    QueryError(StatusCode::BAD_REQUEST, e.to_string())
}

fn not_found(e: impl ToString) -> QueryError {
    QueryError(StatusCode::NOT_FOUND, e.to_string())
}

/// Answer with the result of a query against `state`, wrapped with the height it was read at.
async fn respond<T: Serialize>(state: &State<Snapshot>, result: Result<T, QueryError>) -> Response {
    let response = async {
        let result = result?;
        let height = state.block_height().await?.value();
        Ok::<_, QueryError>(ResponseWithHeight { height, result })
    };
    match response.await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_address(address: &str) -> Result<Address, QueryError> {
    address.parse().map_err(bad_request)
}

#[derive(Deserialize)]
struct SequenceParams {
    block_number: u64,
    log_index: u64,
}

#[derive(Deserialize)]
struct OldTxParams {
    tx_hash: String,
    log_index: u64,
}

#[derive(Deserialize)]
struct ProofParams {
    proof: String,
}

pub fn app(store: Store, caller: Arc<EvmContractCaller>) -> Router {
    let config = {
        let store = store.clone();
        move || async move {
            let state = State::new(store.latest_snapshot());
            let result = async { Ok::<_, QueryError>(state.config().await?) }.await;
            respond(&state, result).await
        }
    };

    let sequence = {
        let store = store.clone();
        move |Query(params): Query<SequenceParams>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let sequence = TopupSequence::new(params.block_number, params.log_index);
                let processed = state.has_topup_sequence(&sequence).await?;
                Ok::<_, QueryError>(TopupSequenceResponse {
                    sequence: sequence.to_string(),
                    processed,
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    // An event is old if its sequence was credited; the sequence needs the block which
    // included the transaction, which only the main chain knows:
    let is_old_tx = {
        let store = store.clone();
        move |Query(params): Query<OldTxParams>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let tx_hash: B256 = params.tx_hash.parse().map_err(bad_request)?;
                let block_number = caller
                    .get_main_chain_tx_block_number(tx_hash)
                    .await
                    .map_err(|e| eyre!("main chain lookup failed: {e}"))?
                    .ok_or_else(|| not_found(format!("unknown main chain tx {tx_hash}")))?;
                let sequence = TopupSequence::new(block_number, params.log_index);
                Ok::<_, QueryError>(IsOldTxResponse {
                    is_old: state.has_topup_sequence(&sequence).await?,
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    let dividend_account = {
        let store = store.clone();
        move |Path(address): Path<String>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let address = parse_address(&address)?;
                state
                    .dividend_account(&address)
                    .await?
                    .ok_or_else(|| not_found(format!("no dividend account for {address}")))
            }
            .await;
            respond(&state, result).await
        }
    };

    let dividend_accounts = {
        let store = store.clone();
        move || async move {
            let state = State::new(store.latest_snapshot());
            let result = async { Ok::<_, QueryError>(state.dividend_accounts().await?) }.await;
            respond(&state, result).await
        }
    };

    let dividend_account_root = {
        let store = store.clone();
        move || async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                Ok::<_, QueryError>(DividendAccountRootResponse {
                    account_root_hash: hex::encode(state.dividend_account_root().await?),
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    let account_proof = {
        let store = store.clone();
        move |Path(address): Path<String>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let address = parse_address(&address)?;
                if state.dividend_account(&address).await?.is_none() {
                    return Err(not_found(format!("no dividend account for {address}")));
                }
                let (proof, index) = state.dividend_account_proof(&address).await?;
                Ok(AccountProofResponse {
                    address,
                    account_proof: hex::encode(proof.concat()),
                    index,
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    let verify_account_proof = {
        let store = store.clone();
        move |Path(address): Path<String>, Query(params): Query<ProofParams>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let address = parse_address(&address)?;
                let proof = params.proof.trim_start_matches("0x");
                let proof = hex::decode(proof).map_err(bad_request)?;
                Ok::<_, QueryError>(VerifyAccountProofResponse {
                    is_verified: state.verify_account_proof(&address, &proof).await?,
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    let balance = {
        let store = store.clone();
        move |Path(address): Path<String>| async move {
            let state = State::new(store.latest_snapshot());
            let result = async {
                let address = parse_address(&address)?;
                Ok::<_, QueryError>(BalanceResponse {
                    address,
                    amount: state.balance(&address).await?,
                })
            }
            .await;
            respond(&state, result).await
        }
    };

    Router::new()
        .route("/config", get(config))
        .route("/topup/sequence", get(sequence))
        .route("/topup/isoldtx", get(is_old_tx))
        .route("/topup/dividend-account/{address}", get(dividend_account))
        .route("/topup/dividend-accounts", get(dividend_accounts))
        .route("/topup/dividend-account-root", get(dividend_account_root))
        .route("/topup/account-proof/{address}", get(account_proof))
        .route(
            "/topup/account-proof/{address}/verify",
            get(verify_account_proof),
        )
        .route("/bank/balance/{address}", get(balance))
}
