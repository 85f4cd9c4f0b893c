// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    balances::{BalanceQuery, BalanceSnapshot},
    error::{ApiError, ErrorBody},
    state::AppState,
};

pub const INVALID_ADDRESS: &str = "Invalid or missing address";
pub const INVALID_CHAIN_ID: &str = "Invalid chainId";

/// Query parameters for `GET /balances`.
///
/// Both are taken as raw strings so malformed values map to a 400 with a
/// readable message.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BalancesParams {
    /// Owner address, `0x` followed by 40 hex characters (any case).
    pub address: Option<String>,
    /// Restrict the lookup to one chain. Omit to query every supported chain.
    pub chain_id: Option<String>,
}

/// Merged fiat and on-chain balances of one owner.
#[utoipa::path(
    get,
    path = "/balances",
    params(BalancesParams),
    tag = "Balances",
    responses(
        (status = 200, description = "Balance snapshot", body = BalanceSnapshot),
        (status = 400, description = "Malformed address or chainId", body = ErrorBody),
        (status = 500, description = "Unexpected error", body = ErrorBody)
    )
)]
pub async fn get_balances(
    State(state): State<AppState>,
    params: Result<Query<BalancesParams>, QueryRejection>,
) -> Result<Json<BalanceSnapshot>, ApiError> {
    let Query(params) = params?;
    let raw_address = params.address.unwrap_or_default();

    let requested_chain_ids = match params.chain_id.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => vec![raw
            .parse::<u64>()
            .map_err(|_| ApiError::bad_request(INVALID_CHAIN_ID))?],
    };

    let query = BalanceQuery::parse(&raw_address, requested_chain_ids)
        .map_err(|_| ApiError::bad_request(INVALID_ADDRESS))?;

    Ok(Json(state.aggregator.snapshot(&query).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedReader, TestApp};
    use alloy::primitives::address;
    use axum::http::StatusCode;

    const OWNER: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    fn params(
        address: Option<&str>,
        chain_id: Option<&str>,
    ) -> Result<Query<BalancesParams>, QueryRejection> {
        Ok(Query(BalancesParams {
            address: address.map(str::to_string),
            chain_id: chain_id.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn returns_snapshot_for_valid_address() {
        let app = TestApp::new(ScriptedReader::new().balance(
            8453,
            address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913"),
            1_000_000,
        ));

        let Json(snapshot) = get_balances(State(app.state.clone()), params(Some(OWNER), None))
            .await
            .expect("snapshot is returned");

        assert_eq!(snapshot.queried_chain_ids, vec![8453]);
        assert_eq!(snapshot.crypto_balances["USDC"][0].balance.to_string(), "1000000");
        assert_eq!(snapshot.token_decimals["USDC"], 6);
    }

    #[tokio::test]
    async fn chain_id_restricts_the_query() {
        let app = TestApp::new(ScriptedReader::new());
        let Json(snapshot) =
            get_balances(State(app.state.clone()), params(Some(OWNER), Some("84532")))
                .await
                .unwrap();
        assert_eq!(snapshot.queried_chain_ids, vec![84532]);
    }

    #[tokio::test]
    async fn missing_or_malformed_address_is_rejected_without_reads() {
        let app = TestApp::new(ScriptedReader::new());
        for address in [None, Some(""), Some("0x12"), Some("abcdef0123456789abcdef0123456789abcdef01")] {
            let err = get_balances(State(app.state.clone()), params(address, None))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, INVALID_ADDRESS);
        }
        assert_eq!(app.reader.call_count(), 0);
    }

    #[tokio::test]
    async fn non_numeric_chain_id_is_rejected() {
        let app = TestApp::new(ScriptedReader::new());
        let err = get_balances(State(app.state.clone()), params(Some(OWNER), Some("base")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, INVALID_CHAIN_ID);
        assert_eq!(app.reader.call_count(), 0);
    }
}
