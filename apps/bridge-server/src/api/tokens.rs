// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only views of the token and chain registries for frontends.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, ErrorBody},
    registry::{ChainDescriptor, TokenDescriptor, TokenKind, FIAT_SENTINEL},
    state::AppState,
};

/// `decimals` is a count for crypto tokens and the `"fiat"` marker otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum DecimalsView {
    Count(u8),
    Marker(String),
}

/// Registry entry as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub logo: String,
    pub chain_id: u64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Checksum-free hex address, empty when not configured, `"fiat"` for fiat.
    pub contract_address: String,
    pub decimals: DecimalsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coingecko_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_exchange_rate: Option<String>,
}

impl From<&TokenDescriptor> for TokenView {
    fn from(token: &TokenDescriptor) -> Self {
        let base = |contract_address: String, decimals: DecimalsView| TokenView {
            id: token.id().to_string(),
            symbol: token.symbol().to_string(),
            name: token.display_name().to_string(),
            logo: token.logo_ref().to_string(),
            chain_id: token.chain_id(),
            kind: token.kind(),
            contract_address,
            decimals,
            coingecko_id: None,
            country_code: None,
            static_exchange_rate: None,
        };

        match token {
            TokenDescriptor::Crypto(crypto) => TokenView {
                coingecko_id: crypto.external_price_id.clone(),
                ..base(
                    crypto
                        .contract_address
                        .map(|address| format!("{address:#x}"))
                        .unwrap_or_default(),
                    DecimalsView::Count(crypto.decimals),
                )
            },
            TokenDescriptor::Fiat(fiat) => TokenView {
                country_code: Some(fiat.country_code.clone()),
                static_exchange_rate: fiat.static_exchange_rate.clone(),
                ..base(
                    FIAT_SENTINEL.to_string(),
                    DecimalsView::Marker(FIAT_SENTINEL.to_string()),
                )
            },
        }
    }
}

/// Chain entry as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainView {
    pub chain_id: u64,
    pub name: String,
    /// Public default endpoint (deployment overrides are not disclosed).
    pub rpc_url: String,
    pub native_currency: String,
    pub block_explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicall_address: Option<String>,
}

impl From<&ChainDescriptor> for ChainView {
    fn from(chain: &ChainDescriptor) -> Self {
        Self {
            chain_id: chain.chain_id,
            name: chain.name.to_string(),
            rpc_url: chain.default_rpc_endpoint.to_string(),
            native_currency: chain.native_currency_symbol.to_string(),
            block_explorer_url: chain.block_explorer_url.to_string(),
            multicall_address: chain.multicall_address.map(|address| format!("{address:#x}")),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokensParams {
    /// `crypto` or `fiat`. Omit to list every token.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// List registry tokens in registration order.
#[utoipa::path(
    get,
    path = "/tokens",
    params(TokensParams),
    tag = "Registry",
    responses(
        (status = 200, body = [TokenView]),
        (status = 400, description = "Unknown token type", body = ErrorBody)
    )
)]
pub async fn list_tokens(
    State(state): State<AppState>,
    Query(params): Query<TokensParams>,
) -> Result<Json<Vec<TokenView>>, ApiError> {
    let views = match params.kind.as_deref() {
        None => state.tokens.iter().map(TokenView::from).collect(),
        Some(raw) => {
            let kind: TokenKind = raw.parse().map_err(|_| ApiError::bad_request("Invalid token type"))?;
            state
                .tokens
                .list_by_type(kind)
                .into_iter()
                .map(TokenView::from)
                .collect()
        }
    };
    Ok(Json(views))
}

/// Look up one token by id (`USDC:8453`, `NGN:fiat`).
#[utoipa::path(
    get,
    path = "/tokens/{id}",
    params(
        ("id" = String, Path, description = "Token id, `<symbol>:<chainId>` or `<symbol>:fiat`")
    ),
    tag = "Registry",
    responses(
        (status = 200, body = TokenView),
        (status = 404, description = "Unknown token", body = ErrorBody)
    )
)]
pub async fn get_token(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TokenView>, ApiError> {
    state
        .tokens
        .lookup_by_id(&id)
        .map(|token| Json(TokenView::from(token)))
        .ok_or_else(|| ApiError::not_found(format!("Token {id} not found")))
}

/// Chains served by this deployment.
#[utoipa::path(
    get,
    path = "/chains",
    tag = "Registry",
    responses((status = 200, body = [ChainView]))
)]
pub async fn list_chains(State(state): State<AppState>) -> Json<Vec<ChainView>> {
    Json(state.chains.supported_chains().map(ChainView::from).collect())
}
