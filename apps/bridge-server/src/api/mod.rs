// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    http::HeaderName,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    balances::{BalanceSnapshot, ChainBalance},
    error::{ApiError, ErrorBody},
    models::{OnboardingRequest, OnboardingResponse},
    state::AppState,
    storage::StoredUser,
};

pub mod balances;
pub mod health;
pub mod onboarding;
pub mod tokens;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/balances", get(balances::get_balances))
        .route("/onboarding", post(onboarding::onboard))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/tokens", get(tokens::list_tokens))
        .route("/tokens/{id}", get(tokens::get_token))
        .route("/chains", get(tokens::list_chains))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::internal("request handler panicked").into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        balances::get_balances,
        onboarding::onboard,
        health::liveness,
        health::readiness,
        tokens::list_tokens,
        tokens::get_token,
        tokens::list_chains
    ),
    components(
        schemas(
            BalanceSnapshot,
            ChainBalance,
            OnboardingRequest,
            OnboardingResponse,
            StoredUser,
            ErrorBody,
            health::LivenessResponse,
            health::ReadinessResponse,
            health::Dependencies,
            tokens::TokenView,
            tokens::DecimalsView,
            tokens::ChainView
        )
    ),
    tags(
        (name = "Balances", description = "Merged fiat and on-chain balances"),
        (name = "Onboarding", description = "Wallet owner registration"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Registry", description = "Supported tokens and chains")
    )
)]
struct ApiDoc;
