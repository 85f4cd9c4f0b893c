// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::{
    error::{ApiError, ErrorBody},
    models::{OnboardingRequest, OnboardingResponse, OwnerAddress},
    state::AppState,
    storage::{LedgerError, NewUser, OnboardOutcome},
};

pub const INVALID_ADDRESS: &str = "Invalid EVM address";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const INVALID_USERNAME: &str = "Invalid username";
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Validate an onboarding request.
fn validate(request: OnboardingRequest) -> Result<NewUser, ApiError> {
    let address = request
        .address
        .as_deref()
        .map(OwnerAddress::parse)
        .and_then(Result::ok)
        .ok_or_else(|| ApiError::bad_request(INVALID_ADDRESS))?;

    let email = request
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| email.contains('@'))
        .ok_or_else(|| ApiError::bad_request(INVALID_EMAIL))?;

    let username = request
        .username
        .map(|username| username.trim().to_string())
        .filter(|username| username.chars().count() >= 2)
        .ok_or_else(|| ApiError::bad_request(INVALID_USERNAME))?;

    Ok(NewUser {
        address,
        email,
        username,
    })
}

/// Register a wallet owner with the ledger.
///
/// Onboarding an already known address (or email) returns the stored user
/// with `existed: true` instead of failing.
#[utoipa::path(
    post,
    path = "/onboarding",
    request_body = OnboardingRequest,
    tag = "Onboarding",
    responses(
        (status = 201, description = "User created", body = OnboardingResponse),
        (status = 200, description = "User already onboarded", body = OnboardingResponse),
        (status = 400, description = "Invalid address, email or username", body = ErrorBody),
        (status = 409, description = "Username taken by another user", body = ErrorBody),
        (status = 500, description = "Unexpected error", body = ErrorBody)
    )
)]
pub async fn onboard(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<OnboardingResponse>), ApiError> {
    // Unparsable bodies are validated as empty requests.
    let request: OnboardingRequest = serde_json::from_slice(&body).unwrap_or_default();
    let new_user = validate(request)?;

    let ledger = state.ledger.clone();
    let outcome = tokio::task::spawn_blocking(move || ledger.onboard(new_user))
        .await
        .map_err(ApiError::internal)?;

    match outcome {
        Ok(OnboardOutcome::Created(user)) => {
            tracing::info!(user_id = %user.id, address = %user.address, "User onboarded");
            Ok((
                StatusCode::CREATED,
                Json(OnboardingResponse {
                    user,
                    existed: None,
                }),
            ))
        }
        Ok(OnboardOutcome::Existing(user)) => Ok((
            StatusCode::OK,
            Json(OnboardingResponse {
                user,
                existed: Some(true),
            }),
        )),
        Err(LedgerError::UsernameTaken(_)) => Err(ApiError::conflict(USERNAME_TAKEN)),
        Err(e) => Err(ApiError::internal(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedReader, TestApp};

    const ADDRESS: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    fn body(value: serde_json::Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    #[tokio::test]
    async fn creates_then_returns_existing_user() {
        let app = TestApp::new(ScriptedReader::new());
        let request = serde_json::json!({
            "address": ADDRESS,
            "email": "ada@example.com",
            "username": "ada"
        });

        let (status, Json(created)) = onboard(State(app.state.clone()), body(request.clone()))
            .await
            .expect("onboarding succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.existed, None);
        assert_eq!(created.user.address.as_str(), ADDRESS.to_lowercase());
        assert!(created.user.id.starts_with("0xMove_"));
        assert!(created.user.kyc);

        let (status, Json(existing)) = onboard(State(app.state.clone()), body(request))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(existing.existed, Some(true));
        assert_eq!(existing.user.id, created.user.id);
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let app = TestApp::new(ScriptedReader::new());
        let cases = [
            (serde_json::json!({"address": "0x12", "email": "a@b.c", "username": "ada"}), INVALID_ADDRESS),
            (serde_json::json!({"address": ADDRESS, "email": "nope", "username": "ada"}), INVALID_EMAIL),
            (serde_json::json!({"address": ADDRESS, "email": "a@b.c", "username": " a "}), INVALID_USERNAME),
            (serde_json::json!({}), INVALID_ADDRESS),
        ];
        for (request, message) in cases {
            let err = onboard(State(app.state.clone()), body(request)).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, message);
        }

        let err = onboard(State(app.state.clone()), Bytes::from_static(b"not json"))
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_ADDRESS);
    }

    #[tokio::test]
    async fn taken_username_conflicts() {
        let app = TestApp::new(ScriptedReader::new());
        let (status, _) = onboard(
            State(app.state.clone()),
            body(serde_json::json!({"address": ADDRESS, "email": "ada@example.com", "username": "ada"})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = onboard(
            State(app.state.clone()),
            body(serde_json::json!({
                "address": "0x1111111111111111111111111111111111111111",
                "email": "other@example.com",
                "username": "ada"
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, USERNAME_TAKEN);
    }
}
