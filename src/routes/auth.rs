use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{SigninPayload, SignupPayload, TokenResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already taken")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.auth_service.signup(payload).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninPayload,
    responses(
        (status = 200, description = "Token issued", body = Json<TokenResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let access_token = state.auth_service.signin(payload).await?;
    Ok(Json(TokenResponse { access_token }))
}
