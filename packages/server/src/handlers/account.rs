use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::account::{
    AccountResponse, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::models::shared::MessageResponse;
use crate::services::identity::{IdentityError, IdentityService};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    operation_id = "login",
    summary = "Check a username and password",
    description = "Returns the matching account. Wrong credentials are reported with \
        `success: false` and status 200.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = LoginResponse),
        (status = 400, description = "Malformed body (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let account = IdentityService::new(&state.db)
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(match account {
        Some(account) => LoginResponse {
            success: true,
            user: Some(AccountResponse::from(account)),
            message: None,
        },
        None => LoginResponse {
            success: false,
            user: None,
            message: Some("Invalid credentials".into()),
        },
    }))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Accounts",
    operation_id = "register",
    summary = "Create an account",
    description = "Role defaults to `user`. A taken username is reported with \
        `success: false` and status 200.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 200, description = "Username already exists", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<axum::response::Response, AppError> {
    let result = IdentityService::new(&state.db)
        .register(
            &payload.username,
            &payload.password,
            &payload.confirm_password,
            payload.role.as_deref(),
        )
        .await;

    match result {
        Ok(account) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                id: account.id,
                message: "User registered successfully".into(),
            }),
        )
            .into_response()),
        Err(IdentityError::Duplicate) => {
            Ok(Json(MessageResponse::failed("Username already exists")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Accounts",
    operation_id = "changePassword",
    summary = "Change an account's password",
    description = "A wrong old password is reported with `success: false` and status 200.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Outcome", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Account not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = payload.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = IdentityService::new(&state.db)
        .change_password(
            payload.user_id,
            &payload.old_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await;

    match result {
        Ok(()) => Ok(Json(MessageResponse::ok("Password changed successfully"))),
        Err(IdentityError::IncorrectPassword) => {
            Ok(Json(MessageResponse::failed("Incorrect old password")))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Accounts",
    operation_id = "listUsers",
    summary = "List all accounts",
    responses(
        (status = 200, description = "Accounts ordered by id", body = Vec<AccountResponse>),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = IdentityService::new(&state.db).list().await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}
