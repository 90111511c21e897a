//! Account review endpoints. Every handler runs behind the auth middleware
//! and receives the verified [`Caller`] as a request extension.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        account::{
            Account, AccountDetailResponse, AccountListQuery, AvailableActionsResponse,
            RegisterAccountRequest, TransitionOutcome, TransitionRequest, UpdateProfileRequest,
        },
        caller::Caller,
        status_log::StatusLogEntry,
        PaginatedResponse,
    },
    state::AppState,
    types::AccountId,
};

fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid account id: {}", raw)))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    query: Result<Query<AccountListQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Account>>, AppError> {
    let Query(query) =
        query.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;
    let page = state.lifecycle.list_accounts(&query).await?;
    Ok(Json(page))
}

pub async fn register_account(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let payload = json_body(payload)?;
    payload.validate()?;
    let account = state.lifecycle.register(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get_account(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountDetailResponse>, AppError> {
    let account_id = parse_account_id(&account_id)?;
    let detail = state.lifecycle.account_detail(&caller, account_id).await?;
    Ok(Json(detail))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(account_id): Path<String>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let account_id = parse_account_id(&account_id)?;
    let payload = json_body(payload)?;
    payload.validate()?;
    let account = state
        .lifecycle
        .update_profile(&caller, account_id, payload)
        .await?;
    Ok(Json(account))
}

pub async fn get_status_logs(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<StatusLogEntry>>, AppError> {
    let account_id = parse_account_id(&account_id)?;
    let entries = state.lifecycle.status_logs(account_id).await?;
    Ok(Json(entries))
}

pub async fn get_available_actions(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(account_id): Path<String>,
) -> Result<Json<AvailableActionsResponse>, AppError> {
    let account_id = parse_account_id(&account_id)?;
    let actions = state
        .lifecycle
        .authorized_actions(&caller, account_id)
        .await?;
    Ok(Json(actions))
}

pub async fn apply_transition(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(account_id): Path<String>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<TransitionOutcome>, AppError> {
    let account_id = parse_account_id(&account_id)?;
    let payload = json_body(payload)?;
    let outcome = state
        .lifecycle
        .apply_versioned_transition(
            &caller,
            account_id,
            payload.expected_version,
            payload.action,
            payload.reason.as_deref(),
        )
        .await?;
    Ok(Json(outcome))
}
