#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    models::{
        account::{
            Account, AccountDetailResponse, AccountKind, AccountListQuery, AccountProfile,
            AvailableActionsResponse, BloodType, RegisterAccountRequest, TransitionOutcome,
            TransitionRequest, UpdateProfileRequest,
        },
        caller::CallerRole,
        lifecycle::{Action, LifecycleState, ResultingState},
        status_log::StatusLogEntry,
        PaginatedResponse,
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        list_accounts_doc,
        register_account_doc,
        get_account_doc,
        update_profile_doc,
        status_logs_doc,
        available_actions_doc,
        apply_transition_doc
    ),
    components(
        schemas(
            // accounts
            Account,
            AccountKind,
            BloodType,
            AccountProfile,
            RegisterAccountRequest,
            UpdateProfileRequest,
            AccountDetailResponse,
            // lifecycle
            LifecycleState,
            Action,
            ResultingState,
            CallerRole,
            StatusLogEntry,
            AvailableActionsResponse,
            TransitionRequest,
            TransitionOutcome,
            // errors
            ErrorResponse
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Accounts", description = "Account registry and profile data"),
        (name = "Review", description = "Lifecycle transitions and status log")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = serde_json::Value)),
    tag = "Health",
    security(())
)]
fn health_doc() {}

#[utoipa::path(
    get,
    path = "/api/accounts",
    params(AccountListQuery),
    responses(
        (status = 200, description = "One page of accounts, newest first", body = PaginatedResponse<Account>),
        (status = 401, body = ErrorResponse)
    ),
    tag = "Accounts"
)]
fn list_accounts_doc() {}

#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Registered, pending review", body = Account),
        (status = 400, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    ),
    tag = "Accounts"
)]
fn register_account_doc() {}

#[utoipa::path(
    get,
    path = "/api/accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, body = AccountDetailResponse),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Accounts"
)]
fn get_account_doc() {}

#[utoipa::path(
    put,
    path = "/api/accounts/{id}/profile",
    params(("id" = String, Path, description = "Account id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, body = Account),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Stale expected_version", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
fn update_profile_doc() {}

#[utoipa::path(
    get,
    path = "/api/accounts/{id}/status-logs",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Most recent first", body = Vec<StatusLogEntry>),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Review"
)]
fn status_logs_doc() {}

#[utoipa::path(
    get,
    path = "/api/accounts/{id}/actions",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, body = AvailableActionsResponse),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Review"
)]
fn available_actions_doc() {}

#[utoipa::path(
    post,
    path = "/api/accounts/{id}/transitions",
    params(("id" = String, Path, description = "Account id")),
    request_body = TransitionRequest,
    responses(
        (status = 200, body = TransitionOutcome),
        (status = 400, description = "Reason too long", body = ErrorResponse),
        (status = 403, description = "No review authority", body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "ILLEGAL_TRANSITION or CONFLICT", body = ErrorResponse),
        (status = 422, description = "MISSING_REASON", body = ErrorResponse)
    ),
    tag = "Review"
)]
fn apply_transition_doc() {}
