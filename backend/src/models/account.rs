//! Accounts tracked by the review lifecycle and the payloads that read or
//! modify them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::lifecycle::{Action, LifecycleState};
use crate::models::status_log::StatusLogEntry;
use crate::types::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Donor,
    Hospital,
    BloodBank,
    Observer,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Donor => "donor",
            AccountKind::Hospital => "hospital",
            AccountKind::BloodBank => "blood_bank",
            AccountKind::Observer => "observer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BloodType {
    APos,
    ANeg,
    BPos,
    BNeg,
    AbPos,
    AbNeg,
    OPos,
    ONeg,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APos => "a_pos",
            BloodType::ANeg => "a_neg",
            BloodType::BPos => "b_pos",
            BloodType::BNeg => "b_neg",
            BloodType::AbPos => "ab_pos",
            BloodType::AbNeg => "ab_neg",
            BloodType::OPos => "o_pos",
            BloodType::ONeg => "o_neg",
        }
    }
}

/// A donor, hospital, blood bank or observer registration.
///
/// `lifecycle_state` and `is_active` are independent: reviewing never flips
/// the activity flag and toggling the flag never changes the review outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    #[schema(value_type = String)]
    pub id: AccountId,
    pub kind: AccountKind,
    pub lifecycle_state: LifecycleState,
    pub is_active: bool,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub blood_type: Option<BloodType>,
    /// Opaque governorate/city reference.
    pub location_id: Option<String>,
    pub avatar_url: Option<String>,
    /// Incremented on every committed change; used to detect concurrent writers.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New registrations start pending review with the activity flag set; the
    /// flag grants nothing until the account is approved.
    pub fn new(kind: AccountKind, profile: AccountProfile, now: DateTime<Utc>) -> Self {
        let profile = profile.normalized();
        Self {
            id: AccountId::new(),
            kind,
            lifecycle_state: LifecycleState::PendingReview,
            is_active: true,
            display_name: profile.display_name,
            email: profile.email,
            phone: profile.phone,
            blood_type: profile.blood_type,
            location_id: profile.location_id,
            avatar_url: profile.avatar_url,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            blood_type: self.blood_type,
            location_id: self.location_id.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn apply_profile(&mut self, profile: AccountProfile, now: DateTime<Utc>) {
        let profile = profile.normalized();
        self.display_name = profile.display_name;
        self.email = profile.email;
        self.phone = profile.phone;
        self.blood_type = profile.blood_type;
        self.location_id = profile.location_id;
        self.avatar_url = profile.avatar_url;
        self.version += 1;
        self.updated_at = now;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.lifecycle_state, LifecycleState::PendingReview)
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Descriptive fields that play no part in transition logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AccountProfile {
    #[validate(length(min = 1, max = 120), custom(function = "non_blank"))]
    pub display_name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub location_id: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
}

impl AccountProfile {
    /// Trims text fields and turns blank optional ones into `None`.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            display_name: self.display_name.trim().to_string(),
            email: clean(self.email),
            phone: clean(self.phone),
            blood_type: self.blood_type,
            location_id: clean(self.location_id),
            avatar_url: clean(self.avatar_url),
        }
    }
}

/// Payload for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterAccountRequest {
    pub kind: AccountKind,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: AccountProfile,
}

/// Payload for editing profile fields of an existing account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// Version the caller last saw; a stale value yields `409 CONFLICT`.
    pub expected_version: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: AccountProfile,
}

/// Filters for listing accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountFilter {
    pub state: Option<LifecycleState>,
    pub is_active: Option<bool>,
    pub kind: Option<AccountKind>,
    pub location_id: Option<String>,
    /// Case-insensitive substring of display name, email or phone.
    pub search: Option<String>,
}

impl AccountFilter {
    pub fn accepts(&self, account: &Account) -> bool {
        if self.state.is_some_and(|s| s != account.lifecycle_state) {
            return false;
        }
        if self.is_active.is_some_and(|a| a != account.is_active) {
            return false;
        }
        if self.kind.is_some_and(|k| k != account.kind) {
            return false;
        }
        if let Some(location_id) = self.location_id.as_deref() {
            if account.location_id.as_deref() != Some(location_id) {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref() {
            let term = term.to_lowercase();
            let hit = [
                Some(account.display_name.as_str()),
                account.email.as_deref(),
                account.phone.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Query string accepted by `GET /api/accounts`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AccountListQuery {
    pub state: Option<LifecycleState>,
    pub is_active: Option<bool>,
    pub kind: Option<AccountKind>,
    pub location_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl AccountListQuery {
    pub fn filter(&self) -> AccountFilter {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        AccountFilter {
            state: self.state,
            is_active: self.is_active,
            kind: self.kind,
            location_id: non_blank(&self.location_id),
            search: non_blank(&self.search),
        }
    }
}

/// Account detail together with its history and the review actions the
/// caller may offer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountDetailResponse {
    pub account: Account,
    /// Most recent entry first.
    pub status_logs: Vec<StatusLogEntry>,
    pub available_actions: Vec<Action>,
    /// Subset of `available_actions` that must be confirmed with a reason.
    pub reason_required: Vec<Action>,
}

/// Review actions the caller may offer for one account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableActionsResponse {
    #[schema(value_type = String)]
    pub account_id: AccountId,
    pub lifecycle_state: LifecycleState,
    pub is_active: bool,
    /// Send back as `expected_version` when applying one of the actions.
    pub version: i64,
    pub available_actions: Vec<Action>,
    pub reason_required: Vec<Action>,
}

/// Body of `POST /api/accounts/{id}/transitions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub action: Action,
    /// Mandatory for `reject` and `deactivate`; at most 500 characters.
    #[serde(default)]
    pub reason: Option<String>,
    /// Version the reviewer was looking at. A stale value yields `409 CONFLICT`.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Result of a committed transition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionOutcome {
    pub account: Account,
    pub new_log_entry: StatusLogEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> AccountProfile {
        AccountProfile {
            display_name: name.to_string(),
            email: Some("donor@example.org".to_string()),
            phone: Some("+20 100 000 0000".to_string()),
            blood_type: Some(BloodType::ONeg),
            location_id: Some("cairo".to_string()),
            avatar_url: None,
        }
    }

    #[test]
    fn new_account_starts_pending_and_active() {
        let account = Account::new(AccountKind::Donor, profile("  Mona  "), Utc::now());
        assert_eq!(account.lifecycle_state, LifecycleState::PendingReview);
        assert!(account.is_active);
        assert_eq!(account.version, 1);
        assert_eq!(account.display_name, "Mona");
    }

    #[test]
    fn apply_profile_keeps_lifecycle_fields() {
        let mut account = Account::new(AccountKind::Hospital, profile("Dar"), Utc::now());
        account.lifecycle_state = LifecycleState::Approved;
        account.is_active = false;

        let mut updated = account.profile();
        updated.display_name = "Dar El Shefa".into();
        updated.email = Some("   ".into());
        account.apply_profile(updated, Utc::now());

        assert_eq!(account.display_name, "Dar El Shefa");
        assert_eq!(account.email, None);
        assert_eq!(account.lifecycle_state, LifecycleState::Approved);
        assert!(!account.is_active);
        assert_eq!(account.version, 2);
    }

    #[test]
    fn filter_matches_search_across_contact_fields() {
        let account = Account::new(AccountKind::Donor, profile("Mona"), Utc::now());
        let by_email = AccountFilter {
            search: Some("DONOR@".into()),
            ..Default::default()
        };
        assert!(by_email.accepts(&account));

        let wrong_state = AccountFilter {
            state: Some(LifecycleState::Rejected),
            ..Default::default()
        };
        assert!(!wrong_state.accepts(&account));

        let other_city = AccountFilter {
            location_id: Some("giza".into()),
            ..Default::default()
        };
        assert!(!other_city.accepts(&account));
    }

    #[test]
    fn list_query_drops_blank_text_filters() {
        let query = AccountListQuery {
            search: Some("   ".into()),
            location_id: Some(" alex ".into()),
            ..Default::default()
        };
        let filter = query.filter();
        assert_eq!(filter.search, None);
        assert_eq!(filter.location_id.as_deref(), Some("alex"));
    }

    #[test]
    fn register_payload_validates_nested_profile() {
        let payload: RegisterAccountRequest = serde_json::from_value(serde_json::json!({
            "kind": "blood_bank",
            "display_name": "",
            "email": "not-an-email"
        }))
        .expect("deserialize");
        let errors = payload.validate().expect_err("invalid payload");
        match errors.errors().get("profile") {
            Some(validator::ValidationErrorsKind::Struct(inner)) => {
                let fields = inner.field_errors();
                assert!(fields.contains_key("display_name"));
                assert!(fields.contains_key("email"));
            }
            other => panic!("expected nested profile errors, got {:?}", other),
        }
    }

    #[test]
    fn whitespace_display_name_fails_validation() {
        let blank = profile("   ");
        let errors = blank.validate().expect_err("blank name");
        let codes: Vec<_> = errors.field_errors()["display_name"]
            .iter()
            .map(|e| e.code.to_string())
            .collect();
        assert_eq!(codes, vec!["blank"]);

        assert!(profile("  Mona ").validate().is_ok());
    }
}
