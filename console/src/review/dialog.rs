use thiserror::Error;

use crate::api::{
    Action, ApiClient, AvailableActions, ConsoleError, TransitionOutcome, TransitionRequest,
};

const REASON_REQUIRED_MESSAGE: &str = "A reason is required for this action";

/// Why a submit was refused before any request went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("a request for this account is already in flight")]
    InFlight,
    #[error("the account changed; refresh before acting again")]
    AwaitingRefresh,
    #[error("this action is no longer offered for the account")]
    NotOffered,
    #[error("{}", REASON_REQUIRED_MESSAGE)]
    MissingReason,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Blocked(#[from] SubmitBlocked),
    #[error(transparent)]
    Api(#[from] ConsoleError),
}

/// Confirmation step for a single review action.
///
/// Holds the reason draft and the submit guard. It never changes what the
/// console shows about the account; only a re-fetch does that.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDialog {
    account_id: String,
    action: Action,
    seen_version: i64,
    reason_required: bool,
    offered: bool,
    reason: String,
    in_flight: bool,
    awaiting_refresh: bool,
    error: Option<ConsoleError>,
}

impl ReviewDialog {
    /// Opens the dialog for an action the server currently offers.
    pub fn open(actions: &AvailableActions, action: Action) -> Option<Self> {
        if !actions.available_actions.contains(&action) {
            return None;
        }
        Some(Self {
            account_id: actions.account_id.clone(),
            action,
            seen_version: actions.version,
            reason_required: actions.reason_required.contains(&action)
                || action.requires_reason(),
            offered: true,
            reason: String::new(),
            in_flight: false,
            awaiting_refresh: false,
            error: None,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn reason_required(&self) -> bool {
        self.reason_required
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_awaiting_refresh(&self) -> bool {
        self.awaiting_refresh
    }

    /// Message to show next to the form, if the last attempt failed.
    pub fn error(&self) -> Option<&ConsoleError> {
        self.error.as_ref()
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
        if matches!(self.error, Some(ConsoleError::MissingReason(_))) && self.has_reason() {
            self.error = None;
        }
    }

    fn has_reason(&self) -> bool {
        !self.reason.trim().is_empty()
    }

    fn blocked(&self) -> Option<SubmitBlocked> {
        if self.in_flight {
            Some(SubmitBlocked::InFlight)
        } else if self.awaiting_refresh {
            Some(SubmitBlocked::AwaitingRefresh)
        } else if !self.offered {
            Some(SubmitBlocked::NotOffered)
        } else if self.reason_required && !self.has_reason() {
            Some(SubmitBlocked::MissingReason)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        self.blocked().is_none()
    }

    /// Builds the request and marks the dialog in flight.
    ///
    /// A blank mandatory reason is reported inline and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<TransitionRequest, SubmitBlocked> {
        if let Some(blocked) = self.blocked() {
            if blocked == SubmitBlocked::MissingReason {
                self.error = Some(ConsoleError::MissingReason(
                    REASON_REQUIRED_MESSAGE.to_string(),
                ));
            }
            return Err(blocked);
        }

        let trimmed = self.reason.trim();
        self.in_flight = true;
        self.error = None;
        Ok(TransitionRequest {
            action: self.action,
            reason: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            expected_version: Some(self.seen_version),
        })
    }

    /// Records the server's answer and re-enables submission.
    ///
    /// Errors that mean the view is stale keep the dialog locked until
    /// [`refreshed`](Self::refreshed).
    pub fn finish(
        &mut self,
        result: Result<TransitionOutcome, ConsoleError>,
    ) -> Result<TransitionOutcome, ConsoleError> {
        self.in_flight = false;
        match result {
            Ok(outcome) => {
                self.error = None;
                self.reason.clear();
                Ok(outcome)
            }
            Err(err) => {
                if err.requires_refresh() {
                    self.awaiting_refresh = true;
                }
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Unlocks the dialog after the account was re-fetched.
    ///
    /// Returns whether the action is still offered in the fresh state.
    pub fn refreshed(&mut self, actions: &AvailableActions) -> bool {
        self.awaiting_refresh = false;
        self.offered = actions.account_id == self.account_id
            && actions.available_actions.contains(&self.action);
        if self.offered {
            self.seen_version = actions.version;
            self.reason_required =
                actions.reason_required.contains(&self.action) || self.action.requires_reason();
            if self.error.as_ref().is_some_and(ConsoleError::requires_refresh) {
                self.error = None;
            }
        }
        self.offered
    }

    /// Sends the action once. No retry happens here, even for transient failures.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<TransitionOutcome, ReviewError> {
        let request = self.begin_submit()?;
        log::debug!(
            "submitting {} for account {}",
            request.action.as_str(),
            self.account_id
        );
        let result = client.apply_transition(&self.account_id, &request).await;
        Ok(self.finish(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Account, LifecycleState, ResultingState, StatusLogEntry};
    use chrono::Utc;

    fn actions(state: LifecycleState, is_active: bool, offered: &[Action]) -> AvailableActions {
        AvailableActions {
            account_id: "acc-1".into(),
            lifecycle_state: state,
            is_active,
            version: 1,
            available_actions: offered.to_vec(),
            reason_required: offered
                .iter()
                .copied()
                .filter(|a| a.requires_reason())
                .collect(),
        }
    }

    fn pending() -> AvailableActions {
        actions(
            LifecycleState::PendingReview,
            true,
            &[Action::Approve, Action::Reject],
        )
    }

    fn outcome() -> TransitionOutcome {
        let now = Utc::now();
        TransitionOutcome {
            account: Account {
                id: "acc-1".into(),
                kind: "donor".into(),
                lifecycle_state: LifecycleState::Rejected,
                is_active: true,
                display_name: "Donor".into(),
                email: None,
                phone: None,
                blood_type: None,
                location_id: None,
                avatar_url: None,
                version: 2,
                created_at: now,
                updated_at: now,
            },
            new_log_entry: StatusLogEntry {
                id: "log-1".into(),
                account_id: "acc-1".into(),
                resulting_state: Some(ResultingState::Rejected),
                display_label: "Rejected".into(),
                description: Some("duplicate".into()),
                actor_id: Some("op-1".into()),
                created_at: now,
            },
        }
    }

    #[test]
    fn open_requires_offered_action() {
        assert!(ReviewDialog::open(&pending(), Action::Deactivate).is_none());
        let dialog = ReviewDialog::open(&pending(), Action::Approve).unwrap();
        assert!(!dialog.reason_required());
        assert!(dialog.can_submit());
    }

    #[test]
    fn blank_reason_blocks_reject_inline() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Reject).unwrap();
        dialog.set_reason("   ");
        assert!(!dialog.can_submit());

        assert_eq!(dialog.begin_submit(), Err(SubmitBlocked::MissingReason));
        assert!(matches!(dialog.error(), Some(ConsoleError::MissingReason(_))));
        assert!(!dialog.is_in_flight());

        dialog.set_reason("duplicate registration");
        assert!(dialog.error().is_none());
        assert!(dialog.can_submit());
    }

    #[test]
    fn begin_submit_trims_reason_and_guards_double_submit() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Reject).unwrap();
        dialog.set_reason("  duplicate  ");

        let request = dialog.begin_submit().unwrap();
        assert_eq!(request.action, Action::Reject);
        assert_eq!(request.reason.as_deref(), Some("duplicate"));
        assert!(!dialog.can_submit());
        assert_eq!(dialog.begin_submit(), Err(SubmitBlocked::InFlight));
    }

    #[test]
    fn optional_blank_reason_is_omitted() {
        let approved_inactive = actions(LifecycleState::Approved, false, &[Action::Activate]);
        let mut dialog = ReviewDialog::open(&approved_inactive, Action::Activate).unwrap();
        dialog.set_reason("  ");
        let request = dialog.begin_submit().unwrap();
        assert_eq!(request.reason, None);
    }

    #[test]
    fn success_clears_draft_and_reenables() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Reject).unwrap();
        dialog.set_reason("duplicate");
        dialog.begin_submit().unwrap();

        let result = dialog.finish(Ok(outcome()));
        assert!(result.is_ok());
        assert!(!dialog.is_in_flight());
        assert_eq!(dialog.reason(), "");
        assert!(dialog.error().is_none());
    }

    #[test]
    fn conflict_locks_until_refreshed() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Approve).unwrap();
        dialog.begin_submit().unwrap();
        let err = dialog
            .finish(Err(ConsoleError::Conflict("changed".into())))
            .unwrap_err();
        assert!(err.requires_refresh());
        assert!(dialog.is_awaiting_refresh());
        assert_eq!(dialog.begin_submit(), Err(SubmitBlocked::AwaitingRefresh));

        let rejected = actions(LifecycleState::Rejected, true, &[]);
        assert!(!dialog.refreshed(&rejected));
        assert!(!dialog.is_awaiting_refresh());
        assert_eq!(dialog.begin_submit(), Err(SubmitBlocked::NotOffered));
    }

    #[test]
    fn conflict_then_refresh_with_same_offer_unlocks() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Approve).unwrap();
        dialog.begin_submit().unwrap();
        let _ = dialog.finish(Err(ConsoleError::Conflict("changed".into())));

        assert!(dialog.refreshed(&pending()));
        assert!(dialog.error().is_none());
        assert!(dialog.can_submit());
    }

    #[test]
    fn request_carries_the_version_shown() {
        let mut seen = pending();
        seen.version = 4;
        let mut dialog = ReviewDialog::open(&seen, Action::Approve).unwrap();
        assert_eq!(dialog.begin_submit().unwrap().expected_version, Some(4));

        let _ = dialog.finish(Err(ConsoleError::Conflict("changed".into())));
        seen.version = 5;
        assert!(dialog.refreshed(&seen));
        assert_eq!(dialog.begin_submit().unwrap().expected_version, Some(5));
    }

    #[test]
    fn illegal_transition_locks_until_refreshed() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Reject).unwrap();
        dialog.set_reason("duplicate");
        dialog.begin_submit().unwrap();
        let _ = dialog.finish(Err(ConsoleError::IllegalTransition(
            "reject is not allowed from approved".into(),
        )));

        assert!(dialog.is_awaiting_refresh());
        assert_eq!(dialog.begin_submit(), Err(SubmitBlocked::AwaitingRefresh));

        let approved = actions(LifecycleState::Approved, true, &[Action::Deactivate]);
        assert!(!dialog.refreshed(&approved));
        assert!(!dialog.can_submit());
    }

    #[test]
    fn transient_failure_keeps_draft_for_manual_retry() {
        let mut dialog = ReviewDialog::open(&pending(), Action::Reject).unwrap();
        dialog.set_reason("duplicate");
        dialog.begin_submit().unwrap();
        let err = dialog
            .finish(Err(ConsoleError::TransientFailure("timeout".into())))
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(dialog.reason(), "duplicate");
        assert!(!dialog.is_awaiting_refresh());
        assert!(dialog.can_submit());
    }
}
