//! Which review actions a caller may be offered for an account.
//!
//! Advisory only: the console uses it to decide which controls to render,
//! while [`crate::services::lifecycle`] re-validates every request.

use std::collections::BTreeSet;

use crate::models::{
    account::Account,
    caller::CallerRole,
    lifecycle::{Action, LifecycleState},
};

pub fn authorized_actions(
    role: CallerRole,
    state: LifecycleState,
    is_active: bool,
) -> BTreeSet<Action> {
    if !role.has_review_authority() {
        return BTreeSet::new();
    }
    match (state, is_active) {
        (LifecycleState::PendingReview, _) => [Action::Approve, Action::Reject].into(),
        (LifecycleState::Approved, true) => [Action::Deactivate].into(),
        (LifecycleState::Approved, false) => [Action::Activate].into(),
        (LifecycleState::Rejected, _) => BTreeSet::new(),
    }
}

pub fn authorized_actions_for(role: CallerRole, account: &Account) -> BTreeSet<Action> {
    authorized_actions(role, account.lifecycle_state, account.is_active)
}

/// Actions among `actions` that must be confirmed with a reason.
pub fn reason_required(actions: &BTreeSet<Action>) -> Vec<Action> {
    actions
        .iter()
        .copied()
        .filter(Action::requires_reason)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(actions: &[Action]) -> BTreeSet<Action> {
        actions.iter().copied().collect()
    }

    #[test]
    fn reviewers_get_state_dependent_actions() {
        for role in [CallerRole::Admin, CallerRole::Observer] {
            assert_eq!(
                authorized_actions(role, LifecycleState::PendingReview, true),
                set(&[Action::Approve, Action::Reject])
            );
            assert_eq!(
                authorized_actions(role, LifecycleState::Approved, true),
                set(&[Action::Deactivate])
            );
            assert_eq!(
                authorized_actions(role, LifecycleState::Approved, false),
                set(&[Action::Activate])
            );
            assert!(authorized_actions(role, LifecycleState::Rejected, true).is_empty());
            assert!(authorized_actions(role, LifecycleState::Rejected, false).is_empty());
        }
    }

    #[test]
    fn other_roles_are_read_only() {
        for state in [
            LifecycleState::PendingReview,
            LifecycleState::Approved,
            LifecycleState::Rejected,
        ] {
            for is_active in [true, false] {
                assert!(authorized_actions(CallerRole::Registrant, state, is_active).is_empty());
            }
        }
    }

    #[test]
    fn reason_required_picks_reject_and_deactivate() {
        let pending = authorized_actions(CallerRole::Admin, LifecycleState::PendingReview, true);
        assert_eq!(reason_required(&pending), vec![Action::Reject]);

        let active = authorized_actions(CallerRole::Observer, LifecycleState::Approved, true);
        assert_eq!(reason_required(&active), vec![Action::Deactivate]);

        let inactive = authorized_actions(CallerRole::Observer, LifecycleState::Approved, false);
        assert!(reason_required(&inactive).is_empty());
    }
}
