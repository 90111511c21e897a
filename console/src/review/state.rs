use std::collections::BTreeMap;

use crate::api::{
    AccountDetail, AccountListFilter, AccountPage, ApiClient, ConsoleError, TransitionOutcome,
};

#[derive(Debug, Clone, PartialEq)]
struct CachedPage {
    page: AccountPage,
    stale: bool,
}

/// What the console currently shows: the open account and the list pages it
/// has loaded.
///
/// Contents only ever come from server responses. A committed transition
/// does not patch anything in place; it marks everything stale instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountReviewState {
    detail: Option<AccountDetail>,
    detail_stale: bool,
    pages: BTreeMap<AccountListFilter, CachedPage>,
}

impl AccountReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detail(&self) -> Option<&AccountDetail> {
        self.detail.as_ref()
    }

    pub fn page(&self, filter: &AccountListFilter) -> Option<&AccountPage> {
        self.pages.get(filter).map(|cached| &cached.page)
    }

    pub fn apply_detail(&mut self, detail: AccountDetail) {
        self.detail = Some(detail);
        self.detail_stale = false;
    }

    pub fn apply_page(&mut self, filter: AccountListFilter, page: AccountPage) {
        self.pages.insert(filter, CachedPage { page, stale: false });
    }

    pub fn clear_detail(&mut self) {
        self.detail = None;
        self.detail_stale = false;
    }

    pub fn on_transition_committed(&mut self, outcome: &TransitionOutcome) {
        log::debug!(
            "transition committed for account {}; invalidating cached views",
            outcome.account.id
        );
        self.invalidate_all();
    }

    /// Failures that mean the view is outdated invalidate it; others leave it alone.
    pub fn on_transition_failed(&mut self, err: &ConsoleError) {
        if err.requires_refresh() {
            self.invalidate_all();
        }
    }

    pub fn invalidate_all(&mut self) {
        if self.detail.is_some() {
            self.detail_stale = true;
        }
        for cached in self.pages.values_mut() {
            cached.stale = true;
        }
    }

    pub fn needs_refetch(&self) -> bool {
        self.detail_stale
    }

    pub fn stale_pages(&self) -> Vec<AccountListFilter> {
        self.pages
            .iter()
            .filter(|(_, cached)| cached.stale)
            .map(|(filter, _)| filter.clone())
            .collect()
    }

    /// Re-fetches the stale detail and every stale list page.
    ///
    /// A vanished account clears the detail. The first other failure is
    /// returned and leaves the remaining entries stale.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), ConsoleError> {
        if self.detail_stale {
            if let Some(account_id) = self.detail.as_ref().map(|d| d.account.id.clone()) {
                match client.get_account(&account_id).await {
                    Ok(detail) => self.apply_detail(detail),
                    Err(ConsoleError::NotFound(_)) => self.clear_detail(),
                    Err(err) => return Err(err),
                }
            }
        }

        for filter in self.stale_pages() {
            let page = client.list_accounts(&filter).await?;
            self.apply_page(filter, page);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Account, Action, LifecycleState, ResultingState, StatusLogEntry};
    use chrono::Utc;

    fn account(state: LifecycleState, version: i64) -> Account {
        let now = Utc::now();
        Account {
            id: "acc-1".into(),
            kind: "donor".into(),
            lifecycle_state: state,
            is_active: true,
            display_name: "Donor".into(),
            email: None,
            phone: None,
            blood_type: Some("o_neg".into()),
            location_id: None,
            avatar_url: None,
            version,
            created_at: now,
            updated_at: now,
        }
    }

    fn detail(state: LifecycleState, version: i64) -> AccountDetail {
        AccountDetail {
            account: account(state, version),
            status_logs: vec![],
            available_actions: vec![Action::Approve, Action::Reject],
            reason_required: vec![Action::Reject],
        }
    }

    fn page() -> AccountPage {
        AccountPage {
            items: vec![account(LifecycleState::PendingReview, 1)],
            total: 1,
            total_pages: 1,
            page: 1,
            page_size: 20,
        }
    }

    fn outcome() -> TransitionOutcome {
        TransitionOutcome {
            account: account(LifecycleState::Approved, 2),
            new_log_entry: StatusLogEntry {
                id: "log-1".into(),
                account_id: "acc-1".into(),
                resulting_state: Some(ResultingState::Approved),
                display_label: "Approved".into(),
                description: None,
                actor_id: Some("op-1".into()),
                created_at: Utc::now(),
            },
        }
    }

    fn pending_filter() -> AccountListFilter {
        AccountListFilter {
            state: Some(LifecycleState::PendingReview),
            ..Default::default()
        }
    }

    #[test]
    fn committed_transition_invalidates_without_patching() {
        let mut state = AccountReviewState::new();
        state.apply_detail(detail(LifecycleState::PendingReview, 1));
        state.apply_page(pending_filter(), page());
        state.apply_page(AccountListFilter::default(), page());

        state.on_transition_committed(&outcome());

        assert!(state.needs_refetch());
        assert_eq!(state.stale_pages().len(), 2);
        let shown = state.detail().unwrap();
        assert_eq!(shown.account.lifecycle_state, LifecycleState::PendingReview);
        assert_eq!(shown.account.version, 1);
    }

    #[test]
    fn applying_fresh_data_clears_staleness() {
        let mut state = AccountReviewState::new();
        state.apply_detail(detail(LifecycleState::PendingReview, 1));
        state.apply_page(pending_filter(), page());
        state.invalidate_all();

        state.apply_detail(detail(LifecycleState::Approved, 2));
        state.apply_page(pending_filter(), page());

        assert!(!state.needs_refetch());
        assert!(state.stale_pages().is_empty());
        assert_eq!(
            state.detail().unwrap().account.lifecycle_state,
            LifecycleState::Approved
        );
    }

    #[test]
    fn only_refresh_worthy_failures_invalidate() {
        let mut state = AccountReviewState::new();
        state.apply_detail(detail(LifecycleState::PendingReview, 1));

        state.on_transition_failed(&ConsoleError::MissingReason("x".into()));
        state.on_transition_failed(&ConsoleError::TransientFailure("x".into()));
        assert!(!state.needs_refetch());

        state.on_transition_failed(&ConsoleError::Conflict("x".into()));
        assert!(state.needs_refetch());
    }

    #[test]
    fn illegal_transition_marks_views_stale() {
        let mut state = AccountReviewState::new();
        state.apply_detail(detail(LifecycleState::PendingReview, 1));
        state.apply_page(pending_filter(), page());

        state.on_transition_failed(&ConsoleError::IllegalTransition(
            "reject is not allowed from approved".into(),
        ));

        assert!(state.needs_refetch());
        assert_eq!(state.stale_pages(), vec![pending_filter()]);
    }

    #[test]
    fn nothing_to_refetch_without_detail() {
        let mut state = AccountReviewState::new();
        state.on_transition_committed(&outcome());
        assert!(!state.needs_refetch());
        assert!(state.stale_pages().is_empty());
    }
}
