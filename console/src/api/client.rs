use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    api::{error::ConsoleError, types::*},
    config::ConsoleConfig,
};

/// Typed client for the account review endpoints.
///
/// Mutating calls are sent once; callers decide whether to offer a retry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConsoleError::Unexpected {
                status: 0,
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Result<Self, ConsoleError> {
        Self::new(&ConsoleConfig::new(base_url))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ConsoleError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| ConsoleError::from_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ConsoleError::from_transport(&e));
        }

        let body = response.json::<ApiErrorBody>().await.ok();
        let err = ConsoleError::from_response(status.as_u16(), body);
        log::warn!("request failed with {}: {}", status, err);
        Err(err)
    }

    pub async fn get_account(&self, account_id: &str) -> Result<AccountDetail, ConsoleError> {
        self.send(self.client.get(self.url(&format!("/accounts/{}", account_id))))
            .await
    }

    pub async fn list_accounts(
        &self,
        filter: &AccountListFilter,
    ) -> Result<AccountPage, ConsoleError> {
        self.send(self.client.get(self.url("/accounts")).query(filter))
            .await
    }

    pub async fn status_logs(&self, account_id: &str) -> Result<Vec<StatusLogEntry>, ConsoleError> {
        self.send(
            self.client
                .get(self.url(&format!("/accounts/{}/status-logs", account_id))),
        )
        .await
    }

    pub async fn authorized_actions(
        &self,
        account_id: &str,
    ) -> Result<AvailableActions, ConsoleError> {
        self.send(
            self.client
                .get(self.url(&format!("/accounts/{}/actions", account_id))),
        )
        .await
    }

    pub async fn apply_transition(
        &self,
        account_id: &str,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, ConsoleError> {
        log::debug!("applying {} to account {}", request.action.as_str(), account_id);
        self.send(
            self.client
                .post(self.url(&format!("/accounts/{}/transitions", account_id)))
                .json(request),
        )
        .await
    }

    pub async fn register_account(
        &self,
        request: &RegisterAccountRequest,
    ) -> Result<Account, ConsoleError> {
        self.send(self.client.post(self.url("/accounts")).json(request))
            .await
    }
}
