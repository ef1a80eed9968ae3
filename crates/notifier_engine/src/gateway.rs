use std::time::Duration;

use async_trait::async_trait;

/// Fixed resource the discard (undo) call deletes from, whatever the
/// message kind was.
pub const DISCARD_RESOURCE: &str = "emails/history";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl GatewaySettings {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
}

/// The two terminal transitions of a pending server-side job. The
/// dispatcher never reads job state; it only fires these and reacts to
/// success or failure.
#[async_trait]
pub trait JobActionGateway: Send + Sync {
    /// Commit the job: create under `{resource}/{template_id}/{history_id}`
    /// with an empty body.
    async fn confirm(
        &self,
        resource: &str,
        template_id: &str,
        history_id: &str,
    ) -> Result<(), GatewayError>;

    /// Roll the job back: delete its history entry.
    async fn discard(&self, history_id: &str) -> Result<(), GatewayError>;
}

/// Gateway over the platform's generic REST layer.
pub struct RestGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl RestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::Client(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api_base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn settle(&self, request: reqwest::RequestBuilder) -> Result<(), GatewayError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl JobActionGateway for RestGateway {
    async fn confirm(
        &self,
        resource: &str,
        template_id: &str,
        history_id: &str,
    ) -> Result<(), GatewayError> {
        let url = self.url(&format!("{resource}/{template_id}/{history_id}"));
        self.settle(self.authorize(self.client.post(url))).await
    }

    async fn discard(&self, history_id: &str) -> Result<(), GatewayError> {
        let url = self.url(&format!("{DISCARD_RESOURCE}/{history_id}"));
        self.settle(self.authorize(self.client.delete(url))).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::Timeout(err.to_string());
    }
    GatewayError::Network(err.to_string())
}
