use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{TokenId, TokenRecord},
    error::{ApiError, ApiException},
    protocol::{AddTokenRequest, AddTokenResponse, UpdateTokenRequest},
};
use tracing::debug;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8443";

/// The four remote operations the console relies on. Identity and the
/// authoritative supply are assigned on the registry side.
#[async_trait]
pub trait RegistryService: Send + Sync {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>>;
    async fn add_token(&self, name: &str, symbol: &str, initial_supply: f64) -> Result<TokenId>;
    async fn update_token(
        &self,
        token_id: TokenId,
        name: &str,
        symbol: &str,
        total_supply: f64,
    ) -> Result<()>;
    async fn delete_token(&self, token_id: TokenId) -> Result<()>;
}

pub struct HttpRegistryClient {
    http: Client,
    server_url: String,
}

impl HttpRegistryClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let server_url = server_url.into().trim().trim_end_matches('/').to_string();
        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(anyhow!(
                "server_url must start with http:// or https://, got '{server_url}'"
            ));
        }
        Ok(Self {
            http: Client::new(),
            server_url,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl RegistryService for HttpRegistryClient {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let server_url = &self.server_url;
        let response = self
            .http
            .get(format!("{server_url}/tokens"))
            .send()
            .await
            .with_context(|| format!("failed to reach registry at {server_url}"))?;
        let tokens: Vec<TokenRecord> = check_status(response).await?.json().await?;
        debug!(count = tokens.len(), "fetched token list");
        Ok(tokens)
    }

    async fn add_token(&self, name: &str, symbol: &str, initial_supply: f64) -> Result<TokenId> {
        let server_url = &self.server_url;
        let response = self
            .http
            .post(format!("{server_url}/tokens"))
            .json(&AddTokenRequest::new(name, symbol, initial_supply))
            .send()
            .await
            .with_context(|| format!("failed to reach registry at {server_url}"))?;
        let created: AddTokenResponse = check_status(response).await?.json().await?;
        Ok(created.token_id)
    }

    async fn update_token(
        &self,
        token_id: TokenId,
        name: &str,
        symbol: &str,
        total_supply: f64,
    ) -> Result<()> {
        let server_url = &self.server_url;
        let response = self
            .http
            .put(format!("{server_url}/tokens/{}", token_id.0))
            .json(&UpdateTokenRequest::new(name, symbol, total_supply))
            .send()
            .await
            .with_context(|| format!("failed to reach registry at {server_url}"))?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_token(&self, token_id: TokenId) -> Result<()> {
        let server_url = &self.server_url;
        let response = self
            .http
            .delete(format!("{server_url}/tokens/{}", token_id.0))
            .send()
            .await
            .with_context(|| format!("failed to reach registry at {server_url}"))?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-success response into an [`ApiException`] when the body is
/// a registry error, or a plain status error otherwise.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(ApiException::from(api_error).into()),
        Err(_) => Err(anyhow!("registry responded with {status}: {body}")),
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
