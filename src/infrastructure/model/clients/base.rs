//! Shared HTTP plumbing for the model clients

use crate::infrastructure::model::types::ModelError;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How a client authenticates against its endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>` (OpenAI-compatible)
    Bearer,
    /// `?key=<key>` query parameter (Gemini)
    QueryKey,
    /// Local services such as Ollama
    None,
}

#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            id,
            endpoint,
            api_key,
            http: Client::new(),
        }
    }

    /// Join endpoint and path with exactly one slash between them
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        body: &Req,
        auth: AuthStyle,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let builder = self.http.post(url).json(body);
        let builder = self.authorize(builder, auth)?;
        self.send(builder).await
    }

    fn authorize(&self, builder: RequestBuilder, auth: AuthStyle) -> Result<RequestBuilder, ModelError> {
        Ok(match auth {
            AuthStyle::Bearer => builder.bearer_auth(self.require_api_key()?),
            AuthStyle::QueryKey => builder.query(&[("key", self.require_api_key()?)]),
            AuthStyle::None => builder,
        })
    }

    async fn send<Res: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Res, ModelError> {
        builder
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| ModelError::network(&self.id, e))?
            .json()
            .await
            .map_err(|e| ModelError::network(&self.id, e))
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_normalises_slashes() {
        let base = HttpClientBase::new("x".into(), "http://host:1/".into(), None);
        assert_eq!(base.build_url("/api/generate"), "http://host:1/api/generate");
        assert_eq!(base.build_url("v1/chat"), "http://host:1/v1/chat");
    }

    #[tokio::test]
    async fn keyed_auth_without_key_fails_before_sending() {
        let base = HttpClientBase::new("gemini".into(), "http://127.0.0.1:9".into(), Some("  ".into()));
        let result: Result<serde_json::Value, _> = base
            .post_json("http://127.0.0.1:9/x", &serde_json::json!({}), AuthStyle::QueryKey)
            .await;
        assert!(matches!(result, Err(ModelError::MissingApiKey { .. })));
    }
}
