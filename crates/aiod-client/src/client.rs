use std::sync::Arc;

use serde_json::Value;

use crate::classify::{ErrorOverrides, classify};
use crate::config::{ClientConfig, token_from_env};
use crate::error::Result;
use crate::session::SessionStore;
use crate::token::Token;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

mod asset_service;
mod auth_service;
mod bookmark_service;

/// Entry point for catalog access. Clones share one session.
#[derive(Clone)]
pub struct AiodClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl std::fmt::Debug for AiodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiodClient")
            .field("api_server", &self.config.api_server)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AiodClient {
    /// Builds a client on the reqwest transport. A token in `AIOD_TOKEN`
    /// takes precedence over one loaded from the token file.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        let client = Self::with_transport(config, Arc::new(transport))?;
        if let Some(raw) = token_from_env() {
            client.set_token(Token::new(raw))?;
        }
        Ok(client)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let config = config.validated()?;
        let session = match &config.token_file {
            Some(path) => SessionStore::open(path)?,
            None => SessionStore::in_memory(),
        };
        Ok(Self {
            config,
            transport,
            session,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self.transport.send(request)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "aiod request completed"
        );
        Ok(response)
    }

    /// Sends the request and decodes a 2xx body; anything else is classified.
    fn execute_json(&self, request: &HttpRequest) -> Result<Value> {
        let response = self.execute(request)?;
        if !response.is_success() {
            return Err(classify(request, &response, ErrorOverrides::default()));
        }
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        response.json()
    }
}
