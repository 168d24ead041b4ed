use chrono::Utc;
use serde_json::Value;

use crate::classify::{ErrorOverrides, classify};
use crate::error::{AiodError, ApiFailure, Result};
use crate::models::{CurrentUser, Credentials};
use crate::token::Token;
use crate::transport::{HttpRequest, Method};

use super::AiodClient;

const MISSING_TOKEN_DETAIL: &str = "auth response did not contain a token";

impl AiodClient {
    /// Exchanges credentials for a token and makes it the live session.
    ///
    /// An existing token is replaced without being revoked.
    pub fn create_token(&self, credentials: &Credentials) -> Result<Token> {
        let url = self.config.auth_url()?;
        let request =
            HttpRequest::new(Method::Post, url.as_str()).json(serde_json::to_value(credentials)?);
        let response = self.execute(&request)?;
        if !response.is_success() {
            return Err(classify(&request, &response, ErrorOverrides::default()));
        }

        let body = response.json().unwrap_or(Value::Null);
        let Some(token) = Token::from_auth_response(&body, Utc::now()) else {
            return Err(AiodError::Authentication(ApiFailure {
                status: response.status,
                detail: Some(MISSING_TOKEN_DETAIL.to_string()),
                reference: body
                    .get("reference")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                method: request.method.to_string(),
                url: request.url.clone(),
            }));
        };

        self.session.replace(token.clone())?;
        tracing::info!(
            user = %credentials.username,
            expires_at = ?token.expires_at(),
            "token created"
        );
        Ok(token)
    }

    /// Returns the live token, or `NotAuthenticated` when there is none or it
    /// has expired locally.
    pub fn get_token(&self) -> Result<Token> {
        self.session
            .live_token()?
            .ok_or(AiodError::NotAuthenticated)
    }

    pub fn set_token(&self, token: Token) -> Result<()> {
        self.session.replace(token)?;
        tracing::info!("token set explicitly");
        Ok(())
    }

    /// Clears the session and revokes the token server-side on a best-effort
    /// basis. A no-op when no token is held.
    pub fn invalidate_token(&self) -> Result<()> {
        let Some(token) = self.session.take()? else {
            return Ok(());
        };
        self.revoke(&token);
        tracing::info!("token invalidated");
        Ok(())
    }

    pub fn get_current_user(&self) -> Result<CurrentUser> {
        let token = self.get_token()?;
        let url = self.config.whoami_url()?;
        let request = HttpRequest::new(Method::Get, url.as_str()).bearer(token.access_token());
        let body = self.execute_json(&request)?;
        Ok(serde_json::from_value(body)?)
    }

    fn revoke(&self, token: &Token) {
        let url = match self.config.revoke_url() {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(error = %err, "token revoke skipped");
                return;
            }
        };
        let request = HttpRequest::new(Method::Post, url.as_str()).bearer(token.access_token());
        match self.execute(&request) {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                let err = classify(&request, &response, ErrorOverrides::default());
                tracing::warn!(error = %err, "token revoke rejected; local session cleared anyway");
            }
            Err(err) => {
                tracing::warn!(error = %err, "token revoke failed; local session cleared anyway");
            }
        }
    }
}
