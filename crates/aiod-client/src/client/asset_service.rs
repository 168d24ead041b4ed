use reqwest::Url;
use serde_json::Value;

use crate::error::{AiodError, ApiFailure, Result};
use crate::models::Page;
use crate::resource::{ResourceKind, Taxonomy};
use crate::token::Token;
use crate::transport::{HttpRequest, Method};

use super::AiodClient;

impl AiodClient {
    /// Fetches one asset by kind name. Unknown kinds fail before any request
    /// is sent.
    pub fn fetch(&self, kind: &str, identifier: &str, query: &[(&str, &str)]) -> Result<Value> {
        let kind = kind.parse::<ResourceKind>()?;
        self.fetch_asset(kind, identifier, query)
    }

    /// The identifier always occupies exactly one path segment below the
    /// kind's collection, whatever characters it contains.
    pub fn fetch_asset(
        &self,
        kind: ResourceKind,
        identifier: &str,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        let collection = self
            .config
            .endpoint(&kind.collection_path(&self.config.api_version))?;
        let url = with_query(push_identifier(collection, identifier)?, query);
        self.dispatch(url)
    }

    pub fn list(&self, kind: ResourceKind, page: Page) -> Result<Vec<Value>> {
        let path = kind.collection_path(&self.config.api_version);
        let offset = page.offset.to_string();
        let limit = page.limit.to_string();
        let url = with_query(
            self.config.endpoint(&path)?,
            &[("offset", offset.as_str()), ("limit", limit.as_str())],
        );
        let body = self.dispatch(url.clone())?;
        expect_array(body, Method::Get, &url, kind.as_str())
    }

    pub fn count(&self, kind: ResourceKind) -> Result<u64> {
        let url = self.config.endpoint(&kind.count_path())?;
        let body = self.dispatch(url.clone())?;
        body.as_u64().ok_or_else(|| {
            unexpected_payload(
                Method::Get,
                &url,
                format!("count for {kind} is not an integer: {body}"),
            )
        })
    }

    /// Reads a taxonomy by name. Unknown names fail before any request is
    /// sent.
    pub fn taxonomy(&self, name: &str) -> Result<Vec<Value>> {
        let taxonomy = name.parse::<Taxonomy>()?;
        self.taxonomy_terms(taxonomy)
    }

    pub fn taxonomy_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Value>> {
        let url = self
            .config
            .endpoint(&taxonomy.path(&self.config.api_version))?;
        let body = self.dispatch(url.clone())?;
        expect_array(body, Method::Get, &url, taxonomy.as_str())
    }

    fn dispatch(&self, url: Url) -> Result<Value> {
        let mut request = HttpRequest::new(Method::Get, url.as_str());
        if let Some(token) = self.optional_token()? {
            request = request.bearer(token.access_token());
        }
        self.execute_json(&request)
    }

    /// Reads are authenticated when possible and anonymous otherwise.
    fn optional_token(&self) -> Result<Option<Token>> {
        match self.get_token() {
            Ok(token) => Ok(Some(token)),
            Err(AiodError::NotAuthenticated) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Appends `identifier` as one percent-encoded segment. Segments the URL
/// parser would collapse are rejected instead.
pub(super) fn push_identifier(mut url: Url, identifier: &str) -> Result<Url> {
    if matches!(identifier, "" | "." | "..") {
        return Err(AiodError::InvalidIdentifier(identifier.to_string()));
    }
    url.path_segments_mut()
        .map_err(|()| AiodError::InvalidConfig("api server cannot carry a path".to_string()))?
        .pop_if_empty()
        .push(identifier);
    Ok(url)
}

/// A 2xx collection read must decode to a JSON array; `null` reads as empty.
pub(super) fn expect_array(
    body: Value,
    method: Method,
    url: &Url,
    what: &str,
) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(unexpected_payload(
            method,
            url,
            format!("{what} response is not a JSON array: {other}"),
        )),
    }
}

fn unexpected_payload(method: Method, url: &Url, detail: String) -> AiodError {
    AiodError::Api(ApiFailure {
        status: 200,
        detail: Some(detail),
        reference: None,
        method: method.to_string(),
        url: url.to_string(),
    })
}

fn with_query(mut url: Url, query: &[(&str, &str)]) -> Url {
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter().copied());
    }
    url
}
