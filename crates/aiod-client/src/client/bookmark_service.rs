use serde_json::{Value, json};

use crate::error::Result;
use crate::transport::{HttpRequest, Method};

use super::AiodClient;
use super::asset_service::{expect_array, push_identifier};

impl AiodClient {
    /// Bookmarks belong to the caller, so every operation here requires a
    /// live token and fails with `NotAuthenticated` before any request.
    pub fn list_bookmarks(&self) -> Result<Vec<Value>> {
        let token = self.get_token()?;
        let url = self.config.bookmarks_url()?;
        let request = HttpRequest::new(Method::Get, url.as_str()).bearer(token.access_token());
        let body = self.execute_json(&request)?;
        expect_array(body, Method::Get, &url, "bookmarks")
    }

    pub fn add_bookmark(&self, identifier: &str) -> Result<Value> {
        let token = self.get_token()?;
        let url = self.config.bookmarks_url()?;
        let request = HttpRequest::new(Method::Post, url.as_str())
            .bearer(token.access_token())
            .json(json!({ "identifier": identifier }));
        let created = self.execute_json(&request)?;
        tracing::info!(identifier, "bookmark added");
        Ok(created)
    }

    pub fn remove_bookmark(&self, identifier: &str) -> Result<()> {
        let token = self.get_token()?;
        let url = push_identifier(self.config.bookmarks_url()?, identifier)?;
        let request = HttpRequest::new(Method::Delete, url.as_str()).bearer(token.access_token());
        self.execute_json(&request)?;
        tracing::info!(identifier, "bookmark removed");
        Ok(())
    }
}
