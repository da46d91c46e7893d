// src/store/gist.rs
//! GitHub Gist as a single-document blob store. Each key is a file in the gist.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{KvStore, StoreError};
use crate::config::{GistSettings, USER_AGENT};

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, Option<GistFile>>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

#[derive(Clone)]
pub struct GistStore {
    client: Client,
    api_base: String,
    gist_id: String,
    token: String,
}

impl GistStore {
    pub fn new(api_base: &str, gist_id: &str, token: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            gist_id: gist_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_settings(s: &GistSettings) -> Result<Self, StoreError> {
        Self::new(&s.api_base, &s.gist_id, &s.token)
    }

    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.api_base, self.gist_id)
    }

    fn authed(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        rb.header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
    }

    async fn fetch_raw(&self, url: &str) -> Result<String, StoreError> {
        let rsp = self.authed(self.client.get(url)).send().await?;
        if !rsp.status().is_success() {
            return Err(StoreError::Status {
                status: rsp.status().as_u16(),
            });
        }
        Ok(rsp.text().await?)
    }
}

#[async_trait::async_trait]
impl KvStore for GistStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rsp = self.authed(self.client.get(self.gist_url())).send().await?;
        if !rsp.status().is_success() {
            return Err(StoreError::Status {
                status: rsp.status().as_u16(),
            });
        }
        let gist: GistResponse = rsp.json().await?;

        let Some(Some(file)) = gist.files.get(key) else {
            return Ok(None);
        };
        // GitHub inlines at most ~1MB per file; beyond that only raw_url is complete.
        match (&file.raw_url, file.truncated) {
            (Some(raw), true) => self.fetch_raw(raw).await.map(Some),
            _ => Ok(file.content.clone()),
        }
    }

    async fn put(&self, key: &str, doc: &str) -> Result<(), StoreError> {
        let body = serde_json::json!({ "files": { key: { "content": doc } } });
        let rsp = self
            .authed(self.client.patch(self.gist_url()))
            .json(&body)
            .send()
            .await?;
        if !rsp.status().is_success() {
            return Err(StoreError::Status {
                status: rsp.status().as_u16(),
            });
        }
        Ok(())
    }
}
