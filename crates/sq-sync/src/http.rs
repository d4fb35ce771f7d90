//! HTTP implementation of the remote store
//!
//! Speaks a PostgREST-style dialect: inserts are POSTs returning the new
//! representation, updates PATCH by id filter, listings GET with an owner
//! filter. Row payloads are arrays even for single records.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sq_core::CoreError;

use crate::config::SyncConfig;
use crate::remote::{RemoteProject, RemoteProjectRecord, RemoteSessionEvent, RemoteStore};

const PROJECTS_COLLECTION: &str = "projects";
const SESSIONS_COLLECTION: &str = "sessions";

#[derive(Debug)]
pub struct HttpRemoteStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build remote store client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn insert_project(&self, record: &RemoteProjectRecord) -> Result<String> {
        let response = self
            .authed(self.client.post(self.collection_url(PROJECTS_COLLECTION)))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await
            .context("project insert request failed")?;

        let body = read_success(response).await?;
        parse_inserted_id(&body)
    }

    async fn update_project(&self, remote_id: &str, record: &RemoteProjectRecord) -> Result<()> {
        let response = self
            .authed(self.client.patch(self.collection_url(PROJECTS_COLLECTION)))
            .query(&[("id", format!("eq.{remote_id}"))])
            .json(record)
            .send()
            .await
            .context("project update request failed")?;

        read_success(response).await?;
        Ok(())
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<RemoteProject>> {
        let response = self
            .authed(self.client.get(self.collection_url(PROJECTS_COLLECTION)))
            .query(&[
                ("owner_id", format!("eq.{owner_id}")),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await
            .context("project listing request failed")?;

        let body = read_success(response).await?;
        serde_json::from_str(&body).context("failed to parse remote project listing")
    }

    async fn insert_session_event(&self, event: &RemoteSessionEvent) -> Result<()> {
        let response = self
            .authed(self.client.post(self.collection_url(SESSIONS_COLLECTION)))
            .json(&[event])
            .send()
            .await
            .context("session event insert request failed")?;

        read_success(response).await?;
        Ok(())
    }
}

async fn read_success(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("failed to read remote response body")?;

    if !status.is_success() {
        return Err(CoreError::RemoteStatus {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    Ok(body)
}

/// Extract the id of the first returned row. Remote ids may be numeric
/// or string-typed depending on the collection's key column.
fn parse_inserted_id(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).context("failed to parse insert response")?;

    match value.get(0).and_then(|row| row.get("id")) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(CoreError::RemoteIdMissing.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inserted_id_string() {
        let id = parse_inserted_id(r#"[{"id": "rp_7", "name": "x"}]"#).unwrap();
        assert_eq!(id, "rp_7");
    }

    #[test]
    fn test_parse_inserted_id_numeric() {
        let id = parse_inserted_id(r#"[{"id": 42}]"#).unwrap();
        assert_eq!(id, "42");
    }

    #[test]
    fn test_parse_inserted_id_missing() {
        let err = parse_inserted_id(r#"[]"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("Remote store returned no id for inserted record")
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = SyncConfig {
            base_url: "https://remote.example/rest/v1/".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 5,
        };
        let store = HttpRemoteStore::new(&config).unwrap();
        assert_eq!(
            store.collection_url(PROJECTS_COLLECTION),
            "https://remote.example/rest/v1/projects"
        );
    }
}
