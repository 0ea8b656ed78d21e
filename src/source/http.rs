//! HTTP implementation of the incident source.

use super::{IncidentSource, SourceError};
use crate::model::IncidentCategory;
use crate::source::dump;
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Basic-auth HTTP source. The client-level timeout is the per-fetch
/// deadline required of every `IncidentSource` implementation.
pub struct HttpIncidentSource {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    dump_dir: Option<PathBuf>,
}

/// Category endpoints wrap their records in a `results` envelope.
#[derive(Deserialize)]
struct ResultsEnvelope {
    results: Vec<serde_json::Value>,
}

/// Identity values arrive as integers or strings depending on source
/// vintage; both normalize to the string employee key.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmployeeKey {
    Int(i64),
    Text(String),
}

impl EmployeeKey {
    fn into_string(self) -> String {
        match self {
            EmployeeKey::Int(n) => n.to_string(),
            EmployeeKey::Text(s) => s,
        }
    }
}

impl HttpIncidentSource {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
        dump_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            dump_dir,
        })
    }

    async fn get_json(&self, path: &str, dump_name: &str) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let started = Instant::now();
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        let elapsed = started.elapsed();
        debug!(%url, ?elapsed, status = %resp.status(), "fetched");

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        if let Some(dir) = &self.dump_dir {
            if let Err(e) = dump::write_payload(dir, dump_name, &url, elapsed, status, &headers, &body)
            {
                warn!(%url, "failed to write debug dump: {e}");
            }
        }

        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        serde_json::from_str(&body).map_err(|e| SourceError::Body(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IncidentSource for HttpIncidentSource {
    async fn fetch_identities(&self) -> Result<HashMap<String, String>, SourceError> {
        let value = self.get_json("identities", "identities").await?;
        let entries: HashMap<String, EmployeeKey> =
            serde_json::from_value(value).map_err(|e| SourceError::Body(e.to_string()))?;
        Ok(entries
            .into_iter()
            .map(|(identifier, key)| (identifier, key.into_string()))
            .collect())
    }

    async fn fetch_category(
        &self,
        category: IncidentCategory,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let value = self
            .get_json(&format!("incidents/{category}"), category.as_str())
            .await?;
        let envelope: ResultsEnvelope =
            serde_json::from_value(value).map_err(|e| SourceError::Body(e.to_string()))?;
        Ok(envelope.results)
    }
}
