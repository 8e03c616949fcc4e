use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::AuditError;

/// PostgREST-style insert sink: `POST {base_url}/{table}` with a JSON row.
#[derive(Clone)]
pub struct RestSink {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestSink {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AuditError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &'static str,
        row: &T,
    ) -> Result<(), AuditError> {
        let mut request = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", "return=minimal")
            .json(row);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Rejected {
                table,
                status: status.as_u16(),
            });
        }
        debug!(table, status = status.as_u16(), "audit row inserted");
        Ok(())
    }
}
