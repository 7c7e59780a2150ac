use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

/// Body of a record creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    /// 1 lets the provider pick the TTL
    #[serde(default = "automatic_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

const fn automatic_ttl() -> u32 {
    1
}

impl NewRecord {
    #[must_use]
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
            content: content.into(),
            ttl: automatic_ttl(),
            proxied: false,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }
}

/// A DNS record addressed by zone and record ID
#[derive(Debug, Clone)]
pub struct RecordHandle<'a> {
    client: &'a ApiClient,
    id: String,
    path: String,
}

impl<'a> RecordHandle<'a> {
    pub(crate) fn new(client: &'a ApiClient, zone_prefix: &str, id: String) -> Self {
        let path = format!("{zone_prefix}/dns_records/{id}");
        Self { client, id, path }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch the record
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record cannot be decoded
    pub async fn details(&self) -> Result<DnsRecord> {
        let values = self.client.get(&self.path, &[]).await?;
        super::decode_single(values, &self.path)
    }

    /// Route traffic for `record` through the proxy.
    ///
    /// Returns `None` without calling the API when the record is not
    /// proxiable or already proxied.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or cannot be decoded
    pub async fn proxy(&self, record: &DnsRecord) -> Result<Option<DnsRecord>> {
        self.set_proxied(record, true).await
    }

    /// Send traffic for `record` straight to the origin.
    ///
    /// Returns `None` without calling the API when the record is not
    /// proxiable or already unproxied.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or cannot be decoded
    pub async fn unproxy(&self, record: &DnsRecord) -> Result<Option<DnsRecord>> {
        self.set_proxied(record, false).await
    }

    async fn set_proxied(&self, record: &DnsRecord, proxied: bool) -> Result<Option<DnsRecord>> {
        if !record.proxiable || record.proxied == proxied {
            debug!(
                "Leaving {} unchanged (proxiable={}, proxied={})",
                record.name, record.proxiable, record.proxied
            );
            return Ok(None);
        }

        info!("Setting proxied={} on {}", proxied, record.name);
        let updated = self
            .client
            .put(&self.path, &json!({ "proxied": proxied }), &[])
            .await?;
        Ok(Some(serde_json::from_value(updated)?))
    }
}
