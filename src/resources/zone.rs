use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

use super::record::{DnsRecord, NewRecord, RecordHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub name_servers: Vec<String>,
}

/// A zone addressed by ID
#[derive(Debug, Clone)]
pub struct ZoneHandle<'a> {
    client: &'a ApiClient,
    id: String,
    prefix: String,
}

impl<'a> ZoneHandle<'a> {
    pub(crate) fn new(client: &'a ApiClient, id: String) -> Self {
        let prefix = format!("/zones/{id}");
        Self { client, id, prefix }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch the zone
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the zone cannot be decoded
    pub async fn details(&self) -> Result<Zone> {
        let values = self.client.get(&self.prefix, &[]).await?;
        super::decode_single(values, &self.prefix)
    }

    /// List every DNS record in the zone, following pagination
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or a record cannot be decoded
    pub async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let values = self
            .client
            .get(&format!("{}/dns_records", self.prefix), &[])
            .await?;
        super::decode_all(values)
    }

    /// Create a DNS record in the zone
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the record or the response cannot
    /// be decoded
    pub async fn create_record(&self, record: &NewRecord) -> Result<DnsRecord> {
        let created = self
            .client
            .post(&format!("{}/dns_records", self.prefix), record, &[])
            .await?;
        Ok(serde_json::from_value(created)?)
    }

    /// Address a record of this zone by ID without fetching it
    #[must_use]
    pub fn record(&self, id: impl Into<String>) -> RecordHandle<'a> {
        RecordHandle::new(self.client, &self.prefix, id.into())
    }
}
