use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;

use super::zone::{Zone, ZoneHandle};

/// Entry point owning the API client for one set of credentials
#[derive(Debug)]
pub struct Account {
    client: ApiClient,
}

impl Account {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Build an account from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be created from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// List every zone in the account, following pagination
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or a zone cannot be decoded
    pub async fn list_zones(&self, query: &[(&str, &str)]) -> Result<Vec<Zone>> {
        let zones = self.client.get("/zones", query).await?;
        super::decode_all(zones)
    }

    /// Find zones by exact domain name
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a zone cannot be decoded
    pub async fn search_zone(&self, name: &str) -> Result<Vec<Zone>> {
        self.list_zones(&[("name", name)]).await
    }

    /// Address a zone by ID without fetching it
    #[must_use]
    pub fn zone(&self, id: impl Into<String>) -> ZoneHandle<'_> {
        ZoneHandle::new(&self.client, id.into())
    }
}
