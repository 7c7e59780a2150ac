//! Typed views over the account, zone and DNS record endpoints.
//!
//! Handles borrow the [`Account`] that owns the API client and carry the IDs
//! of the objects they address.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

pub mod account;
pub mod record;
pub mod zone;

pub use account::Account;
pub use record::{DnsRecord, NewRecord, RecordHandle};
pub use zone::{Zone, ZoneHandle};

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(Error::from))
        .collect()
}

fn decode_single<T: DeserializeOwned>(values: Vec<Value>, what: &str) -> Result<T> {
    let value = values
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedEnvelope(format!("empty result for {what}")))?;
    Ok(serde_json::from_value(value)?)
}
