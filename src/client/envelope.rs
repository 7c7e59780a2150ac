use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Standard response wrapper used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    errors: Vec<ResponseMessage>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

/// One entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    pub code: i64,
    pub message: String,
}

/// Pagination block attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResultInfo {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

const fn first_page() -> u64 {
    1
}

impl ResultInfo {
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Successful envelope contents
#[derive(Debug)]
pub(crate) struct Page {
    pub result: Value,
    pub info: Option<ResultInfo>,
}

/// Parse a response body and unwrap its envelope.
///
/// A `success: false` envelope becomes [`Error::Provider`] built from the
/// first error entry.
pub(crate) fn unwrap_body(body: &str) -> Result<Page> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if !envelope.success {
        let Some(first) = envelope.errors.into_iter().next() else {
            return Err(Error::MalformedEnvelope(
                "request failed without any error entries".to_string(),
            ));
        };
        warn!(code = first.code, "API error: {}", first.message);
        return Err(Error::Provider {
            code: first.code,
            message: first.message,
        });
    }

    Ok(Page {
        result: envelope.result,
        info: envelope.result_info,
    })
}
