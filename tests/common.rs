#![allow(dead_code)]

use cfctl::{ApiClient, Credentials, RateLimiter};
use serde_json::{json, Value};
use std::env;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub const EMAIL: &str = "ops@example.com";
pub const KEY: &str = "c2547eb745079dac9320b638f5e225cf483cc5cfdda41";

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that touch process environment variables
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub struct EnvGuard {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    #[must_use]
    pub fn new(vars: Vec<&'static str>) -> Self {
        let vars = vars
            .into_iter()
            .map(|var| (var, env::var(var).ok()))
            .collect();
        Self { vars }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // Restore original environment state
        for (var, original_value) in &self.vars {
            match original_value {
                Some(value) => env::set_var(var, value),
                None => env::remove_var(var),
            }
        }
    }
}

/// Client pointed at a mock server with a limit high enough never to sleep
pub fn test_client(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(
        &Credentials::new(EMAIL, KEY),
        base_url,
        RateLimiter::new(1000, Duration::from_secs(300)),
    )
    .expect("client should build")
}

pub fn success(result: Value) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    })
}

pub fn page(result: Value, page: u64, total_pages: u64) -> Value {
    let count = result.as_array().map_or(0, Vec::len);
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": {
            "page": page,
            "per_page": 2,
            "count": count,
            "total_pages": total_pages
        }
    })
}

pub fn failure(code: i64, message: &str) -> Value {
    json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    })
}

pub fn zone_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": "active",
        "paused": false,
        "name_servers": ["bob.ns.cloudflare.com", "lola.ns.cloudflare.com"]
    })
}

pub fn record_json(id: &str, name: &str, proxiable: bool, proxied: bool) -> Value {
    json!({
        "id": id,
        "type": "A",
        "name": name,
        "content": "198.51.100.4",
        "ttl": 1,
        "proxiable": proxiable,
        "proxied": proxied,
        "zone_id": "023e105f4ecef8ad9ca31a8372d0c353"
    })
}
