//! HTTP client pool for maintaining persistent connections per base URL.
//!
//! Every agent in a group chat talks to the same endpoint, so one `reqwest::Client` per base
//! URL is shared by all of them:
//! - `pool_idle_timeout`: keeps idle connections alive for 90 seconds
//! - `pool_max_idle_per_host`: allows up to 10 idle connections per host
//! - `tcp_keepalive`: sends keepalive packets every 60 seconds

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

lazy_static! {
    /// Global HTTP client pool, lazily initialized on first access.
    static ref HTTP_CLIENT_POOL: Mutex<HashMap<String, reqwest::Client>> =
        Mutex::new(HashMap::new());
}

fn build_client() -> reqwest::Client {
    let builder = reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        // a full agent turn on a slow model can take a while
        .timeout(Duration::from_secs(300));

    match builder.build() {
        Ok(client) => client,
        Err(err) => {
            log::warn!(
                "tripllm::clients::common::build_client(): falling back to default client: {}",
                err
            );
            reqwest::Client::new()
        }
    }
}

/// Get or create a shared HTTP client for the given base URL.
///
/// Cloning a `reqwest::Client` is cheap; the clones share the same connection pool.
pub fn get_http_client(base_url: &str) -> reqwest::Client {
    let mut pool = match HTTP_CLIENT_POOL.lock() {
        Ok(pool) => pool,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(client) = pool.get(base_url) {
        return client.clone();
    }

    let client = build_client();
    pool.insert(base_url.to_string(), client.clone());
    client
}
