use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use reqwest::header::USER_AGENT;

use crate::http_client::http_client;

/// Session-scoped memoization of provider bodies, keyed by the exact
/// argument tuple of the fetch. Repeated queries with an identical key must
/// not re-issue the HTTP request; `clear` empties everything when a new
/// search session starts.
static CACHE: Mutex<Option<HashMap<FetchKey, String>>> = Mutex::new(None);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    PitchEvents { season: u16, pitcher: u32 },
    SeasonAggregates { season: u16 },
    PlayerRegister,
}

pub fn fetch_text_cached(key: FetchKey, url: &str) -> Result<String> {
    {
        let mut guard = CACHE.lock().expect("fetch cache lock poisoned");
        let cache = guard.get_or_insert_with(HashMap::new);
        if let Some(body) = cache.get(&key) {
            return Ok(body.clone());
        }
    }

    let client = http_client()?;
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }

    let mut guard = CACHE.lock().expect("fetch cache lock poisoned");
    let cache = guard.get_or_insert_with(HashMap::new);
    cache.insert(key, body.clone());
    Ok(body)
}

pub fn clear() {
    let mut guard = CACHE.lock().expect("fetch cache lock poisoned");
    *guard = None;
}

/// Seed a body without a network round trip. Also what the tests use to
/// verify hits never refetch.
pub fn prime(key: FetchKey, body: String) {
    let mut guard = CACHE.lock().expect("fetch cache lock poisoned");
    let cache = guard.get_or_insert_with(HashMap::new);
    cache.insert(key, body);
}

pub fn cached(key: &FetchKey) -> Option<String> {
    let mut guard = CACHE.lock().expect("fetch cache lock poisoned");
    let cache = guard.get_or_insert_with(HashMap::new);
    cache.get(key).cloned()
}
