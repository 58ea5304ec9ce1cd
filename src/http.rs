//! Shared blocking HTTP client and a small conditional-request cache.
//!
//! Responses are cached on disk keyed by URL with their ETag/Last-Modified
//! validators; a 304 serves the cached body without re-downloading. Requests
//! retry a bounded number of times with backoff before giving up.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF_SECS: u64 = 2;

const CACHE_VERSION: u32 = 1;
const CACHE_FILE: &str = "http_cache.json";

/// Browser-like agent; some data hosts refuse default client strings.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static CLIENT: OnceCell<Client> = OnceCell::new();
static CACHE: Mutex<Option<ResponseCache>> = Mutex::new(None);

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ResponseCache {
    version: u32,
    entries: HashMap<String, CachedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// GET a JSON document, honouring the conditional-request cache.
pub fn fetch_json_cached(url: &str) -> Result<String> {
    let mut last_err = None;
    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            std::thread::sleep(Duration::from_secs(RETRY_BACKOFF_SECS * attempt as u64));
        }
        match fetch_once(url) {
            Ok(body) => return Ok(body),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request failed: {url}")))
}

fn fetch_once(url: &str) -> Result<String> {
    let cached = {
        let mut guard = CACHE.lock().expect("http cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(url).cloned()
    };

    let client = http_client()?;
    let mut req = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");
    if let Some(entry) = cached.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let headers = resp.headers().clone();

    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached {
            store_entry(url, entry.clone());
            return Ok(entry.body);
        }
        anyhow::bail!("received 304 without a cached body for {url}");
    }

    let body = resp.text().context("failed reading response body")?;
    if !status.is_success() {
        anyhow::bail!("http {status}: {body}");
    }

    let header_str = |name| {
        headers
            .get(name)
            .and_then(|v: &reqwest::header::HeaderValue| v.to_str().ok())
            .map(str::to_string)
    };
    store_entry(
        url,
        CachedResponse {
            body: body.clone(),
            etag: header_str(ETAG),
            last_modified: header_str(LAST_MODIFIED),
            fetched_at: now_secs(),
        },
    );
    Ok(body)
}

fn store_entry(url: &str, entry: CachedResponse) {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(url.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> ResponseCache {
    let Some(path) = cache_file_path() else {
        return ResponseCache::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return ResponseCache::default();
    };
    let cache = serde_json::from_str::<ResponseCache>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return ResponseCache::default();
    }
    cache
}

fn save_cache_file(cache: &ResponseCache) -> Result<()> {
    let Some(path) = cache_file_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

/// Per-user cache directory for this tool (XDG first, then ~/.cache).
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join("transfersim"));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join("transfersim"))
}

fn cache_file_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
