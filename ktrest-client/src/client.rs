//! # Synchronous Client API
//!
//! Purpose: Expose a compact, blocking API for storing, fetching and
//! removing records through the server's RESTful interface.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KtClient` hides the HTTP transport and key encoding.
//! 2. **Borrow-Friendly API**: Accept anything `AsRef<[u8]>`, so `&str`
//!    (sent as UTF-8) and `&[u8]` both work without conversion.
//! 3. **Status as Outcome**: Non-success statuses map to `false`/`None`.
//! 4. **Fail Fast**: Transport failures surface immediately as errors.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

use crate::expire::{absolute_xt, parse_xt_header};
use crate::path::{is_dot_segment, request_path};

const XT_HEADER: HeaderName = HeaderName::from_static("x-kt-xt");
const MODE_HEADER: HeaderName = HeaderName::from_static("x-kt-mode");
const ERROR_HEADER: HeaderName = HeaderName::from_static("x-kt-error");

/// Result type for the sync client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the sync client.
///
/// Unexpected HTTP statuses are not errors; see the individual operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout or other transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Host and port do not form a usable URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Database name is `.` or `..`, which cannot survive URL normalisation.
    #[error("invalid database: {0:?}")]
    InvalidDatabase(String),
    /// Timeout must be greater than zero.
    #[error("timeout must be positive")]
    InvalidTimeout,
    /// Key is `.` or `..`, which cannot survive URL normalisation.
    #[error("key cannot be addressed as a path segment")]
    UnaddressableKey,
}

/// Write behaviour of a PUT, sent as `X-Kt-Mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Store unconditionally.
    #[default]
    Set,
    /// Store only if the key is absent.
    Add,
    /// Store only if the key is present.
    Replace,
}

impl SetMode {
    fn header_value(self) -> Option<HeaderValue> {
        match self {
            SetMode::Set => None,
            SetMode::Add => Some(HeaderValue::from_static("add")),
            SetMode::Replace => Some(HeaderValue::from_static("replace")),
        }
    }
}

/// A value together with the expiration the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub value: Bytes,
    /// `None` when the record never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Metadata returned by a HEAD check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// Value size in bytes.
    pub size: u64,
    /// `None` when the record never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Configuration for the synchronous client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connect and read timeout for every request.
    pub timeout: Duration,
    /// Optional database name or index, prefixed to every key path.
    pub database: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: 1978,
            timeout: Duration::from_secs(30),
            database: None,
        }
    }
}

/// Blocking client for one Kyoto Tycoon server.
///
/// The transport keeps a single idle connection to the server and reuses it
/// across calls. The connection is released by [`KtClient::close`] or drop.
pub struct KtClient {
    http: Client,
    base: String,
    config: ClientConfig,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl KtClient {
    /// Opens a client for `host:port` with the given timeout.
    pub fn open(host: impl Into<String>, port: u16, timeout: Duration) -> ClientResult<Self> {
        Self::with_config(ClientConfig {
            host: host.into(),
            port,
            timeout,
            ..ClientConfig::default()
        })
    }

    /// Opens a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        if config.timeout.is_zero() {
            return Err(ClientError::InvalidTimeout);
        }
        if let Some(database) = config.database.as_deref() {
            if is_dot_segment(database.as_bytes()) {
                return Err(ClientError::InvalidDatabase(database.to_string()));
            }
        }
        let base = base_url(&config.host, config.port)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(1)
            .http1_only()
            .no_proxy()
            .build()?;
        debug!(%base, timeout = ?config.timeout, "opened kt client");
        Ok(KtClient { http, base, config })
    }

    /// Returns the configuration this client was opened with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stores a record, replacing any existing value.
    ///
    /// `xt` is a relative lifetime; it is sent as an absolute Unix time,
    /// with partial seconds rounded up.
    /// Returns true only when the server answers 201 Created.
    pub fn set(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        xt: Option<Duration>,
    ) -> ClientResult<bool> {
        self.set_with_mode(key, value, xt, SetMode::Set)
    }

    /// Stores a record only if the key does not exist yet.
    pub fn add(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        xt: Option<Duration>,
    ) -> ClientResult<bool> {
        self.set_with_mode(key, value, xt, SetMode::Add)
    }

    /// Stores a record only if the key already exists.
    pub fn replace(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        xt: Option<Duration>,
    ) -> ClientResult<bool> {
        self.set_with_mode(key, value, xt, SetMode::Replace)
    }

    /// Issues a PUT with an explicit write mode.
    pub fn set_with_mode(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        xt: Option<Duration>,
        mode: SetMode,
    ) -> ClientResult<bool> {
        let mut headers = HeaderMap::new();
        if let Some(ttl) = xt {
            headers.insert(XT_HEADER, HeaderValue::from(absolute_xt(ttl)));
        }
        if let Some(mode) = mode.header_value() {
            headers.insert(MODE_HEADER, mode);
        }
        let body = value.as_ref().to_vec();
        let reply = self.execute(Method::PUT, key.as_ref(), headers, Some(body))?;
        Ok(reply.status == StatusCode::CREATED)
    }

    /// Fetches a value.
    ///
    /// Returns `Ok(None)` for any status other than 200 OK, a missing key included.
    pub fn get(&self, key: impl AsRef<[u8]>) -> ClientResult<Option<Bytes>> {
        Ok(self.get_record(key)?.map(|record| record.value))
    }

    /// Fetches a value along with its expiration time.
    pub fn get_record(&self, key: impl AsRef<[u8]>) -> ClientResult<Option<Record>> {
        let reply = self.execute(Method::GET, key.as_ref(), HeaderMap::new(), None)?;
        if reply.status != StatusCode::OK {
            return Ok(None);
        }
        Ok(Some(Record {
            expires_at: header_xt(&reply.headers),
            value: reply.body,
        }))
    }

    /// Checks a record without transferring its value.
    pub fn check(&self, key: impl AsRef<[u8]>) -> ClientResult<Option<RecordInfo>> {
        let reply = self.execute(Method::HEAD, key.as_ref(), HeaderMap::new(), None)?;
        if reply.status != StatusCode::OK {
            return Ok(None);
        }
        let size = reply
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|raw| raw.to_str().ok())
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        Ok(Some(RecordInfo {
            size,
            expires_at: header_xt(&reply.headers),
        }))
    }

    /// Removes a record. Returns true only when the server answers 204 No Content.
    pub fn remove(&self, key: impl AsRef<[u8]>) -> ClientResult<bool> {
        let reply = self.execute(Method::DELETE, key.as_ref(), HeaderMap::new(), None)?;
        Ok(reply.status == StatusCode::NO_CONTENT)
    }

    /// Closes the client and its connection.
    pub fn close(self) {
        debug!(base = %self.base, "closing kt client");
    }

    fn execute(
        &self,
        method: Method,
        key: &[u8],
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> ClientResult<Reply> {
        let path = request_path(self.config.database.as_deref(), key)?;
        let url = format!("{}{}", self.base, path);

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send()?;

        let status = response.status();
        let headers = response.headers().clone();
        // Drain the body so the connection can be reused.
        let body = response.bytes()?;

        debug!(%method, %path, status = status.as_u16(), len = body.len(), "kt request");
        if let Some(reason) = headers.get(ERROR_HEADER).and_then(|raw| raw.to_str().ok()) {
            debug!(%method, %path, reason, "kt server error");
        }

        Ok(Reply { status, headers, body })
    }
}

fn base_url(host: &str, port: u16) -> ClientResult<String> {
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    let base = format!("http://{}:{}", host, port);
    match Url::parse(&base) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) && url.path() == "/" => Ok(base),
        _ => Err(ClientError::InvalidAddress(base)),
    }
}

fn header_xt(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get(XT_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .and_then(parse_xt_header)
}
