//! Resource server client and wire format.
//!
//! The resource server speaks JSON over HTTP GET:
//!
//! | request                                   | response                                   |
//! |-------------------------------------------|--------------------------------------------|
//! | `/api/v1/version?module={m}`              | `{"module", "version", "checksum"?}`       |
//! | `/api/v1/core_dict`                       | `{"success", "data": [{word, operate, count}]}` |
//! | `/api/v1/nlpdata/biz-dict`                | `{"success", "data": [{word}]}`            |
//! | `/api/v1/nlpdata/pinyin`                  | `{"success", "data": [{text, pinyin}]}`    |
//! | `/api/v1/nlpdata/correction`              | `{"success", "data": [{rule}]}`            |
//!
//! When a checksum is advertised it is the SHA-256 hex digest of the module
//! body and the body is rejected if it does not match.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{HanlexError, Result, SyncFailure};
use crate::resource::catalog::{CORE_DICT, CORRECTION, ModulePayload, PINYIN, WORD};

/// Version advertised by the resource server for one module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersion {
    /// Module id.
    pub module: String,
    /// Opaque version string; any change triggers a download.
    pub version: String,
    /// SHA-256 hex digest of the module body.
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Source of resource versions and module bodies.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Current version of `module` on the server.
    async fn fetch_version(&self, module: &str) -> Result<RemoteVersion>;

    /// Raw body of `module`.
    async fn fetch_module(&self, module: &str) -> Result<Vec<u8>>;
}

/// [`ResourceClient`] talking to the resource server over HTTP.
#[derive(Clone, Debug)]
pub struct HttpResourceClient {
    client: Client,
    server: String,
}

impl HttpResourceClient {
    /// Create a client for `server`; every request is bounded by `timeout`.
    pub fn new<S: Into<String>>(server: S, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HanlexError::invalid_config(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpResourceClient {
            client,
            server: server.into().trim_end_matches('/').to_string(),
        })
    }

    /// Server base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    fn module_url(&self, module: &str) -> Result<String> {
        let path = match module {
            CORE_DICT => "/api/v1/core_dict",
            WORD => "/api/v1/nlpdata/biz-dict",
            PINYIN => "/api/v1/nlpdata/pinyin",
            CORRECTION => "/api/v1/nlpdata/correction",
            other => {
                return Err(HanlexError::sync(
                    SyncFailure::ParseError,
                    format!("unknown resource module '{other}'"),
                ));
            }
        };
        Ok(format!("{}{path}", self.server))
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HanlexError::sync(
                SyncFailure::Network,
                format!("{url} answered {status}"),
            ));
        }

        let body = response.bytes().await.map_err(|e| request_error(url, e))?;
        Ok(body.to_vec())
    }
}

fn request_error(url: &str, err: reqwest::Error) -> HanlexError {
    let reason = if err.is_timeout() {
        SyncFailure::Timeout
    } else {
        SyncFailure::Network
    };
    HanlexError::sync(reason, format!("request to {url} failed: {err}"))
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn fetch_version(&self, module: &str) -> Result<RemoteVersion> {
        let url = format!("{}/api/v1/version", self.server);
        let body = self.get(&url, &[("module", module)]).await?;
        let mut version: RemoteVersion = serde_json::from_slice(&body).map_err(|e| {
            HanlexError::sync(
                SyncFailure::ParseError,
                format!("invalid version answer for {module}: {e}"),
            )
        })?;
        if version.module.is_empty() {
            version.module = module.to_string();
        }
        Ok(version)
    }

    async fn fetch_module(&self, module: &str) -> Result<Vec<u8>> {
        let url = self.module_url(module)?;
        self.get(&url, &[]).await
    }
}

/// Check `body` against an advertised SHA-256 hex digest.
pub fn verify_checksum(body: &[u8], expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected.filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    let actual = format!("{:x}", Sha256::digest(body));
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(HanlexError::sync(
            SyncFailure::ChecksumMismatch,
            format!("expected {expected}, got {actual}"),
        ))
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

fn decode_rows<T: DeserializeOwned>(module: &str, body: &[u8]) -> Result<Vec<T>> {
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|e| {
        HanlexError::sync(SyncFailure::ParseError, format!("invalid {module} payload: {e}"))
    })?;
    if !envelope.success {
        return Err(HanlexError::sync(
            SyncFailure::ParseError,
            format!("{module} payload reported success=false"),
        ));
    }
    Ok(envelope.data)
}

/// Decode the body of `module`.
pub fn decode_payload(module: &str, body: &[u8]) -> Result<ModulePayload> {
    match module {
        CORE_DICT => Ok(ModulePayload::CoreDict(decode_rows(module, body)?)),
        WORD => Ok(ModulePayload::Words(decode_rows(module, body)?)),
        PINYIN => Ok(ModulePayload::Pinyin(decode_rows(module, body)?)),
        CORRECTION => Ok(ModulePayload::Correction(decode_rows(module, body)?)),
        other => Err(HanlexError::sync(
            SyncFailure::ParseError,
            format!("unknown resource module '{other}'"),
        )),
    }
}
