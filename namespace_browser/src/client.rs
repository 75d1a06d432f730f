/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! HTTP access to a codebase server.
//!
//! Routes:
//! - `GET {base}/head`: the current snapshot id, as a JSON string or
//!   bare text.
//! - `GET {base}/terms/{snapshot}/{key}`: the subtree payload for a
//!   namespace (see [`crate::subtree`]). The root namespace has the
//!   empty key, so its route ends in `/`.
//!
//! Address handling follows the usual convention: `--addr` may be
//! `host:port` or carry an explicit `http://` / `https://` scheme,
//! which is then authoritative. Supplying a CA upgrades a bare
//! address to HTTPS.

use std::path::Path as FsPath;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::fetch::SubtreeSource;
use crate::path::NamespaceKey;
use crate::snapshot::Snapshot;
use crate::subtree::SubtreeData;

/// Connection settings for [`HttpCodebase`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub addr: String,
    pub timeout: Duration,
    /// PEM-encoded CA used to verify the server.
    pub tls_ca: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            timeout: Duration::from_secs(5),
            tls_ca: None,
        }
    }
}

/// Split an address into an optional scheme and the host part.
fn parse_addr(addr: &str) -> (Option<&str>, &str) {
    if let Some(host) = addr.strip_prefix("https://") {
        (Some("https"), host)
    } else if let Some(host) = addr.strip_prefix("http://") {
        (Some("http"), host)
    } else {
        (None, addr)
    }
}

/// Install the CA at `ca_path` as a root certificate.
///
/// Returns `(updated_builder, ca_installed)`; an unreadable or
/// malformed CA leaves the builder unchanged.
fn add_tls_from_path(
    builder: reqwest::ClientBuilder,
    ca_path: &FsPath,
) -> (reqwest::ClientBuilder, bool) {
    let ca_bytes = match std::fs::read(ca_path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %ca_path.display(), error = %e, "TLS: cannot read CA file");
            return (builder, false);
        }
    };
    match reqwest::Certificate::from_pem(&ca_bytes) {
        Ok(cert) => (builder.add_root_certificate(cert), true),
        Err(e) => {
            tracing::warn!(path = %ca_path.display(), error = %e, "TLS: invalid CA PEM");
            (builder, false)
        }
    }
}

/// Build a `reqwest` client and the base URL it talks to.
fn build_client(config: &ClientConfig) -> (String, reqwest::Client) {
    let (explicit_scheme, host) = parse_addr(&config.addr);
    let host = host.trim_end_matches('/');

    let mut builder = reqwest::Client::builder().timeout(config.timeout);
    let mut use_tls = explicit_scheme == Some("https");

    if let Some(ca_path) = &config.tls_ca {
        let (b, ok) = add_tls_from_path(builder, ca_path);
        builder = b;
        use_tls = explicit_scheme != Some("http") && (use_tls || ok);
    }

    let scheme = if use_tls { "https" } else { "http" };
    let base_url = format!("{}://{}", scheme, host);
    let client = builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    });

    (base_url, client)
}

fn subtree_url(base_url: &str, snapshot: &Snapshot, key: &NamespaceKey) -> String {
    format!(
        "{}/terms/{}/{}",
        base_url,
        urlencoding::encode(snapshot.as_str()),
        urlencoding::encode(key.as_str())
    )
}

/// Interpret a `/head` body: a JSON string, or else the trimmed text.
/// An empty body means the server has no head yet.
fn parse_head(body: &str) -> Option<Snapshot> {
    let id = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) => return None,
        _ => body.trim().to_string(),
    };
    if id.is_empty() {
        None
    } else {
        Some(Snapshot::new(id))
    }
}

/// A codebase server reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpCodebase {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCodebase {
    pub fn new(config: &ClientConfig) -> Self {
        let (base_url, client) = build_client(config);
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the server's current snapshot.
    pub async fn fetch_head(&self) -> Result<Option<Snapshot>, FetchError> {
        let url = format!("{}/head", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        Ok(parse_head(&body))
    }
}

#[async_trait]
impl SubtreeSource for HttpCodebase {
    async fn fetch_subtree(
        &self,
        snapshot: &Snapshot,
        key: &NamespaceKey,
    ) -> Result<SubtreeData, FetchError> {
        let url = subtree_url(&self.base_url, snapshot, key);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body: Value = resp.json().await?;
        Ok(SubtreeData::from_json(&body)?)
    }
}
