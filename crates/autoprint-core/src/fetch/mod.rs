//! Conditional HTTP GET.
//!
//! Uses the curl crate (libcurl). When a stored ETag is available it is sent as
//! `If-None-Match`; a `304 Not Modified` answer short-circuits the pipeline.

mod parse;

use anyhow::{bail, Context, Result};
use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::filename;

/// Response bodies up to this size stay in memory; larger ones spill to disk.
const SPOOL_MEMORY_LIMIT: usize = 1024 * 1024;

/// Body and metadata of a changed resource.
pub struct FetchedResource {
    pub body: Box<dyn Read + Send>,
    /// Filename suggested by Content-Disposition; empty if none.
    pub filename: String,
    /// New ETag; empty if the server sent none (caching disabled for this resource).
    pub token: String,
}

impl fmt::Debug for FetchedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedResource")
            .field("filename", &self.filename)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// Server answered 304: nothing to write, print, or store.
    Unchanged,
    Fetched(FetchedResource),
}

/// Performs the conditional GET. `token` is the stored ETag, or empty for an
/// unconditional request.
pub trait Fetcher {
    fn fetch(&self, url: &str, token: &str) -> Result<FetchOutcome>;
}

/// libcurl-backed fetcher. Runs in the current thread.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirections: u32,
    user_agent: Option<String>,
}

impl CurlFetcher {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, token: &str) -> Result<FetchOutcome> {
        let parsed = url::Url::parse(url).with_context(|| format!("invalid URL: {}", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("unsupported URL scheme: {}", parsed.scheme());
        }
        if token.contains(['\r', '\n']) {
            bail!("stored token contains a line break");
        }

        let mut headers: Vec<Vec<u8>> = Vec::new();
        let mut body = tempfile::spooled_tempfile(SPOOL_MEMORY_LIMIT);
        let mut write_error: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        if !token.is_empty() {
            let mut list = curl::easy::List::new();
            list.append(&format!("If-None-Match: {}", token))?;
            easy.http_headers(list)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                headers.push(data.to_vec());
                true
            })?;
            transfer.write_function(|data| match body.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_error {
            return Err(e).context("spool response body");
        }
        performed.with_context(|| format!("GET {} failed", url))?;

        let code = easy.response_code().context("no response code")?;
        if code == 304 {
            tracing::debug!("GET {} returned 304 Not Modified", url);
            return Ok(FetchOutcome::Unchanged);
        }
        if !(200..300).contains(&code) {
            bail!("GET {} returned HTTP {}", url, code);
        }

        let meta = parse::parse_headers(&headers);
        let filename =
            filename::extract_filename(meta.content_disposition.as_deref().unwrap_or(""))
                .context("extract filename")?;
        let token = meta.etag.unwrap_or_default();

        body.rewind().context("rewind response body")?;
        tracing::debug!(status = code, filename = %filename, etag = %token, "fetched {}", url);

        Ok(FetchOutcome::Fetched(FetchedResource {
            body: Box::new(body),
            filename,
            token,
        }))
    }
}
