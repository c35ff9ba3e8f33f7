//! Per-URL ETag persistence.
//!
//! Each URL gets one file, `etag-<sha256 hex of url>.txt`, whose content is the
//! raw token. The file is not locked: concurrent runs for the same URL race
//! and the last writer wins.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::PathBuf;

/// SHA-256 of the URL's UTF-8 bytes as lowercase hex.
pub fn token_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)
}

/// File name holding the token for `url`.
pub fn token_file_name(url: &str) -> String {
    format!("etag-{}.txt", token_key(url))
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(token_file_name(url))
    }

    /// Last stored token for `url`, or an empty string if none was ever stored.
    /// Bytes that are not UTF-8 are replaced with U+FFFD; the resulting token
    /// never matches, so the next fetch is unconditional in effect.
    pub fn read(&self, url: &str) -> Result<String> {
        let path = self.path_for(url);
        match fs::read(&path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    /// Overwrite the stored token for `url`. An empty token is stored as an empty file.
    pub fn write(&self, url: &str, token: &str) -> Result<()> {
        let path = self.path_for(url);
        fs::write(&path, token).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}
