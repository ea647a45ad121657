//! Deferred image resources.
//!
//! Image directives only queue `(local index, url)` pairs while lines are
//! parsed. [`ResourceCollector`] fetches them after the last line:
//! - Fetches sequentially, or in parallel on the rayon pool
//! - Hashes payloads with SHA-256 and collapses identical content
//! - Assigns final indices in original reference order
//!
//! Fetch failures become error entries and never abort collection.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use rayon::prelude::*;
use scriptdoc_render::{Document, PlaceholderHandle, Resource};
use sha2::{Digest, Sha256};
use ureq::Agent;

/// Resource fetch error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("I/O error: {0}")]
    Io(String),
}

/// Fetch-by-URL capability.
pub trait Fetch: Send + Sync {
    /// Return the raw bytes behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher backed by a pooled `ureq` agent.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Status {
                status,
                url: url.to_owned(),
            });
        }

        response
            .into_body()
            .read_to_vec()
            .map_err(|e| FetchError::Io(e.to_string()))
    }
}

/// In-memory fetcher for tests and offline conversions.
///
/// # Example
///
/// ```
/// use scriptdoc_parser::{Fetch, MemoryFetcher};
///
/// let fetcher = MemoryFetcher::new()
///     .with_resource("https://img/a.png", b"png bytes".to_vec())
///     .with_failure("https://img/b.png", "HTTP 404");
///
/// assert_eq!(fetcher.fetch("https://img/a.png").unwrap(), b"png bytes");
/// assert!(fetcher.fetch("https://img/b.png").is_err());
/// assert_eq!(fetcher.requests().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Result<Vec<u8>, String>>,
    requests: RwLock<Vec<String>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for `url`.
    #[must_use]
    pub fn with_resource(mut self, url: impl Into<String>, data: Vec<u8>) -> Self {
        self.resources.insert(url.into(), Ok(data));
        self
    }

    /// Fail requests for `url` with `message`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.resources.insert(url.into(), Err(message.into()));
        self
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .read()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(url.to_owned());
        }
        match self.resources.get(url) {
            Some(Ok(data)) => Ok(data.clone()),
            Some(Err(message)) => Err(FetchError::Http(message.clone())),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_owned(),
            }),
        }
    }
}

/// Compute the content hash used for deduplication.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Image reference queued during parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFetch {
    /// Session-local index shown until final numbering is known.
    pub local_index: usize,
    pub url: String,
}

/// One distinct resource after collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEntry {
    pub final_index: usize,
    /// SHA-256 of the payload. `None` for failed fetches.
    pub content_hash: Option<String>,
    pub resource: Resource,
}

/// Resources collected so far in a session.
///
/// Collecting into the same value again continues the numbering and
/// dedups against every payload seen before.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectedResources {
    /// Final index for every local index.
    pub index_map: HashMap<usize, usize>,
    /// Distinct resources in final index order.
    pub entries: Vec<ResourceEntry>,
    final_by_hash: HashMap<String, usize>,
}

impl CollectedResources {
    /// Number of failed entries.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.resource, Resource::Error { .. }))
            .count()
    }

    fn next_index(&self) -> usize {
        self.entries.len() + 1
    }

    fn record(&mut self, item: &PendingFetch, result: Result<Vec<u8>, FetchError>) {
        let final_index = match result {
            Ok(data) => {
                let hash = content_hash(&data);
                if let Some(&existing) = self.final_by_hash.get(&hash) {
                    tracing::debug!(
                        url = %item.url,
                        local_index = item.local_index,
                        final_index = existing,
                        "Duplicate image content"
                    );
                    existing
                } else {
                    let final_index = self.next_index();
                    self.final_by_hash.insert(hash.clone(), final_index);
                    self.entries.push(ResourceEntry {
                        final_index,
                        content_hash: Some(hash),
                        resource: Resource::Image {
                            data,
                            url: item.url.clone(),
                        },
                    });
                    final_index
                }
            }
            Err(e) => {
                tracing::warn!(url = %item.url, error = %e, "Failed to fetch image");
                let final_index = self.next_index();
                self.entries.push(ResourceEntry {
                    final_index,
                    content_hash: None,
                    resource: Resource::Error {
                        url: item.url.clone(),
                        message: e.to_string(),
                    },
                });
                final_index
            }
        };
        self.index_map.insert(item.local_index, final_index);
    }

    /// Rewrite placeholders and set the trailing resource section.
    ///
    /// The section lists every entry collected so far and replaces the one
    /// set by an earlier call. Does nothing when there are no entries.
    pub fn apply(&self, document: &mut Document, placeholders: &HashMap<usize, PlaceholderHandle>) {
        if self.entries.is_empty() {
            return;
        }

        for (local_index, handle) in placeholders {
            if let Some(&final_index) = self.index_map.get(local_index) {
                document.update_placeholder(*handle, final_index);
            }
        }

        document.set_resource_section(
            self.entries
                .iter()
                .map(|entry| (entry.final_index, entry.resource.clone())),
        );
    }
}

/// Fetches, deduplicates and numbers pending resources.
pub struct ResourceCollector<'a> {
    fetcher: &'a dyn Fetch,
    parallel: bool,
}

impl<'a> ResourceCollector<'a> {
    #[must_use]
    pub fn new(fetcher: &'a dyn Fetch) -> Self {
        Self {
            fetcher,
            parallel: false,
        }
    }

    /// Fetch on the rayon pool. Index assignment order is unaffected.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Collect every pending fetch into a fresh result.
    #[must_use]
    pub fn collect(&self, pending: &[PendingFetch]) -> CollectedResources {
        let mut collected = CollectedResources::default();
        self.collect_into(pending, &mut collected);
        collected
    }

    /// Collect every pending fetch, in order, continuing `collected`.
    pub fn collect_into(&self, pending: &[PendingFetch], collected: &mut CollectedResources) {
        if pending.is_empty() {
            return;
        }

        let results: Vec<Result<Vec<u8>, FetchError>> = if self.parallel {
            pending
                .par_iter()
                .map(|item| self.fetcher.fetch(&item.url))
                .collect()
        } else {
            pending
                .iter()
                .map(|item| self.fetcher.fetch(&item.url))
                .collect()
        };

        let before = collected.entries.len();
        for (item, result) in pending.iter().zip(results) {
            collected.record(item, result);
        }

        tracing::info!(
            resources = pending.len(),
            new = collected.entries.len() - before,
            unique = collected.entries.len(),
            errors = collected.error_count(),
            "Collected images"
        );
    }
}
