//! Page-lifetime cache of fetched animation payloads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::join_all;
use indexmap::IndexSet;
use log::{debug, warn};

use crate::error::LoaderError;
use crate::host::{Host, Payload};
use crate::Result;

/// Payloads keyed by source. Failures are never stored, so a later pass
/// retries them.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: RefCell<HashMap<String, Payload>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, src: &str) -> Option<Payload> {
        self.entries.borrow().get(src).cloned()
    }

    pub fn contains(&self, src: &str) -> bool {
        self.entries.borrow().contains_key(src)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Fetch every distinct source not cached yet. All requests run
    /// concurrently; returns once each one has settled.
    pub async fn ensure<'a, H, I>(&self, host: &H, sources: I)
    where
        H: Host,
        I: IntoIterator<Item = &'a str>,
    {
        let pending: IndexSet<&str> = sources
            .into_iter()
            .filter(|src| !self.contains(src))
            .collect();
        if pending.is_empty() {
            return;
        }
        debug!("fetching {} animation source(s)", pending.len());

        let results = join_all(pending.iter().map(|src| fetch_payload(host, src))).await;

        let mut entries = self.entries.borrow_mut();
        for (src, result) in pending.into_iter().zip(results) {
            match result {
                Ok(payload) => {
                    entries.insert(src.to_string(), payload);
                }
                Err(err) => warn!("{err}"),
            }
        }
    }
}

async fn fetch_payload<H: Host>(host: &H, src: &str) -> Result<Payload> {
    let response = host.fetch(src).await.map_err(|err| match err {
        LoaderError::Fetch { .. } => err,
        other => LoaderError::Fetch {
            src: src.to_string(),
            reason: other.to_string(),
        },
    })?;
    if response.is_failure() {
        return Err(LoaderError::HttpStatus {
            src: src.to_string(),
            status: response.status,
        });
    }
    parse_payload(src, &response.body)
}

/// Parse a response body. A JSON `null` counts as no payload.
pub fn parse_payload(src: &str, body: &str) -> Result<Payload> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| LoaderError::Payload {
            src: src.to_string(),
            reason: err.to_string(),
        })?;
    if value.is_null() {
        return Err(LoaderError::Payload {
            src: src.to_string(),
            reason: "empty animation data".into(),
        });
    }
    Ok(Rc::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_objects() {
        let payload = parse_payload("a.json", r#"{"v":"5.7.4","fr":30}"#).unwrap();
        assert_eq!(payload["fr"], 30);
    }

    #[test]
    fn rejects_null_and_garbage() {
        assert!(matches!(
            parse_payload("a.json", "null"),
            Err(LoaderError::Payload { .. })
        ));
        assert!(matches!(
            parse_payload("a.json", "<html>"),
            Err(LoaderError::Payload { .. })
        ));
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = SourceCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("a.json").is_none());
    }
}
