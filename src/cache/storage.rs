//! Cache storage trait and in-memory implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::net::{RequestKey, Response};

/// A response held in a cache bucket.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key: RequestKey,
    pub response: Response,
    pub cached_at: DateTime<Utc>,
}

impl StoredResponse {
    pub fn new(key: RequestKey, response: Response) -> Self {
        Self {
            key,
            response,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// Consume the entry, keeping only the response
    pub fn into_response(self) -> Response {
        self.response
    }
}

/// Named cache buckets mapping request identity to a stored response.
///
/// Writes to the same key are last-write-wins. `put` creates the bucket if
/// it does not exist yet.
pub trait CacheStorage: Send + Sync {
    /// Create the bucket if absent.
    fn open(&self, bucket: &str) -> Result<()>;

    /// Names of all existing buckets.
    fn keys(&self) -> Result<Vec<String>>;

    /// Delete a bucket and everything in it. Returns false if it did not exist.
    fn delete(&self, bucket: &str) -> Result<bool>;

    /// Store a response under `key`, replacing any previous entry.
    fn put(&self, bucket: &str, key: &RequestKey, response: Response) -> Result<()>;

    /// Look up a single entry.
    fn get(&self, bucket: &str, key: &RequestKey) -> Result<Option<StoredResponse>>;

    /// All entries of a bucket, ordered by key.
    fn entries(&self, bucket: &str) -> Result<Vec<StoredResponse>>;

    /// Look up just the response for `key`.
    fn match_request(&self, bucket: &str, key: &RequestKey) -> Result<Option<Response>> {
        Ok(self.get(bucket, key)?.map(StoredResponse::into_response))
    }
}

type Buckets = HashMap<String, BTreeMap<RequestKey, StoredResponse>>;

/// Process-local storage. Used by tests and by embedders that do not need
/// the cache to outlive the process.
#[derive(Default)]
pub struct MemoryStorage {
    buckets: Mutex<Buckets>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_buckets<T>(&self, f: impl FnOnce(&mut Buckets) -> T) -> Result<T> {
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| anyhow!("Cache storage lock poisoned"))?;
        Ok(f(&mut buckets))
    }
}

fn copy_entry(entry: &StoredResponse) -> StoredResponse {
    StoredResponse {
        key: entry.key.clone(),
        response: entry.response.duplicate(),
        cached_at: entry.cached_at,
    }
}

impl CacheStorage for MemoryStorage {
    fn open(&self, bucket: &str) -> Result<()> {
        self.with_buckets(|b| {
            b.entry(bucket.to_string()).or_default();
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_buckets(|b| {
            let mut names: Vec<String> = b.keys().cloned().collect();
            names.sort();
            names
        })
    }

    fn delete(&self, bucket: &str) -> Result<bool> {
        self.with_buckets(|b| b.remove(bucket).is_some())
    }

    fn put(&self, bucket: &str, key: &RequestKey, response: Response) -> Result<()> {
        self.with_buckets(|b| {
            b.entry(bucket.to_string())
                .or_default()
                .insert(key.clone(), StoredResponse::new(key.clone(), response));
        })
    }

    fn get(&self, bucket: &str, key: &RequestKey) -> Result<Option<StoredResponse>> {
        self.with_buckets(|b| b.get(bucket).and_then(|entries| entries.get(key)).map(copy_entry))
    }

    fn entries(&self, bucket: &str) -> Result<Vec<StoredResponse>> {
        self.with_buckets(|b| {
            b.get(bucket)
                .map(|entries| entries.values().map(copy_entry).collect())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(url: &str) -> RequestKey {
        RequestKey {
            method: "GET".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_stored_response_age_display() {
        let mut stored = StoredResponse::new(key("http://a/"), Response::new(200, ""));
        assert_eq!(stored.age_display(), "just now");

        stored.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(stored.age_display(), "5m ago");

        stored.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(stored.age_display(), "2h ago");

        stored.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(stored.age_display(), "3d ago");

        stored.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(stored.age_display(), "just now");
    }

    #[test]
    fn test_memory_put_then_match() {
        let storage = MemoryStorage::new();
        storage.put("v1", &key("http://a/x"), Response::new(200, "x")).unwrap();

        let hit = storage.match_request("v1", &key("http://a/x")).unwrap();
        assert_eq!(hit, Some(Response::new(200, "x")));
        assert_eq!(storage.match_request("v1", &key("http://a/y")).unwrap(), None);
        assert_eq!(storage.match_request("v2", &key("http://a/x")).unwrap(), None);
    }

    #[test]
    fn test_memory_last_write_wins() {
        let storage = MemoryStorage::new();
        storage.put("v1", &key("http://a/x"), Response::new(200, "old")).unwrap();
        storage.put("v1", &key("http://a/x"), Response::new(200, "new")).unwrap();

        let entries = storage.entries("v1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].response.body, b"new");
    }

    #[test]
    fn test_memory_open_keys_delete() {
        let storage = MemoryStorage::new();
        storage.open("b").unwrap();
        storage.open("a").unwrap();
        storage.open("a").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);

        assert!(storage.delete("a").unwrap());
        assert!(!storage.delete("a").unwrap());
        assert_eq!(storage.keys().unwrap(), vec!["b"]);
    }
}
