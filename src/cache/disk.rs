use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::storage::{CacheStorage, StoredResponse};
use crate::net::{RequestKey, Response};

/// Filesystem-backed cache storage.
///
/// Layout: `<root>/<bucket>/<sha256(key)>.json`, one file per entry.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn entry_path(&self, bucket: &str, key: &RequestKey) -> PathBuf {
        let digest = Sha256::digest(key.to_string().as_bytes());
        self.bucket_path(bucket)
            .join(format!("{}.json", hex::encode(digest)))
    }

    fn load(&self, path: &Path) -> Result<StoredResponse> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache entry: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", path.display()))
    }
}

impl CacheStorage for DiskStorage {
    fn open(&self, bucket: &str) -> Result<()> {
        std::fs::create_dir_all(self.bucket_path(bucket))
            .with_context(|| format!("Failed to open cache bucket: {}", bucket))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, bucket: &str) -> Result<bool> {
        let path = self.bucket_path(bucket);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&path)
            .with_context(|| format!("Failed to delete cache bucket: {}", bucket))?;
        Ok(true)
    }

    fn put(&self, bucket: &str, key: &RequestKey, response: Response) -> Result<()> {
        self.open(bucket)?;
        let stored = StoredResponse::new(key.clone(), response);
        let path = self.entry_path(bucket, key);
        let contents = serde_json::to_string(&stored)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache entry for {}", key))?;
        debug!(bucket = bucket, key = %key, "Stored cache entry");
        Ok(())
    }

    fn get(&self, bucket: &str, key: &RequestKey) -> Result<Option<StoredResponse>> {
        let path = self.entry_path(bucket, key);
        if !path.exists() {
            return Ok(None);
        }
        self.load(&path).map(Some)
    }

    fn entries(&self, bucket: &str) -> Result<Vec<StoredResponse>> {
        let path = self.bucket_path(bucket);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry_path = entry?.path();
            if entry_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.load(&entry_path) {
                Ok(stored) => entries.push(stored),
                Err(e) => {
                    debug!(path = %entry_path.display(), error = %e, "Skipping unreadable cache entry");
                }
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> RequestKey {
        RequestKey {
            method: "GET".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_disk_put_get_roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf()).unwrap();
        let response = Response::new(200, "<html></html>").with_header("content-type", "text/html");
        storage.put("steptodeen-v1", &key("http://localhost/index.html"), response).unwrap();

        let reopened = DiskStorage::new(dir.path().to_path_buf()).unwrap();
        let hit = reopened
            .match_request("steptodeen-v1", &key("http://localhost/index.html"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, b"<html></html>");
        assert_eq!(hit.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_disk_keys_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf()).unwrap();
        storage.open("steptodeen-v0").unwrap();
        storage.open("steptodeen-v1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["steptodeen-v0", "steptodeen-v1"]);

        assert!(storage.delete("steptodeen-v0").unwrap());
        assert!(!storage.delete("steptodeen-v0").unwrap());
        assert_eq!(storage.keys().unwrap(), vec!["steptodeen-v1"]);
    }

    #[test]
    fn test_disk_entries_sorted_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf()).unwrap();
        storage.put("v1", &key("http://b/"), Response::new(200, "b")).unwrap();
        storage.put("v1", &key("http://a/"), Response::new(200, "a1")).unwrap();
        storage.put("v1", &key("http://a/"), Response::new(200, "a2")).unwrap();

        let entries = storage.entries("v1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.url, "http://a/");
        assert_eq!(entries[0].response.body, b"a2");
        assert!(storage.entries("missing").unwrap().is_empty());
    }
}
