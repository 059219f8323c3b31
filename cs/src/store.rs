//! Core ColdStore implementation

use eyre::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Metadata for a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMeta {
    /// Slash-separated key within the bucket
    pub key: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modification time (unix ms)
    pub modified_at: i64,
}

/// Filesystem-backed object store
#[derive(Debug, Clone)]
pub struct ColdStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl ColdStore {
    /// Open or create a cold store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened cold store");
        Ok(Self { base_path })
    }

    /// Base directory of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write an object, replacing any existing object under the same key
    pub fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body).context(format!("Failed to write object: {}/{}", bucket, key))?;
        info!(bucket, key, bytes = body.len(), "Stored object");
        Ok(())
    }

    /// Upload a local file as an object
    pub fn upload_file(&self, file: impl AsRef<Path>, bucket: &str, key: &str) -> Result<()> {
        let file = file.as_ref();
        debug!(?file, bucket, key, "upload_file: called");
        let body = fs::read(file).context(format!("Failed to read file: {}", file.display()))?;
        self.put_object(bucket, key, &body)
    }

    /// Read an object's bytes
    pub fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).context(format!("Object not found: {}/{}", bucket, key))
    }

    /// Download an object into a local file
    pub fn download_file(&self, bucket: &str, key: &str, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        debug!(bucket, key, ?dest, "download_file: called");
        let body = self.get_object(bucket, key)?;
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, body).context(format!("Failed to write file: {}", dest.display()))?;
        info!(bucket, key, dest = %dest.display(), "Downloaded object");
        Ok(())
    }

    /// Check whether an object exists
    pub fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.object_path(bucket, key)?.is_file())
    }

    /// List objects in a bucket, optionally restricted to a key prefix, sorted by key
    pub fn list(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectMeta>> {
        let bucket_path = self.bucket_path(bucket)?;
        if !bucket_path.exists() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(&bucket_path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&bucket_path)?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if prefix.is_some_and(|p| !key.starts_with(p)) {
                continue;
            }
            let meta = entry.metadata()?;
            let modified_at = meta
                .modified()
                .ok()
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp_millis())
                .unwrap_or_default();
            objects.push(ObjectMeta {
                key,
                size: meta.len(),
                modified_at,
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    /// Delete an object; deleting a missing object is not an error
    pub fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if path.exists() {
            fs::remove_file(&path)?;
            info!(bucket, key, "Deleted object");
        }
        Ok(())
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || !is_plain_relative(Path::new(bucket)) || bucket.contains('/') {
            return Err(eyre::eyre!("Invalid bucket name: {:?}", bucket));
        }
        Ok(self.base_path.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let bucket_path = self.bucket_path(bucket)?;
        if key.is_empty() || key.ends_with('/') || !is_plain_relative(Path::new(key)) {
            return Err(eyre::eyre!("Invalid object key: {:?}", key));
        }
        Ok(bucket_path.join(key))
    }
}

/// True when the path only contains normal components (no root, `.` or `..`)
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get() {
        let temp = TempDir::new().unwrap();
        let store = ColdStore::open(temp.path().join("store")).unwrap();

        store.put_object("archive", "2025/04/01/09.csv", b"a,b\n1,2\n").unwrap();

        assert!(store.exists("archive", "2025/04/01/09.csv").unwrap());
        assert_eq!(store.get_object("archive", "2025/04/01/09.csv").unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_upload_and_download_file() {
        let temp = TempDir::new().unwrap();
        let store = ColdStore::open(temp.path().join("store")).unwrap();

        let source = temp.path().join("archived_data.csv");
        fs::write(&source, "plant_number\n1\n").unwrap();
        store.upload_file(&source, "archive", "2025/04/01/09.csv").unwrap();

        let dest = temp.path().join("out").join("copy.csv");
        store.download_file("archive", "2025/04/01/09.csv", &dest).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "plant_number\n1\n");
    }

    #[test]
    fn test_list_with_prefix() {
        let temp = TempDir::new().unwrap();
        let store = ColdStore::open(temp.path()).unwrap();

        store.put_object("archive", "2025/04/02/10.csv", b"x").unwrap();
        store.put_object("archive", "2025/04/01/09.csv", b"xy").unwrap();
        store.put_object("archive", "2025/05/01/00.csv", b"xyz").unwrap();

        let all = store.list("archive", None).unwrap();
        let keys: Vec<_> = all.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["2025/04/01/09.csv", "2025/04/02/10.csv", "2025/05/01/00.csv"]);
        assert_eq!(all[0].size, 2);

        let april = store.list("archive", Some("2025/04")).unwrap();
        assert_eq!(april.len(), 2);

        assert!(store.list("missing", None).unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = ColdStore::open(temp.path()).unwrap();

        store.put_object("archive", "k.csv", b"x").unwrap();
        store.delete("archive", "k.csv").unwrap();
        assert!(!store.exists("archive", "k.csv").unwrap());

        // Missing object is fine
        store.delete("archive", "k.csv").unwrap();
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let temp = TempDir::new().unwrap();
        let store = ColdStore::open(temp.path()).unwrap();

        assert!(store.put_object("archive", "../escape.csv", b"x").is_err());
        assert!(store.put_object("archive", "/abs.csv", b"x").is_err());
        assert!(store.put_object("archive", "", b"x").is_err());
        assert!(store.put_object("../up", "k.csv", b"x").is_err());
        assert!(store.get_object("archive", "2025/../../x").is_err());
    }
}
