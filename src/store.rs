use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Listing IDs that have already been notified. Only ever grows.
#[async_trait]
pub trait SeenStore: Send + Sync {
    fn contains(&self, id: &str) -> bool;

    /// Record `id` durably. Adding a known ID is a no-op.
    async fn add(&mut self, id: &str) -> Result<(), StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seen IDs kept in a text file, one per line, appended as they are added
#[derive(Debug)]
pub struct FileSeenStore {
    path: PathBuf,
    ids: HashSet<String>,
    /// The file was hand-edited and lacks a trailing newline
    needs_newline: bool,
}

impl FileSeenStore {
    /// Read the whole file into memory. A missing or unreadable file is an
    /// empty set; the next run starts from scratch rather than failing.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let (ids, needs_newline) = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                // A damaged line must not cost the rest of the history
                let content = String::from_utf8_lossy(&bytes);
                let ids: HashSet<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                info!("Loaded {} previously seen listings", ids.len());
                (ids, !content.is_empty() && !content.ends_with('\n'))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No {} found. Creating new file.", path.display());
                if let Err(e) = tokio::fs::File::create(&path).await {
                    warn!("Could not create {}: {}", path.display(), e);
                }
                (HashSet::new(), false)
            }
            Err(e) => {
                warn!(
                    "Could not read {}: {}. Treating every listing as unseen",
                    path.display(),
                    e
                );
                (HashSet::new(), false)
            }
        };

        Self {
            path,
            ids,
            needs_newline,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append_line(&self, id: &str) -> std::io::Result<()> {
        let mut line = String::with_capacity(id.len() + 2);
        if self.needs_newline {
            line.push('\n');
        }
        line.push_str(id);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl SeenStore for FileSeenStore {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    async fn add(&mut self, id: &str) -> Result<(), StoreError> {
        if self.ids.contains(id) {
            return Ok(());
        }

        self.append_line(id).await.map_err(|source| StoreError::Append {
            path: self.path.clone(),
            source,
        })?;

        self.needs_newline = false;
        self.ids.insert(id.to_string());
        info!("Saved listing ID: {}", id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// In-memory store with the same contract, nothing persisted
#[derive(Debug, Default, Clone)]
pub struct MemorySeenStore {
    ids: HashSet<String>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    async fn add(&mut self, id: &str) -> Result<(), StoreError> {
        self.ids.insert(id.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_is_empty_and_gets_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");

        let store = FileSeenStore::load(&path).await;

        assert!(store.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn load_ignores_blank_lines_and_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");
        std::fs::write(&path, "123\n\n  456  \n123\n").unwrap();

        let store = FileSeenStore::load(&path).await;

        assert_eq!(store.len(), 2);
        assert!(store.contains("123"));
        assert!(store.contains("456"));
        assert!(!store.contains("789"));
    }

    #[tokio::test]
    async fn load_keeps_valid_ids_around_a_corrupt_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");
        std::fs::write(&path, b"5512345\n5512350\n\xff\n").unwrap();

        let mut store = FileSeenStore::load(&path).await;

        assert!(store.contains("5512345"));
        assert!(store.contains("5512350"));
        assert!(store.len() >= 2);

        store.add("5512399").await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"5512345\n5512350\n\xff\n"));
        assert!(bytes.ends_with(b"5512399\n"));
    }

    #[tokio::test]
    async fn add_appends_without_rewriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");
        std::fs::write(&path, "123\n").unwrap();

        let mut store = FileSeenStore::load(&path).await;
        store.add("456").await.unwrap();
        store.add("456").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "123\n456\n");
        assert!(store.contains("456"));
    }

    #[tokio::test]
    async fn add_after_hand_edit_keeps_ids_on_separate_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");
        std::fs::write(&path, "123").unwrap();

        let mut store = FileSeenStore::load(&path).await;
        store.add("456").await.unwrap();
        store.add("789").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "123\n456\n789\n");
    }

    #[tokio::test]
    async fn added_ids_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_listings.txt");

        let mut store = FileSeenStore::load(&path).await;
        store.add("5512345").await.unwrap();
        drop(store);

        let reloaded = FileSeenStore::load(&path).await;
        assert!(reloaded.contains("5512345"));
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn append_failure_is_reported_and_id_stays_unseen() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened for appending
        let mut store = FileSeenStore::load(dir.path()).await;

        let result = store.add("123").await;

        assert!(matches!(result, Err(StoreError::Append { .. })));
        assert!(!store.contains("123"));
    }
}
