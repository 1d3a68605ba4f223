//! Filesystem document store rooted at a vault directory.
//!
//! Notes are markdown files; every other file under the root is a binary
//! asset. Ids are root-relative paths with `/` separators.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

use quill_core::defaults::NOTE_EXTENSION;
use quill_core::{DocumentRef, DocumentStore, Error, Result};

/// Markdown vault on the local filesystem.
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    /// Create a store over an existing or future directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store-relative path, refusing anything that escapes the root.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.trim().is_empty() || escapes {
            return Err(Error::Validation(format!(
                "store path must be relative and inside the vault: {:?}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    async fn exists(&self, full_path: &Path) -> Result<bool> {
        Ok(fs::try_exists(full_path).await?)
    }

    /// Write a new file: parent directories, a temp file next to the target,
    /// then a rename that refuses to replace an existing file. The temp file
    /// is removed if any step fails.
    async fn write_new(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(store_path = %path, size = data.len(), "vault: write");

        if self.exists(&full_path).await? {
            return Err(Error::Store(format!("{} already exists", path)));
        }

        let parent = full_path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).await.map_err(|e| {
            warn!(parent = %parent.display(), error = %e, "vault: create_dir_all failed");
            e
        })?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
            warn!(parent = %parent.display(), error = %e, "vault: temp file failed");
            e
        })?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;

        temp.persist_noclobber(&full_path).map_err(|e| {
            warn!(to = %full_path.display(), error = %e.error, "vault: persist failed");
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                Error::Store(format!("{} already exists", path))
            } else {
                Error::from(e.error)
            }
        })?;

        Ok(())
    }

    fn relative_id(&self, full_path: &Path) -> Option<String> {
        let relative = full_path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl DocumentStore for VaultStore {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let mut documents = Vec::new();
        if !self.exists(&self.root).await? {
            return Ok(documents);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXTENSION) {
                    if let Some(id) = self.relative_id(&path) {
                        documents.push(DocumentRef::from_path(id));
                    }
                }
            }
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = documents.len(), "vault: listed documents");
        Ok(documents)
    }

    async fn read_text(&self, id: &str) -> Result<String> {
        let full_path = self.full_path(id)?;
        Ok(fs::read_to_string(full_path).await?)
    }

    async fn create_document(&self, path: &str, content: &str) -> Result<DocumentRef> {
        self.write_new(path, content.as_bytes()).await?;
        Ok(DocumentRef::from_path(path))
    }

    async fn delete_if_exists(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        if self.exists(&full_path).await? {
            fs::remove_file(full_path).await?;
            debug!(store_path = %path, "vault: deleted");
        }
        Ok(())
    }

    async fn create_folder_if_missing(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        fs::create_dir_all(full_path).await?;
        Ok(())
    }

    async fn create_binary(&self, path: &str, data: &[u8]) -> Result<DocumentRef> {
        self.write_new(path, data).await?;
        Ok(DocumentRef::from_path(path))
    }

    async fn rename_or_move(&self, id: &str, new_path: &str) -> Result<DocumentRef> {
        let from = self.full_path(id)?;
        let to = self.full_path(new_path)?;

        if !self.exists(&from).await? {
            return Err(Error::Store(format!("{} does not exist", id)));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(&from, &to).await.map_err(|e| {
            warn!(from = %id, to = %new_path, error = %e, "vault: rename failed");
            e
        })?;
        debug!(from = %id, to = %new_path, "vault: moved");
        Ok(DocumentRef::from_path(new_path))
    }
}
