//! In-memory document store.
//!
//! Keeps entries in insertion order so enumeration is stable. Used by tests
//! and by embedders that persist notes themselves.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use quill_core::defaults::NOTE_EXTENSION;
use quill_core::{DocumentRef, DocumentStore, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Default)]
struct Inner {
    entries: Vec<(String, Entry)>,
    folders: BTreeSet<String>,
}

impl Inner {
    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|(p, _)| p == path)
    }

    fn insert_new(&mut self, path: &str, entry: Entry) -> Result<DocumentRef> {
        if self.position(path).is_some() {
            return Err(Error::Store(format!("{} already exists", path)));
        }
        self.entries.push((path.to_string(), entry));
        Ok(DocumentRef::from_path(path))
    }
}

/// Document store held in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn is_note(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| ext == NOTE_EXTENSION)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Store("memory store poisoned".to_string()))
    }

    /// Seed a text document.
    pub fn with_document(self, path: &str, text: &str) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.insert_new(path, Entry::Text(text.to_string()));
        }
        self
    }

    /// Seed a binary asset.
    pub fn with_binary(self, path: &str, data: &[u8]) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.insert_new(path, Entry::Binary(data.to_vec()));
        }
        self
    }

    /// Text of the document at `path`, if present.
    pub fn text(&self, path: &str) -> Option<String> {
        let inner = self.inner.lock().ok()?;
        inner.entries.iter().find_map(|(p, e)| match e {
            Entry::Text(text) if p == path => Some(text.clone()),
            _ => None,
        })
    }

    /// Bytes of the asset at `path`, if present.
    pub fn binary(&self, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().ok()?;
        inner.entries.iter().find_map(|(p, e)| match e {
            Entry::Binary(data) if p == path => Some(data.clone()),
            _ => None,
        })
    }

    /// Every entry path, in insertion order.
    pub fn paths(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.entries.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.position(path).is_some())
            .unwrap_or(false)
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.folders.contains(path))
            .unwrap_or(false)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let inner = self.lock()?;
        Ok(inner
            .entries
            .iter()
            .filter(|(p, e)| matches!(e, Entry::Text(_)) && is_note(p))
            .map(|(p, _)| DocumentRef::from_path(p.clone()))
            .collect())
    }

    async fn read_text(&self, id: &str) -> Result<String> {
        let inner = self.lock()?;
        match inner.position(id).map(|i| &inner.entries[i].1) {
            Some(Entry::Text(text)) => Ok(text.clone()),
            Some(Entry::Binary(_)) => Err(Error::Store(format!("{} is not a text document", id))),
            None => Err(Error::Store(format!("{} does not exist", id))),
        }
    }

    async fn create_document(&self, path: &str, content: &str) -> Result<DocumentRef> {
        self.lock()?
            .insert_new(path, Entry::Text(content.to_string()))
    }

    async fn delete_if_exists(&self, path: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(i) = inner.position(path) {
            inner.entries.remove(i);
        }
        Ok(())
    }

    async fn create_folder_if_missing(&self, path: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            inner.folders.insert(prefix.clone());
        }
        Ok(())
    }

    async fn create_binary(&self, path: &str, data: &[u8]) -> Result<DocumentRef> {
        self.lock()?.insert_new(path, Entry::Binary(data.to_vec()))
    }

    async fn rename_or_move(&self, id: &str, new_path: &str) -> Result<DocumentRef> {
        let mut inner = self.lock()?;
        if inner.position(new_path).is_some() {
            return Err(Error::Store(format!("{} already exists", new_path)));
        }
        let i = inner
            .position(id)
            .ok_or_else(|| Error::Store(format!("{} does not exist", id)))?;
        inner.entries[i].0 = new_path.to_string();
        Ok(DocumentRef::from_path(new_path))
    }
}
