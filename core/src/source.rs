//! Where document bytes come from.
//!
//! The index stores only document references and re-reads content through a
//! [`DocumentSource`] at both index and search time.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;

pub trait DocumentSource: Send + Sync {
    /// Read the full content of `document`.
    fn read(&self, document: &str) -> io::Result<Vec<u8>>;
}

/// Reads documents from the local filesystem, treating the reference as a path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn read(&self, document: &str) -> io::Result<Vec<u8>> {
        std::fs::read(document)
    }
}

/// In-memory documents keyed by reference.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, document: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.docs.write().insert(document.into(), content.into());
    }

    pub fn remove(&self, document: &str) -> Option<Vec<u8>> {
        self.docs.write().remove(document)
    }
}

impl DocumentSource for MemorySource {
    fn read(&self, document: &str) -> io::Result<Vec<u8>> {
        self.docs
            .read()
            .get(document)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such document: {document}")))
    }
}

impl<T: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<T> {
    fn read(&self, document: &str) -> io::Result<Vec<u8>> {
        (**self).read(document)
    }
}
