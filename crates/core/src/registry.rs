//! Hand-off storage for rendered files.
//!
//! A render stores its bytes under a fresh identifier; a later download
//! looks them up again. The [`FileRegistry`] trait lets callers choose the
//! storage (plain map, bounded cache, durable store) without touching the
//! renderer.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// MIME type of a rendered presentation.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Download name offered for a rendered presentation.
pub const DEFAULT_DOWNLOAD_NAME: &str = "generated_presentation.pptx";

/// Identifier of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as text, as used in download links.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendered file ready to be served. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
    pub filename: String,
}

impl StoredFile {
    /// Wrap presentation bytes with the standard MIME type and file name.
    pub fn presentation(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: PPTX_MIME_TYPE,
            filename: DEFAULT_DOWNLOAD_NAME.to_string(),
        }
    }
}

/// Keyed storage for rendered files.
///
/// Each stored file gets its own identifier, so there is exactly one writer
/// per key. Files stay retrievable at least until they are removed or the
/// registry's own eviction policy drops them.
pub trait FileRegistry: Send + Sync {
    /// Store a file and return its new identifier.
    fn store(&self, file: StoredFile) -> FileId;

    /// Look a file up; `None` means the caller should answer "not found".
    fn get(&self, id: &FileId) -> Option<StoredFile>;

    /// Drop a file. Returns whether it was present.
    fn remove(&self, id: &FileId) -> bool;
}

#[derive(Debug, Default)]
struct Entries {
    files: HashMap<FileId, StoredFile>,
    order: VecDeque<FileId>,
}

/// In-process registry, optionally bounded to a number of files with
/// oldest-first eviction.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: Mutex<Entries>,
    capacity: Option<usize>,
}

impl InMemoryRegistry {
    /// Create an unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that keeps at most `capacity` files.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Number of files currently held.
    pub fn len(&self) -> usize {
        self.lock().files.len()
    }

    /// Whether the registry holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileRegistry for InMemoryRegistry {
    fn store(&self, file: StoredFile) -> FileId {
        let id = FileId::generate();
        let mut entries = self.lock();

        if let Some(capacity) = self.capacity {
            while entries.files.len() >= capacity {
                let Some(oldest) = entries.order.pop_front() else {
                    break;
                };
                if entries.files.remove(&oldest).is_some() {
                    log::debug!("Evicted stored file {}", oldest);
                }
            }
        }

        entries.files.insert(id.clone(), file);
        entries.order.push_back(id.clone());
        id
    }

    fn get(&self, id: &FileId) -> Option<StoredFile> {
        self.lock().files.get(id).cloned()
    }

    fn remove(&self, id: &FileId) -> bool {
        let mut entries = self.lock();
        let removed = entries.files.remove(id).is_some();
        if removed {
            entries.order.retain(|existing| existing != id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_get() {
        let registry = InMemoryRegistry::new();
        let id = registry.store(StoredFile::presentation(vec![1, 2, 3]));

        let file = registry.get(&id).unwrap();
        assert_eq!(&*file.bytes, &[1, 2, 3]);
        assert_eq!(file.mime_type, PPTX_MIME_TYPE);
        assert_eq!(file.filename, "generated_presentation.pptx");
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = InMemoryRegistry::new();
        assert!(registry.get(&FileId::from("missing")).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = InMemoryRegistry::new();
        let a = registry.store(StoredFile::presentation(vec![1]));
        let b = registry.store(StoredFile::presentation(vec![2]));

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove() {
        let registry = InMemoryRegistry::new();
        let id = registry.store(StoredFile::presentation(vec![1]));

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let registry = InMemoryRegistry::with_capacity(2);
        let first = registry.store(StoredFile::presentation(vec![1]));
        let second = registry.store(StoredFile::presentation(vec![2]));
        let third = registry.store(StoredFile::presentation(vec![3]));

        assert!(registry.get(&first).is_none());
        assert!(registry.get(&second).is_some());
        assert!(registry.get(&third).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let registry = Arc::new(InMemoryRegistry::new());

        let handles: Vec<_> = (0..4u8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.store(StoredFile::presentation(vec![n])))
            })
            .collect();

        let ids: Vec<FileId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 4);
        for id in &ids {
            assert!(registry.get(id).is_some());
        }
    }
}
