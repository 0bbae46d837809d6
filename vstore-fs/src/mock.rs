//! In-memory byte store for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::{ByteStore, FsError};

/// A mutating call observed by the mock, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Write(String),
    Remove(String),
}

/// Mock byte store.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone)]
pub struct MockByteStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    ops: Arc<RwLock<Vec<StoreOp>>>,
    mounted: Arc<AtomicBool>,
    failing_writes: Arc<RwLock<Vec<String>>>,
    failing_removes: Arc<RwLock<Vec<String>>>,
}

impl Default for MockByteStore {
    fn default() -> Self {
        Self {
            objects: Arc::default(),
            ops: Arc::default(),
            mounted: Arc::new(AtomicBool::new(true)),
            failing_writes: Arc::default(),
            failing_removes: Arc::default(),
        }
    }
}

impl MockByteStore {
    /// A mounted, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.mounted.store(mounted, Ordering::SeqCst);
    }

    /// Make every write to a name ending in `suffix` fail.
    pub fn fail_writes_to(&self, suffix: &str) {
        self.failing_writes.write().push(suffix.to_string());
    }

    /// Make every remove of a name ending in `suffix` fail.
    pub fn fail_removes_to(&self, suffix: &str) {
        self.failing_removes.write().push(suffix.to_string());
    }

    /// Drop all injected failures.
    pub fn clear_failures(&self) {
        self.failing_writes.write().clear();
        self.failing_removes.write().clear();
    }

    /// Add an object directly (for test setup). Not recorded in `ops`.
    pub fn add_object(&self, name: &str, data: Vec<u8>) {
        self.objects.write().insert(name.to_string(), data);
    }

    /// Remove an object directly (for test setup). Not recorded in `ops`.
    pub fn drop_object(&self, name: &str) {
        self.objects.write().remove(name);
    }

    pub fn get_object(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.read().get(name).cloned()
    }

    /// Sorted names of all stored objects.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Mutating calls made through the `ByteStore` interface.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.read().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.write().clear();
    }

    fn matches(list: &RwLock<Vec<String>>, name: &str) -> bool {
        list.read().iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    fn check_mounted(&self) -> Result<(), FsError> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(FsError::NotMounted)
        }
    }
}

impl ByteStore for MockByteStore {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn exists(&self, name: &str) -> bool {
        self.is_mounted() && self.objects.read().contains_key(name)
    }

    fn size(&self, name: &str) -> Result<usize, FsError> {
        self.check_mounted()?;
        self.objects
            .read()
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    fn read(&self, name: &str, len: usize) -> Result<Vec<u8>, FsError> {
        self.check_mounted()?;
        let objects = self.objects.read();
        let data = objects
            .get(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if data.len() < len {
            return Err(FsError::ShortRead {
                name: name.to_string(),
                expected: len,
                actual: data.len(),
            });
        }
        Ok(data[..len].to_vec())
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<(), FsError> {
        self.check_mounted()?;
        if Self::matches(&self.failing_writes, name) {
            return Err(FsError::Injected(name.to_string()));
        }
        self.objects.write().insert(name.to_string(), data.to_vec());
        self.ops.write().push(StoreOp::Write(name.to_string()));
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), FsError> {
        self.check_mounted()?;
        if Self::matches(&self.failing_removes, name) {
            return Err(FsError::Injected(name.to_string()));
        }
        self.objects
            .write()
            .remove(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        self.ops.write().push(StoreOp::Remove(name.to_string()));
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        PathBuf::from("/mock").join(name)
    }
}
