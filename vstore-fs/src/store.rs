//! The byte store contract and its directory-backed implementation.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::naming::TEMP_SUFFIX;

/// Errors from byte store operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("short read on {name}: expected {expected} bytes, got {actual}")]
    ShortRead {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("store not mounted")]
    NotMounted,

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("injected failure on {0}")]
    Injected(String),
}

impl FsError {
    /// Whether this error means the object simply is not there.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound(_) => true,
            FsError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Flat, name-addressed object storage.
///
/// Names are store-relative strings such as `config.json`, `config.json.meta`
/// or `config.json.v3`. Implementations know nothing about versions.
pub trait ByteStore: Send + Sync {
    /// Whether the underlying volume is available.
    fn is_mounted(&self) -> bool;

    /// Whether an object with this name exists.
    fn exists(&self, name: &str) -> bool;

    /// Size of the object in bytes.
    fn size(&self, name: &str) -> Result<usize, FsError>;

    /// Read the first `len` bytes of an object.
    ///
    /// An object holding fewer than `len` bytes is a `ShortRead`.
    fn read(&self, name: &str, len: usize) -> Result<Vec<u8>, FsError>;

    /// Read an object in full.
    fn read_all(&self, name: &str) -> Result<Vec<u8>, FsError> {
        let len = self.size(name)?;
        self.read(name, len)
    }

    /// Replace the contents of an object, creating it if needed.
    fn write(&self, name: &str, data: &[u8]) -> Result<(), FsError>;

    /// Delete an object.
    fn remove(&self, name: &str) -> Result<(), FsError>;

    /// Resolve an object name to its location on the backing volume.
    fn path_for(&self, name: &str) -> PathBuf;
}

/// Byte store rooted at a directory on the host filesystem.
#[derive(Debug, Clone)]
pub struct DirByteStore {
    root: PathBuf,
}

impl DirByteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory so the store reports mounted.
    pub fn mount(&self) -> Result<(), FsError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, FsError> {
        if !self.is_mounted() {
            return Err(FsError::NotMounted);
        }
        Ok(self.root.join(name))
    }
}

fn map_io(name: &str, err: io::Error) -> FsError {
    if err.kind() == io::ErrorKind::NotFound {
        FsError::NotFound(name.to_string())
    } else {
        FsError::Io(err)
    }
}

impl ByteStore for DirByteStore {
    fn is_mounted(&self) -> bool {
        self.root.is_dir()
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn size(&self, name: &str) -> Result<usize, FsError> {
        let path = self.resolve(name)?;
        let meta = fs::metadata(&path).map_err(|e| map_io(name, e))?;
        if !meta.is_file() {
            return Err(FsError::NotFound(name.to_string()));
        }
        Ok(meta.len() as usize)
    }

    fn read(&self, name: &str, len: usize) -> Result<Vec<u8>, FsError> {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| map_io(name, e))?;

        let mut buf = Vec::with_capacity(len);
        file.take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(FsError::ShortRead {
                name: name.to_string(),
                expected: len,
                actual: buf.len(),
            });
        }
        Ok(buf)
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<(), FsError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Sibling temp file, then rename over the target
        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        let mut file = File::create(&temp)?;
        file.write_all(data)?;
        file.sync_data()?;
        drop(file);

        fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), FsError> {
        let path = self.resolve(name)?;
        fs::remove_file(&path).map_err(|e| map_io(name, e))
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
