//! Byte store abstraction for vstore.
//!
//! This crate provides:
//! - `ByteStore` trait: flat, name-addressed object storage with no versioning knowledge
//! - `DirByteStore` backed by a directory on the host filesystem
//! - `MockByteStore` for tests, with mount toggling and failure injection
//! - Object naming for metadata and archived revisions, plus key validation

pub mod mock;
pub mod naming;
pub mod store;

pub use mock::{MockByteStore, StoreOp};
pub use naming::{
    meta_name, parse_version_name, validate_key, version_name, MAX_KEY_LEN, TEMP_SUFFIX,
};
pub use store::{ByteStore, DirByteStore, FsError};
