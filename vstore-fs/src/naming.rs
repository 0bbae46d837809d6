//! Object naming for keys, metadata records and archived revisions.
//!
//! A key `K` owns three kinds of objects:
//! - `K`: the current content
//! - `K` + metadata suffix (default `.meta`): the version record
//! - `K.v<N>`: archived revision `N`, decimal ASCII

use crate::store::FsError;

/// Longest accepted key, in bytes.
pub const MAX_KEY_LEN: usize = 255;

const VERSION_INFIX: &str = ".v";

/// Suffix of the staging file a directory store writes before renaming.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Name of the metadata object for `key`.
pub fn meta_name(key: &str, suffix: &str) -> String {
    format!("{}{}", key, suffix)
}

/// Name of archived revision `version` of `key`.
pub fn version_name(key: &str, version: u32) -> String {
    format!("{}{}{}", key, VERSION_INFIX, version)
}

/// Split an archived-revision name into its key and version number.
///
/// `"cfg.json.v12"` parses as `("cfg.json", 12)`. Leading zeros and a zero
/// version are rejected since `version_name` never produces them.
pub fn parse_version_name(name: &str) -> Option<(&str, u32)> {
    let idx = name.rfind(VERSION_INFIX)?;
    let (key, rest) = name.split_at(idx);
    let digits = &rest[VERSION_INFIX.len()..];
    if key.is_empty() || digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let version = digits.parse().ok()?;
    Some((key, version))
}

/// Check that `key` is usable as a logical file name.
///
/// Keys that would collide with another key's metadata or archived
/// revisions are rejected.
pub fn validate_key(key: &str, meta_suffix: &str) -> Result<(), FsError> {
    let invalid = |reason| {
        Err(FsError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return invalid("empty");
    }
    if key.len() > MAX_KEY_LEN {
        return invalid("too long");
    }
    if key.contains('\0') {
        return invalid("contains NUL");
    }
    if key.starts_with('/') || key.starts_with('\\') {
        return invalid("absolute path");
    }
    if key.ends_with('/') {
        return invalid("names a directory");
    }
    // one file must have exactly one spelling, or two locks guard it
    for part in key.split(['/', '\\']) {
        match part {
            ".." => return invalid("parent directory component"),
            "." => return invalid("current directory component"),
            "" => return invalid("empty path component"),
            _ => {}
        }
    }
    if !meta_suffix.is_empty() && key.ends_with(meta_suffix) {
        return invalid("ends with the metadata suffix");
    }
    if parse_version_name(key).is_some() {
        return invalid("ends with an archived-revision suffix");
    }
    if key.ends_with(TEMP_SUFFIX) {
        return invalid("ends with the staging suffix");
    }
    Ok(())
}
