//! List, info and changed commands.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use vstore::{ByteStore, Clock, Logger, VersionError, VersionInfo, VersionStore};

use crate::cli::{ChangedArgs, ViewArgs};

use super::CommandResult;

/// A version entry as printed, with its timestamp rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionView {
    #[serde(flatten)]
    pub info: VersionInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl From<VersionInfo> for VersionView {
    fn from(info: VersionInfo) -> Self {
        let modified = info.timestamp.map(format_timestamp);
        Self { info, modified }
    }
}

/// Render epoch seconds as an RFC 3339 UTC timestamp.
pub fn format_timestamp(secs: u32) -> String {
    Utc.timestamp_opt(secs as i64, 0)
        .single()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Execute the list command, returning the rendered listing.
pub fn execute_list<S, C, L>(args: &ViewArgs, store: &VersionStore<S, C, L>) -> CommandResult<String>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    let views: Vec<VersionView> = store
        .list_versions(&args.key)
        .into_iter()
        .map(VersionView::from)
        .collect();

    if args.json {
        return Ok(serde_json::to_string_pretty(&views)? + "\n");
    }

    let mut text = String::new();
    for view in &views {
        text.push_str(&format!("v{}\t{} bytes", view.info.version, view.info.size));
        if view.info.is_current {
            text.push_str("\tcurrent");
        }
        if let Some(modified) = &view.modified {
            text.push_str(&format!("\t{}", modified));
        }
        text.push('\n');
    }
    Ok(text)
}

/// Execute the info command, returning the rendered current version.
pub fn execute_info<S, C, L>(args: &ViewArgs, store: &VersionStore<S, C, L>) -> CommandResult<String>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    let info = store
        .query()
        .info(&args.key)
        .ok_or_else(|| VersionError::MissingKey {
            key: args.key.clone(),
        })?;
    let view = VersionView::from(info);

    if args.json {
        return Ok(serde_json::to_string_pretty(&view)? + "\n");
    }

    let mut text = format!(
        "key: {}\nversion: {}\nsize: {}\n",
        args.key, view.info.version, view.info.size
    );
    if let Some(modified) = &view.modified {
        text.push_str(&format!("modified: {}\n", modified));
    }
    Ok(text)
}

/// Execute the changed command.
pub fn execute_changed<S, C, L>(args: &ChangedArgs, store: &VersionStore<S, C, L>) -> bool
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    store.query().is_stale(&args.key, args.last_known)
}
