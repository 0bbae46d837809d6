//! End-to-end behavior of the version store over a real directory.

use tempfile::TempDir;
use vstore::{
    checksum, ByteStore, DirByteStore, FixedClock, MetaStatus, NullLogger, StoreConfig,
    VersionStore,
};

type DirStore = VersionStore<DirByteStore, FixedClock, NullLogger>;

fn open(dir: &TempDir, depth: usize) -> DirStore {
    let store = DirByteStore::new(dir.path());
    store.mount().expect("mount");
    VersionStore::new(
        store,
        FixedClock::new(1_700_000_000),
        NullLogger,
        StoreConfig::default().with_history_depth(depth),
    )
    .expect("open store")
}

fn archived(store: &DirStore, key: &str) -> Vec<u32> {
    let mut versions: Vec<u32> = store
        .list_versions(key)
        .into_iter()
        .filter(|v| !v.is_current)
        .map(|v| v.version)
        .collect();
    versions.sort_unstable();
    versions
}

fn read_current(store: &DirStore, key: &str) -> Vec<u8> {
    store.read_version(key, 0).expect("read current")
}

#[test]
fn test_never_written_key_is_empty() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 3);

    assert_eq!(store.current_version("ghost"), 0);
    assert!(store.list_versions("ghost").is_empty());
}

#[test]
fn test_history_tracks_most_recent_prior_versions() {
    let dir = TempDir::new().expect("temp dir");
    let depth = 3;
    let store = open(&dir, depth);

    for n in 1..=8u32 {
        store.write("cfg", &n.to_le_bytes()).expect("write");

        assert_eq!(store.current_version("cfg"), n);
        let prior = (n - 1) as usize;
        let history = archived(&store, "cfg");
        assert_eq!(history.len(), prior.min(depth));
        let expected: Vec<u32> = (1..n).rev().take(depth).rev().collect();
        assert_eq!(history, expected);
    }
}

#[test]
fn test_read_after_write_matches_checksum() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 3);
    let payload = b"ssid=home\npsk=hunter2\n";

    store.write("net/wifi.cfg", payload).expect("write");

    let mut buf = vec![0u8; payload.len()];
    store.read("net/wifi.cfg", 0, &mut buf).expect("read");
    assert_eq!(buf, payload);

    let report = store.verify("net/wifi.cfg").expect("verify");
    assert!(report.is_intact());
    assert_eq!(report.expected_checksum, checksum(&buf));
}

#[test]
fn test_restore_brings_back_old_bytes() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 3);
    store.write("cfg", b"first").expect("write");
    store.write("cfg", b"second").expect("write");
    store.write("cfg", b"third").expect("write");
    let before = store.current_version("cfg");

    store.restore("cfg", 1).expect("restore");

    assert_eq!(store.current_version("cfg"), before + 1);
    assert_eq!(read_current(&store, "cfg"), b"first");
}

#[test]
fn test_eviction_removes_oldest_objects() {
    let dir = TempDir::new().expect("temp dir");
    let depth = 3;
    let store = open(&dir, depth);

    for i in 0..(depth as u8 + 2) {
        store.write("cfg", &[i]).expect("write");
    }

    let fs = store.store();
    assert!(!fs.exists("cfg.v1"));
    assert!(!fs.exists("cfg.v2"));
    for v in 3..=5 {
        assert!(fs.exists(&format!("cfg.v{}", v)), "v{} should remain", v);
    }
    assert_eq!(archived(&store, "cfg"), vec![3, 4, 5]);
}

#[test]
fn test_listing_is_idempotent() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 2);
    for data in [b"a", b"b", b"c"] {
        store.write("cfg", data).expect("write");
    }

    assert_eq!(store.list_versions("cfg"), store.list_versions("cfg"));
}

#[test]
fn test_depth_two_scenario() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 2);
    let fs = store.store();

    store.write("k", b"A").expect("write A");
    store.write("k", b"B").expect("write B");
    store.write("k", b"C").expect("write C");

    assert_eq!(store.current_version("k"), 3);
    assert_eq!(archived(&store, "k"), vec![1, 2]);
    assert!(fs.exists("k.v1"));
    assert!(fs.exists("k.v2"));
    assert!(!fs.exists("k.v0"));

    store.write("k", b"D").expect("write D");
    assert!(!fs.exists("k.v1"));
    assert_eq!(archived(&store, "k"), vec![2, 3]);

    let outcome = store.restore("k", 2).expect("restore v2");
    assert_eq!(outcome.version, 5);
    assert_eq!(read_current(&store, "k"), b"B");
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = open(&dir, 2);
        store.write("cfg", b"one").expect("write");
        store.write("cfg", b"two").expect("write");
    }

    let store = open(&dir, 2);
    assert_eq!(store.current_version("cfg"), 2);
    assert_eq!(store.read_version("cfg", 1).expect("read v1"), b"one");
    assert_eq!(store.metadata_status("cfg").expect("status"), MetaStatus::Valid);
}

#[test]
fn test_reopen_with_smaller_depth_then_cleanup() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = open(&dir, 4);
        for i in 0..5u8 {
            store.write("cfg", &[i]).expect("write");
        }
    }

    let store = open(&dir, 2);
    assert_eq!(
        store.metadata_status("cfg").expect("status"),
        MetaStatus::Resized { stored_depth: 4 }
    );
    assert_eq!(store.cleanup("cfg"), 2);
    assert_eq!(archived(&store, "cfg"), vec![3, 4]);
    assert_eq!(store.metadata_status("cfg").expect("status"), MetaStatus::Valid);
}

#[test]
fn test_unmounted_directory() {
    let dir = TempDir::new().expect("temp dir");
    let store = VersionStore::new(
        DirByteStore::new(dir.path().join("not-there")),
        FixedClock::new(0),
        NullLogger,
        StoreConfig::default(),
    )
    .expect("open store");

    assert!(store.write("cfg", b"x").is_err());
    assert_eq!(store.current_version("cfg"), 0);
}

#[test]
fn test_erase_clears_directory() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 2);
    for data in [b"a", b"b", b"c"] {
        store.write("cfg", data).expect("write");
    }

    store.erase("cfg").expect("erase");

    let leftover: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert!(leftover.is_empty(), "left behind: {:?}", leftover);
}

#[test]
fn test_one_file_has_one_key_spelling() {
    let dir = TempDir::new().expect("temp dir");
    let store = open(&dir, 3);
    store.write("cfg", b"first").expect("write");

    assert!(store.write("./cfg", b"second").is_err());
    assert!(store.write("sub//cfg", b"second").is_err());

    assert_eq!(store.current_version("cfg"), 1);
    assert_eq!(read_current(&store, "cfg"), b"first");
    assert!(archived(&store, "cfg").is_empty());
}
