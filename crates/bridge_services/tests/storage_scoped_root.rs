use bridge_host::{StorageError, StoredFile};
use bridge_services::ScopedFileStore;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("{prefix}_{}_{}", process::id(), nanos));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

#[test]
fn save_then_read_returns_last_saved_content() {
    let root = temp_dir("storage_round_trip");
    let store = ScopedFileStore::from_root(&root).expect("init store");

    assert_eq!(store.save("trips", "[1]").expect("save"), "trips");
    assert_eq!(store.save("tr-ips!", "[1,2]").expect("overwrite"), "trips");
    assert_eq!(
        store.read("trips").expect("read"),
        StoredFile {
            name: "trips".into(),
            content: "[1,2]".into(),
        }
    );
    assert!(root.join("trips.json").is_file());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn invalid_names_are_rejected_before_touching_storage() {
    let root = temp_dir("storage_invalid_names");
    let store = ScopedFileStore::from_root(&root).expect("init store");

    for name in ["", "1234", "../..", "abcdefghij"] {
        assert_eq!(store.save(name, "x"), Err(StorageError::InvalidName), "{name:?}");
        assert_eq!(store.read(name), Err(StorageError::InvalidName), "{name:?}");
        assert_eq!(store.delete(name), Err(StorageError::InvalidName), "{name:?}");
    }
    assert_eq!(
        fs::read_dir(&root).expect("read root").count(),
        0,
        "nothing should be written"
    );

    let _ = fs::remove_dir_all(root);
}

#[test]
fn path_like_names_stay_inside_root() {
    let root = temp_dir("storage_traversal");
    let store = ScopedFileStore::from_root(&root).expect("init store");

    let saved = store.save("../../etc/x", "escaped?").expect("save");
    assert_eq!(saved, "etcx");
    assert!(root.join("etcx.json").is_file());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn read_and_delete_of_missing_name() {
    let root = temp_dir("storage_missing");
    let store = ScopedFileStore::from_root(&root).expect("init store");

    assert_eq!(store.read("ghost"), Err(StorageError::NotFound));
    let outcome = store.delete("ghost").expect("delete missing is not an error");
    assert!(!outcome.removed);
    assert_eq!(outcome.name, "ghost");

    store.save("ghost", "{}").expect("save");
    assert!(store.delete("ghost").expect("delete").removed);
    assert_eq!(store.read("ghost"), Err(StorageError::NotFound));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn list_reports_only_storage_files_sorted_by_name() {
    let root = temp_dir("storage_list");
    let store = ScopedFileStore::from_root(&root).expect("init store");
    assert!(store.list().is_empty());

    store.save("zeta", "12345").expect("save zeta");
    store.save("alpha", "1").expect("save alpha");
    fs::write(root.join("notes.txt"), "ignored").expect("write foreign file");
    fs::create_dir_all(root.join("nested.json")).expect("create dir with extension");

    let files = store.list();
    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(files[1].size, 5);
    assert!(files[0].modified > 0);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn list_degrades_to_empty_when_root_disappears() {
    let root = temp_dir("storage_list_gone");
    let store = ScopedFileStore::from_root(&root).expect("init store");
    store.save("trips", "[]").expect("save");
    fs::remove_dir_all(&root).expect("remove root");

    assert!(store.list().is_empty());
    assert_eq!(store.save("trips", "[]"), Err(StorageError::WriteFailed));
}
