//! The full stack over a real directory.

use scrollkeepapp::api::ScrollkeepApi;
use scrollkeepapp::config::LibraryConfig;
use scrollkeepapp::librarian::Librarian;
use scrollkeepapp::path::VaultPath;
use scrollkeepapp::store::fs_backend::{FsBackend, TRASH_DIR};
use scrollkeepapp::store::StoreEvent;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn api(vault: &Path) -> ScrollkeepApi<FsBackend> {
    let librarian =
        Librarian::from_config(FsBackend::new(vault), &LibraryConfig::default()).unwrap();
    let mut api = ScrollkeepApi::new(librarian);
    let healed = api.heal().unwrap();
    assert!(!healed.has_errors(), "{:?}", healed.messages);
    api
}

fn read(vault: &Path, rel: &str) -> String {
    fs::read_to_string(vault.join(rel)).unwrap()
}

#[test]
fn empty_vault_gets_a_root_codex() {
    let dir = tempdir().unwrap();
    api(dir.path());
    assert!(dir.path().join("Library/__-Library.md").is_file());
}

#[test]
fn add_complete_remove_round() {
    let dir = tempdir().unwrap();
    let vault = dir.path();
    let mut api = api(vault);

    let added = api.add_notes(&["Projects/Roadmap", "Projects/Q3/Budget"]).unwrap();
    assert!(!added.has_errors(), "{:?}", added.messages);
    assert!(vault.join("Library/Projects/Roadmap-Projects.md").is_file());
    assert!(vault.join("Library/Projects/Q3/Budget-Q3-Projects.md").is_file());
    assert!(vault.join("Library/Projects/Q3/__-Q3-Projects.md").is_file());

    let done = api.complete(&["Projects/Q3"]).unwrap();
    assert!(!done.has_errors(), "{:?}", done.messages);
    assert!(read(vault, "Library/Projects/Q3/Budget-Q3-Projects.md").contains("status: done"));
    assert!(read(vault, "Library/Projects/__-Projects.md").contains("- [x] [[__-Q3-Projects|Q3]]"));

    let removed = api.remove_notes(&["Projects/Roadmap"]).unwrap();
    assert!(!removed.has_errors(), "{:?}", removed.messages);
    assert!(!vault.join("Library/Projects/Roadmap-Projects.md").exists());
    assert!(vault.join(TRASH_DIR).is_dir());
    assert!(!read(vault, "Library/Projects/__-Projects.md").contains("Roadmap"));
}

#[test]
fn external_folder_rename_is_healed() {
    let dir = tempdir().unwrap();
    let vault = dir.path();
    fs::create_dir_all(vault.join("Library/A/B")).unwrap();
    fs::write(vault.join("Library/A/B/Note-B-A.md"), "text").unwrap();
    let mut api = api(vault);
    assert!(vault.join("Library/A/B/__-B-A.md").is_file());

    fs::rename(vault.join("Library/A"), vault.join("Library/X")).unwrap();
    let result = api.apply_events([StoreEvent::Renamed {
        from: VaultPath::parse("Library/A"),
        to: VaultPath::parse("Library/X"),
    }]);

    assert!(!result.has_errors(), "{:?}", result.messages);
    assert_eq!(read(vault, "Library/X/B/Note-B-X.md"), "text");
    assert!(vault.join("Library/X/B/__-B-X.md").is_file());
    assert!(!vault.join("Library/X/B/__-B-A.md").exists());
    assert!(read(vault, "Library/__-Library.md").contains("[[__-X|X]]"));
}

#[test]
fn hidden_entries_are_not_part_of_the_library() {
    let dir = tempdir().unwrap();
    let vault = dir.path();
    fs::create_dir_all(vault.join("Library/.obsidian")).unwrap();
    fs::write(vault.join("Library/.obsidian/app.json"), "{}").unwrap();
    let api = api(vault);

    assert_eq!(read(vault, "Library/.obsidian/app.json"), "{}");
    let listed = api.list(None).unwrap();
    assert!(listed.listed_nodes.is_empty());
}
