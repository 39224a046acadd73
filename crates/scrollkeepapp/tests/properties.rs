//! Invariants checked over a spread of hand-picked inputs.

use scrollkeepapp::canon::{self, canonicalize, Authority, Canonicalized};
use scrollkeepapp::codec::suffix::{decode, encode};
use scrollkeepapp::diff::diff;
use scrollkeepapp::names::sanitize;
use scrollkeepapp::path::{LibraryLayout, VaultPath};
use scrollkeepapp::tree::{LibraryTree, NoteEntry, Status, TreePath};

fn layout() -> LibraryLayout {
    LibraryLayout::new(sanitize("Library").unwrap(), "md", "_untracked")
}

const PHYSICAL: &[&str] = &[
    "Library/Note.md",
    "Library/Note-X-Y.md",
    "Library/E1/my-note-E1.md",
    "Library/I3/I4/Untitled.md",
    "Library/A/A/Note-A.md",
    "Library/A/B/__-B-A.md",
    "Library/__-Library.md",
    "Library/Doc/Page003-Doc.md",
    "Library/A/photo.png",
    "Library/A/My Note.md",
    "Library/A/README",
    "Library/_untracked/A/README",
];

#[test]
fn canonicalization_is_idempotent_under_both_authorities() {
    let layout = layout();
    for raw in PHYSICAL {
        for authority in [Authority::Folder, Authority::Basename] {
            let once = canonicalize(&layout, &VaultPath::parse(raw), authority);
            let twice = canonicalize(&layout, once.target_path(), authority);
            assert_eq!(once.target_path(), twice.target_path(), "{raw} {authority:?}");
        }
    }
}

#[test]
fn case_only_differences_are_canonical() {
    let layout = layout();
    for raw in PHYSICAL {
        let Canonicalized::Canonical(c) =
            canonicalize(&layout, &VaultPath::parse(raw), Authority::Folder)
        else {
            continue;
        };
        let shouted = VaultPath::new(
            c.canonical_path
                .parts()
                .iter()
                .map(|part| part.to_uppercase())
                .collect(),
        );
        assert!(
            canon::is_canonical(&shouted, &c.canonical_path),
            "{shouted}"
        );
    }
}

#[test]
fn a_snapshot_does_not_differ_from_itself() {
    let mut tree = LibraryTree::new(sanitize("Library").unwrap());
    assert!(diff(&tree.snapshot(), &tree.snapshot()).is_empty());

    tree.add_notes([
        NoteEntry::scroll(TreePath::parse("A/One").unwrap(), Status::Done),
        NoteEntry::scroll(TreePath::parse("A/B/Two").unwrap(), Status::NotStarted),
        NoteEntry::file(TreePath::parse("A/photo").unwrap(), "png"),
        NoteEntry::scroll(TreePath::parse("Top").unwrap(), Status::NotStarted),
    ]);
    let snapshot = tree.snapshot();
    assert!(diff(&snapshot, &snapshot).is_empty());
    assert!(diff(&snapshot, &tree.snapshot()).is_empty());
}

#[test]
fn well_formed_basenames_survive_decode_encode() {
    for raw in [
        "Note-A",
        "my-note-E1",
        "Untitled-I4-I3",
        "Page007-Doc-A",
        "Solo",
    ] {
        let split = decode(raw).unwrap();
        assert_eq!(encode(&split), raw);
    }
}
