//! Structural diff between two tree snapshots.
//!
//! The result is set-valued: consumers must not rely on the order of any field.
//! Leaves that disappeared from one place and reappeared under the same name, kind and
//! extension somewhere else (exactly one candidate each way) are reported as `moved`
//! instead of as a removal plus an addition.

use crate::tree::{NodeKind, Snapshot, TreePath};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDiff {
    pub added: BTreeSet<TreePath>,
    pub removed: BTreeSet<TreePath>,
    pub status_changed: BTreeSet<TreePath>,
    /// `(from, to)` pairs of relocated leaves.
    pub moved: Vec<(TreePath, TreePath)>,
}

impl NoteDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.status_changed.is_empty()
            && self.moved.is_empty()
    }

    /// Every path the diff mentions, moves counted at both ends.
    pub fn touched(&self) -> impl Iterator<Item = &TreePath> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.status_changed)
            .chain(self.moved.iter().flat_map(|(from, to)| [from, to]))
    }
}

pub fn diff(before: &Snapshot, after: &Snapshot) -> NoteDiff {
    let mut result = NoteDiff::default();

    for (path, entry) in after.iter() {
        match before.get(path) {
            None => {
                result.added.insert(path.clone());
            }
            Some(old) if old.kind != entry.kind => {
                result.removed.insert(path.clone());
                result.added.insert(path.clone());
            }
            Some(old) if old.status != entry.status => {
                result.status_changed.insert(path.clone());
            }
            Some(_) => {}
        }
    }
    for (path, _) in before.iter() {
        if !after.contains(path) {
            result.removed.insert(path.clone());
        }
    }

    pair_moves(before, after, &mut result);
    result
}

type MoveKey = (NodeKind, String, Option<String>);

fn move_key(snapshot: &Snapshot, path: &TreePath) -> Option<MoveKey> {
    let entry = snapshot.get(path)?;
    if !matches!(entry.kind, NodeKind::Scroll | NodeKind::File) {
        return None;
    }
    let name = path.name()?.to_string();
    Some((entry.kind, name, snapshot.extension(path).map(str::to_string)))
}

fn pair_moves(before: &Snapshot, after: &Snapshot, result: &mut NoteDiff) {
    let mut removed_by_key: HashMap<MoveKey, Vec<TreePath>> = HashMap::new();
    for path in &result.removed {
        if after.contains(path) {
            continue;
        }
        if let Some(key) = move_key(before, path) {
            removed_by_key.entry(key).or_default().push(path.clone());
        }
    }
    let mut added_by_key: HashMap<MoveKey, Vec<TreePath>> = HashMap::new();
    for path in &result.added {
        if before.contains(path) {
            continue;
        }
        if let Some(key) = move_key(after, path) {
            added_by_key.entry(key).or_default().push(path.clone());
        }
    }

    for (key, removed) in removed_by_key {
        let Some(added) = added_by_key.get(&key) else {
            continue;
        };
        if let ([from], [to]) = (removed.as_slice(), added.as_slice()) {
            result.removed.remove(from);
            result.added.remove(to);
            result.moved.push((from.clone(), to.clone()));
        }
    }
    result.moved.sort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::name;
    use crate::tree::{path, LibraryTree, NoteEntry, Status};

    fn tree() -> LibraryTree {
        let mut t = LibraryTree::new(name("Library"));
        t.add_notes([
            NoteEntry::scroll(path("A/One"), Status::NotStarted),
            NoteEntry::scroll(path("A/Two"), Status::Done),
            NoteEntry::file(path("B/pic"), "png"),
        ]);
        t
    }

    #[test]
    fn identical_snapshots_diff_empty() {
        let t = tree();
        assert!(diff(&t.snapshot(), &t.snapshot()).is_empty());
    }

    #[test]
    fn reports_added_sections_and_leaves() {
        let mut t = tree();
        let before = t.snapshot();
        t.add_notes([NoteEntry::scroll(path("C/D/New"), Status::NotStarted)]);
        let d = diff(&before, &t.snapshot());

        assert!(d.added.contains(&path("C")));
        assert!(d.added.contains(&path("C/D")));
        assert!(d.added.contains(&path("C/D/New")));
        assert!(d.removed.is_empty());
    }

    #[test]
    fn status_change_propagates_to_section_aggregate() {
        let mut t = tree();
        let before = t.snapshot();
        t.set_status(&path("A/One"), Status::Done);
        let d = diff(&before, &t.snapshot());

        assert!(d.status_changed.contains(&path("A/One")));
        assert!(d.status_changed.contains(&path("A")));
        assert!(!d.status_changed.contains(&path("B")));
    }

    #[test]
    fn reports_removed_subtree() {
        let mut t = tree();
        let before = t.snapshot();
        t.delete_notes([&path("A")]);
        let d = diff(&before, &t.snapshot());

        assert_eq!(
            d.removed,
            [path("A"), path("A/One"), path("A/Two")].into_iter().collect()
        );
    }

    #[test]
    fn pairs_unique_moves() {
        let mut t = tree();
        let before = t.snapshot();
        t.move_node(&path("A/Two"), &path("B/Two"));
        let d = diff(&before, &t.snapshot());

        assert_eq!(d.moved, vec![(path("A/Two"), path("B/Two"))]);
        assert!(!d.removed.contains(&path("A/Two")));
        assert!(!d.added.contains(&path("B/Two")));
    }

    #[test]
    fn ambiguous_moves_stay_add_remove() {
        let mut t = tree();
        t.add_notes([NoteEntry::scroll(path("C/Two"), Status::Done)]);
        let before = t.snapshot();
        t.delete_notes([&path("A/Two"), &path("C/Two")]);
        t.add_notes([NoteEntry::scroll(path("B/Two"), Status::Done)]);
        let d = diff(&before, &t.snapshot());

        assert!(d.moved.is_empty());
        assert!(d.added.contains(&path("B/Two")));
    }
}
