//! Foreground filesystem watcher.
//!
//! `notify` events are grouped until the filesystem has been quiet for
//! [`QUIET_PERIOD`], translated into [`StoreEvent`]s relative to the vault and handed
//! to the librarian in one settle cycle. Paths with a dot-prefixed segment (trash,
//! config, editor swap files) never reach the librarian.

use super::render::render_messages;
use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use scrollkeepapp::api::ScrollkeepApi;
use scrollkeepapp::path::VaultPath;
use scrollkeepapp::store::fs_backend::FsBackend;
use scrollkeepapp::store::StoreEvent;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

const QUIET_PERIOD: Duration = Duration::from_millis(150);

pub fn run(api: &mut ScrollkeepApi<FsBackend>, vault: &Path) -> Result<()> {
    let library = {
        let lib = api.librarian();
        lib.backend().abs(&lib.layout().root_path())
    };
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Cannot start the file watcher")?;
    watcher
        .watch(&library, RecursiveMode::Recursive)
        .with_context(|| format!("Cannot watch {}", library.display()))?;
    println!(
        "Watching {} in {} (Ctrl-C to stop)",
        library.display(),
        vault.display()
    );

    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        while let Ok(next) = rx.recv_timeout(QUIET_PERIOD) {
            batch.push(next);
        }

        let events: Vec<StoreEvent> = {
            let backend = api.librarian().backend();
            batch
                .into_iter()
                .filter_map(|received| match received {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!(error = %e, "Watcher error");
                        None
                    }
                })
                .flat_map(|event| translate(backend, &event))
                .collect()
        };
        if events.is_empty() {
            continue;
        }
        debug!(count = events.len(), "Applying watched changes");
        let result = api.apply_events(events);
        print!("{}", render_messages(&result.messages));
    }
    Ok(())
}

fn is_hidden(path: &VaultPath) -> bool {
    path.parts().iter().any(|part| part.starts_with('.'))
}

/// Maps one `notify` event onto zero or more store events.
fn translate(backend: &FsBackend, event: &Event) -> Vec<StoreEvent> {
    let visible = |abs: &PathBuf| backend.relative(abs).filter(|p| !is_hidden(p));
    let all = |make: fn(VaultPath) -> StoreEvent| -> Vec<StoreEvent> {
        event.paths.iter().filter_map(visible).map(make).collect()
    };

    match &event.kind {
        EventKind::Create(_) => all(StoreEvent::Created),
        EventKind::Remove(_) => all(StoreEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let from = event.paths.first().and_then(visible);
            let to = event.paths.get(1).and_then(visible);
            match (from, to) {
                (Some(from), Some(to)) => vec![StoreEvent::Renamed { from, to }],
                (Some(from), None) => vec![StoreEvent::Deleted(from)],
                (None, Some(to)) => vec![StoreEvent::Created(to)],
                (None, None) => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(StoreEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(StoreEvent::Created),
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .filter_map(|abs| {
                let path = visible(abs)?;
                Some(if abs.exists() {
                    StoreEvent::Created(path)
                } else {
                    StoreEvent::Deleted(path)
                })
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(|abs| !abs.is_dir())
            .filter_map(visible)
            .map(StoreEvent::Modified)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};

    fn backend() -> FsBackend {
        FsBackend::new("/vault")
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn create_and_remove_map_directly() {
        let created = translate(
            &backend(),
            &event(EventKind::Create(CreateKind::File), &["/vault/Library/N-A.md"]),
        );
        assert_eq!(
            created,
            vec![StoreEvent::Created(VaultPath::parse("Library/N-A.md"))]
        );

        let removed = translate(
            &backend(),
            &event(EventKind::Remove(RemoveKind::Any), &["/vault/Library/A"]),
        );
        assert_eq!(removed, vec![StoreEvent::Deleted(VaultPath::parse("Library/A"))]);
    }

    #[test]
    fn paired_rename_becomes_one_event() {
        let events = translate(
            &backend(),
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/vault/Library/A", "/vault/Library/X"],
            ),
        );
        assert_eq!(
            events,
            vec![StoreEvent::Renamed {
                from: VaultPath::parse("Library/A"),
                to: VaultPath::parse("Library/X"),
            }]
        );
    }

    #[test]
    fn rename_out_of_sight_is_a_delete() {
        let events = translate(
            &backend(),
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/vault/Library/N-A.md", "/vault/.trash/N-A.md"],
            ),
        );
        assert_eq!(events, vec![StoreEvent::Deleted(VaultPath::parse("Library/N-A.md"))]);
    }

    #[test]
    fn hidden_and_foreign_paths_are_dropped() {
        let events = translate(
            &backend(),
            &event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &["/vault/Library/.N-A.md.swp", "/elsewhere/N-A.md"],
            ),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn metadata_changes_are_ignored() {
        let events = translate(
            &backend(),
            &event(
                EventKind::Modify(ModifyKind::Metadata(notify::event::MetadataKind::Any)),
                &["/vault/Library/N-A.md"],
            ),
        );
        assert!(events.is_empty());
    }
}
