use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;

/// Runs a full healing pass and reports what moved.
pub fn run<B: VaultBackend>(lib: &mut Librarian<B>) -> Result<CmdResult> {
    let report = lib.heal_all()?;
    let mut result = CmdResult::default();

    for (from, to) in &report.renamed {
        result.add_message(CmdMessage::info(format!("Renamed {} -> {}", from, to)));
    }
    for quarantined in &report.quarantined {
        result.add_message(CmdMessage::warning(format!(
            "Quarantined {} -> {} (undecodable name)",
            quarantined.current_path, quarantined.destination
        )));
    }
    result.add_dispatch_report(&report.dispatch);

    if report.renamed.is_empty() && report.quarantined.is_empty() {
        result.add_message(CmdMessage::success(format!(
            "Library is canonical ({} codex(es) written)",
            report.codexes_written
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Healed {} file(s), quarantined {}, wrote {} codex(es)",
            report.renamed.len(),
            report.quarantined.len(),
            report.codexes_written
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::mem_backend::MemBackend;
    use crate::test_utils::librarian;

    #[test]
    fn reports_renames_and_quarantine() {
        let mem = MemBackend::new();
        mem.seed("Library/I3/I4/Untitled.md", "");
        mem.seed("Library/notes", "");
        let mut lib = librarian(mem);
        let result = run(&mut lib).unwrap();

        assert!(result.messages.iter().any(|m| m.level == MessageLevel::Warning
            && m.content.contains("Library/_untracked/notes")));
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Renamed Library/I3/I4/Untitled.md -> Library/I3/I4/Untitled-I4-I3.md"));
        assert!(lib.backend().has_file("Library/I3/I4/Untitled-I4-I3.md"));
        assert!(!result.has_errors());
    }

    #[test]
    fn canonical_library_reports_success() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "");
        let mut lib = librarian(mem);
        run(&mut lib).unwrap();
        let second = run(&mut lib).unwrap();

        let last = second.messages.last().unwrap();
        assert_eq!(last.level, MessageLevel::Success);
        assert_eq!(last.content, "Library is canonical (0 codex(es) written)");
    }
}
