//! Best-effort extraction of selected members into the workspace
//!
//! Traverses an archive stream once, materializing every member the selector
//! accepts and discarding the rest. Extraction is best-effort rather than
//! all-or-nothing: a malformed or unreadable member is logged and skipped so
//! that one corrupt trailing entry cannot abort recovery of the geometry
//! files appearing earlier in the archive.

use crate::archive::{ArchiveReader, EntryKind};
use crate::workspace::Workspace;
use std::io::Read;
use tracing::{debug, info, warn};

/// Counters describing one extraction pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Members seen during traversal
    pub entries: usize,
    /// Selected files materialized into the workspace
    pub files_written: usize,
    /// Total bytes written for materialized files
    pub bytes_written: u64,
    /// Members skipped because of entry-level errors
    pub entry_errors: usize,
}

/// Traverse an archive stream, materializing members accepted by `select`
///
/// Every member's content is fully drained before the next one is parsed,
/// whether or not it was selected; the underlying stream supports no random
/// access, so an undrained member would stall everything after it.
///
/// Entry-level failures (unsupported members, CRC mismatches, unsafe paths,
/// write errors) are logged and counted, and traversal continues. A failure
/// that loses stream alignment ends traversal early; the caller proceeds
/// with whatever was materialized.
pub fn extract_archive<R, F>(source: R, workspace: &Workspace, mut select: F) -> ExtractSummary
where
    R: Read,
    F: FnMut(&str) -> bool,
{
    let mut archive = ArchiveReader::new(source);
    let mut summary = ExtractSummary::default();

    loop {
        let entry = match archive.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("archive traversal ended early: {e}");
                summary.entry_errors += 1;
                break;
            }
        };
        summary.entries += 1;
        let path = entry.path().to_owned();

        if entry.kind() != EntryKind::File {
            if let Err(e) = entry.skip() {
                warn!("failed to drain '{path}': {e}");
                summary.entry_errors += 1;
            }
            continue;
        }

        if !select(&path) {
            debug!("discarding '{path}'");
            if let Err(e) = entry.skip() {
                warn!("failed to drain '{path}': {e}");
                summary.entry_errors += 1;
            }
            continue;
        }

        let contents = match entry.read_to_vec() {
            Ok(contents) => contents,
            Err(e) => {
                warn!("skipping '{path}': {e}");
                summary.entry_errors += 1;
                continue;
            }
        };

        match workspace.materialize(&path, &contents) {
            Ok(dest) => {
                info!("materialized '{}' ({} bytes)", dest.display(), contents.len());
                summary.files_written += 1;
                summary.bytes_written += contents.len() as u64;
            }
            Err(e) => {
                warn!("could not materialize '{path}': {e}");
                summary.entry_errors += 1;
            }
        }
    }

    info!(
        entries = summary.entries,
        files = summary.files_written,
        errors = summary.entry_errors,
        "archive traversal complete"
    );
    summary
}
