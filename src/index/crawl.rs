//! Directory crawling.
//!
//! The root's direct entries are listed up front so an empty dataset can be
//! rejected before anything is handed to the caller. Subdirectories are then
//! walked recursively. Entries that cannot be inspected (permission denied,
//! broken symlinks, races with deletion) are logged and skipped. The visitor
//! may stop the crawl early by returning [`ControlFlow::Break`].

use crate::error::{IndexError, IndexResult};
use crate::index::types::{FileRecord, RecordRef};
use ignore::WalkBuilder;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One discovered file
#[derive(Debug, Clone)]
pub struct CrawlEntry {
    pub path: PathBuf,
    pub record: RecordRef,
}

/// Counts from one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Files handed to the visitor
    pub files: usize,
    /// Entries skipped because they could not be inspected
    pub skipped: usize,
    /// The visitor stopped the crawl before the tree was exhausted
    pub stopped: bool,
}

/// Crawl `root`, calling `visit` once per regular file found beneath it.
///
/// Fails with [`IndexError::DatasetEmpty`] if `root` has no direct entries,
/// and with [`IndexError::RootUnreadable`] if it cannot be listed. Neither
/// check is repeated for subdirectories: an empty subdirectory contributes
/// nothing.
pub fn crawl(
    root: &Path,
    follow_links: bool,
    mut visit: impl FnMut(CrawlEntry) -> ControlFlow<()>,
) -> IndexResult<CrawlSummary> {
    let top_level: Vec<_> = fs::read_dir(root)
        .map_err(|source| IndexError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?
        .collect();

    if top_level.is_empty() {
        tracing::warn!(path = %root.display(), "No files found in the specified path");
        return Err(IndexError::DatasetEmpty {
            path: root.to_path_buf(),
        });
    }

    let mut summary = CrawlSummary::default();

    for entry in top_level {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "Failed to read directory entry");
                summary.skipped += 1;
                continue;
            }
        };

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                summary.skipped += 1;
                continue;
            }
        };

        let flow = if metadata.is_dir() {
            walk_subdirectory(&path, follow_links, &mut summary, &mut visit)
        } else if metadata.is_file() {
            emit(path, &metadata, &mut summary, &mut visit)
        } else {
            tracing::debug!(path = %path.display(), "Skipping special file");
            ControlFlow::Continue(())
        };

        if flow.is_break() {
            summary.stopped = true;
            break;
        }
    }

    Ok(summary)
}

fn walk_subdirectory(
    dir: &Path,
    follow_links: bool,
    summary: &mut CrawlSummary,
    visit: &mut impl FnMut(CrawlEntry) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(follow_links)
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                summary.skipped += 1;
                continue;
            }
        };

        if entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }

        let path = entry.into_path();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {
                if emit(path, &metadata, summary, visit).is_break() {
                    return ControlFlow::Break(());
                }
            }
            Ok(_) => {
                tracing::debug!(path = %path.display(), "Skipping non-regular file");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                summary.skipped += 1;
            }
        }
    }

    ControlFlow::Continue(())
}

fn emit(
    path: PathBuf,
    metadata: &fs::Metadata,
    summary: &mut CrawlSummary,
    visit: &mut impl FnMut(CrawlEntry) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let record = Arc::new(FileRecord::from_metadata(&path, metadata));
    summary.files += 1;
    visit(CrawlEntry { path, record })
}
