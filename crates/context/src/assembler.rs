//! File collection: walks the project root and reads selected files.
//!
//! # Limits
//!
//! - `max_file_lines`: only the first N lines of a file are kept and a
//!   truncation marker is appended. `0` keeps whole files.
//! - `max_total_characters`: collection stops at the first file that would
//!   push the cumulative content size over the cap. `0` disables the cap.
//!
//! Binary files (a NUL byte in the first 1024 bytes) are represented by a
//! placeholder, never by raw bytes.

use crate::selector::FileSelector;
use crate::tree::render_tree;
use reporter_config::ContextConfig;
use reporter_core::error::ContextError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_BYTES: usize = 1024;

pub const BINARY_PLACEHOLDER: &str = "(binary file, contents not shown)";
pub const TRUNCATION_MARKER: &str = "\n[...truncated...]\n";

// ── Types ─────────────────────────────────────────────────────────────────

/// A file selected for the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Root-relative, `/`-separated path.
    pub rel_path: String,
    /// Content as it will appear in the prompt.
    pub content: String,
    /// Line count of the whole file on disk, regardless of truncation.
    pub loc_total: usize,
    pub truncated: bool,
    pub binary: bool,
}

/// Collection statistics, logged after every walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStats {
    /// Files that passed the include/exclude filter.
    pub files_selected: usize,
    /// Files whose content made it into the prompt.
    pub files_included: usize,
    pub files_truncated: usize,
    pub binary_files: usize,
    /// Files skipped because the character cap was reached.
    pub files_dropped: usize,
    /// Total characters of included content.
    pub total_characters: usize,
}

/// The result of a collection pass.
#[derive(Debug, Clone)]
pub struct CollectedContext {
    /// Rendered tree of the selected files.
    pub file_tree: String,
    pub files: Vec<FileEntry>,
    pub stats: ContextStats,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Walks a project root and reads the files its configuration selects.
pub struct ContextAssembler {
    root: PathBuf,
    config: ContextConfig,
    selector: FileSelector,
}

impl ContextAssembler {
    /// Create an assembler for `root`.
    pub fn new(root: impl Into<PathBuf>, config: ContextConfig) -> Result<Self, ContextError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ContextError::InvalidRoot(root));
        }
        let selector = FileSelector::new(&config)?;
        Ok(Self {
            root,
            config,
            selector,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted relative paths of every selected file.
    ///
    /// Unreadable directories are skipped with a warning.
    pub fn list_files(&self) -> Vec<String> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match relative(&self.root, entry.path()) {
                    Some(rel) => !self.selector.is_excluded_dir(&rel),
                    None => true,
                }
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable path during context walk");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative(&self.root, entry.path()) else {
                continue;
            };
            if self.selector.should_include(&rel) {
                files.push(rel);
            }
        }
        files.sort();
        debug!(count = files.len(), root = %self.root.display(), "Selected files");
        files
    }

    /// Read the given files subject to the configured limits.
    pub fn read_files(&self, files: &[String]) -> (Vec<FileEntry>, ContextStats) {
        let mut stats = ContextStats {
            files_selected: files.len(),
            ..ContextStats::default()
        };
        let mut entries = Vec::with_capacity(files.len());

        for rel_path in files {
            let entry = self.read_entry(rel_path);

            if !entry.binary && self.config.max_total_characters > 0 {
                let size = entry.content.chars().count();
                if stats.total_characters + size > self.config.max_total_characters {
                    stats.files_dropped = files.len() - entries.len();
                    info!(
                        cap = self.config.max_total_characters,
                        dropped = stats.files_dropped,
                        "Character cap reached, remaining files skipped"
                    );
                    break;
                }
            }

            stats.total_characters += entry.content.chars().count();
            stats.files_truncated += usize::from(entry.truncated);
            stats.binary_files += usize::from(entry.binary);
            entries.push(entry.finish());
        }

        stats.files_included = entries.len();
        (entries, stats)
    }

    /// Walk, read and render in one pass.
    pub fn collect(&self) -> CollectedContext {
        let files = self.list_files();
        let (entries, stats) = self.read_files(&files);
        info!(
            selected = stats.files_selected,
            included = stats.files_included,
            truncated = stats.files_truncated,
            binary = stats.binary_files,
            characters = stats.total_characters,
            "Context collected"
        );
        CollectedContext {
            file_tree: render_tree(&files),
            files: entries,
            stats,
        }
    }

    fn read_entry(&self, rel_path: &str) -> PendingEntry {
        let bytes = match std::fs::read(self.root.join(rel_path)) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = rel_path, error = %e, "Failed to read file");
                return PendingEntry {
                    rel_path: rel_path.to_string(),
                    content: format!("[Error reading file: {e}]"),
                    loc_total: 0,
                    truncated: false,
                    binary: false,
                };
            }
        };

        let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
        if sniff.contains(&0) {
            return PendingEntry {
                rel_path: rel_path.to_string(),
                content: BINARY_PLACEHOLDER.to_string(),
                loc_total: 0,
                truncated: false,
                binary: true,
            };
        }

        let text = String::from_utf8_lossy(&bytes);
        let loc_total = text.lines().count();
        let (content, truncated) = match self.config.max_file_lines {
            0 => (text.into_owned(), false),
            max => {
                let kept: String = text.split_inclusive('\n').take(max).collect();
                (kept, loc_total > max)
            }
        };

        PendingEntry {
            rel_path: rel_path.to_string(),
            content,
            loc_total,
            truncated,
            binary: false,
        }
    }
}

/// A read file before the truncation marker is appended; the marker does not
/// count against the character cap.
struct PendingEntry {
    rel_path: String,
    content: String,
    loc_total: usize,
    truncated: bool,
    binary: bool,
}

impl PendingEntry {
    fn finish(self) -> FileEntry {
        let mut content = self.content;
        if self.truncated {
            content.push_str(TRUNCATION_MARKER);
        }
        FileEntry {
            rel_path: self.rel_path,
            content,
            loc_total: self.loc_total,
            truncated: self.truncated,
            binary: self.binary,
        }
    }
}

fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("README.md"), "# Demo\n").unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "pub fn a() {}\npub fn b() {}\n").unwrap();
        fs::write(root.join(".git/config"), "[core]\n").unwrap();
        fs::write(root.join("target/debug/app"), "bin").unwrap();
        fs::write(root.join("current_step.md"), "old prompt").unwrap();
        dir
    }

    #[test]
    fn missing_root_is_rejected() {
        let err = ContextAssembler::new("/nonexistent/project", ContextConfig::default());
        assert!(matches!(err, Err(ContextError::InvalidRoot(_))));
    }

    #[test]
    fn list_files_is_sorted_and_filtered() {
        let dir = project();
        let assembler = ContextAssembler::new(dir.path(), ContextConfig::default()).unwrap();
        let files = assembler.list_files();
        assert_eq!(files, vec!["README.md", "src/main.rs", "src/nested/lib.rs"]);
    }

    #[test]
    fn collect_renders_tree_and_contents() {
        let dir = project();
        let assembler = ContextAssembler::new(dir.path(), ContextConfig::default()).unwrap();
        let ctx = assembler.collect();
        assert!(ctx.file_tree.starts_with("- src/"));
        assert_eq!(ctx.files.len(), 3);
        assert_eq!(ctx.files[1].rel_path, "src/main.rs");
        assert_eq!(ctx.files[2].loc_total, 2);
        assert_eq!(ctx.stats.files_included, 3);
    }

    #[test]
    fn binary_files_get_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
        let assembler = ContextAssembler::new(dir.path(), ContextConfig::default()).unwrap();
        let ctx = assembler.collect();
        assert_eq!(ctx.files[0].content, BINARY_PLACEHOLDER);
        assert!(ctx.files[0].binary);
        assert_eq!(ctx.stats.binary_files, 1);
    }

    #[test]
    fn long_files_are_truncated_with_marker() {
        let dir = tempfile::tempdir().unwrap();
        let body: String = (1..=10).map(|i| format!("line {i}\n")).collect();
        fs::write(dir.path().join("long.txt"), body).unwrap();
        let config = ContextConfig {
            max_file_lines: 3,
            ..ContextConfig::default()
        };
        let assembler = ContextAssembler::new(dir.path(), config).unwrap();
        let ctx = assembler.collect();
        let entry = &ctx.files[0];
        assert!(entry.truncated);
        assert_eq!(entry.loc_total, 10);
        assert!(entry.content.starts_with("line 1\nline 2\nline 3\n"));
        assert!(entry.content.ends_with(TRUNCATION_MARKER));
        assert!(!entry.content.contains("line 4"));
    }

    #[test]
    fn character_cap_stops_collection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x".repeat(60)).unwrap();
        fs::write(dir.path().join("b.txt"), "y".repeat(60)).unwrap();
        fs::write(dir.path().join("c.txt"), "z".repeat(10)).unwrap();
        let config = ContextConfig {
            max_total_characters: 100,
            ..ContextConfig::default()
        };
        let assembler = ContextAssembler::new(dir.path(), config).unwrap();
        let ctx = assembler.collect();
        assert_eq!(ctx.files.len(), 1);
        assert_eq!(ctx.files[0].rel_path, "a.txt");
        assert_eq!(ctx.stats.files_dropped, 2);
        // The tree still lists every selected file.
        assert!(ctx.file_tree.contains("c.txt"));
    }
}
