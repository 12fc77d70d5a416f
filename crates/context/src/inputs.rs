//! User-supplied inputs: the instruction file and optional side documents.

use reporter_core::error::ContextError;
use std::path::{Path, PathBuf};

/// File names tried, in order, when no instruction file is given.
pub const INSTRUCTION_CANDIDATES: [&str; 4] = ["task.md", "message.md", "task.txt", "message.txt"];

/// Resolve the instruction file: the explicit path if given, otherwise the
/// first candidate that exists in `root`.
pub fn find_instructions_file(root: &Path, explicit: Option<&Path>) -> Result<PathBuf, ContextError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    INSTRUCTION_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ContextError::MissingInstructions(root.to_path_buf()))
}

/// Trimmed contents of `path`, or an inline error note if it cannot be read.
///
/// `None` yields an empty string.
pub fn read_optional_file(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read input file");
            format!("[Error reading {}: {e}]", path.display())
        }
    }
}
