//! Artifacts written next to the prompt file.
//!
//! - `current_step.md`: the prompt (the name and place follow `--output`)
//! - `current_diff.md`: the latest diff, overwritten on every run
//! - `a.diff`, `b.diff`, … `z.diff`, `aa.diff`, …: one numbered copy per run
//! - `response.md`: the latest Markdown answer (text mode)
//!
//! Everything except the prompt goes into the prompt file's directory.

use std::io;
use std::path::{Path, PathBuf};

pub const PROMPT_FILE: &str = "current_step.md";
pub const CURRENT_DIFF_FILE: &str = "current_diff.md";
pub const RESPONSE_FILE: &str = "response.md";

/// Alphabetic sequence name: 0 → `a`, 25 → `z`, 26 → `aa`, 27 → `ab`.
pub fn alpha_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// First `<name>.diff` in the alphabetic sequence that does not exist yet.
pub fn next_diff_path(root: &Path) -> PathBuf {
    (0..)
        .map(|i| root.join(format!("{}.diff", alpha_name(i))))
        .find(|path| !path.exists())
        .unwrap_or_else(|| root.join("overflow.diff"))
}

/// Where one run's files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    prompt: PathBuf,
    dir: PathBuf,
}

impl Artifacts {
    /// `output` names the prompt file; without it the prompt goes to
    /// `<root>/current_step.md`.
    pub fn new(root: &Path, output: Option<&Path>) -> Self {
        let prompt = output.map_or_else(|| root.join(PROMPT_FILE), Path::to_path_buf);
        let dir = match prompt.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { prompt, dir }
    }

    pub fn prompt_path(&self) -> &Path {
        &self.prompt
    }

    /// Directory for the diff and response files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_prompt(&self, prompt: &str) -> io::Result<&Path> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&self.prompt, prompt)?;
        Ok(&self.prompt)
    }
}

/// Write the diff to `current_diff.md` and to the next free `.diff` name.
/// Returns the numbered path.
pub fn write_diff(root: &Path, diff: &str) -> io::Result<PathBuf> {
    let mut body = diff.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    std::fs::write(root.join(CURRENT_DIFF_FILE), &body)?;
    let numbered = next_diff_path(root);
    std::fs::write(&numbered, &body)?;
    Ok(numbered)
}

pub fn write_response(root: &Path, text: &str) -> io::Result<PathBuf> {
    let path = root.join(RESPONSE_FILE);
    std::fs::write(&path, text)?;
    Ok(path)
}
