//! Prompt layout.
//!
//! Sections are emitted as [`TextBlock`]s in a fixed order and rendered by
//! joining them. Each block carries its own begin/end headings so the model
//! can tell where user text stops and project text starts.

use crate::assembler::FileEntry;
use reporter_core::TextBlock;

/// Formatting rules embedded at the top of the prompt in diff mode.
pub const DIFF_FORMAT_INSTRUCTIONS: &str = "\
When asked for code changes, answer ONLY with the changes in unified diff format. Never output whole files.

1. FORMAT: a single unified diff, e.g.
   diff --git a/path/to/file.ext b/path/to/file.ext
   --- a/path/to/file.ext
   +++ b/path/to/file.ext
   @@ -old_start,old_lines +new_start,new_lines @@
    unchanged context line
   -removed line
   +added line
2. PATHS: headers use paths relative to the project root (src/app.rs, not app.rs or an absolute path).
3. CONTEXT: keep at least 3 unchanged lines before and after every changed block in a hunk.
4. MULTIPLE FILES: one diff block; each file starts with its own `diff --git` header.
5. NEW FILES: use /dev/null as the source, e.g. `--- /dev/null` and `+++ b/path/to/new_file.ext` with a `@@ -0,0 +1,N @@` hunk.
6. Line endings and missing leading spaces on context lines are normalized by the tooling; focus on correct changes.

Apply these rules to every code modification request and reply with the diff block only.";

/// What the caller wants back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// A unified diff, written to `.diff` artifacts.
    #[default]
    Diff,
    /// Free-form Markdown text.
    Text,
}

impl OutputMode {
    pub fn from_no_diff(no_diff: bool) -> Self {
        if no_diff { Self::Text } else { Self::Diff }
    }

    pub fn is_diff(&self) -> bool {
        matches!(self, Self::Diff)
    }

    /// Instructions sent alongside the prompt.
    pub fn model_instructions(&self) -> &'static str {
        match self {
            Self::Diff => {
                "You are an expert code generation agent. Read the user's instructions and context. \
                 Produce a unified diff that applies the requested changes to the provided files. \
                 Do not explain the diff; just output the diff itself."
            }
            Self::Text => {
                "You are an expert assistant. Read the user's instructions and the provided project \
                 context (system description and current codebase). Provide a clear, concise but \
                 thorough answer formatted as Markdown with titles and subtitles. Do not output or \
                 mention unified diffs. Reply in the same language as the instructions."
            }
        }
    }
}

/// Everything the layout needs, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct PromptSections<'a> {
    pub user_instructions: &'a str,
    pub system_description: &'a str,
    pub file_tree: &'a str,
    pub files: &'a [FileEntry],
    pub mode: OutputMode,
}

impl PromptSections<'_> {
    /// Build the ordered blocks. Empty optional sections are skipped.
    pub fn to_blocks(&self) -> Vec<TextBlock> {
        let mut blocks = Vec::with_capacity(5);

        if self.mode.is_diff() {
            blocks.push(section("system_instructions", "System instructions", DIFF_FORMAT_INSTRUCTIONS));
        }

        blocks.push(section("user_instructions", "User instructions", self.user_instructions.trim()));

        if !self.system_description.trim().is_empty() {
            blocks.push(section(
                "system_description",
                "System general description",
                self.system_description.trim(),
            ));
        }

        blocks.push(section("codebase_structure", "Current codebase structure", self.file_tree));

        if !self.files.is_empty() {
            blocks.push(section("codebase_files", "Current codebase files", &render_files(self.files)));
        }

        blocks
    }
}

fn section(name: &str, title: &str, body: &str) -> TextBlock {
    TextBlock::new(name, format!("# {title}\n{body}\n\n# End of {}\n---", title.to_lowercase()))
}

fn render_files(files: &[FileEntry]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("--- begin file {} ---\n", file.rel_path));
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("--- end file {}; LOC {} ---\n\n", file.rel_path, file.loc_total));
    }
    out.trim_end().to_string()
}

/// Render blocks into the final prompt string.
pub fn render_prompt(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n\n")
}
