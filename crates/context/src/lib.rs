//! Context assembly for reporter.
//!
//! Turns a project directory plus user-supplied instruction files into the
//! ordered [`TextBlock`](reporter_core::TextBlock)s the completion engine
//! consumes:
//!
//! | Block | Source | Notes |
//! |-------|--------|-------|
//! | 1. System instructions | built in | diff mode only |
//! | 2. User instructions | `--message` / `task.md` | required |
//! | 3. System description | `--system-description` | optional |
//! | 4. Codebase structure | file walk | directories first |
//! | 5. Codebase files | file walk | binary files replaced by a placeholder |
//!
//! Assembly is deterministic: files are visited in sorted order and no
//! time-dependent data is embedded.

pub mod assembler;
pub mod inputs;
pub mod prompt;
pub mod selector;
pub mod tree;

pub use assembler::{CollectedContext, ContextAssembler, ContextStats, FileEntry};
pub use inputs::{find_instructions_file, read_optional_file};
pub use prompt::{OutputMode, PromptSections, render_prompt};
pub use selector::FileSelector;
pub use tree::render_tree;
