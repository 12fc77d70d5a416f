//! Markdown-style rendering of the selected file tree.
//!
//! Only directories that are ancestors of selected files appear. Within a
//! directory, subdirectories come first, then files, both sorted by name.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: BTreeSet<String>,
}

impl DirNode {
    fn insert(&mut self, rel_path: &str) {
        let mut parts: Vec<&str> = rel_path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };
        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file.to_string());
    }

    fn render(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for (name, child) in &self.dirs {
            lines.push(format!("{indent}- {name}/"));
            child.render(depth + 1, lines);
        }
        for name in &self.files {
            lines.push(format!("{indent}- {name}"));
        }
    }
}

/// Render `/`-separated relative file paths as an indented tree.
pub fn render_tree<S: AsRef<str>>(files: &[S]) -> String {
    let mut root = DirNode::default();
    for file in files {
        root.insert(file.as_ref());
    }
    let mut lines = Vec::new();
    root.render(0, &mut lines);
    lines.join("\n")
}
