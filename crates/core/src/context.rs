//! Named text blocks: the unit of assembled context.
//!
//! The context assembler produces an ordered list of blocks; their order
//! defines the final prompt layout.

use serde::{Deserialize, Serialize};

/// An immutable named piece of prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Section name (e.g. "user_instructions", "file_tree").
    pub name: String,

    /// The UTF-8 content of the section.
    pub content: String,
}

impl TextBlock {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Total byte size of an ordered set of blocks.
pub fn total_bytes(blocks: &[TextBlock]) -> usize {
    blocks.iter().map(TextBlock::byte_len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_counts_utf8_bytes() {
        let block = TextBlock::new("desc", "añ");
        assert_eq!(block.byte_len(), 3);
    }

    #[test]
    fn total_bytes_sums_blocks() {
        let blocks = vec![TextBlock::new("a", "1234"), TextBlock::new("b", "56")];
        assert_eq!(total_bytes(&blocks), 6);
        assert!(!blocks[0].is_empty());
    }
}
