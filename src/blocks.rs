//! Block model and the block-to-Markdown renderer.
//!
//! A block is one node of a Notion document tree. The Notion wire format
//! keys the type-specific payload under a field named after the `type`
//! string, so the payload is captured via `serde(flatten)` and classified
//! into [`BlockKind`] after deserialization.

use serde::Deserialize;
use serde_json::Value;

/// One text fragment of a block's `rich_text` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichTextFragment {
    #[serde(default)]
    pub text: Option<TextPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextPayload {
    pub content: String,
}

/// A node in a remote document tree. Read-only, fetched per request.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    payload: serde_json::Map<String, Value>,
}

/// The known block types, with a fallback for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(usize),
    BulletedListItem,
    NumberedListItem,
    Other,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self.block_type.as_str() {
            "paragraph" => BlockKind::Paragraph,
            "bulleted_list_item" => BlockKind::BulletedListItem,
            "numbered_list_item" => BlockKind::NumberedListItem,
            t => match t.strip_prefix("heading_").and_then(|n| n.parse().ok()) {
                Some(level) => BlockKind::Heading(level),
                None => BlockKind::Other,
            },
        }
    }

    /// Concatenated content of all text fragments, verbatim. Fragments
    /// without a `text` payload (mentions, equations) contribute nothing.
    pub fn plain_text(&self) -> String {
        let fragments: Vec<RichTextFragment> = self
            .payload
            .get(&self.block_type)
            .and_then(|body| body.get("rich_text"))
            .and_then(|rich| serde_json::from_value(rich.clone()).ok())
            .unwrap_or_default();

        fragments
            .into_iter()
            .filter_map(|f| f.text)
            .map(|t| t.content)
            .collect()
    }
}

/// Renders one block at the given nesting depth as a single Markdown line.
///
/// Headings are always flush-left regardless of depth; the numbered-list
/// ordinal is the literal `1.`; unrecognised types produce a blank
/// placeholder line. Content passes through without Markdown escaping.
pub fn render(block: &Block, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    match block.kind() {
        BlockKind::Paragraph => format!("{indent}{}\n", block.plain_text()),
        BlockKind::Heading(level) => {
            format!("{} {}\n", "#".repeat(level), block.plain_text())
        }
        BlockKind::BulletedListItem => format!("{indent}- {}\n", block.plain_text()),
        BlockKind::NumberedListItem => format!("{indent}1. {}\n", block.plain_text()),
        BlockKind::Other => format!("{indent}\n"),
    }
}
