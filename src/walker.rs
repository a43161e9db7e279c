//! Depth-first flattening of a remote block tree into Markdown lines.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::blocks::{render, Block};
use crate::config::{FetchFailurePolicy, WalkConfig};
use crate::error::RelayError;
use crate::notion::NotionApi;

/// Walks a block tree rooted at a given id and renders it, pre-order,
/// into one Markdown line per block. Indentation grows by one level per
/// depth. Sibling order is the order the upstream service returns.
///
/// Upstream trees are expected to be acyclic, but a visited-id guard and
/// a depth bound keep the walk finite if the data is ever malformed.
pub struct TreeWalker {
    api: Arc<dyn NotionApi>,
    config: WalkConfig,
}

impl TreeWalker {
    pub fn new(api: Arc<dyn NotionApi>, config: WalkConfig) -> Self {
        TreeWalker { api, config }
    }

    /// Renders the document under `root_id` as an ordered line sequence.
    /// A document with no children yields an empty sequence.
    pub async fn walk(&self, root_id: &str) -> Result<Vec<String>, RelayError> {
        let mut lines = Vec::new();
        let mut visited = HashSet::new();

        // Explicit stack instead of async recursion; pushing children in
        // reverse keeps upstream sibling order.
        let mut stack: Vec<(Block, usize)> = Vec::new();
        for child in self
            .children_of(root_id, &mut visited)
            .await?
            .into_iter()
            .rev()
        {
            stack.push((child, 0));
        }

        while let Some((block, depth)) = stack.pop() {
            lines.push(render(&block, depth));

            if block.has_children && depth + 1 <= self.config.max_depth {
                for child in self
                    .children_of(&block.id, &mut visited)
                    .await?
                    .into_iter()
                    .rev()
                {
                    stack.push((child, depth + 1));
                }
            } else if block.has_children {
                warn!(
                    block_id = %block.id,
                    max_depth = self.config.max_depth,
                    "Depth bound reached, subtree skipped"
                );
            }
        }

        Ok(lines)
    }

    async fn children_of(
        &self,
        block_id: &str,
        visited: &mut HashSet<String>,
    ) -> Result<Vec<Block>, RelayError> {
        if !visited.insert(block_id.to_string()) {
            warn!(block_id = %block_id, "Cycle detected in block tree, subtree skipped");
            return Ok(Vec::new());
        }

        match self.api.block_children(block_id).await {
            Ok(children) => Ok(children),
            Err(e) => match self.config.policy {
                FetchFailurePolicy::FailOpen => {
                    warn!(block_id = %block_id, error = %e, "Child fetch failed, treating subtree as empty");
                    Ok(Vec::new())
                }
                FetchFailurePolicy::FailClosed => Err(e),
            },
        }
    }
}
