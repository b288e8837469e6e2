//! Build ordered trees from indented outlines
//!
//! ```text
//! - first_root:
//!   - first_child
//!   - second_child
//! - second_root
//! ```
//!
//! Each `- name` line becomes a node appended to the list of the nearest
//! less-indented line above it. A trailing `:` is accepted and ignored.

use std::collections::HashMap;

use regex::Regex;
use tracing::instrument;

use crate::application::tree::OrderedTree;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{DomainError, Node, NodeData, NodeId};
use crate::infrastructure::ArenaStore;

/// A tree built from an outline, with its nodes addressable by name.
#[derive(Debug)]
pub struct Outline {
    pub tree: OrderedTree<ArenaStore>,
    names: HashMap<String, NodeId>,
}

impl Outline {
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Fresh snapshot of the named node.
    pub fn node(&self, name: &str) -> Option<Node> {
        self.id(name).and_then(|id| self.tree.node(id).ok())
    }
}

pub struct OutlineBuilder {
    line_regex: Regex,
    settings: Settings,
}

impl Default for OutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self {
            line_regex: Regex::new(r"^(?P<indent> *)- (?P<name>[^\s:]+):?\s*$")
                .expect("outline line pattern is valid"),
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[instrument(level = "debug", skip(self, text))]
    pub fn build(&self, text: &str) -> ApplicationResult<Outline> {
        let mut tree = OrderedTree::with_settings(ArenaStore::new(), self.settings.clone());
        let mut names = HashMap::new();
        // open levels: (indent, node)
        let mut stack: Vec<(usize, NodeId)> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let caps = self
                .line_regex
                .captures(line)
                .ok_or_else(|| DomainError::OutlineSyntax {
                    line: line_no,
                    content: line.trim().to_string(),
                })?;
            let indent = caps["indent"].len();
            let name = caps["name"].to_string();

            let mut closed_deeper = false;
            while let Some(&(level, _)) = stack.last() {
                if level > indent {
                    stack.pop();
                    closed_deeper = true;
                } else if level == indent {
                    stack.pop();
                    break;
                } else {
                    if closed_deeper {
                        return Err(DomainError::OutlineIndent { line: line_no }.into());
                    }
                    break;
                }
            }

            if names.contains_key(&name) {
                return Err(DomainError::DuplicateName(name).into());
            }
            let parent = stack.last().map(|&(_, id)| id);
            let id = tree.insert(NodeData::new(name.clone()), parent)?;
            names.insert(name, id);
            stack.push((indent, id));
        }

        Ok(Outline { tree, names })
    }
}
