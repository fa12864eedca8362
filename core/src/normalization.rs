//! Normalization tree: token-sequence rewriting rules.
//!
//! Rules are read from a tab-separated file, one rule per line:
//!
//! ```text
//! # input tokens (space separated)<TAB>output
//! j '	{je,.PRO:1s}
//! du	{de,.PREP} {le,.DET:ms}
//! ```
//!
//! Input tokens are looked up in the corpus token table; a rule using a token
//! the corpus does not contain can never match and is skipped.

use crate::tokens::{TokenId, TokenTable};
use crate::{utils, Result, TextFstError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub type NormNodeId = usize;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NormalizationNode {
    /// Sorted, without duplicates.
    outputs: Vec<String>,
    children: Vec<(TokenId, NormNodeId)>,
}

impl NormalizationNode {
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn child(&self, token: TokenId) -> Option<NormNodeId> {
        self.children
            .binary_search_by_key(&token, |(t, _)| *t)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Arena trie over token id sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationTree {
    nodes: Vec<NormalizationNode>,
}

impl Default for NormalizationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizationTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![NormalizationNode::default()],
        }
    }

    pub fn root(&self) -> NormNodeId {
        0
    }

    pub fn node(&self, id: NormNodeId) -> &NormalizationNode {
        &self.nodes[id]
    }

    /// Add a rewriting of the token sequence `input` into `output`.
    /// An empty input is ignored: it would loop on a state.
    pub fn insert(&mut self, input: &[TokenId], output: &str) {
        if input.is_empty() {
            return;
        }
        let mut node = 0;
        for &token in input {
            node = match self.nodes[node].child(token) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(NormalizationNode::default());
                    let children = &mut self.nodes[node].children;
                    let at = children.partition_point(|(t, _)| *t < token);
                    children.insert(at, (token, next));
                    next
                }
            };
        }
        let outputs = &mut self.nodes[node].outputs;
        if let Err(at) = outputs.binary_search_by(|o| o.as_str().cmp(output)) {
            outputs.insert(at, output.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Parse rules from text against a token table. Returns the tree and the
    /// number of rules skipped for unknown tokens.
    pub fn from_rules(text: &str, tokens: &TokenTable, origin: &Path) -> Result<(Self, usize)> {
        let mut tree = Self::new();
        let mut skipped = 0;
        for (n, raw) in text.lines().enumerate() {
            let line = utils::normalize(raw);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((input, output)) = line.split_once('\t') else {
                return Err(TextFstError::InvalidFormat {
                    what: "normalization rule",
                    path: origin.to_path_buf(),
                    line: n + 1,
                    text: line.clone(),
                });
            };
            let ids: Option<Vec<TokenId>> =
                input.split(' ').filter(|t| !t.is_empty()).map(|t| tokens.id_of(t)).collect();
            match ids {
                Some(ids) if !ids.is_empty() => tree.insert(&ids, output.trim()),
                _ => {
                    tracing::debug!("normalization rule `{}` cannot match this corpus", input);
                    skipped += 1;
                }
            }
        }
        Ok((tree, skipped))
    }

    pub fn load_rules<P: AsRef<Path>>(path: P, tokens: &TokenTable) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let (tree, skipped) = Self::from_rules(&text, tokens, path)?;
        if skipped > 0 {
            tracing::info!("{}: {} rules skipped (tokens absent from corpus)", path.display(), skipped);
        }
        Ok(tree)
    }

    /// Save the tree to a file using bincode serialization. Token ids are
    /// only meaningful for the token table the tree was built against.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}
