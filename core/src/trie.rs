//! Letter-keyed dictionary trie over inflected forms.

use crate::lexicon::DelaEntry;
use crate::{utils, Result, TextFstError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

pub type NodeId = usize;

/// Root node of every trie.
pub const ROOT: NodeId = 0;

/// One node of the dictionary trie.
///
/// Children are kept sorted by letter so that a lookup is a binary search.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TrieNode {
    children: Vec<(char, NodeId)>,
    /// When set, index of the entry list of the form ending here.
    entries: Option<usize>,
}

impl TrieNode {
    pub fn children(&self) -> &[(char, NodeId)] {
        &self.children
    }

    pub fn entry_list(&self) -> Option<usize> {
        self.entries
    }

    fn child(&self, letter: char) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&letter, |(c, _)| *c)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Arena trie mapping inflected forms to lists of DELA entries.
///
/// Used by `DictionaryMatcher`, which walks it letter by letter against the
/// token stream.
///
/// # Example
/// ```
/// use textfst_core::{DelaEntry, DictionaryTrie};
///
/// let mut trie = DictionaryTrie::new();
/// trie.insert(DelaEntry::parse("chat,.N+z1:ms").unwrap());
///
/// assert_eq!(trie.lookup("chat").len(), 1);
/// assert!(trie.lookup("cha").is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryTrie {
    nodes: Vec<TrieNode>,
    entry_lists: Vec<Vec<DelaEntry>>,
}

impl Default for DictionaryTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryTrie {
    /// Create a trie holding only its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            entry_lists: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Entries attached to a node, empty for non-terminal nodes.
    pub fn entries(&self, id: NodeId) -> &[DelaEntry] {
        match self.nodes[id].entries {
            Some(list) => &self.entry_lists[list],
            None => &[],
        }
    }

    /// Child of `id` reached by exactly `letter`.
    pub fn child(&self, id: NodeId, letter: char) -> Option<NodeId> {
        self.nodes[id].child(letter)
    }

    /// Children of `id` whose letter matches the text letter `letter`:
    /// the letter itself, and unless `case_sensitive`, any dictionary letter
    /// whose upper case is `letter` (so both `σ` and `ς` match `Σ`).
    pub fn matching_children(
        &self,
        id: NodeId,
        letter: char,
        case_sensitive: bool,
    ) -> Vec<NodeId> {
        let node = &self.nodes[id];
        if case_sensitive {
            return node.child(letter).into_iter().collect();
        }
        node.children
            .iter()
            .filter(|(c, _)| utils::is_equal_or_uppercase(*c, letter))
            .map(|(_, child)| *child)
            .collect()
    }

    /// Insert an entry under its inflected form.
    pub fn insert(&mut self, entry: DelaEntry) {
        let mut node = ROOT;
        for ch in entry.inflected.chars() {
            node = match self.nodes[node].child(ch) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    let children = &mut self.nodes[node].children;
                    let at = children.partition_point(|(c, _)| *c < ch);
                    children.insert(at, (ch, next));
                    next
                }
            };
        }
        let list = match self.nodes[node].entries {
            Some(list) => list,
            None => {
                self.entry_lists.push(Vec::new());
                let list = self.entry_lists.len() - 1;
                self.nodes[node].entries = Some(list);
                list
            }
        };
        if !self.entry_lists[list].contains(&entry) {
            self.entry_lists[list].push(entry);
        }
    }

    /// Entries stored under exactly `form`.
    pub fn lookup(&self, form: &str) -> &[DelaEntry] {
        let mut node = ROOT;
        for ch in form.chars() {
            match self.nodes[node].child(ch) {
                Some(next) => node = next,
                None => return &[],
            }
        }
        self.entries(node)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct entries.
    pub fn entry_count(&self) -> usize {
        self.entry_lists.iter().map(Vec::len).sum()
    }

    /// Add every line of a DELA file (`inflected,lemma.CODES:infl`).
    ///
    /// Empty lines and lines starting with `/` are ignored.
    pub fn load_dela<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut added = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = utils::normalize(&line?);
            if line.is_empty() || line.starts_with('/') {
                continue;
            }
            let entry = DelaEntry::parse(&line).ok_or_else(|| TextFstError::InvalidFormat {
                what: "DELA line",
                path: path.to_path_buf(),
                line: n + 1,
                text: line.clone(),
            })?;
            self.insert(entry);
            added += 1;
        }
        tracing::debug!("{}: {} entries", path.display(), added);
        Ok(added)
    }

    /// Save the trie to a file using bincode serialization.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a trie from a bincode file produced by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}
