//! Shared helpers of the command-line tools: resource loading by file kind,
//! corpus directory layout and logging setup.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use textfst_core::{DictionaryTrie, NormalizationTree, TokenTable};
use tracing_subscriber::EnvFilter;

/// Extension of compiled (bincode) resources.
pub const COMPILED_EXT: &str = "bin";

/// Files of a tokenized corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusFiles {
    pub tokens: PathBuf,
    pub text: PathBuf,
    pub newlines: PathBuf,
    pub overrides: PathBuf,
}

impl CorpusFiles {
    pub fn new(dir: &Path) -> Self {
        Self {
            tokens: dir.join("tokens.txt"),
            text: dir.join("text.cod"),
            newlines: dir.join("enter.pos"),
            overrides: dir.join("tags.ind"),
        }
    }
}

/// Output files written next to each other in `dir`.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub tfst: PathBuf,
    pub tind: PathBuf,
    pub frequencies: PathBuf,
    pub json: PathBuf,
}

impl OutputFiles {
    pub fn new(dir: &Path) -> Self {
        Self {
            tfst: dir.join("text.tfst"),
            tind: dir.join("text.tind"),
            frequencies: dir.join("tfst_tags_by_freq.txt"),
            json: dir.join("text.tfst.jsonl"),
        }
    }
}

pub fn is_compiled(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(COMPILED_EXT)
}

/// Load dictionaries into one trie.
///
/// Text files are DELA lists and are merged. A compiled trie can only be
/// used alone; several compiled tries must be compiled together first.
pub fn load_dictionaries(paths: &[PathBuf]) -> Result<DictionaryTrie> {
    let compiled: Vec<&PathBuf> = paths.iter().filter(|p| is_compiled(p)).collect();
    if let Some(first) = compiled.first() {
        if paths.len() > 1 {
            bail!(
                "{} is a compiled dictionary and cannot be combined with other dictionaries",
                first.display()
            );
        }
        let trie = DictionaryTrie::load_bincode(first)
            .with_context(|| format!("loading {}", first.display()))?;
        tracing::info!("{}: {} entries", first.display(), trie.entry_count());
        return Ok(trie);
    }

    let mut trie = DictionaryTrie::new();
    for path in paths {
        let added = trie
            .load_dela(path)
            .with_context(|| format!("loading {}", path.display()))?;
        tracing::info!("{}: {} entries", path.display(), added);
    }
    Ok(trie)
}

/// Load normalization rules, text or compiled.
pub fn load_normalization(path: &Path, tokens: &TokenTable) -> Result<NormalizationTree> {
    let tree = if is_compiled(path) {
        NormalizationTree::load_bincode(path)
    } else {
        NormalizationTree::load_rules(path, tokens)
    }
    .with_context(|| format!("loading {}", path.display()))?;
    tracing::info!("{}: {} nodes", path.display(), tree.len());
    Ok(tree)
}

/// Log to stderr; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("textfst_tools_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_text_dictionaries_are_merged() {
        let a = temp_path("a.dic");
        let b = temp_path("b.dic");
        fs::write(&a, "chat,.N:ms\n").unwrap();
        fs::write(&b, "chat,.V:P3s\nle,.DET:ms\n").unwrap();
        let trie = load_dictionaries(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(trie.lookup("chat").len(), 2);
        assert_eq!(trie.entry_count(), 3);
        let _ = fs::remove_file(a);
        let _ = fs::remove_file(b);
    }

    #[test]
    fn test_compiled_dictionary_stands_alone() {
        let dic = temp_path("c.dic");
        fs::write(&dic, "chat,.N:ms\n").unwrap();
        let bin = temp_path("c.bin");
        load_dictionaries(&[dic.clone()]).unwrap().save_bincode(&bin).unwrap();

        assert_eq!(load_dictionaries(&[bin.clone()]).unwrap().entry_count(), 1);
        assert!(load_dictionaries(&[bin.clone(), dic.clone()]).is_err());
        let _ = fs::remove_file(dic);
        let _ = fs::remove_file(bin);
    }

    #[test]
    fn test_corpus_layout() {
        let files = CorpusFiles::new(Path::new("corpus"));
        assert_eq!(files.text, Path::new("corpus").join("text.cod"));
        assert!(is_compiled(Path::new("dela.bin")));
        assert!(!is_compiled(Path::new("dela.dic")));
    }
}
