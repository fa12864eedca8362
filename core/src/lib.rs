//! textfst-core
//!
//! Builds one finite-state annotation graph ("sentence automaton") per
//! sentence of a tokenized corpus. The paths of each graph enumerate the
//! competing segmentations proposed by a DELA dictionary, a normalization
//! tree and a list of pre-resolved overrides.
//!
//! Public API:
//! - `TokenTable`, `SentenceReader`, `Sentence` - the tokenized corpus
//! - `DictionaryTrie`, `DelaEntry`, `TagsetFilter` - lexical resources
//! - `NormalizationTree` - token-sequence rewriting rules
//! - `Aligner`, `DefaultAligner` - mapping outputs back onto the text
//! - `AutomatonAssembler` - per-sentence construction
//! - `CorpusBuilder`, `TfstWriter` - the batch driver and its output
//! - `Config` - configuration and feature flags
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod error;
pub use error::{Result, TextFstError};

pub mod tokens;
pub use tokens::{Sentence, SentenceReader, TokenId, TokenTable};

pub mod trie;
pub use trie::DictionaryTrie;

pub mod lexicon;
pub use lexicon::{DelaEntry, TagsetFilter};

pub mod normalization;
pub use normalization::NormalizationTree;

pub mod tag;
pub use tag::{tokenize_output, Fragment, Span, Tag, TagFrequencies, TagTable};

pub mod automaton;
pub use automaton::{SentenceAutomaton, State, StateId, Transition};

pub mod builder;
pub use builder::AutomatonBuilder;

pub mod align;
pub use align::{whole_span, Aligner, DefaultAligner, SentenceView, TokenCursor};

pub mod matcher;
pub use matcher::DictionaryMatcher;

pub mod normalizer;
pub use normalizer::{add_output_path, NormalizationApplier};

pub mod prune;
pub use prune::PathPruner;

pub mod overrides;
pub use overrides::{AnnotatedSpan, OverrideQueue};

pub mod assembler;
pub use assembler::{
    AssembledSentence, AutomatonAssembler, RecordState, SentenceOutcome, SentenceRecord,
};

pub mod tfst;
pub use tfst::{write_frequencies, write_json_record, TfstWriter};

pub mod corpus;
pub use corpus::{CorpusBuilder, CorpusSummary};

/// Configuration of the sentence automaton builder.
///
/// Resource paths are not part of this struct; the tools resolve them from
/// the corpus directory and their command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Apply the best-path heuristic: between two states, keep only the
    /// paths with the fewest unknown-token transitions.
    pub clean: bool,

    /// Upper bound on the number of tokens read into one sentence. Longer
    /// runs without a `{S}` marker are cut into several sentences.
    pub max_tokens_per_sentence: usize,

    /// When set, dictionary letters only match identical text letters.
    /// Otherwise a lower-case dictionary letter also matches its upper case.
    pub case_sensitive: bool,

    /// Use the letter-aware Korean aligner instead of the default one.
    pub korean: bool,

    /// Log progress every this many sentences (0 disables).
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clean: false,
            max_tokens_per_sentence: 2000,
            case_sensitive: false,
            korean: false,
            progress_interval: 100,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Lexical resources of a corpus run, shared by every sentence.
///
/// Normalization rules and the tagset are optional; without a tagset every
/// dictionary entry is kept.
#[derive(Debug, Clone)]
pub struct Model {
    pub tokens: Arc<TokenTable>,
    pub dictionary: Arc<DictionaryTrie>,
    pub normalization: Option<Arc<NormalizationTree>>,
    pub tagset: Option<Arc<TagsetFilter>>,
    pub config: Config,
}

impl Model {
    pub fn new(tokens: TokenTable, dictionary: DictionaryTrie, config: Config) -> Self {
        Self {
            tokens: Arc::new(tokens),
            dictionary: Arc::new(dictionary),
            normalization: None,
            tagset: None,
            config,
        }
    }

    pub fn with_normalization(mut self, tree: NormalizationTree) -> Self {
        self.normalization = Some(Arc::new(tree));
        self
    }

    pub fn with_tagset(mut self, tagset: TagsetFilter) -> Self {
        self.tagset = Some(Arc::new(tagset));
        self
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize resource lines (NFC) and trim trailing line terminators.
    ///
    /// Leading and inner spaces are kept: a space can be a letter of a
    /// multi-word form.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.trim_end_matches(['\r', '\n']).nfc().collect::<String>()
    }

    /// True if `text` is `dic` or the single-char upper-case form of `dic`.
    pub fn is_equal_or_uppercase(dic: char, text: char) -> bool {
        if dic == text {
            return true;
        }
        let mut upper = dic.to_uppercase();
        upper.next() == Some(text) && upper.next().is_none()
    }

    /// Case-insensitive comparison of two chars.
    pub fn eq_ignore_case(a: char, b: char) -> bool {
        a == b || a.to_lowercase().eq(b.to_lowercase())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn uppercase_matching_is_one_way() {
            assert!(is_equal_or_uppercase('a', 'a'));
            assert!(is_equal_or_uppercase('a', 'A'));
            assert!(!is_equal_or_uppercase('A', 'a'));
            assert!(is_equal_or_uppercase('é', 'É'));
        }

        #[test]
        fn ignore_case_is_symmetric() {
            assert!(eq_ignore_case('A', 'a'));
            assert!(eq_ignore_case('a', 'A'));
            assert!(!eq_ignore_case('a', 'b'));
        }

        #[test]
        fn normalize_keeps_spaces() {
            assert_eq!(normalize("pomme de terre,.N\r\n"), "pomme de terre,.N");
            assert_eq!(normalize("e\u{301}te\u{301},.N"), "été,.N");
        }
    }
}
