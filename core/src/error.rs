//! Error type shared by every stage of sentence automaton construction.
//!
//! Every variant is fatal for the corpus run: the batch loop propagates it
//! with `?` and stops. Recoverable situations (a sentence emptied by pruning
//! or filtering, an ambiguous alignment) are reported through return values
//! and logging instead.

use std::path::PathBuf;

/// Result type used across `textfst-core`.
pub type Result<T, E = TextFstError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum TextFstError {
    /// A `{S}` token was found inside a sentence buffer.
    #[error("unexpected sentence marker at token {position} of sentence {sentence}")]
    UnexpectedSentenceMarker { sentence: usize, position: usize },

    /// Two space tokens in a row where the token stream allows only one.
    #[error("contiguous space tokens at position {position}")]
    ContiguousSpaces { position: usize },

    /// A fragment letter does not match the text during Korean alignment.
    #[error("alignment mismatch: fragment `{fragment}` against token `{token}`")]
    AlignmentMismatch { fragment: String, token: String },

    /// An output fragment looks like a `{...}` tag but cannot be parsed.
    #[error("malformed tag `{0}`")]
    MalformedTag(String),

    /// A tag that cannot appear where it was found (epsilon during pruning).
    #[error("invalid tag in {context}: {tag}")]
    InvalidTag { context: &'static str, tag: String },

    /// A token id outside of the token table.
    #[error("unknown token id {0}")]
    UnknownToken(u32),

    /// A resource file line that does not follow its format.
    #[error("invalid {what} at {}:{line}: {text}", path.display())]
    InvalidFormat {
        what: &'static str,
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Fst(#[from] fst::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TextFstError {
    /// True for violations of the invariants the token stream and the
    /// grammar are expected to satisfy, as opposed to I/O or format errors.
    pub fn is_corpus_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedSentenceMarker { .. }
                | Self::ContiguousSpaces { .. }
                | Self::AlignmentMismatch { .. }
                | Self::MalformedTag(_)
                | Self::InvalidTag { .. }
        )
    }
}
