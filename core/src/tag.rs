//! Tags labelling automaton transitions.
//!
//! A tag is an annotation text (a `{inflected,lemma.CODES}` entry, a raw token
//! or a normalization output) together with the span of text it covers. Tags
//! are interned in a `TagTable`; the epsilon tag is always index 0.

use crate::lexicon::DelaEntry;
use crate::Result;
use crate::TextFstError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start and end position of a tag in the sentence.
///
/// Tokens are sentence-local indices. Char offsets are positions inside the
/// token, letter offsets positions inside the decomposed char (Korean). An end
/// letter of -1 marks a fragment that consumes no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_token: usize,
    pub start_char: Option<usize>,
    pub start_letter: Option<i32>,
    pub end_token: usize,
    pub end_char: Option<usize>,
    pub end_letter: Option<i32>,
}

impl Span {
    /// Span with token bounds only, as produced by dictionary matches.
    pub fn tokens(start: usize, end: usize) -> Self {
        Self {
            start_token: start,
            start_char: None,
            start_letter: None,
            end_token: end,
            end_char: None,
            end_letter: None,
        }
    }

    /// Span with token and char bounds.
    pub fn chars(start: (usize, usize), end: (usize, Option<usize>)) -> Self {
        Self {
            start_token: start.0,
            start_char: Some(start.1),
            start_letter: None,
            end_token: end.0,
            end_char: end.1,
            end_letter: None,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start_token)?;
        if let Some(c) = self.start_char {
            write!(f, ".{}", c)?;
            if let Some(l) = self.start_letter {
                write!(f, ".{}", l)?;
            }
        }
        write!(f, "-{}", self.end_token)?;
        if let Some(c) = self.end_char {
            write!(f, ".{}", c)?;
            if let Some(l) = self.end_letter {
                write!(f, ".{}", l)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Epsilon,
    Standard { text: String, span: Span },
}

impl Tag {
    pub fn standard<S: Into<String>>(text: S, span: Span) -> Self {
        Tag::Standard {
            text: text.into(),
            span,
        }
    }

    /// Annotation text; empty for epsilon.
    pub fn text(&self) -> &str {
        match self {
            Tag::Epsilon => "",
            Tag::Standard { text, .. } => text,
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            Tag::Epsilon => None,
            Tag::Standard { span, .. } => Some(span),
        }
    }

    /// True for `{...}` lexical tags, false for bare tokens and words.
    /// Epsilon has no weight and is rejected.
    pub fn is_high_weight(&self) -> Result<bool> {
        match self {
            Tag::Epsilon => Err(TextFstError::InvalidTag {
                context: "weight classification",
                tag: self.to_string(),
            }),
            Tag::Standard { text, .. } => Ok(text.starts_with('{') && text.len() > 1),
        }
    }
}

impl fmt::Display for Tag {
    /// The `.tfst` description of the tag, newline terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Epsilon => write!(f, "@<E>\n.\n"),
            Tag::Standard { text, span } => write!(f, "@STD\n@{}\n@{}\n.\n", text, span),
        }
    }
}

/// Intern table: each distinct tag gets one index.
#[derive(Debug, Clone)]
pub struct TagTable {
    tags: Vec<Tag>,
    index: AHashMap<Tag, usize>,
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TagTable {
    /// Index of the epsilon tag in every table.
    pub const EPSILON: usize = 0;

    pub fn new() -> Self {
        let mut table = Self {
            tags: Vec::new(),
            index: AHashMap::new(),
        };
        table.intern(Tag::Epsilon);
        table
    }

    pub fn intern(&mut self, tag: Tag) -> usize {
        if let Some(&i) = self.index.get(&tag) {
            return i;
        }
        let i = self.tags.len();
        self.tags.push(tag.clone());
        self.index.insert(tag, i);
        i
    }

    pub fn get(&self, i: usize) -> Option<&Tag> {
        self.tags.get(i)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Only epsilon.
    pub fn is_empty(&self) -> bool {
        self.tags.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}

impl std::ops::Index<usize> for TagTable {
    type Output = Tag;

    fn index(&self, i: usize) -> &Tag {
        &self.tags[i]
    }
}

/// Occurrence count of each tag text over the serialized automata.
#[derive(Debug, Clone, Default)]
pub struct TagFrequencies {
    counts: AHashMap<String, u64>,
}

impl TagFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) {
        if let Some(n) = self.counts.get_mut(text) {
            *n += 1;
        } else {
            self.counts.insert(text.to_string(), 1);
        }
    }

    pub fn get(&self, text: &str) -> u64 {
        self.counts.get(text).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by decreasing count, then by text.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v
    }
}

/// One element of a normalization or override output, with the span the
/// aligner assigns to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Text of the transition tag.
    pub output: String,
    /// Text compared with the sentence: the inflected form of a `{...}` tag,
    /// the output itself otherwise.
    pub content: String,
    pub span: Option<Span>,
}

impl Fragment {
    pub fn new(output: &str) -> Result<Self> {
        let content = if output.starts_with('{') && output.len() > 1 {
            DelaEntry::parse_tag(output)?.inflected
        } else {
            output.to_string()
        };
        Ok(Self {
            output: output.to_string(),
            content,
            span: None,
        })
    }

    /// A fragment standing for no text at all.
    pub fn is_epsilon(&self) -> bool {
        self.content.is_empty() || self.content == "<E>"
    }
}

/// Split an output like ` {de,.PREP} {le,.DET} ` into fragments.
///
/// Spaces separate fragments; a `{...}` group is one fragment (an unclosed
/// `{` ends the output); a run of letters is one fragment; any other char is a
/// fragment on its own.
pub fn tokenize_output(output: &str) -> Result<Vec<Fragment>> {
    let chars: Vec<char> = output.chars().collect();
    let mut fragments = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ' ' {
            i += 1;
            continue;
        }
        if c == '{' {
            match chars[i..].iter().position(|&c| c == '}') {
                Some(len) => {
                    let tag: String = chars[i..=i + len].iter().collect();
                    fragments.push(Fragment::new(&tag)?);
                    i += len + 1;
                }
                None => break,
            }
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            fragments.push(Fragment::new(&word)?);
        } else {
            fragments.push(Fragment::new(&c.to_string())?);
            i += 1;
        }
    }
    Ok(fragments)
}
