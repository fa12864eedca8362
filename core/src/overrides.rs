//! Pre-resolved annotated spans (`tags.ind`).
//!
//! Each line gives a global token range and the output to splice into the
//! automaton of the sentence containing it:
//!
//! ```text
//! #M
//! 12.0.0 14.3.0 {pomme de terre,.N+z1:fs}
//! ```
//!
//! Only the token part of the bounds is used; the char and letter parts are
//! recomputed by alignment.

use crate::{utils, Result, TextFstError};
use std::collections::VecDeque;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSpan {
    pub start: usize,
    pub end: usize,
    pub output: String,
}

/// Spans ordered by start token, consumed sentence by sentence.
#[derive(Debug, Clone, Default)]
pub struct OverrideQueue {
    spans: VecDeque<AnnotatedSpan>,
}

fn token_part(bound: &str) -> Option<usize> {
    bound.split('.').next()?.parse().ok()
}

impl OverrideQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans(mut spans: Vec<AnnotatedSpan>) -> Self {
        spans.sort_by_key(|s| s.start);
        Self {
            spans: spans.into(),
        }
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let mut spans = Vec::new();
        for (n, raw) in text.lines().enumerate() {
            let line = utils::normalize(raw);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(3, ' ');
            let parsed = match (parts.next(), parts.next(), parts.next()) {
                (Some(start), Some(end), Some(output)) => token_part(start)
                    .zip(token_part(end))
                    .map(|(start, end)| AnnotatedSpan {
                        start,
                        end,
                        output: output.to_string(),
                    }),
                _ => None,
            };
            let span = parsed.ok_or_else(|| TextFstError::InvalidFormat {
                what: "override",
                path: origin.to_path_buf(),
                line: n + 1,
                text: line.clone(),
            })?;
            spans.push(span);
        }
        Ok(Self::from_spans(spans))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Remove the spans starting inside the sentence of `len` tokens at
    /// global position `offset`, and return those that also end inside it,
    /// with sentence-local bounds.
    pub fn take_for_sentence(&mut self, offset: usize, len: usize) -> Vec<AnnotatedSpan> {
        let mut taken = Vec::new();
        while let Some(front) = self.spans.front() {
            if front.start >= offset + len {
                break;
            }
            let Some(span) = self.spans.pop_front() else {
                break;
            };
            if span.start < offset {
                tracing::warn!(
                    "override {}-{} `{}` starts before sentence at token {}, dropped",
                    span.start,
                    span.end,
                    span.output,
                    offset
                );
                continue;
            }
            if span.end >= offset + len || span.end < span.start {
                tracing::debug!(
                    "override {}-{} `{}` crosses a sentence boundary, dropped",
                    span.start,
                    span.end,
                    span.output
                );
                continue;
            }
            taken.push(AnnotatedSpan {
                start: span.start - offset,
                end: span.end - offset,
                output: span.output,
            });
        }
        taken
    }
}
