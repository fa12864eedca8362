// core/src/align.rs
//
// Mapping output fragments back onto the sentence text.

use crate::tag::{Fragment, Span};
use crate::tokens::{TokenId, TokenTable};
use crate::{utils, Result, TextFstError};

/// Read-only view of the sentence being built.
#[derive(Debug, Clone, Copy)]
pub struct SentenceView<'a> {
    pub tokens: &'a TokenTable,
    pub buffer: &'a [TokenId],
}

impl<'a> SentenceView<'a> {
    pub fn new(tokens: &'a TokenTable, buffer: &'a [TokenId]) -> Self {
        Self { tokens, buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn id(&self, i: usize) -> TokenId {
        self.buffer[i]
    }

    pub fn text(&self, i: usize) -> &'a str {
        self.tokens.text(self.buffer[i])
    }

    pub fn is_space(&self, i: usize) -> bool {
        self.tokens.is_space(self.buffer[i])
    }

    pub fn char_len(&self, i: usize) -> usize {
        self.tokens.char_len(self.buffer[i])
    }
}

/// Trait that span aligners must implement to be used by the assembler.
///
/// `fragments` is the tokenized output of one normalization rule or override,
/// `start..=end` the sentence-local token range it replaces. On return every
/// fragment has a span.
pub trait Aligner {
    fn align(
        &self,
        fragments: &mut [Fragment],
        start: usize,
        end: usize,
        view: &SentenceView<'_>,
    ) -> Result<()>;
}

/// Span covering every char of tokens `start..=end`.
pub fn whole_span(start: usize, end: usize, view: &SentenceView<'_>) -> Span {
    Span::chars((start, 0), (end, Some(view.char_len(end).saturating_sub(1))))
}

/// Char-by-char walk over a token range, shared by the aligners.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    view: SentenceView<'a>,
    end: usize,
    token: usize,
    chars: Vec<char>,
    char_index: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(view: SentenceView<'a>, start: usize, end: usize) -> Self {
        Self {
            view,
            end,
            token: start,
            chars: view.text(start).chars().collect(),
            char_index: 0,
        }
    }

    pub fn token(&self) -> usize {
        self.token
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// Char under the cursor, `None` past the end of the token.
    pub fn current(&self) -> Option<char> {
        self.chars.get(self.char_index).copied()
    }

    pub fn advance(&mut self) {
        self.char_index += 1;
    }

    pub fn at_token_end(&self) -> bool {
        self.char_index >= self.chars.len()
    }

    /// Every char of the range has been consumed.
    pub fn is_finished(&self) -> bool {
        self.token == self.end && self.at_token_end()
    }

    /// Move to the first char of the next token; false on the last token.
    pub fn next_token(&mut self) -> bool {
        if self.token >= self.end {
            return false;
        }
        self.token += 1;
        self.chars = self.view.text(self.token).chars().collect();
        self.char_index = 0;
        true
    }

    /// Place the cursor where the next fragment starts.
    ///
    /// A fragment never starts with a space, so leaving an exhausted token
    /// also skips a following space token. Returns false when the range is
    /// exhausted.
    pub fn begin_fragment(&mut self) -> Result<bool> {
        if !self.at_token_end() {
            return Ok(true);
        }
        if !self.next_token() {
            return Ok(false);
        }
        if self.view.is_space(self.token) {
            if !self.next_token() {
                return Ok(false);
            }
            if self.view.is_space(self.token) {
                return Err(TextFstError::ContiguousSpaces {
                    position: self.token,
                });
            }
        }
        Ok(true)
    }
}

/// Case-insensitive char alignment.
///
/// One fragment gets the whole range. Several fragments are matched char by
/// char against the text; if they do not cover the range exactly, every
/// fragment falls back to the whole range.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAligner;

impl DefaultAligner {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        fragments: &[Fragment],
        start: usize,
        end: usize,
        view: &SentenceView<'_>,
    ) -> Result<Option<Vec<Span>>> {
        let mut cursor = TokenCursor::new(*view, start, end);
        let mut spans = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            if fragment.content.is_empty() || !cursor.begin_fragment()? {
                return Ok(None);
            }
            let from = (cursor.token(), cursor.char_index());
            for c in fragment.content.chars() {
                if cursor.at_token_end() && !cursor.next_token() {
                    return Ok(None);
                }
                match cursor.current() {
                    Some(t) if utils::eq_ignore_case(c, t) => cursor.advance(),
                    _ => return Ok(None),
                }
            }
            spans.push(Span::chars(
                from,
                (cursor.token(), Some(cursor.char_index() - 1)),
            ));
        }
        Ok(cursor.is_finished().then_some(spans))
    }
}

impl Aligner for DefaultAligner {
    fn align(
        &self,
        fragments: &mut [Fragment],
        start: usize,
        end: usize,
        view: &SentenceView<'_>,
    ) -> Result<()> {
        if fragments.len() == 1 {
            fragments[0].span = Some(whole_span(start, end, view));
            return Ok(());
        }
        match Self::walk(fragments, start, end, view)? {
            Some(spans) => {
                for (fragment, span) in fragments.iter_mut().zip(spans) {
                    fragment.span = Some(span);
                }
            }
            None => {
                let span = whole_span(start, end, view);
                tracing::debug!(
                    "no exact alignment of {} fragments on tokens {}-{}, using whole span",
                    fragments.len(),
                    start,
                    end
                );
                for fragment in fragments.iter_mut() {
                    fragment.span = Some(span);
                }
            }
        }
        Ok(())
    }
}
