// textfst/korean/src/aligner.rs
//
// Letter-level alignment of output fragments on Korean text.
//
// Korean outputs often cut a syllable in two (갔 = 가 + ㅆ), so fragments are
// matched letter by letter against the decomposed text and spans carry a
// letter offset inside the char.

use crate::hangul;
use textfst_core::utils::eq_ignore_case;
use textfst_core::{
    whole_span, Aligner, Fragment, Result, SentenceView, Span, TextFstError, TokenCursor,
};

/// Aligner for Korean corpora.
///
/// One fragment gets the whole range. Several fragments are walked letter by
/// letter: a letter that differs from the text is an error in the resource,
/// running out of text (or not consuming all of it) falls back to the whole
/// range for every fragment. Empty fragments (`<E>`) consume nothing and get
/// an end letter of -1.
#[derive(Debug, Default, Clone, Copy)]
pub struct KoreanAligner;

impl KoreanAligner {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        fragments: &[Fragment],
        start: usize,
        end: usize,
        view: &SentenceView<'_>,
    ) -> Result<Option<Vec<Span>>> {
        let mut cursor = LetterCursor::new(*view, start, end);
        let mut spans = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            if fragment.is_epsilon() {
                spans.push(cursor.empty_span());
                continue;
            }
            if !cursor.begin_fragment()? {
                return Ok(None);
            }
            let from = cursor.position();
            for letter in hangul::letters_of(&fragment.content) {
                let Some(text) = cursor.current() else {
                    return Ok(None);
                };
                if !eq_ignore_case(letter, text) {
                    return Err(TextFstError::AlignmentMismatch {
                        fragment: fragment.content.clone(),
                        token: view.text(cursor.token()).to_string(),
                    });
                }
                cursor.advance();
            }
            let (token, char_index, letter) = cursor.position();
            spans.push(letter_span(from, (token, char_index, letter as i32 - 1)));
        }
        Ok(cursor.is_finished().then_some(spans))
    }
}

impl Aligner for KoreanAligner {
    fn align(
        &self,
        fragments: &mut [Fragment],
        start: usize,
        end: usize,
        view: &SentenceView<'_>,
    ) -> Result<()> {
        if fragments.len() == 1 {
            fragments[0].span = Some(whole_letter_span(start, end, view));
            return Ok(());
        }
        match Self::walk(fragments, start, end, view)? {
            Some(spans) => {
                for (fragment, span) in fragments.iter_mut().zip(spans) {
                    fragment.span = Some(span);
                }
            }
            None => {
                tracing::debug!(
                    "no exact letter alignment of {} fragments on tokens {}-{}, using whole span",
                    fragments.len(),
                    start,
                    end
                );
                let span = whole_letter_span(start, end, view);
                for fragment in fragments.iter_mut() {
                    fragment.span = Some(span);
                }
            }
        }
        Ok(())
    }
}

fn letter_span(from: (usize, usize, usize), to: (usize, usize, i32)) -> Span {
    let mut span = Span::chars((from.0, from.1), (to.0, Some(to.1)));
    span.start_letter = Some(from.2 as i32);
    span.end_letter = Some(to.2);
    span
}

/// [`whole_span`] with the first letter of the first char and the last
/// letter of the last char.
fn whole_letter_span(start: usize, end: usize, view: &SentenceView<'_>) -> Span {
    let mut span = whole_span(start, end, view);
    let last = view
        .text(end)
        .chars()
        .last()
        .map_or(1, |c| hangul::letters(c).len());
    span.start_letter = Some(0);
    span.end_letter = Some(last as i32 - 1);
    span
}

/// [`TokenCursor`] plus a position inside the letters of the current char.
struct LetterCursor<'a> {
    view: SentenceView<'a>,
    chars: TokenCursor<'a>,
    end: usize,
    letters: Vec<char>,
    letter: usize,
}

impl<'a> LetterCursor<'a> {
    fn new(view: SentenceView<'a>, start: usize, end: usize) -> Self {
        let mut cursor = Self {
            view,
            chars: TokenCursor::new(view, start, end),
            end,
            letters: Vec::new(),
            letter: 0,
        };
        cursor.load();
        cursor
    }

    fn load(&mut self) {
        self.letters = self.chars.current().map(hangul::letters).unwrap_or_default();
        self.letter = 0;
    }

    fn token(&self) -> usize {
        self.chars.token()
    }

    fn position(&self) -> (usize, usize, usize) {
        (self.chars.token(), self.chars.char_index(), self.letter)
    }

    fn at_char_end(&self) -> bool {
        self.letter >= self.letters.len()
    }

    fn is_last_char(&self) -> bool {
        self.chars.char_index() + 1 >= self.view.char_len(self.chars.token())
    }

    fn step_char(&mut self) {
        self.chars.advance();
        self.load();
    }

    /// Letter under the cursor, moving to the next char or token when the
    /// current one is used up. Inside a fragment, space tokens are matched
    /// as text.
    fn current(&mut self) -> Option<char> {
        loop {
            if let Some(&c) = self.letters.get(self.letter) {
                return Some(c);
            }
            if !self.chars.at_token_end() {
                self.step_char();
                continue;
            }
            if !self.chars.next_token() {
                return None;
            }
            self.load();
        }
    }

    fn advance(&mut self) {
        self.letter += 1;
    }

    /// Place the cursor where the next fragment starts, skipping a single
    /// space token between two tokens.
    fn begin_fragment(&mut self) -> Result<bool> {
        if !self.at_char_end() {
            return Ok(true);
        }
        if !self.chars.at_token_end() {
            self.chars.advance();
        }
        if !self.chars.begin_fragment()? {
            return Ok(false);
        }
        self.load();
        Ok(!self.letters.is_empty())
    }

    /// Span of a fragment that consumes nothing, at the current position.
    /// After the last char of a token the span stays on its last letter.
    fn empty_span(&mut self) -> Span {
        if self.at_char_end() && !self.is_last_char() {
            self.step_char();
        }
        let (token, char_index, letter) = self.position();
        let letter = letter.min(self.letters.len().saturating_sub(1));
        letter_span((token, char_index, letter), (token, char_index, -1))
    }

    fn is_finished(&self) -> bool {
        self.chars.token() == self.end && self.at_char_end() && self.is_last_char()
    }
}
