//! Tokenized corpus: the token string table and the token id stream.
//!
//! `tokens.txt` holds the token count on its first line followed by one token
//! per line; a line made of a single space is the SPACE token, `{S}` the
//! sentence marker and `{STOP}` the stop marker. `text.cod` is the sequence of
//! token ids, each a little-endian 32-bit integer.

use crate::{Result, TextFstError};
use fst::Map;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub type TokenId = u32;

pub const SENTENCE_MARKER_TEXT: &str = "{S}";
pub const STOP_MARKER_TEXT: &str = "{STOP}";
pub const SPACE_TEXT: &str = " ";

/// Token id → text table, with the sentinel ids resolved at load time.
#[derive(Debug, Clone)]
pub struct TokenTable {
    tokens: Vec<String>,
    // key: token text, value: token id
    index: Map<Vec<u8>>,
    space: Option<TokenId>,
    sentence_marker: Option<TokenId>,
    stop_marker: Option<TokenId>,
}

impl TokenTable {
    /// Build a table from token strings, the id of each being its position.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut space = None;
        let mut sentence_marker = None;
        let mut stop_marker = None;
        for (id, token) in tokens.iter().enumerate() {
            let id = id as TokenId;
            match token.as_str() {
                SPACE_TEXT => space = Some(id),
                SENTENCE_MARKER_TEXT => sentence_marker = Some(id),
                STOP_MARKER_TEXT => stop_marker = Some(id),
                _ => {}
            }
        }

        let mut sorted: Vec<(&str, u64)> = tokens
            .iter()
            .enumerate()
            .map(|(id, t)| (t.as_str(), id as u64))
            .collect();
        sorted.sort_unstable();
        // A token table is a set; keep the first id if a string repeats.
        sorted.dedup_by(|b, a| a.0 == b.0);
        let index = Map::from_iter(sorted)?;

        Ok(Self {
            tokens,
            index,
            space,
            sentence_marker,
            stop_marker,
        })
    }

    /// Load `tokens.txt`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut lines = reader.lines();
        let declared = match lines.next() {
            Some(line) => {
                let line = line?;
                line.trim().parse::<usize>().map_err(|_| TextFstError::InvalidFormat {
                    what: "token count",
                    path: path.to_path_buf(),
                    line: 1,
                    text: line.clone(),
                })?
            }
            None => 0,
        };
        let mut tokens = Vec::with_capacity(declared);
        for line in lines {
            let line = line?;
            tokens.push(line.trim_end_matches('\r').to_string());
        }
        if tokens.len() != declared {
            tracing::warn!(
                "{} declares {} tokens but contains {}",
                path.display(),
                declared,
                tokens.len()
            );
        }
        Self::from_tokens(tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Text of a token. Panics on ids outside of the table; ids coming from
    /// a `SentenceReader` are checked on read.
    pub fn text(&self, id: TokenId) -> &str {
        &self.tokens[id as usize]
    }

    pub fn get(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Id of the token with exactly this text.
    pub fn id_of(&self, text: &str) -> Option<TokenId> {
        self.index.get(text).map(|id| id as TokenId)
    }

    pub fn space(&self) -> Option<TokenId> {
        self.space
    }

    pub fn sentence_marker(&self) -> Option<TokenId> {
        self.sentence_marker
    }

    pub fn stop_marker(&self) -> Option<TokenId> {
        self.stop_marker
    }

    pub fn is_space(&self, id: TokenId) -> bool {
        self.space == Some(id)
    }

    pub fn is_sentence_marker(&self, id: TokenId) -> bool {
        self.sentence_marker == Some(id)
    }

    /// Sentence or stop marker: matching never walks onto these.
    pub fn is_boundary(&self, id: TokenId) -> bool {
        self.sentence_marker == Some(id) || self.stop_marker == Some(id)
    }

    /// Length of a token in chars.
    pub fn char_len(&self, id: TokenId) -> usize {
        self.text(id).chars().count()
    }
}

/// One sentence of the corpus, ready for automaton construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// 1-based ordinal of the sentence in the corpus.
    pub number: usize,
    /// Token ids of the sentence, without the `{S}` marker.
    pub tokens: Vec<TokenId>,
    /// Global position of the first token.
    pub offset_in_tokens: usize,
    /// Global char position of the first token, newlines included.
    pub offset_in_chars: usize,
}

impl Sentence {
    /// A sentence at the start of the corpus, mostly for tests.
    pub fn new(number: usize, tokens: Vec<TokenId>) -> Self {
        Self {
            number,
            tokens,
            offset_in_tokens: 0,
            offset_in_chars: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Reads `text.cod` sentence by sentence and keeps the global offsets.
pub struct SentenceReader<'t, R> {
    reader: R,
    table: &'t TokenTable,
    max_tokens: usize,
    newlines: Vec<usize>,
    // id read past the end of the previous sentence (length limit hit)
    pending: Option<TokenId>,
    next_number: usize,
    offset_in_tokens: usize,
    offset_in_chars: usize,
}

impl<'t, R: Read> SentenceReader<'t, R> {
    pub fn new(reader: R, table: &'t TokenTable, max_tokens: usize) -> Self {
        Self {
            reader,
            table,
            max_tokens: max_tokens.max(1),
            newlines: Vec::new(),
            pending: None,
            next_number: 1,
            offset_in_tokens: 0,
            offset_in_chars: 0,
        }
    }

    /// Sorted token positions of the newlines of the original text. Each one
    /// preceding a sentence shifts its char offset by one.
    pub fn with_newlines(mut self, mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        self.newlines = positions;
        self
    }

    fn read_id(&mut self) -> Result<Option<TokenId>> {
        if let Some(id) = self.pending.take() {
            return Ok(Some(id));
        }
        let mut buf = [0u8; 4];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let id = u32::from_le_bytes(buf);
        if id as usize >= self.table.len() {
            return Err(TextFstError::UnknownToken(id));
        }
        Ok(Some(id))
    }

    /// Next sentence, or `None` at the end of the stream.
    pub fn next_sentence(&mut self) -> Result<Option<Sentence>> {
        loop {
            let mut tokens = Vec::new();
            let mut consumed = 0usize;
            let mut consumed_chars = 0usize;
            let mut first = true;
            while let Some(id) = self.read_id()? {
                if self.table.is_sentence_marker(id) {
                    if first {
                        // a leading {S} does not end an empty sentence
                        first = false;
                        self.offset_in_tokens += 1;
                        self.offset_in_chars += self.table.char_len(id);
                        continue;
                    }
                    consumed += 1;
                    consumed_chars += self.table.char_len(id);
                    break;
                }
                if tokens.len() == self.max_tokens {
                    self.pending = Some(id);
                    break;
                }
                first = false;
                consumed += 1;
                consumed_chars += self.table.char_len(id);
                tokens.push(id);
            }

            if consumed == 0 {
                return Ok(None);
            }

            let shift = self.newlines.partition_point(|&p| p < self.offset_in_tokens);
            let sentence = Sentence {
                number: self.next_number,
                tokens,
                offset_in_tokens: self.offset_in_tokens,
                offset_in_chars: self.offset_in_chars + shift,
            };
            self.offset_in_tokens += consumed;
            self.offset_in_chars += consumed_chars;
            if sentence.tokens.is_empty() {
                // only markers were read
                continue;
            }
            self.next_number += 1;
            return Ok(Some(sentence));
        }
    }
}

impl<R: Read> Iterator for SentenceReader<'_, R> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sentence().transpose()
    }
}

/// Load `enter.pos`: little-endian 32-bit token positions of the newlines.
pub fn load_newline_positions<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let bytes = std::fs::read(path)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as usize)
        .collect())
}

/// Encode token ids the way `text.cod` stores them.
pub fn encode_token_stream(ids: &[TokenId]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TokenTable {
        TokenTable::from_tokens(["{S}", " ", "le", "chat", "dort", ".", "{STOP}"]).unwrap()
    }

    #[test]
    fn sentinels_are_resolved() {
        let t = table();
        assert_eq!(t.sentence_marker(), Some(0));
        assert_eq!(t.space(), Some(1));
        assert_eq!(t.stop_marker(), Some(6));
        assert!(t.is_boundary(6));
        assert_eq!(t.id_of("chat"), Some(3));
        assert_eq!(t.id_of("chien"), None);
    }

    #[test]
    fn sentences_split_on_marker() {
        let t = table();
        let stream = encode_token_stream(&[2, 1, 3, 1, 4, 5, 0, 3, 5, 0]);
        let mut reader = SentenceReader::new(stream.as_slice(), &t, 100);

        let s1 = reader.next_sentence().unwrap().unwrap();
        assert_eq!(s1.number, 1);
        assert_eq!(s1.tokens, vec![2, 1, 3, 1, 4, 5]);
        assert_eq!(s1.offset_in_tokens, 0);
        assert_eq!(s1.offset_in_chars, 0);

        let s2 = reader.next_sentence().unwrap().unwrap();
        assert_eq!(s2.number, 2);
        assert_eq!(s2.tokens, vec![3, 5]);
        assert_eq!(s2.offset_in_tokens, 7);
        // "le chat dort." + "{S}"
        assert_eq!(s2.offset_in_chars, 16);

        assert!(reader.next_sentence().unwrap().is_none());
    }

    #[test]
    fn leading_marker_is_skipped() {
        let t = table();
        let stream = encode_token_stream(&[0, 3, 5]);
        let sentences: Vec<Sentence> = SentenceReader::new(stream.as_slice(), &t, 100)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].tokens, vec![3, 5]);
        assert_eq!(sentences[0].offset_in_tokens, 1);
        assert_eq!(sentences[0].offset_in_chars, 3);
    }

    #[test]
    fn long_runs_are_cut() {
        let t = table();
        let stream = encode_token_stream(&[2, 3, 4, 5]);
        let sentences: Vec<Sentence> = SentenceReader::new(stream.as_slice(), &t, 3)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].tokens, vec![2, 3, 4]);
        assert_eq!(sentences[1].tokens, vec![5]);
        assert_eq!(sentences[1].offset_in_tokens, 3);
    }

    #[test]
    fn newlines_shift_char_offsets() {
        let t = table();
        let stream = encode_token_stream(&[3, 0, 4, 0]);
        let sentences: Vec<Sentence> = SentenceReader::new(stream.as_slice(), &t, 100)
            .with_newlines(vec![1])
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(sentences[0].offset_in_chars, 0);
        // "chat{S}" then one newline before token 2
        assert_eq!(sentences[1].offset_in_chars, 8);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let t = table();
        let stream = encode_token_stream(&[99]);
        let mut reader = SentenceReader::new(stream.as_slice(), &t, 100);
        assert!(matches!(
            reader.next_sentence(),
            Err(TextFstError::UnknownToken(99))
        ));
    }
}
