//! DELA lexicon entries and tagset filtering.
//!
//! A DELA line reads `inflected,lemma.CODE+SEM+SEM:infl:infl`. An empty lemma
//! stands for the inflected form. `\` escapes the next char, so forms may
//! contain `,` or `.`. Tags produced from entries use the same syntax inside
//! braces: `{chats,chat.N+z1:mp}`.
//!
//! Public API:
//! - `DelaEntry` - parsing, tag printing
//! - `TagsetFilter` - drops entries whose codes are not part of a tagset

use crate::{utils, Result, TextFstError};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// One lexicon record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelaEntry {
    pub inflected: String,
    pub lemma: String,
    /// Grammatical code first, then semantic codes.
    pub codes: Vec<String>,
    pub inflectional: Vec<String>,
}

/// Split `s` at the first unescaped char of `stops`, unescaping the head.
fn take_until<'a>(s: &'a str, stops: &[char]) -> (String, Option<char>, &'a str) {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            if let Some((_, escaped)) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        if stops.contains(&c) {
            return (out, Some(c), &s[i + c.len_utf8()..]);
        }
        out.push(c);
    }
    (out, None, "")
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

impl DelaEntry {
    pub fn new<I, L>(inflected: I, lemma: L, codes: Vec<String>, inflectional: Vec<String>) -> Self
    where
        I: Into<String>,
        L: Into<String>,
    {
        Self {
            inflected: inflected.into(),
            lemma: lemma.into(),
            codes,
            inflectional,
        }
    }

    /// Parse a DELA line. Returns `None` if the line has no `,` separator or
    /// no grammatical code.
    ///
    /// # Example
    /// ```
    /// use textfst_core::DelaEntry;
    ///
    /// let e = DelaEntry::parse("chats,chat.N+z1:mp").unwrap();
    /// assert_eq!(e.lemma, "chat");
    /// assert_eq!(e.pos(), "N");
    /// assert_eq!(e.inflectional, vec!["mp".to_string()]);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let (inflected, stop, rest) = take_until(line, &[',']);
        stop?;
        let (lemma, stop, rest) = take_until(rest, &['.']);
        stop?;
        let lemma = if lemma.is_empty() { inflected.clone() } else { lemma };

        let mut codes = Vec::new();
        let mut inflectional = Vec::new();
        let mut rest = rest;
        let mut in_inflectional = false;
        loop {
            let (part, stop, tail) = take_until(rest, &['+', ':']);
            if in_inflectional {
                if !part.is_empty() {
                    inflectional.push(part);
                }
            } else if !part.is_empty() {
                codes.push(part);
            }
            match stop {
                Some(':') => in_inflectional = true,
                Some(_) => {}
                None => break,
            }
            rest = tail;
        }
        if codes.is_empty() {
            return None;
        }
        Some(Self {
            inflected,
            lemma,
            codes,
            inflectional,
        })
    }

    /// Parse a `{inflected,lemma.CODES}` tag token.
    pub fn parse_tag(tag: &str) -> Result<Self> {
        tag.strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .and_then(Self::parse)
            .ok_or_else(|| TextFstError::MalformedTag(tag.to_string()))
    }

    /// Grammatical code (part of speech).
    pub fn pos(&self) -> &str {
        &self.codes[0]
    }

    /// Semantic codes following the grammatical code.
    pub fn semantic_codes(&self) -> &[String] {
        &self.codes[1..]
    }

    /// Tag text for this entry, using `inflected` as it appears in the text.
    pub fn to_tag(&self, inflected: &str) -> String {
        let mut tag = String::from("{");
        escape_into(&mut tag, inflected, &[',', '.', '{', '}']);
        tag.push(',');
        escape_into(&mut tag, &self.lemma, &[',', '.']);
        tag.push('.');
        tag.push_str(&self.codes.join("+"));
        for infl in &self.inflectional {
            tag.push(':');
            tag.push_str(infl);
        }
        tag.push('}');
        tag
    }
}

/// Tagset used to filter dictionary entries.
///
/// Each non-comment line declares a grammatical code, optionally followed by
/// the semantic codes allowed with it:
///
/// ```text
/// # part of speech, allowed semantic codes
/// N z1 z2 Hum
/// V
/// ```
///
/// An entry whose grammatical code is not declared is rejected. Semantic codes
/// not listed are removed from the entry; a code declared alone keeps all of
/// them.
#[derive(Debug, Clone, Default)]
pub struct TagsetFilter {
    codes: AHashMap<String, Option<AHashSet<String>>>,
}

impl TagsetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a grammatical code. `None` allows every semantic code.
    pub fn declare<I, S>(&mut self, pos: &str, semantic: Option<I>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = semantic.map(|codes| codes.into_iter().map(Into::into).collect());
        self.codes.insert(pos.to_string(), allowed);
    }

    pub fn from_str_lines(text: &str) -> Self {
        let mut filter = Self::new();
        for line in text.lines() {
            let line = utils::normalize(line);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(pos) = parts.next() else { continue };
            let semantic: Vec<&str> = parts.collect();
            if semantic.is_empty() {
                filter.declare::<Vec<&str>, &str>(pos, None);
            } else {
                filter.declare(pos, Some(semantic));
            }
        }
        filter
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_str_lines(&text))
    }

    /// Filtered view of `entry`, or `None` if the tagset rejects it.
    pub fn filter<'e>(&self, entry: &'e DelaEntry) -> Option<Cow<'e, DelaEntry>> {
        match self.codes.get(entry.pos())? {
            None => Some(Cow::Borrowed(entry)),
            Some(allowed) => {
                if entry.semantic_codes().iter().all(|c| allowed.contains(c)) {
                    return Some(Cow::Borrowed(entry));
                }
                let mut kept = entry.clone();
                kept.codes.retain(|c| c == entry.pos() || allowed.contains(c));
                Some(Cow::Owned(kept))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_line() {
        let e = DelaEntry::parse("pommes de terre,pomme de terre.N+z1+Conc:fp").unwrap();
        assert_eq!(e.inflected, "pommes de terre");
        assert_eq!(e.lemma, "pomme de terre");
        assert_eq!(e.codes, vec!["N", "z1", "Conc"]);
        assert_eq!(e.inflectional, vec!["fp"]);
    }

    #[test]
    fn empty_lemma_is_inflected() {
        let e = DelaEntry::parse("de,.PREP").unwrap();
        assert_eq!(e.lemma, "de");
        assert!(e.inflectional.is_empty());
    }

    #[test]
    fn escaped_separators() {
        let e = DelaEntry::parse("\\,,\\,.PONCT").unwrap();
        assert_eq!(e.inflected, ",");
        assert_eq!(e.lemma, ",");
        assert_eq!(e.to_tag(","), "{\\,,\\,.PONCT}");
    }

    #[test]
    fn several_inflectional_codes() {
        let e = DelaEntry::parse("petite,petit.A:fs:fp").unwrap();
        assert_eq!(e.inflectional, vec!["fs", "fp"]);
        assert_eq!(e.to_tag("Petite"), "{Petite,petit.A:fs:fp}");
    }

    #[test]
    fn invalid_lines() {
        assert!(DelaEntry::parse("nocomma").is_none());
        assert!(DelaEntry::parse("a,b").is_none());
        assert!(DelaEntry::parse("a,b.").is_none());
    }

    #[test]
    fn parse_tag_token() {
        let e = DelaEntry::parse_tag("{de,.PREP}").unwrap();
        assert_eq!(e.inflected, "de");
        assert!(matches!(
            DelaEntry::parse_tag("{S}"),
            Err(TextFstError::MalformedTag(_))
        ));
    }

    #[test]
    fn tagset_filtering() {
        let filter = TagsetFilter::from_str_lines("# tagset\nN z1\nPREP\n");
        let n = DelaEntry::parse("chat,.N+z1+Anl:ms").unwrap();
        let prep = DelaEntry::parse("de,.PREP+Loc").unwrap();
        let v = DelaEntry::parse("est,être.V:P3s").unwrap();

        let filtered = filter.filter(&n).unwrap();
        assert_eq!(filtered.codes, vec!["N", "z1"]);
        assert!(matches!(filter.filter(&prep), Some(Cow::Borrowed(_))));
        assert!(filter.filter(&v).is_none());
    }
}
