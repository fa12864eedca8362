// textfst/korean/src/hangul.rs
//
// Hangul syllable to letter decomposition.
//
// A precomposed syllable (U+AC00..U+D7A3) is an initial consonant, a medial
// vowel and an optional final consonant. Letters are given as compatibility
// jamo (U+3131..U+3163). Compound vowels and compound finals are split into
// their simple parts, so 과 gives ㄱㅗㅏ and 닭 gives ㄷㅏㄹㄱ. Double
// consonants (ㄲ, ㅆ, ...) are single letters.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Marker closing the letters of one syllable in a decomposed string.
pub const SYLLABLE_BOUND: char = '\u{318D}';

const SYLLABLE_FIRST: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

const MEDIALS: [&str; 21] = [
    "ㅏ", "ㅐ", "ㅑ", "ㅒ", "ㅓ", "ㅔ", "ㅕ", "ㅖ", "ㅗ", "ㅗㅏ", "ㅗㅐ", "ㅗㅣ", "ㅛ", "ㅜ", "ㅜㅓ",
    "ㅜㅔ", "ㅜㅣ", "ㅠ", "ㅡ", "ㅡㅣ", "ㅣ",
];

const FINALS: [&str; 28] = [
    "", "ㄱ", "ㄲ", "ㄱㅅ", "ㄴ", "ㄴㅈ", "ㄴㅎ", "ㄷ", "ㄹ", "ㄹㄱ", "ㄹㅁ", "ㄹㅂ", "ㄹㅅ", "ㄹㅌ",
    "ㄹㅍ", "ㄹㅎ", "ㅁ", "ㅂ", "ㅂㅅ", "ㅅ", "ㅆ", "ㅇ", "ㅈ", "ㅊ", "ㅋ", "ㅌ", "ㅍ", "ㅎ",
];

/// Compound compatibility jamo and their simple parts.
///
/// Outputs may spell endings with isolated jamo (`{ㅆ,.PAST}`); those are
/// split the same way as the inside of a syllable.
static COMPOUND_JAMO: Lazy<HashMap<char, [char; 2]>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // finals
    m.insert('ㄳ', ['ㄱ', 'ㅅ']);
    m.insert('ㄵ', ['ㄴ', 'ㅈ']);
    m.insert('ㄶ', ['ㄴ', 'ㅎ']);
    m.insert('ㄺ', ['ㄹ', 'ㄱ']);
    m.insert('ㄻ', ['ㄹ', 'ㅁ']);
    m.insert('ㄼ', ['ㄹ', 'ㅂ']);
    m.insert('ㄽ', ['ㄹ', 'ㅅ']);
    m.insert('ㄾ', ['ㄹ', 'ㅌ']);
    m.insert('ㄿ', ['ㄹ', 'ㅍ']);
    m.insert('ㅀ', ['ㄹ', 'ㅎ']);
    m.insert('ㅄ', ['ㅂ', 'ㅅ']);

    // vowels
    m.insert('ㅘ', ['ㅗ', 'ㅏ']);
    m.insert('ㅙ', ['ㅗ', 'ㅐ']);
    m.insert('ㅚ', ['ㅗ', 'ㅣ']);
    m.insert('ㅝ', ['ㅜ', 'ㅓ']);
    m.insert('ㅞ', ['ㅜ', 'ㅔ']);
    m.insert('ㅟ', ['ㅜ', 'ㅣ']);
    m.insert('ㅢ', ['ㅡ', 'ㅣ']);

    m
});

pub fn is_hangul_syllable(c: char) -> bool {
    (SYLLABLE_FIRST..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Letters of one char.
///
/// Never empty: a char that is neither a syllable nor a compound jamo is its
/// own single letter.
pub fn letters(c: char) -> Vec<char> {
    if is_hangul_syllable(c) {
        let index = c as u32 - SYLLABLE_FIRST;
        let initial = index / (MEDIAL_COUNT * FINAL_COUNT);
        let medial = index % (MEDIAL_COUNT * FINAL_COUNT) / FINAL_COUNT;
        let last = index % FINAL_COUNT;

        let mut out = Vec::with_capacity(6);
        out.push(INITIALS[initial as usize]);
        out.extend(MEDIALS[medial as usize].chars());
        out.extend(FINALS[last as usize].chars());
        return out;
    }
    match COMPOUND_JAMO.get(&c) {
        Some(parts) => parts.to_vec(),
        None => vec![c],
    }
}

/// Letters of a whole string, without syllable markers.
pub fn letters_of(s: &str) -> Vec<char> {
    s.chars().flat_map(letters).collect()
}

/// Decomposed form of `s`: the letters of every syllable followed by
/// [`SYLLABLE_BOUND`]. Other chars are copied unchanged.
pub fn decompose(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for c in s.chars() {
        if is_hangul_syllable(c) {
            out.extend(letters(c));
            out.push(SYLLABLE_BOUND);
        } else {
            out.extend(letters(c));
        }
    }
    out
}
