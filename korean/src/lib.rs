//! textfst-korean
//!
//! Korean support for sentence automaton construction: Hangul syllables are
//! decomposed into letters so that outputs cutting a syllable in two can be
//! aligned on the text.
//!
//! Public API:
//! - `KoreanAligner` - letter-level `Aligner`
//! - `hangul` - syllable to letter decomposition

pub mod aligner;
pub mod hangul;

pub use aligner::KoreanAligner;
pub use hangul::{decompose, is_hangul_syllable, letters, SYLLABLE_BOUND};
