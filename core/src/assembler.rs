//! Construction of one sentence automaton.
//!
//! States are allocated up front, one per non-space token plus a final one,
//! so that consuming a token always moves one state right. Dictionary forms,
//! normalization outputs and overrides add transitions (and intermediate
//! states for multi-fragment outputs) on top of that skeleton.

use crate::align::{Aligner, SentenceView};
use crate::automaton::{SentenceAutomaton, StateId, Transition};
use crate::builder::AutomatonBuilder;
use crate::matcher::DictionaryMatcher;
use crate::normalizer::{add_output_path, NormalizationApplier};
use crate::overrides::AnnotatedSpan;
use crate::prune::PathPruner;
use crate::tag::{Span, Tag, TagFrequencies, TagTable};
use crate::tokens::{Sentence, TokenId};
use crate::{Model, Result, TextFstError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentenceOutcome {
    Built,
    /// Pruning or tagset filtering left no path: the automaton is a single
    /// non-final state.
    Emptied,
}

/// A finished automaton whose tags still index its sentence-local table.
#[derive(Debug, Clone)]
pub struct AssembledSentence {
    pub automaton: SentenceAutomaton,
    pub tags: TagTable,
    pub outcome: SentenceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordState {
    pub is_final: bool,
    pub transitions: Vec<Transition>,
}

/// What gets serialized for one sentence. Tag indices refer to the corpus
/// tag table.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceRecord {
    pub number: usize,
    pub text: String,
    pub tokens: Vec<TokenId>,
    /// Length in chars of each token.
    pub token_sizes: Vec<usize>,
    pub offset_in_tokens: usize,
    pub offset_in_chars: usize,
    pub states: Vec<RecordState>,
    pub outcome: SentenceOutcome,
}

pub struct AutomatonAssembler<'m, A> {
    model: &'m Model,
    aligner: A,
}

impl<'m, A: Aligner> AutomatonAssembler<'m, A> {
    pub fn new(model: &'m Model, aligner: A) -> Self {
        Self { model, aligner }
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    /// Build, prune if configured, trim and minimize the automaton of
    /// `sentence`. `overrides` carry sentence-local token bounds.
    pub fn assemble(
        &self,
        sentence: &Sentence,
        overrides: &[AnnotatedSpan],
    ) -> Result<AssembledSentence> {
        let tokens = &*self.model.tokens;
        let view = SentenceView::new(tokens, &sentence.tokens);
        let non_space = sentence.tokens.iter().filter(|&&t| !tokens.is_space(t)).count();
        let mut builder = AutomatonBuilder::new(1 + non_space);

        let matcher = DictionaryMatcher::new(
            &self.model.dictionary,
            self.model.tagset.as_deref(),
            self.model.config.case_sensitive,
        );
        let applier = self.model.normalization.as_deref().map(NormalizationApplier::new);

        let mut state: StateId = 0;
        for i in 0..view.len() {
            let id = view.id(i);
            if tokens.is_sentence_marker(id) {
                return Err(TextFstError::UnexpectedSentenceMarker {
                    sentence: sentence.number,
                    position: i,
                });
            }
            if tokens.is_space(id) {
                continue;
            }
            let known = matcher.explore(&view, i, state, &mut builder);
            if let Some(applier) = &applier {
                applier.explore(&view, i, state, &mut builder, &self.aligner)?;
            }
            if !known {
                builder.add_transition(state, Tag::standard(view.text(i), Span::tokens(i, i)), state + 1);
            }
            state += 1;
        }

        for span in overrides {
            let src = state_of(&view, span.start);
            let dest = state_of(&view, span.end) + 1;
            add_output_path(
                &mut builder,
                &self.aligner,
                &view,
                &span.output,
                span.start,
                span.end,
                src,
                dest,
            )?;
        }

        let (mut automaton, tags) = builder.into_parts();
        if self.model.config.clean {
            let removed = PathPruner::prune(&mut automaton, &tags)?;
            tracing::trace!("sentence {}: {} transitions pruned", sentence.number, removed);
        }
        automaton.trim();
        if automaton.is_empty() {
            tracing::warn!("sentence {} is empty", sentence.number);
            let mut automaton = SentenceAutomaton::new();
            automaton.add_state();
            return Ok(AssembledSentence {
                automaton,
                tags: TagTable::new(),
                outcome: SentenceOutcome::Emptied,
            });
        }
        automaton.minimize();
        Ok(AssembledSentence {
            automaton,
            tags,
            outcome: SentenceOutcome::Built,
        })
    }

    /// Re-intern the tags of `assembled` into the corpus table, count them,
    /// and describe the sentence for serialization.
    pub fn record(
        &self,
        sentence: &Sentence,
        assembled: AssembledSentence,
        global: &mut TagTable,
        frequencies: &mut TagFrequencies,
    ) -> SentenceRecord {
        let AssembledSentence {
            mut automaton,
            tags,
            outcome,
        } = assembled;
        automaton.relabel(|local| {
            let tag = &tags[local];
            if let Tag::Standard { text, .. } = tag {
                frequencies.add(text);
            }
            global.intern(tag.clone())
        });

        let table = &self.model.tokens;
        let text: String = sentence.tokens.iter().map(|&t| table.text(t)).collect();
        SentenceRecord {
            number: sentence.number,
            text,
            tokens: sentence.tokens.clone(),
            token_sizes: sentence.tokens.iter().map(|&t| table.char_len(t)).collect(),
            offset_in_tokens: sentence.offset_in_tokens,
            offset_in_chars: sentence.offset_in_chars,
            states: automaton
                .states()
                .iter()
                .map(|s| RecordState {
                    is_final: s.is_final,
                    transitions: s.transitions.clone(),
                })
                .collect(),
            outcome,
        }
    }

    /// `assemble` then `record`.
    pub fn build(
        &self,
        sentence: &Sentence,
        overrides: &[AnnotatedSpan],
        global: &mut TagTable,
        frequencies: &mut TagFrequencies,
    ) -> Result<SentenceRecord> {
        let assembled = self.assemble(sentence, overrides)?;
        Ok(self.record(sentence, assembled, global, frequencies))
    }
}

/// State reached before token `i`: spaces up to `i` take no state.
fn state_of(view: &SentenceView<'_>, i: usize) -> StateId {
    let spaces = (0..=i).filter(|&k| view.is_space(k)).count();
    i.saturating_sub(spaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::DefaultAligner;
    use crate::lexicon::DelaEntry;
    use crate::normalization::NormalizationTree;
    use crate::tokens::TokenTable;
    use crate::trie::DictionaryTrie;
    use crate::Config;

    fn model(tokens: &[&str], dela: &[&str], config: Config) -> Model {
        let table = TokenTable::from_tokens(tokens.iter().copied()).unwrap();
        let mut dic = DictionaryTrie::new();
        for l in dela {
            dic.insert(DelaEntry::parse(l).unwrap());
        }
        Model::new(table, dic, config)
    }

    fn labels(a: &AssembledSentence) -> Vec<String> {
        let mut v: Vec<String> = a
            .automaton
            .transitions()
            .map(|(s, t)| format!("{} {} {}", s, a.tags[t.tag].text(), t.dest))
            .collect();
        v.sort();
        v
    }

    #[test]
    fn unknown_word_gives_fallback_chain() {
        let m = model(&["chat"], &[], Config::default());
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let a = asm.assemble(&Sentence::new(1, vec![0]), &[]).unwrap();
        assert_eq!(a.outcome, SentenceOutcome::Built);
        assert_eq!(a.automaton.len(), 2);
        assert_eq!(labels(&a), vec!["0 chat 1"]);
        assert_eq!(a.tags[a.automaton.state(0).transitions[0].tag].span(), Some(&Span::tokens(0, 0)));
    }

    #[test]
    fn spaces_take_no_state() {
        let m = model(&[" ", "le", "chat", "dort"], &["le,.DET"], Config::default());
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let a = asm.assemble(&Sentence::new(1, vec![1, 0, 2, 0, 3]), &[]).unwrap();
        assert_eq!(a.automaton.len(), 4);
        assert_eq!(labels(&a), vec!["0 {le,le.DET} 1", "1 chat 2", "2 dort 3"]);
        assert!(a.automaton.state(3).is_final);
    }

    #[test]
    fn sentence_marker_inside_sentence_is_fatal() {
        let m = model(&["{S}", "chat"], &[], Config::default());
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let res = asm.assemble(&Sentence::new(3, vec![1, 0, 1]), &[]);
        assert!(matches!(
            res,
            Err(TextFstError::UnexpectedSentenceMarker { sentence: 3, position: 1 })
        ));
    }

    #[test]
    fn clean_keeps_dictionary_paths() {
        let config = Config {
            clean: true,
            ..Config::default()
        };
        let m = model(
            &["Aujourd", "'", "hui"],
            &["hui,huir.V:Kms", "aujourd'hui,.ADV+z1"],
            config,
        );
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let a = asm.assemble(&Sentence::new(1, vec![0, 1, 2]), &[]).unwrap();
        assert_eq!(a.automaton.len(), 2);
        assert_eq!(labels(&a), vec!["0 {Aujourd'hui,aujourd'hui.ADV+z1} 1"]);
    }

    #[test]
    fn tagset_can_empty_a_sentence() {
        let mut m = model(&["chat"], &["chat,.N"], Config::default());
        m = m.with_tagset(crate::TagsetFilter::from_str_lines("V\n"));
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let a = asm.assemble(&Sentence::new(1, vec![0]), &[]).unwrap();
        assert_eq!(a.outcome, SentenceOutcome::Emptied);
        assert_eq!(a.automaton.len(), 1);
        assert!(!a.automaton.state(0).is_final);
        assert_eq!(a.tags.len(), 1);
    }

    #[test]
    fn normalization_suffixes_are_merged() {
        let m = model(&[" ", "du", "pain"], &[], Config::default());
        let mut tree = NormalizationTree::new();
        tree.insert(&[1], "{de,.PREP} {le,.DET:ms}");
        tree.insert(&[1], "{de,.X} {le,.DET:ms}");
        let m = m.with_normalization(tree);
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let a = asm.assemble(&Sentence::new(1, vec![1, 0, 2]), &[]).unwrap();
        // both `le` states are merged by minimization
        assert_eq!(a.automaton.len(), 4);
        assert_eq!(a.automaton.transition_count(), 5);
    }

    #[test]
    fn overrides_are_spliced() {
        let m = model(&[" ", "pomme", "de", "terre"], &[], Config::default());
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let over = [AnnotatedSpan {
            start: 0,
            end: 4,
            output: "{pomme de terre,.N+z1:fs}".to_string(),
        }];
        let a = asm.assemble(&Sentence::new(1, vec![1, 0, 2, 0, 3]), &over).unwrap();
        assert!(labels(&a).contains(&"0 {pomme de terre,.N+z1:fs} 3".to_string()));
    }

    #[test]
    fn record_uses_global_table() {
        let m = model(&[" ", "le", "chat"], &["le,.DET"], Config::default());
        let asm = AutomatonAssembler::new(&m, DefaultAligner);
        let mut global = TagTable::new();
        let mut freq = TagFrequencies::new();
        global.intern(Tag::standard("other", Span::tokens(0, 0)));

        let s = Sentence::new(1, vec![1, 0, 2]);
        let rec = asm.build(&s, &[], &mut global, &mut freq).unwrap();
        assert_eq!(rec.text, "le chat");
        assert_eq!(rec.token_sizes, vec![2, 1, 4]);
        assert_eq!(global.len(), 4);
        let first = rec.states[0].transitions[0].tag;
        assert_eq!(global[first].text(), "{le,le.DET}");
        assert_eq!(freq.get("chat"), 1);

        // same tags in a second sentence are not interned twice
        asm.build(&s, &[], &mut global, &mut freq).unwrap();
        assert_eq!(global.len(), 4);
        assert_eq!(freq.get("chat"), 2);
    }
}
