//! Application of the normalization tree to the sentence.
//!
//! Unlike dictionary forms, normalization outputs ignore the matched text:
//! `j '` rewritten as `{je,.PRO:1s}` yields a transition labelled with the
//! output alone, whose span is recovered by the aligner.

use crate::align::{whole_span, Aligner, SentenceView};
use crate::automaton::StateId;
use crate::builder::AutomatonBuilder;
use crate::normalization::NormalizationTree;
use crate::tag::{tokenize_output, Tag};
use crate::Result;

/// Insert the path spelling `output` from `src` to `dest`, its fragments
/// aligned on tokens `start..=end`. An output without fragments adds nothing.
#[allow(clippy::too_many_arguments)]
pub fn add_output_path<A: Aligner + ?Sized>(
    builder: &mut AutomatonBuilder,
    aligner: &A,
    view: &SentenceView<'_>,
    output: &str,
    start: usize,
    end: usize,
    src: StateId,
    dest: StateId,
) -> Result<()> {
    let mut fragments = tokenize_output(output)?;
    if fragments.is_empty() {
        return Ok(());
    }
    aligner.align(&mut fragments, start, end, view)?;
    let tags: Vec<Tag> = fragments
        .into_iter()
        .map(|f| {
            let span = f.span.unwrap_or_else(|| whole_span(start, end, view));
            Tag::standard(f.output, span)
        })
        .collect();
    builder.add_path(src, tags, dest);
    Ok(())
}

pub struct NormalizationApplier<'m> {
    tree: &'m NormalizationTree,
}

impl<'m> NormalizationApplier<'m> {
    pub fn new(tree: &'m NormalizationTree) -> Self {
        Self { tree }
    }

    /// Walk the tree from token `first` (never a space) and add a path from
    /// `state` for every output met after at least one token.
    ///
    /// A single space after a matched token is skipped before the next
    /// lookup. Token ids are unique per node, so at most one child matches
    /// and the walk is linear.
    pub fn explore<A: Aligner + ?Sized>(
        &self,
        view: &SentenceView<'_>,
        first: usize,
        state: StateId,
        builder: &mut AutomatonBuilder,
        aligner: &A,
    ) -> Result<()> {
        let mut node = self.tree.root();
        let mut pos = first;
        let mut matched = 0usize;
        let mut increment = 0usize;
        loop {
            if matched > 0 {
                for output in self.tree.node(node).outputs() {
                    add_output_path(
                        builder,
                        aligner,
                        view,
                        output,
                        first,
                        pos - increment,
                        state,
                        state + matched,
                    )?;
                }
            }
            if pos >= view.len() {
                break;
            }
            let token = view.id(pos);
            if view.tokens.is_boundary(token) {
                break;
            }
            let Some(child) = self.tree.node(node).child(token) else {
                break;
            };
            increment = if pos + 1 < view.len() && view.is_space(pos + 1) { 2 } else { 1 };
            pos += increment;
            node = child;
            matched += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::DefaultAligner;
    use crate::tokens::TokenTable;

    fn table() -> TokenTable {
        TokenTable::from_tokens([" ", "j", "'", "aime", "du", "pain", "{STOP}"]).unwrap()
    }

    fn describe(b: &AutomatonBuilder) -> Vec<String> {
        let mut v: Vec<String> = b
            .automaton()
            .transitions()
            .map(|(src, t)| {
                let tag = &b.tags()[t.tag];
                format!("{} {} {} {}", src, tag.text(), tag.span().unwrap(), t.dest)
            })
            .collect();
        v.sort();
        v
    }

    #[test]
    fn two_token_rule() {
        let t = table();
        let mut tree = NormalizationTree::new();
        tree.insert(&[1, 2], "{je,.PRO:1s}");
        // j ' aime
        let buffer = [1, 2, 3];
        let view = SentenceView::new(&t, &buffer);
        let mut b = AutomatonBuilder::new(4);
        NormalizationApplier::new(&tree)
            .explore(&view, 0, 0, &mut b, &DefaultAligner)
            .unwrap();
        assert_eq!(describe(&b), vec!["0 {je,.PRO:1s} 0.0-1.0 2"]);
    }

    #[test]
    fn space_between_matched_tokens_is_skipped() {
        let t = table();
        let mut tree = NormalizationTree::new();
        tree.insert(&[1, 2], "{je,.PRO:1s}");
        let buffer = [1, 0, 2, 0, 3];
        let view = SentenceView::new(&t, &buffer);
        let mut b = AutomatonBuilder::new(4);
        NormalizationApplier::new(&tree)
            .explore(&view, 0, 0, &mut b, &DefaultAligner)
            .unwrap();
        // the trailing space is not part of the span
        assert_eq!(describe(&b), vec!["0 {je,.PRO:1s} 0.0-2.0 2"]);
    }

    #[test]
    fn multi_fragment_output_creates_states() {
        let t = table();
        let mut tree = NormalizationTree::new();
        tree.insert(&[4], "{de,.PREP} {le,.DET:ms}");
        let buffer = [4, 0, 5];
        let view = SentenceView::new(&t, &buffer);
        let mut b = AutomatonBuilder::new(3);
        NormalizationApplier::new(&tree)
            .explore(&view, 0, 0, &mut b, &DefaultAligner)
            .unwrap();
        assert_eq!(b.automaton().len(), 4);
        assert_eq!(
            describe(&b),
            vec!["0 {de,.PREP} 0.0-0.1 3", "3 {le,.DET:ms} 0.0-0.1 1"]
        );
    }

    #[test]
    fn prefix_outputs_are_all_applied() {
        let t = table();
        let mut tree = NormalizationTree::new();
        tree.insert(&[4], "{du,.DET}");
        tree.insert(&[4, 5], "{du pain,.N}");
        let buffer = [4, 0, 5];
        let view = SentenceView::new(&t, &buffer);
        let mut b = AutomatonBuilder::new(3);
        NormalizationApplier::new(&tree)
            .explore(&view, 0, 0, &mut b, &DefaultAligner)
            .unwrap();
        assert_eq!(
            describe(&b),
            vec!["0 {du pain,.N} 0.0-2.3 2", "0 {du,.DET} 0.0-0.1 1"]
        );
    }

    #[test]
    fn stops_at_stop_marker() {
        let t = table();
        let mut tree = NormalizationTree::new();
        tree.insert(&[4, 6], "x");
        let buffer = [4, 6];
        let view = SentenceView::new(&t, &buffer);
        let mut b = AutomatonBuilder::new(3);
        NormalizationApplier::new(&tree)
            .explore(&view, 0, 0, &mut b, &DefaultAligner)
            .unwrap();
        assert_eq!(b.automaton().transition_count(), 0);
    }
}
