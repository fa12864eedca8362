//! Dictionary lookup against the token stream.
//!
//! Starting at one token, the dictionary trie is walked letter by letter over
//! that token and, while the trie allows it, over the following ones. Space
//! tokens are matched as their literal char but take no automaton state, so a
//! form spanning `k` non-space tokens yields a transition `state -> state + k`.

use crate::align::SentenceView;
use crate::automaton::StateId;
use crate::builder::AutomatonBuilder;
use crate::lexicon::TagsetFilter;
use crate::tag::{Span, Tag};
use crate::trie::{DictionaryTrie, NodeId};

/// One pending position of the walk.
struct Frame<'a> {
    node: NodeId,
    token: usize,
    /// Unread part of the token text.
    rest: &'a str,
    /// Form read so far, with the case of the text.
    inflected: String,
    /// 1 + non-space tokens left behind.
    shift: usize,
}

pub struct DictionaryMatcher<'m> {
    trie: &'m DictionaryTrie,
    tagset: Option<&'m TagsetFilter>,
    case_sensitive: bool,
}

impl<'m> DictionaryMatcher<'m> {
    pub fn new(trie: &'m DictionaryTrie, tagset: Option<&'m TagsetFilter>, case_sensitive: bool) -> Self {
        Self {
            trie,
            tagset,
            case_sensitive,
        }
    }

    /// Add a transition from `state` for every dictionary form starting at
    /// token `first`.
    ///
    /// Returns true when the token at `first` is itself a dictionary form,
    /// whether or not the tagset kept any of its entries.
    pub fn explore(
        &self,
        view: &SentenceView<'_>,
        first: usize,
        state: StateId,
        builder: &mut AutomatonBuilder,
    ) -> bool {
        let mut known = false;
        let mut stack = vec![Frame {
            node: self.trie.root(),
            token: first,
            rest: view.text(first),
            inflected: String::new(),
            shift: 1,
        }];

        while let Some(frame) = stack.pop() {
            let mut chars = frame.rest.chars();
            if let Some(c) = chars.next() {
                let rest = chars.as_str();
                for child in self.trie.matching_children(frame.node, c, self.case_sensitive) {
                    let mut inflected = String::with_capacity(frame.inflected.len() + c.len_utf8());
                    inflected.push_str(&frame.inflected);
                    inflected.push(c);
                    stack.push(Frame {
                        node: child,
                        token: frame.token,
                        rest,
                        inflected,
                        shift: frame.shift,
                    });
                }
                continue;
            }

            // end of a token
            let entries = self.trie.entries(frame.node);
            if frame.shift == 1 && !entries.is_empty() {
                known = true;
            }
            let on_space = view.is_space(frame.token);
            if !on_space {
                for entry in entries {
                    let entry = match self.tagset {
                        Some(filter) => match filter.filter(entry) {
                            Some(e) => e,
                            None => continue,
                        },
                        None => std::borrow::Cow::Borrowed(entry),
                    };
                    let tag = Tag::standard(entry.to_tag(&frame.inflected), Span::tokens(first, frame.token));
                    builder.add_transition(state, tag, state + frame.shift);
                }
            }

            let next = frame.token + 1;
            if next >= view.len()
                || view.tokens.is_boundary(view.id(next))
                || self.trie.node(frame.node).children().is_empty()
            {
                continue;
            }
            stack.push(Frame {
                node: frame.node,
                token: next,
                rest: view.text(next),
                shift: if on_space { frame.shift } else { frame.shift + 1 },
                inflected: frame.inflected,
            });
        }
        known
    }
}
