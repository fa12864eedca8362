use crate::automaton::{SentenceAutomaton, StateId};
use crate::tag::{Tag, TagTable};

/// Owns the automaton of the sentence being built together with its scratch
/// tag table. Matchers only ever see this handle.
#[derive(Debug, Clone)]
pub struct AutomatonBuilder {
    automaton: SentenceAutomaton,
    tags: TagTable,
}

impl AutomatonBuilder {
    /// Start with `states` pre-allocated states (at least one): one per
    /// non-space token plus the final state.
    pub fn new(states: usize) -> Self {
        Self {
            automaton: SentenceAutomaton::with_states(states.max(1)),
            tags: TagTable::new(),
        }
    }

    pub fn add_state(&mut self) -> StateId {
        self.automaton.add_state()
    }

    pub fn intern_tag(&mut self, tag: Tag) -> usize {
        self.tags.intern(tag)
    }

    pub fn add_transition(&mut self, src: StateId, tag: Tag, dest: StateId) {
        let tag = self.intern_tag(tag);
        self.automaton.add_transition(src, tag, dest);
    }

    /// Chain `tags` from `src` to `dest`, creating one fresh state between
    /// consecutive tags. Does nothing for an empty list.
    pub fn add_path<I>(&mut self, src: StateId, tags: I, dest: StateId)
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut tags = tags.into_iter().peekable();
        let mut current = src;
        while let Some(tag) = tags.next() {
            if tags.peek().is_none() {
                self.add_transition(current, tag, dest);
            } else {
                let next = self.add_state();
                self.add_transition(current, tag, next);
                current = next;
            }
        }
    }

    pub fn automaton(&self) -> &SentenceAutomaton {
        &self.automaton
    }

    pub fn automaton_mut(&mut self) -> &mut SentenceAutomaton {
        &mut self.automaton
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    pub fn into_parts(self) -> (SentenceAutomaton, TagTable) {
        (self.automaton, self.tags)
    }
}
