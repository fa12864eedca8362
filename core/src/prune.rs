//! Best-path heuristic.
//!
//! Between two states, only the paths crossing the fewest low-weight
//! transitions (bare tokens that no lexical resource recognized) survive. Of
//! the two concurrent paths
//!
//! ```text
//! Aujourd ' {hui,huir.V:Kms}
//! {Aujourd'hui,aujourd'hui.ADV+z1}
//! ```
//!
//! the first one is removed.

use crate::automaton::SentenceAutomaton;
use crate::tag::TagTable;
use crate::Result;

pub struct PathPruner;

impl PathPruner {
    /// Cost of every tag used by the automaton: 1 for low-weight tags.
    fn costs(automaton: &SentenceAutomaton, tags: &TagTable) -> Result<Vec<usize>> {
        let mut costs = vec![0; tags.len()];
        for (_, t) in automaton.transitions() {
            costs[t.tag] = usize::from(!tags[t.tag].is_high_weight()?);
        }
        Ok(costs)
    }

    /// Minimal number of low-weight transitions needed to reach each state.
    /// Unreachable states keep the state count.
    pub fn weights(automaton: &mut SentenceAutomaton, tags: &TagTable) -> Result<Vec<usize>> {
        let n = automaton.len();
        let costs = Self::costs(automaton, tags)?;
        let mut weight = vec![n; n];
        if n == 0 {
            return Ok(weight);
        }
        weight[0] = 0;
        let mut worklist = vec![0];
        while let Some(s) = worklist.pop() {
            automaton.state_mut(s).dirty = false;
            for i in 0..automaton.state(s).transitions.len() {
                let t = automaton.state(s).transitions[i];
                let candidate = weight[s] + costs[t.tag];
                if candidate < weight[t.dest] {
                    weight[t.dest] = candidate;
                    let dest = automaton.state_mut(t.dest);
                    if !dest.dirty {
                        dest.dirty = true;
                        worklist.push(t.dest);
                    }
                }
            }
        }
        Ok(weight)
    }

    /// Remove every transition that is not on a minimal-weight path.
    /// Returns the number of removed transitions.
    pub fn prune(automaton: &mut SentenceAutomaton, tags: &TagTable) -> Result<usize> {
        let weight = Self::weights(automaton, tags)?;
        let costs = Self::costs(automaton, tags)?;
        let mut removed = 0;
        for s in 0..automaton.len() {
            let state = automaton.state_mut(s);
            let before = state.transitions.len();
            state
                .transitions
                .retain(|t| weight[t.dest] == weight[s] + costs[t.tag]);
            removed += before - state.transitions.len();
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{Span, Tag};
    use crate::TextFstError;

    fn tag(tags: &mut TagTable, text: &str) -> usize {
        tags.intern(Tag::standard(text, Span::tokens(0, 0)))
    }

    #[test]
    fn dictionary_path_beats_fallback_path() {
        // states: 0 Aujourd 1 ' 2 hui 3 ; 0 Aujourd'hui 3
        let mut tags = TagTable::new();
        let mut a = SentenceAutomaton::with_states(4);
        let aujourd = tag(&mut tags, "Aujourd");
        let quote = tag(&mut tags, "'");
        let hui = tag(&mut tags, "{hui,huir.V:Kms}");
        let adv = tag(&mut tags, "{Aujourd'hui,aujourd'hui.ADV+z1}");
        a.add_transition(0, aujourd, 1);
        a.add_transition(1, quote, 2);
        a.add_transition(2, hui, 3);
        a.add_transition(0, adv, 3);

        let removed = PathPruner::prune(&mut a, &tags).unwrap();
        assert_eq!(removed, 1);
        a.trim();
        assert_eq!(a.len(), 2);
        assert_eq!(a.transition_count(), 1);
        assert_eq!(a.state(0).transitions[0].tag, adv);
    }

    #[test]
    fn equal_weight_paths_are_kept() {
        let mut tags = TagTable::new();
        let mut a = SentenceAutomaton::with_states(2);
        let n = tag(&mut tags, "{chat,.N}");
        let v = tag(&mut tags, "{chat,.V}");
        a.add_transition(0, n, 1);
        a.add_transition(0, v, 1);
        assert_eq!(PathPruner::prune(&mut a, &tags).unwrap(), 0);
    }

    #[test]
    fn weights_count_low_transitions() {
        let mut tags = TagTable::new();
        let mut a = SentenceAutomaton::with_states(3);
        let x = tag(&mut tags, "xyz");
        let y = tag(&mut tags, "{y,.N}");
        a.add_transition(0, x, 1);
        a.add_transition(1, y, 2);
        assert_eq!(PathPruner::weights(&mut a, &tags).unwrap(), vec![0, 1, 1]);
        assert!(a.states().iter().all(|s| !s.dirty));
    }

    #[test]
    fn epsilon_is_rejected() {
        let tags = TagTable::new();
        let mut a = SentenceAutomaton::with_states(2);
        a.add_transition(0, TagTable::EPSILON, 1);
        assert!(matches!(
            PathPruner::prune(&mut a, &tags),
            Err(TextFstError::InvalidTag { .. })
        ));
    }
}
