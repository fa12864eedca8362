//! Sentence automaton: arena of states with indexed transitions.
//!
//! State 0 is the initial state. Transitions carry a tag index into the
//! `TagTable` of their scope and a destination index into the state arena.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub type StateId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    pub tag: usize,
    pub dest: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub transitions: Vec<Transition>,
    pub is_final: bool,
    /// Scratch mark for worklist algorithms; always clear between passes.
    pub(crate) dirty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceAutomaton {
    states: Vec<State>,
}

impl SentenceAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` states without transitions; the last one is final.
    pub fn with_states(n: usize) -> Self {
        let mut states = vec![State::default(); n];
        if let Some(last) = states.last_mut() {
            last.is_final = true;
        }
        Self { states }
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    /// Add `src --tag--> dest` unless that exact transition already exists.
    pub fn add_transition(&mut self, src: StateId, tag: usize, dest: StateId) {
        let t = Transition { tag, dest };
        let transitions = &mut self.states[src].transitions;
        if !transitions.contains(&t) {
            transitions.push(t);
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id]
    }

    pub fn set_final(&mut self, id: StateId, is_final: bool) {
        self.states[id].is_final = is_final;
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Iterate over `(src, transition)` pairs in state order.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &Transition)> {
        self.states
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.transitions.iter().map(move |t| (i, t)))
    }

    /// Replace every transition tag `t` by `f(t)`.
    pub fn relabel<F: FnMut(usize) -> usize>(&mut self, mut f: F) {
        for state in &mut self.states {
            for t in &mut state.transitions {
                t.tag = f(t.tag);
            }
        }
    }

    fn accessible(&self) -> Vec<bool> {
        let mut seen = vec![false; self.states.len()];
        if self.states.is_empty() {
            return seen;
        }
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(s) = stack.pop() {
            for t in &self.states[s].transitions {
                if !seen[t.dest] {
                    seen[t.dest] = true;
                    stack.push(t.dest);
                }
            }
        }
        seen
    }

    fn coaccessible(&self) -> Vec<bool> {
        let n = self.states.len();
        let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for (src, t) in self.transitions() {
            reverse[t.dest].push(src);
        }
        let mut seen = vec![false; n];
        let mut stack: Vec<StateId> = (0..n).filter(|&s| self.states[s].is_final).collect();
        for &s in &stack {
            seen[s] = true;
        }
        while let Some(s) = stack.pop() {
            for &p in &reverse[s] {
                if !seen[p] {
                    seen[p] = true;
                    stack.push(p);
                }
            }
        }
        seen
    }

    /// Keep only the states both reachable from state 0 and reaching a final
    /// state. Remaining states keep their relative order, so state 0 stays
    /// initial. If state 0 itself is useless the automaton becomes empty.
    pub fn trim(&mut self) {
        let acc = self.accessible();
        let coacc = self.coaccessible();
        let keep: Vec<bool> = acc.iter().zip(&coacc).map(|(a, c)| *a && *c).collect();
        if !keep.first().copied().unwrap_or(false) {
            self.states.clear();
            return;
        }
        let mut renumber = vec![usize::MAX; self.states.len()];
        let mut next = 0;
        for (i, &k) in keep.iter().enumerate() {
            if k {
                renumber[i] = next;
                next += 1;
            }
        }
        let old = std::mem::take(&mut self.states);
        self.states = old
            .into_iter()
            .zip(keep)
            .filter(|(_, k)| *k)
            .map(|(mut state, _)| {
                state.transitions.retain(|t| renumber[t.dest] != usize::MAX);
                for t in &mut state.transitions {
                    t.dest = renumber[t.dest];
                }
                state
            })
            .collect();
    }

    /// Merge equivalent states.
    ///
    /// Classes start from the final / non-final split and are refined by the
    /// sorted set of `(tag, destination class)` pairs until stable. The class
    /// of state 0 becomes state 0; the others are numbered by their first
    /// member. Transitions end up sorted and without duplicates.
    pub fn minimize(&mut self) {
        let n = self.states.len();
        if n == 0 {
            return;
        }
        let mut class: Vec<usize> = self.states.iter().map(|s| usize::from(s.is_final)).collect();
        let mut count = 0;
        loop {
            let mut ids: AHashMap<(usize, Vec<(usize, usize)>), usize> = AHashMap::new();
            let mut next = Vec::with_capacity(n);
            for (i, state) in self.states.iter().enumerate() {
                let mut signature: Vec<(usize, usize)> =
                    state.transitions.iter().map(|t| (t.tag, class[t.dest])).collect();
                signature.sort_unstable();
                signature.dedup();
                let fresh = ids.len();
                next.push(*ids.entry((class[i], signature)).or_insert(fresh));
            }
            class = next;
            if ids.len() == count {
                break;
            }
            count = ids.len();
        }

        // class -> new state index, initial class first
        let mut order = vec![usize::MAX; count];
        let mut representative = Vec::with_capacity(count);
        order[class[0]] = 0;
        representative.push(0);
        for (i, &c) in class.iter().enumerate() {
            if order[c] == usize::MAX {
                order[c] = representative.len();
                representative.push(i);
            }
        }

        let states = representative
            .iter()
            .map(|&r| {
                let mut transitions: Vec<Transition> = self.states[r]
                    .transitions
                    .iter()
                    .map(|t| Transition {
                        tag: t.tag,
                        dest: order[class[t.dest]],
                    })
                    .collect();
                transitions.sort_unstable();
                transitions.dedup();
                State {
                    transitions,
                    is_final: self.states[r].is_final,
                    dirty: false,
                }
            })
            .collect();
        self.states = states;
    }

    /// True if no transition path leads from a state back to itself.
    pub fn is_acyclic(&self) -> bool {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut mark = vec![0u8; self.states.len()];
        for root in 0..self.states.len() {
            if mark[root] != 0 {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            mark[root] = 1;
            while let Some(top) = stack.last_mut() {
                let (s, next) = *top;
                top.1 += 1;
                if let Some(t) = self.states[s].transitions.get(next) {
                    match mark[t.dest] {
                        0 => {
                            mark[t.dest] = 1;
                            stack.push((t.dest, 0));
                        }
                        1 => return false,
                        _ => {}
                    }
                } else {
                    mark[s] = 2;
                    stack.pop();
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> SentenceAutomaton {
        let mut a = SentenceAutomaton::with_states(n);
        for i in 0..n - 1 {
            a.add_transition(i, i + 1, i + 1);
        }
        a
    }

    #[test]
    fn duplicate_transitions_are_ignored() {
        let mut a = SentenceAutomaton::with_states(2);
        a.add_transition(0, 1, 1);
        a.add_transition(0, 1, 1);
        assert_eq!(a.transition_count(), 1);
    }

    #[test]
    fn trim_removes_dead_ends() {
        let mut a = chain(3);
        let dead = a.add_state();
        a.add_transition(0, 7, dead);
        let unreachable = a.add_state();
        a.add_transition(unreachable, 8, 2);
        a.trim();
        assert_eq!(a.len(), 3);
        assert_eq!(a.transition_count(), 2);
        assert!(a.state(2).is_final);
    }

    #[test]
    fn trim_keeps_intermediate_states_in_order() {
        let mut a = chain(3);
        let mid = a.add_state();
        a.add_transition(0, 5, mid);
        a.add_transition(mid, 6, 2);
        a.trim();
        assert_eq!(a.len(), 4);
        assert_eq!(a.state(0).transitions.len(), 2);
        assert!(a.transitions().all(|(_, t)| t.dest < a.len()));
    }

    #[test]
    fn trim_can_empty_the_automaton() {
        let mut a = SentenceAutomaton::with_states(3);
        a.add_transition(0, 1, 1);
        a.trim();
        assert!(a.is_empty());
    }

    #[test]
    fn minimize_merges_common_suffixes() {
        // 0 -a-> 1 -c-> 3 ; 0 -b-> 2 -c-> 3
        let mut a = SentenceAutomaton::with_states(4);
        a.add_transition(0, 1, 1);
        a.add_transition(0, 2, 2);
        a.add_transition(1, 3, 3);
        a.add_transition(2, 3, 3);
        a.minimize();
        assert_eq!(a.len(), 3);
        assert_eq!(a.state(0).transitions.len(), 2);
        assert_eq!(a.state(0).transitions[0].dest, a.state(0).transitions[1].dest);
        assert!(a.states().iter().filter(|s| s.is_final).count() == 1);
    }

    #[test]
    fn minimize_keeps_distinct_states() {
        let mut a = chain(4);
        a.minimize();
        assert_eq!(a, chain(4));
    }

    #[test]
    fn acyclicity() {
        let mut a = chain(3);
        assert!(a.is_acyclic());
        a.add_transition(2, 9, 0);
        assert!(!a.is_acyclic());
    }
}
