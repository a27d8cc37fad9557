// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Choice points: the means by which a predicate offers the engine more
//! than one way to succeed.
//!
//! A predicate that needs backtrackable alternatives installs a
//! [`ChoiceIterator`] during [`crate::engine::Predicate::initialize_call`].
//! On each retry, the engine pulls the next [`Choice`] from that iterator
//! and asks it to `apply`; applying a choice is where the actual mutation
//! — typically a [`crate::unify::unify`] call — happens, so that it is
//! trailed and undone automatically when the engine backtracks past it.

use super::Engine;
use crate::term::Value;
use std::fmt;

/// One concrete alternative offered by a [`ChoiceIterator`].
///
/// `apply` performs whatever mutation this alternative represents —
/// almost always a unification — and reports whether it succeeded. A
/// `Choice` is consumed the moment it is applied; it is never reused.
pub trait Choice<V: Value>: fmt::Debug {
    /// Commit this choice's mutation through `engine`'s trail.
    fn apply(&mut self, engine: &mut Engine<V>) -> bool;
}

/// A source of [`Choice`]s, pulled lazily one at a time as the engine
/// backtracks into a predicate.
///
/// Lazy rather than a pre-built `Vec`: some choice sets (an unbounded
/// generator, a supply keyed off an updatable variable's current value)
/// are not economical, or not possible, to materialize up front.
pub trait ChoiceIterator<V: Value> {
    /// Produce the next alternative, or `None` when exhausted.
    fn next_choice(&mut self) -> Option<Box<dyn Choice<V>>>;
}

/// A [`Choice`] that unifies a fixed variable against one candidate term.
///
/// This is the common case — "try binding this variable to each of these
/// values in turn" — spelled out once so predicates do not each hand-roll
/// it; see `spec.md` §6's `VarChoice`/`VarChoiceIterator`.
pub struct VarChoice<V: Value> {
    var: crate::term::Var<V>,
    candidate: crate::term::Term<V>,
}

impl<V: Value> VarChoice<V> {
    /// Build a choice that unifies `var` with `candidate` when applied.
    pub fn new(var: crate::term::Var<V>, candidate: crate::term::Term<V>) -> Self {
        Self { var, candidate }
    }
}

impl<V: Value> fmt::Debug for VarChoice<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarChoice({:?} = {:?})", self.var, self.candidate)
    }
}

impl<V: Value> Choice<V> for VarChoice<V> {
    fn apply(&mut self, engine: &mut Engine<V>) -> bool {
        crate::unify::unify(
            &crate::term::Term::Var(self.var.clone()),
            &self.candidate,
            engine.trail(),
        )
    }
}

/// A [`ChoiceIterator`] that offers a fixed variable each term from a
/// candidate list, in order, one per retry.
pub struct VarChoiceIterator<V: Value> {
    var: crate::term::Var<V>,
    candidates: std::vec::IntoIter<crate::term::Term<V>>,
}

impl<V: Value> VarChoiceIterator<V> {
    /// Build an iterator offering `var` each of `candidates` in turn.
    pub fn new(var: crate::term::Var<V>, candidates: Vec<crate::term::Term<V>>) -> Self {
        Self {
            var,
            candidates: candidates.into_iter(),
        }
    }
}

impl<V: Value> ChoiceIterator<V> for VarChoiceIterator<V> {
    fn next_choice(&mut self) -> Option<Box<dyn Choice<V>>> {
        self.candidates
            .next()
            .map(|candidate| Box::new(VarChoice::new(self.var.clone(), candidate)) as Box<dyn Choice<V>>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Term, Var};

    #[test]
    fn var_choice_iterator_offers_candidates_in_order() {
        let x: Var<i64> = Var::new();
        let mut it = VarChoiceIterator::new(
            x.clone(),
            vec![Term::Value(1), Term::Value(2), Term::Value(3)],
        );
        let mut engine: Engine<i64> = Engine::new();

        let mut first = it.next_choice().expect("first choice");
        assert!(first.apply(&mut engine));
        assert_eq!(x.binding(), Some(Term::Value(1)));

        engine.trail().rewind(0);
        let mut second = it.next_choice().expect("second choice");
        assert!(second.apply(&mut engine));
        assert_eq!(x.binding(), Some(Term::Value(2)));
    }

    #[test]
    fn var_choice_iterator_exhausts() {
        let x: Var<i64> = Var::new();
        let mut it = VarChoiceIterator::new(x, vec![Term::Value(1)]);
        assert!(it.next_choice().is_some());
        assert!(it.next_choice().is_none());
    }
}
