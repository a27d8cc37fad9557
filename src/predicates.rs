// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A handful of minimal predicates used by this crate's own tests and doc
//! examples.
//!
//! These are not meant to be a predicate library — a real caller's
//! domain predicates live in their own crate and are built the way
//! [`crate::engine::Predicate`]'s documentation describes. `UnifyPred`
//! and `AppendPred` exist here only so the engine's own test suite has
//! something small and obviously correct to assemble into programs.

use crate::engine::{DetPred, Engine, PredRef, SemiDetPred};
use crate::term::{Term, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Unify two terms once. Fails if they do not unify; offers no
/// alternatives either way.
pub struct UnifyPred;

impl UnifyPred {
    /// Build a predicate that unifies `a` with `b` when run.
    pub fn new<V: Value>(a: impl Into<Term<V>>, b: impl Into<Term<V>>) -> PredRef<V> {
        let a = a.into();
        let b = b.into();
        SemiDetPred::new("unify", move |engine: &mut Engine<V>| {
            crate::unify::unify(&a, &b, engine.trail())
        })
    }
}

/// Append the current value of `term` to a shared `Vec`, for observing
/// what a search actually bound along the way.
///
/// Fails if `term` does not dereference to a concrete [`Term::Value`] —
/// there being nothing to append otherwise.
pub struct AppendPred;

impl AppendPred {
    /// Build a predicate that appends `term`'s dereferenced value to
    /// `results` when run.
    pub fn new<V: Value>(term: impl Into<Term<V>>, results: Rc<RefCell<Vec<V>>>) -> PredRef<V> {
        let term = term.into();
        DetPred::new("append", move |_engine: &mut Engine<V>| match term.deref() {
            Term::Value(v) => {
                results.borrow_mut().push(v);
                true
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::conjunct;
    use crate::term::Var;

    #[test]
    fn unify_pred_succeeds_and_binds() {
        let x: Var<i64> = Var::new();
        let mut engine: Engine<i64> = Engine::new();
        assert!(engine.execute(UnifyPred::new(x.clone(), Term::Value(5))));
        // Bindings are undone once execute returns.
        assert!(x.is_unbound());
    }

    #[test]
    fn unify_pred_fails_on_mismatched_values() {
        let mut engine: Engine<i64> = Engine::new();
        assert!(!engine.execute(UnifyPred::new(Term::Value(1), Term::Value(2))));
    }

    #[test]
    fn append_pred_collects_bound_values_in_order() {
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        let results = Rc::new(RefCell::new(Vec::new()));
        let mut engine: Engine<i64> = Engine::new();
        let program = conjunct(vec![
            UnifyPred::new(x.clone(), Term::Value(1)),
            UnifyPred::new(y.clone(), Term::Value(2)),
            AppendPred::new(x.clone(), results.clone()),
            AppendPred::new(y.clone(), results.clone()),
        ]);
        assert!(engine.execute(program));
        assert_eq!(*results.borrow(), vec![1, 2]);
    }

    #[test]
    fn append_pred_fails_on_unbound_term() {
        let x: Var<i64> = Var::new();
        let results = Rc::new(RefCell::new(Vec::new()));
        let mut engine: Engine<i64> = Engine::new();
        assert!(!engine.execute(AppendPred::new(x, results.clone())));
        assert!(results.borrow().is_empty());
    }
}
