// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking.
//!
//! The trail is an append-only log of undo records. Each record knows how
//! to restore exactly one cell — a variable's binding slot or an
//! updatable variable's value slot — to its prior state. A *choice point*
//! records a trail length (a "mark"); rewinding to that mark pops entries
//! and applies their restorations in strictly reverse order until the
//! trail is back to that length.
//!
//! Unlike the teacher's `u64`-pointer trail (which trades generality for
//! raw speed over a fixed, packed domain), this trail is a tagged-variant
//! stack over the generic term model, per the Design Notes' explicit
//! preference ("model as a tagged-variant stack ... not as a list of
//! closures, to remain allocation-light").

use crate::term::{Term, UpdatableVar, Value, Var};
use log::trace;

enum TrailEntry<V: Value> {
    VarBinding(Var<V>, Option<Term<V>>),
    UpdatableValue(UpdatableVar<V>, Term<V>),
}

/// An append-only log of undo records, rewindable to any earlier mark.
#[derive(Default)]
pub struct Trail<V: Value> {
    entries: Vec<TrailEntry<V>>,
}

impl<V: Value> Trail<V> {
    /// Create a new, empty trail.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Return the current trail length. Pass the result to [`Trail::rewind`]
    /// later to undo everything recorded since this call.
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    /// The number of entries currently on the trail. Equivalent to
    /// `mark()`, exposed under the name used in `spec.md` §3.3/§8.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff no entries have been recorded (or all have been rewound).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record that `var`'s binding slot is about to change from `prior`,
    /// and commit the change to `var` itself.
    ///
    /// Crate-internal: only [`crate::unify::unify`] (and tests) should
    /// call this — any other direct mutation of a variable's binding slot
    /// would not be trailed, violating the rewind invariants in `spec.md`
    /// §3.2.
    pub(crate) fn record_var_binding(&mut self, var: &Var<V>, new_value: Term<V>) {
        let prior = var.binding();
        var.set_binding(Some(new_value));
        self.entries.push(TrailEntry::VarBinding(var.clone(), prior));
    }

    /// Record that `updatable`'s value slot is about to change from its
    /// current value, and commit `new_value`.
    pub(crate) fn record_updatable(&mut self, updatable: &UpdatableVar<V>, new_value: Term<V>) {
        let prior = updatable.get();
        updatable.set(new_value);
        self.entries
            .push(TrailEntry::UpdatableValue(updatable.clone(), prior));
    }

    /// Rewind the trail to `mark`, restoring every cell touched since that
    /// mark to its prior state, in strictly reverse order.
    ///
    /// `mark` must be a value previously returned by [`Trail::mark`] (or
    /// `len`) on this trail; rewinding to a mark greater than the current
    /// length is a no-op.
    pub fn rewind(&mut self, mark: usize) {
        while self.entries.len() > mark {
            match self.entries.pop().expect("checked non-empty above") {
                TrailEntry::VarBinding(var, prior) => var.set_binding(prior),
                TrailEntry::UpdatableValue(updatable, prior) => updatable.set(prior),
            }
        }
        trace!("trail rewound to mark {mark}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_rewind_restore_var_binding() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();

        let m = trail.mark();
        trail.record_var_binding(&x, Term::Value(7));
        assert_eq!(x.binding(), Some(Term::Value(7)));
        assert_eq!(trail.len(), m + 1);

        trail.rewind(m);
        assert!(x.is_unbound());
        assert_eq!(trail.len(), m);
    }

    #[test]
    fn mark_and_rewind_restore_updatable_value() {
        let mut trail: Trail<i64> = Trail::new();
        let u: UpdatableVar<i64> = UpdatableVar::new(0i64);

        let m = trail.mark();
        trail.record_updatable(&u, Term::Value(1));
        trail.record_updatable(&u, Term::Value(2));
        assert_eq!(u.get(), Term::Value(2));

        trail.rewind(m);
        assert_eq!(u.get(), Term::Value(0));
    }

    #[test]
    fn nested_marks_rewind_in_lifo_order() {
        let mut trail: Trail<i64> = Trail::new();
        let u: UpdatableVar<i64> = UpdatableVar::new(0i64);

        trail.record_updatable(&u, Term::Value(1));
        let cp1 = trail.mark();
        trail.record_updatable(&u, Term::Value(2));
        let cp2 = trail.mark();
        trail.record_updatable(&u, Term::Value(3));

        assert_eq!(u.get(), Term::Value(3));
        trail.rewind(cp2);
        assert_eq!(u.get(), Term::Value(2));
        trail.rewind(cp1);
        assert_eq!(u.get(), Term::Value(1));
        trail.rewind(0);
        assert_eq!(u.get(), Term::Value(0));
    }

    #[test]
    fn rewind_restores_chain_of_var_bindings_in_reverse() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();

        let m = trail.mark();
        trail.record_var_binding(&x, Term::Var(y.clone()));
        trail.record_var_binding(&y, Term::Value(9));

        assert_eq!(y.binding(), Some(Term::Value(9)));
        trail.rewind(m);
        assert!(x.is_unbound());
        assert!(y.is_unbound());
    }
}
