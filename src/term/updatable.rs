// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Updatable variables: backtrackable cells for arbitrary values.

use super::{Term, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_UPDATABLE_ID: AtomicUsize = AtomicUsize::new(0);

/// A cell that may be reassigned many times over the life of a search,
/// each assignment recorded on the trail and undone in last-in-first-out
/// order on backtracking.
///
/// The slot carries an arbitrary *term* — not just a bare value — so an
/// updatable variable can hold a variable, another updatable variable, or
/// an opaque value, per `spec.md` §3.1 ("any term including a tuple/list
/// of user choice").
///
/// Distinguished from [`crate::term::Var`] so that [`crate::term::Term::is_var`]
/// never treats it as an unbound variable, even before its value has ever
/// been set explicitly.
pub struct UpdatableVar<V: Value>(pub(crate) Rc<RefCell<UpdatableCell<V>>>);

pub(crate) struct UpdatableCell<V: Value> {
    pub(crate) id: usize,
    pub(crate) value: Term<V>,
}

impl<V: Value> UpdatableVar<V> {
    /// Create a new updatable variable holding the given initial term.
    pub fn new(initial_value: impl Into<Term<V>>) -> Self {
        let id = NEXT_UPDATABLE_ID.fetch_add(1, Ordering::Relaxed);
        Self(Rc::new(RefCell::new(UpdatableCell {
            id,
            value: initial_value.into(),
        })))
    }

    /// This updatable variable's debug id.
    pub fn id(&self) -> usize {
        self.0.borrow().id
    }

    /// Read the current value explicitly. `deref` never does this for you
    /// — `Term::Updatable` is opaque to dereferencing.
    pub fn get(&self) -> Term<V> {
        self.0.borrow().value.clone()
    }

    /// True iff `self` and `other` are handles to the same cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Directly overwrite the value slot, bypassing the trail. Used only
    /// by [`crate::trail::Trail`] to commit and restore values; user code
    /// should go through [`crate::unify::unify`].
    pub(crate) fn set(&self, value: Term<V>) {
        self.0.borrow_mut().value = value;
    }
}

impl<V: Value> Clone for UpdatableVar<V> {
    fn clone(&self) -> Self {
        UpdatableVar(Rc::clone(&self.0))
    }
}

impl<V: Value> fmt::Debug for UpdatableVar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{:02}={:?}", self.id(), self.get())
    }
}

impl<V: Value> From<V> for Term<V> {
    fn from(value: V) -> Self {
        Term::Value(value)
    }
}
