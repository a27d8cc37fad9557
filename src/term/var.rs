// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Logic variables.

use super::{Term, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_VAR_ID: AtomicUsize = AtomicUsize::new(0);

/// Extension point invoked whenever a variable is about to be bound.
///
/// A `BindCheck` may reject a candidate binding (e.g. a domain-membership
/// check) by returning `false`; when it does, [`crate::unify::unify`]
/// commits no mutation. The default variable constructor installs no
/// check, so ordinary variables accept any binding.
pub type BindCheck<V> = Rc<dyn Fn(&Term<V>) -> bool>;

/// Optional supplier of a variable's default choice set, used by callers
/// that want to build a [`crate::engine::VarChoiceIterator`] without
/// threading the candidate list through separately.
pub type ChoiceSupplier<V> = Rc<dyn Fn() -> Vec<Term<V>>>;

struct VarCell<V: Value> {
    id: usize,
    binding: Option<Term<V>>,
    bind_check: Option<BindCheck<V>>,
    get_choices: Option<ChoiceSupplier<V>>,
}

/// A logic variable: an identity plus a mutable binding slot, initially
/// unbound.
///
/// Cloning a `Var` clones the handle, not the cell — all clones refer to
/// the same variable, which is what lets the engine and user predicates
/// share a variable by passing it around.
pub struct Var<V: Value>(pub(crate) Rc<RefCell<VarCell<V>>>);

impl<V: Value> Var<V> {
    /// Create a fresh, unbound variable with no `bind` override.
    pub fn new() -> Self {
        Self::new_inner(None, None)
    }

    /// Create a fresh, unbound variable whose binding is vetted by `check`.
    ///
    /// `check` is consulted by [`crate::unify::unify`] before committing a
    /// binding; returning `false` makes unification fail without
    /// mutating the trail. This is the Rust realization of "a Variable
    /// subclass may override `bind`" — there being no subclassing, the
    /// override is a capability closure instead.
    pub fn new_with_bind(check: impl Fn(&Term<V>) -> bool + 'static) -> Self {
        Self::new_inner(Some(Rc::new(check)), None)
    }

    /// Create a fresh, unbound variable with both a `bind` override and a
    /// default choice supplier (`get_choices` in `spec.md` §6).
    pub fn new_with_choices(
        check: impl Fn(&Term<V>) -> bool + 'static,
        choices: impl Fn() -> Vec<Term<V>> + 'static,
    ) -> Self {
        Self::new_inner(Some(Rc::new(check)), Some(Rc::new(choices)))
    }

    fn new_inner(bind_check: Option<BindCheck<V>>, get_choices: Option<ChoiceSupplier<V>>) -> Self {
        let id = NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed);
        Self(Rc::new(RefCell::new(VarCell {
            id,
            binding: None,
            bind_check,
            get_choices,
        })))
    }

    /// This variable's debug id.
    pub fn id(&self) -> usize {
        self.0.borrow().id
    }

    /// The variable's string form for debugging: `X` followed by a
    /// zero-padded id, e.g. `X01`, matching the reference convention.
    pub fn debug_name(&self) -> String {
        format!("X{:02}", self.id())
    }

    /// The current binding, if any, without following chains further.
    pub fn binding(&self) -> Option<Term<V>> {
        self.0.borrow().binding.clone()
    }

    /// True iff this variable currently has no binding.
    pub fn is_unbound(&self) -> bool {
        self.0.borrow().binding.is_none()
    }

    /// True iff `self` and `other` are handles to the same variable cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The variable's default choice set, if one was installed.
    pub fn get_choices(&self) -> Option<Vec<Term<V>>> {
        self.0.borrow().get_choices.as_ref().map(|f| f())
    }

    /// Consult this variable's `bind` override, if any. Returns `true`
    /// (accept) when no override was installed.
    pub(crate) fn check_bind(&self, value: &Term<V>) -> bool {
        match &self.0.borrow().bind_check {
            Some(check) => check(value),
            None => true,
        }
    }

    /// Directly set the binding slot, bypassing `bind_check` and the
    /// trail. Used only by [`crate::trail::Trail`] to commit and restore
    /// bindings; user code should go through [`crate::unify::unify`].
    pub(crate) fn set_binding(&self, value: Option<Term<V>>) {
        self.0.borrow_mut().binding = value;
    }
}

impl<V: Value> Clone for Var<V> {
    fn clone(&self) -> Self {
        Var(Rc::clone(&self.0))
    }
}

impl<V: Value> Default for Var<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Value> From<Var<V>> for Term<V> {
    fn from(var: Var<V>) -> Self {
        Term::Var(var)
    }
}

impl<V: Value> fmt::Debug for Var<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.0.borrow();
        write!(f, "{}", self.debug_name())?;
        if let Some(b) = &cell.binding {
            write!(f, "={:?}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_var_is_unbound() {
        let x: Var<i64> = Var::new();
        assert!(x.is_unbound());
        assert!(x.binding().is_none());
    }

    #[test]
    fn clones_share_identity() {
        let x: Var<i64> = Var::new();
        let y = x.clone();
        assert!(x.same_cell(&y));
        y.set_binding(Some(Term::Value(1)));
        assert_eq!(x.binding(), Some(Term::Value(1)));
    }

    #[test]
    fn distinct_vars_do_not_share_identity() {
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        assert!(!x.same_cell(&y));
    }

    #[test]
    fn bind_check_vetoes() {
        let x: Var<i64> = Var::new_with_bind(|t| !matches!(t, Term::Value(5)));
        assert!(!x.check_bind(&Term::Value(5)));
        assert!(x.check_bind(&Term::Value(6)));
    }

    #[test]
    fn debug_name_is_prefixed_and_matches_id() {
        let x: Var<i64> = Var::new();
        assert_eq!(x.debug_name(), format!("X{:02}", x.id()));
    }
}
