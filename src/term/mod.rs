// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The term model: logic variables, updatable variables, and opaque user
//! values.
//!
//! A [`Term<V>`] is one of three variants:
//!
//! - [`Term::Var`]: a logic variable, initially unbound, possibly bound to
//!   another term.
//! - [`Term::Updatable`]: a backtrackable cell holding an arbitrary value
//!   that may be reassigned many times, each assignment recorded on the
//!   trail. Distinguished from `Var` so that [`Term::is_var`] never treats
//!   it as unbound.
//! - [`Term::Value`]: an opaque payload the host application provides.
//!   Never introspected by the engine.

mod var;
mod updatable;

pub use updatable::UpdatableVar;
pub use var::Var;

use std::fmt;

/// The universe of opaque user payloads a [`Term`] may carry.
///
/// Blanket-implemented for any type that is cheap to reason about inside
/// the engine: cloned when a term is copied out of a binding, compared
/// structurally during unification, and printed for debugging. The engine
/// never does anything else with a `Value` — it does not match on its
/// shape, so a single concrete `V` per [`crate::engine::Engine`] instance
/// is enough to express any domain without the engine committing to one.
pub trait Value: Clone + fmt::Debug + PartialEq + 'static {}

impl<T: Clone + fmt::Debug + PartialEq + 'static> Value for T {}

/// A term: a logic variable, an updatable variable, or an opaque value.
#[derive(Debug, Clone)]
pub enum Term<V: Value> {
    /// A logic variable.
    Var(Var<V>),
    /// A backtrackable cell holding an arbitrary value.
    Updatable(UpdatableVar<V>),
    /// An opaque, host-supplied payload.
    Value(V),
}

impl<V: Value> Term<V> {
    /// Follow [`Term::Var`] bindings transitively until a non-variable or
    /// an unbound variable is reached.
    ///
    /// `Term::Updatable` is **not** transparent to `deref` in the variable
    /// sense: dereferencing through an updatable variable yields the
    /// updatable variable itself. Its current value is read explicitly via
    /// [`UpdatableVar::get`].
    pub fn deref(&self) -> Term<V> {
        let mut current = self.clone();
        loop {
            match current {
                Term::Var(ref v) => match v.binding() {
                    Some(next) => current = next,
                    None => return current,
                },
                _ => return current,
            }
        }
    }

    /// True iff, after [`Term::deref`], `self` is an unbound variable.
    ///
    /// An [`UpdatableVar`] is never "a variable" in this sense, regardless
    /// of whether its value has been set.
    pub fn is_var(&self) -> bool {
        matches!(self.deref(), Term::Var(ref v) if v.is_unbound())
    }
}

impl<V: Value> PartialEq for Term<V> {
    /// Identity equality for `Var`/`Updatable` (same cell), structural
    /// equality for `Value`. Does **not** dereference first — callers
    /// comparing possibly-bound terms should `deref()` before comparing,
    /// as [`crate::unify::unify`] does internally.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Var(a), Term::Var(b)) => a.same_cell(b),
            (Term::Updatable(a), Term::Updatable(b)) => a.same_cell(b),
            (Term::Value(a), Term::Value(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_is_idempotent_on_unbound_var() {
        let x: Var<i64> = Var::new();
        let t = Term::Var(x);
        assert_eq!(t.deref(), t.deref().deref());
    }

    #[test]
    fn deref_is_idempotent_on_value() {
        let t: Term<i64> = Term::Value(42);
        assert_eq!(t.deref(), t.deref().deref());
    }

    #[test]
    fn unbound_var_is_var() {
        let x: Var<i64> = Var::new();
        assert!(Term::Var(x).is_var());
    }

    #[test]
    fn value_is_not_var() {
        let t: Term<i64> = Term::Value(1);
        assert!(!t.is_var());
    }

    #[test]
    fn updatable_is_never_var() {
        let u: UpdatableVar<i64> = UpdatableVar::new(0);
        assert!(!Term::Updatable(u).is_var());
    }
}
