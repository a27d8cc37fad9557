// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Unification over the term model in [`crate::term`].
//!
//! `unify` operates on dereferenced terms and follows the precedence table
//! in `spec.md` §4.1 exactly:
//!
//! | case | action |
//! |---|---|
//! | both the same variable | nothing, success |
//! | `a` unbound variable | bind `a` → `b` through the trail |
//! | `b` unbound variable (and `a` not) | bind `b` → `a` through the trail |
//! | `a` is an updatable variable | record `a`'s current value, set it to `b` |
//! | neither is a variable | structural equality on user values |
//!
//! Unification never recurses into compound user values — `Value`
//! payloads are opaque to the engine and compared by host-language
//! equality. A predicate that wants structural unification over compound
//! terms (tuples, lists) builds it out of repeated `unify` calls itself.
//!
//! The table is intentionally asymmetric in the updatable-variable case,
//! exactly as `spec.md` states it: `unify(updatable, x)` updates the
//! updatable variable, but `unify(x, updatable)` does not, unless `x`
//! itself derefs to a variable (handled by the variable-binding arms,
//! which run first). Callers who want the symmetric behavior should name
//! the updatable variable first.
//!
//! The `occurs_check` feature gates a self-reference guard in `bind`
//! (see `occurs` below) — the narrow slice of occurs-checking this crate
//! can do given `Value` is opaque to it. Off by default, per `spec.md` §9.

use crate::term::{Term, Value, Var};
use crate::trail::Trail;
use log::trace;

/// Unify `a` and `b`, committing any bindings through `trail`.
///
/// Returns `false` without committing any mutation when unification
/// fails — including when a variable's `bind` override vetoes a candidate
/// binding (`spec.md` §4.1: "When `bind` returns failure, no mutation has
/// been committed").
pub fn unify<V: Value>(a: &Term<V>, b: &Term<V>, trail: &mut Trail<V>) -> bool {
    let da = a.deref();
    let db = b.deref();

    let result = match (&da, &db) {
        (Term::Var(va), Term::Var(vb)) if va.same_cell(vb) => true,
        (Term::Var(va), _) => bind(va, &db, trail),
        (_, Term::Var(vb)) => bind(vb, &da, trail),
        (Term::Updatable(u), _) => {
            trail.record_updatable(u, db.clone());
            true
        }
        (Term::Value(x), Term::Value(y)) => x == y,
        _ => false,
    };

    trace!("unify({da:?}, {db:?}) -> {result}");
    result
}

/// Bind `var` to `value` through the trail, honoring its `bind` override.
fn bind<V: Value>(var: &Var<V>, value: &Term<V>, trail: &mut Trail<V>) -> bool {
    #[cfg(feature = "occurs_check")]
    if occurs(var, value) {
        return false;
    }
    if !var.check_bind(value) {
        return false;
    }
    trail.record_var_binding(var, value.clone());
    true
}

/// The narrow occurs check behind the `occurs_check` feature: refuses to
/// bind `var` to itself.
///
/// `spec.md` §9 notes that a full occurs check is out of scope ("no
/// occurs check... users who need it must enforce it in their
/// predicates"); `Value` is opaque to this crate (`spec.md` §3.1 — "not
/// introspected by the engine"), so there is no way to look for `var`
/// nested inside a compound `Value` payload. This only catches the
/// self-reference case, which `unify`'s same-identity arm already routes
/// around before ever calling `bind` — so with the feature on, this is a
/// redundant, always-false-at-the-only-call-site safety net, not a
/// general occurs check.
#[cfg(feature = "occurs_check")]
fn occurs<V: Value>(var: &Var<V>, value: &Term<V>) -> bool {
    matches!(value.deref(), Term::Var(ref v) if v.same_cell(var))
}

#[cfg(all(test, feature = "occurs_check"))]
mod occurs_check_tests {
    use super::*;

    #[test]
    fn occurs_detects_self_reference() {
        let x: Var<i64> = Var::new();
        assert!(occurs(&x, &Term::Var(x.clone())));
    }

    #[test]
    fn occurs_is_false_for_a_distinct_variable() {
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        assert!(!occurs(&x, &Term::Var(y)));
    }

    #[test]
    fn bind_rejects_a_variable_bound_to_itself() {
        // Unreachable through `unify`, which routes the same-identity
        // case around `bind` entirely (see `occurs`'s doc comment); this
        // exercises `bind`'s own guard directly.
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        let m = trail.mark();
        assert!(!bind(&x, &Term::Var(x.clone()), &mut trail));
        assert_eq!(trail.mark(), m);
        assert!(x.is_unbound());
    }

    #[test]
    fn unify_of_distinct_variables_is_unaffected_by_the_feature() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        assert!(unify(&Term::Var(x.clone()), &Term::Var(y.clone()), &mut trail));
    }
}

/// `spec.md` §6's `dereference(t)`: an alias for [`Term::deref`].
pub fn dereference<V: Value>(t: &Term<V>) -> Term<V> {
    t.deref()
}

/// `spec.md` §6's `var(t)`: an alias for [`Term::is_var`].
pub fn var<V: Value>(t: &Term<V>) -> bool {
    t.is_var()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_binds_unbound_left_var() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        assert!(unify(&Term::Var(x.clone()), &Term::Value(7), &mut trail));
        assert_eq!(dereference(&Term::Var(x)), Term::Value(7));
    }

    #[test]
    fn unify_binds_unbound_right_var() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        assert!(unify(&Term::Value(7), &Term::Var(x.clone()), &mut trail));
        assert_eq!(dereference(&Term::Var(x)), Term::Value(7));
    }

    #[test]
    fn unify_same_var_is_a_no_op_success() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        let m = trail.mark();
        assert!(unify(&Term::Var(x.clone()), &Term::Var(x.clone()), &mut trail));
        assert_eq!(trail.mark(), m);
    }

    #[test]
    fn unify_equal_values_succeeds_without_trailing() {
        let mut trail: Trail<i64> = Trail::new();
        let m = trail.mark();
        assert!(unify(&Term::Value(3), &Term::Value(3), &mut trail));
        assert_eq!(trail.mark(), m);
    }

    #[test]
    fn unify_unequal_values_fails_without_trailing() {
        let mut trail: Trail<i64> = Trail::new();
        let m = trail.mark();
        assert!(!unify(&Term::Value(3), &Term::Value(4), &mut trail));
        assert_eq!(trail.mark(), m);
    }

    #[test]
    fn unify_and_rewind_restores_prior_state() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        let m = trail.mark();

        assert!(unify(&Term::Var(x.clone()), &Term::Var(y.clone()), &mut trail));
        assert!(!x.is_unbound() || !y.is_unbound());

        trail.rewind(m);
        assert!(x.is_unbound());
        assert!(y.is_unbound());
    }

    #[test]
    fn bind_veto_leaves_trail_untouched() {
        let mut trail: Trail<i64> = Trail::new();
        let x: Var<i64> = Var::new_with_bind(|t| !matches!(t, Term::Value(5)));
        let m = trail.mark();

        assert!(!unify(&Term::Var(x.clone()), &Term::Value(5), &mut trail));
        assert_eq!(trail.mark(), m);
        assert!(x.is_unbound());

        assert!(unify(&Term::Var(x.clone()), &Term::Value(6), &mut trail));
        assert_eq!(dereference(&Term::Var(x)), Term::Value(6));
    }

    #[test]
    fn updatable_unify_records_and_rewinds() {
        let mut trail: Trail<i64> = Trail::new();
        let u: crate::term::UpdatableVar<i64> = crate::term::UpdatableVar::new(0i64);
        let m = trail.mark();

        assert!(unify(&Term::Updatable(u.clone()), &Term::Value(1), &mut trail));
        assert_eq!(u.get(), Term::Value(1));

        trail.rewind(m);
        assert_eq!(u.get(), Term::Value(0));
    }
}
