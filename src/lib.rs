// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A domain-agnostic engine for search and constraint programming, modeled
//! on the execution machinery of a resolution-based logic language.
//!
//! Users write custom *predicates* (procedures with user-defined choice
//! points) and compose them with the meta-predicates in [`meta`]; the
//! engine in [`engine`] drives them, unifying logic variables, trailing
//! mutations for backtracking, and scheduling alternative choices on
//! failure. The engine makes no domain commitments: there is no built-in
//! finite-domain solver, no arithmetic propagation, and no parallel
//! search. It only supplies variables, unification, a trail, a
//! predicate-dispatch loop, and the handful of combinators that compose
//! predicates into executable trees.
//!
//! # Architecture
//!
//! - [`term`]: the tagged data universe — logic variables, updatable
//!   variables (backtrackable assignments to non-variable values), and
//!   opaque user values.
//! - [`trail`]: an append-only log of undo records, rewindable to any
//!   earlier mark.
//! - [`unify`]: binds variables through the trail and compares ground
//!   terms.
//! - [`engine`]: the predicate protocol ([`engine::Predicate`]), the
//!   choice-iterator protocol ([`engine::Choice`] / [`engine::ChoiceIterator`]),
//!   and the driver ([`engine::Engine`]) that ties them together.
//! - [`meta`]: `conjunct`, `Disjunction`, `Loop`, `once`, and `fail_pred`,
//!   the combinators that build predicate trees out of other predicates.
//! - [`predicates`]: a handful of minimal demonstration predicates
//!   (`UnifyPred`, `AppendPred`) used by the test suite and doc examples.
//!   Real domain predicates are collaborators, not part of this crate.
//!
//! # Example
//!
//! ```
//! use logic_engine::engine::Engine;
//! use logic_engine::term::{Term, Var};
//! use logic_engine::meta::conjunct;
//! use logic_engine::predicates::{UnifyPred, AppendPred};
//!
//! let x: Var<i64> = Var::new();
//! let results = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//!
//! let program = conjunct(vec![
//!     UnifyPred::new(x.clone(), Term::Value(7)),
//!     AppendPred::new(x.clone(), results.clone()),
//! ]);
//!
//! let mut engine: Engine<i64> = Engine::new();
//! assert!(engine.execute(program));
//! assert_eq!(*results.borrow(), vec![7]);
//! // Bindings are undone once execute returns, success or not.
//! assert!(x.is_unbound());
//! ```

pub mod term;
pub mod trail;
pub mod unify;
pub mod engine;
pub mod meta;
pub mod error;
pub mod predicates;

pub use engine::{Choice, ChoiceIterator, Engine, Predicate};
pub use error::EngineError;
pub use meta::{conjunct, fail_pred, once, Disjunction, Loop, LoopFactory};
pub use term::{Term, UpdatableVar, Value, Var};
pub use trail::Trail;
pub use unify::unify;
