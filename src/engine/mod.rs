// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The search engine.
//!
//! [`Engine`] drives a tree of [`Predicate`]s through the four-state loop —
//! `ENTER`, `RETRY`, `SUCCEED`, `FAIL` — that is this crate's central
//! algorithm. It owns the [`Trail`](crate::trail::Trail) and the
//! choice-point stack; predicates own nothing of the engine's and instead
//! receive it as `&mut Engine<V>` through every hook, so there is no
//! hidden global engine singleton for a predicate to reach for.
//!
//! # Example
//!
//! ```
//! use logic_engine::engine::Engine;
//! use logic_engine::term::{Term, Var};
//! use logic_engine::predicates::UnifyPred;
//!
//! let x: Var<i64> = Var::new();
//! let mut engine: Engine<i64> = Engine::new();
//! assert!(engine.execute(UnifyPred::new(x.clone(), Term::Value(1))));
//! assert!(x.is_unbound());
//! ```

mod choice;
mod predicate;

pub use choice::{Choice, ChoiceIterator, VarChoice, VarChoiceIterator};
pub use predicate::{
    pred_ref, DetPred, InitOutcome, MoreChoices, Pred, PredBody, PredCore, PredRef, Predicate,
    SemiDetPred,
};

use crate::error::EngineError;
use crate::term::Value;
use crate::trail::Trail;
use log::{debug, trace};
use std::panic::{self, AssertUnwindSafe};

enum Mode {
    Enter,
    Retry,
    Succeed,
    Fail,
}

struct ChoicePoint<V: Value> {
    predicate: PredRef<V>,
    mark: usize,
}

/// The search driver: owns the trail and the choice-point stack, and runs
/// predicate trees to completion.
///
/// An `Engine` is not reentrant — calling [`Engine::execute`] (directly or
/// through a predicate hook) while another call on the same engine is
/// already running panics (or, through [`Engine::try_execute`], returns
/// [`EngineError::ReentrantExecute`]). One `Engine` drives one search at a
/// time; nested or concurrent searches need their own engines.
pub struct Engine<V: Value> {
    trail: Trail<V>,
    choice_points: Vec<ChoicePoint<V>>,
    running: bool,
}

impl<V: Value> Engine<V> {
    /// Build a fresh engine: empty trail, empty choice-point stack.
    pub fn new() -> Self {
        Self {
            trail: Trail::new(),
            choice_points: Vec::new(),
            running: false,
        }
    }

    /// Mutable access to the trail, for predicates and choices that call
    /// [`crate::unify::unify`] directly.
    pub fn trail(&mut self) -> &mut Trail<V> {
        &mut self.trail
    }

    /// Record a trail mark, equivalent to `engine.trail().mark()`.
    pub fn mark(&self) -> usize {
        self.trail.mark()
    }

    /// Rewind the trail to `mark`, equivalent to `engine.trail().rewind(mark)`.
    pub fn rewind(&mut self, mark: usize) {
        self.trail.rewind(mark);
    }

    /// The number of choice points currently on the stack. Combinators
    /// that implement cut (see [`crate::meta::once`]) record this before
    /// running their body and pass it to [`Engine::cut_to`] afterward.
    pub fn choice_point_depth(&self) -> usize {
        self.choice_points.len()
    }

    /// Discard every choice point pushed since `depth` was recorded,
    /// without touching the trail. This is cut: the bindings those choice
    /// points would have undone on backtracking stay in place, but the
    /// alternatives themselves become unreachable.
    pub fn cut_to(&mut self, depth: usize) {
        self.choice_points.truncate(depth);
    }

    /// Run `root` to its first solution.
    ///
    /// Returns `true` if `root`'s continuation chain ran to completion
    /// (`SUCCEED` propagating past the end of the chain), `false` if every
    /// choice was exhausted without reaching it (`FAIL` with no choice
    /// points left). Either way, the trail and the choice-point stack are
    /// fully reset before this returns — `execute` reports one boolean
    /// outcome, it does not leave a search suspended mid-solution for a
    /// caller to resume.
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly (see [`Engine::try_execute`] for a
    /// fallible form), and propagates any panic raised from inside a
    /// predicate hook after best-effort cleanup (trail and choice-point
    /// stack reset to their state at entry).
    pub fn execute(&mut self, root: PredRef<V>) -> bool {
        match self.try_execute(root) {
            Ok(outcome) => outcome,
            Err(err) => panic!("{err}"),
        }
    }

    /// The fallible form of [`Engine::execute`]: reports reentrant use as
    /// an [`EngineError`] instead of panicking.
    pub fn try_execute(&mut self, root: PredRef<V>) -> Result<bool, EngineError> {
        if self.running {
            return Err(EngineError::ReentrantExecute);
        }
        self.running = true;
        let m0 = self.trail.mark();
        let cp0 = self.choice_points.len();

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(root)));

        // Whatever happened — success, failure, or a panic unwinding
        // through a hook — leave the engine as if this call had never
        // touched it, beyond the outcome itself.
        self.trail.rewind(m0);
        self.choice_points.truncate(cp0);
        self.running = false;

        match result {
            Ok(outcome) => {
                debug!("execute finished: {outcome}");
                Ok(outcome)
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn run(&mut self, root: PredRef<V>) -> bool {
        let mut current = root;
        let mut mode = Mode::Enter;

        loop {
            match mode {
                Mode::Enter => {
                    trace!("ENTER {}", current.borrow().name());
                    let ok = current.borrow_mut().initialize_call(self);
                    mode = if ok { Mode::Retry } else { Mode::Fail };
                }
                Mode::Retry => {
                    let choice_mark = self.trail.mark();
                    let outcome = current.borrow_mut().more_choices(self);
                    trace!("RETRY {} -> {:?}", current.borrow().name(), outcome);
                    match outcome {
                        MoreChoices::Failed => mode = Mode::Fail,
                        MoreChoices::Retryable => {
                            self.choice_points.push(ChoicePoint {
                                predicate: current.clone(),
                                mark: choice_mark,
                            });
                            let ok = current.borrow_mut().test_choice(self);
                            mode = if ok { Mode::Succeed } else { Mode::Fail };
                        }
                        MoreChoices::Final => {
                            let ok = current.borrow_mut().test_choice(self);
                            mode = if ok { Mode::Succeed } else { Mode::Fail };
                        }
                    }
                }
                Mode::Succeed => {
                    trace!("SUCCEED {}", current.borrow().name());
                    let next = current.borrow().continuation();
                    match next {
                        Some(next) => {
                            current = next;
                            mode = Mode::Enter;
                        }
                        None => return true,
                    }
                }
                Mode::Fail => {
                    trace!("FAIL");
                    match self.choice_points.pop() {
                        Some(cp) => {
                            self.trail.rewind(cp.mark);
                            current = cp.predicate;
                            mode = Mode::Retry;
                        }
                        None => return false,
                    }
                }
            }
        }
    }
}

impl<V: Value> Default for Engine<V> {
    fn default() -> Self {
        Self::new()
    }
}
