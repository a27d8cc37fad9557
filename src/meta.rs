// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Meta-predicates: combinators that build bigger predicate trees out of
//! smaller ones.
//!
//! None of these know anything about a particular domain — they only
//! manipulate the continuation links and choice-point protocol described
//! in [`crate::engine`]. A caller assembles a search with `conjunct` and
//! [`Disjunction`] the way they'd write `,` and `;` in a resolution-based
//! logic language, with [`Loop`] standing in for explicit iteration and
//! [`once`] for a single, committed solution.

use crate::engine::{
    pred_ref, Choice, ChoiceIterator, DetPred, Engine, InitOutcome, MoreChoices, Pred, PredBody,
    PredCore, PredRef, Predicate,
};
use crate::term::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Walk `p`'s continuation chain to its end.
///
/// Dispatches through [`Predicate::continuation`], so it correctly treats
/// a not-yet-entered [`Disjunction`] or [`Loop`] as its own tail rather
/// than reaching into state ([`Disjunction::selected`]/[`Loop::selected`])
/// that does not exist until the engine actually runs them — attaching a
/// continuation to one of those predicates instead routes through their
/// own [`Predicate::set_continuation`] override, which is exactly what
/// composing combinators needs.
fn tail_of<V: Value>(p: &PredRef<V>) -> PredRef<V> {
    let mut current = p.clone();
    loop {
        let next = current.borrow().continuation();
        match next {
            Some(n) => current = n,
            None => return current,
        }
    }
}

/// Chain `preds` to run in sequence: each must succeed before the next is
/// attempted, and failure anywhere backtracks into the previous one's
/// alternatives, exactly as a resolution-based language's `,` does.
///
/// Associative by construction: `conjunct(vec![conjunct(vec![p, q]), r])`
/// produces the same continuation chain as `conjunct(vec![p, q, r])`,
/// because building the outer conjunction walks to the *tail* of each
/// argument's existing chain before splicing in the next one, rather than
/// overwriting that argument's own continuation outright.
///
/// # Panics
///
/// Panics if `preds` is empty — there is no predicate to return.
pub fn conjunct<V: Value>(preds: Vec<PredRef<V>>) -> PredRef<V> {
    let mut iter = preds.into_iter();
    let first = iter.next().expect("conjunct requires at least one predicate");
    let mut tail = tail_of(&first);
    for next in iter {
        tail.borrow_mut().set_continuation(Some(next.clone()));
        tail = tail_of(&next);
    }
    first
}

/// A predicate that always fails, offering no alternatives.
///
/// Useful at the end of a conjunction built purely to drive a
/// [`Disjunction`]'s choice iterator to exhaustion and collect every
/// alternative it offers (see the `AppendPred` + `fail_pred` idiom in the
/// test suite).
pub fn fail_pred<V: Value>() -> PredRef<V> {
    DetPred::new("fail", |_engine: &mut Engine<V>| false)
}

/// A choice among alternative predicate trees — `;` in a resolution-based
/// language's terms. Tries `alternatives[0]` first; on backtracking into
/// the disjunction, tries `alternatives[1]`, and so on, until one
/// succeeds or all are exhausted.
///
/// The engine only ever has one continuation slot per predicate, but a
/// disjunction needs to hand a *different* predicate to the engine's
/// `SUCCEED` step depending which alternative is currently active. It
/// resolves that by keeping its externally-visible continuation (set via
/// [`Predicate::set_continuation`]) separate from the branch it reports
/// through [`Predicate::continuation`]: the former is remembered as
/// `final_continuation` and spliced onto whichever branch is selected;
/// the latter always reports that branch.
pub struct Disjunction<V: Value> {
    core: PredCore<V>,
    alternatives: Vec<PredRef<V>>,
    next_index: usize,
    final_continuation: Option<PredRef<V>>,
    selected: Option<PredRef<V>>,
}

impl<V: Value> Disjunction<V> {
    /// Build a disjunction over `alternatives`, tried in order.
    ///
    /// # Panics
    ///
    /// Panics if `alternatives` is empty.
    pub fn new(alternatives: Vec<PredRef<V>>) -> PredRef<V> {
        assert!(
            !alternatives.is_empty(),
            "Disjunction requires at least one alternative"
        );
        pred_ref(Self {
            core: PredCore::new(),
            alternatives,
            next_index: 0,
            final_continuation: None,
            selected: None,
        })
    }

    fn select(&mut self, index: usize) {
        let branch = self.alternatives[index].clone();
        let tail = tail_of(&branch);
        tail.borrow_mut().set_continuation(self.final_continuation.clone());
        self.selected = Some(branch);
    }
}

impl<V: Value> fmt::Debug for Disjunction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Disjunction({} alternatives)", self.alternatives.len())
    }
}

impl<V: Value> Predicate<V> for Disjunction<V> {
    fn core(&self) -> &PredCore<V> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PredCore<V> {
        &mut self.core
    }

    fn more_choices(&mut self, _engine: &mut Engine<V>) -> MoreChoices {
        if self.next_index >= self.alternatives.len() {
            return MoreChoices::Failed;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.select(index);
        if self.next_index >= self.alternatives.len() {
            MoreChoices::Final
        } else {
            MoreChoices::Retryable
        }
    }

    fn continuation(&self) -> Option<PredRef<V>> {
        self.selected.clone()
    }

    fn set_continuation(&mut self, next: Option<PredRef<V>>) {
        self.final_continuation = next;
    }

    fn name(&self) -> &'static str {
        "Disjunction"
    }
}

/// Decides, for a [`Loop`], whether another iteration runs and what
/// predicate tree that iteration executes.
pub trait LoopFactory<V: Value> {
    /// Should the loop run another iteration?
    fn loop_continues(&mut self, engine: &mut Engine<V>) -> bool;

    /// Build the predicate tree for the next iteration's body. Its own
    /// continuation is wired by the loop, not by this method.
    fn make_body_pred(&mut self, engine: &mut Engine<V>) -> PredRef<V>;
}

/// Bounded iteration: re-enters a fresh body, built by a [`LoopFactory`],
/// for as long as the factory says to continue, then falls through to
/// whatever continuation was attached to the loop itself.
///
/// Implemented by wiring each iteration's body continuation back to the
/// loop predicate itself — a cycle in the predicate tree, built with
/// [`Rc::new_cyclic`] so the loop can refer to its own [`PredRef`] without
/// a chicken-and-egg construction order. Each re-entry runs `ENTER` on the
/// loop again, which asks the factory whether to continue.
pub struct Loop<V: Value, F> {
    core: PredCore<V>,
    factory: F,
    final_continuation: Option<PredRef<V>>,
    selected: Option<PredRef<V>>,
    self_ref: Weak<RefCell<Loop<V, F>>>,
}

impl<V: Value, F: LoopFactory<V> + 'static> Loop<V, F> {
    /// Build a loop driven by `factory`.
    pub fn new(factory: F) -> PredRef<V> {
        let rc: Rc<RefCell<Self>> = Rc::new_cyclic(|weak| {
            RefCell::new(Self {
                core: PredCore::new(),
                factory,
                final_continuation: None,
                selected: None,
                self_ref: weak.clone(),
            })
        });
        rc
    }
}

impl<V: Value, F> fmt::Debug for Loop<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loop")
    }
}

impl<V: Value, F: LoopFactory<V> + 'static> Predicate<V> for Loop<V, F> {
    fn core(&self) -> &PredCore<V> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PredCore<V> {
        &mut self.core
    }

    fn more_choices(&mut self, engine: &mut Engine<V>) -> MoreChoices {
        if self.factory.loop_continues(engine) {
            let body = self.factory.make_body_pred(engine);
            let tail = tail_of(&body);
            let self_pred = self
                .self_ref
                .upgrade()
                .expect("Loop predicate dropped while its own search was still running");
            tail.borrow_mut().set_continuation(Some(self_pred));
            self.selected = Some(body);
        } else {
            self.selected = self.final_continuation.clone();
        }
        MoreChoices::Final
    }

    fn continuation(&self) -> Option<PredRef<V>> {
        self.selected.clone()
    }

    fn set_continuation(&mut self, next: Option<PredRef<V>>) {
        self.final_continuation = next;
    }

    fn name(&self) -> &'static str {
        "Loop"
    }
}

/// Commit to the first solution of `pred`, discarding every alternative
/// it could otherwise have offered on backtracking — `!`/cut scoped to a
/// single goal in a resolution-based language's terms.
///
/// Not literally specified beyond "engines typically support cut or
/// equivalent commitment"; implemented the standard way: a barrier
/// predicate records the choice-point depth on entry, `pred` runs
/// normally (possibly pushing its own choice points), and once it
/// succeeds, a second predicate truncates the choice-point stack back to
/// the recorded depth via [`Engine::cut_to`]. The trail is untouched —
/// only the *alternatives* become unreachable, not the bindings already
/// made.
pub fn once<V: Value>(pred: PredRef<V>) -> PredRef<V> {
    let depth = Rc::new(Cell::new(0usize));
    let record_depth = depth.clone();
    let cut_depth = depth;

    let barrier = DetPred::new("once_barrier", move |engine: &mut Engine<V>| {
        record_depth.set(engine.choice_point_depth());
        true
    });
    let cut = DetPred::new("once_cut", move |engine: &mut Engine<V>| {
        engine.cut_to(cut_depth.get());
        true
    });
    conjunct(vec![barrier, pred, cut])
}

/// A [`PredBody`]/[`ChoiceIterator`] pair wired together for the common
/// case of "offer these concrete choices, built eagerly" — used by
/// [`crate::predicates`] and available for domain predicates that do not
/// need [`VarChoiceIterator`](crate::engine::VarChoiceIterator)'s
/// single-variable specialization.
pub struct ChoicesBody<V: Value> {
    choices: Option<Vec<Box<dyn Choice<V>>>>,
}

impl<V: Value> ChoicesBody<V> {
    /// Build a body that offers exactly `choices`, in order.
    pub fn new(choices: Vec<Box<dyn Choice<V>>>) -> Self {
        Self {
            choices: Some(choices),
        }
    }
}

impl<V: Value> PredBody<V> for ChoicesBody<V> {
    fn initialize(&mut self, _engine: &mut Engine<V>) -> InitOutcome<V> {
        match self.choices.take() {
            Some(choices) if !choices.is_empty() => {
                InitOutcome::Choices(Box::new(VecChoiceIterator(choices.into_iter())))
            }
            _ => InitOutcome::Fail,
        }
    }
}

struct VecChoiceIterator<V: Value>(std::vec::IntoIter<Box<dyn Choice<V>>>);

impl<V: Value> ChoiceIterator<V> for VecChoiceIterator<V> {
    fn next_choice(&mut self) -> Option<Box<dyn Choice<V>>> {
        self.0.next()
    }
}

/// Build a predicate that offers each of `choices` in order, via
/// [`Pred`]/[`ChoicesBody`].
pub fn choice_pred<V: Value>(name: &'static str, choices: Vec<Box<dyn Choice<V>>>) -> PredRef<V> {
    Pred::new(name, ChoicesBody::new(choices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{AppendPred, UnifyPred};
    use crate::term::{Term, Var};
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn conjunct_of_conjuncts_is_associative() {
        let results = Rc::new(StdRefCell::new(Vec::new()));
        let x: Var<i64> = Var::new();
        let y: Var<i64> = Var::new();
        let z: Var<i64> = Var::new();

        let inner = conjunct(vec![
            UnifyPred::new(x.clone(), Term::Value(1)),
            UnifyPred::new(y.clone(), Term::Value(2)),
        ]);
        let outer = conjunct(vec![
            inner,
            UnifyPred::new(z.clone(), Term::Value(3)),
            AppendPred::new(x.clone(), results.clone()),
            AppendPred::new(y.clone(), results.clone()),
            AppendPred::new(z.clone(), results.clone()),
        ]);

        let mut engine: crate::engine::Engine<i64> = crate::engine::Engine::new();
        assert!(engine.execute(outer));
        assert_eq!(*results.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn once_discards_alternatives_after_first_success() {
        let x: Var<i64> = Var::new();
        let results = Rc::new(StdRefCell::new(Vec::new()));
        let choices = choice_pred(
            "offer",
            vec![
                Box::new(crate::engine::VarChoice::new(x.clone(), Term::Value(1))),
                Box::new(crate::engine::VarChoice::new(x.clone(), Term::Value(2))),
            ],
        );

        let program = conjunct(vec![
            once(choices),
            AppendPred::new(x.clone(), results.clone()),
            fail_pred(),
        ]);

        let mut engine: crate::engine::Engine<i64> = crate::engine::Engine::new();
        assert!(!engine.execute(program));
        assert_eq!(*results.borrow(), vec![1]);
    }

    #[test]
    fn loop_runs_until_factory_stops_it() {
        struct CountDown(Rc<Cell<i64>>);
        impl LoopFactory<i64> for CountDown {
            fn loop_continues(&mut self, _engine: &mut Engine<i64>) -> bool {
                self.0.get() > 0
            }
            fn make_body_pred(&mut self, _engine: &mut Engine<i64>) -> PredRef<i64> {
                let counter = self.0.clone();
                DetPred::new("decrement", move |_engine: &mut Engine<i64>| {
                    counter.set(counter.get() - 1);
                    true
                })
            }
        }

        let counter = Rc::new(Cell::new(3));
        let loop_pred = Loop::new(CountDown(counter.clone()));
        let mut engine: crate::engine::Engine<i64> = crate::engine::Engine::new();
        assert!(engine.execute(loop_pred));
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn disjunction_offers_each_alternative_in_order_on_backtrack() {
        let x: Var<i64> = Var::new();
        let results = Rc::new(StdRefCell::new(Vec::new()));
        let program = conjunct(vec![
            Disjunction::new(vec![
                UnifyPred::new(x.clone(), Term::Value(10)),
                UnifyPred::new(x.clone(), Term::Value(20)),
            ]),
            AppendPred::new(x.clone(), results.clone()),
            fail_pred(),
        ]);

        let mut engine: crate::engine::Engine<i64> = crate::engine::Engine::new();
        assert!(!engine.execute(program));
        assert_eq!(*results.borrow(), vec![10, 20]);
    }
}
