// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The predicate protocol.
//!
//! A [`Predicate`] is one node of an executable search tree. The engine
//! drives every predicate through the same four hooks — `initialize_call`,
//! `test_choice`, `more_choices`, and the continuation link — regardless
//! of whether it represents a single deterministic step, a choice among
//! finitely many alternatives, or a combinator built out of other
//! predicates (see [`crate::meta`]).
//!
//! Three ready-made shapes cover almost every predicate a caller writes:
//!
//! - [`DetPred`]: always succeeds exactly once, no choice point.
//! - [`SemiDetPred`]: succeeds at most once, no choice point either way.
//! - [`Pred`]: the general case, backed by a [`crate::engine::ChoiceIterator`].

use super::{Choice, ChoiceIterator, Engine};
use crate::term::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared, mutable handle to a predicate node, used for continuation
/// links and for the engine's own choice-point stack.
///
/// `Rc<RefCell<..>>` rather than ownership because the same predicate
/// instance is reached two ways at once: as "the current predicate" the
/// engine is stepping, and as "the target to resume" recorded in a choice
/// point or a continuation link elsewhere in the tree.
pub type PredRef<V> = Rc<RefCell<dyn Predicate<V>>>;

/// Wrap a predicate value in a fresh [`PredRef`].
pub fn pred_ref<V: Value>(p: impl Predicate<V> + 'static) -> PredRef<V> {
    Rc::new(RefCell::new(p))
}

/// Outcome of asking a predicate for its next choice, during `RETRY`.
///
/// The three-way split exists because the engine's choice-point bookkeeping
/// has to resolve a tension the general algorithm does not, by itself,
/// settle: the natural rule is "every successful `more_choices` pushes a
/// choice point so the engine can come back for another alternative later"
/// — but a predicate with only one possible outcome (most of them) must
/// *not* leave a choice point behind, or the engine would retry it anyway
/// after it can offer nothing new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoreChoices {
    /// No alternative is available; the engine should fail and backtrack
    /// past this predicate.
    Failed,
    /// An alternative was produced and more may follow later; the engine
    /// pushes a choice point so it can come back here on a future failure.
    Retryable,
    /// An alternative was produced and it is known to be the last one;
    /// the engine proceeds without pushing a choice point.
    Final,
}

/// The per-instance state every [`Predicate`] needs, factored out so the
/// trait's default method bodies have somewhere to read and write it.
///
/// Rust has no field inheritance, so a trait whose default methods need
/// storage asks implementors to expose that storage through an accessor
/// pair ([`Predicate::core`] / [`Predicate::core_mut`]) instead.
pub struct PredCore<V: Value> {
    continuation: Option<PredRef<V>>,
    choice_iterator: Option<Box<dyn ChoiceIterator<V>>>,
}

impl<V: Value> PredCore<V> {
    /// A fresh core: no continuation, no choice iterator.
    pub fn new() -> Self {
        Self {
            continuation: None,
            choice_iterator: None,
        }
    }

    /// Install the choice iterator this predicate's `initialize_call` (or
    /// constructor) produced. The default [`Predicate::more_choices`] pulls
    /// from whatever is installed here.
    pub fn set_choice_iterator(&mut self, iterator: Box<dyn ChoiceIterator<V>>) {
        self.choice_iterator = Some(iterator);
    }

    fn next_choice(&mut self) -> Option<Box<dyn Choice<V>>> {
        self.choice_iterator.as_mut().and_then(|it| it.next_choice())
    }
}

impl<V: Value> Default for PredCore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Value> fmt::Debug for PredCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredCore")
            .field("has_continuation", &self.continuation.is_some())
            .field("has_choice_iterator", &self.choice_iterator.is_some())
            .finish()
    }
}

/// A node in an executable search tree.
///
/// Implementors provide [`Predicate::core`]/[`Predicate::core_mut`] and
/// override whichever hooks give them their behavior; the defaults here
/// implement the common "pull the next choice out of an installed
/// iterator, unify it, done" shape so most predicates only need to
/// install a [`ChoiceIterator`] in `initialize_call` and never override
/// `more_choices` at all.
pub trait Predicate<V: Value>: fmt::Debug {
    /// Access this predicate's shared state.
    fn core(&self) -> &PredCore<V>;
    /// Mutably access this predicate's shared state.
    fn core_mut(&mut self) -> &mut PredCore<V>;

    /// `ENTER`: called once, the first time the engine reaches this
    /// predicate. Returning `false` fails immediately without ever
    /// reaching `RETRY`.
    fn initialize_call(&mut self, engine: &mut Engine<V>) -> bool {
        let _ = engine;
        true
    }

    /// `RETRY`: produce the next alternative. The default implementation
    /// pulls from the [`ChoiceIterator`] installed in [`PredCore`] (if
    /// any) and reports [`MoreChoices::Retryable`] on success,
    /// [`MoreChoices::Failed`] once the iterator is exhausted or none was
    /// installed.
    ///
    /// Predicates with a known-finite, self-describing choice set (most
    /// of [`crate::meta`]'s combinators) override this to return
    /// [`MoreChoices::Final`] on their last alternative, so the engine
    /// never wastes a choice point on a predicate that cannot offer
    /// anything more.
    fn more_choices(&mut self, engine: &mut Engine<V>) -> MoreChoices {
        match self.core_mut().next_choice() {
            Some(mut choice) => {
                if choice.apply(engine) {
                    MoreChoices::Retryable
                } else {
                    MoreChoices::Failed
                }
            }
            None => MoreChoices::Failed,
        }
    }

    /// Called immediately after a successful `more_choices`, once the
    /// choice-point bookkeeping (if any) is settled, to let the predicate
    /// perform any check that should not itself be retryable. Most
    /// predicates have nothing extra to check and accept unconditionally.
    fn test_choice(&mut self, engine: &mut Engine<V>) -> bool {
        let _ = engine;
        true
    }

    /// The next predicate to run after this one succeeds, or `None` if
    /// this predicate is the end of its chain.
    fn continuation(&self) -> Option<PredRef<V>> {
        self.core().continuation.clone()
    }

    /// Wire this predicate's continuation. Combinators in [`crate::meta`]
    /// use this to splice predicate trees together.
    fn set_continuation(&mut self, next: Option<PredRef<V>>) {
        self.core_mut().continuation = next;
    }

    /// A short, human-readable label used in trace logging. Defaults to
    /// the implementing type's name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A predicate that succeeds exactly once and offers no alternatives.
///
/// `body` runs once, during `initialize_call`; its return value is the
/// predicate's (only) success or failure.
pub struct DetPred<V: Value, F> {
    core: PredCore<V>,
    body: Option<F>,
    name: &'static str,
}

impl<V: Value, F> DetPred<V, F>
where
    F: FnOnce(&mut Engine<V>) -> bool + 'static,
{
    /// Build a deterministic predicate that runs `body` once.
    pub fn new(name: &'static str, body: F) -> PredRef<V> {
        pred_ref(Self {
            core: PredCore::new(),
            body: Some(body),
            name,
        })
    }
}

impl<V: Value, F> fmt::Debug for DetPred<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DetPred({})", self.name)
    }
}

impl<V: Value, F> Predicate<V> for DetPred<V, F>
where
    F: FnOnce(&mut Engine<V>) -> bool + 'static,
{
    fn core(&self) -> &PredCore<V> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PredCore<V> {
        &mut self.core
    }

    fn more_choices(&mut self, engine: &mut Engine<V>) -> MoreChoices {
        match self.body.take() {
            Some(body) => {
                if body(engine) {
                    MoreChoices::Final
                } else {
                    MoreChoices::Failed
                }
            }
            None => MoreChoices::Failed,
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A predicate that either succeeds once or fails outright.
///
/// Spelled out as a distinct name from [`DetPred`] for callers' intent —
/// a `SemiDetPred`'s `body` is a pure test (unification, a guard) rather
/// than something with an observable effect on failure — but there is no
/// behavioral daylight between the two, so construction is just a
/// same-shaped free function with no instance of its own.
pub enum SemiDetPred {}

impl SemiDetPred {
    /// Build a semi-deterministic predicate that tests `body` once.
    pub fn new<V, F>(name: &'static str, body: F) -> PredRef<V>
    where
        V: Value,
        F: FnOnce(&mut Engine<V>) -> bool + 'static,
    {
        DetPred::new(name, body)
    }
}

/// The body of a general [`Pred`]: decides, during `initialize_call`,
/// whether this call has any alternatives to offer at all.
pub trait PredBody<V: Value> {
    /// Inspect the call and either install a choice iterator (there are
    /// alternatives to try) or fail outright (there are none).
    fn initialize(&mut self, engine: &mut Engine<V>) -> InitOutcome<V>;
}

/// What [`PredBody::initialize`] decided.
pub enum InitOutcome<V: Value> {
    /// No alternatives exist; fail without entering `RETRY`.
    Fail,
    /// Alternatives exist, enumerated by this iterator.
    Choices(Box<dyn ChoiceIterator<V>>),
}

/// The general predicate shape: an [`initialize_call`](Predicate::initialize_call)
/// that builds a [`ChoiceIterator`] via a [`PredBody`], and the default
/// `more_choices`/`test_choice` behavior from [`Predicate`] driving it.
pub struct Pred<V: Value, B> {
    core: PredCore<V>,
    body: B,
    name: &'static str,
}

impl<V: Value, B: PredBody<V>> Pred<V, B> {
    /// Build a general predicate around `body`.
    pub fn new(name: &'static str, body: B) -> PredRef<V>
    where
        B: 'static,
    {
        pred_ref(Self {
            core: PredCore::new(),
            body,
            name,
        })
    }
}

impl<V: Value, B> fmt::Debug for Pred<V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pred({})", self.name)
    }
}

impl<V: Value, B: PredBody<V> + 'static> Predicate<V> for Pred<V, B> {
    fn core(&self) -> &PredCore<V> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PredCore<V> {
        &mut self.core
    }

    fn initialize_call(&mut self, engine: &mut Engine<V>) -> bool {
        match self.body.initialize(engine) {
            InitOutcome::Fail => false,
            InitOutcome::Choices(iter) => {
                self.core.set_choice_iterator(iter);
                true
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
