// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for the engine's programmer-error channel.
//!
//! Almost everything in this crate signals failure through the search
//! protocol itself — a predicate that cannot proceed simply reports
//! `Failure` and the engine backtracks. `EngineError` is reserved for the
//! small set of usage mistakes that are not search outcomes at all and
//! should never be mistaken for one.

use thiserror::Error;

/// Programmer errors detected by [`crate::engine::Engine`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// [`crate::engine::Engine::execute`] (or `try_execute`) was called
    /// again while an earlier call on the same engine was still running —
    /// for instance, from inside a predicate hook. The engine is not
    /// reentrant: a single `Engine` drives one search at a time.
    #[error("engine is already executing a search; it is not reentrant")]
    ReentrantExecute,
}
