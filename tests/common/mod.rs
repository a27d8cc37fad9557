// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Shared test setup.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` once per test binary, so `RUST_LOG=trace cargo
/// test -- --nocapture` surfaces the engine's `trace!`/`debug!` output
/// (`src/engine/mod.rs`, `src/trail/mod.rs`, `src/unify.rs`). Guarded by
/// `Once` rather than `try_init`'s own idempotence because every test in
/// a binary calls this at its own start.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::try_init();
    });
}
