//! Runtime Bridge
//!
//! The engine itself is executor-agnostic; the binary drives it on a
//! current-thread tokio runtime so every continuation runs on one thread,
//! the way a UI event loop would.

use std::future::Future;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

/// Global tokio runtime instance
static TOKIO_RUNTIME: OnceLock<std::io::Result<Runtime>> = OnceLock::new();

/// Block on a future on the shared single-threaded runtime
///
/// Use from synchronous entry points only (the CLI `main`).
pub fn block_on<F, T>(future: F) -> std::io::Result<T>
where
    F: Future<Output = T>,
{
    let runtime = TOKIO_RUNTIME.get_or_init(|| Builder::new_current_thread().enable_all().build());
    match runtime {
        Ok(runtime) => Ok(runtime.block_on(future)),
        Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
    }
}

/// Yield to the scheduler once, so work deferred with this runs after
/// whatever task triggered it
pub async fn next_tick() {
    tokio::task::yield_now().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn block_on_returns_output() {
        let value = block_on(async { 21 * 2 }).expect("runtime");
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn next_tick_lets_other_tasks_run_first() {
        let local = tokio::task::LocalSet::new();
        let order = Rc::new(Cell::new(0));

        local
            .run_until(async {
                let seen = order.clone();
                tokio::task::spawn_local(async move {
                    seen.set(seen.get() + 1);
                });
                next_tick().await;
                assert_eq!(order.get(), 1);
            })
            .await;
    }
}
