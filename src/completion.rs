//! Callback-style completion for model operations.
//!
//! Every operation returns a future. Callers that prefer a completion
//! callback chain [`CompletionExt::on_complete`] onto it instead of matching
//! on the awaited result.

use std::future::Future;

use futures::future::{FutureExt, Map};

/// Adds callback-mode completion to any future yielding a `Result`.
pub trait CompletionExt<T, E>: Future<Output = Result<T, E>> + Sized {
    /// Invoke `callback` exactly once with the outcome.
    ///
    /// The returned future resolves to `()` after the callback has run, so it
    /// can still be awaited (or spawned) by the caller.
    ///
    /// ```ignore
    /// users
    ///     .destroy_by_id(json!(1), &options)
    ///     .on_complete(|result| match result {
    ///         Ok(summary) => println!("deleted {}", summary.count),
    ///         Err(err) => eprintln!("delete failed: {}", err),
    ///     })
    ///     .await;
    /// ```
    fn on_complete<F>(self, callback: F) -> Map<Self, F>
    where
        F: FnOnce(Result<T, E>),
    {
        self.map(callback)
    }
}

impl<Fut, T, E> CompletionExt<T, E> for Fut where Fut: Future<Output = Result<T, E>> {}
