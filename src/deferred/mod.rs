//! Lazy asynchronous computations.
//!
//! An [`IO`] is a description of work, not the work itself. Nothing happens until
//! [`IO::invoke`] is called, and every invocation runs the work again from scratch.
//! Steps are chained with [`bind`], which always runs the source computation to
//! completion before asking the continuation for the next step.
//!
//! Everything here is single-threaded. The futures are local (`!Send`) and the
//! only executor is [`IO::run_blocking`].

use crate::driver_messages::driver_errors::DriverError;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::future::Future;
use std::rc::Rc;

pub type IoFuture<T, E> = LocalBoxFuture<'static, Result<T, E>>;

/// A deferred computation resolving to `T` or failing with `E`.
pub struct IO<T, E = DriverError> {
    run: Rc<dyn Fn() -> IoFuture<T, E>>,
}

impl<T: 'static, E: 'static> IO<T, E> {
    /// Lifts an async closure into a deferred computation.
    /// The closure is called again on every invocation.
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        IO {
            run: Rc::new(move || run().boxed_local()),
        }
    }

    /// Starts the work.
    pub fn invoke(&self) -> IoFuture<T, E> {
        (self.run)()
    }

    /// Invokes the computation and drives it to completion on the current thread.
    pub fn run_blocking(&self) -> Result<T, E> {
        futures::executor::block_on(self.invoke())
    }
}

// Manual impl so cloning doesn't require T: Clone
impl<T, E> Clone for IO<T, E> {
    fn clone(&self) -> Self {
        IO {
            run: Rc::clone(&self.run),
        }
    }
}

/// A computation that resolves to `value` with no side effects.
pub fn of<T, E>(value: T) -> IO<T, E>
where
    T: Clone + 'static,
    E: 'static,
{
    IO::new(move || futures::future::ready(Ok(value.clone())))
}

/// A computation that always fails with `error`.
/// Continuations return this when they cannot build the next step.
pub fn fail<T, E>(error: E) -> IO<T, E>
where
    T: 'static,
    E: Clone + 'static,
{
    IO::new(move || futures::future::ready(Err(error.clone())))
}

/// Runs `io`, feeds its value into `continuation`, then runs the computation it returns.
///
/// If `io` fails, the composed computation fails with the same error
/// and `continuation` is never called.
pub fn bind<T, U, E, F>(io: IO<T, E>, continuation: F) -> IO<U, E>
where
    T: 'static,
    U: 'static,
    E: 'static,
    F: Fn(T) -> IO<U, E> + 'static,
{
    let continuation = Rc::new(continuation);

    IO::new(move || {
        let io = io.clone();
        let continuation = Rc::clone(&continuation);

        async move {
            let value = io.invoke().await?;
            continuation(value).invoke().await
        }
    })
}

#[cfg(test)]
#[path = "tests/deferred_tests.rs"]
mod tests;
