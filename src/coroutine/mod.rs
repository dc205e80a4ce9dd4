//! Suspendable computations driven one step at a time.
//!
//! A coroutine body is an `async` block that receives a [`Co`] handle. Every
//! `co.yield_(value).await` is a suspension point: the value is handed to
//! whoever resumed the coroutine, and the body stays paused until the next
//! resumption. The body runs only while it is being resumed; nothing happens
//! in the background.
//!
//! Each suspension point evaluates to a `Result<R, Interrupt>`:
//!
//! - `Ok(value)` when resumed with [`Coroutine::resume`],
//! - `Err(interrupt)` carrying a fault when resumed with
//!   [`Coroutine::resume_with_fault`],
//! - `Err(interrupt)` carrying a close request when the coroutine is
//!   [closed](Coroutine::close) early.
//!
//! Propagating the interrupt with `?` unwinds the body. Cleanup code that
//! runs after the unwinding (or in a `Drop` guard) therefore runs exactly
//! once, both on normal completion and on early termination.
//!
//! # Examples
//!
//! ```
//! use lazy_pipeline::coroutine::{Co, Coroutine, CoroutineState, Interrupt};
//!
//! let mut echo = Coroutine::new(|co: Co<String, &'static str>| async move {
//!     let first = co.yield_("ready".to_string()).await?;
//!     let second = co.yield_(format!("got {first}")).await?;
//!     Ok::<_, Interrupt>(second.len())
//! });
//!
//! // The value passed to the first resumption is ignored.
//! assert_eq!(echo.resume("ignored").unwrap(), CoroutineState::Yielded("ready".to_string()));
//! assert_eq!(echo.resume("A").unwrap(), CoroutineState::Yielded("got A".to_string()));
//! assert_eq!(echo.resume("BB").unwrap(), CoroutineState::Complete(2));
//! ```

mod asynchronous;
mod co;
mod engine;
mod sync;

pub use asynchronous::{AsyncCoroutine, Close, Resume};
pub use co::{Co, Interrupt, Suspend};
pub use sync::Coroutine;

/// The lifecycle state of a coroutine.
///
/// ```text
/// NotStarted --resume--> Running --yield--> Suspended --resume--> Running
/// Running --return--> Completed
/// Running --uncaught fault--> Faulted
/// Suspended --close--> Running (cleanup only) --> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The body has not run yet.
    NotStarted,
    /// The body is paused at a suspension point.
    Suspended,
    /// The body is executing, or an asynchronous resumption is in flight.
    Running,
    /// The body returned.
    Completed,
    /// A fault escaped the body.
    Faulted,
    /// The coroutine was terminated early.
    Closed,
}

impl State {
    /// Returns `true` if the coroutine can never run again.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Completed | State::Faulted | State::Closed)
    }
}

/// The result of resuming a coroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoroutineState<Y, T> {
    /// The body suspended with a value.
    Yielded(Y),
    /// The body returned a value.
    Complete(T),
}
