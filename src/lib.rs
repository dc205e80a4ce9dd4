//! Lazy sequences, resumable coroutines, and pull-paced streaming pipelines.
//!
//! Values are produced on demand by [cursors](Cursor): nothing runs until a
//! consumer asks for the next value, and a consumer that stops early closes
//! the cursor so that any cleanup still pending in the producer runs
//! exactly once.
//!
//! The crate is layered as follows:
//!
//! - [`Cursor`] and [`Step`]: the pull protocol every producer implements.
//! - [`coroutine`]: producers written as straight-line `async` code which
//!   suspend at [`Co::yield_`](coroutine::Co::yield_), can be resumed with a
//!   value or a fault, and can be closed early.
//! - [`sequence`]: restartable factories of cursors, and the lazy operators
//!   `map`, `filter`, `take` and `flatten`.
//! - [`stream`]: the same protocol for producers that have to wait, such as
//!   a [paginated](stream::paginated) remote source.
//! - [`drive`] and [`stream::drive`]: the consumption loops.
//!
//! # Examples
//!
//! A generator written as a coroutine, fed through a lazy pipeline:
//!
//! ```rust
//! use lazy_pipeline::coroutine::{Co, Coroutine, Interrupt};
//! use lazy_pipeline::sequence::{from_coroutine, Sequence};
//!
//! let fibonacci = from_coroutine(|| {
//!     Coroutine::new(|co: Co<u64>| async move {
//!         let (mut a, mut b) = (0u64, 1u64);
//!         while let Some(next) = a.checked_add(b) {
//!             co.yield_(a).await?;
//!             (a, b) = (b, next);
//!         }
//!         Ok::<_, Interrupt>(())
//!     })
//! });
//!
//! let odd = fibonacci.filter(|n| n % 2 == 1).take(5);
//! assert_eq!(odd.drain_all().unwrap(), vec![1, 1, 3, 5, 13]);
//! ```
//!
//! # Errors
//!
//! Every fallible operation returns [`Error`]. A producer fault travels to
//! the consumer unchanged and terminates the cursor that raised it. Misuse of
//! the protocol, such as advancing a closed coroutine, is reported as a
//! [`Violation`] instead of being silently ignored.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod error;
mod utils;

pub mod coroutine;
pub mod cursor;
pub mod drive;
pub mod sequence;
pub mod stream;

pub use cursor::{Cursor, Step};
pub use error::{CleanupError, Error, Fault, Violation};
pub use sequence::Sequence;
pub use stream::{AsyncCursor, AsyncSequence};

/// The lazy pipeline prelude.
pub mod prelude {
    pub use super::cursor::Cursor as _;
    pub use super::sequence::Sequence as _;
    pub use super::stream::AsyncCursorExt as _;
    pub use super::stream::AsyncSequence as _;
}
