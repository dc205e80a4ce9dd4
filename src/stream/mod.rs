//! Asynchronous cursors and sequences.
//!
//! [`AsyncCursor`] has the same contract as [`Cursor`](crate::Cursor),
//! except that producing the next value may have to wait. Consumption is
//! pull-paced: a cursor is only ever asked for one value at a time, and
//! the next request is made only once the previous one has settled. How fast
//! the consumer asks is the only thing that drives the producer.
//!
//! # Examples
//!
//! Drain a paginated source, fetching a page only when the previous one has
//! been consumed:
//!
//! ```
//! use lazy_pipeline::stream::{paginated, AsyncSequence, Page};
//! use futures_lite::future::block_on;
//!
//! let pages = paginated(|token: Option<u32>| async move {
//!     let page = token.unwrap_or(0);
//!     let next_token = (page < 2).then_some(page + 1);
//!     Ok::<_, std::io::Error>(Page::new(vec![page * 10, page * 10 + 1], next_token))
//! });
//!
//! let items = block_on(pages.map(|n| n + 1).drain_all()).unwrap();
//! assert_eq!(items, vec![1, 2, 11, 12, 21, 22]);
//! ```

pub mod drive;

mod filter;
mod from_coroutine;
mod futures;
mod into_stream;
mod map;
mod paginated;
mod take;

pub use filter::{Filter, FilterCursor};
pub use from_coroutine::{from_async_coroutine, FromAsyncCoroutine};
pub use futures::{Advance, CloseCursor};
pub use into_stream::IntoStream;
pub use map::{Map, MapCursor};
pub use paginated::{paginated, Page, Paginated, PaginatedCursor};
pub use take::{Take, TakeCursor};

use core::ops::DerefMut;
use core::pin::{pin, Pin};
use core::task::{Context, Poll};

use crate::{Error, Step};

/// A stateful position within an asynchronous sequence of values.
///
/// The protocol is the one of [`Cursor`](crate::Cursor): exhaustion is
/// sticky, a fault is reported once and terminates the cursor, and closing
/// runs pending cleanup and is idempotent.
///
/// Once `poll_advance` returned `Pending`, the same resumption is still in
/// flight: the next call continues it rather than starting a new one.
pub trait AsyncCursor {
    /// The type of the values being produced.
    type Item;

    /// Attempt to produce the next value.
    fn poll_advance(self: Pin<&mut Self>, cx: &mut Context<'_>)
        -> Poll<Result<Step<Self::Item>, Error>>;

    /// Attempt to terminate the cursor early, running any pending cleanup.
    ///
    /// The default implementation has nothing to clean up.
    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        Poll::Ready(Ok(()))
    }
}

impl<C: AsyncCursor + Unpin + ?Sized> AsyncCursor for &mut C {
    type Item = C::Item;

    fn poll_advance(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Step<Self::Item>, Error>> {
        Pin::new(&mut **self.get_mut()).poll_advance(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        Pin::new(&mut **self.get_mut()).poll_close(cx)
    }
}

impl<C: AsyncCursor + Unpin + ?Sized> AsyncCursor for Box<C> {
    type Item = C::Item;

    fn poll_advance(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Step<Self::Item>, Error>> {
        Pin::new(&mut **self.get_mut()).poll_advance(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        Pin::new(&mut **self.get_mut()).poll_close(cx)
    }
}

impl<P> AsyncCursor for Pin<P>
where
    P: DerefMut + Unpin,
    P::Target: AsyncCursor,
{
    type Item = <P::Target as AsyncCursor>::Item;

    fn poll_advance(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Step<Self::Item>, Error>> {
        self.get_mut().as_mut().poll_advance(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.get_mut().as_mut().poll_close(cx)
    }
}

/// An extension trait for the `AsyncCursor` trait.
pub trait AsyncCursorExt: AsyncCursor {
    /// Produce the next value, or report exhaustion.
    fn advance(&mut self) -> Advance<'_, Self>
    where
        Self: Unpin,
    {
        Advance::new(self)
    }

    /// Terminate the cursor early, running any pending cleanup.
    fn close(&mut self) -> CloseCursor<'_, Self>
    where
        Self: Unpin,
    {
        CloseCursor::new(self)
    }

    /// Convert the cursor into a [`Stream`](futures_core::Stream) of results.
    fn into_stream(self) -> IntoStream<Self>
    where
        Self: Sized,
    {
        IntoStream::new(self)
    }
}

impl<C: AsyncCursor + ?Sized> AsyncCursorExt for C {}

/// A factory of independent asynchronous cursors.
#[allow(async_fn_in_trait)]
pub trait AsyncSequence {
    /// The type of the values being produced.
    type Item;

    /// The cursor driving one pass over the sequence.
    type Cursor: AsyncCursor<Item = Self::Item>;

    /// Start a new pass over the sequence.
    fn cursor(&self) -> Self::Cursor;

    /// Transform every value with `f`.
    fn map<F, B>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> B + Clone,
    {
        Map::new(self, f)
    }

    /// Only keep the values for which `predicate` returns `true`.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool + Clone,
    {
        Filter::new(self, predicate)
    }

    /// Produce at most `limit` values, closing the upstream cursor once the
    /// limit is reached.
    fn take(self, limit: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take::new(self, limit)
    }

    /// Drive a fresh cursor to exhaustion, collecting every value.
    async fn drain_all(&self) -> Result<Vec<Self::Item>, Error> {
        let mut cursor = pin!(self.cursor());
        drive::drain_all(&mut cursor).await
    }

    /// Drive a fresh cursor until `predicate` accepts a value.
    ///
    /// Returns the values produced so far, the accepted one included, along
    /// with the paused cursor. The cursor is pinned on the heap so it can be
    /// handed back even when it holds a pending future.
    async fn drain_until<P>(
        &self,
        predicate: P,
    ) -> Result<(Vec<Self::Item>, Pin<Box<Self::Cursor>>), Error>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        let mut cursor = Box::pin(self.cursor());
        let values = drive::drain_until(&mut cursor, predicate).await?;
        Ok((values, cursor))
    }

    /// Drive a fresh cursor to exhaustion, calling `f` on every value.
    async fn for_each<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnMut(Self::Item),
    {
        let mut cursor = pin!(self.cursor());
        drive::for_each(&mut cursor, f).await
    }
}

impl<S: AsyncSequence + ?Sized> AsyncSequence for &S {
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Self::Cursor {
        (**self).cursor()
    }
}
