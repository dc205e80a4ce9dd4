use core::fmt;

use super::{AsyncCursor, AsyncSequence};

/// An asynchronous sequence that builds a fresh cursor per pass.
///
/// This `struct` is created by the [`from_async_coroutine`] function. See
/// its documentation for more.
#[derive(Clone)]
pub struct FromAsyncCoroutine<B> {
    factory: B,
}

/// Create a restartable asynchronous sequence from a coroutine factory.
///
/// `factory` is called once per [`cursor`](AsyncSequence::cursor), and the
/// coroutine it returns doesn't run until its cursor is first advanced.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::coroutine::{AsyncCoroutine, Co, Interrupt};
/// use lazy_pipeline::stream::{from_async_coroutine, AsyncSequence};
/// use futures_lite::future::{block_on, yield_now};
///
/// let letters = from_async_coroutine(|| {
///     AsyncCoroutine::new(|co: Co<char>| async move {
///         for c in "abc".chars() {
///             yield_now().await;
///             co.yield_(c).await?;
///         }
///         Ok::<_, Interrupt>(())
///     })
/// });
///
/// assert_eq!(block_on(letters.drain_all()).unwrap(), vec!['a', 'b', 'c']);
/// ```
pub fn from_async_coroutine<B, C>(factory: B) -> FromAsyncCoroutine<B>
where
    B: Fn() -> C,
    C: AsyncCursor,
{
    FromAsyncCoroutine { factory }
}

impl<B, C> AsyncSequence for FromAsyncCoroutine<B>
where
    B: Fn() -> C,
    C: AsyncCursor,
{
    type Item = C::Item;
    type Cursor = C;

    fn cursor(&self) -> C {
        (self.factory)()
    }
}

impl<B> fmt::Debug for FromAsyncCoroutine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromAsyncCoroutine").finish_non_exhaustive()
    }
}
