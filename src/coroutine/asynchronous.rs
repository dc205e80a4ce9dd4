use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use super::co::Resumption;
use super::engine::{Engine, Outcome};
use super::{Co, CoroutineState, Interrupt, State};
use crate::stream::AsyncCursor;
use crate::{utils, Error, Fault, Step, Violation};

/// A coroutine whose body may await other futures between suspension points.
///
/// Resuming returns a future. While the body waits on something other than
/// its own suspension points, control goes back to the executor. At most one
/// resumption is ever in flight: every resumption borrows the coroutine
/// mutably until it settles.
///
/// Closing a coroutine with a resumption still in flight (because the
/// resumption future was dropped) abandons the body immediately. The pending
/// work is dropped with it, so a late settlement can never resume the body.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::coroutine::{AsyncCoroutine, Co, Interrupt};
/// use lazy_pipeline::stream::{AsyncCursorExt, drive};
/// use futures_lite::future::{block_on, yield_now};
///
/// block_on(async {
///     let mut ticks = AsyncCoroutine::new(|co: Co<u32>| async move {
///         for n in 0..3 {
///             yield_now().await;
///             co.yield_(n).await?;
///         }
///         Ok::<_, Interrupt>(())
///     });
///     assert_eq!(drive::drain_all(&mut ticks).await.unwrap(), vec![0, 1, 2]);
/// });
/// ```
pub struct AsyncCoroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    engine: Engine<Y, R, T, F>,
}

impl<Y, R, T, F> AsyncCoroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    /// Create a coroutine from its body.
    pub fn new<B>(body: B) -> Self
    where
        B: FnOnce(Co<Y, R>) -> F,
    {
        Self {
            engine: Engine::new(body),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        self.engine.state()
    }

    /// Resume the body with `value`, running it until its next suspension
    /// point or until it returns.
    ///
    /// The value is ignored on the first resumption.
    pub fn resume(&mut self, value: R) -> Resume<'_, Y, R, T, F> {
        Resume {
            coroutine: self,
            resumption: Some(Resumption::Value(value)),
        }
    }

    /// Resume the body by raising `fault` at its suspension point.
    pub fn resume_with_fault(&mut self, fault: impl Into<Fault>) -> Resume<'_, Y, R, T, F> {
        Resume {
            coroutine: self,
            resumption: Some(Resumption::Fault(fault.into())),
        }
    }

    /// Terminate the coroutine early, running its cleanup.
    ///
    /// See [`Coroutine::close`](super::Coroutine::close) for the exact
    /// semantics.
    pub fn close(&mut self) -> Close<'_, Y, R, T, F> {
        Close { coroutine: self }
    }

    fn poll_close_inner(&mut self, cx: &mut Context<'_>) -> Poll<Result<State, Error>> {
        if let Some(state) = self.engine.begin_close() {
            return Poll::Ready(Ok(state));
        }
        let outcome = ready!(self.engine.poll_resume(cx));
        Poll::Ready(outcome.map(|_| State::Closed))
    }
}

impl<Y, T, F> AsyncCursor for AsyncCoroutine<Y, (), T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    type Item = Y;

    fn poll_advance(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<Step<Y>, Error>> {
        let this = self.get_mut();
        match this.engine.state() {
            State::Completed | State::Faulted => return Poll::Ready(Ok(Step::Exhausted)),
            // Keep driving the resumption that is already in flight.
            State::Running if !this.engine.is_closing() => {}
            _ => {
                if let Err(error) = this.engine.inject(Resumption::Value(())) {
                    return Poll::Ready(Err(error));
                }
            }
        }
        match ready!(this.engine.poll_resume(cx)) {
            Ok(Outcome::Yielded(value)) => Poll::Ready(Ok(Step::Produced(value))),
            Ok(Outcome::Returned(_)) => Poll::Ready(Ok(Step::Exhausted)),
            Ok(Outcome::Closed) => Poll::Ready(Err(Violation::ResumedAfterClose.into())),
            Err(error) => Poll::Ready(Err(error)),
        }
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.get_mut().poll_close_inner(cx).map_ok(drop)
    }
}

impl<Y, R, T, F> Drop for AsyncCoroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn drop(&mut self) {
        if self.engine.state() != State::Suspended {
            return;
        }
        // Give the cleanup one chance to finish without an executor.
        let waker = utils::noop_waker();
        let mut cx = Context::from_waker(&waker);
        match self.poll_close_inner(&mut cx) {
            Poll::Ready(Ok(_)) => {}
            Poll::Ready(Err(error)) => {
                tracing::warn!(%error, "failed to close a dropped coroutine");
            }
            Poll::Pending => {
                tracing::warn!("cleanup of a dropped coroutine did not finish synchronously");
                self.engine.abandon(State::Closed);
            }
        }
    }
}

impl<Y, R, T, F> fmt::Debug for AsyncCoroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCoroutine")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Future for resuming an [`AsyncCoroutine`].
///
/// This `struct` is created by the [`resume`] and [`resume_with_fault`]
/// methods on [`AsyncCoroutine`]. See their documentation for more.
///
/// [`resume`]: AsyncCoroutine::resume
/// [`resume_with_fault`]: AsyncCoroutine::resume_with_fault
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Resume<'a, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    coroutine: &'a mut AsyncCoroutine<Y, R, T, F>,
    resumption: Option<Resumption<R>>,
}

// Nothing in `Resume` is structurally pinned.
impl<Y, R, T, F> Unpin for Resume<'_, Y, R, T, F> where F: Future<Output = Result<T, Interrupt>> {}

impl<Y, R, T, F> Future for Resume<'_, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    type Output = Result<CoroutineState<Y, T>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(resumption) = this.resumption.take() {
            this.coroutine.engine.inject(resumption)?;
        }
        match ready!(this.coroutine.engine.poll_resume(cx))? {
            Outcome::Yielded(value) => Poll::Ready(Ok(CoroutineState::Yielded(value))),
            Outcome::Returned(value) => Poll::Ready(Ok(CoroutineState::Complete(value))),
            Outcome::Closed => Poll::Ready(Err(Violation::ResumedAfterClose.into())),
        }
    }
}

impl<Y, R, T, F> fmt::Debug for Resume<'_, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume")
            .field("coroutine", &self.coroutine)
            .field("started", &self.resumption.is_none())
            .finish()
    }
}

/// Future for closing an [`AsyncCoroutine`].
///
/// This `struct` is created by the [`close`] method on [`AsyncCoroutine`].
/// See its documentation for more.
///
/// [`close`]: AsyncCoroutine::close
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Close<'a, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    coroutine: &'a mut AsyncCoroutine<Y, R, T, F>,
}

impl<Y, R, T, F> Future for Close<'_, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    type Output = Result<State, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().coroutine.poll_close_inner(cx)
    }
}

impl<Y, R, T, F> fmt::Debug for Close<'_, Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Close")
            .field("coroutine", &self.coroutine)
            .finish()
    }
}
