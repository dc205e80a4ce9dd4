use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{AsyncCursor, AsyncSequence};
use crate::{Error, Step};

/// An asynchronous sequence that only produces the first `n` values of
/// another one.
///
/// This `struct` is created by the [`take`] method on [`AsyncSequence`]. See
/// its documentation for more.
///
/// [`take`]: AsyncSequence::take
#[derive(Debug, Clone)]
pub struct Take<S> {
    sequence: S,
    limit: usize,
}

impl<S> Take<S> {
    pub(crate) fn new(sequence: S, limit: usize) -> Self {
        Self { sequence, limit }
    }
}

impl<S: AsyncSequence> AsyncSequence for Take<S> {
    type Item = S::Item;
    type Cursor = TakeCursor<S::Cursor>;

    fn cursor(&self) -> Self::Cursor {
        TakeCursor {
            cursor: self.sequence.cursor(),
            remaining: self.limit,
            upstream_done: false,
        }
    }
}

/// The cursor of an asynchronous [`Take`] sequence.
#[derive(Debug)]
#[pin_project]
pub struct TakeCursor<C> {
    #[pin]
    cursor: C,
    remaining: usize,
    upstream_done: bool,
}

impl<C: AsyncCursor> TakeCursor<C> {
    fn poll_close_upstream(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        let this = self.project();
        if *this.upstream_done {
            return Poll::Ready(Ok(()));
        }
        let result = ready!(this.cursor.poll_close(cx));
        *this.upstream_done = true;
        Poll::Ready(result)
    }
}

impl<C: AsyncCursor> AsyncCursor for TakeCursor<C> {
    type Item = C::Item;

    fn poll_advance(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Step<C::Item>, Error>> {
        if self.remaining == 0 {
            if !self.upstream_done {
                tracing::trace!("take limit reached, closing upstream");
            }
            ready!(self.poll_close_upstream(cx))?;
            return Poll::Ready(Ok(Step::Exhausted));
        }
        let this = self.project();
        match ready!(this.cursor.poll_advance(cx))? {
            Step::Produced(value) => {
                *this.remaining -= 1;
                Poll::Ready(Ok(Step::Produced(value)))
            }
            Step::Exhausted => {
                *this.remaining = 0;
                *this.upstream_done = true;
                Poll::Ready(Ok(Step::Exhausted))
            }
        }
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        *self.as_mut().project().remaining = 0;
        self.poll_close_upstream(cx)
    }
}

#[cfg(test)]
mod test {
    use crate::coroutine::{AsyncCoroutine, Co, Interrupt};
    use crate::stream::{from_async_coroutine, AsyncSequence};
    use futures_lite::future::{block_on, yield_now};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn closes_an_endless_source() {
        let cleanups = Rc::new(Cell::new(0));
        let counter = cleanups.clone();
        let naturals = from_async_coroutine(move || {
            let counter = counter.clone();
            AsyncCoroutine::new(move |co: Co<u32>| async move {
                let result = async {
                    for n in 0.. {
                        co.yield_(n).await?;
                    }
                    Ok::<_, Interrupt>(())
                }
                .await;
                yield_now().await;
                counter.set(counter.get() + 1);
                result
            })
        });

        let first = naturals.take(3);
        assert_eq!(block_on(first.drain_all()).unwrap(), vec![0, 1, 2]);
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn take_zero_never_starts_the_source() {
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let source = from_async_coroutine(move || {
            let flag = flag.clone();
            AsyncCoroutine::new(move |co: Co<u8>| async move {
                flag.set(true);
                co.yield_(1).await?;
                Ok::<_, Interrupt>(())
            })
        });
        assert!(block_on(source.take(0).drain_all()).unwrap().is_empty());
        assert!(!started.get());
    }
}
