use core::pin::Pin;
use core::task::{ready, Context, Poll};

use futures_core::stream::{FusedStream, Stream};
use pin_project::pin_project;

use super::AsyncCursor;
use crate::{Error, Step};

/// A [`Stream`] over the values of an [`AsyncCursor`].
///
/// Faults are yielded as `Err` items; the stream ends after the first one.
///
/// This `struct` is created by the [`into_stream`] method on
/// [`AsyncCursorExt`]. See its documentation for more.
///
/// [`into_stream`]: super::AsyncCursorExt::into_stream
/// [`AsyncCursorExt`]: super::AsyncCursorExt
#[derive(Debug)]
#[must_use = "streams do nothing unless polled or .awaited"]
#[pin_project]
pub struct IntoStream<C> {
    #[pin]
    cursor: C,
    done: bool,
}

impl<C> IntoStream<C> {
    pub(crate) fn new(cursor: C) -> Self {
        Self {
            cursor,
            done: false,
        }
    }

    /// Consume the stream, returning the underlying cursor.
    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<C: AsyncCursor> Stream for IntoStream<C> {
    type Item = Result<C::Item, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        match ready!(this.cursor.poll_advance(cx)) {
            Ok(Step::Produced(value)) => Poll::Ready(Some(Ok(value))),
            Ok(Step::Exhausted) => {
                *this.done = true;
                Poll::Ready(None)
            }
            Err(error) => {
                *this.done = true;
                Poll::Ready(Some(Err(error)))
            }
        }
    }
}

impl<C: AsyncCursor> FusedStream for IntoStream<C> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod test {
    use crate::coroutine::{AsyncCoroutine, Co, Interrupt};
    use crate::stream::AsyncCursorExt;
    use futures_lite::future::block_on;
    use futures_lite::StreamExt;

    #[test]
    fn yields_values_then_ends() {
        block_on(async {
            let coroutine = AsyncCoroutine::new(|co: Co<&str>| async move {
                co.yield_("a").await?;
                co.yield_("b").await?;
                Ok::<_, Interrupt>(())
            });
            let values: Vec<_> = coroutine.into_stream().map(|r| r.unwrap()).collect().await;
            assert_eq!(values, vec!["a", "b"]);
        });
    }

    #[test]
    fn ends_after_a_fault() {
        block_on(async {
            let coroutine = AsyncCoroutine::new(|co: Co<u8>| async move {
                co.yield_(1).await?;
                Err::<(), _>(Interrupt::fault("broken pipe"))
            });
            let mut stream = Box::pin(coroutine.into_stream());
            assert_eq!(stream.next().await.unwrap().unwrap(), 1);
            assert!(stream.next().await.unwrap().is_err());
            assert!(stream.next().await.is_none());
        });
    }
}
