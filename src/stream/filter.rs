use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{AsyncCursor, AsyncSequence};
use crate::{Error, Step};

/// An asynchronous sequence that only keeps the values of another one
/// matching a predicate.
///
/// This `struct` is created by the [`filter`] method on [`AsyncSequence`].
/// See its documentation for more.
///
/// [`filter`]: AsyncSequence::filter
#[derive(Debug, Clone)]
pub struct Filter<S, P> {
    sequence: S,
    predicate: P,
}

impl<S, P> Filter<S, P> {
    pub(crate) fn new(sequence: S, predicate: P) -> Self {
        Self {
            sequence,
            predicate,
        }
    }
}

impl<S, P> AsyncSequence for Filter<S, P>
where
    S: AsyncSequence,
    P: FnMut(&S::Item) -> bool + Clone,
{
    type Item = S::Item;
    type Cursor = FilterCursor<S::Cursor, P>;

    fn cursor(&self) -> Self::Cursor {
        FilterCursor {
            cursor: self.sequence.cursor(),
            predicate: self.predicate.clone(),
        }
    }
}

/// The cursor of an asynchronous [`Filter`] sequence.
#[derive(Debug)]
#[pin_project]
pub struct FilterCursor<C, P> {
    #[pin]
    cursor: C,
    predicate: P,
}

impl<C, P> AsyncCursor for FilterCursor<C, P>
where
    C: AsyncCursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn poll_advance(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Step<C::Item>, Error>> {
        let mut this = self.project();
        loop {
            match ready!(this.cursor.as_mut().poll_advance(cx))? {
                Step::Produced(value) if (this.predicate)(&value) => {
                    return Poll::Ready(Ok(Step::Produced(value)))
                }
                Step::Produced(_) => continue,
                Step::Exhausted => return Poll::Ready(Ok(Step::Exhausted)),
            }
        }
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.project().cursor.poll_close(cx)
    }
}
