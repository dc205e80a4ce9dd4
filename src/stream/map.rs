use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{AsyncCursor, AsyncSequence};
use crate::{Error, Step};

/// An asynchronous sequence that maps the values of another one with a
/// function.
///
/// This `struct` is created by the [`map`] method on [`AsyncSequence`]. See
/// its documentation for more.
///
/// [`map`]: AsyncSequence::map
#[derive(Debug, Clone)]
pub struct Map<S, F> {
    sequence: S,
    f: F,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(sequence: S, f: F) -> Self {
        Self { sequence, f }
    }
}

impl<S, F, B> AsyncSequence for Map<S, F>
where
    S: AsyncSequence,
    F: FnMut(S::Item) -> B + Clone,
{
    type Item = B;
    type Cursor = MapCursor<S::Cursor, F>;

    fn cursor(&self) -> Self::Cursor {
        MapCursor {
            cursor: self.sequence.cursor(),
            f: self.f.clone(),
        }
    }
}

/// The cursor of an asynchronous [`Map`] sequence.
#[derive(Debug)]
#[pin_project]
pub struct MapCursor<C, F> {
    #[pin]
    cursor: C,
    f: F,
}

impl<C, F, B> AsyncCursor for MapCursor<C, F>
where
    C: AsyncCursor,
    F: FnMut(C::Item) -> B,
{
    type Item = B;

    fn poll_advance(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<Step<B>, Error>> {
        let this = self.project();
        let step = ready!(this.cursor.poll_advance(cx))?;
        Poll::Ready(Ok(step.map(this.f)))
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.project().cursor.poll_close(cx)
    }
}
