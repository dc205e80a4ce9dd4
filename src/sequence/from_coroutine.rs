use core::cell::Cell;
use core::fmt;

use super::Sequence;
use crate::{Cursor, Error, Step, Violation};

/// A sequence that builds a fresh cursor, usually a coroutine, per pass.
///
/// This `struct` is created by the [`from_coroutine`] function. See its
/// documentation for more.
#[derive(Clone)]
pub struct FromCoroutine<B> {
    factory: B,
}

/// Create a restartable sequence from a coroutine factory.
///
/// `factory` is called once per [`cursor`](Sequence::cursor), so every pass
/// runs its own coroutine from the start. Since coroutine bodies don't run
/// until they are first resumed, creating the cursor has no side effects
/// beyond what the factory itself does.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::coroutine::{Co, Coroutine, Interrupt};
/// use lazy_pipeline::sequence::{from_coroutine, Sequence};
///
/// let naturals = from_coroutine(|| {
///     Coroutine::new(|co: Co<u64>| async move {
///         for n in 0.. {
///             co.yield_(n).await?;
///         }
///         Ok::<_, Interrupt>(())
///     })
/// });
///
/// let squares = naturals.map(|n| n * n).take(4);
/// assert_eq!(squares.drain_all().unwrap(), vec![0, 1, 4, 9]);
/// assert_eq!(squares.drain_all().unwrap(), vec![0, 1, 4, 9]);
/// ```
pub fn from_coroutine<B, C>(factory: B) -> FromCoroutine<B>
where
    B: Fn() -> C,
    C: Cursor,
{
    FromCoroutine { factory }
}

impl<B, C> Sequence for FromCoroutine<B>
where
    B: Fn() -> C,
    C: Cursor,
{
    type Item = C::Item;
    type Cursor = C;

    fn cursor(&self) -> C {
        (self.factory)()
    }
}

impl<B> fmt::Debug for FromCoroutine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromCoroutine").finish_non_exhaustive()
    }
}

/// A sequence that can only be iterated once.
///
/// This `struct` is created by the [`single_use`] function. See its
/// documentation for more.
pub struct SingleUse<C> {
    cursor: Cell<Option<C>>,
}

/// Wrap an existing cursor, such as a single coroutine instance, as a
/// sequence.
///
/// The first call to [`cursor`](Sequence::cursor) hands out the wrapped
/// cursor. Every later cursor fails with [`Violation::AlreadyConsumed`] the
/// first time it is advanced, instead of silently sharing or repeating
/// state.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::cursor::IterCursor;
/// use lazy_pipeline::sequence::{single_use, Sequence};
/// use lazy_pipeline::Violation;
///
/// let once = single_use(IterCursor::new([1, 2]));
/// assert_eq!(once.drain_all().unwrap(), vec![1, 2]);
///
/// let error = once.drain_all().unwrap_err();
/// assert_eq!(error.violation(), Some(Violation::AlreadyConsumed));
/// ```
pub fn single_use<C: Cursor>(cursor: C) -> SingleUse<C> {
    SingleUse {
        cursor: Cell::new(Some(cursor)),
    }
}

impl<C> SingleUse<C> {
    /// Returns `true` once the wrapped cursor has been handed out.
    pub fn is_consumed(&self) -> bool {
        // `Cell` only lets us look by taking the value out.
        let cursor = self.cursor.take();
        let consumed = cursor.is_none();
        self.cursor.set(cursor);
        consumed
    }
}

impl<C: Cursor> Sequence for SingleUse<C> {
    type Item = C::Item;
    type Cursor = SingleUseCursor<C>;

    fn cursor(&self) -> Self::Cursor {
        SingleUseCursor {
            cursor: self.cursor.take(),
        }
    }
}

impl<C> fmt::Debug for SingleUse<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleUse")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// The cursor of a [`SingleUse`] sequence.
#[derive(Debug)]
pub struct SingleUseCursor<C> {
    cursor: Option<C>,
}

impl<C: Cursor> Cursor for SingleUseCursor<C> {
    type Item = C::Item;

    fn advance(&mut self) -> Result<Step<C::Item>, Error> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.advance(),
            None => Err(Violation::AlreadyConsumed.into()),
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.close(),
            None => Ok(()),
        }
    }
}
