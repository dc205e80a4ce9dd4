//! The pull protocol shared by every sequence in this crate.
//!
//! A [`Cursor`] is a stateful, single-owner position within some sequence of
//! values. The only way to make progress is to call [`Cursor::advance`],
//! which either produces the next value or reports that no more values will
//! ever be produced.
//!
//! # Examples
//!
//! ```
//! use lazy_pipeline::cursor::{Cursor, IterCursor};
//! use lazy_pipeline::Step;
//!
//! let mut cursor = IterCursor::new(vec![1, 2]);
//! assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
//! assert_eq!(cursor.advance().unwrap(), Step::Produced(2));
//! assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
//! assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
//! ```

use crate::Error;

/// The outcome of advancing a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "a produced value is lost if the step is ignored"]
pub enum Step<T> {
    /// A value is available.
    Produced(T),
    /// No more values will be produced.
    Exhausted,
}

impl<T> Step<T> {
    /// Returns `true` if the cursor has run out of values.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Step::Exhausted)
    }

    /// Maps the produced value with `f`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Produced(value) => Step::Produced(f(value)),
            Step::Exhausted => Step::Exhausted,
        }
    }

    /// Converts into an `Option`, mapping `Exhausted` to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Step::Produced(value) => Some(value),
            Step::Exhausted => None,
        }
    }
}

impl<T> From<Option<T>> for Step<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Step::Produced(value),
            None => Step::Exhausted,
        }
    }
}

/// A stateful position within a sequence of values.
///
/// # Protocol
///
/// - Once `advance` has returned [`Step::Exhausted`], every later call
///   returns `Exhausted` as well.
/// - A fault (`Err`) terminates the cursor: it is reported once and the
///   cursor behaves as exhausted afterwards.
/// - Only one `advance` may be outstanding at a time. This is enforced by
///   taking `&mut self`.
/// - `close` abandons the cursor early. It runs pending cleanup in every
///   upstream cursor it owns and is idempotent.
pub trait Cursor {
    /// The type of the values being produced.
    type Item;

    /// Produce the next value, or report exhaustion.
    fn advance(&mut self) -> Result<Step<Self::Item>, Error>;

    /// Terminate the cursor early, running any pending cleanup.
    ///
    /// The default implementation has nothing to clean up.
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Convert the cursor into an [`Iterator`] over its results.
    ///
    /// The iterator stops after the first error.
    fn into_results(self) -> IntoResults<Self>
    where
        Self: Sized,
    {
        IntoResults {
            cursor: self,
            done: false,
        }
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    type Item = C::Item;

    fn advance(&mut self) -> Result<Step<Self::Item>, Error> {
        (**self).advance()
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn advance(&mut self) -> Result<Step<Self::Item>, Error> {
        (**self).advance()
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

/// A boxed, type-erased cursor.
pub type BoxCursor<'a, T> = Box<dyn Cursor<Item = T> + 'a>;

/// A cursor over the values of an [`Iterator`].
///
/// Closing it drops the remaining values without visiting them.
#[derive(Debug, Clone)]
pub struct IterCursor<I> {
    iter: Option<I>,
}

impl<I: Iterator> IterCursor<I> {
    /// Create a cursor from anything that can be iterated over.
    pub fn new<T>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: Some(iter.into_iter()),
        }
    }
}

impl<I: Iterator> Cursor for IterCursor<I> {
    type Item = I::Item;

    fn advance(&mut self) -> Result<Step<Self::Item>, Error> {
        let Some(iter) = self.iter.as_mut() else {
            return Ok(Step::Exhausted);
        };
        match iter.next() {
            Some(value) => Ok(Step::Produced(value)),
            None => {
                // Iterators aren't required to be fused.
                self.iter = None;
                Ok(Step::Exhausted)
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.iter = None;
        Ok(())
    }
}

/// An iterator over the results of a cursor.
///
/// This `struct` is created by the [`into_results`] method on [`Cursor`].
/// See its documentation for more.
///
/// [`into_results`]: Cursor::into_results
#[derive(Debug)]
pub struct IntoResults<C> {
    cursor: C,
    done: bool,
}

impl<C> IntoResults<C> {
    /// Recover the underlying cursor.
    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<C: Cursor> Iterator for IntoResults<C> {
    type Item = Result<C::Item, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.advance() {
            Ok(Step::Produced(value)) => Some(Ok(value)),
            Ok(Step::Exhausted) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// An iterator that yields again after returning `None`.
    struct Flaky(u8);

    impl Iterator for Flaky {
        type Item = u8;

        fn next(&mut self) -> Option<u8> {
            self.0 += 1;
            (self.0 % 2 == 0).then_some(self.0)
        }
    }

    #[test]
    fn exhaustion_is_sticky() {
        let mut cursor = IterCursor::new(Flaky(0));
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn close_drops_remaining_values() {
        let mut cursor = IterCursor::new(1..10);
        assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
        cursor.close().unwrap();
        cursor.close().unwrap();
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn into_results() {
        let values: Result<Vec<_>, _> = IterCursor::new("abc".chars()).into_results().collect();
        assert_eq!(values.unwrap(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn boxed() {
        let mut cursor: BoxCursor<'_, u8> = Box::new(IterCursor::new([7]));
        assert_eq!(cursor.advance().unwrap(), Step::Produced(7));
        assert!(cursor.advance().unwrap().is_exhausted());
    }
}
