//! Restartable sources of cursors, and the lazy operators composing them.
//!
//! A [`Sequence`] is a factory: every call to [`Sequence::cursor`] starts a
//! fresh, independent pass over its values. Operators such as
//! [`map`](Sequence::map) or [`take`](Sequence::take) wrap a sequence in a
//! new one without pulling a single value; work only happens while a cursor
//! is being advanced.
//!
//! # Examples
//!
//! ```
//! use lazy_pipeline::sequence::{self, Sequence};
//!
//! let evens = sequence::range(1, 10)
//!     .filter(|n| n % 2 == 0)
//!     .map(|n| n * 10);
//!
//! assert_eq!(evens.drain_all().unwrap(), vec![20, 40, 60, 80, 100]);
//! // Every pass starts from the beginning.
//! assert_eq!(evens.drain_all().unwrap(), vec![20, 40, 60, 80, 100]);
//! ```
//!
//! # Constructors
//!
//! | Constructor         | Restartable | Notes
//! | ---                 | ---         | ---
//! | [`range`]           | yes         | inclusive of both bounds
//! | [`from_collection`] | yes         | clones the collection per pass
//! | [`from_coroutine`]  | yes         | calls the factory per pass
//! | [`single_use`]      | no          | a second cursor fails with [`Violation::AlreadyConsumed`](crate::Violation::AlreadyConsumed)

mod collection;
mod filter;
mod flatten;
mod from_coroutine;
mod map;
mod range;
mod take;

pub use collection::{from_collection, Collection};
pub use filter::{Filter, FilterCursor};
pub use flatten::{Flatten, FlattenCursor, Nested, Node, Unfold, Unfolded};
pub use from_coroutine::{from_coroutine, single_use, FromCoroutine, SingleUse, SingleUseCursor};
pub use map::{Map, MapCursor, TryMap, TryMapCursor};
pub use range::{range, Range};
pub use take::{Take, TakeCursor};

use crate::{drive, Cursor, Error, Fault};

/// A factory of independent cursors.
///
/// Calling [`cursor`](Sequence::cursor) twice must yield two cursors that
/// don't share position state, unless the implementation documents itself
/// as single-use.
pub trait Sequence {
    /// The type of the values being produced.
    type Item;

    /// The cursor driving one pass over the sequence.
    type Cursor: Cursor<Item = Self::Item>;

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

    /// Transform every value with a fallible `f`.
    ///
    /// An `Err` returned by `f` is a producer fault: it is returned from the
    /// `advance` call that triggered it, and the upstream cursor is closed.
    fn try_map<F, B, E>(self, f: F) -> TryMap<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> Result<B, E> + Clone,
        E: Into<Fault>,
    {
        TryMap::new(self, f)
    }

    /// Only keep the values for which `predicate` returns `true`.
    ///
    /// There is no bound on how many values are skipped within a single
    /// `advance` call.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool + Clone,
    {
        Filter::new(self, predicate)
    }

    /// Produce at most `limit` values.
    ///
    /// Once the limit is reached the upstream cursor is closed instead of
    /// being advanced again.
    fn take(self, limit: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take::new(self, limit)
    }

    /// Flatten nested values depth-first, left to right.
    ///
    /// Values are either in-memory [`Nested`] trees or [`Node`]s, whose
    /// branches are cursors of their own, for example one per inner sequence.
    /// Closing the flattened cursor closes every open branch, innermost
    /// first, then the outer cursor.
    fn flatten(self) -> Flatten<Self>
    where
        Self: Sized,
        Self::Item: Unfold,
    {
        Flatten::new(self)
    }

    /// Drive a fresh cursor to exhaustion, collecting every value.
    fn drain_all(&self) -> Result<Vec<Self::Item>, Error> {
        drive::drain_all(&mut self.cursor())
    }

    /// Drive a fresh cursor until `predicate` accepts a value.
    ///
    /// Returns the values produced so far, the accepted one included, along
    /// with the cursor. The cursor is left paused, not closed: the caller can
    /// keep advancing it or close it.
    fn drain_until<P>(&self, predicate: P) -> Result<(Vec<Self::Item>, Self::Cursor), Error>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        let mut cursor = self.cursor();
        let values = drive::drain_until(&mut cursor, predicate)?;
        Ok((values, cursor))
    }

    /// Drive a fresh cursor to exhaustion, calling `f` on every value.
    fn for_each<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnMut(Self::Item),
    {
        drive::for_each(&mut self.cursor(), f)
    }
}

impl<S: Sequence + ?Sized> Sequence for &S {
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Self::Cursor {
        (**self).cursor()
    }
}
