//! Consumption loops for synchronous cursors.
//!
//! Each driver pulls from a cursor the caller owns and returns the first
//! fault immediately, without swallowing it. None of them close the cursor:
//! a drained cursor has nothing left to clean up, and one that was left
//! paused is the caller's to resume or close.
//!
//! The asynchronous counterparts live in [`stream::drive`](crate::stream::drive).

use crate::{Cursor, Error, Step};

/// Advance `cursor` until it is exhausted, collecting every value in order.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::cursor::IterCursor;
/// use lazy_pipeline::drive;
///
/// let mut cursor = IterCursor::new(1..=3);
/// assert_eq!(drive::drain_all(&mut cursor).unwrap(), vec![1, 2, 3]);
/// ```
pub fn drain_all<C>(cursor: &mut C) -> Result<Vec<C::Item>, Error>
where
    C: Cursor + ?Sized,
{
    let mut values = Vec::new();
    while let Step::Produced(value) = cursor.advance()? {
        values.push(value);
    }
    Ok(values)
}

/// Advance `cursor` until `predicate` accepts a value or the cursor is
/// exhausted.
///
/// Returns every value produced, the accepted one last. The cursor is not
/// advanced again after a match, so it stays paused right after it.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::cursor::IterCursor;
/// use lazy_pipeline::{drive, Cursor, Step};
///
/// let mut cursor = IterCursor::new(1..);
/// let head = drive::drain_until(&mut cursor, |n| *n == 3).unwrap();
/// assert_eq!(head, vec![1, 2, 3]);
/// assert_eq!(cursor.advance().unwrap(), Step::Produced(4));
/// ```
pub fn drain_until<C, P>(cursor: &mut C, mut predicate: P) -> Result<Vec<C::Item>, Error>
where
    C: Cursor + ?Sized,
    P: FnMut(&C::Item) -> bool,
{
    let mut values = Vec::new();
    while let Step::Produced(value) = cursor.advance()? {
        let matched = predicate(&value);
        values.push(value);
        if matched {
            break;
        }
    }
    Ok(values)
}

/// Advance `cursor` until it is exhausted, calling `f` on every value.
pub fn for_each<C, F>(cursor: &mut C, mut f: F) -> Result<(), Error>
where
    C: Cursor + ?Sized,
    F: FnMut(C::Item),
{
    while let Step::Produced(value) = cursor.advance()? {
        f(value);
    }
    Ok(())
}
