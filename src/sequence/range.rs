use core::ops::RangeInclusive;

use super::Sequence;
use crate::cursor::IterCursor;

/// A sequence counting from `start` up to and including `end`.
///
/// This `struct` is created by the [`range`] function. See its documentation
/// for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range<T> {
    start: T,
    end: T,
}

/// Create a restartable sequence over `start..=end`.
///
/// The range is empty if `start > end`.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::sequence::{range, Sequence};
///
/// assert_eq!(range(1, 4).drain_all().unwrap(), vec![1, 2, 3, 4]);
/// assert!(range(4, 1).drain_all().unwrap().is_empty());
/// ```
pub fn range<T>(start: T, end: T) -> Range<T>
where
    T: Clone,
    RangeInclusive<T>: Iterator<Item = T>,
{
    Range { start, end }
}

impl<T> Sequence for Range<T>
where
    T: Clone,
    RangeInclusive<T>: Iterator<Item = T>,
{
    type Item = T;
    type Cursor = IterCursor<RangeInclusive<T>>;

    fn cursor(&self) -> Self::Cursor {
        IterCursor::new(self.start.clone()..=self.end.clone())
    }
}
