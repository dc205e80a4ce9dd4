use super::Sequence;
use crate::cursor::IterCursor;

/// A sequence over the items of a collection.
///
/// This `struct` is created by the [`from_collection`] function. See its
/// documentation for more.
#[derive(Debug, Clone)]
pub struct Collection<I> {
    items: I,
}

/// Create a restartable sequence over the items of a collection.
///
/// Every cursor iterates over its own clone of `items`. Pass a reference
/// (such as `&vec`) to iterate by reference instead.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::sequence::{from_collection, Sequence};
///
/// let words = vec!["chashu", "nori"];
/// let lengths = from_collection(&words).map(|word| word.len());
/// assert_eq!(lengths.drain_all().unwrap(), vec![6, 4]);
/// ```
pub fn from_collection<I>(items: I) -> Collection<I>
where
    I: IntoIterator + Clone,
{
    Collection { items }
}

impl<I> Sequence for Collection<I>
where
    I: IntoIterator + Clone,
{
    type Item = I::Item;
    type Cursor = IterCursor<I::IntoIter>;

    fn cursor(&self) -> Self::Cursor {
        IterCursor::new(self.items.clone())
    }
}
