use super::Sequence;
use crate::{Cursor, Error, Step};

/// A sequence that only keeps the values of another sequence matching a
/// predicate.
///
/// This `struct` is created by the [`filter`] method on [`Sequence`]. See
/// its documentation for more.
///
/// [`filter`]: Sequence::filter
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

impl<S, P> Sequence for Filter<S, P>
where
    S: Sequence,
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

/// The cursor of a [`Filter`] sequence.
#[derive(Debug)]
pub struct FilterCursor<C, P> {
    cursor: C,
    predicate: P,
}

impl<C, P> Cursor for FilterCursor<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn advance(&mut self) -> Result<Step<C::Item>, Error> {
        loop {
            match self.cursor.advance()? {
                Step::Produced(value) if (self.predicate)(&value) => {
                    return Ok(Step::Produced(value))
                }
                Step::Produced(_) => continue,
                Step::Exhausted => return Ok(Step::Exhausted),
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.cursor.close()
    }
}

#[cfg(test)]
mod test {
    use crate::sequence::{range, Sequence};

    #[test]
    fn skips_rejected_values() {
        let odd = range(1, 9).filter(|n| n % 2 == 1);
        assert_eq!(odd.drain_all().unwrap(), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn rejecting_everything_exhausts() {
        let none = range(1, 100).filter(|_| false);
        assert!(none.drain_all().unwrap().is_empty());
    }
}
