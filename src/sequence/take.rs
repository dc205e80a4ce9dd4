use super::Sequence;
use crate::{Cursor, Error, Step};

/// A sequence that only produces the first `n` values of another sequence.
///
/// This `struct` is created by the [`take`] method on [`Sequence`]. See its
/// documentation for more.
///
/// [`take`]: Sequence::take
#[derive(Debug, Clone)]
pub struct Take<S> {
    sequence: S,
    limit: usize,
}

impl<S> Take<S> {
    pub(crate) fn new(sequence: S, limit: usize) -> Self {
        Self { sequence, limit }
    }
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;
    type Cursor = TakeCursor<S::Cursor>;

    fn cursor(&self) -> Self::Cursor {
        TakeCursor {
            cursor: self.sequence.cursor(),
            remaining: self.limit,
            upstream_done: false,
        }
    }
}

/// The cursor of a [`Take`] sequence.
#[derive(Debug)]
pub struct TakeCursor<C> {
    cursor: C,
    remaining: usize,
    upstream_done: bool,
}

impl<C: Cursor> TakeCursor<C> {
    fn close_upstream(&mut self) -> Result<(), Error> {
        if self.upstream_done {
            return Ok(());
        }
        self.upstream_done = true;
        self.cursor.close()
    }
}

impl<C: Cursor> Cursor for TakeCursor<C> {
    type Item = C::Item;

    fn advance(&mut self) -> Result<Step<C::Item>, Error> {
        if self.remaining == 0 {
            if !self.upstream_done {
                tracing::trace!("take limit reached, closing upstream");
            }
            self.close_upstream()?;
            return Ok(Step::Exhausted);
        }
        match self.cursor.advance()? {
            Step::Produced(value) => {
                self.remaining -= 1;
                Ok(Step::Produced(value))
            }
            Step::Exhausted => {
                self.remaining = 0;
                self.upstream_done = true;
                Ok(Step::Exhausted)
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.remaining = 0;
        self.close_upstream()
    }
}

#[cfg(test)]
mod test {
    use crate::sequence::{range, Sequence};
    use crate::{Cursor, Step};

    #[test]
    fn stops_after_limit() {
        let first = range(1u64, u64::MAX).take(3);
        assert_eq!(first.drain_all().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn shorter_upstream() {
        let all = range(1, 2).take(5);
        let mut cursor = all.cursor();
        assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
        assert_eq!(cursor.advance().unwrap(), Step::Produced(2));
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn take_zero() {
        assert!(range(1, 2).take(0).drain_all().unwrap().is_empty());
    }
}
