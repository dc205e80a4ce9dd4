use super::Sequence;
use crate::error::CloseErrors;
use crate::{Cursor, Error, Fault, Step};

/// A sequence that maps the values of another sequence with a function.
///
/// This `struct` is created by the [`map`] method on [`Sequence`]. See its
/// documentation for more.
///
/// [`map`]: Sequence::map
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

impl<S, F, B> Sequence for Map<S, F>
where
    S: Sequence,
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

/// The cursor of a [`Map`] sequence.
#[derive(Debug)]
pub struct MapCursor<C, F> {
    cursor: C,
    f: F,
}

impl<C, F, B> Cursor for MapCursor<C, F>
where
    C: Cursor,
    F: FnMut(C::Item) -> B,
{
    type Item = B;

    fn advance(&mut self) -> Result<Step<B>, Error> {
        Ok(self.cursor.advance()?.map(&mut self.f))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.cursor.close()
    }
}

/// A sequence that maps the values of another sequence with a fallible
/// function.
///
/// This `struct` is created by the [`try_map`] method on [`Sequence`]. See
/// its documentation for more.
///
/// [`try_map`]: Sequence::try_map
#[derive(Debug, Clone)]
pub struct TryMap<S, F> {
    sequence: S,
    f: F,
}

impl<S, F> TryMap<S, F> {
    pub(crate) fn new(sequence: S, f: F) -> Self {
        Self { sequence, f }
    }
}

impl<S, F, B, E> Sequence for TryMap<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> Result<B, E> + Clone,
    E: Into<Fault>,
{
    type Item = B;
    type Cursor = TryMapCursor<S::Cursor, F>;

    fn cursor(&self) -> Self::Cursor {
        TryMapCursor {
            cursor: self.sequence.cursor(),
            f: self.f.clone(),
            done: false,
        }
    }
}

/// The cursor of a [`TryMap`] sequence.
#[derive(Debug)]
pub struct TryMapCursor<C, F> {
    cursor: C,
    f: F,
    done: bool,
}

impl<C, F, B, E> Cursor for TryMapCursor<C, F>
where
    C: Cursor,
    F: FnMut(C::Item) -> Result<B, E>,
    E: Into<Fault>,
{
    type Item = B;

    fn advance(&mut self) -> Result<Step<B>, Error> {
        if self.done {
            return Ok(Step::Exhausted);
        }
        let value = match self.cursor.advance() {
            Ok(Step::Produced(value)) => value,
            Ok(Step::Exhausted) => return Ok(Step::Exhausted),
            Err(error) => {
                self.done = true;
                return Err(error);
            }
        };
        match (self.f)(value) {
            Ok(value) => Ok(Step::Produced(value)),
            Err(fault) => {
                // The fault ends the chain, so release the upstream now.
                self.done = true;
                let mut errors = CloseErrors::new();
                errors.record(Err(Error::from_fault(fault.into())));
                errors.record(self.cursor.close());
                errors.finish().map(|()| Step::Exhausted)
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.done = true;
        self.cursor.close()
    }
}

#[cfg(test)]
mod test {
    use crate::sequence::{from_collection, range, Sequence};
    use crate::{Cursor, Step};

    #[test]
    fn map() {
        let squares = range(1, 4).map(|n| n * n);
        assert_eq!(squares.drain_all().unwrap(), vec![1, 4, 9, 16]);
    }

    #[test]
    fn try_map_fault_terminates() {
        let parsed = from_collection(["1", "x", "3"]).try_map(|s| s.parse::<u8>());
        let mut cursor = parsed.cursor();
        assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
        assert!(cursor.advance().unwrap_err().is_fault());
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }
}
