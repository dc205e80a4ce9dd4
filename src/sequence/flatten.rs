use core::fmt;
use core::marker::PhantomData;

use smallvec::SmallVec;

use super::Sequence;
use crate::cursor::{BoxCursor, IterCursor};
use crate::error::CloseErrors;
use crate::{Cursor, Error, Step};

/// A value that is either a leaf or a nested sequence of further values.
///
/// [`Flatten`] descends into every branch it meets, so nesting may be
/// arbitrarily deep.
pub trait Unfold: Sized {
    /// The type of the values at the bottom of the nesting.
    type Leaf;

    /// The cursor over the children of a branch.
    type Children: Cursor<Item = Self>;

    /// Split into a leaf or a cursor over its children.
    fn unfold(self) -> Unfolded<Self::Leaf, Self::Children>;
}

/// The result of [`Unfold::unfold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unfolded<L, C> {
    /// A value to produce as-is.
    Leaf(L),
    /// A nested sequence to drain in place.
    Branch(C),
}

/// A tree of values held in memory.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::sequence::{from_collection, Nested, Sequence};
///
/// let tree = vec![
///     Nested::branch([Nested::Leaf(1), Nested::Leaf(2)]),
///     Nested::branch([Nested::Leaf(3), Nested::branch([Nested::Leaf(4), Nested::Leaf(5)])]),
/// ];
/// let flat = from_collection(tree).flatten();
/// assert_eq!(flat.drain_all().unwrap(), vec![1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested<T> {
    /// A single value.
    Leaf(T),
    /// A list of nested values.
    Branch(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Create a branch from its children.
    pub fn branch(children: impl IntoIterator<Item = Nested<T>>) -> Self {
        Nested::Branch(children.into_iter().collect())
    }
}

impl<T> Unfold for Nested<T> {
    type Leaf = T;
    type Children = IterCursor<std::vec::IntoIter<Nested<T>>>;

    fn unfold(self) -> Unfolded<T, Self::Children> {
        match self {
            Nested::Leaf(value) => Unfolded::Leaf(value),
            Nested::Branch(children) => Unfolded::Branch(IterCursor::new(children)),
        }
    }
}

/// A value that is either a leaf or a live cursor over further values.
///
/// This is how sequences of sequences are flattened: every inner sequence
/// becomes a branch whose cursor is only created once the outer value is
/// pulled, and only advanced once the flattening reaches it.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::sequence::{range, Node, Sequence};
///
/// let triangle = range(1u32, 3).map(|n| Node::sequence(range(1, n))).flatten();
/// assert_eq!(triangle.drain_all().unwrap(), vec![1, 1, 2, 1, 2, 3]);
/// ```
pub enum Node<'a, T> {
    /// A single value.
    Leaf(T),
    /// A cursor over nested values, drained in place.
    Branch(BoxCursor<'a, Node<'a, T>>),
}

impl<'a, T: 'a> Node<'a, T> {
    /// A branch producing every value of `cursor` as a leaf.
    pub fn leaves<C>(cursor: C) -> Self
    where
        C: Cursor<Item = T> + 'a,
    {
        Node::Branch(Box::new(Leaves {
            cursor,
            _node: PhantomData,
        }))
    }

    /// A branch over a fresh cursor of `sequence`.
    pub fn sequence<S>(sequence: S) -> Self
    where
        S: Sequence<Item = T>,
        S::Cursor: 'a,
    {
        Self::leaves(sequence.cursor())
    }
}

impl<'a, T> Unfold for Node<'a, T> {
    type Leaf = T;
    type Children = BoxCursor<'a, Node<'a, T>>;

    fn unfold(self) -> Unfolded<T, Self::Children> {
        match self {
            Node::Leaf(value) => Unfolded::Leaf(value),
            Node::Branch(children) => Unfolded::Branch(children),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(value) => f.debug_tuple("Leaf").field(value).finish(),
            Node::Branch(_) => f.write_str("Branch(..)"),
        }
    }
}

/// Wraps every value of a cursor in [`Node::Leaf`].
struct Leaves<'a, C> {
    cursor: C,
    _node: PhantomData<&'a ()>,
}

impl<'a, C: Cursor> Cursor for Leaves<'a, C> {
    type Item = Node<'a, C::Item>;

    fn advance(&mut self) -> Result<Step<Self::Item>, Error> {
        Ok(self.cursor.advance()?.map(Node::Leaf))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.cursor.close()
    }
}

/// A sequence that flattens nested values depth-first.
///
/// This `struct` is created by the [`flatten`] method on [`Sequence`]. See
/// its documentation for more.
///
/// [`flatten`]: Sequence::flatten
#[derive(Debug, Clone)]
pub struct Flatten<S> {
    sequence: S,
}

impl<S> Flatten<S> {
    pub(crate) fn new(sequence: S) -> Self {
        Self { sequence }
    }
}

impl<S> Sequence for Flatten<S>
where
    S: Sequence,
    S::Item: Unfold,
{
    type Item = <S::Item as Unfold>::Leaf;
    type Cursor = FlattenCursor<S::Cursor>;

    fn cursor(&self) -> Self::Cursor {
        FlattenCursor {
            outer: self.sequence.cursor(),
            stack: SmallVec::new(),
            done: false,
        }
    }
}

/// The cursor of a [`Flatten`] sequence.
///
/// Open branches are kept on an explicit stack, innermost last. A branch is
/// drained completely before the next value of its parent is pulled.
pub struct FlattenCursor<C>
where
    C: Cursor,
    C::Item: Unfold,
{
    outer: C,
    stack: SmallVec<[<C::Item as Unfold>::Children; 4]>,
    done: bool,
}

impl<C> FlattenCursor<C>
where
    C: Cursor,
    C::Item: Unfold,
{
    /// Close every open cursor, innermost first.
    fn close_all(&mut self, errors: &mut CloseErrors) {
        while let Some(mut children) = self.stack.pop() {
            errors.record(children.close());
        }
        errors.record(self.outer.close());
    }
}

impl<C> Cursor for FlattenCursor<C>
where
    C: Cursor,
    C::Item: Unfold,
{
    type Item = <C::Item as Unfold>::Leaf;

    fn advance(&mut self) -> Result<Step<Self::Item>, Error> {
        if self.done {
            return Ok(Step::Exhausted);
        }
        loop {
            let step = match self.stack.last_mut() {
                Some(children) => children.advance(),
                None => self.outer.advance(),
            };
            match step {
                Ok(Step::Produced(value)) => match value.unfold() {
                    Unfolded::Leaf(leaf) => return Ok(Step::Produced(leaf)),
                    Unfolded::Branch(children) => self.stack.push(children),
                },
                Ok(Step::Exhausted) => {
                    if self.stack.pop().is_none() {
                        self.done = true;
                        return Ok(Step::Exhausted);
                    }
                }
                Err(error) => {
                    // The fault ends the chain; release whatever is still open.
                    self.done = true;
                    let mut errors = CloseErrors::new();
                    errors.record(Err(error));
                    self.close_all(&mut errors);
                    return errors.finish().map(|()| Step::Exhausted);
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.done = true;
        let mut errors = CloseErrors::new();
        self.close_all(&mut errors);
        errors.finish()
    }
}

impl<C> fmt::Debug for FlattenCursor<C>
where
    C: Cursor + fmt::Debug,
    C::Item: Unfold,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenCursor")
            .field("outer", &self.outer)
            .field("depth", &self.stack.len())
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coroutine::{Co, Coroutine, Interrupt};
    use crate::sequence::{from_collection, from_coroutine, range, single_use};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// A coroutine yielding `children` that logs its cleanup, and faults
    /// once that cleanup ran if `fail` is set.
    fn tracked(
        name: &'static str,
        log: &Log,
        children: Vec<Node<'static, u32>>,
        fail: bool,
    ) -> impl Cursor<Item = Node<'static, u32>> {
        let log = log.clone();
        Coroutine::new(move |co: Co<Node<'static, u32>>| async move {
            let result = async {
                for child in children {
                    co.yield_(child).await?;
                }
                Ok::<_, Interrupt>(())
            }
            .await;
            log.borrow_mut().push(format!("cleanup {name}"));
            if fail {
                return Err(Interrupt::fault(format!("fail {name}")));
            }
            result
        })
    }

    /// outer: 1, [middle: 2, [inner: 3, 4]], 5
    fn three_levels(log: &Log, fail: [bool; 3]) -> impl Sequence<Item = u32> {
        let inner = tracked("inner", log, vec![Node::Leaf(3), Node::Leaf(4)], fail[0]);
        let middle = tracked(
            "middle",
            log,
            vec![Node::Leaf(2), Node::Branch(Box::new(inner))],
            fail[1],
        );
        let outer = tracked(
            "outer",
            log,
            vec![Node::Leaf(1), Node::Branch(Box::new(middle)), Node::Leaf(5)],
            fail[2],
        );
        single_use(outer).flatten()
    }

    #[test]
    fn depth_first_left_to_right() {
        let tree = vec![
            Nested::branch([Nested::Leaf(1), Nested::Leaf(2)]),
            Nested::Leaf(3),
            Nested::branch([Nested::branch([Nested::branch([Nested::Leaf(4)])])]),
            Nested::branch([]),
            Nested::Leaf(5),
        ];
        let flat = from_collection(tree).flatten();
        assert_eq!(flat.drain_all().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn exhaustion_is_sticky() {
        let flat = from_collection(vec![Nested::Leaf('a')]).flatten();
        let mut cursor = flat.cursor();
        assert_eq!(cursor.advance().unwrap(), Step::Produced('a'));
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn sequence_of_sequences() {
        let triangle = range(1u32, 3).map(|n| Node::sequence(range(1, n))).flatten();
        assert_eq!(triangle.drain_all().unwrap(), vec![1, 1, 2, 1, 2, 3]);
        assert_eq!(triangle.drain_all().unwrap(), vec![1, 1, 2, 1, 2, 3]);
    }

    #[test]
    fn coroutine_branches_close_when_taken() {
        let log = Log::default();
        let inner_log = log.clone();
        let batches = range(1u32, 3).map(move |batch| {
            let log = inner_log.clone();
            Node::sequence(from_coroutine(move || {
                let log = log.clone();
                Coroutine::new(move |co: Co<u32>| async move {
                    let result = async {
                        for n in 0..2 {
                            co.yield_(batch * 10 + n).await?;
                        }
                        Ok::<_, Interrupt>(())
                    }
                    .await;
                    log.borrow_mut().push(format!("cleanup {batch}"));
                    result
                })
            }))
        });

        let head = batches.flatten().take(3);
        assert_eq!(head.drain_all().unwrap(), vec![10, 11, 20]);
        assert_eq!(*log.borrow(), vec!["cleanup 1", "cleanup 2"]);
    }

    #[test]
    fn close_mid_branch_unwinds_innermost_first() {
        let log = Log::default();
        let flat = three_levels(&log, [false; 3]);
        let mut cursor = flat.cursor();
        assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
        assert_eq!(cursor.advance().unwrap(), Step::Produced(2));
        assert_eq!(cursor.advance().unwrap(), Step::Produced(3));
        assert!(log.borrow().is_empty());

        cursor.close().unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["cleanup inner", "cleanup middle", "cleanup outer"]
        );
        cursor.close().unwrap();
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn first_cleanup_fault_wins() {
        let log = Log::default();
        let flat = three_levels(&log, [true, false, true]);
        let mut cursor = flat.cursor();
        for expected in 1..=3 {
            assert_eq!(cursor.advance().unwrap(), Step::Produced(expected));
        }

        let Err(Error::Cleanup(cleanup)) = cursor.close() else {
            panic!("expected a cleanup error");
        };
        assert_eq!(
            *log.borrow(),
            vec!["cleanup inner", "cleanup middle", "cleanup outer"]
        );
        assert_eq!(cleanup.error().to_string(), "producer fault: fail inner");
        assert_eq!(cleanup.suppressed().len(), 1);
        assert_eq!(cleanup.suppressed()[0].to_string(), "producer fault: fail outer");
        assert_eq!(
            cleanup.to_string(),
            "cleanup failed: producer fault: fail inner (1 suppressed)"
        );
    }

    #[test]
    fn branch_fault_closes_the_rest() {
        let log = Log::default();
        let inner = tracked("inner", &log, vec![Node::Leaf(2)], true);
        let outer = tracked(
            "outer",
            &log,
            vec![Node::Leaf(1), Node::Branch(Box::new(inner)), Node::Leaf(3)],
            false,
        );
        let flat = single_use(outer).flatten();
        let mut cursor = flat.cursor();
        assert_eq!(cursor.advance().unwrap(), Step::Produced(1));
        assert_eq!(cursor.advance().unwrap(), Step::Produced(2));

        let error = cursor.advance().unwrap_err();
        assert_eq!(error.to_string(), "producer fault: fail inner");
        assert_eq!(*log.borrow(), vec!["cleanup inner", "cleanup outer"]);
        assert_eq!(cursor.advance().unwrap(), Step::Exhausted);
    }
}
