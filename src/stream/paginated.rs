use core::fmt;
use core::future::Future;
use core::marker::PhantomData;
use core::mem;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use std::collections::VecDeque;

use pin_project::pin_project;

use super::{AsyncCursor, AsyncSequence};
use crate::{Error, Fault, Step};

/// One page returned by a paginated fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, Tok> {
    /// The values on this page, in order.
    pub items: Vec<T>,
    /// The token of the following page, or `None` on the last page.
    pub next_token: Option<Tok>,
}

impl<T, Tok> Page<T, Tok> {
    /// Create a page followed by the page at `next_token`.
    pub fn new(items: Vec<T>, next_token: Option<Tok>) -> Self {
        Self { items, next_token }
    }

    /// Create the last page.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// An asynchronous sequence over the values of a paginated source.
///
/// This `struct` is created by the [`paginated`] function. See its
/// documentation for more.
pub struct Paginated<F, Tok> {
    fetch: F,
    _token: PhantomData<fn() -> Tok>,
}

/// Create an asynchronous sequence from a page fetching function.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's `next_token` after that. A page is only fetched once every value
/// of the previous one has been consumed, and never while another fetch is
/// still in flight. The sequence is exhausted after the page without a
/// `next_token` has been drained.
///
/// An error returned by `fetch` is a producer fault.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::stream::{paginated, AsyncCursorExt, AsyncSequence, Page};
/// use lazy_pipeline::Step;
/// use futures_lite::future::block_on;
///
/// let rows = paginated(|offset: Option<usize>| async move {
///     let offset = offset.unwrap_or(0);
///     let rows: Vec<usize> = (offset..offset + 3).collect();
///     let next = (offset < 3).then_some(offset + 3);
///     Ok::<_, std::io::Error>(Page::new(rows, next))
/// });
///
/// let (head, mut rest) = block_on(rows.drain_until(|n| *n == 1)).unwrap();
/// assert_eq!(head, vec![0, 1]);
/// assert_eq!(block_on(rest.advance()).unwrap(), Step::Produced(2));
/// ```
pub fn paginated<F, Fut, T, Tok, E>(fetch: F) -> Paginated<F, Tok>
where
    F: Fn(Option<Tok>) -> Fut + Clone,
    Fut: Future<Output = Result<Page<T, Tok>, E>>,
    E: Into<Fault>,
{
    Paginated {
        fetch,
        _token: PhantomData,
    }
}

impl<F: Clone, Tok> Clone for Paginated<F, Tok> {
    fn clone(&self) -> Self {
        Self {
            fetch: self.fetch.clone(),
            _token: PhantomData,
        }
    }
}

impl<F, Tok> fmt::Debug for Paginated<F, Tok> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginated").finish_non_exhaustive()
    }
}

impl<F, Fut, T, Tok, E> AsyncSequence for Paginated<F, Tok>
where
    F: Fn(Option<Tok>) -> Fut + Clone,
    Fut: Future<Output = Result<Page<T, Tok>, E>>,
    E: Into<Fault>,
{
    type Item = T;
    type Cursor = PaginatedCursor<F, Fut, T, Tok>;

    fn cursor(&self) -> Self::Cursor {
        PaginatedCursor {
            fetch: self.fetch.clone(),
            in_flight: None,
            buffer: VecDeque::new(),
            next: NextPage::Start,
            pages: 0,
        }
    }
}

/// Which page to fetch once the buffer runs dry.
#[derive(Debug)]
enum NextPage<Tok> {
    Start,
    Token(Tok),
    End,
}

/// The cursor of a [`Paginated`] sequence.
///
/// Holds at most one page worth of values and at most one pending fetch.
#[pin_project]
pub struct PaginatedCursor<F, Fut, T, Tok> {
    fetch: F,
    #[pin]
    in_flight: Option<Fut>,
    buffer: VecDeque<T>,
    next: NextPage<Tok>,
    pages: usize,
}

impl<F, Fut, T, Tok, E> AsyncCursor for PaginatedCursor<F, Fut, T, Tok>
where
    F: Fn(Option<Tok>) -> Fut,
    Fut: Future<Output = Result<Page<T, Tok>, E>>,
    E: Into<Fault>,
{
    type Item = T;

    fn poll_advance(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<Step<T>, Error>> {
        let mut this = self.project();
        loop {
            if let Some(value) = this.buffer.pop_front() {
                return Poll::Ready(Ok(Step::Produced(value)));
            }

            if let Some(fetch) = this.in_flight.as_mut().as_pin_mut() {
                let result = ready!(fetch.poll(cx));
                this.in_flight.set(None);
                match result {
                    Ok(page) => {
                        *this.pages += 1;
                        tracing::trace!(
                            page = *this.pages,
                            items = page.items.len(),
                            last = page.next_token.is_none(),
                            "fetched page"
                        );
                        this.buffer.extend(page.items);
                        if let Some(token) = page.next_token {
                            *this.next = NextPage::Token(token);
                        }
                    }
                    Err(error) => {
                        tracing::debug!(page = *this.pages + 1, "page fetch failed");
                        return Poll::Ready(Err(Error::from_fault(error.into())));
                    }
                }
                continue;
            }

            // The token is taken out so a failed fetch leaves nothing to
            // resume from.
            let fetch = match mem::replace(this.next, NextPage::End) {
                NextPage::Start => (this.fetch)(None),
                NextPage::Token(token) => (this.fetch)(Some(token)),
                NextPage::End => return Poll::Ready(Ok(Step::Exhausted)),
            };
            this.in_flight.set(Some(fetch));
        }
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        let mut this = self.project();
        if this.in_flight.is_some() {
            tracing::trace!("dropping in-flight page fetch");
        }
        this.in_flight.set(None);
        this.buffer.clear();
        *this.next = NextPage::End;
        Poll::Ready(Ok(()))
    }
}

impl<F, Fut, T, Tok> fmt::Debug for PaginatedCursor<F, Fut, T, Tok> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedCursor")
            .field("pages", &self.pages)
            .field("buffered", &self.buffer.len())
            .field("fetching", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stream::AsyncCursorExt;
    use futures_lite::future::block_on;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    #[test]
    fn skips_empty_pages() {
        let pages = paginated(|token: Option<u8>| async move {
            let page = match token {
                None => Page::new(vec![], Some(1)),
                Some(1) => Page::new(vec!['x'], Some(2)),
                Some(_) => Page::last(vec![]),
            };
            Ok::<_, io::Error>(page)
        });
        assert_eq!(block_on(pages.drain_all()).unwrap(), vec!['x']);
    }

    #[test]
    fn fetch_errors_are_faults() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = calls.clone();
        let pages = paginated(move |token: Option<u8>| {
            log.borrow_mut().push(token);
            async move {
                match token {
                    None => Ok(Page::new(vec![1, 2], Some(1))),
                    Some(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
                }
            }
        });

        block_on(async {
            let mut cursor = core::pin::pin!(pages.cursor());
            assert_eq!(cursor.advance().await.unwrap(), Step::Produced(1));
            assert_eq!(cursor.advance().await.unwrap(), Step::Produced(2));
            let error = cursor.advance().await.unwrap_err();
            assert!(error.is_fault());
            assert_eq!(error.to_string(), "producer fault: timed out");
            assert_eq!(cursor.advance().await.unwrap(), Step::Exhausted);
        });
        assert_eq!(*calls.borrow(), vec![None, Some(1)]);
    }

    #[test]
    fn close_discards_the_buffer() {
        let pages = paginated(|_: Option<()>| async { Ok::<_, io::Error>(Page::last(vec![1, 2, 3])) });
        block_on(async {
            let mut cursor = Box::pin(pages.cursor());
            assert_eq!(cursor.advance().await.unwrap(), Step::Produced(1));
            cursor.close().await.unwrap();
            assert_eq!(cursor.advance().await.unwrap(), Step::Exhausted);
        });
    }
}
