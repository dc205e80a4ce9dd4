use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::AsyncCursor;
use crate::{Error, Step};

/// Future for advancing an [`AsyncCursor`].
///
/// This `struct` is created by the [`advance`] method on [`AsyncCursorExt`].
/// See its documentation for more.
///
/// [`advance`]: super::AsyncCursorExt::advance
/// [`AsyncCursorExt`]: super::AsyncCursorExt
#[derive(Debug)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Advance<'a, C: ?Sized> {
    cursor: &'a mut C,
}

impl<'a, C: ?Sized> Advance<'a, C> {
    pub(crate) fn new(cursor: &'a mut C) -> Self {
        Self { cursor }
    }
}

impl<C: AsyncCursor + Unpin + ?Sized> Future for Advance<'_, C> {
    type Output = Result<Step<C::Item>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut *self.get_mut().cursor).poll_advance(cx)
    }
}

/// Future for closing an [`AsyncCursor`].
///
/// This `struct` is created by the [`close`] method on [`AsyncCursorExt`].
/// See its documentation for more.
///
/// [`close`]: super::AsyncCursorExt::close
/// [`AsyncCursorExt`]: super::AsyncCursorExt
#[derive(Debug)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct CloseCursor<'a, C: ?Sized> {
    cursor: &'a mut C,
}

impl<'a, C: ?Sized> CloseCursor<'a, C> {
    pub(crate) fn new(cursor: &'a mut C) -> Self {
        Self { cursor }
    }
}

impl<C: AsyncCursor + Unpin + ?Sized> Future for CloseCursor<'_, C> {
    type Output = Result<(), Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut *self.get_mut().cursor).poll_close(cx)
    }
}
