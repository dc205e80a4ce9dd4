use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::cell::RefCell;
use std::error::Error as StdError;
use std::rc::Rc;

use crate::{Cursor, Error, Fault, Step};

/// What a suspended body is resumed with.
pub(crate) enum Resumption<R> {
    Value(R),
    Fault(Fault),
    Close,
}

/// The slots shared between a coroutine and its body.
pub(crate) struct Exchange<Y, R> {
    pub(crate) yielded: Option<Y>,
    pub(crate) resumption: Option<Resumption<R>>,
}

impl<Y, R> Exchange<Y, R> {
    pub(crate) fn clear(&mut self) {
        self.yielded = None;
        self.resumption = None;
    }
}

pub(crate) type Airlock<Y, R> = Rc<RefCell<Exchange<Y, R>>>;

pub(crate) fn airlock<Y, R>() -> Airlock<Y, R> {
    Rc::new(RefCell::new(Exchange {
        yielded: None,
        resumption: None,
    }))
}

/// The handle a coroutine body uses to suspend itself.
///
/// `Y` is the type of the values yielded out of the body and `R` the type of
/// the values injected back in when it is resumed.
pub struct Co<Y, R = ()> {
    airlock: Airlock<Y, R>,
}

impl<Y, R> fmt::Debug for Co<Y, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Co").finish_non_exhaustive()
    }
}

impl<Y, R> Co<Y, R> {
    pub(crate) fn new(airlock: Airlock<Y, R>) -> Self {
        Self { airlock }
    }

    /// Suspend the body, handing `value` to the caller that resumed it.
    ///
    /// The returned future resolves to the value injected by the next
    /// resumption, or to an [`Interrupt`] if the coroutine is faulted or
    /// closed while suspended here.
    pub fn yield_(&self, value: Y) -> Suspend<'_, Y, R> {
        Suspend {
            airlock: &self.airlock,
            value: Some(value),
        }
    }

    /// Yield every value of `cursor` in turn, then continue.
    ///
    /// Values injected while suspended inside the delegation are discarded.
    /// If the coroutine is interrupted while delegating, `cursor` is closed
    /// before the interrupt is returned.
    pub async fn delegate<C>(&self, mut cursor: C) -> Result<(), Interrupt>
    where
        C: Cursor<Item = Y>,
    {
        loop {
            let value = match cursor.advance() {
                Ok(Step::Produced(value)) => value,
                Ok(Step::Exhausted) => return Ok(()),
                Err(error) => return Err(Interrupt::from_error(error)),
            };
            if let Err(interrupt) = self.yield_(value).await {
                return Err(interrupt.after_closing(&mut cursor));
            }
        }
    }
}

/// A suspension point inside a coroutine body.
///
/// This `struct` is created by the [`yield_`] method on [`Co`]. See its
/// documentation for more.
///
/// [`yield_`]: Co::yield_
#[must_use = "values are only yielded when the suspension point is awaited"]
pub struct Suspend<'a, Y, R> {
    airlock: &'a Airlock<Y, R>,
    value: Option<Y>,
}

impl<Y, R> fmt::Debug for Suspend<'_, Y, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspend")
            .field("yielded", &self.value.is_none())
            .finish()
    }
}

// `Suspend` never pins its fields.
impl<Y, R> Unpin for Suspend<'_, Y, R> {}

impl<Y, R> Future for Suspend<'_, Y, R> {
    type Output = Result<R, Interrupt>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut exchange = this.airlock.borrow_mut();

        // First poll: hand the value out and pause.
        if let Some(value) = this.value.take() {
            exchange.yielded = Some(value);
            return Poll::Pending;
        }

        match exchange.resumption.take() {
            Some(Resumption::Value(value)) => Poll::Ready(Ok(value)),
            Some(Resumption::Fault(fault)) => Poll::Ready(Err(Interrupt::fault(fault))),
            Some(Resumption::Close) => Poll::Ready(Err(Interrupt::close())),
            None => Poll::Pending,
        }
    }
}

/// Why a suspension point did not resume with a value.
///
/// Bodies usually propagate it with `?`. Any error type converts into an
/// interrupt, so `?` also works on the body's own fallible operations.
pub struct Interrupt {
    kind: Kind,
}

enum Kind {
    Fault(Fault),
    Close,
}

impl Interrupt {
    /// Raise a fault out of the coroutine body.
    pub fn fault(fault: impl Into<Fault>) -> Self {
        Self {
            kind: Kind::Fault(fault.into()),
        }
    }

    pub(crate) fn close() -> Self {
        Self { kind: Kind::Close }
    }

    pub(crate) fn from_error(error: Error) -> Self {
        Self::fault(Box::new(error) as Fault)
    }

    /// Returns `true` if the coroutine is being closed.
    pub fn is_close(&self) -> bool {
        matches!(self.kind, Kind::Close)
    }

    /// The injected fault, if any.
    pub fn as_fault(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &self.kind {
            Kind::Fault(fault) => Some(fault.as_ref()),
            Kind::Close => None,
        }
    }

    /// Take the injected fault, if any.
    pub fn into_fault(self) -> Option<Fault> {
        match self.kind {
            Kind::Fault(fault) => Some(fault),
            Kind::Close => None,
        }
    }

    /// Close a delegate cursor on the way out.
    ///
    /// While closing, a failing delegate turns the interrupt into that fault.
    /// While faulting, the original fault wins.
    fn after_closing<C: Cursor + ?Sized>(self, cursor: &mut C) -> Self {
        match cursor.close() {
            Ok(()) => self,
            Err(error) if self.is_close() => Self::from_error(error),
            Err(error) => {
                tracing::debug!(%error, "suppressing delegate cleanup error");
                self
            }
        }
    }
}

impl<E> From<E> for Interrupt
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::fault(error)
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Fault(fault) => f.debug_tuple("Interrupt::Fault").field(fault).finish(),
            Kind::Close => f.write_str("Interrupt::Close"),
        }
    }
}
