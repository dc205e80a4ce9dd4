use core::future::Future;
use core::marker::PhantomData;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::co::{airlock, Airlock, Co, Resumption};
use super::{Interrupt, State};
use crate::{Error, Violation};

/// What a single step of the body ended with.
pub(crate) enum Outcome<Y, T> {
    Yielded(Y),
    Returned(T),
    Closed,
}

/// The state machine shared by the synchronous and asynchronous coroutines.
///
/// A resumption is delivered with [`Engine::inject`] (or
/// [`Engine::begin_close`]) and then driven with [`Engine::poll_resume`]
/// until it settles. Between those two calls the engine is `Running`.
pub(crate) struct Engine<Y, R, T, F> {
    airlock: Airlock<Y, R>,
    body: Option<Pin<Box<F>>>,
    state: State,
    closing: bool,
    _output: PhantomData<fn() -> T>,
}

impl<Y, R, T, F> Engine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    pub(crate) fn new<B>(body: B) -> Self
    where
        B: FnOnce(Co<Y, R>) -> F,
    {
        let airlock = airlock();
        let body = body(Co::new(airlock.clone()));
        Self {
            airlock,
            body: Some(Box::pin(body)),
            state: State::NotStarted,
            closing: false,
            _output: PhantomData,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing
    }

    /// Deliver a value or a fault to the suspended body.
    pub(crate) fn inject(&mut self, resumption: Resumption<R>) -> Result<(), Error> {
        match self.state {
            State::NotStarted => match resumption {
                // Nothing is suspended yet to receive the value.
                Resumption::Value(_) => {}
                // The body never runs, so nothing can catch the fault.
                Resumption::Fault(fault) => {
                    self.abandon(State::Faulted);
                    return Err(Error::from_fault(fault));
                }
                Resumption::Close => {
                    self.abandon(State::Closed);
                    return Ok(());
                }
            },
            State::Suspended => self.airlock.borrow_mut().resumption = Some(resumption),
            State::Running => return Err(Violation::ResumedWhileRunning.into()),
            State::Completed => return Err(Violation::ResumedAfterCompletion.into()),
            State::Faulted => return Err(Violation::ResumedAfterFault.into()),
            State::Closed => return Err(Violation::ResumedAfterClose.into()),
        }
        self.state = State::Running;
        Ok(())
    }

    /// Start closing the coroutine.
    ///
    /// Returns the final state when there is no cleanup left to drive.
    /// Otherwise the close request has been delivered and the caller must
    /// drive it with `poll_resume`.
    pub(crate) fn begin_close(&mut self) -> Option<State> {
        match self.state {
            State::Suspended => {
                tracing::trace!("closing suspended coroutine");
                self.airlock.borrow_mut().resumption = Some(Resumption::Close);
                self.state = State::Running;
                self.closing = true;
                None
            }
            State::Running if self.closing => None,
            // A resumption is still in flight. Dropping the body cancels it,
            // so a late settlement can never resume anything.
            State::Running | State::NotStarted => {
                tracing::trace!(state = ?self.state, "closing coroutine without cleanup");
                self.abandon(State::Closed);
                Some(State::Closed)
            }
            terminal => Some(terminal),
        }
    }

    /// Drive the current resumption.
    pub(crate) fn poll_resume(&mut self, cx: &mut Context<'_>) -> Poll<Result<Outcome<Y, T>, Error>> {
        let Some(body) = self.body.as_mut() else {
            return Poll::Ready(Err(self.violation()));
        };
        let polled = body.as_mut().poll(cx);
        let yielded = self.airlock.borrow_mut().yielded.take();

        match polled {
            Poll::Ready(result) => Poll::Ready(self.finish(result)),
            Poll::Pending => match yielded {
                Some(_) if self.closing => {
                    self.abandon(State::Closed);
                    Poll::Ready(Err(Violation::YieldedWhileClosing.into()))
                }
                Some(value) => {
                    self.state = State::Suspended;
                    Poll::Ready(Ok(Outcome::Yielded(value)))
                }
                None => Poll::Pending,
            },
        }
    }

    /// Drop the body without letting it run again.
    ///
    /// Destructors of values held across the current suspension point run
    /// here.
    pub(crate) fn abandon(&mut self, state: State) {
        self.body = None;
        self.airlock.borrow_mut().clear();
        self.closing = false;
        self.state = state;
    }

    fn finish(&mut self, result: Result<T, Interrupt>) -> Result<Outcome<Y, T>, Error> {
        let closing = mem::take(&mut self.closing);
        self.body = None;
        self.airlock.borrow_mut().clear();

        match result {
            Ok(_) if closing => {
                self.state = State::Closed;
                Ok(Outcome::Closed)
            }
            Ok(value) => {
                self.state = State::Completed;
                Ok(Outcome::Returned(value))
            }
            Err(interrupt) => match interrupt.into_fault() {
                // A cleanup block faulted while closing.
                Some(fault) if closing => {
                    self.state = State::Closed;
                    Err(Error::from_fault(fault))
                }
                Some(fault) => {
                    self.state = State::Faulted;
                    Err(Error::from_fault(fault))
                }
                None => {
                    self.state = State::Closed;
                    Ok(Outcome::Closed)
                }
            },
        }
    }

    fn violation(&self) -> Error {
        match self.state {
            State::Completed => Violation::ResumedAfterCompletion.into(),
            State::Faulted => Violation::ResumedAfterFault.into(),
            _ => Violation::ResumedAfterClose.into(),
        }
    }
}
