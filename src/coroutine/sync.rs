use core::fmt;
use core::future::Future;
use core::task::{Context, Poll, Waker};

use super::co::Resumption;
use super::engine::{Engine, Outcome};
use super::{Co, CoroutineState, Interrupt, State};
use crate::{utils, Cursor, Error, Fault, Step, Violation};

/// A coroutine resumed synchronously by its caller.
///
/// The body may only await its own suspension points: awaiting anything else
/// is reported as [`Violation::ForeignAwait`]. Use
/// [`AsyncCoroutine`](super::AsyncCoroutine) for bodies that wait on I/O.
///
/// A coroutine is single-shot. To iterate the same computation more than
/// once, build a fresh coroutine per pass with
/// [`from_coroutine`](crate::sequence::from_coroutine).
///
/// Dropping a suspended coroutine closes it, so its cleanup still runs.
/// Cleanup faults raised that way can't be returned and are logged instead.
///
/// # Examples
///
/// ```
/// use lazy_pipeline::coroutine::{Co, Coroutine, Interrupt};
/// use lazy_pipeline::{Cursor, Step};
///
/// let mut countdown = Coroutine::new(|co: Co<u32>| async move {
///     for n in (1..=3).rev() {
///         co.yield_(n).await?;
///     }
///     Ok::<_, Interrupt>(())
/// });
///
/// assert_eq!(countdown.advance().unwrap(), Step::Produced(3));
/// assert_eq!(countdown.advance().unwrap(), Step::Produced(2));
/// assert_eq!(countdown.advance().unwrap(), Step::Produced(1));
/// assert_eq!(countdown.advance().unwrap(), Step::Exhausted);
/// ```
pub struct Coroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    engine: Engine<Y, R, T, F>,
    waker: Waker,
}

impl<Y, R, T, F> Coroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    /// Create a coroutine from its body.
    ///
    /// `body` is called right away to build the body's future, but none of
    /// the code inside the returned `async` block runs until the first
    /// resumption.
    pub fn new<B>(body: B) -> Self
    where
        B: FnOnce(Co<Y, R>) -> F,
    {
        Self {
            engine: Engine::new(body),
            waker: utils::noop_waker(),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        self.engine.state()
    }

    /// Run the body until its next suspension point or until it returns.
    ///
    /// `value` becomes the result of the suspension point the body is paused
    /// at. It is ignored on the first resumption.
    ///
    /// # Errors
    ///
    /// Returns the fault if one escapes the body, which leaves the coroutine
    /// `Faulted`. Resuming a coroutine that is completed, faulted or closed
    /// is a protocol violation.
    pub fn resume(&mut self, value: R) -> Result<CoroutineState<Y, T>, Error> {
        self.engine.inject(Resumption::Value(value))?;
        self.run()
    }

    /// Resume the body by raising `fault` at its suspension point.
    ///
    /// The body may handle the fault and keep going. If the coroutine hasn't
    /// started yet the body never runs and the fault is returned right away.
    pub fn resume_with_fault(
        &mut self,
        fault: impl Into<Fault>,
    ) -> Result<CoroutineState<Y, T>, Error> {
        self.engine.inject(Resumption::Fault(fault.into()))?;
        self.run()
    }

    /// Terminate the coroutine early.
    ///
    /// A suspended body is unwound from its suspension point so its cleanup
    /// runs, then the coroutine becomes `Closed`. A coroutine that never
    /// started is closed without running any code. Closing a coroutine that
    /// already reached a terminal state does nothing. The final state is
    /// returned either way.
    ///
    /// # Errors
    ///
    /// Returns the fault raised by a cleanup block, or
    /// [`Violation::YieldedWhileClosing`] if the body tried to suspend again.
    /// The coroutine is `Closed` in both cases.
    pub fn close(&mut self) -> Result<State, Error> {
        if let Some(state) = self.engine.begin_close() {
            return Ok(state);
        }
        self.step(State::Closed).map(|_| State::Closed)
    }

    fn run(&mut self) -> Result<CoroutineState<Y, T>, Error> {
        match self.step(State::Faulted)? {
            Outcome::Yielded(value) => Ok(CoroutineState::Yielded(value)),
            Outcome::Returned(value) => Ok(CoroutineState::Complete(value)),
            Outcome::Closed => Err(Violation::ResumedAfterClose.into()),
        }
    }

    /// Poll the body once. A body still pending after that is stuck on a
    /// foreign future and is abandoned in `stuck` state.
    fn step(&mut self, stuck: State) -> Result<Outcome<Y, T>, Error> {
        let mut cx = Context::from_waker(&self.waker);
        match self.engine.poll_resume(&mut cx) {
            Poll::Ready(outcome) => outcome,
            Poll::Pending => {
                self.engine.abandon(stuck);
                Err(Violation::ForeignAwait.into())
            }
        }
    }
}

impl<Y, T, F> Cursor for Coroutine<Y, (), T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    type Item = Y;

    /// Resume the coroutine, discarding its return value.
    ///
    /// A completed or faulted coroutine is exhausted. Advancing a closed one
    /// is still a protocol violation.
    fn advance(&mut self) -> Result<Step<Y>, Error> {
        if matches!(self.state(), State::Completed | State::Faulted) {
            return Ok(Step::Exhausted);
        }
        match self.resume(())? {
            CoroutineState::Yielded(value) => Ok(Step::Produced(value)),
            CoroutineState::Complete(_) => Ok(Step::Exhausted),
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        Coroutine::close(self).map(drop)
    }
}

impl<Y, R, T, F> Drop for Coroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn drop(&mut self) {
        if self.engine.state() != State::Suspended {
            return;
        }
        if let Err(error) = self.close() {
            tracing::warn!(%error, "failed to close a dropped coroutine");
        }
    }
}

impl<Y, R, T, F> fmt::Debug for Coroutine<Y, R, T, F>
where
    F: Future<Output = Result<T, Interrupt>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coroutine")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn injected_values_reach_suspension_points() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut coroutine = Coroutine::new(move |co: Co<u8, &'static str>| async move {
            let a = co.yield_(1).await?;
            log.borrow_mut().push(a);
            let b = co.yield_(2).await?;
            log.borrow_mut().push(b);
            Ok::<_, Interrupt>("done")
        });

        assert_eq!(coroutine.resume("first").unwrap(), CoroutineState::Yielded(1));
        assert_eq!(coroutine.resume("A").unwrap(), CoroutineState::Yielded(2));
        assert_eq!(coroutine.resume("B").unwrap(), CoroutineState::Complete("done"));
        assert_eq!(*seen.borrow(), vec!["A", "B"]);
        assert_eq!(coroutine.state(), State::Completed);

        let error = coroutine.resume("C").unwrap_err();
        assert_eq!(error.violation(), Some(Violation::ResumedAfterCompletion));
    }

    #[test]
    fn faults_can_be_caught_by_the_body() {
        let mut coroutine = Coroutine::new(|co: Co<&'static str>| async move {
            match co.yield_("waiting").await {
                Ok(()) => co.yield_("resumed").await?,
                Err(interrupt) => {
                    assert!(!interrupt.is_close());
                    co.yield_("recovered").await?
                }
            }
            Ok::<_, Interrupt>(())
        });

        assert_eq!(coroutine.resume(()).unwrap(), CoroutineState::Yielded("waiting"));
        assert_eq!(
            coroutine.resume_with_fault("boom").unwrap(),
            CoroutineState::Yielded("recovered")
        );
        assert_eq!(coroutine.resume(()).unwrap(), CoroutineState::Complete(()));
    }

    #[test]
    fn uncaught_faults_propagate() {
        let mut coroutine = Coroutine::new(|co: Co<u8>| async move {
            co.yield_(1).await?;
            co.yield_(2).await?;
            Ok::<_, Interrupt>(())
        });

        coroutine.resume(()).unwrap();
        let error = coroutine.resume_with_fault("boom").unwrap_err();
        assert_eq!(error.to_string(), "producer fault: boom");
        assert_eq!(coroutine.state(), State::Faulted);

        let error = coroutine.resume(()).unwrap_err();
        assert_eq!(error.violation(), Some(Violation::ResumedAfterFault));
        assert_eq!(coroutine.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn fault_before_start_skips_the_body() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let mut coroutine = Coroutine::new(move |co: Co<u8>| async move {
            flag.set(true);
            co.yield_(1).await?;
            Ok::<_, Interrupt>(())
        });

        assert!(coroutine.resume_with_fault("early").unwrap_err().is_fault());
        assert_eq!(coroutine.state(), State::Faulted);
        assert!(!ran.get());
    }

    #[test]
    fn close_runs_cleanup_once() {
        let cleanups = Rc::new(Cell::new(0));
        let counter = cleanups.clone();
        let mut coroutine = Coroutine::new(move |co: Co<u32>| async move {
            let result = async {
                for n in 0.. {
                    co.yield_(n).await?;
                }
                Ok::<_, Interrupt>(())
            }
            .await;
            counter.set(counter.get() + 1);
            result
        });

        assert_eq!(coroutine.advance().unwrap(), Step::Produced(0));
        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        assert_eq!(coroutine.close().unwrap(), State::Closed);
        assert_eq!(coroutine.close().unwrap(), State::Closed);
        drop(coroutine);
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn advancing_a_closed_coroutine_fails_loudly() {
        let mut coroutine = Coroutine::new(|co: Co<u8>| async move {
            co.yield_(1).await?;
            Ok::<_, Interrupt>(())
        });
        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        Cursor::close(&mut coroutine).unwrap();

        let error = coroutine.advance().unwrap_err();
        assert_eq!(error.violation(), Some(Violation::ResumedAfterClose));
    }

    #[test]
    fn close_before_start_runs_nothing() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let mut coroutine = Coroutine::new(move |co: Co<u8>| async move {
            flag.set(true);
            co.yield_(1).await?;
            Ok::<_, Interrupt>(())
        });

        assert_eq!(coroutine.close().unwrap(), State::Closed);
        assert!(!ran.get());
    }

    #[test]
    fn cleanup_faults_reach_the_closer() {
        let mut coroutine = Coroutine::new(|co: Co<u8>| async move {
            if co.yield_(1).await.is_err() {
                return Err(Interrupt::fault("cleanup failed"));
            }
            Ok(())
        });

        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        let error = coroutine.close().unwrap_err();
        assert_eq!(error.to_string(), "producer fault: cleanup failed");
        assert_eq!(coroutine.state(), State::Closed);
    }

    #[test]
    fn yielding_while_closing_is_a_violation() {
        let mut coroutine = Coroutine::new(|co: Co<u8>| async move {
            let _ = co.yield_(1).await;
            co.yield_(2).await?;
            Ok::<_, Interrupt>(())
        });

        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        let error = coroutine.close().unwrap_err();
        assert_eq!(error.violation(), Some(Violation::YieldedWhileClosing));
        assert_eq!(coroutine.state(), State::Closed);
    }

    #[test]
    fn foreign_futures_are_rejected() {
        let mut coroutine = Coroutine::new(|_co: Co<u8>| async move {
            futures_lite::future::pending::<()>().await;
            Ok::<_, Interrupt>(())
        });

        let error = coroutine.advance().unwrap_err();
        assert_eq!(error.violation(), Some(Violation::ForeignAwait));
        assert_eq!(coroutine.state(), State::Faulted);
    }

    #[test]
    fn dropping_a_suspended_coroutine_closes_it() {
        struct Guard(Rc<Cell<u32>>);

        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let counter = drops.clone();
        let mut coroutine = Coroutine::new(move |co: Co<u8>| async move {
            let _guard = Guard(counter);
            co.yield_(1).await?;
            co.yield_(2).await?;
            Ok::<_, Interrupt>(())
        });
        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        assert_eq!(drops.get(), 0);
        drop(coroutine);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn delegation_yields_inner_values() {
        use crate::cursor::IterCursor;

        let mut coroutine = Coroutine::new(|co: Co<u8>| async move {
            co.yield_(0).await?;
            co.delegate(IterCursor::new([1, 2, 3])).await?;
            co.yield_(4).await?;
            Ok::<_, Interrupt>(())
        });

        let values: Vec<_> = crate::drive::drain_all(&mut coroutine).unwrap();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn closing_during_delegation_closes_the_delegate() {
        let outer = Rc::new(Cell::new(0));
        let inner = Rc::new(Cell::new(0));
        let (outer_count, inner_count) = (outer.clone(), inner.clone());

        let mut coroutine = Coroutine::new(move |co: Co<u8>| async move {
            let delegate = Coroutine::new(move |co: Co<u8>| async move {
                let result = async {
                    co.yield_(1).await?;
                    co.yield_(2).await?;
                    Ok::<_, Interrupt>(())
                }
                .await;
                inner_count.set(inner_count.get() + 1);
                result
            });
            let result = co.delegate(delegate).await;
            outer_count.set(outer_count.get() + 1);
            result
        });

        assert_eq!(coroutine.advance().unwrap(), Step::Produced(1));
        coroutine.close().unwrap();
        assert_eq!((outer.get(), inner.get()), (1, 1));
    }
}
