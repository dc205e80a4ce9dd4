use std::error::Error as StdError;

/// An error raised while producing a value.
///
/// Any error type can be turned into a fault, including plain strings:
///
/// ```
/// use lazy_pipeline::Fault;
///
/// let fault: Fault = "page fetch failed".into();
/// assert_eq!(fault.to_string(), "page fetch failed");
/// ```
pub type Fault = Box<dyn StdError + Send + Sync + 'static>;

/// The error type returned by cursors, coroutines and drivers.
///
/// Running out of values is never an error: that is reported as
/// [`Step::Exhausted`](crate::Step::Exhausted).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A producer failed to generate a value. The cursor chain that raised
    /// it is terminated.
    #[error("producer fault: {0}")]
    Fault(#[source] Fault),

    /// The caller broke the cursor protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] Violation),

    /// More than one cleanup block faulted while closing a pipeline.
    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}

impl Error {
    /// Wrap a fault, unwrapping it first if it already is an [`Error`].
    ///
    /// Faults travel through coroutine bodies as boxed errors; when one of
    /// those was itself raised by this crate it is returned as-is instead of
    /// being nested inside another `Fault`.
    pub fn from_fault(fault: Fault) -> Self {
        match fault.downcast::<Error>() {
            Ok(error) => *error,
            Err(fault) => Error::Fault(fault),
        }
    }

    /// Returns `true` if this is a producer fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, Error::Fault(_))
    }

    /// Returns the protocol violation, if this is one.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Error::Protocol(violation) => Some(*violation),
            _ => None,
        }
    }
}

/// A misuse of the cursor protocol.
///
/// These always indicate a bug in the calling code rather than a data
/// condition, so they are never reported as exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A coroutine was resumed after it returned.
    #[error("coroutine resumed after completing")]
    ResumedAfterCompletion,
    /// A coroutine was resumed after a fault escaped its body.
    #[error("coroutine resumed after faulting")]
    ResumedAfterFault,
    /// A coroutine was resumed after it was closed.
    #[error("coroutine resumed after being closed")]
    ResumedAfterClose,
    /// A new resumption was requested while one was still in flight.
    #[error("coroutine resumed while a resumption is in flight")]
    ResumedWhileRunning,
    /// A coroutine body suspended again while running its cleanup.
    #[error("coroutine yielded while closing")]
    YieldedWhileClosing,
    /// A synchronous coroutine body awaited something other than its own
    /// suspension points.
    #[error("synchronous coroutine awaited a foreign future")]
    ForeignAwait,
    /// A single-use sequence was asked for a second cursor.
    #[error("single-use sequence was already consumed")]
    AlreadyConsumed,
}

/// The first cleanup fault raised while closing a pipeline, together with
/// the ones that followed it.
#[derive(Debug, thiserror::Error)]
#[error("cleanup failed: {error} ({} suppressed)", .suppressed.len())]
pub struct CleanupError {
    #[source]
    error: Box<Error>,
    suppressed: Vec<Error>,
}

impl CleanupError {
    /// The error that was raised first.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Errors raised by cleanup blocks that ran after the first failure.
    pub fn suppressed(&self) -> &[Error] {
        &self.suppressed
    }

    /// Split into the first error and the suppressed ones.
    pub fn into_parts(self) -> (Error, Vec<Error>) {
        (*self.error, self.suppressed)
    }
}

/// Collects the outcomes of closing several cursors.
///
/// Every close is attempted. The first failure wins and later ones are kept
/// as suppressed errors.
#[derive(Debug, Default)]
pub(crate) struct CloseErrors {
    first: Option<Error>,
    suppressed: Vec<Error>,
}

impl CloseErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, result: Result<(), Error>) {
        let Err(error) = result else { return };
        if self.first.is_none() {
            self.first = Some(error);
        } else {
            tracing::debug!(%error, "suppressing secondary cleanup error");
            self.suppressed.push(error);
        }
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        match self.first {
            None => Ok(()),
            Some(error) if self.suppressed.is_empty() => Err(error),
            Some(error) => Err(Error::Cleanup(CleanupError {
                error: Box::new(error),
                suppressed: self.suppressed,
            })),
        }
    }
}
