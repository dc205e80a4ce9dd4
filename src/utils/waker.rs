use std::sync::Arc;
use std::task::{Wake, Waker};

/// A waker for bodies that are resumed by an explicit call rather than by
/// wake-ups.
#[derive(Debug)]
struct NoopWaker;

impl Wake for NoopWaker {
    fn wake(self: Arc<Self>) {}

    fn wake_by_ref(self: &Arc<Self>) {}
}

/// Create a waker that ignores wake-ups.
pub(crate) fn noop_waker() -> Waker {
    Waker::from(Arc::new(NoopWaker))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn waking_is_harmless() {
        let waker = noop_waker();
        waker.wake_by_ref();
        waker.clone().wake();
    }
}
