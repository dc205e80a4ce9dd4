//! Utilities shared by the cursors and coroutines of this crate.

mod waker;

pub(crate) use waker::noop_waker;
