//! Consumption loops for asynchronous cursors.
//!
//! The next value is only requested once the previous request has settled,
//! so a driver never has more than one resumption in flight.

use super::{AsyncCursor, AsyncCursorExt};
use crate::{Error, Step};

/// Advance `cursor` until it is exhausted, collecting every value in order.
pub async fn drain_all<C>(cursor: &mut C) -> Result<Vec<C::Item>, Error>
where
    C: AsyncCursor + Unpin + ?Sized,
{
    let mut values = Vec::new();
    while let Step::Produced(value) = cursor.advance().await? {
        values.push(value);
    }
    Ok(values)
}

/// Advance `cursor` until `predicate` accepts a value or the cursor is
/// exhausted.
///
/// Returns every value produced, the accepted one last, and leaves the
/// cursor paused right after it.
pub async fn drain_until<C, P>(cursor: &mut C, mut predicate: P) -> Result<Vec<C::Item>, Error>
where
    C: AsyncCursor + Unpin + ?Sized,
    P: FnMut(&C::Item) -> bool,
{
    let mut values = Vec::new();
    while let Step::Produced(value) = cursor.advance().await? {
        let matched = predicate(&value);
        values.push(value);
        if matched {
            break;
        }
    }
    Ok(values)
}

/// Advance `cursor` until it is exhausted, calling `f` on every value.
pub async fn for_each<C, F>(cursor: &mut C, mut f: F) -> Result<(), Error>
where
    C: AsyncCursor + Unpin + ?Sized,
    F: FnMut(C::Item),
{
    while let Step::Produced(value) = cursor.advance().await? {
        f(value);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coroutine::{AsyncCoroutine, Co, Interrupt};
    use futures_lite::future::{block_on, yield_now};

    #[test]
    fn drain_until_leaves_the_cursor_paused() {
        block_on(async {
            let mut coroutine = AsyncCoroutine::new(|co: Co<u8>| async move {
                for n in 1..=5 {
                    yield_now().await;
                    co.yield_(n).await?;
                }
                Ok::<_, Interrupt>(())
            });
            let head = drain_until(&mut coroutine, |n| *n == 2).await.unwrap();
            assert_eq!(head, vec![1, 2]);
            assert_eq!(coroutine.advance().await.unwrap(), Step::Produced(3));
        });
    }

    #[test]
    fn faults_stop_the_loop() {
        block_on(async {
            let mut coroutine = AsyncCoroutine::new(|co: Co<u8>| async move {
                co.yield_(1).await?;
                Err::<(), _>(Interrupt::fault("lost connection"))
            });
            let mut seen = Vec::new();
            let error = for_each(&mut coroutine, |n| seen.push(n)).await.unwrap_err();
            assert!(error.is_fault());
            assert_eq!(seen, vec![1]);
        });
    }
}
