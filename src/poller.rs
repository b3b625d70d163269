use std::future::Future;

use tokio::time::{interval, sleep, Duration, Instant, MissedTickBehavior};

use crate::SyncTubeError;

/// How often [`wait_until`] re-evaluates its predicate.
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Resolve once `predicate` is observed true, checking immediately and then
/// every [`POLL_INTERVAL`]. Fails with [`SyncTubeError::Timeout`] once more
/// than `timeout` has elapsed without the predicate holding.
pub async fn wait_until<F>(predicate: F, timeout: Duration) -> Result<(), SyncTubeError>
where
    F: FnMut() -> bool,
{
    wait_until_every(predicate, timeout, POLL_INTERVAL).await
}

/// [`wait_until`] with a custom polling interval.
pub async fn wait_until_every<F>(
    mut predicate: F,
    timeout: Duration,
    every: Duration,
) -> Result<(), SyncTubeError>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    // tokio panics on a zero period
    let mut ticker = interval(every.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if predicate() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            return Err(SyncTubeError::Timeout(timeout));
        }
    }
}

/// Run `send` over `items` in order, sleeping `pacing` before every item but
/// the first. Stops at the first error. Returns how many items were sent.
pub async fn send_paced<I, F, Fut>(
    items: I,
    pacing: Duration,
    mut send: F,
) -> Result<usize, SyncTubeError>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), SyncTubeError>>,
{
    let mut sent = 0;
    for item in items {
        if sent > 0 {
            sleep(pacing).await;
        }
        send(item).await?;
        sent += 1;
    }
    Ok(sent)
}
