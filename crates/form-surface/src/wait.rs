//! Bounded polling helpers.
//!
//! Every wait in the interaction layer is a poll-until-condition-or-timeout
//! loop built on these functions; they are the only suspension points.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::click::ClickChain;
use crate::errors::InteractionError;
use crate::ports::{ElementHandle, UiSurface};
use crate::query::Locator;

/// Polls `check` until it yields a value or `timeout` elapses.
///
/// Non-fatal check errors count as "not yet"; a lost session ends the wait.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<Option<T>, InteractionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, InteractionError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => debug!(error = %err, "check failed; polling again"),
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(interval).await;
    }
}

/// First element matched by the first locator that matches anything.
pub async fn first_match(
    surface: &dyn UiSurface,
    locators: &[Locator],
) -> Result<Option<ElementHandle>, InteractionError> {
    for locator in locators {
        let found = locator.resolve(surface).await?;
        if let Some(element) = found.first() {
            return Ok(Some(*element));
        }
    }
    Ok(None)
}

/// Waits for any locator of the chain to match.
pub async fn find_first(
    surface: &dyn UiSurface,
    locators: &[Locator],
    timeout: Duration,
    interval: Duration,
) -> Result<Option<ElementHandle>, InteractionError> {
    poll_until(timeout, interval, || first_match(surface, locators)).await
}

/// Waits until the element's bounding box has not moved for `stable_for`.
/// Returns `false` when the deadline passes first.
pub async fn wait_until_stable(
    surface: &dyn UiSurface,
    element: ElementHandle,
    stable_for: Duration,
    interval: Duration,
    timeout: Duration,
) -> Result<bool, InteractionError> {
    let deadline = Instant::now() + timeout;
    let mut last = surface.bounding_box(element).await?;
    let mut since = Instant::now();
    loop {
        if Instant::now().duration_since(since) >= stable_for {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(interval).await;
        let current = surface.bounding_box(element).await?;
        if current != last {
            last = current;
            since = Instant::now();
        }
    }
}

/// Closes message boxes for up to `timeout`, returning how many were closed.
///
/// Once at least one box was closed, the first poll that finds none ends
/// the wait, so chained boxes are handled without waiting the full budget.
pub async fn dismiss_dialogs(
    surface: &dyn UiSurface,
    buttons: &[Locator],
    chain: &ClickChain,
    timeout: Duration,
    interval: Duration,
) -> Result<usize, InteractionError> {
    let deadline = Instant::now() + timeout;
    let mut closed = 0;
    loop {
        match first_match(surface, buttons).await {
            Ok(Some(button)) => match chain.activate(surface, button).await {
                Ok(_) => {
                    closed += 1;
                    info!(closed, "message box dismissed");
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => debug!(error = %err, "message box button did not respond"),
            },
            Ok(None) if closed > 0 => return Ok(closed),
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => debug!(error = %err, "message box lookup failed"),
        }
        if Instant::now() >= deadline {
            return Ok(closed);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn poll_returns_value_once_check_succeeds() {
        let calls = AtomicUsize::new(0);
        let found = poll_until(Duration::from_secs(5), Duration::from_millis(100), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, InteractionError>((n >= 3).then_some(n)) }
        })
        .await
        .unwrap();
        assert_eq!(found, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_times_out_with_none() {
        let found: Option<()> = poll_until(
            Duration::from_millis(500),
            Duration::from_millis(100),
            || async { Ok(None) },
        )
        .await
        .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_stops_on_session_loss() {
        let result: Result<Option<()>, _> = poll_until(
            Duration::from_secs(5),
            Duration::from_millis(100),
            || async { Err(InteractionError::SessionLost("closed".into())) },
        )
        .await;
        assert!(matches!(result, Err(InteractionError::SessionLost(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_check_errors_are_retried() {
        let calls = AtomicUsize::new(0);
        let found = poll_until(Duration::from_secs(5), Duration::from_millis(100), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(InteractionError::StaleReference("row".into()))
                } else {
                    Ok(Some(n))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(found, Some(1));
    }
}
