use std::future::Future;
use std::time::Duration;

/// Outcome of [`race`].
#[derive(Debug, Clone, PartialEq)]
pub enum Raced<T> {
    Settled(T),
    TimedOut,
}

impl<T> Raced<T> {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Wait for `operation` or `limit`, whichever comes first.
///
/// The losing operation is dropped, never killed. Dropping a future only
/// stops polling it: work it already handed off (a spawned task, a child
/// process) keeps running. Pass a `JoinHandle` to let the operation finish
/// in the background after a timeout.
pub async fn race<F>(operation: F, limit: Duration) -> Raced<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        output = operation => Raced::Settled(output),
        _ = tokio::time::sleep(limit) => Raced::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_operation_wins() {
        let out = race(async { 7 }, Duration::from_secs(5)).await;
        assert_eq!(out, Raced::Settled(7));
    }

    #[tokio::test]
    async fn test_timer_wins() {
        let out = race(
            tokio::time::sleep(Duration::from_secs(5)),
            Duration::from_millis(10),
        )
        .await;
        assert!(out.is_timed_out());
    }

    #[tokio::test]
    async fn test_spawned_loser_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });

        assert!(race(task, Duration::from_millis(5)).await.is_timed_out());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
