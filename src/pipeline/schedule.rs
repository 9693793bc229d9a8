// src/pipeline/schedule.rs

//! Fixed-interval driver.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use super::watch::Watcher;

/// Run a tick immediately and then every `period` until `shutdown` resolves.
///
/// Ticks never overlap: a batch that overruns the period delays the next
/// tick. Shutdown is observed between ticks. Returns the number of ticks run.
pub async fn run_scheduled<F>(watcher: &Watcher, period: Duration, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Shutdown requested after {ticks} tick(s)");
                return ticks;
            }
            _ = ticker.tick() => {
                ticks += 1;
                log::debug!("Starting tick {ticks}");
                watcher.run_once().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::{FakeFetcher, RecordingNotifier, listing, two_site_config};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_tick_runs_immediately_and_shutdown_stops_loop() {
        let fetcher = FakeFetcher::default()
            .with_page(
                "https://a.example/news",
                &listing("Alpha", "https://a.example/news/1", "2024-11-01"),
            )
            .with_page(
                "https://b.example/news",
                &listing("Beta", "https://b.example/news/9", "2024-11-02"),
            );
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = Watcher::new(
            Arc::new(two_site_config()),
            Arc::new(fetcher),
            Arc::new(MemoryStore::new()),
            notifier.clone(),
            None,
        );

        let shutdown = tokio::time::sleep(Duration::from_millis(100));
        let ticks = run_scheduled(&watcher, Duration::from_secs(3600), shutdown).await;

        assert_eq!(ticks, 1);
        assert_eq!(notifier.messages().len(), 2);
    }
}
