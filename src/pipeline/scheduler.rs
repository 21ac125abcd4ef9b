// src/pipeline/scheduler.rs

use std::future::Future;
use std::time::Duration;

use chrono::Local;

use crate::error::Result;
use crate::pipeline::announce::PlanSink;
use crate::pipeline::scrape::scrape_plan;
use crate::services::DocumentSource;
use crate::storage::PlanArchive;

/// Runs scrape cycles one after another with a fixed pause in between.
///
/// The pause starts when a cycle finishes, so slow cycles never overlap.
pub struct Scheduler<'a> {
    source: &'a dyn DocumentSource,
    archive: Option<&'a dyn PlanArchive>,
    sink: &'a dyn PlanSink,
    interval: Duration,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        source: &'a dyn DocumentSource,
        archive: Option<&'a dyn PlanArchive>,
        sink: &'a dyn PlanSink,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            archive,
            sink,
            interval,
        }
    }

    /// One cycle. Scrape errors are handed to the sink; only a failure to
    /// deliver is returned.
    pub async fn run_once(&self) -> Result<()> {
        match scrape_plan(self.source, self.archive).await {
            Ok(plan) => self.sink.plan_received(&plan).await,
            Err(e) => {
                log::error!("Scrape cycle failed: {e}");
                self.sink.scrape_failed(&e).await
            }
        }
    }

    /// Run cycles until `shutdown` resolves.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.run_once().await {
                log::error!("Failed to publish cycle result: {e}");
            }

            if let Ok(delta) = chrono::TimeDelta::from_std(self.interval) {
                log::info!(
                    "Next check at {}",
                    (Local::now() + delta).format("%H:%M:%S")
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping scheduler");
                    break;
                }
            }
        }
    }
}
