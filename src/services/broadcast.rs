use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::bot::delivery::{DeliveryOutcome, PollSpec, Transport};
use crate::config::{BROADCAST_HOUR, BROADCAST_MINUTE, BROADCAST_TIMEZONE};
use crate::storage::{GroupStore, StoreError};

/// Counters for one broadcast run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Destinations the run attempted to deliver to.
    pub attempted: usize,
    /// Successful deliveries.
    pub delivered: usize,
    /// Destinations whose id was swapped for a supergroup id.
    pub migrated: usize,
    /// Destinations dropped because the bot lost send rights.
    pub removed: usize,
    /// Transient failures; destination kept.
    pub failed: usize,
}

/// Sends the poll to every tracked group, snapshot-first.
///
/// The group list is loaded once up front, so membership events landing while
/// the run is in flight cannot skip or duplicate a destination. Each
/// destination gets exactly one attempt, and no failure short of the initial
/// snapshot load aborts the batch: one dead group must never blind the bot to
/// the groups after it in the list.
pub async fn run_broadcast(
    transport: &dyn Transport,
    store: &GroupStore,
    poll: &PollSpec,
) -> Result<BroadcastSummary, StoreError> {
    let snapshot = store.load()?;
    let mut summary = BroadcastSummary::default();

    for chat_id in snapshot {
        summary.attempted += 1;
        match transport.send_poll(chat_id, poll).await {
            DeliveryOutcome::Delivered => {
                info!("Poll sent to {}", chat_id);
                summary.delivered += 1;
            }
            DeliveryOutcome::Migrated(new_id) => {
                warn!("Group {} migrated to {}", chat_id, new_id);
                // The new id gets its poll on the next run, not twice today.
                if let Err(e) = store.remove(chat_id) {
                    error!("Failed to drop migrated group {}: {}", chat_id, e);
                }
                if let Err(e) = store.add(new_id) {
                    error!("Failed to record migrated group {}: {}", new_id, e);
                }
                summary.migrated += 1;
            }
            DeliveryOutcome::Forbidden => {
                warn!("Bot was removed from group {}. Removing from list.", chat_id);
                if let Err(e) = store.remove(chat_id) {
                    error!("Failed to drop forbidden group {}: {}", chat_id, e);
                }
                summary.removed += 1;
            }
            DeliveryOutcome::Other(detail) => {
                error!("Error sending poll to {}: {}", chat_id, detail);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Broadcast run finished: {} attempted, {} delivered, {} migrated, {} removed, {} failed",
        summary.attempted, summary.delivered, summary.migrated, summary.removed, summary.failed
    );
    Ok(summary)
}

/// Owns the cron scheduler that fires the daily broadcast.
pub struct BroadcastService {
    transport: Arc<dyn Transport>,
    store: GroupStore,
    scheduler: JobScheduler,
}

impl BroadcastService {
    /// Creates the service; `start` must be called to schedule anything.
    pub async fn new(transport: Arc<dyn Transport>, store: GroupStore) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        Ok(Self {
            transport,
            store,
            scheduler,
        })
    }

    /// Registers the daily job and starts the scheduler.
    pub async fn start(&mut self) -> Result<()> {
        let cron = format!("0 {} {} * * *", BROADCAST_MINUTE, BROADCAST_HOUR);
        let transport = self.transport.clone();
        let store = self.store.clone();

        let job = Job::new_async_tz(cron.as_str(), BROADCAST_TIMEZONE, move |_uuid, _l| {
            let transport = transport.clone();
            let store = store.clone();
            Box::pin(async move {
                if let Err(e) = run_broadcast(transport.as_ref(), &store, &PollSpec::daily()).await
                {
                    error!("Broadcast run aborted: {}", e);
                }
            })
        })
        .context("Failed to create broadcast job")?;

        self.scheduler
            .add(job)
            .await
            .context("Failed to add broadcast job")?;
        self.scheduler
            .start()
            .await
            .context("Failed to start scheduler")?;

        info!(
            "Broadcast service started - daily poll at {:02}:{:02} {}",
            BROADCAST_HOUR, BROADCAST_MINUTE, BROADCAST_TIMEZONE
        );
        Ok(())
    }

    /// Shuts the scheduler down.
    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .context("Failed to shut down scheduler")?;
        Ok(())
    }

    /// Runs one broadcast immediately, outside the schedule.
    pub async fn broadcast_now(&self) -> Result<BroadcastSummary, StoreError> {
        run_broadcast(self.transport.as_ref(), &self.store, &PollSpec::daily()).await
    }
}
