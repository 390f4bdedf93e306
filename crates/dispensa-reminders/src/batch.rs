//! Chunked batch operations.
//!
//! Chunks run strictly one after another; items inside a chunk run
//! concurrently. This keeps pressure on the facility bounded without
//! serializing the whole inventory. A failing item is logged with its chunk
//! number and the rest keep going.

use futures::future::join_all;
use serde::Serialize;

use dispensa_core::types::{AppSettings, TrackedItem};

use crate::scheduler::{ItemScheduler, ScheduleOutcome};

/// Totals from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items handed to the scheduler.
    pub total_processed: usize,
    /// Items whose applicable slots all registered.
    pub success_count: usize,
    /// Items with at least one failed registration.
    pub failure_count: usize,
    /// Chunks the run was split into.
    pub chunk_count: usize,
}

/// Schedule reminders for many items in chunks.
///
/// Empty input and invalid settings are no-ops. The availability gate is
/// checked once up front; skipped items (no usable date) count toward
/// neither successes nor failures.
pub async fn schedule_many(
    scheduler: &ItemScheduler,
    items: &[TrackedItem],
    settings: &AppSettings,
) -> BatchReport {
    if items.is_empty() {
        tracing::info!("📥 No items to schedule reminders for");
        return BatchReport::default();
    }
    if settings.notification_days < 0 {
        tracing::warn!(
            "⚠️ Invalid settings: notification_days must not be negative (got {})",
            settings.notification_days
        );
        return BatchReport::default();
    }
    if !scheduler.gate().is_available().await {
        tracing::warn!("🚫 Cannot schedule batch: facility not available");
        return BatchReport::default();
    }

    let chunk_size = scheduler.config().chunk_size.max(1);
    let chunk_count = items.len().div_ceil(chunk_size);
    tracing::info!(
        "📥 Scheduling reminders for {} items in {} chunks (size {})",
        items.len(),
        chunk_count,
        chunk_size
    );

    let mut report = BatchReport {
        total_processed: items.len(),
        chunk_count,
        ..Default::default()
    };

    for (chunk_index, chunk) in items.chunks(chunk_size).enumerate() {
        let outcomes = join_all(
            chunk
                .iter()
                .map(|item| scheduler.schedule_for_item(item, settings)),
        )
        .await;

        for (item, outcome) in chunk.iter().zip(&outcomes) {
            match outcome {
                ScheduleOutcome::Scheduled { failed: 0, .. } => report.success_count += 1,
                ScheduleOutcome::Scheduled { .. } => {
                    tracing::warn!(
                        "⚠️ Registration failed for item {} in chunk {}",
                        item.id,
                        chunk_index + 1
                    );
                    report.failure_count += 1;
                }
                ScheduleOutcome::Skipped | ScheduleOutcome::Unavailable => {}
            }
        }

        tracing::info!(
            "✅ Completed chunk {}/{} ({} items)",
            chunk_index + 1,
            chunk_count,
            chunk.len()
        );
    }

    tracing::info!(
        "✅ Finished scheduling for {} items in {} chunks",
        items.len(),
        report.chunk_count
    );
    report
}

/// Cancel reminders for many items at once. Cancels are independent, so the
/// whole set runs concurrently.
pub async fn cancel_many(scheduler: &ItemScheduler, item_ids: &[String]) {
    if item_ids.is_empty() {
        return;
    }
    if !scheduler.gate().is_available().await {
        tracing::warn!("🚫 Cannot cancel batch: facility not available");
        return;
    }
    tracing::info!("📥 Cancelling reminders for {} items", item_ids.len());
    join_all(item_ids.iter().map(|id| scheduler.cancel_for_item(id))).await;
    tracing::info!("✅ Finished cancelling for {} items", item_ids.len());
}
