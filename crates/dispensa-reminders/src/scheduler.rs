//! Per-item reminder scheduling.
//!
//! One item maps to at most two reminders: the expiry day and an optional
//! pre-warning, both at the configured local hour. Only instants still in
//! the future are registered. Registration failures are logged and absorbed
//! so one bad item never aborts a batch.

use std::sync::Arc;

use chrono::Utc;

use dispensa_core::config::ReminderConfig;
use dispensa_core::traits::DispatchFacility;
use dispensa_core::types::{
    AppSettings, ReminderContent, ReminderKind, ReminderRequest, TrackedItem, TriggerKind,
};

use crate::dates::{has_date_shape, parse_reminder_instant, pre_warning_instant};
use crate::gate::DispatchGate;
use crate::ids::{expiry_id, ids_for_item, pre_warning_id};

/// Identifier reused by every verification ping.
const TEST_REMINDER_ID: &str = "dispensa-test";

/// Result of scheduling one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Facility unavailable; nothing attempted.
    Unavailable,
    /// No usable expiration date; nothing registered.
    Skipped,
    /// Registration ran; per-slot counts.
    Scheduled { registered: usize, failed: usize },
}

pub struct ItemScheduler {
    facility: Arc<dyn DispatchFacility>,
    gate: Arc<DispatchGate>,
    config: ReminderConfig,
}

impl ItemScheduler {
    pub fn new(
        facility: Arc<dyn DispatchFacility>,
        gate: Arc<DispatchGate>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            facility,
            gate,
            config,
        }
    }

    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Schedule the expiry and pre-warning reminders for one item.
    ///
    /// Steps: date shape check, availability gate, parse to the local-hour
    /// instant, then register each slot whose instant is still ahead. With
    /// `replace_by_identifier` off, both slots are cancelled first.
    pub async fn schedule_for_item(
        &self,
        item: &TrackedItem,
        settings: &AppSettings,
    ) -> ScheduleOutcome {
        if !has_date_shape(&item.expiration_date) {
            tracing::info!(
                "⏭️ Skipping \"{}\" ({}): no usable expiration date",
                item.name,
                item.id
            );
            return ScheduleOutcome::Skipped;
        }
        if !self.gate.is_available().await {
            tracing::warn!("🚫 Cannot schedule reminders: facility not available");
            return ScheduleOutcome::Unavailable;
        }

        tracing::debug!(
            "📅 Scheduling \"{}\" ({}), expires {}",
            item.name,
            item.id,
            item.expiration_date
        );

        let Some(expiry_at) = parse_reminder_instant(
            &item.expiration_date,
            self.config.notification_hour,
            &item.id,
        ) else {
            return ScheduleOutcome::Skipped;
        };

        if !self.config.replace_by_identifier {
            self.cancel_for_item(&item.id).await;
        }

        let now = Utc::now();
        let mut registered = 0;
        let mut failed = 0;

        if expiry_at > now {
            let request = ReminderRequest {
                identifier: expiry_id(&item.id),
                fires_at: expiry_at,
                kind: ReminderKind::Expiry,
                content: expiry_content(item),
            };
            if self.register(request).await {
                registered += 1;
            } else {
                failed += 1;
            }
        } else {
            tracing::debug!("⏭️ Expiry instant {} already past for {}", expiry_at, item.id);
        }

        if settings.notification_days > 0 {
            if let Some(pre_at) = pre_warning_instant(expiry_at, settings.notification_days) {
                if pre_at > now {
                    let request = ReminderRequest {
                        identifier: pre_warning_id(&item.id),
                        fires_at: pre_at,
                        kind: ReminderKind::PreWarning,
                        content: pre_warning_content(item, settings.notification_days),
                    };
                    if self.register(request).await {
                        registered += 1;
                    } else {
                        failed += 1;
                    }
                } else {
                    tracing::debug!(
                        "⏭️ Pre-warning instant {} already past for {}",
                        pre_at,
                        item.id
                    );
                }
            }
        }

        ScheduleOutcome::Scheduled { registered, failed }
    }

    /// Cancel both reminder slots for an item. Slots that were never
    /// scheduled cancel cleanly.
    pub async fn cancel_for_item(&self, item_id: &str) {
        if !self.gate.is_available().await {
            tracing::warn!("🚫 Cannot cancel reminders: facility not available");
            return;
        }
        for identifier in ids_for_item(item_id) {
            match self.facility.cancel(&identifier).await {
                Ok(()) => tracing::debug!("🗑️ Cancelled reminder '{identifier}'"),
                Err(e) => tracing::warn!("⚠️ Could not cancel '{identifier}': {e}"),
            }
        }
    }

    /// Whether either slot of the item is outstanding with a date trigger.
    /// Errors read as not scheduled.
    pub async fn is_scheduled(&self, item_id: &str) -> bool {
        if !self.gate.is_available().await {
            return false;
        }
        match self.facility.list_outstanding().await {
            Ok(outstanding) => {
                let ids = ids_for_item(item_id);
                outstanding.iter().any(|r| {
                    ids.contains(&r.identifier)
                        && r.trigger_kind == TriggerKind::Date
                        && r.fires_at.is_some()
                })
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not read outstanding reminders: {e}");
                false
            }
        }
    }

    /// Ping that fires ten seconds from now, to verify the whole pipeline.
    pub async fn schedule_test_reminder(&self) -> bool {
        if !self.gate.is_available().await {
            tracing::warn!("🚫 Cannot schedule test reminder: facility not available");
            return false;
        }
        let fires_at = Utc::now() + chrono::Duration::seconds(10);
        tracing::info!("🔔 Scheduling test reminder for {fires_at}");
        let request = ReminderRequest {
            identifier: TEST_REMINDER_ID.to_string(),
            fires_at,
            kind: ReminderKind::Test,
            content: ReminderContent {
                title: "🔔 Notifica di Prova".into(),
                body: "Se vedi questo messaggio, le notifiche funzionano correttamente!".into(),
                item_id: TEST_REMINDER_ID.to_string(),
            },
        };
        self.register(request).await
    }

    async fn register(&self, request: ReminderRequest) -> bool {
        let identifier = request.identifier.clone();
        let fires_at = request.fires_at;
        match self.facility.schedule(request).await {
            Ok(()) => {
                tracing::info!("🔔 Reminder '{identifier}' set for {fires_at}");
                true
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to schedule '{identifier}': {e}");
                false
            }
        }
    }
}

fn expiry_content(item: &TrackedItem) -> ReminderContent {
    ReminderContent {
        title: "Prodotto Scaduto!".into(),
        body: format!("Il prodotto \"{}\" è scaduto oggi.", item.name),
        item_id: item.id.clone(),
    }
}

fn pre_warning_content(item: &TrackedItem, days: i64) -> ReminderContent {
    ReminderContent {
        title: "Prodotto in Scadenza".into(),
        body: format!("Il prodotto \"{}\" scadrà tra {} giorni.", item.name, days),
        item_id: item.id.clone(),
    }
}
