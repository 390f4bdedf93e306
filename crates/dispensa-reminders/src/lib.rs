//! # Dispensa Reminders
//!
//! Expiration reminder engine for the Dispensa pantry app. Given the app's
//! item snapshots and settings, it keeps the dispatch facility's outstanding
//! set in line: at most two reminders per item (expiry day + pre-warning),
//! both firing at the configured local hour.
//!
//! The engine owns no item storage. Every call receives the current snapshot
//! from the caller and the facility remains the system of record for what is
//! actually outstanding.
//!
//! ## Architecture
//! ```text
//! ReminderEngine (facade)
//!   ├── DispatchGate: memoized availability probe + permission flow
//!   ├── ItemScheduler: one item → 0..=2 registrations
//!   │     ├── dates: "YYYY-MM-DD[T...]" → local-hour instants
//!   │     └── ids: "{item}" / "{item}-pre"
//!   ├── batch: chunked fan-out (chunks sequential, items concurrent)
//!   └── reconcile: snapshot diff → schedule/cancel plan
//!         └── settings change → full rebuild (cancel all, reschedule)
//! ```

pub mod batch;
pub mod dates;
pub mod engine;
pub mod gate;
pub mod ids;
pub mod reconcile;
pub mod scheduler;

pub use batch::BatchReport;
pub use engine::ReminderEngine;
pub use gate::DispatchGate;
pub use reconcile::{ReconcileAction, ReconcilePlan};
pub use scheduler::{ItemScheduler, ScheduleOutcome};
