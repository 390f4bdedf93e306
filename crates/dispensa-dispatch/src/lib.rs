//! # Dispensa Dispatch
//!
//! Dispatch facility adapters for the Dispensa reminder engine. The engine
//! talks to a facility only through the `DispatchFacility` trait; this crate
//! provides the concrete backends.
//!
//! ## Architecture
//! ```text
//! ReminderEngine (dispensa-reminders)
//!   └── dyn DispatchFacility
//!         ├── WebhookFacility: JSON over HTTP to a reminder relay
//!         │     GET /health, GET /permissions, POST /permissions/request,
//!         │     POST /reminders, DELETE /reminders/{id}, GET /reminders
//!         └── MemoryFacility: in-process map + call journal
//!               (engine tests, local development without a relay)
//! ```

pub mod memory;
pub mod webhook;

pub use memory::{FacilityOp, MemoryFacility};
pub use webhook::WebhookFacility;
