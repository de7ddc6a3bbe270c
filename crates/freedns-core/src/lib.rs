// # freedns-core
//
// Core library for the FreeDNS dynamic DNS update system.
//
// ## Architecture Overview
//
// This library provides the building blocks for keeping a FreeDNS record
// pointed at the current address:
// - **UpdateClient**: Trait for sending one update attempt to the service
// - **Scheduler**: Trait for driving periodic callbacks
// - **EntryStore**: Trait for persisting entries and observing option changes
// - **EntryLifecycle**: Activates, deactivates, and reloads entries
// - **SetupFlow / OptionsFlow**: Host-driven configuration wizards
// - **EntryRegistry**: Tracks active entries and their cancellation handles
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from the HTTP client
// 2. **Host-Driven**: Flows and schedules are stepped by the embedding host
// 3. **Failure Isolation**: A failed update cycle never stops the schedule
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod error;
pub mod flow;
pub mod job;
pub mod lifecycle;
pub mod registry;
pub mod sched;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{ConfigEntry, EntryId, EntryOptions};
pub use error::{Error, Result};
pub use flow::{FlowResult, OptionsFlow, SetupFlow};
pub use job::UpdateJob;
pub use lifecycle::EntryLifecycle;
pub use registry::EntryRegistry;
pub use sched::TokioScheduler;
pub use store::{FileEntryStore, MemoryEntryStore};
pub use traits::{EntryStore, Scheduler, UpdateClient, UpdateOutcome};
