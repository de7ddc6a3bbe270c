//! Core traits for the FreeDNS update system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`UpdateClient`]: Send dynamic DNS updates to the service
//! - [`Scheduler`]: Drive periodic callbacks
//! - [`EntryStore`]: Persist configuration entries and notify on change

pub mod entry_store;
pub mod scheduler;
pub mod update_client;

pub use entry_store::{EntryStore, UpdateListener};
pub use scheduler::{CancelHandle, PeriodicCallback, Scheduler};
pub use update_client::{UpdateClient, UpdateOutcome};
