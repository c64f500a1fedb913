//! List controller crate.
//!
//! This crate reconciles paginated fetching with client-side filter and
//! sort state for one list view at a time.
//!
//! ## Main Components
//!
//! - **generation**: stamps that mark work belonging to abandoned inputs
//! - **accumulator**: the fetched pages, concatenated in fetch order
//! - **readiness**: last-requested-wins publication of derived views
//! - **scroll**: edge-triggered sentinel sensing and debouncing
//! - **controller**: the `ListController` state machine
//! - **session**: `ListSession`, the controller driven on a tokio task
//! - **config**: `ListConfig` from defaults, JSON and environment
//!
//! ## Example Usage
//!
//! ```ignore
//! use controller::{ListConfig, ListController, ListSession};
//! use sources::{CatalogSource, Selector};
//!
//! let config = ListConfig::items().with_env_overrides();
//! let controller = ListController::<Item>::new(config.page_size);
//! let mut session = ListSession::spawn(controller, Arc::new(source), config.debounce());
//!
//! session.set_selector(Selector::category("plants")).await?;
//! let view = session.wait_for(|s| s.is_ready()).await?;
//! session.report_visibility(true).await?;
//! ```

pub mod accumulator;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod readiness;
pub mod scroll;
pub mod session;

pub use accumulator::{Accumulator, AppendOutcome};
pub use config::ListConfig;
pub use controller::{
    Completion, FetchOutcome, FetchTicket, ListController, ListState, PageApplied, RecomputeTicket,
    RecomputedView, ViewSnapshot,
};
pub use error::{ControllerError, Result};
pub use generation::Generation;
pub use readiness::{PublishOutcome, Readiness, ReadinessGate};
pub use scroll::{Debouncer, Edge, VisibilitySensor};
pub use session::{ListCommand, ListSession};
