//! Parallel dispatch of cpptraj runs
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │       Dispatcher        │
//!                     │  - polls counter 100ms  │
//!                     │  - collects outcomes    │
//!                     └───────────┬─────────────┘
//!                                 │ closed TaskQueue
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  cpptraj  │             │  cpptraj  │             │  cpptraj  │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └──── counter += 1, TaskOutcome ──▶ outcome channel ┘
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{DispatchProgress, DispatchResult, Dispatcher, POLL_INTERVAL};
pub use queue::{CompletionCounter, TaskQueue};
