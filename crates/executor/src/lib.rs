//! # Bounded Executor
//!
//! Runs a list of independent async tasks with a ceiling on how many are in
//! flight at once, and collects their outcomes.
//!
//! ## Features
//!
//! - **Sliding-window admission**: a slot freed by a settling task is refilled
//!   immediately with the next task by index
//! - **Ordered or completion-order delivery**: outcomes come back in
//!   submission order (buffered and released by cursor) or as they settle
//! - **Failure policy**: fail fast on the first observed rejection, or keep
//!   every rejection in its result slot
//! - **Streaming**: outcomes can be consumed incrementally via
//!   [`BoundedExecutor::stream`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BoundedExecutor                          │
//! │  (validates config, drives one run per call)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     AdmissionWindow                          │
//! │  (pending queue by index, in-flight count, ceiling)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  spawn
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  JoinSet (in-flight tasks)                   │
//! │  [Task 0] [Task 1] ... [Task N-1]   settle one at a time    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  (index, outcome)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Delivery                              │
//! │  Ordered: ReorderBuffer (index map + cursor)                │
//! │  Completion: pass-through                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use fanout_executor::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = ExecutorConfig::default()
//!     .with_max_concurrent(2)
//!     .with_fast_fail(false);
//!
//! let tasks: Vec<BoxTask<u32, String>> = vec![
//!     boxed(|| async { Ok(1) }),
//!     boxed(|| async { Err("lookup failed".to_string()) }),
//!     boxed(|| async { Ok(3) }),
//! ];
//!
//! let settled = concurrent(tasks, config).await.unwrap();
//! assert_eq!(settled[0].outcome, Outcome::Fulfilled(1));
//! assert_eq!(settled[1].outcome, Outcome::Rejected("lookup failed".to_string()));
//! assert_eq!(settled[2].outcome, Outcome::Fulfilled(3));
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod reorder;
pub mod task;
pub mod window;

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::{ConfigError, ExecutorConfig};
    pub use crate::error::ExecutorError;
    pub use crate::executor::{concurrent, BoundedExecutor};
    pub use crate::outcome::{Outcome, Settled};
    pub use crate::task::{boxed, BoxTask};
}

// Re-export key types at crate root
pub use config::{ConfigError, ExecutorConfig};
pub use error::ExecutorError;
pub use executor::{concurrent, BoundedExecutor};
pub use outcome::{Outcome, Settled};
pub use reorder::{Delivery, ReorderBuffer};
pub use task::{boxed, BoxTask};
pub use window::AdmissionWindow;
