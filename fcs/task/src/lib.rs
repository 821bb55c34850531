#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # FCS Tasks
//!
//! Task descriptors, their runtime statistics, and the fixed-capacity queue
//! that keeps them ordered by descending priority. The queue is built once at
//! startup from the firmware's task registry; afterwards only the statistics
//! of each task change.

pub mod queue;
pub mod snapshot;
pub mod stats;
pub mod task;

pub use fcs_core::*;
pub use queue::*;
pub use snapshot::*;
pub use stats::*;
pub use task::*;
