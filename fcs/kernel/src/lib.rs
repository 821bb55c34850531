#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # FCS Kernel
//!
//! The cooperative, budgeted scheduler loop. Each iteration computes a
//! deadline from the adaptive loop period, then sweeps the priority-ordered
//! task queue with a persistent round-robin cursor, admitting tasks whose
//! context, readiness, period and predicted runtime allow it. Realtime-tier
//! tasks bypass the budget check and may overrun the deadline.
//!
//! Everything runs on one thread of control; no task is ever preempted.

pub mod admission;
pub mod cursor;
pub mod env;
pub mod report;
pub mod scheduler;

pub use fcs_task::*;
pub use admission::*;
pub use cursor::*;
pub use env::*;
pub use report::*;
pub use scheduler::*;
