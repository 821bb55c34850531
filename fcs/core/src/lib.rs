#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # FCS Core
//!
//! Core types shared by every layer of the flight-controller scheduler:
//! priority tiers, flight-context masks, the cycle time source and the
//! tuning configuration. Nothing in this crate allocates.

use core::fmt;

#[macro_use]
pub mod logging;

pub mod config;
pub mod context;
pub mod priorities;
pub mod time;

pub use config::*;
pub use context::*;
pub use priorities::*;
pub use time::*;

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "defmt")]
    pub use defmt;
    #[cfg(feature = "log")]
    pub use log;
}

/// FCS version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default task queue capacity used by the ports
pub const MAX_TASKS: usize = 16;

/// Result type used throughout the scheduler crates
pub type SchedResult<T> = Result<T, SchedError>;

/// Error types for scheduler setup and diagnostics
///
/// The per-iteration hot path never produces these; they only surface while
/// building the task queue, validating configuration or exporting statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Task queue is at capacity
    QueueFull,
    /// A task with the same identity is already queued
    DuplicateTask,
    /// Priority zero is reserved
    InvalidPriority,
    /// A tuning value is out of range
    InvalidConfig,
    /// Diagnostics buffer cannot hold the record
    BufferOverflow,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::QueueFull => write!(f, "Task queue is full"),
            SchedError::DuplicateTask => write!(f, "Task is already queued"),
            SchedError::InvalidPriority => write!(f, "Invalid priority level"),
            SchedError::InvalidConfig => write!(f, "Invalid scheduler configuration"),
            SchedError::BufferOverflow => write!(f, "Diagnostics buffer overflow"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedError {}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SchedError::QueueFull => defmt::write!(fmt, "QueueFull"),
            SchedError::DuplicateTask => defmt::write!(fmt, "DuplicateTask"),
            SchedError::InvalidPriority => defmt::write!(fmt, "InvalidPriority"),
            SchedError::InvalidConfig => defmt::write!(fmt, "InvalidConfig"),
            SchedError::BufferOverflow => defmt::write!(fmt, "BufferOverflow"),
        }
    }
}
