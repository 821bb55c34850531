#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # FCS Trace
//!
//! Debug export of scheduler statistics. Task snapshots and iteration
//! reports are encoded as HDLC-framed records into a fixed ring buffer that
//! a debug link (USB CDC, UART) drains at its own pace. The matching decoder
//! runs on the host and in tests.
//!
//! ## Frame format
//!
//! ```text
//! [seq] [type] [payload ...] [checksum] 0x7E
//! ```
//!
//! `checksum` is `!(seq + type + sum(payload))` with wrapping addition.
//! `0x7E` and `0x7D` inside a frame are escaped as `0x7D, byte ^ 0x20`.

use core::fmt;

pub mod decoder;
pub mod exporter;
pub mod record;

pub use decoder::*;
pub use exporter::*;
pub use record::*;

/// HDLC protocol constants
pub mod hdlc {
    /// Frame delimiter
    pub const FLAG: u8 = 0x7E;
    /// Escape byte
    pub const ESC: u8 = 0x7D;
    /// XOR mask for escaped bytes
    pub const ESC_XOR: u8 = 0x20;

    /// One's-complement checksum over the unstuffed frame body
    pub fn checksum(sequence: u8, record_type: u8, payload: &[u8]) -> u8 {
        let sum = payload
            .iter()
            .fold(sequence.wrapping_add(record_type), |acc, byte| acc.wrapping_add(*byte));
        !sum
    }

    /// Check whether a byte must be escaped inside a frame
    pub const fn needs_escape(byte: u8) -> bool {
        byte == FLAG || byte == ESC
    }
}

/// Errors produced while decoding frames or records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame shorter than sequence, type and checksum
    FrameTooShort(usize),
    /// Frame longer than the decoder's buffer
    FrameTooLong,
    /// Checksum byte does not match the frame body
    InvalidChecksum { expected: u8, found: u8 },
    /// Record type byte is not known
    UnknownRecord(u8),
    /// Payload does not match its record layout
    Malformed,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::FrameTooShort(len) => write!(f, "frame too short (len={})", len),
            DecodeError::FrameTooLong => write!(f, "frame exceeds decoder buffer"),
            DecodeError::InvalidChecksum { expected, found } => {
                write!(f, "checksum mismatch: expected {:#04x}, found {:#04x}", expected, found)
            }
            DecodeError::UnknownRecord(kind) => write!(f, "unknown record type {}", kind),
            DecodeError::Malformed => write!(f, "malformed record payload"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DecodeError::FrameTooShort(len) => defmt::write!(fmt, "FrameTooShort({})", len),
            DecodeError::FrameTooLong => defmt::write!(fmt, "FrameTooLong"),
            DecodeError::InvalidChecksum { expected, found } => {
                defmt::write!(fmt, "InvalidChecksum({=u8:#x} != {=u8:#x})", found, expected)
            }
            DecodeError::UnknownRecord(kind) => defmt::write!(fmt, "UnknownRecord({})", kind),
            DecodeError::Malformed => defmt::write!(fmt, "Malformed"),
        }
    }
}
