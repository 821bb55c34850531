//! Incremental HDLC frame decoder

use heapless::Vec;

use crate::exporter::FRAME_MAX;
use crate::record::{Payload, Record};
use crate::{hdlc, DecodeError};

/// A verified frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence counter maintained by the exporter
    pub sequence: u8,
    /// Record type byte
    pub record_type: u8,
    /// Unstuffed record body
    pub payload: Payload,
}

impl Frame {
    /// Interpret the payload according to its record type
    pub fn record(&self) -> Result<Record, DecodeError> {
        Record::parse(self.record_type, &self.payload)
    }
}

/// Byte-at-a-time decoder
///
/// Accepts arbitrary chunks of a byte stream and yields a result every time a
/// flag byte closes a non-empty frame. After an error the decoder is already
/// resynchronized on the next flag.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8, FRAME_MAX>,
    escape_next: bool,
    overflowed: bool,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            escape_next: false,
            overflowed: false,
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.escape_next = false;
        self.overflowed = false;
    }

    /// Feed one byte
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame, DecodeError>> {
        if byte == hdlc::FLAG {
            if self.buffer.is_empty() && !self.overflowed {
                return None;
            }
            let result = if self.overflowed {
                Err(DecodeError::FrameTooLong)
            } else {
                Self::decode_frame(&self.buffer)
            };
            self.reset();
            return Some(result);
        }

        let byte = if self.escape_next {
            self.escape_next = false;
            byte ^ hdlc::ESC_XOR
        } else if byte == hdlc::ESC {
            self.escape_next = true;
            return None;
        } else {
            byte
        };

        if self.buffer.push(byte).is_err() {
            self.overflowed = true;
        }
        None
    }

    /// Feed a chunk, passing every completed frame to `sink`
    pub fn push_bytes<F>(&mut self, input: &[u8], mut sink: F)
    where
        F: FnMut(Result<Frame, DecodeError>),
    {
        for &byte in input {
            if let Some(result) = self.push(byte) {
                sink(result);
            }
        }
    }

    fn decode_frame(data: &[u8]) -> Result<Frame, DecodeError> {
        if data.len() < 3 {
            return Err(DecodeError::FrameTooShort(data.len()));
        }

        let (body, checksum) = data.split_at(data.len() - 1);
        let sequence = body[0];
        let record_type = body[1];
        let expected = hdlc::checksum(sequence, record_type, &body[2..]);
        if checksum[0] != expected {
            return Err(DecodeError::InvalidChecksum {
                expected,
                found: checksum[0],
            });
        }

        let payload = Payload::from_slice(&body[2..]).map_err(|_| DecodeError::FrameTooLong)?;
        Ok(Frame {
            sequence,
            record_type,
            payload,
        })
    }
}
