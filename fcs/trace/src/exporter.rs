//! Statistics exporter
//!
//! Frames records into a ring buffer. A frame is committed whole or not at
//! all: when the free space cannot hold it the record is refused with
//! [`SchedError::BufferOverflow`] and the sequence number is not consumed,
//! so a host sees gaps only for frames it actually lost.

use fcs_core::{SchedError, SchedResult};
use fcs_kernel::IterationReport;
use fcs_task::TaskSnapshot;
use heapless::Vec;

use crate::hdlc;
use crate::record::{LoopRecord, Record, TargetInfo, TaskRecord, PAYLOAD_MAX};

/// Worst-case encoded frame: every body byte escaped, plus the flag
pub const FRAME_MAX: usize = 2 * (PAYLOAD_MAX + 3) + 1;

/// Ring buffer of HDLC-framed statistics records
pub struct StatsExporter<const N: usize> {
    data: [u8; N],
    head: usize,
    tail: usize,
    used: usize,
    sequence: u8,
    dropped: u32,
}

impl<const N: usize> StatsExporter<N> {
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            used: 0,
            sequence: 0,
            dropped: 0,
        }
    }

    /// Describe the target to a newly attached host
    pub fn export_target_info(&mut self, info: &TargetInfo) -> SchedResult<()> {
        self.commit(&Record::TargetInfo(info.clone()))
    }

    /// Export one task's statistics
    pub fn export_task(&mut self, snapshot: &TaskSnapshot) -> SchedResult<()> {
        self.commit(&Record::Task(TaskRecord::from(snapshot)))
    }

    /// Export every snapshot, stopping at the first one that does not fit
    ///
    /// Returns the number of records written.
    pub fn export_all<I>(&mut self, snapshots: I) -> SchedResult<usize>
    where
        I: IntoIterator<Item = TaskSnapshot>,
    {
        let mut written = 0;
        for snapshot in snapshots {
            self.export_task(&snapshot)?;
            written += 1;
        }
        Ok(written)
    }

    /// Export an iteration report
    pub fn export_report(&mut self, iteration: u32, report: &IterationReport) -> SchedResult<()> {
        self.commit(&Record::Loop(LoopRecord::new(iteration, report)))
    }

    /// Frame a record and append it to the ring buffer
    pub fn commit(&mut self, record: &Record) -> SchedResult<()> {
        let payload = record.encode()?;
        let frame = self.frame(record.record_type() as u8, &payload)?;

        if frame.len() > self.free() {
            self.dropped = self.dropped.wrapping_add(1);
            fcs_core::debug!("trace buffer full, dropped frame {}", self.sequence);
            return Err(SchedError::BufferOverflow);
        }

        for &byte in &frame {
            self.data[self.head] = byte;
            self.head = (self.head + 1) % N;
        }
        self.used += frame.len();
        self.sequence = self.sequence.wrapping_add(1);
        Ok(())
    }

    fn frame(&self, record_type: u8, payload: &[u8]) -> SchedResult<Vec<u8, FRAME_MAX>> {
        let mut frame: Vec<u8, FRAME_MAX> = Vec::new();
        let checksum = hdlc::checksum(self.sequence, record_type, payload);

        let mut add_byte = |byte: u8| -> SchedResult<()> {
            let result = if hdlc::needs_escape(byte) {
                frame
                    .push(hdlc::ESC)
                    .and_then(|()| frame.push(byte ^ hdlc::ESC_XOR))
            } else {
                frame.push(byte)
            };
            result.map_err(|_| SchedError::BufferOverflow)
        };

        add_byte(self.sequence)?;
        add_byte(record_type)?;
        for &byte in payload {
            add_byte(byte)?;
        }
        add_byte(checksum)?;

        // The flag is never stuffed.
        frame.push(hdlc::FLAG).map_err(|_| SchedError::BufferOverflow)?;
        Ok(frame)
    }

    /// Drain up to `buf.len()` bytes
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() && self.used > 0 {
            buf[n] = self.data[self.tail];
            self.tail = (self.tail + 1) % N;
            self.used -= 1;
            n += 1;
        }
        n
    }

    /// Bytes waiting to be read
    pub fn available(&self) -> usize {
        self.used
    }

    pub fn free(&self) -> usize {
        N - self.used
    }

    /// Frames refused for lack of space
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Sequence number of the next frame
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Discard buffered bytes; the sequence keeps counting
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.used = 0;
    }
}

impl<const N: usize> Default for StatsExporter<N> {
    fn default() -> Self {
        Self::new()
    }
}
