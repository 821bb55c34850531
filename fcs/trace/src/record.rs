//! Record types and their payload layouts
//!
//! All integers are little-endian. Strings are a length byte followed by
//! UTF-8 bytes, truncated to [`NAME_MAX`] on encode.

use fcs_core::{SchedError, SchedResult};
use fcs_kernel::IterationReport;
use fcs_task::TaskSnapshot;
use heapless::{String, Vec};

use crate::DecodeError;

/// Longest task or target name carried in a record
pub const NAME_MAX: usize = 24;

/// Largest record payload, before byte stuffing
pub const PAYLOAD_MAX: usize = 64;

/// Unframed record body
pub type Payload = Vec<u8, PAYLOAD_MAX>;

/// Record type byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    TargetInfo = 0x01,
    TaskStats = 0x02,
    LoopReport = 0x03,
}

impl TryFrom<u8> for RecordType {
    type Error = DecodeError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x01 => Ok(RecordType::TargetInfo),
            0x02 => Ok(RecordType::TaskStats),
            0x03 => Ok(RecordType::LoopReport),
            other => Err(DecodeError::UnknownRecord(other)),
        }
    }
}

/// Target description, sent once when a debug link attaches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub version: String<NAME_MAX>,
    pub target: String<NAME_MAX>,
    pub ticks_per_us: u32,
    pub capacity: u8,
}

impl TargetInfo {
    pub fn new(version: &str, target: &str, ticks_per_us: u32, capacity: usize) -> Self {
        Self {
            version: truncated(version),
            target: truncated(target),
            ticks_per_us,
            capacity: capacity.min(u8::MAX as usize) as u8,
        }
    }
}

/// Statistics of one task, in microseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u8,
    pub priority: u8,
    pub name: String<NAME_MAX>,
    pub last_us: u32,
    pub current_us: u32,
    pub min_us: u32,
    pub avg_us: u32,
    pub max_us: u32,
    pub worst_us: u32,
    pub run_count: u32,
}

impl From<&TaskSnapshot> for TaskRecord {
    fn from(snapshot: &TaskSnapshot) -> Self {
        Self {
            id: snapshot.id.0,
            priority: snapshot.priority.raw(),
            name: truncated(snapshot.name),
            last_us: snapshot.last_us,
            current_us: snapshot.current_us,
            min_us: snapshot.min_us,
            avg_us: snapshot.avg_us,
            max_us: snapshot.max_us,
            worst_us: snapshot.worst_us,
            run_count: snapshot.run_count,
        }
    }
}

/// Outcome of one scheduler iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRecord {
    pub iteration: u32,
    pub tasks_run: u32,
    pub tasks_considered: u32,
    pub deadline_overrun: bool,
    pub load_us: u32,
}

impl LoopRecord {
    pub fn new(iteration: u32, report: &IterationReport) -> Self {
        Self {
            iteration,
            tasks_run: report.tasks_run,
            tasks_considered: report.tasks_considered,
            deadline_overrun: report.deadline_overrun,
            load_us: report.load_us,
        }
    }
}

/// A decoded or to-be-encoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    TargetInfo(TargetInfo),
    Task(TaskRecord),
    Loop(LoopRecord),
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::TargetInfo(_) => RecordType::TargetInfo,
            Record::Task(_) => RecordType::TaskStats,
            Record::Loop(_) => RecordType::LoopReport,
        }
    }

    /// Serialize the record body
    pub fn encode(&self) -> SchedResult<Payload> {
        let mut out = Writer(Payload::new());
        match self {
            Record::TargetInfo(info) => {
                out.str(&info.version)?;
                out.str(&info.target)?;
                out.u32(info.ticks_per_us)?;
                out.u8(info.capacity)?;
            }
            Record::Task(task) => {
                out.u8(task.id)?;
                out.u8(task.priority)?;
                out.str(&task.name)?;
                for value in [
                    task.last_us,
                    task.current_us,
                    task.min_us,
                    task.avg_us,
                    task.max_us,
                    task.worst_us,
                    task.run_count,
                ] {
                    out.u32(value)?;
                }
            }
            Record::Loop(report) => {
                out.u32(report.iteration)?;
                out.u32(report.tasks_run)?;
                out.u32(report.tasks_considered)?;
                out.u8(report.deadline_overrun as u8)?;
                out.u32(report.load_us)?;
            }
        }
        Ok(out.0)
    }

    /// Parse a record body of the given type
    pub fn parse(record_type: u8, payload: &[u8]) -> Result<Self, DecodeError> {
        let mut input = Reader(payload);
        let record = match RecordType::try_from(record_type)? {
            RecordType::TargetInfo => Record::TargetInfo(TargetInfo {
                version: input.str()?,
                target: input.str()?,
                ticks_per_us: input.u32()?,
                capacity: input.u8()?,
            }),
            RecordType::TaskStats => Record::Task(TaskRecord {
                id: input.u8()?,
                priority: input.u8()?,
                name: input.str()?,
                last_us: input.u32()?,
                current_us: input.u32()?,
                min_us: input.u32()?,
                avg_us: input.u32()?,
                max_us: input.u32()?,
                worst_us: input.u32()?,
                run_count: input.u32()?,
            }),
            RecordType::LoopReport => Record::Loop(LoopRecord {
                iteration: input.u32()?,
                tasks_run: input.u32()?,
                tasks_considered: input.u32()?,
                deadline_overrun: input.u8()? != 0,
                load_us: input.u32()?,
            }),
        };

        if !input.0.is_empty() {
            return Err(DecodeError::Malformed);
        }
        Ok(record)
    }
}

/// Copy as much of `value` as fits, cutting on a char boundary
fn truncated(value: &str) -> String<NAME_MAX> {
    let mut out = String::new();
    for ch in value.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

struct Writer(Payload);

impl Writer {
    fn u8(&mut self, value: u8) -> SchedResult<()> {
        self.0.push(value).map_err(|_| SchedError::BufferOverflow)
    }

    fn u32(&mut self, value: u32) -> SchedResult<()> {
        self.0
            .extend_from_slice(&value.to_le_bytes())
            .map_err(|_| SchedError::BufferOverflow)
    }

    fn str(&mut self, value: &str) -> SchedResult<()> {
        self.u8(value.len() as u8)?;
        self.0
            .extend_from_slice(value.as_bytes())
            .map_err(|_| SchedError::BufferOverflow)
    }
}

struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.0.len() < len {
            return Err(DecodeError::Malformed);
        }
        let (head, rest) = self.0.split_at(len);
        self.0 = rest;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn str<const M: usize>(&mut self) -> Result<String<M>, DecodeError> {
        let len = self.u8()? as usize;
        let text = core::str::from_utf8(self.take(len)?).map_err(|_| DecodeError::Malformed)?;
        let mut out = String::new();
        out.push_str(text).map_err(|_| DecodeError::Malformed)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_names_truncate_on_char_boundary() {
        let name: String<NAME_MAX> = truncated("blackbox-logging-to-external-flash");
        assert_eq!(name.len(), NAME_MAX);
        assert_eq!(name.as_str(), "blackbox-logging-to-exte");

        // 'é' is two bytes and straddles the limit.
        let accented: String<NAME_MAX> = truncated("aaaaaaaaaaaaaaaaaaaaaaaé");
        assert_eq!(accented.len(), 23);
    }

    #[test]
    fn test_task_record_fits_payload() {
        let record = Record::Task(TaskRecord {
            id: 3,
            priority: 255,
            name: truncated("a-name-that-is-exactly-the-maximum-length"),
            last_us: u32::MAX,
            current_us: 1,
            min_us: 2,
            avg_us: 3,
            max_us: 4,
            worst_us: 5,
            run_count: 6,
        });
        let payload = record.encode().unwrap();
        assert_eq!(payload.len(), 2 + 1 + NAME_MAX + 7 * 4);
        assert_eq!(Record::parse(RecordType::TaskStats as u8, &payload), Ok(record));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(Record::parse(0x42, &[]), Err(DecodeError::UnknownRecord(0x42)));
    }

    #[test]
    fn test_short_or_trailing_payload_rejected() {
        let report = Record::Loop(LoopRecord {
            iteration: 7,
            tasks_run: 3,
            tasks_considered: 5,
            deadline_overrun: true,
            load_us: 12,
        });
        let payload = report.encode().unwrap();

        assert_eq!(
            Record::parse(RecordType::LoopReport as u8, &payload[..payload.len() - 1]),
            Err(DecodeError::Malformed)
        );

        let mut padded = payload.clone();
        padded.push(0).unwrap();
        assert_eq!(Record::parse(RecordType::LoopReport as u8, &padded), Err(DecodeError::Malformed));
    }
}
