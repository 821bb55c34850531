//! Round-robin cursor over the task queue
//!
//! The cursor survives across iterations, so tasks of equal standing that do
//! not all fit in one frame take turns over the longer term.

/// Persistent sweep position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundRobin {
    position: usize,
}

impl RoundRobin {
    pub const fn new() -> Self {
        Self { position: 0 }
    }

    /// Position of the next task to visit
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Return the index to visit and move past it, wrapping at `len`
    ///
    /// The second value is true when the cursor wrapped back to 0.
    /// `len` must be non-zero.
    pub fn advance(&mut self, len: usize) -> (usize, bool) {
        let index = self.position % len;
        self.position = (index + 1) % len;
        (index, self.position == 0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RoundRobin {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "RoundRobin({})", self.position);
    }
}
