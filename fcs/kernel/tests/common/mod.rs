//! Shared fixtures for the kernel integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use fcs_kernel::{CycleClock, Cycles, TaskWork};

/// Deterministic clock
///
/// Every read returns the current value and then advances it by `step`.
/// Tasks may also burn time explicitly through [`ManualClock::burn`].
pub struct ManualClock {
    now: Cell<u32>,
    step: u32,
    ticks_per_us: u32,
}

impl ManualClock {
    pub fn new(start: u32, step: u32) -> Self {
        Self {
            now: Cell::new(start),
            step,
            ticks_per_us: 1,
        }
    }

    pub fn with_ticks_per_us(mut self, ticks_per_us: u32) -> Self {
        self.ticks_per_us = ticks_per_us;
        self
    }

    pub fn burn(&self, cycles: u32) {
        self.now.set(self.now.get().wrapping_add(cycles));
    }

    pub fn set(&self, raw: u32) {
        self.now.set(raw);
    }

    pub fn peek(&self) -> u32 {
        self.now.get()
    }
}

impl CycleClock for ManualClock {
    fn now(&self) -> Cycles {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        Cycles(now)
    }

    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}

/// Task that records its name on every run and burns a fixed cost
pub struct Probe<'c> {
    pub name: &'static str,
    pub log: &'c RefCell<Vec<&'static str>>,
    pub clock: &'c ManualClock,
    pub cost: u32,
}

impl<'c> Probe<'c> {
    pub fn new(
        name: &'static str,
        log: &'c RefCell<Vec<&'static str>>,
        clock: &'c ManualClock,
        cost: u32,
    ) -> Self {
        Self { name, log, clock, cost }
    }
}

impl TaskWork for Probe<'_> {
    fn run(&mut self) {
        self.log.borrow_mut().push(self.name);
        self.clock.burn(self.cost);
    }
}

/// Task whose readiness predicate turns true after a number of polls
pub struct LatePoller {
    pub polls_until_ready: u32,
    pub runs: u32,
}

impl TaskWork for LatePoller {
    fn run(&mut self) {
        self.runs += 1;
    }

    fn poll(&mut self) -> bool {
        if self.polls_until_ready == 0 {
            true
        } else {
            self.polls_until_ready -= 1;
            false
        }
    }
}

/// Task that does nothing
pub struct Idle;

impl TaskWork for Idle {
    fn run(&mut self) {}
}
