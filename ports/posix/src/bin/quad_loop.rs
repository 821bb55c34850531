//! Simulated quadcopter flight loop on a POSIX host
//!
//! Registers the usual firmware task set with synthetic workloads, arms and
//! takes off after a while, and prints per-task statistics on exit.
//!
//! ```text
//! RUST_LOG=info cargo run -p fcs-posix --bin quad_loop -- 3
//! ```

use std::time::{Duration, Instant};

use fcs_core::{CycleClock, MAX_TASKS};
use fcs_kernel::{
    FlightFlags, LoopEnvironment, LoopInputs, Priority, Scheduler, Task, TaskId, TaskMask, TaskQueue, TaskWork,
};
use fcs_posix::{install_stop_handler, run_until_stopped, stop, StdClock};
use fcs_trace::{StatsExporter, TargetInfo};

const LOOPTIME_US: u32 = 250;

/// Busy-wait work with a fixed cost
struct Workload {
    cost: Duration,
}

impl Workload {
    const fn us(cost_us: u64) -> Self {
        Self {
            cost: Duration::from_micros(cost_us),
        }
    }
}

impl TaskWork for Workload {
    fn run(&mut self) {
        let start = Instant::now();
        while start.elapsed() < self.cost {
            std::hint::spin_loop();
        }
    }
}

/// Receiver that only has work when a packet "arrived"
struct Receiver {
    next_packet: Instant,
    interval: Duration,
}

impl TaskWork for Receiver {
    fn run(&mut self) {
        self.next_packet += self.interval;
    }

    fn poll(&mut self) -> bool {
        Instant::now() >= self.next_packet
    }
}

/// Flight profile: disarmed on the ground, then armed, then airborne
struct FlightProfile {
    started: Instant,
    arm_after: Duration,
    takeoff_after: Duration,
    last: FlightFlags,
}

impl LoopEnvironment for FlightProfile {
    fn begin_iteration(&mut self) -> LoopInputs {
        let elapsed = self.started.elapsed();
        let flags = FlightFlags::new(elapsed >= self.arm_after, elapsed >= self.takeoff_after);
        if flags != self.last {
            log::info!("flight state: armed={} in_air={}", flags.armed, flags.in_air);
            self.last = flags;
        }
        LoopInputs {
            looptime_us: LOOPTIME_US,
            flags,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let run_for = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(2));

    if let Err(err) = install_stop_handler() {
        log::warn!("could not install Ctrl+C handler: {}", err);
    }

    let mut gyro = Workload::us(20);
    let mut pid = Workload::us(40);
    let mut rx = Receiver {
        next_packet: Instant::now(),
        interval: Duration::from_millis(4),
    };
    let mut usb = Workload::us(15);
    let mut osd = Workload::us(60);
    let mut blackbox = Workload::us(80);
    let mut vtx = Workload::us(30);

    let queue: TaskQueue<'_, MAX_TASKS> = TaskQueue::from_array([
        Task::new(TaskId(0), "gyro", Priority::REALTIME, &mut gyro),
        Task::new(TaskId(1), "pid", Priority::REALTIME, &mut pid),
        Task::new(TaskId(2), "rx", Priority::HIGH, &mut rx),
        Task::new(TaskId(3), "usb", Priority::MEDIUM, &mut usb).with_mask(TaskMask::ON_GROUND),
        Task::new(TaskId(4), "osd", Priority::LOW, &mut osd).with_period_us(20_000),
        Task::new(TaskId(5), "blackbox", Priority::LOW, &mut blackbox).with_mask(TaskMask::IN_AIR),
        Task::new(TaskId(6), "vtx", Priority::LOW, &mut vtx)
            .with_mask(TaskMask::ON_GROUND)
            .with_period_us(100_000),
    ]);

    let clock = StdClock::new();
    let ticks_per_us = clock.ticks_per_us();
    let mut scheduler = Scheduler::new(queue, clock);

    let profile = FlightProfile {
        started: Instant::now(),
        arm_after: run_for / 3,
        takeoff_after: run_for / 2,
        last: FlightFlags::GROUNDED,
    };

    let deadline = Instant::now() + run_for;
    let mut overruns = 0u32;
    let iterations = run_until_stopped(&mut scheduler, profile, |_, report| {
        if report.deadline_overrun {
            overruns += 1;
        }
        if Instant::now() >= deadline {
            stop();
        }
    });

    log::info!("{} iterations, {} overran, last load {}us", iterations, overruns, scheduler.cpu_load_us());
    println!(
        "{:<10} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "task", "prio", "runs", "cur", "min", "avg", "max", "worst"
    );
    for snap in scheduler.snapshot() {
        println!(
            "{:<10} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            snap.name,
            snap.priority.raw(),
            snap.run_count,
            snap.current_us,
            snap.min_us,
            snap.avg_us,
            snap.max_us,
            snap.worst_us
        );
    }

    let mut exporter = StatsExporter::<2048>::new();
    let target = TargetInfo::new(fcs_core::VERSION, "posix", ticks_per_us, MAX_TASKS);
    let exported = exporter
        .export_target_info(&target)
        .and_then(|()| exporter.export_all(scheduler.snapshot()));
    match exported {
        Ok(count) => log::info!("exported {} task records, {} bytes framed", count, exporter.available()),
        Err(err) => log::error!("statistics export failed: {}", err),
    }
}
