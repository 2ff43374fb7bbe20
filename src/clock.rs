use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::error::IobError;

/// Machine cycle time; 5 cycles per microsecond.
pub const CYCLE_TIME_NS: u64 = 200;

/// One 60Hz period, rounded down. The tick derivation below uses exact
/// `us * 60 / 1_000_000` window arithmetic, so the long-run pulse rate is
/// 60Hz regardless of this rounding.
pub const HZ60_PERIOD_US: u64 = 1_000_000 / 60;

/// Time base for the microsecond clock, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStrategy {
    /// Host monotonic clock.
    Wall,
    /// Microseconds derived from the emulated cycle count fed through
    /// `advance`. Fully deterministic; used by the timing tests and by
    /// hosts that want emulated time decoupled from wall time.
    CycleDerived,
}

/// Free-running microsecond counter plus the 60Hz tick derived from it.
///
/// The bus reads the counter as two 16-bit halves. The low read samples and
/// latches; the high read returns the upper bits of that latch, never a
/// fresh sample, so a back-to-back low/high pair always reconstructs one
/// consistent 32-bit value. Reading high without a preceding low returns the
/// previous latch; callers must read low first.
#[derive(Debug)]
pub struct MicrosClock {
    strategy: ClockStrategy,
    origin: Option<Instant>,
    cycles: u64,
    latched: u32,
    last_window: u64,
}

impl MicrosClock {
    /// Probes the host time base once. A host that cannot supply one is
    /// fatal: the emulation has no forward progress without it.
    pub fn start(strategy: ClockStrategy) -> Result<Self, IobError> {
        if strategy == ClockStrategy::Wall {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|err| IobError::HostClockUnavailable(err.to_string()))?;
        }

        Ok(Self {
            strategy,
            origin: None,
            cycles: 0,
            latched: 0,
            last_window: 0,
        })
    }

    fn elapsed_us(&mut self) -> u64 {
        match self.strategy {
            ClockStrategy::Wall => match self.origin {
                Some(origin) => origin.elapsed().as_micros() as u64,
                None => {
                    // First sample establishes the origin.
                    self.origin = Some(Instant::now());
                    0
                }
            },
            ClockStrategy::CycleDerived => self.cycles * CYCLE_TIME_NS / 1000,
        }
    }

    /// Elapsed microseconds since the first sample. Wraps at 2^32 like the
    /// 32-bit hardware register pair.
    pub fn sample(&mut self) -> u32 {
        self.elapsed_us() as u32
    }

    /// Samples the clock, latches the value and returns its low half.
    pub fn read_low(&mut self) -> u16 {
        self.latched = self.sample();
        (self.latched & 0xffff) as u16
    }

    /// High half of the sample latched by the last `read_low`.
    pub fn read_high(&self) -> u16 {
        (self.latched >> 16) as u16
    }

    /// Account for executed machine cycles. Only the cycle-derived strategy
    /// consumes these; under the wall strategy this is a no-op.
    pub fn advance(&mut self, cycles: u64) {
        self.cycles = self.cycles.wrapping_add(cycles);
    }

    /// True at most once per 1/60s window since the clock epoch.
    ///
    /// Oversampling is safe: every window yields exactly one pulse no matter
    /// how often this is polled. A caller polling slower than 60Hz gets at
    /// most one catch-up pulse per poll; missed windows are dropped rather
    /// than queued.
    pub fn tick_60hz(&mut self) -> bool {
        let window = self.elapsed_us() * 60 / 1_000_000;
        if window > self.last_window {
            self.last_window = window;
            true
        } else {
            false
        }
    }
}
