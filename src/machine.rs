use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    bus::{IobBus, TvBus},
    clock::{ClockStrategy, MicrosClock, HZ60_PERIOD_US},
    display::{DisplayBackend, DisplayControl, DisplaySlot, NullBackend},
    error::IobError,
    internal_state::{IobState, ReportState},
    interrupt::{InterruptLine, NullIrq},
    keyboard::KeyboardMouse,
    sound::{Beeper, TerminalBell},
};

/// How 60Hz pulses reach the display CSR. Chosen at startup, never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStrategy {
    /// The embedder's scheduler drives ticks through `Iob::poll`;
    /// ordering is deterministic relative to the emulated cycle count.
    Polled,
    /// A host timer thread ticks the display directly at 60Hz. The display
    /// register moves behind a mutex; `poll` never ticks it.
    HostTimer,
}

/// Timer thread for `TickStrategy::HostTimer`. Stopped and joined on drop.
struct HostTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl HostTimer {
    fn spawn(tv: Arc<Mutex<DisplayControl>>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let period = Duration::from_micros(HZ60_PERIOD_US);

        let handle = thread::spawn(move || {
            let mut deadline = Instant::now() + period;
            while !flag.load(Ordering::Relaxed) {
                spin_sleep::sleep(deadline.saturating_duration_since(Instant::now()));
                deadline += period;
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                tv.lock().unwrap_or_else(PoisonError::into_inner).on_tick();
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for HostTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// The assembled i/o board: unibus register file (keyboard/mouse/clock),
/// xbus display register file, and the 60Hz tick plumbing between them.
pub struct Iob {
    pub bus: IobBus,
    pub tv: TvBus,
    tick: TickStrategy,
    _timer: Option<HostTimer>,
}

impl Iob {
    /// Unibus read, offsets relative to the board base.
    pub fn read(&mut self, offset: u16) -> u16 {
        self.bus.read(offset)
    }

    /// Unibus write.
    pub fn write(&mut self, offset: u16, v: u16) {
        self.bus.write(offset, v);
    }

    /// Display register file read.
    pub fn tv_read(&mut self, offset: u16) -> u8 {
        self.tv.read(offset)
    }

    /// Display register file write.
    pub fn tv_write(&mut self, offset: u16, v: u8) {
        self.tv.write(offset, v);
    }

    /// Per-cycle-batch hook from the emulation loop; `cycles` is the number
    /// executed since the previous call. Advances the cycle-derived clock
    /// and, under the polled strategy, forwards due 60Hz pulses to the
    /// display.
    pub fn poll(&mut self, cycles: u64) {
        self.bus.clock.advance(cycles);
        if self.tick == TickStrategy::Polled && self.bus.clock.tick_60hz() {
            self.tv.on_tick();
        }
    }

    /// New scan word from the host input layer.
    pub fn set_scan(&mut self, scan: u32) {
        self.bus.kbd.set_scan(scan);
    }

    /// Mouse motion pending from the host input layer.
    pub fn set_mouse_ready(&mut self) {
        self.bus.kbd.set_mouse_ready();
    }

    /// 60Hz clock event on the keyboard CSR path (clock-ready + clock
    /// vector), for embedders that route the periodic interrupt there.
    pub fn kbd_clock_event(&mut self) {
        self.bus.kbd.clock_event();
    }
}

impl ReportState for Iob {
    fn report_state(&mut self) -> anyhow::Result<IobState> {
        Ok(IobState {
            key_scan: self.bus.kbd.scan(),
            kbd_csr: self.bus.kbd.read_csr(),
            tv_csr: self.tv.tv.with(|tv| tv.read()),
            usec: self.bus.clock.sample(),
        })
    }
}

/// Wires up an `Iob`. Defaults: wall clock, polled ticks, terminal bell,
/// interrupt lines and display backend wired to nothing.
pub struct IobBuilder {
    clock_strategy: ClockStrategy,
    tick_strategy: TickStrategy,
    tv_vector: u16,
    unibus_irq: Box<dyn InterruptLine>,
    xbus_irq: Box<dyn InterruptLine + Send>,
    backend: Box<dyn DisplayBackend + Send>,
    bell: Box<dyn Beeper>,
}

impl IobBuilder {
    pub fn new() -> Self {
        Self {
            clock_strategy: ClockStrategy::Wall,
            tick_strategy: TickStrategy::Polled,
            tv_vector: 0,
            unibus_irq: Box::new(NullIrq),
            xbus_irq: Box::new(NullIrq),
            backend: Box::new(NullBackend),
            bell: Box::new(TerminalBell),
        }
    }

    pub fn clock_strategy(mut self, strategy: ClockStrategy) -> Self {
        self.clock_strategy = strategy;
        self
    }

    pub fn tick_strategy(mut self, strategy: TickStrategy) -> Self {
        self.tick_strategy = strategy;
        self
    }

    /// Vector handed to the xbus dispatcher on display ticks. The hardware
    /// line carries no vector of its own; dispatchers that key on the line
    /// alone can ignore it.
    pub fn tv_vector(mut self, vector: u16) -> Self {
        self.tv_vector = vector;
        self
    }

    pub fn unibus_irq(mut self, irq: Box<dyn InterruptLine>) -> Self {
        self.unibus_irq = irq;
        self
    }

    pub fn xbus_irq(mut self, irq: Box<dyn InterruptLine + Send>) -> Self {
        self.xbus_irq = irq;
        self
    }

    pub fn display_backend(mut self, backend: Box<dyn DisplayBackend + Send>) -> Self {
        self.backend = backend;
        self
    }

    pub fn beeper(mut self, bell: Box<dyn Beeper>) -> Self {
        self.bell = bell;
        self
    }

    pub fn build(self) -> Result<Iob, IobError> {
        let clock = MicrosClock::start(self.clock_strategy)?;
        let kbd = KeyboardMouse::new(self.unibus_irq, self.bell);
        let tv = DisplayControl::new(self.tv_vector, self.xbus_irq, self.backend);

        let (slot, timer) = match self.tick_strategy {
            TickStrategy::Polled => (DisplaySlot::Owned(tv), None),
            TickStrategy::HostTimer => {
                let shared = Arc::new(Mutex::new(tv));
                let timer = HostTimer::spawn(shared.clone());
                (DisplaySlot::Shared(shared), Some(timer))
            }
        };

        tracing::info!(
            "Initializing i/o board: clock {:?}, ticks {:?}",
            self.clock_strategy,
            self.tick_strategy
        );

        Ok(Iob {
            bus: IobBus::new(kbd, clock),
            tv: TvBus::new(slot),
            tick: self.tick_strategy,
            _timer: timer,
        })
    }
}

impl Default for IobBuilder {
    fn default() -> Self {
        Self::new()
    }
}
