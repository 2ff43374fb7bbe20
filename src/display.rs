use std::sync::{Arc, Mutex, PoisonError};

use crate::interrupt::InterruptLine;

/// Black-on-white rendering mode flag.
pub const TV_CSR_BOW_MODE: u8 = 1 << 2;
/// 60Hz interrupt pending; set on tick, cleared by any write.
pub const TV_CSR_INT_PENDING: u8 = 1 << 4;

/// Host display side of the bow-mode bit.
pub trait DisplayBackend {
    fn set_bow_mode(&mut self, bow: bool);
}

/// Backend wired to nothing.
#[derive(Default)]
pub struct NullBackend;

impl DisplayBackend for NullBackend {
    fn set_bow_mode(&mut self, _bow: bool) {}
}

/// Display control-status register. Two states: interrupt-idle and
/// interrupt-pending. A tick moves it to pending; any write acknowledges and
/// moves it back to idle. Pending persists until acknowledged.
pub struct DisplayControl {
    csr: u8,
    vector: u16,
    irq: Box<dyn InterruptLine + Send>,
    backend: Box<dyn DisplayBackend + Send>,
}

impl DisplayControl {
    pub fn new(
        vector: u16,
        irq: Box<dyn InterruptLine + Send>,
        backend: Box<dyn DisplayBackend + Send>,
    ) -> Self {
        Self {
            csr: 0,
            vector,
            irq,
            backend,
        }
    }

    pub fn read(&self) -> u8 {
        self.csr
    }

    /// Commit a new CSR value. A bow-mode transition is pushed to the
    /// backend before the commit; the pending bit is cleared afterward no
    /// matter what the caller wrote, and the interrupt line is dropped —
    /// writing the register is the acknowledge path.
    pub fn write(&mut self, v: u8) {
        if (self.csr ^ v) & TV_CSR_BOW_MODE != 0 {
            self.backend.set_bow_mode(v & TV_CSR_BOW_MODE != 0);
        }
        self.csr = v;
        self.csr &= !TV_CSR_INT_PENDING;
        self.irq.deassert();
    }

    /// One 60Hz pulse: mark pending and raise the line. Kept minimal; in
    /// host-timer mode this runs under the register lock from the timer
    /// thread.
    pub fn on_tick(&mut self) {
        self.csr |= TV_CSR_INT_PENDING;
        self.irq.assert(self.vector);
    }
}

/// Where the display register lives, fixed by the tick strategy at startup:
/// owned and unguarded under the polled scheduler, behind a mutex when a
/// host timer thread ticks it.
pub enum DisplaySlot {
    Owned(DisplayControl),
    Shared(Arc<Mutex<DisplayControl>>),
}

impl DisplaySlot {
    pub fn with<R>(&mut self, f: impl FnOnce(&mut DisplayControl) -> R) -> R {
        match self {
            DisplaySlot::Owned(tv) => f(tv),
            DisplaySlot::Shared(tv) => {
                // A panic under the lock leaves at most a stale pending bit;
                // the register itself stays consistent.
                let mut tv = tv.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut tv)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{channel, Receiver, Sender};

    use super::*;
    use crate::interrupt::{ChannelIrq, IrqMessage};

    struct RecordingBackend {
        tx: Sender<bool>,
    }

    impl DisplayBackend for RecordingBackend {
        fn set_bow_mode(&mut self, bow: bool) {
            let _ = self.tx.send(bow);
        }
    }

    fn get_tv() -> (DisplayControl, Receiver<IrqMessage>, Receiver<bool>) {
        let (irq_tx, irq_rx) = channel();
        let (bow_tx, bow_rx) = channel();
        let tv = DisplayControl::new(
            0,
            Box::new(ChannelIrq::new(irq_tx)),
            Box::new(RecordingBackend { tx: bow_tx }),
        );
        (tv, irq_rx, bow_rx)
    }

    #[test]
    fn test_any_write_clears_pending() {
        for v in 0..=255u8 {
            let (mut tv, _irq, _bow) = get_tv();
            tv.on_tick();
            tv.write(v);
            assert_eq!(tv.read() & TV_CSR_INT_PENDING, 0);
            assert_eq!(tv.read(), v & !TV_CSR_INT_PENDING);
        }
    }

    #[test]
    fn test_tick_then_acknowledge() {
        let (mut tv, irq, bow) = get_tv();

        tv.on_tick();
        assert_ne!(tv.read() & TV_CSR_INT_PENDING, 0);
        assert_eq!(irq.try_recv(), Ok(IrqMessage::Assert(0)));

        tv.write(0x04);
        assert_eq!(tv.read(), 0x04);
        assert_eq!(irq.try_recv(), Ok(IrqMessage::Deassert));
        assert_eq!(bow.try_recv(), Ok(true));
    }

    #[test]
    fn test_bow_notify_only_on_transition() {
        let (mut tv, _irq, bow) = get_tv();

        tv.write(0x04);
        assert_eq!(bow.try_recv(), Ok(true));

        tv.write(0x04);
        assert!(bow.try_recv().is_err());

        tv.write(0x00);
        assert_eq!(bow.try_recv(), Ok(false));
    }

    #[test]
    fn test_pending_persists_until_written() {
        let (mut tv, _irq, _bow) = get_tv();
        tv.on_tick();
        for _ in 0..3 {
            assert_ne!(tv.read() & TV_CSR_INT_PENDING, 0);
        }
        tv.on_tick();
        assert_ne!(tv.read() & TV_CSR_INT_PENDING, 0);
    }
}
