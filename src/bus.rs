use tracing::trace;

use crate::{clock::MicrosClock, display::DisplaySlot, keyboard::KeyboardMouse};

/// Unibus register file of the i/o board, base 764100. Offsets are in the
/// bus's native (octal, word) addressing. The address space is only
/// partially populated: unmapped offsets read as zero and swallow writes.
pub struct IobBus {
    pub kbd: KeyboardMouse,
    pub clock: MicrosClock,
}

impl IobBus {
    pub fn new(kbd: KeyboardMouse, clock: MicrosClock) -> Self {
        Self { kbd, clock }
    }

    pub fn read(&mut self, offset: u16) -> u16 {
        match offset {
            0o100 => {
                let v = self.kbd.read_low();
                trace!("[IOB] [RD] [KbdLow  ] [{:04o}] = {:06o}", offset, v);
                v
            }
            0o102 => {
                let v = self.kbd.read_high();
                trace!("[IOB] [RD] [KbdHigh ] [{:04o}] = {:06o}", offset, v);
                v
            }
            0o110 => {
                trace!("[IOB] [RD] [Beep    ] [{:04o}]", offset);
                self.kbd.beep();
                0
            }
            0o112 => {
                let v = u16::from(self.kbd.read_csr());
                trace!("[IOB] [RD] [KbdCsr  ] [{:04o}] = {:06o}", offset, v);
                v
            }
            0o120 => {
                let v = self.clock.read_low();
                trace!("[IOB] [RD] [UsecLow ] [{:04o}] = {:06o}", offset, v);
                v
            }
            0o122 => {
                let v = self.clock.read_high();
                trace!("[IOB] [RD] [UsecHigh] [{:04o}] = {:06o}", offset, v);
                v
            }
            0o124 => {
                // 60hz tick counter; the real board counts, we stub it
                trace!("[IOB] [RD] [Hz60    ] [{:04o}] = 0", offset);
                0
            }
            _ => {
                trace!("[IOB] [RD] unmapped offset {:04o}", offset);
                0
            }
        }
    }

    pub fn write(&mut self, offset: u16, v: u16) {
        match offset {
            0o100 | 0o102 => {
                // scan word is read-only from the bus side
                trace!("[IOB] [WR] [KbdScan ] [{:04o}] = {:06o} ignored", offset, v);
            }
            0o110 => {
                trace!("[IOB] [WR] [Beep    ] [{:04o}]", offset);
                self.kbd.beep();
            }
            0o112 => {
                trace!("[IOB] [WR] [KbdCsr  ] [{:04o}] = {:06o}", offset, v);
                self.kbd.write_csr(v as u8);
            }
            0o120 | 0o122 => {
                trace!("[IOB] [WR] [Usec    ] [{:04o}] = {:06o} ignored", offset, v);
            }
            0o124 => {
                trace!("[IOB] [WR] [Hz60    ] [{:04o}] = {:06o} ignored", offset, v);
            }
            _ => {
                trace!("[IOB] [WR] unmapped offset {:04o} = {:06o}", offset, v);
            }
        }
    }
}

/// Xbus register file for the display: a single CSR at offset 0, permissive
/// everywhere else like its unibus sibling.
pub struct TvBus {
    pub tv: DisplaySlot,
}

impl TvBus {
    pub fn new(tv: DisplaySlot) -> Self {
        Self { tv }
    }

    pub fn read(&mut self, offset: u16) -> u8 {
        match offset {
            0 => {
                let v = self.tv.with(|tv| tv.read());
                trace!("[TV ] [RD] [TvCsr   ] [{:04o}] = {:03o}", offset, v);
                v
            }
            _ => {
                trace!("[TV ] [RD] unmapped offset {:04o}", offset);
                0
            }
        }
    }

    pub fn write(&mut self, offset: u16, v: u8) {
        match offset {
            0 => {
                trace!("[TV ] [WR] [TvCsr   ] [{:04o}] = {:03o}", offset, v);
                self.tv.with(|tv| tv.write(v));
            }
            _ => {
                trace!("[TV ] [WR] unmapped offset {:04o} = {:03o}", offset, v);
            }
        }
    }

    pub fn on_tick(&mut self) {
        self.tv.with(|tv| tv.on_tick());
    }
}
