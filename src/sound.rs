use std::io::{self, Write};

/// Click-audio trigger. The board exposes a single "click" register; any
/// access to it fires one alert on the host.
pub trait Beeper {
    fn beep(&mut self);
}

/// Rings the terminal bell (BEL on stderr).
pub struct TerminalBell;

impl Beeper for TerminalBell {
    fn beep(&mut self) {
        let mut stderr = io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

pub struct Mute;

impl Beeper for Mute {
    fn beep(&mut self) {}
}
