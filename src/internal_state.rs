use serde::{Deserialize, Serialize};

/// Snapshot of the board's registers for diagnostics and dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IobState {
    pub key_scan: u32,
    pub kbd_csr: u8,
    pub tv_csr: u8,
    pub usec: u32,
}

pub trait ReportState {
    fn report_state(&mut self) -> anyhow::Result<IobState>;
}
