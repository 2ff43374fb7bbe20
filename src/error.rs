// I/O board error types

use thiserror::Error;

/// Errors surfaced while bringing the board up. Bus accesses themselves are
/// total: unmapped offsets read as zero and writes outside the writable mask
/// are silently dropped, matching the hardware's tolerance of spurious bits.
#[derive(Debug, Error)]
pub enum IobError {
    #[error("host clock unavailable: {0}")]
    HostClockUnavailable(String),
}
