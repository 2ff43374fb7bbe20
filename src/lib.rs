pub mod bus;
pub mod clock;
pub mod display;
pub mod error;
pub mod internal_state;
pub mod interrupt;
pub mod keyboard;
pub mod machine;
pub mod sound;

pub use clock::ClockStrategy;
pub use error::IobError;
pub use internal_state::{IobState, ReportState};
pub use interrupt::{InterruptLine, IrqMessage};
pub use keyboard::ScanWord;
pub use machine::{Iob, IobBuilder, TickStrategy};

/// Board with the default wiring: wall clock, polled ticks, nothing
/// attached to the interrupt lines.
pub fn get_iob() -> Result<Iob, IobError> {
    IobBuilder::new().build()
}
