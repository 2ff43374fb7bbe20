use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::mpsc::Sender};

/// Interrupt-line transition raised toward the host's dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqMessage {
    Assert(u16),
    Deassert,
}

/// One bus interrupt line. The board drives two independent instances: the
/// unibus line (keyboard/mouse/clock vectors) and the xbus line (display).
/// Delivery is the dispatcher's business; no state is kept on this side.
pub trait InterruptLine {
    fn assert(&mut self, vector: u16);
    fn deassert(&mut self);
}

pub type IrqQueue = Rc<RefCell<VecDeque<IrqMessage>>>;

/// Line that records transitions on a shared queue, drained by the host
/// machine loop. Single-threaded; pair it with the polled tick strategy.
pub struct QueuedIrq {
    queue: IrqQueue,
}

impl QueuedIrq {
    pub fn new(queue: IrqQueue) -> Self {
        Self { queue }
    }
}

impl InterruptLine for QueuedIrq {
    fn assert(&mut self, vector: u16) {
        self.queue.borrow_mut().push_back(IrqMessage::Assert(vector));
    }

    fn deassert(&mut self) {
        self.queue.borrow_mut().push_back(IrqMessage::Deassert);
    }
}

/// Channel-backed line for callers that cross a thread boundary, e.g. the
/// display line ticked from the host timer. A hung-up receiver drops the
/// transition; the board never blocks on its dispatcher.
pub struct ChannelIrq {
    tx: Sender<IrqMessage>,
}

impl ChannelIrq {
    pub fn new(tx: Sender<IrqMessage>) -> Self {
        Self { tx }
    }
}

impl InterruptLine for ChannelIrq {
    fn assert(&mut self, vector: u16) {
        let _ = self.tx.send(IrqMessage::Assert(vector));
    }

    fn deassert(&mut self) {
        let _ = self.tx.send(IrqMessage::Deassert);
    }
}

/// Line wired to nothing.
#[derive(Default)]
pub struct NullIrq;

impl InterruptLine for NullIrq {
    fn assert(&mut self, _vector: u16) {}

    fn deassert(&mut self) {}
}
