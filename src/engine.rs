//! Engine - the dispatch loops around the matching core.
//!
//! Construction wires up the two rings and hands back the external
//! endpoints: a producer for commands and a consumer for events. The
//! engine thread calls [`Engine::run`], which drains the input ring
//! forever; a second thread calls [`run_output`] to deliver events to a
//! callback. Neither loop ever returns and there is no shutdown path;
//! the process owns the lifetime.

use crate::command::{InputCommand, OutputEvent};
use crate::matching::MatchingEngine;
use crate::pool::MAX_ORDERS;
use crate::ring::{Consumer, Producer, RingBuffer};

/// Batch size of the drain buffers used by both dispatch loops.
pub const DISTRIBUTOR_BUFFER: usize = 1 << 10;

/// The matching core plus the consumer end of the command ring.
pub struct Engine {
    pub matcher: MatchingEngine,
    input: Consumer<InputCommand>,
    scratch: Vec<InputCommand>,
}

impl Engine {
    /// Full-contract engine. Returns the engine together with the
    /// external ring endpoints: push commands into the returned producer,
    /// read events from the returned consumer.
    pub fn new() -> (Self, Producer<InputCommand>, Consumer<OutputEvent>) {
        Self::with_capacity(MAX_ORDERS)
    }

    /// Engine with a reduced order pool, for tests and benchmarks.
    pub fn with_capacity(
        max_orders: usize,
    ) -> (Self, Producer<InputCommand>, Consumer<OutputEvent>) {
        let (command_tx, command_rx) = RingBuffer::new();
        let (event_tx, event_rx) = RingBuffer::new();

        let engine = Engine {
            matcher: MatchingEngine::with_capacity(max_orders, event_tx),
            input: command_rx,
            scratch: vec![InputCommand::default(); DISTRIBUTOR_BUFFER],
        };
        (engine, command_tx, event_rx)
    }

    /// Input dispatch loop: drain the command ring in batches and drive
    /// the matcher. Blocks forever; run it on a dedicated thread.
    ///
    /// With `pin_to_core` the thread pins itself to the last available
    /// core, which is the one most setups isolate from OS interrupts.
    pub fn run(&mut self, pin_to_core: bool) -> ! {
        if pin_to_core {
            Self::pin_to_core();
        }
        self.matcher.warm_up();

        loop {
            let n = self.input.read(&mut self.scratch);
            for i in 0..n {
                let cmd = self.scratch[i];
                self.matcher.apply(&cmd);
            }
        }
    }

    /// Drain whatever commands are currently buffered, without spinning.
    /// Returns the number processed. Test and benchmark surface; the
    /// real loop is [`run`](Self::run).
    pub fn poll(&mut self) -> usize {
        let n = self.input.try_read(&mut self.scratch);
        for i in 0..n {
            let cmd = self.scratch[i];
            self.matcher.apply(&cmd);
        }
        n
    }

    /// Pin the current thread to the last available CPU core.
    pub fn pin_to_core() {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                core_affinity::set_for_current(*last_core);
            }
        }
    }
}

/// Output dispatch loop: drain the event ring in batches and hand every
/// event to `callback`, in emission order. Blocks forever; run it on its
/// own thread.
pub fn run_output<F>(events: &mut Consumer<OutputEvent>, mut callback: F) -> !
where
    F: FnMut(OutputEvent),
{
    let mut buf = vec![OutputEvent::default(); DISTRIBUTOR_BUFFER];
    loop {
        let n = events.read(&mut buf);
        for &ev in &buf[..n] {
            callback(ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{EventType, Side};

    #[test]
    fn test_poll_feeds_matcher_from_ring() {
        let (mut engine, mut commands, mut events) = Engine::with_capacity(1024);

        commands.push(InputCommand::limit(0, Side::Bid, 100, 10, 1));
        commands.push(InputCommand::limit(0, Side::Ask, 100, 4, 2));

        assert_eq!(engine.poll(), 2);
        assert_eq!(engine.matcher.resting_size(1), Some(6));

        let mut buf = [OutputEvent::default(); 16];
        let n = events.try_read(&mut buf);
        let kinds: Vec<_> = buf[..n].iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventType::Order, EventType::Order, EventType::Execution]
        );
    }

    #[test]
    fn test_poll_ignores_invalid_records() {
        let (mut engine, mut commands, _events) = Engine::with_capacity(1024);

        commands.push(InputCommand::default());
        assert_eq!(engine.poll(), 1);
        assert_eq!(engine.matcher.last_order_id(), 0);
    }

    #[test]
    fn test_poll_empty_ring_returns_zero() {
        let (mut engine, _commands, _events) = Engine::with_capacity(1024);
        assert_eq!(engine.poll(), 0);
    }
}
