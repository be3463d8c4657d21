use parking_lot::{Condvar, Mutex};

/// A single-producer, single-consumer rendezvous stream.
///
/// `send` parks the producer until the consumer has taken the value (or the
/// stream closes), so a stream never buffers more than the one value being
/// handed over. Closing is idempotent and wakes every waiter.
pub(crate) struct Stream<T> {
    slot: Mutex<Slot<T>>,
    cond: Condvar,
}

struct Slot<T> {
    value:  Option<T>,
    closed: bool,
}

impl<T> Stream<T> {
    pub(crate) fn new() -> Self {
        Self { slot: Mutex::new(Slot { value:  None,
                                       closed: false }),
               cond: Condvar::new() }
    }

    /// Hands one value to the consumer, blocking until it is taken.
    ///
    /// # Errors
    /// Returns the value back when the stream is or becomes closed before
    /// the hand-over completes.
    pub(crate) fn send(&self, value: T) -> Result<(), T> {
        let mut slot = self.slot.lock();

        while slot.value.is_some() && !slot.closed {
            self.cond.wait(&mut slot);
        }
        if slot.closed {
            return Err(value);
        }

        slot.value = Some(value);
        self.cond.notify_all();

        while slot.value.is_some() && !slot.closed {
            self.cond.wait(&mut slot);
        }
        match slot.value.take() {
            // Closed before the consumer arrived; reclaim the value.
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    /// Takes the next value, blocking until one is handed over. Returns
    /// `None` once the stream is closed and drained.
    pub(crate) fn recv(&self) -> Option<T> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.value.take() {
                self.cond.notify_all();
                return Some(value);
            }
            if slot.closed {
                return None;
            }
            self.cond.wait(&mut slot);
        }
    }

    pub(crate) fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        self.cond.notify_all();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }
}

/// A consumer-ready flag with close semantics.
///
/// The consumer raises the flag when it is prepared to take the next value;
/// a gated producer observes and clears it before every hand-over, which is
/// what lets a consumer that stops reading halt the producer.
pub(crate) struct Gate {
    state: Mutex<GateState>,
    cond:  Condvar,
}

struct GateState {
    ready:  bool,
    closed: bool,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(GateState { ready:  false,
                                             closed: false }),
               cond:  Condvar::new() }
    }

    /// Signals that the consumer is ready for the next value.
    pub(crate) fn open(&self) {
        let mut state = self.state.lock();
        state.ready = true;
        self.cond.notify_all();
    }

    /// Waits for the consumer to be ready and claims the slot. Returns
    /// `false` once the gate is closed.
    pub(crate) fn take(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return false;
            }
            if state.ready {
                state.ready = false;
                return true;
            }
            self.cond.wait(&mut state);
        }
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn send_blocks_until_taken() {
        let stream = Arc::new(Stream::new());
        let producer = Arc::clone(&stream);

        let handle = thread::spawn(move || {
            producer.send(1).unwrap();
            producer.send(2).unwrap();
            producer.close();
        });

        assert_eq!(stream.recv(), Some(1));
        assert_eq!(stream.recv(), Some(2));
        assert_eq!(stream.recv(), None);
        handle.join().unwrap();
    }

    #[test]
    fn send_fails_after_close() {
        let stream: Stream<i32> = Stream::new();
        stream.close();
        assert_eq!(stream.send(7), Err(7));
        assert!(stream.is_closed());
    }

    #[test]
    fn close_unblocks_sender() {
        let stream = Arc::new(Stream::new());
        let producer = Arc::clone(&stream);

        let handle = thread::spawn(move || producer.send(42));

        // Give the producer a moment to park, then close without taking.
        thread::sleep(std::time::Duration::from_millis(20));
        stream.close();
        assert_eq!(handle.join().unwrap(), Err(42));
    }

    #[test]
    fn gate_roundtrip() {
        let gate = Arc::new(Gate::new());
        let waiter = Arc::clone(&gate);

        let handle = thread::spawn(move || {
            let first = waiter.take();
            let second = waiter.take();
            (first, second)
        });

        gate.open();
        thread::sleep(std::time::Duration::from_millis(20));
        gate.close();
        assert_eq!(handle.join().unwrap(), (true, false));
    }
}
