use parking_lot::Mutex;

/// Lamport clock shared by every request handler in the process.
///
/// `tick` and `merge` both strictly increase the value, and
/// `merge(remote)` always lands above both the prior local value and
/// `remote`, so any value the server echoes back orders after every
/// event it has observed.
#[derive(Debug, Default)]
pub struct LamportClock {
    clock: Mutex<u64>,
}

impl LamportClock {
    pub fn new() -> Self {
        LamportClock {
            clock: Mutex::new(0),
        }
    }

    /// Local event: increment and return the new value.
    pub fn tick(&self) -> u64 {
        let mut clock = self.clock.lock();
        *clock += 1;
        *clock
    }

    /// Receive event: fold a remote clock value into the local one.
    pub fn merge(&self, remote: u64) -> u64 {
        let mut clock = self.clock.lock();
        *clock = (*clock).max(remote) + 1;
        *clock
    }

    pub fn value(&self) -> u64 {
        *self.clock.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_at_zero() {
        let clock = LamportClock::new();
        assert_eq!(clock.value(), 0);
    }

    #[test]
    fn tick_increments_by_one() {
        let clock = LamportClock::new();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.value(), 2);
    }

    #[test]
    fn merge_jumps_past_remote() {
        let clock = LamportClock::new();
        clock.tick();
        assert_eq!(clock.merge(10), 11);
        assert_eq!(clock.value(), 11);
    }

    #[test]
    fn merge_with_stale_remote_still_advances() {
        let clock = LamportClock::new();
        for _ in 0..5 {
            clock.tick();
        }
        assert_eq!(clock.merge(2), 6);
    }

    #[test]
    fn concurrent_ticks_never_lose_an_increment() {
        let clock = Arc::new(LamportClock::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let clock = clock.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    clock.tick();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(clock.value(), 8000);
    }
}
