use std::{
    collections::BTreeMap,
    time::Duration,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerId(u64);

enum Entry<E> {
    Once(E),
    Countdown {
        remaining: u32,
        period: Duration,
        on_tick: fn(u32) -> E,
        on_expire: E,
    },
}

/// Timers on a single logical timeline, measured from the start of the
/// session.
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Entry<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn after(&mut self, delay: Duration, event: E) -> TimerId {
        let id = self.allocate();
        self.queue.insert((self.now + delay, id), Entry::Once(event));
        id
    }

    /// Fires `on_tick(remaining)` every `period` until the count runs out,
    /// then fires `on_expire` in place of the final tick.
    pub fn start_countdown(
        &mut self,
        units: u32,
        period: Duration,
        on_tick: fn(u32) -> E,
        on_expire: E,
    ) -> TimerId {
        let id = self.allocate();
        let entry = if units == 0 {
            Entry::Once(on_expire)
        } else {
            Entry::Countdown {
                remaining: units,
                period,
                on_tick,
                on_expire,
            }
        };
        let deadline = if units == 0 { self.now } else { self.now + period };
        self.queue.insert((deadline, id), entry);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|(_, tid), _| *tid != id);
        self.queue.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.queue.keys().any(|(_, tid)| *tid == id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pops the earliest event due at or before `now` and moves the clock to
    /// its deadline. Returns `None` once nothing is due, leaving the clock at
    /// `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<E> {
        let due = match self.queue.first_key_value() {
            Some((&(deadline, _), _)) => deadline <= now,
            None => false,
        };
        if !due {
            self.now = self.now.max(now);
            return None;
        }
        let ((deadline, id), entry) = self.queue.pop_first()?;
        self.now = self.now.max(deadline);
        match entry {
            Entry::Once(event) => Some(event),
            Entry::Countdown {
                remaining,
                period,
                on_tick,
                on_expire,
            } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    return Some(on_expire);
                }
                self.queue.insert(
                    (deadline + period, id),
                    Entry::Countdown {
                        remaining,
                        period,
                        on_tick,
                        on_expire,
                    },
                );
                Some(on_tick(remaining))
            }
        }
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }
}
