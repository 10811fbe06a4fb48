use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Shortest interval accepted by [`TimerService::every`]; a zero interval would
/// re-arm forever within a single advance.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Cancelable one-shot/interval scheduling. The payload `E` stands in for the
/// callback and is handed back to the owner when the timer fires.
pub trait TimerService<E> {
    fn after(&mut self, delay: Duration, event: E) -> TimerHandle;
    fn every(&mut self, interval: Duration, event: E) -> TimerHandle;
    /// Cancelling a fired or already cancelled handle does nothing.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone)]
struct TimerEntry<E> {
    event: E,
    interval: Option<Duration>,
}

/// Deterministic timer queue on a monotonic clock measured from its creation.
///
/// The queue never reads wall time itself: the owner advances it, either from
/// a real clock or from a test. Due timers come out one at a time in deadline
/// order (ties by creation order), so handling one event can still cancel a
/// later one that is due in the same advance.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    deadlines: BTreeMap<(Duration, u64), TimerEntry<E>>,
    armed: HashMap<u64, Duration>,
    fired: u64,
    cancelled: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            deadlines: BTreeMap::new(),
            armed: HashMap::new(),
            fired: 0,
            cancelled: 0,
        }
    }
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.armed.contains_key(&handle.0)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn fired_total(&self) -> u64 {
        self.fired
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Interval timers are re-armed before they are returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, E)> {
        let key = *self.deadlines.keys().next()?;
        if key.0 > until {
            return None;
        }
        let entry = self.deadlines.remove(&key)?;
        let (deadline, id) = key;
        self.now = self.now.max(deadline);
        self.fired += 1;

        let event = match entry.interval {
            Some(interval) => {
                let next = deadline.saturating_add(interval);
                let event = entry.event.clone();
                self.deadlines.insert((next, id), entry);
                self.armed.insert(id, next);
                event
            }
            None => {
                self.armed.remove(&id);
                entry.event
            }
        };
        Some((TimerHandle(id), event))
    }

    /// Moves the clock forward without firing anything. Call after draining
    /// [`pop_due`](Self::pop_due) for the same instant.
    pub fn settle(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, delay: Duration, event: E, interval: Option<Duration>) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.deadlines.insert((deadline, id), TimerEntry { event, interval });
        self.armed.insert(id, deadline);
        TimerHandle(id)
    }
}

impl<E: Clone> TimerService<E> for TimerQueue<E> {
    fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.insert(delay, event, None)
    }

    fn every(&mut self, interval: Duration, event: E) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, event, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(deadline) = self.armed.remove(&handle.0) {
            self.deadlines.remove(&(deadline, handle.0));
            self.cancelled += 1;
        }
    }
}

/// Handles owned by one component, cancelled together.
#[derive(Debug, Default, Clone)]
pub struct TimerSet {
    handles: Vec<TimerHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, handle: TimerHandle) -> TimerHandle {
        self.handles.push(handle);
        handle
    }

    /// Drops a handle that has fired and will not fire again.
    pub fn forget(&mut self, handle: TimerHandle) {
        self.handles.retain(|held| *held != handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn cancel_all<E>(&mut self, timers: &mut dyn TimerService<E>) {
        for handle in self.handles.drain(..) {
            timers.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, event)) = queue.pop_due(until) {
            fired.push(event);
        }
        queue.settle(until);
        fired
    }

    #[test]
    fn one_shots_fire_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.after(secs(3), "c");
        queue.after(secs(1), "a");
        queue.after(secs(2), "b");
        assert_eq!(queue.next_deadline(), Some(secs(1)));

        assert_eq!(drain(&mut queue, secs(2)), vec!["a", "b"]);
        assert_eq!(queue.now(), secs(2));
        assert_eq!(drain(&mut queue, secs(10)), vec!["c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_creation_order() {
        let mut queue = TimerQueue::new();
        queue.after(secs(1), "first");
        queue.after(secs(1), "second");
        assert_eq!(drain(&mut queue, secs(1)), vec!["first", "second"]);
    }

    #[test]
    fn interval_rearms_until_cancelled() {
        let mut queue = TimerQueue::new();
        let tick = queue.every(secs(1), "tick");
        assert_eq!(drain(&mut queue, secs(3)), vec!["tick", "tick", "tick"]);
        assert!(queue.is_pending(tick));

        queue.cancel(tick);
        assert!(drain(&mut queue, secs(10)).is_empty());
        assert_eq!(queue.fired_total(), 3);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let handle = queue.after(secs(1), "never");
        queue.cancel(handle);
        queue.cancel(handle);
        assert_eq!(queue.cancelled_total(), 1);
        assert!(drain(&mut queue, secs(5)).is_empty());

        let fired = queue.after(secs(1), "once");
        assert_eq!(drain(&mut queue, secs(10)), vec!["once"]);
        queue.cancel(fired);
        assert_eq!(queue.cancelled_total(), 1);
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut queue = TimerQueue::new();
        queue.settle(secs(5));
        queue.after(secs(2), "late");
        assert!(drain(&mut queue, secs(6)).is_empty());
        assert_eq!(drain(&mut queue, secs(7)), vec!["late"]);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut queue = TimerQueue::new();
        queue.every(Duration::ZERO, "spin");
        assert_eq!(drain(&mut queue, Duration::from_millis(3)).len(), 3);
    }

    #[test]
    fn huge_delays_saturate_instead_of_overflowing() {
        let mut queue = TimerQueue::new();
        queue.settle(secs(5));
        let handle = queue.after(Duration::MAX, "never");
        assert_eq!(queue.next_deadline(), Some(Duration::MAX));
        assert!(drain(&mut queue, secs(3600)).is_empty());
        assert!(queue.is_pending(handle));
    }

    #[test]
    fn timer_set_cancels_everything_it_tracks() {
        let mut queue = TimerQueue::new();
        let mut set = TimerSet::new();
        set.track(queue.after(secs(1), "a"));
        set.track(queue.every(secs(1), "b"));
        queue.after(secs(1), "unowned");
        assert_eq!(set.len(), 2);

        set.cancel_all(&mut queue);
        assert!(set.is_empty());
        assert_eq!(drain(&mut queue, secs(2)), vec!["unowned"]);
    }
}
