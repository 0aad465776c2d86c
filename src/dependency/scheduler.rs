use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Shortest interval a repeating timer may use; keeps a zero interval from
/// firing forever inside one `pop_due` drain.
const MIN_REPEAT_INTERVAL_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Cooperative timer service consumed by the simulation.
///
/// Nothing fires on its own: the owner drains due events with `pop_due`
/// and handles each one to completion before asking for the next, so
/// handlers may schedule or cancel timers freely.
pub trait Scheduler<E> {
    fn now_ms(&self) -> f64;

    fn schedule_once(&mut self, delay_ms: f64, event: E) -> TimerHandle;

    /// Fire `event` every `interval_ms`, the first time one interval from now.
    /// `repeats` caps the number of firings; `None` repeats until cancelled.
    fn schedule_repeating(&mut self, interval_ms: f64, repeats: Option<u32>, event: E)
        -> TimerHandle;

    /// Returns false if the timer already fired for the last time or was
    /// cancelled before.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn is_pending(&self, handle: TimerHandle) -> bool;

    /// Drop every pending timer, repeating ones included.
    fn cancel_all(&mut self);

    /// Pop the earliest event due at or before `until_ms`, moving the clock to
    /// its due time. Ties fire in scheduling order.
    fn pop_due(&mut self, until_ms: f64) -> Option<E>;

    /// Move the clock to `until_ms`. Call after draining `pop_due`.
    fn advance_to(&mut self, until_ms: f64);
}

struct Timer<E> {
    event: E,
    interval_ms: f64,
    remaining: Option<u32>,
    due_ms: f64,
}

#[derive(Clone, Copy)]
struct QueueEntry {
    due_ms: f64,
    seq: u64,
    id: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest entry on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Virtual-clock `Scheduler` driven by the host frame loop.
pub struct TimerQueue<E> {
    now_ms: f64,
    next_id: u64,
    next_seq: u64,
    timers: HashMap<u64, Timer<E>>,
    heap: BinaryHeap<QueueEntry>,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            next_seq: 0,
            timers: HashMap::new(),
            heap: BinaryHeap::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.heap.clear();
    }

    fn insert(&mut self, timer: Timer<E>) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due_ms = timer.due_ms;
        self.timers.insert(id, timer);
        self.enqueue(id, due_ms);
        TimerHandle(id)
    }

    fn enqueue(&mut self, id: u64, due_ms: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry { due_ms, seq, id });
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> for TimerQueue<E> {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn schedule_once(&mut self, delay_ms: f64, event: E) -> TimerHandle {
        self.insert(Timer {
            event,
            interval_ms: 0.0,
            remaining: Some(1),
            due_ms: self.now_ms + delay_ms.max(0.0),
        })
    }

    fn schedule_repeating(
        &mut self,
        interval_ms: f64,
        repeats: Option<u32>,
        event: E,
    ) -> TimerHandle {
        let interval_ms = interval_ms.max(MIN_REPEAT_INTERVAL_MS);
        if repeats == Some(0) {
            // Nothing to fire; hand back a handle that is never pending.
            let id = self.next_id;
            self.next_id += 1;
            return TimerHandle(id);
        }
        self.insert(Timer {
            event,
            interval_ms,
            remaining: repeats,
            due_ms: self.now_ms + interval_ms,
        })
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        // Heap entries of cancelled timers are skipped lazily in pop_due.
        self.timers.remove(&handle.0).is_some()
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle.0)
    }

    fn cancel_all(&mut self) {
        self.clear();
    }

    fn pop_due(&mut self, until_ms: f64) -> Option<E> {
        while let Some(entry) = self.heap.peek().copied() {
            if entry.due_ms > until_ms {
                return None;
            }
            self.heap.pop();

            let Some(timer) = self.timers.get_mut(&entry.id) else {
                continue;
            };
            self.now_ms = self.now_ms.max(entry.due_ms);
            let event = timer.event.clone();

            let fires_again = match timer.remaining {
                None => true,
                Some(left) => {
                    timer.remaining = Some(left.saturating_sub(1));
                    left > 1
                }
            };
            if fires_again {
                timer.due_ms += timer.interval_ms;
                let due_ms = timer.due_ms;
                self.enqueue(entry.id, due_ms);
            } else {
                self.timers.remove(&entry.id);
            }
            return Some(event);
        }
        None
    }

    fn advance_to(&mut self, until_ms: f64) {
        if until_ms > self.now_ms {
            self.now_ms = until_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue<&'static str>, until: f64) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(event) = queue.pop_due(until) {
            fired.push(event);
        }
        queue.advance_to(until);
        fired
    }

    #[test]
    fn one_shot_fires_once_at_due_time() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(100.0, "ping");
        assert!(drain(&mut queue, 99.0).is_empty());
        assert_eq!(drain(&mut queue, 100.0), vec!["ping"]);
        assert!(drain(&mut queue, 500.0).is_empty());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn repeating_timer_honours_repeat_count() {
        let mut queue = TimerQueue::new();
        queue.schedule_repeating(100.0, Some(3), "shot");
        assert_eq!(drain(&mut queue, 1000.0), vec!["shot", "shot", "shot"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn zero_repeats_schedules_nothing() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule_repeating(100.0, Some(0), "never");
        assert!(!queue.is_pending(handle));
        assert!(drain(&mut queue, 1000.0).is_empty());
    }

    #[test]
    fn unbounded_repeat_runs_until_cancelled() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule_repeating(250.0, None, "spin");
        assert_eq!(drain(&mut queue, 1000.0).len(), 4);
        assert!(queue.cancel(handle));
        assert!(drain(&mut queue, 5000.0).is_empty());
        assert!(!queue.cancel(handle));
    }

    #[test]
    fn cancel_all_drops_repeating_and_one_shot_timers() {
        let mut queue = TimerQueue::new();
        let burst = queue.schedule_repeating(100.0, Some(5), "shot");
        queue.schedule_once(50.0, "settle");
        queue.cancel_all();
        assert!(!queue.is_pending(burst));
        assert_eq!(queue.pending(), 0);
        assert!(drain(&mut queue, 10_000.0).is_empty());
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(50.0, "first");
        queue.schedule_once(50.0, "second");
        queue.schedule_once(10.0, "earliest");
        assert_eq!(drain(&mut queue, 50.0), vec!["earliest", "first", "second"]);
    }

    #[test]
    fn clock_tracks_fired_events_and_advances() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(40.0, "a");
        assert_eq!(queue.pop_due(100.0), Some("a"));
        assert_eq!(queue.now_ms(), 40.0);
        queue.advance_to(100.0);
        assert_eq!(queue.now_ms(), 100.0);
        queue.schedule_once(10.0, "b");
        assert!(queue.pop_due(105.0).is_none());
        assert_eq!(queue.pop_due(110.0), Some("b"));
    }
}
