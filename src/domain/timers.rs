// Explicit timer queue advanced by simulation time.

/// A payload due at a simulation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<T> {
    pub due: f64,
    pub payload: T,
}

/// Replaces fire-and-forget callbacks: entries only come due when the owner advances the
/// queue, so pausing the loop pauses every pending timer.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: f64,
    entries: Vec<Scheduled<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule_in(&mut self, delay_seconds: f64, payload: T) {
        self.entries.push(Scheduled {
            due: self.now + delay_seconds.max(0.0),
            payload,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scheduled<T>> {
        self.entries.iter()
    }

    /// Moves time forward and returns every payload that came due, earliest first.
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        self.now += dt.max(0.0);
        let now = self.now;

        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.due <= now {
                due.push(entry);
            } else {
                pending.push(entry);
            }
        }
        self.entries = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|e| e.payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_in(3.0, "late");
        queue.schedule_in(2.0, "early");
        queue.schedule_in(10.0, "pending");

        assert!(queue.advance(1.0).is_empty());
        assert_eq!(queue.advance(2.5), vec!["early", "late"]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn nothing_fires_without_advancing() {
        let mut queue = TimerQueue::new();
        queue.schedule_in(0.5, 1);
        // A paused loop simply stops calling advance.
        assert!(queue.advance(0.0).is_empty());
        assert_eq!(queue.advance(0.5), vec![1]);
    }
}
