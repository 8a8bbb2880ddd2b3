//! Schedulable tasks with cancellation tokens
//!
//! The scheduler never runs anything itself. The owner polls [`Scheduler::due`]
//! with the current time and dispatches whatever comes back, which keeps all
//! state changes on the owner's single thread of control.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

/// Opaque handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    due: DateTime<Utc>,
    every: Option<Duration>,
    task: T,
}

/// One firing of a scheduled task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub token: TimerToken,
    /// Instant the task was scheduled for (may be earlier than the poll time)
    pub at: DateTime<Utc>,
    pub task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    next_token: u64,
    timers: BTreeMap<TimerToken, Timer<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_token: 1,
            timers: BTreeMap::new(),
        }
    }

    /// Runs `task` once, `delay` after `now`
    pub fn schedule_once(&mut self, now: DateTime<Utc>, delay: Duration, task: T) -> TimerToken {
        self.insert(Timer {
            due: now + delay,
            every: None,
            task,
        })
    }

    /// Runs `task` every `every`, first at `now + every`.
    ///
    /// Periods shorter than one millisecond are raised to one millisecond.
    pub fn schedule_repeating(&mut self, now: DateTime<Utc>, every: Duration, task: T) -> TimerToken {
        let every = every.max(Duration::milliseconds(1));
        self.insert(Timer {
            due: now + every,
            every: Some(every),
            task,
        })
    }

    fn insert(&mut self, timer: Timer<T>) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timers.insert(token, timer);
        token
    }

    /// Returns true if the token was still pending
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.timers.remove(&token).is_some()
    }

    /// Cancels everything, returning how many timers were pending
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.timers.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Collects every firing due at or before `now`, oldest first.
    ///
    /// A repeating timer that fell behind yields one firing per missed period.
    /// One-shot timers are removed once collected.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<Fired<T>> {
        let mut fired = Vec::new();
        let mut finished = Vec::new();

        for (token, timer) in self.timers.iter_mut() {
            while timer.due <= now {
                fired.push(Fired {
                    token: *token,
                    at: timer.due,
                    task: timer.task.clone(),
                });
                match timer.every {
                    Some(every) => timer.due = timer.due + every,
                    None => {
                        finished.push(*token);
                        break;
                    }
                }
            }
        }

        for token in finished {
            self.timers.remove(&token);
        }

        fired.sort_by(|a, b| a.at.cmp(&b.at).then(a.token.cmp(&b.token)));
        fired
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Job {
        Beat,
        Off,
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn once_fires_once_then_clears() {
        let mut sched = Scheduler::new();
        let token = sched.schedule_once(at(0), Duration::seconds(5), Job::Off);

        assert!(sched.due(at(4)).is_empty());
        let fired = sched.due(at(5));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].token, token);
        assert_eq!(fired[0].at, at(5));
        assert!(!sched.is_pending(token));
        assert!(sched.due(at(100)).is_empty());
    }

    #[test]
    fn repeating_catches_up_missed_periods() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(at(0), Duration::seconds(5), Job::Beat);

        let fired = sched.due(at(12));
        let times: Vec<_> = fired.iter().map(|f| f.at).collect();
        assert_eq!(times, vec![at(5), at(10)]);
        assert_eq!(sched.next_due(), Some(at(15)));
    }

    #[test]
    fn firings_are_ordered_by_time() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(at(0), Duration::seconds(5), Job::Beat);
        sched.schedule_once(at(0), Duration::seconds(3), Job::Off);

        let jobs: Vec<_> = sched.due(at(6)).into_iter().map(|f| f.task).collect();
        assert_eq!(jobs, vec![Job::Off, Job::Beat]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut sched = Scheduler::new();
        let token = sched.schedule_once(at(0), Duration::seconds(1), Job::Off);

        assert!(sched.cancel(token));
        assert!(!sched.cancel(token));
        assert!(sched.due(at(10)).is_empty());
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut sched = Scheduler::new();
        sched.schedule_once(at(0), Duration::seconds(1), Job::Off);
        sched.schedule_repeating(at(0), Duration::seconds(1), Job::Beat);

        assert_eq!(sched.cancel_all(), 2);
        assert!(sched.is_empty());
        assert!(sched.due(at(10)).is_empty());
    }

    #[test]
    fn tokens_are_unique() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_once(at(0), Duration::seconds(1), Job::Off);
        let b = sched.schedule_once(at(0), Duration::seconds(1), Job::Off);
        assert_ne!(a, b);
    }
}
