use std::time::{Duration, Instant};

/// A cancellable fixed-period schedule, polled from the main loop.
///
/// There is at most one schedule per `Ticker`: starting again replaces the
/// previous one, and `stop` on a stopped ticker does nothing.
#[derive(Debug, Default)]
pub struct Ticker {
    schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Copy)]
struct Schedule {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin firing every `period`, first at `now + period`.
    pub fn start(&mut self, period: Duration, now: Instant) {
        self.stop();
        self.schedule = Some(Schedule { period, next: now + period });
    }

    pub fn stop(&mut self) {
        self.schedule = None;
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Consumes one due tick, if any. A loop that fell behind catches up one
    /// tick per call rather than bursting.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(schedule) = self.schedule.as_mut() else {
            return false;
        };
        if now < schedule.next {
            return false;
        }

        schedule.next += schedule.period;
        // more than a full period behind, drop the backlog
        if schedule.next + schedule.period <= now {
            schedule.next = now + schedule.period;
        }
        true
    }

    /// How long the caller may sleep before the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.schedule.map(|s| s.next.saturating_duration_since(now))
    }
}
