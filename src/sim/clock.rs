use chrono::{DateTime, TimeDelta, Utc};

/// A simulation clock that hands out tick indices and simulated timestamps.
///
/// Tick `n` fires one interval after tick `n - 1`, so the first tick is
/// stamped `start + interval`. A bounded clock stops after `total` ticks;
/// an unbounded one runs until its owner stops asking. Either stops early
/// once the next timestamp would leave chrono's range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use p2p_energy_sim::sim::clock::SimClock;
///
/// let start = Utc::now();
/// let mut clock = SimClock::bounded(start, TimeDelta::seconds(3), 2);
/// assert_eq!(clock.tick(), Some((0, start + TimeDelta::seconds(3))));
/// assert_eq!(clock.tick(), Some((1, start + TimeDelta::seconds(6))));
/// assert_eq!(clock.tick(), None);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    start: DateTime<Utc>,
    interval: TimeDelta,
    /// Number of ticks already handed out
    current: usize,
    total: Option<usize>,
}

impl SimClock {
    /// Creates a clock that stops after `total` ticks.
    pub fn bounded(start: DateTime<Utc>, interval: TimeDelta, total: usize) -> Self {
        Self {
            start,
            interval,
            current: 0,
            total: Some(total),
        }
    }

    /// Creates a clock that never finishes.
    pub fn unbounded(start: DateTime<Utc>, interval: TimeDelta) -> Self {
        Self {
            start,
            interval,
            current: 0,
            total: None,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some((index, timestamp))` for the tick just taken
    /// * `None` once a bounded clock is exhausted or time would overflow
    pub fn tick(&mut self) -> Option<(usize, DateTime<Utc>)> {
        if self.is_finished() {
            return None;
        }
        let at = self.at(self.current + 1)?;
        let index = self.current;
        self.current += 1;
        Some((index, at))
    }

    /// Simulated time of the most recent tick (or the start time before any).
    pub fn now(&self) -> DateTime<Utc> {
        self.at(self.current).unwrap_or(self.start)
    }

    fn at(&self, ticks: usize) -> Option<DateTime<Utc>> {
        let ticks = i32::try_from(ticks).ok()?;
        self.interval
            .checked_mul(ticks)
            .and_then(|offset| self.start.checked_add_signed(offset))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// Ticks taken so far.
    pub fn elapsed_ticks(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.total.is_some_and(|t| self.current >= t)
    }
}
