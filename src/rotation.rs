//! Card rotation: which catalog index to show on each tick.

use std::num::NonZeroUsize;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ConfigError;
use crate::settings::{self, Settings};

/// Holds each card for `repeat_target` ticks, then moves to a different
/// card chosen uniformly at random.
///
/// Rules:
/// - `start` picks the first card; that display counts as its first repeat.
/// - `tick` holds the current card until it has been shown `repeat_target`
///   times, then draws until it gets a different index (a one-card catalog
///   keeps index 0).
/// - `replay` never changes state.
/// - Interval and repeat target changes are validated and only affect
///   future ticks.
#[derive(Debug)]
pub struct RotationScheduler<R = StdRng> {
    len: usize,
    current: Option<usize>,
    repeat_target: u32,
    repeat_elapsed: u32,
    interval: Duration,
    rng: R,
}

impl RotationScheduler<StdRng> {
    /// Build a scheduler from validated settings, seeding from the OS unless `seed` is given.
    pub fn from_settings(settings: &Settings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(settings.interval(), settings.repeat_count.max(1), rng)
    }
}

impl<R: Rng> RotationScheduler<R> {
    pub fn with_rng(interval: Duration, repeat_target: u32, rng: R) -> Self {
        Self {
            len: 0,
            current: None,
            repeat_target: repeat_target.max(1),
            repeat_elapsed: 0,
            interval,
            rng,
        }
    }

    /// Enter the active state with a random first card and return its index.
    pub fn start(&mut self, len: NonZeroUsize) -> usize {
        self.len = len.get();
        let index = self.rng.random_range(0..self.len);
        self.current = Some(index);
        self.repeat_elapsed = 1;
        debug!(index, len = self.len, "rotation started");
        index
    }

    /// Restart against a freshly loaded catalog.
    pub fn restart(&mut self, len: NonZeroUsize) -> usize {
        self.start(len)
    }

    /// Advance one tick and return the index to render. `None` before `start`.
    pub fn tick(&mut self) -> Option<usize> {
        let current = self.current?;
        let next = if self.repeat_elapsed >= self.repeat_target {
            self.repeat_elapsed = 0;
            self.pick_other(current)
        } else {
            current
        };
        self.repeat_elapsed += 1;
        self.current = Some(next);
        debug!(
            index = next,
            repeat = self.repeat_elapsed,
            target = self.repeat_target,
            "tick"
        );
        Some(next)
    }

    fn pick_other(&mut self, current: usize) -> usize {
        if self.len <= 1 {
            return current;
        }
        loop {
            let candidate = self.rng.random_range(0..self.len);
            if candidate != current {
                return candidate;
            }
        }
    }

    /// Index to render again; state is untouched.
    pub fn replay(&self) -> Option<usize> {
        self.current
    }

    pub fn set_interval(&mut self, ms: u64) -> Result<(), ConfigError> {
        settings::validate_display_time(ms)?;
        self.interval = Duration::from_millis(ms);
        Ok(())
    }

    pub fn set_repeat_target(&mut self, n: u32) -> Result<(), ConfigError> {
        settings::validate_repeat_count(n)?;
        self.repeat_target = n;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn repeat_elapsed(&self) -> u32 {
        self.repeat_elapsed
    }

    pub fn repeat_target(&self) -> u32 {
        self.repeat_target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(repeat: u32, seed: u64) -> RotationScheduler<StdRng> {
        RotationScheduler::with_rng(
            Duration::from_millis(1000),
            repeat,
            StdRng::seed_from_u64(seed),
        )
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut s = scheduler(1, 1);
        assert_eq!(s.tick(), None);
        assert_eq!(s.replay(), None);
        assert!(!s.is_active());
    }

    #[test]
    fn start_picks_index_in_range() {
        for seed in 0..32 {
            let mut s = scheduler(1, seed);
            let idx = s.start(nz(5));
            assert!(idx < 5);
            assert_eq!(s.current(), Some(idx));
        }
    }

    #[test]
    fn boundary_ticks_always_change_index() {
        for seed in 0..16 {
            let mut s = scheduler(1, seed);
            let mut prev = s.start(nz(4));
            for _ in 0..200 {
                let next = s.tick().unwrap();
                assert_ne!(next, prev);
                prev = next;
            }
        }
    }

    #[test]
    fn single_card_catalog_holds_index_zero() {
        let mut s = scheduler(1, 9);
        assert_eq!(s.start(nz(1)), 0);
        for _ in 0..50 {
            assert_eq!(s.tick(), Some(0));
        }
    }

    #[test]
    fn repeat_elapsed_counts_then_resets_on_new_index() {
        let mut s = scheduler(3, 4);
        let first = s.start(nz(6));
        assert_eq!(s.repeat_elapsed(), 1);
        assert_eq!(s.tick(), Some(first));
        assert_eq!(s.repeat_elapsed(), 2);
        assert_eq!(s.tick(), Some(first));
        assert_eq!(s.repeat_elapsed(), 3);
        let next = s.tick().unwrap();
        assert_ne!(next, first);
        assert_eq!(s.repeat_elapsed(), 1);
    }

    #[test]
    fn two_cards_alternate_in_pairs() {
        let mut s = scheduler(2, 11);
        let a = s.start(nz(2));
        let b = 1 - a;
        let mut shown = vec![a];
        for _ in 0..7 {
            shown.push(s.tick().unwrap());
        }
        assert_eq!(shown, vec![a, a, b, b, a, a, b, b]);
    }

    #[test]
    fn replay_is_pure() {
        let mut s = scheduler(2, 5);
        s.start(nz(3));
        s.tick();
        let (cur, elapsed) = (s.current(), s.repeat_elapsed());
        for _ in 0..5 {
            assert_eq!(s.replay(), cur);
        }
        assert_eq!(s.current(), cur);
        assert_eq!(s.repeat_elapsed(), elapsed);
    }

    #[test]
    fn interval_outside_range_is_rejected() {
        let mut s = scheduler(1, 0);
        assert!(s.set_interval(999).is_err());
        assert!(s.set_interval(10_001).is_err());
        assert_eq!(s.interval(), Duration::from_millis(1000));
        s.set_interval(10_000).unwrap();
        assert_eq!(s.interval(), Duration::from_millis(10_000));
    }

    #[test]
    fn repeat_target_change_keeps_elapsed() {
        let mut s = scheduler(5, 2);
        let first = s.start(nz(4));
        s.tick();
        assert_eq!(s.repeat_elapsed(), 2);
        assert!(s.set_repeat_target(0).is_err());
        s.set_repeat_target(2).unwrap();
        assert_eq!(s.repeat_elapsed(), 2);
        assert_ne!(s.tick().unwrap(), first);
    }

    #[test]
    fn restart_resets_rotation() {
        let mut s = scheduler(3, 8);
        s.start(nz(4));
        s.tick();
        let idx = s.restart(nz(2));
        assert!(idx < 2);
        assert_eq!(s.repeat_elapsed(), 1);
        assert_eq!(s.len(), 2);
    }
}
