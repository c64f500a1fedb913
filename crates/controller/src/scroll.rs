//! Scroll-trigger sensing.
//!
//! The list reports whether its bottom sentinel is visible. Reports are
//! level-triggered (the same value may arrive many times); the sensor turns
//! them into enter/exit edges so a next-page request fires once per entry.
//! The sensor also remembers the last level, so the controller can keep
//! paging after an append while the sentinel has not left the viewport.
//! A debouncer holds reports back until they have been stable for a short
//! delay, so nothing fires while the list layout is still settling.

use std::time::Duration;
use tokio::time::Instant;

/// A change in sentinel visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Entered,
    Exited,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilitySensor {
    visible: bool,
}

impl VisibilitySensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation; returns the edge it represents, if any
    pub fn observe(&mut self, visible: bool) -> Option<Edge> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(if visible { Edge::Entered } else { Edge::Exited })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Holds the latest value until no newer one arrived for `delay`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value settles, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending value if it has settled by `now`
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending value
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_observations_fire_once() {
        let mut sensor = VisibilitySensor::new();
        assert_eq!(sensor.observe(true), Some(Edge::Entered));
        assert_eq!(sensor.observe(true), None);
        assert_eq!(sensor.observe(true), None);
        assert_eq!(sensor.observe(false), Some(Edge::Exited));
        assert_eq!(sensor.observe(false), None);
        assert_eq!(sensor.observe(true), Some(Edge::Entered));
    }

    #[test]
    fn test_last_level_is_remembered() {
        let mut sensor = VisibilitySensor::new();
        assert!(!sensor.is_visible());
        sensor.observe(true);
        assert!(sensor.is_visible());
        // repeats don't fire but the level stays
        assert_eq!(sensor.observe(true), None);
        assert!(sensor.is_visible());
        sensor.observe(false);
        assert!(!sensor.is_visible());
    }

    #[test]
    fn test_debouncer_keeps_latest_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        debouncer.push(true, start);
        debouncer.push(false, start + Duration::from_millis(30));

        assert_eq!(debouncer.take_ready(start + Duration::from_millis(60)), None);
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(80)));
        assert_eq!(debouncer.take_ready(start + Duration::from_millis(80)), Some(false));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_debouncer_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.push(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.take_ready(start + Duration::from_secs(1)), None);
    }
}
