//! View-readiness gate.
//!
//! A list must not render a view computed for inputs that are no longer
//! current. Each recompute request takes a generation from the gate; only
//! the most recently requested generation may publish (last requested
//! wins, regardless of which recompute finishes first).

use crate::generation::Generation;
use std::sync::Arc;
use tracing::debug;

/// What a list can render right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A recompute or the first page is pending
    NotReady,
    /// The view is current and has no records ("no results")
    Empty,
    /// The view is current and has records
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// A newer recompute was requested after this one
    Discarded,
}

#[derive(Debug, Clone)]
pub struct ReadinessGate<R> {
    requested: Generation,
    ready: bool,
    view: Arc<Vec<R>>,
}

impl<R> ReadinessGate<R> {
    pub fn new() -> Self {
        Self {
            requested: Generation::INITIAL,
            ready: false,
            view: Arc::new(Vec::new()),
        }
    }

    /// Request a recompute: readiness drops until this generation publishes.
    /// The previous view stays available while the new one is computed.
    pub fn begin(&mut self) -> Generation {
        self.requested = self.requested.next();
        self.ready = false;
        self.requested
    }

    /// Drop the view entirely, for a selector change.
    ///
    /// Also supersedes any recompute still running for the old selector.
    pub fn reset(&mut self) {
        self.requested = self.requested.next();
        self.ready = false;
        self.view = Arc::new(Vec::new());
    }

    pub fn publish(&mut self, generation: Generation, view: Arc<Vec<R>>) -> PublishOutcome {
        if generation != self.requested {
            debug!(
                publish = %generation,
                requested = %self.requested,
                "Discarding superseded view"
            );
            return PublishOutcome::Discarded;
        }
        self.view = view;
        self.ready = true;
        PublishOutcome::Published
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// True while a requested recompute has not published yet
    pub fn is_pending(&self) -> bool {
        !self.ready
    }

    pub fn readiness(&self) -> Readiness {
        match (self.ready, self.view.is_empty()) {
            (false, _) => Readiness::NotReady,
            (true, true) => Readiness::Empty,
            (true, false) => Readiness::Ready,
        }
    }

    pub fn view(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.view)
    }

    pub fn requested(&self) -> Generation {
        self.requested
    }
}

impl<R> Default for ReadinessGate<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_current_generation() {
        let mut gate = ReadinessGate::new();
        assert_eq!(gate.readiness(), Readiness::NotReady);

        let generation = gate.begin();
        assert_eq!(gate.publish(generation, Arc::new(vec![1, 2])), PublishOutcome::Published);

        assert!(gate.is_ready());
        assert_eq!(gate.readiness(), Readiness::Ready);
        assert_eq!(*gate.view(), vec![1, 2]);
    }

    #[test]
    fn test_late_publish_of_older_generation_is_discarded() {
        let mut gate = ReadinessGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert_eq!(gate.publish(second, Arc::new(vec![2])), PublishOutcome::Published);
        assert_eq!(gate.publish(first, Arc::new(vec![1])), PublishOutcome::Discarded);

        assert_eq!(*gate.view(), vec![2]);
        assert!(gate.is_ready());
    }

    #[test]
    fn test_older_generation_finishing_first_does_not_publish() {
        let mut gate = ReadinessGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert_eq!(gate.publish(first, Arc::new(vec![1])), PublishOutcome::Discarded);
        assert!(!gate.is_ready());

        gate.publish(second, Arc::new(vec![2]));
        assert_eq!(*gate.view(), vec![2]);
    }

    #[test]
    fn test_empty_view_is_distinct_from_not_ready() {
        let mut gate: ReadinessGate<u32> = ReadinessGate::new();
        let generation = gate.begin();
        gate.publish(generation, Arc::new(Vec::new()));
        assert_eq!(gate.readiness(), Readiness::Empty);
    }

    #[test]
    fn test_reset_clears_view_and_supersedes_running_recompute() {
        let mut gate = ReadinessGate::new();
        let generation = gate.begin();
        gate.publish(generation, Arc::new(vec![1]));

        let running = gate.begin();
        gate.reset();

        assert!(gate.view().is_empty());
        assert_eq!(gate.publish(running, Arc::new(vec![9])), PublishOutcome::Discarded);
        assert_eq!(gate.readiness(), Readiness::NotReady);
    }
}
