//! # List Controller
//!
//! Owns one paginated list view and reconciles everything that feeds it:
//! 1. Selector changes reset the list and request the first page
//! 2. Scroll-trigger edges request the next page
//! 3. Fetched pages are appended to the accumulated collection
//! 4. Filter and sort changes recompute the view from what is accumulated
//! 5. Recomputed views are published through the readiness gate
//!
//! The controller never awaits. Work that has to leave it (a page request,
//! a recompute) goes out as a ticket stamped with a generation and comes
//! back through [`ListController::complete`] or
//! [`ListController::finish_recompute`], where stale results are dropped.
//! Callers decide where tickets run: inline, or on a runtime as
//! [`crate::session::ListSession`] does.

use crate::accumulator::{Accumulator, AppendOutcome};
use crate::error::{ControllerError, Result};
use crate::generation::Generation;
use crate::readiness::{PublishOutcome, Readiness, ReadinessGate};
use crate::scroll::{Edge, VisibilitySensor};
use catalog::Record;
use pipeline::{FilterCriteria, FilterPipeline, SortMode};
use sources::{Cursor, FetchError, Page, PageFetcher, Selector};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// Tickets
// =============================================================================

/// A page request issued by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub cursor: Option<Cursor>,
    pub page_size: NonZeroUsize,
    pub selector: Selector,
}

impl FetchTicket {
    /// Execute the request against `fetcher`
    pub async fn run<R, F>(self, fetcher: &F) -> FetchOutcome<R>
    where
        F: PageFetcher<R> + ?Sized,
    {
        let result = fetcher
            .fetch_page(self.cursor, self.page_size, &self.selector)
            .await;
        FetchOutcome {
            ticket: self,
            result,
        }
    }
}

/// A finished page request, ready to hand back to the controller
#[derive(Debug, Clone)]
pub struct FetchOutcome<R> {
    pub ticket: FetchTicket,
    pub result: std::result::Result<Page<R>, FetchError>,
}

/// A filter + sort pass over a snapshot of the accumulated records
pub struct RecomputeTicket<R: Record> {
    pub generation: Generation,
    records: Arc<Vec<R>>,
    criteria: FilterCriteria,
    mode: SortMode,
    pipeline: Arc<FilterPipeline<R>>,
}

impl<R: Record> RecomputeTicket<R> {
    /// Derive the view. Pure and CPU-bound; safe to run on a blocking pool.
    pub fn run(self) -> RecomputedView<R> {
        let view = self
            .pipeline
            .derive_view(&self.records, &self.criteria, self.mode);
        RecomputedView {
            generation: self.generation,
            view,
        }
    }
}

impl<R: Record> fmt::Debug for RecomputeTicket<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecomputeTicket")
            .field("generation", &self.generation)
            .field("records", &self.records.len())
            .field("criteria", &self.criteria)
            .field("mode", &self.mode)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RecomputedView<R> {
    pub generation: Generation,
    pub view: Vec<R>,
}

/// What happened to a completed page request
#[derive(Debug)]
pub enum Completion<R: Record> {
    /// The page was appended; run the ticket to refresh the view.
    ///
    /// `follow_up` is the next page request when the sentinel is still
    /// in view after the append.
    Appended {
        added: usize,
        recompute: RecomputeTicket<R>,
        follow_up: Option<FetchTicket>,
    },
    /// The page belonged to an abandoned selector and was ignored
    StaleResultDiscarded,
}

/// [`Completion`] after the view has already been refreshed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageApplied {
    Appended {
        added: usize,
        follow_up: Option<FetchTicket>,
    },
    StaleResultDiscarded,
}

// =============================================================================
// State
// =============================================================================

/// Observable phase of the list.
///
/// Resetting and accumulating happen synchronously inside
/// [`ListController::set_selector`] and [`ListController::complete`], so
/// they are never observed between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Fetching,
    Recomputing,
    /// The last page request failed; the next trigger retries it
    Error,
}

/// Where paging stands for the current selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paging {
    First,
    Next(Cursor),
    Exhausted,
}

impl Paging {
    fn cursor(self) -> Option<Cursor> {
        match self {
            Paging::Next(cursor) => Some(cursor),
            Paging::First | Paging::Exhausted => None,
        }
    }
}

/// Everything a list needs to render, taken at one instant
#[derive(Debug, Clone)]
pub struct ViewSnapshot<R> {
    pub selector: Selector,
    pub generation: Generation,
    pub readiness: Readiness,
    /// Filtered and sorted records; empty until the first view publishes
    pub records: Arc<Vec<R>>,
    /// Records fetched so far, before filtering
    pub accumulated: usize,
    pub has_next_page: bool,
    pub state: ListState,
    pub sort_mode: SortMode,
    pub last_error: Option<FetchError>,
}

impl<R> ViewSnapshot<R> {
    pub fn is_ready(&self) -> bool {
        self.readiness != Readiness::NotReady
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct ListController<R: Record> {
    selector: Selector,
    criteria: FilterCriteria,
    mode: SortMode,
    page_size: NonZeroUsize,
    pipeline: Arc<FilterPipeline<R>>,

    /// Current selector generation
    generation: Generation,
    accumulator: Accumulator<R>,
    gate: ReadinessGate<R>,
    sensor: VisibilitySensor,
    paging: Paging,

    /// Generation of the page request in flight, if any
    in_flight: Option<Generation>,
    last_error: Option<FetchError>,
}

impl<R: Record> ListController<R> {
    /// Create a controller for the "all" selector.
    ///
    /// Nothing is fetched until [`ListController::set_selector`] is called
    /// (a [`crate::session::ListSession`] calls it on start).
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            selector: Selector::all(),
            criteria: FilterCriteria::new(),
            mode: SortMode::default(),
            page_size,
            pipeline: Arc::new(FilterPipeline::standard()),
            generation: Generation::INITIAL,
            accumulator: Accumulator::new(),
            gate: ReadinessGate::new(),
            sensor: VisibilitySensor::new(),
            paging: Paging::First,
            in_flight: None,
            last_error: None,
        }
    }

    /// Start on `selector` instead of the "all" tab
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Use a custom filter pipeline instead of the standard one
    pub fn with_pipeline(mut self, pipeline: Arc<FilterPipeline<R>>) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.mode = mode;
        self
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Switch to `selector` and request its first page.
    ///
    /// The accumulated records, the view and the cursor are cleared before
    /// this returns, so nothing from the previous selector can show up
    /// afterwards. Calling it with the current selector reloads the list.
    #[instrument(skip(self), fields(kind = R::KIND))]
    pub fn set_selector(&mut self, selector: Selector) -> FetchTicket {
        self.generation = self.generation.next();
        info!(generation = %self.generation, "Resetting list for {}", selector);

        self.selector = selector;
        self.accumulator.reset(self.generation);
        self.gate.reset();
        self.paging = Paging::First;
        self.last_error = None;

        self.issue(None)
    }

    /// Request the next page if one exists and none is in flight
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            debug!("Next page not requested: a fetch is already in flight");
            return None;
        }
        if self.paging == Paging::Exhausted {
            debug!("Next page not requested: end of stream");
            return None;
        }
        Some(self.issue(self.paging.cursor()))
    }

    /// Feed a settled sentinel visibility report.
    ///
    /// Only an entry edge can produce a request, and only under the same
    /// guards as [`ListController::request_next_page`]. An entry that lands
    /// while a fetch is in flight is not lost: the sensor keeps the level,
    /// and [`ListController::complete`] continues from it.
    pub fn on_visibility(&mut self, visible: bool) -> Option<FetchTicket> {
        match self.sensor.observe(visible) {
            Some(Edge::Entered) => self.request_next_page(),
            Some(Edge::Exited) | None => None,
        }
    }

    fn issue(&mut self, cursor: Option<Cursor>) -> FetchTicket {
        self.in_flight = Some(self.generation);
        self.last_error = None;
        debug!(generation = %self.generation, ?cursor, "Issuing page request");
        FetchTicket {
            generation: self.generation,
            cursor,
            page_size: self.page_size,
            selector: self.selector.clone(),
        }
    }

    /// Take back a finished page request.
    ///
    /// Results for an abandoned selector are dropped without touching any
    /// state. A failure leaves the cursor and the accumulated records as
    /// they were and is returned as [`ControllerError::FetchFailed`]; it is
    /// not retried until the next trigger.
    #[instrument(
        skip(self, outcome),
        fields(kind = R::KIND, generation = %outcome.ticket.generation)
    )]
    pub fn complete(&mut self, outcome: FetchOutcome<R>) -> Result<Completion<R>> {
        let FetchOutcome { ticket, result } = outcome;
        if ticket.generation != self.generation {
            debug!("Ignoring page for abandoned selector {}", ticket.selector);
            return Ok(Completion::StaleResultDiscarded);
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(source) => {
                warn!("Page request at cursor {:?} failed: {}", ticket.cursor, source);
                self.last_error = Some(source.clone());
                return Err(ControllerError::FetchFailed {
                    cursor: ticket.cursor,
                    source,
                });
            }
        };

        self.paging = match page.next_cursor {
            Some(cursor) => Paging::Next(cursor),
            None => Paging::Exhausted,
        };

        match self.accumulator.append(ticket.generation, page) {
            AppendOutcome::Appended { added, total } => {
                debug!(added, total, "Appended page");
                let recompute = self.begin_recompute();
                Ok(Completion::Appended {
                    added,
                    recompute,
                    follow_up: self.continue_if_visible(),
                })
            }
            AppendOutcome::Stale => Ok(Completion::StaleResultDiscarded),
        }
    }

    fn continue_if_visible(&mut self) -> Option<FetchTicket> {
        if !self.sensor.is_visible() {
            return None;
        }
        debug!("Sentinel still visible; requesting the next page");
        self.request_next_page()
    }

    // -------------------------------------------------------------------------
    // Derived view
    // -------------------------------------------------------------------------

    /// Replace the filter criteria.
    ///
    /// Returns a recompute ticket when the view has to change. Before the
    /// first page arrives there is nothing to recompute; the new criteria
    /// apply when it does.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> Option<RecomputeTicket<R>> {
        if criteria == self.criteria {
            return None;
        }
        self.criteria = criteria;
        self.recompute_if_loaded()
    }

    /// Replace the sort mode; see [`ListController::set_criteria`]
    pub fn set_sort_mode(&mut self, mode: SortMode) -> Option<RecomputeTicket<R>> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        self.recompute_if_loaded()
    }

    fn recompute_if_loaded(&mut self) -> Option<RecomputeTicket<R>> {
        if self.accumulator.pages() == 0 {
            return None;
        }
        Some(self.begin_recompute())
    }

    /// Start a recompute over the current records, criteria and mode.
    /// Readiness drops until the ticket's result is published.
    pub fn begin_recompute(&mut self) -> RecomputeTicket<R> {
        RecomputeTicket {
            generation: self.gate.begin(),
            records: self.accumulator.shared(),
            criteria: self.criteria.clone(),
            mode: self.mode,
            pipeline: Arc::clone(&self.pipeline),
        }
    }

    /// Publish a recomputed view unless a newer recompute was requested
    pub fn finish_recompute(&mut self, done: RecomputedView<R>) -> PublishOutcome {
        let len = done.view.len();
        let outcome = self.gate.publish(done.generation, Arc::new(done.view));
        if outcome == PublishOutcome::Published {
            debug!(records = len, "Published view");
        }
        outcome
    }

    /// Run a recompute ticket inline and publish its result
    pub fn recompute_now(&mut self, ticket: RecomputeTicket<R>) -> PublishOutcome {
        let done = ticket.run();
        self.finish_recompute(done)
    }

    /// Request, fetch, append and publish the next page in one step.
    ///
    /// Keeps going while the sentinel stays visible after an append.
    /// Returns `Ok(false)` when no request was issued (end of stream or a
    /// fetch already in flight).
    pub async fn load_next<F>(&mut self, fetcher: &F) -> Result<bool>
    where
        F: PageFetcher<R> + ?Sized,
    {
        let Some(mut ticket) = self.request_next_page() else {
            return Ok(false);
        };
        loop {
            let outcome = ticket.run(fetcher).await;
            match self.apply(outcome)? {
                PageApplied::Appended {
                    follow_up: Some(next),
                    ..
                } => ticket = next,
                PageApplied::Appended { follow_up: None, .. }
                | PageApplied::StaleResultDiscarded => return Ok(true),
            }
        }
    }

    /// [`ListController::complete`] followed by an inline recompute
    pub fn apply(&mut self, outcome: FetchOutcome<R>) -> Result<PageApplied> {
        match self.complete(outcome)? {
            Completion::Appended {
                added,
                recompute,
                follow_up,
            } => {
                self.recompute_now(recompute);
                Ok(PageApplied::Appended { added, follow_up })
            }
            Completion::StaleResultDiscarded => Ok(PageApplied::StaleResultDiscarded),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> ListState {
        if self.in_flight.is_some() {
            ListState::Fetching
        } else if self.last_error.is_some() {
            ListState::Error
        } else if self.accumulator.pages() > 0 && self.gate.is_pending() {
            ListState::Recomputing
        } else {
            ListState::Idle
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_mode(&self) -> SortMode {
        self.mode
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn has_next_page(&self) -> bool {
        self.paging != Paging::Exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Every record fetched for the current selector, in fetch order
    pub fn accumulated(&self) -> &[R] {
        self.accumulator.records()
    }

    pub fn readiness(&self) -> Readiness {
        self.gate.readiness()
    }

    pub fn view(&self) -> Arc<Vec<R>> {
        self.gate.view()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> ViewSnapshot<R> {
        ViewSnapshot {
            selector: self.selector.clone(),
            generation: self.generation,
            readiness: self.gate.readiness(),
            records: self.gate.view(),
            accumulated: self.accumulator.len(),
            has_next_page: self.has_next_page(),
            state: self.state(),
            sort_mode: self.mode,
            last_error: self.last_error.clone(),
        }
    }
}
