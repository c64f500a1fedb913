//! # List Session
//!
//! Runs a [`ListController`] on the tokio runtime:
//! - page requests run as tasks and report back when they finish
//! - recomputes run on the blocking pool
//! - sentinel visibility reports are debounced before they reach the
//!   controller
//! - a fresh [`ViewSnapshot`] is published after every step
//!
//! All controller mutation happens on the session task, one step at a
//! time; the only suspension points are waiting for the next command,
//! task result or debounce deadline.

use crate::controller::{
    Completion, FetchOutcome, FetchTicket, ListController, RecomputeTicket, RecomputedView,
    ViewSnapshot,
};
use crate::error::{ControllerError, Result};
use crate::scroll::Debouncer;
use catalog::Record;
use pipeline::{FilterCriteria, SortMode};
use sources::{FetchError, PageFetcher, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 64;

/// Input to a running session
#[derive(Debug, Clone, PartialEq)]
pub enum ListCommand {
    SetSelector(Selector),
    SetCriteria(FilterCriteria),
    SetSortMode(SortMode),
    /// Raw sentinel visibility report
    Visibility(bool),
    /// Request the next page directly, e.g. from a retry button
    LoadNext,
}

/// Handle to a list controller running on its own task
pub struct ListSession<R: Record> {
    commands: mpsc::Sender<ListCommand>,
    snapshots: watch::Receiver<ViewSnapshot<R>>,
    driver: JoinHandle<()>,
}

impl<R: Record> ListSession<R> {
    /// Start the session and request the first page for the controller's
    /// current selector.
    pub fn spawn<F>(controller: ListController<R>, fetcher: Arc<F>, debounce: Duration) -> Self
    where
        F: PageFetcher<R> + ?Sized + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        let driver = Driver {
            controller,
            fetcher,
            debouncer: Debouncer::new(debounce),
            fetches: JoinSet::new(),
            recomputes: JoinSet::new(),
            snapshots: snapshot_tx,
        };
        let driver = tokio::spawn(driver.run(command_rx));

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            driver,
        }
    }

    pub async fn send(&self, command: ListCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControllerError::SessionClosed)
    }

    pub async fn set_selector(&self, selector: Selector) -> Result<()> {
        self.send(ListCommand::SetSelector(selector)).await
    }

    pub async fn set_criteria(&self, criteria: FilterCriteria) -> Result<()> {
        self.send(ListCommand::SetCriteria(criteria)).await
    }

    pub async fn set_sort_mode(&self, mode: SortMode) -> Result<()> {
        self.send(ListCommand::SetSortMode(mode)).await
    }

    pub async fn report_visibility(&self, visible: bool) -> Result<()> {
        self.send(ListCommand::Visibility(visible)).await
    }

    pub async fn load_next(&self) -> Result<()> {
        self.send(ListCommand::LoadNext).await
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> ViewSnapshot<R> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot<R>> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&ViewSnapshot<R>) -> bool,
    ) -> Result<ViewSnapshot<R>> {
        let snapshot = self
            .snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| ControllerError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Stop accepting commands and wait for the session task to finish.
    /// Requests still in flight are dropped.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        use anyhow::Context;

        drop(self.commands);
        self.driver.await.context("List session task panicked")
    }
}

struct Driver<R: Record, F: ?Sized> {
    controller: ListController<R>,
    fetcher: Arc<F>,
    debouncer: Debouncer<bool>,
    fetches: JoinSet<FetchOutcome<R>>,
    recomputes: JoinSet<RecomputedView<R>>,
    snapshots: watch::Sender<ViewSnapshot<R>>,
}

impl<R, F> Driver<R, F>
where
    R: Record,
    F: PageFetcher<R> + ?Sized + 'static,
{
    async fn run(mut self, mut commands: mpsc::Receiver<ListCommand>) {
        let selector = self.controller.selector().clone();
        let ticket = self.controller.set_selector(selector);
        self.spawn_fetch(ticket);
        self.publish();

        loop {
            let settle_at = self.debouncer.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    self.handle_fetch(joined);
                }
                Some(joined) = self.recomputes.join_next(), if !self.recomputes.is_empty() => {
                    self.handle_recompute(joined);
                }
                () = settle(settle_at), if settle_at.is_some() => {
                    self.handle_settled();
                }
            }
            self.publish();
        }

        info!("List session for {} stopped", self.controller.selector());
    }

    fn handle_command(&mut self, command: ListCommand) {
        debug!(?command, "Session command");
        match command {
            ListCommand::SetSelector(selector) => {
                self.debouncer.cancel();
                let ticket = self.controller.set_selector(selector);
                self.spawn_fetch(ticket);
            }
            ListCommand::SetCriteria(criteria) => {
                if let Some(ticket) = self.controller.set_criteria(criteria) {
                    self.spawn_recompute(ticket);
                }
            }
            ListCommand::SetSortMode(mode) => {
                if let Some(ticket) = self.controller.set_sort_mode(mode) {
                    self.spawn_recompute(ticket);
                }
            }
            ListCommand::Visibility(visible) => {
                self.debouncer.push(visible, Instant::now());
            }
            ListCommand::LoadNext => {
                if let Some(ticket) = self.controller.request_next_page() {
                    self.spawn_fetch(ticket);
                }
            }
        }
    }

    fn handle_settled(&mut self) {
        if let Some(visible) = self.debouncer.take_ready(Instant::now()) {
            if let Some(ticket) = self.controller.on_visibility(visible) {
                self.spawn_fetch(ticket);
            }
        }
    }

    fn handle_fetch(&mut self, joined: std::result::Result<FetchOutcome<R>, JoinError>) {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Fetch task did not finish: {}", e);
                return;
            }
        };

        match self.controller.complete(outcome) {
            Ok(Completion::Appended {
                recompute,
                follow_up,
                ..
            }) => {
                self.spawn_recompute(recompute);
                if let Some(ticket) = follow_up {
                    self.spawn_fetch(ticket);
                }
            }
            Ok(Completion::StaleResultDiscarded) => {}
            // already recorded on the controller and shown through the snapshot
            Err(e) => debug!("{}", e),
        }
    }

    fn handle_recompute(&mut self, joined: std::result::Result<RecomputedView<R>, JoinError>) {
        match joined {
            Ok(done) => {
                self.controller.finish_recompute(done);
            }
            Err(e) => warn!("Recompute task did not finish: {}", e),
        }
    }

    /// Run the page request on its own task so a panicking fetcher still
    /// reports back as a failed request.
    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        self.fetches.spawn(async move {
            let fallback = ticket.clone();
            let request = tokio::spawn(async move { ticket.run(&*fetcher).await });
            match request.await {
                Ok(outcome) => outcome,
                Err(e) => FetchOutcome {
                    ticket: fallback,
                    result: Err(FetchError::Unavailable(format!("fetch task failed: {}", e))),
                },
            }
        });
    }

    fn spawn_recompute(&mut self, ticket: RecomputeTicket<R>) {
        self.recomputes.spawn_blocking(move || ticket.run());
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.controller.snapshot());
    }
}

async fn settle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
