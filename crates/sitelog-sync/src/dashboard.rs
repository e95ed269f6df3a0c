//! Dashboard controller: owns the per-project data sources and their fetches.
//!
//! Each source (procurement, non-responsive threads) is fetched on its own
//! spawned task and reports back over an mpsc channel. Every spawn gets a
//! fresh ticket; a result is applied only if its ticket is still the current
//! one for its source. Switching project aborts in-flight tasks and issues new
//! tickets, so a slow response for the previous project can never overwrite
//! state for the current one.
//!
//! Failures are isolated per source: a failed procurement fetch clears the
//! procurement dataset and records the message, but leaves threads alone. A
//! fetch task that panics still reports a failure for its ticket.
//!
//! Sources the session's role may not view are never fetched and stay
//! [`LoadState::Idle`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sitelog_core::{
    Capability, NonResponsiveThread, ProcurementRecord, ProcurementStats, Session, ThreadStats,
    aggregate, filter_for_role, merge_project, project_log,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::http::ApiError;

/// The two fetchable data sources behind the dashboard.
#[async_trait]
pub trait DashboardApi: Send + Sync + 'static {
    async fn fetch_procurement(&self, project: &str)
    -> Result<Vec<ProcurementRecord>, ApiError>;

    async fn fetch_threads(&self, project: &str) -> Result<Vec<NonResponsiveThread>, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Procurement,
    Threads,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Procurement, Source::Threads];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Procurement => "procurement",
            Self::Threads => "threads",
        }
    }

    /// Capability a role needs before this source is fetched.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::Procurement => Some(Capability::ProcurementLog),
            Self::Threads => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Inline error message for the affected panel.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

const NO_RESULT: &str = "fetch task ended without a result";

/// Fetch outcome; errors are already rendered for display.
enum Payload {
    Procurement(Result<Vec<ProcurementRecord>, String>),
    Threads(Result<Vec<NonResponsiveThread>, String>),
}

impl Payload {
    fn failed(source: Source, msg: &str) -> Self {
        match source {
            Source::Procurement => Self::Procurement(Err(msg.to_string())),
            Source::Threads => Self::Threads(Err(msg.to_string())),
        }
    }
}

struct Update {
    ticket: u64,
    payload: Payload,
}

impl Update {
    fn source(&self) -> Source {
        match self.payload {
            Payload::Procurement(_) => Source::Procurement,
            Payload::Threads(_) => Source::Threads,
        }
    }
}

/// Sends a failure for `ticket` if dropped without [`send`](Self::send) being
/// called, so a panicking fetch never leaves its source stuck in `Loading`.
struct Completion {
    tx: mpsc::UnboundedSender<Update>,
    ticket: u64,
    source: Source,
    armed: bool,
}

impl Completion {
    fn send(mut self, payload: Payload) {
        self.armed = false;
        // Receiver gone means the dashboard was dropped.
        let _ = self.tx.send(Update {
            ticket: self.ticket,
            payload,
        });
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.tx.send(Update {
                ticket: self.ticket,
                payload: Payload::failed(self.source, NO_RESULT),
            });
        }
    }
}

#[derive(Default)]
struct Slot {
    state: LoadState,
    ticket: u64,
    task: Option<JoinHandle<()>>,
}

impl Slot {
    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct Dashboard<A: DashboardApi> {
    api: Arc<A>,
    session: Session,
    project: Option<String>,
    records: Vec<ProcurementRecord>,
    threads: Vec<NonResponsiveThread>,
    procurement: Slot,
    thread_slot: Slot,
    next_ticket: u64,
    tx: mpsc::UnboundedSender<Update>,
    rx: mpsc::UnboundedReceiver<Update>,
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: Arc<A>, session: Session) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            session,
            project: None,
            records: Vec::new(),
            threads: Vec::new(),
            procurement: Slot::default(),
            thread_slot: Slot::default(),
            next_ticket: 0,
            tx,
            rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn state(&self, source: Source) -> &LoadState {
        &self.slot(source).state
    }

    fn slot(&self, source: Source) -> &Slot {
        match source {
            Source::Procurement => &self.procurement,
            Source::Threads => &self.thread_slot,
        }
    }

    fn slot_mut(&mut self, source: Source) -> &mut Slot {
        match source {
            Source::Procurement => &mut self.procurement,
            Source::Threads => &mut self.thread_slot,
        }
    }

    /// Switch to `project` and start fetching every source the role may load.
    ///
    /// Accumulated procurement records are kept: they are keyed by project,
    /// and the merge only replaces the selected project's slice.
    pub fn select_project(&mut self, project: &str) {
        info!(project = %project, "selecting project");
        self.project = Some(project.to_string());
        for source in Source::ALL {
            if self.permits(source) {
                self.spawn(source);
            } else {
                debug!(source = %source, role = self.session.role_key(), "source not fetched");
            }
        }
    }

    /// Whether the signed-in role may load `source`.
    pub fn permits(&self, source: Source) -> bool {
        source
            .capability()
            .is_none_or(|c| self.session.role.allows(c))
    }

    /// Re-fetch one source for the current project.
    ///
    /// No-op without a project, or for a source the role may not load.
    pub fn retry(&mut self, source: Source) {
        if self.project.is_none() {
            debug!(source = %source, "retry without a selected project");
            return;
        }
        if !self.permits(source) {
            debug!(source = %source, "retry of a source the role may not load");
            return;
        }
        info!(source = %source, "retrying fetch");
        self.spawn(source);
    }

    fn spawn(&mut self, source: Source) {
        let Some(project) = self.project.clone() else {
            return;
        };
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let done = Completion {
                tx,
                ticket,
                source,
                armed: true,
            };
            let payload = match source {
                Source::Procurement => Payload::Procurement(
                    api.fetch_procurement(&project)
                        .await
                        .map_err(|e| e.to_string()),
                ),
                Source::Threads => Payload::Threads(
                    api.fetch_threads(&project).await.map_err(|e| e.to_string()),
                ),
            };
            done.send(payload);
        });

        let slot = self.slot_mut(source);
        if slot.task.is_some() {
            debug!(source = %source, "aborting in-flight fetch");
        }
        slot.abort();
        slot.ticket = ticket;
        slot.state = LoadState::Loading;
        slot.task = Some(task);
    }

    /// True while any source has a fetch in flight.
    pub fn is_loading(&self) -> bool {
        Source::ALL.iter().any(|s| self.state(*s).is_loading())
    }

    /// Wait for and apply the next current result.
    ///
    /// Returns the source that changed, or `None` once nothing is loading.
    pub async fn next_update(&mut self) -> Option<Source> {
        while self.is_loading() {
            let update = self.rx.recv().await?;
            let source = update.source();
            if update.ticket != self.slot(source).ticket {
                debug!(source = %source, ticket = update.ticket, "discarding stale response");
                continue;
            }
            self.slot_mut(source).task = None;
            self.apply(update.payload);
            return Some(source);
        }
        None
    }

    /// Apply results until no source is loading.
    pub async fn settle(&mut self) {
        while self.next_update().await.is_some() {}
    }

    fn apply(&mut self, payload: Payload) {
        let project = self.project.clone().unwrap_or_default();
        match payload {
            Payload::Procurement(Ok(batch)) => {
                info!(project = %project, count = batch.len(), "procurement loaded");
                self.records = merge_project(batch, &self.records, &project);
                self.procurement.state = LoadState::Ready;
            }
            Payload::Procurement(Err(e)) => {
                warn!(project = %project, error = %e, "procurement fetch failed");
                self.records.clear();
                self.procurement.state = LoadState::Failed(e);
            }
            Payload::Threads(Ok(threads)) => {
                info!(project = %project, count = threads.len(), "threads loaded");
                self.threads = threads;
                self.thread_slot.state = LoadState::Ready;
            }
            Payload::Threads(Err(e)) => {
                warn!(project = %project, error = %e, "thread fetch failed");
                self.threads.clear();
                self.thread_slot.state = LoadState::Failed(e);
            }
        }
    }

    /// Every accumulated procurement record, across projects.
    pub fn records(&self) -> &[ProcurementRecord] {
        &self.records
    }

    /// Risk-sorted log for the selected project.
    pub fn procurement_log(&self) -> Vec<ProcurementRecord> {
        match &self.project {
            Some(project) => project_log(&self.records, project),
            None => Vec::new(),
        }
    }

    pub fn procurement_stats(&self) -> ProcurementStats {
        aggregate(&self.procurement_log())
    }

    /// Threads the signed-in role may see.
    pub fn visible_threads(&self) -> Vec<NonResponsiveThread> {
        filter_for_role(&self.threads, self.session.role, &self.session.user_email)
    }

    pub fn thread_stats(&self) -> ThreadStats {
        ThreadStats::from_threads(&self.visible_threads())
    }
}

impl<A: DashboardApi> Drop for Dashboard<A> {
    fn drop(&mut self) {
        self.procurement.abort();
        self.thread_slot.abort();
    }
}
