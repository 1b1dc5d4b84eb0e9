use std::{
    collections::BTreeSet,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::{Duration, Interval, MissedTickBehavior, interval, sleep},
};
use tracing::{debug, info, warn};

use crate::{
    core::store::{RecordStore, StoreError},
    engine::{
        filter::{self, FilterState},
        page::{self, Page},
    },
    master::{MasterCache, MasterEntry},
    record::{HookRecord, Origin, RecordDraft},
    remote::{Backend, BackendError, ConfirmedRow},
    types::{MasterCategory, RowIndex, SyncStatus, TimestampMs},
};

use super::events::DashboardEvent;

/// Errors surfaced by [`DashboardHandle`] operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No backend endpoint has been configured.
    #[error("no backend endpoint configured")]
    NotConfigured,
    /// The selected-years set is empty; nothing to fetch.
    #[error("no years selected")]
    NoYearsSelected,
    /// A manual sync cycle is already in flight.
    #[error("a sync is already in progress")]
    SyncInProgress,
    /// Store-level precondition failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Network boundary failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The runtime loop is gone.
    #[error("runtime channel closed")]
    ChannelClosed,
}

/// Runtime tunables. Defaults match the dashboard's fixed timings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Background sync period.
    pub auto_sync_interval: Duration,
    /// How long the `Complete` status stays visible before reverting.
    pub status_revert_after: Duration,
    /// Fixed page size for the data table.
    pub page_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            auto_sync_interval: Duration::from_secs(30),
            status_revert_after: Duration::from_secs(3),
            page_size: 20,
        }
    }
}

/// Everything the presentation layer renders for the data tab.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Current page of the filtered view.
    pub page: Page,
    /// Quantity sum over the whole filtered set.
    pub total_quantity: f64,
    /// Visible sync status.
    pub status: SyncStatus,
}

/// Cloneable handle to the single-writer dashboard runtime.
pub struct DashboardHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<DashboardEvent>,
}

impl Clone for DashboardHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Submit {
        draft: RecordDraft,
        resp: oneshot::Sender<Result<HookRecord, RuntimeError>>,
    },
    SaveMasterEntry {
        entry: MasterEntry,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    UpdateQuantity {
        record: HookRecord,
        quantity: String,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    SyncNow {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Configure {
        backend: Option<Arc<dyn Backend>>,
        resp: oneshot::Sender<()>,
    },
    SetYears {
        years: BTreeSet<String>,
        resp: oneshot::Sender<()>,
    },
    SetFilter {
        filter: FilterState,
        resp: oneshot::Sender<()>,
    },
    SetPage {
        page: usize,
        resp: oneshot::Sender<()>,
    },
    View {
        resp: oneshot::Sender<DashboardView>,
    },
    Records {
        resp: oneshot::Sender<Vec<HookRecord>>,
    },
    Suggestions {
        category: MasterCategory,
        resp: oneshot::Sender<Vec<String>>,
    },
    MasterEntries {
        resp: oneshot::Sender<Vec<MasterEntry>>,
    },
    Status {
        resp: oneshot::Sender<SyncStatus>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

enum Internal {
    SubmitSent {
        draft: RecordDraft,
        resp: oneshot::Sender<Result<HookRecord, RuntimeError>>,
    },
    MasterSent {
        entry: MasterEntry,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    QuantitySent {
        year: String,
        row_index: RowIndex,
        quantity: String,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    SyncFinished {
        watermark_ms: TimestampMs,
        manual: bool,
        outcome: Result<SyncPayload, BackendError>,
    },
    RevertStatus {
        generation: u64,
    },
}

/// What one completed cycle carries back: the record snapshot, and the
/// master refresh when it succeeded (its failure never fails the cycle).
struct SyncPayload {
    rows: Vec<ConfirmedRow>,
    master: Option<Vec<MasterEntry>>,
}

struct Actor {
    store: RecordStore,
    master: MasterCache,
    backend: Option<Arc<dyn Backend>>,
    config: RuntimeConfig,
    filter: FilterState,
    current_page: usize,
    status: SyncStatus,
    status_generation: u64,
    timer_dirty: bool,
    manual_resp: Option<oneshot::Sender<Result<(), RuntimeError>>>,
    events_tx: broadcast::Sender<DashboardEvent>,
    internal_tx: mpsc::UnboundedSender<Internal>,
}

/// Spawns the dashboard runtime and returns its handle.
///
/// When a backend is supplied and the year selection is non-empty, the
/// background timer starts immediately (its first tick fires right away,
/// giving the initial fetch).
pub fn spawn_dashboard(
    store: RecordStore,
    master: MasterCache,
    backend: Option<Arc<dyn Backend>>,
    config: RuntimeConfig,
) -> DashboardHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<DashboardEvent>(1024);
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<Internal>();

    let mut actor = Actor {
        store,
        master,
        backend,
        config,
        filter: FilterState::default(),
        current_page: 1,
        status: SyncStatus::Ready,
        status_generation: 0,
        timer_dirty: false,
        manual_resp: None,
        events_tx: events_tx.clone(),
        internal_tx,
    };

    tokio::spawn(async move {
        let mut timer = actor.rebuild_timer();

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    if actor.handle_command(cmd) {
                        break;
                    }
                    // Only endpoint or year-selection changes reset the
                    // timer phase; other filter edits leave it running.
                    if std::mem::take(&mut actor.timer_dirty) {
                        timer = actor.rebuild_timer();
                    }
                }
                msg = internal_rx.recv() => {
                    // The actor keeps a sender, so this never yields None.
                    if let Some(msg) = msg {
                        actor.handle_internal(msg);
                    }
                }
                _ = tick(&mut timer), if timer.is_some() => {
                    actor.start_sync(false, None);
                }
            }
        }
    });

    DashboardHandle { cmd_tx, events_tx }
}

async fn tick(timer: &mut Option<Interval>) {
    match timer.as_mut() {
        Some(iv) => {
            iv.tick().await;
        }
        // Guarded out by the `if timer.is_some()` precondition.
        None => std::future::pending().await,
    }
}

impl Actor {
    fn rebuild_timer(&self) -> Option<Interval> {
        if self.backend.is_some() && !self.filter.years.is_empty() {
            let mut iv = interval(self.config.auto_sync_interval);
            iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(iv)
        } else {
            None
        }
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events_tx.send(event);
    }

    fn set_status(&mut self, status: SyncStatus) {
        if self.status != status {
            self.status = status;
            self.emit(DashboardEvent::StatusChanged { status });
        }
    }

    /// Returns true when the loop should exit.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Submit { draft, resp } => {
                let Some(backend) = self.backend.clone() else {
                    let _ = resp.send(Err(RuntimeError::NotConfigured));
                    return false;
                };
                let internal = self.internal_tx.clone();
                tokio::spawn(async move {
                    match backend.save_record(&draft).await {
                        Ok(()) => {
                            let _ = internal.send(Internal::SubmitSent { draft, resp });
                        }
                        Err(err) => {
                            let _ = resp.send(Err(err.into()));
                        }
                    }
                });
            }
            Command::SaveMasterEntry { entry, resp } => {
                let Some(backend) = self.backend.clone() else {
                    let _ = resp.send(Err(RuntimeError::NotConfigured));
                    return false;
                };
                let internal = self.internal_tx.clone();
                tokio::spawn(async move {
                    match backend.save_master_entry(&entry).await {
                        Ok(()) => {
                            let _ = internal.send(Internal::MasterSent { entry, resp });
                        }
                        Err(err) => {
                            let _ = resp.send(Err(err.into()));
                        }
                    }
                });
            }
            Command::UpdateQuantity {
                record,
                quantity,
                resp,
            } => {
                // Precondition check happens before any network call: only
                // confirmed records carry the coordinate the backend accepts.
                let (year, row_index) = match &record.origin {
                    Origin::Confirmed { year, row_index } => (year.clone(), *row_index),
                    Origin::Pending { .. } => {
                        let _ = resp.send(Err(StoreError::NotSynchronized.into()));
                        return false;
                    }
                };
                let Some(backend) = self.backend.clone() else {
                    let _ = resp.send(Err(RuntimeError::NotConfigured));
                    return false;
                };
                let internal = self.internal_tx.clone();
                tokio::spawn(async move {
                    match backend.update_quantity(&year, row_index, &quantity).await {
                        Ok(()) => {
                            let _ = internal.send(Internal::QuantitySent {
                                year,
                                row_index,
                                quantity,
                                resp,
                            });
                        }
                        Err(err) => {
                            let _ = resp.send(Err(err.into()));
                        }
                    }
                });
            }
            Command::SyncNow { resp } => {
                self.start_sync(true, Some(resp));
            }
            Command::Configure { backend, resp } => {
                self.backend = backend;
                self.timer_dirty = true;
                let _ = resp.send(());
            }
            Command::SetYears { years, resp } => {
                if years != self.filter.years {
                    self.filter.years = years;
                    self.current_page = 1;
                    self.timer_dirty = true;
                }
                let _ = resp.send(());
            }
            Command::SetFilter { filter, resp } => {
                if filter != self.filter {
                    if filter.years != self.filter.years {
                        self.timer_dirty = true;
                    }
                    self.filter = filter;
                    self.current_page = 1;
                }
                let _ = resp.send(());
            }
            Command::SetPage { page, resp } => {
                self.current_page = page.max(1);
                let _ = resp.send(());
            }
            Command::View { resp } => {
                let unified = self.store.unified();
                let filtered = filter::apply(&unified, &self.filter);
                let total_quantity = filter::total_quantity(&filtered);
                let page = page::paginate(&filtered, self.config.page_size, self.current_page);
                let _ = resp.send(DashboardView {
                    page,
                    total_quantity,
                    status: self.status,
                });
            }
            Command::Records { resp } => {
                let _ = resp.send(self.store.unified());
            }
            Command::Suggestions { category, resp } => {
                let _ = resp.send(self.master.suggestions(category));
            }
            Command::MasterEntries { resp } => {
                let _ = resp.send(self.master.entries().to_vec());
            }
            Command::Status { resp } => {
                let _ = resp.send(self.status);
            }
            Command::Shutdown { resp } => {
                let _ = resp.send(());
                return true;
            }
        }

        false
    }

    fn handle_internal(&mut self, msg: Internal) {
        match msg {
            Internal::SubmitSent { draft, resp } => {
                // Stamped after the request went out, so the record can only
                // be pruned by a fetch that started later.
                let record = self.store.insert_pending(draft, now_ms());
                self.emit(DashboardEvent::RecordSubmitted);
                let _ = resp.send(Ok(record));
            }
            Internal::MasterSent { entry, resp } => {
                self.master.append(entry);
                self.emit(DashboardEvent::MasterEntrySaved);
                let _ = resp.send(Ok(()));
            }
            Internal::QuantitySent {
                year,
                row_index,
                quantity,
                resp,
            } => {
                match self.store.set_confirmed_quantity(&year, row_index, &quantity) {
                    Ok(()) => {
                        self.emit(DashboardEvent::QuantityUpdated {
                            year,
                            row_index,
                        });
                    }
                    Err(StoreError::MissingCoordinate { year, row_index }) => {
                        // A newer snapshot replaced the row; the backend write
                        // still went through, so treat the local patch as a no-op.
                        warn!(%year, row_index, "quantity target no longer in snapshot");
                    }
                    Err(other) => {
                        let _ = resp.send(Err(other.into()));
                        return;
                    }
                }
                let _ = resp.send(Ok(()));
            }
            Internal::SyncFinished {
                watermark_ms,
                manual,
                outcome,
            } => self.finish_sync(watermark_ms, manual, outcome),
            Internal::RevertStatus { generation } => {
                if generation == self.status_generation && self.status == SyncStatus::Complete {
                    self.set_status(SyncStatus::Ready);
                }
            }
        }
    }

    fn start_sync(&mut self, manual: bool, resp: Option<oneshot::Sender<Result<(), RuntimeError>>>) {
        let Some(backend) = self.backend.clone() else {
            if let Some(resp) = resp {
                let _ = resp.send(Err(RuntimeError::NotConfigured));
            }
            return;
        };

        if self.filter.years.is_empty() {
            if let Some(resp) = resp {
                let _ = resp.send(Err(RuntimeError::NoYearsSelected));
            }
            return;
        }

        if manual {
            if self.manual_resp.is_some() {
                if let Some(resp) = resp {
                    let _ = resp.send(Err(RuntimeError::SyncInProgress));
                }
                return;
            }
            self.manual_resp = resp;
            self.set_status(SyncStatus::Syncing);
            self.emit(DashboardEvent::SyncStarted);
        }

        // The watermark must be sampled strictly before the fetch goes out.
        let watermark_ms = now_ms();
        let years: Vec<String> = self.filter.years.iter().cloned().collect();
        let internal = self.internal_tx.clone();

        tokio::spawn(async move {
            let outcome = run_cycle(backend, &years).await;
            let _ = internal.send(Internal::SyncFinished {
                watermark_ms,
                manual,
                outcome,
            });
        });
    }

    fn finish_sync(
        &mut self,
        watermark_ms: TimestampMs,
        manual: bool,
        outcome: Result<SyncPayload, BackendError>,
    ) {
        match outcome {
            Ok(SyncPayload { rows, master }) => {
                let confirmed: Vec<HookRecord> = rows.into_iter().map(Into::into).collect();
                let count = confirmed.len();
                let pruned = self.store.apply_snapshot(confirmed, watermark_ms);
                if let Some(entries) = master {
                    self.master.replace_all(entries);
                }
                info!(manual, confirmed = count, pruned, "sync cycle applied");
                self.emit(DashboardEvent::SyncCompleted {
                    manual,
                    confirmed: count,
                    pruned,
                });

                if manual {
                    self.set_status(SyncStatus::Complete);
                    self.status_generation += 1;
                    let generation = self.status_generation;
                    let delay = self.config.status_revert_after;
                    let internal = self.internal_tx.clone();
                    tokio::spawn(async move {
                        sleep(delay).await;
                        let _ = internal.send(Internal::RevertStatus { generation });
                    });
                    if let Some(resp) = self.manual_resp.take() {
                        let _ = resp.send(Ok(()));
                    }
                }
            }
            Err(err) => {
                if manual {
                    self.set_status(SyncStatus::Ready);
                    if let Some(resp) = self.manual_resp.take() {
                        let _ = resp.send(Err(err.into()));
                    }
                } else {
                    // Background cycles never interrupt the user.
                    warn!(error = %err, "background sync failed");
                }
            }
        }
    }
}

/// Fetch records, then master data, in that order. A master-data failure is
/// logged and dropped; the record snapshot still applies.
async fn run_cycle(
    backend: Arc<dyn Backend>,
    years: &[String],
) -> Result<SyncPayload, BackendError> {
    let rows = backend.fetch_records(years).await?;
    let master = match backend.fetch_master_data().await {
        Ok(entries) => Some(entries),
        Err(err) => {
            debug!(error = %err, "master-data refresh failed; keeping cached entries");
            None
        }
    };
    Ok(SyncPayload { rows, master })
}

impl DashboardHandle {
    /// Subscribes to the runtime event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events_tx.subscribe()
    }

    /// Submits a draft: sends it to the backend, then optimistically inserts
    /// it as a pending record. Returns the stored record.
    pub async fn submit(&self, draft: RecordDraft) -> Result<HookRecord, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit { draft, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Saves a master-data entry and appends it to the local cache.
    pub async fn save_master_entry(&self, entry: MasterEntry) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SaveMasterEntry { entry, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Updates the quantity of a confirmed record. Pending records fail
    /// locally with [`StoreError::NotSynchronized`] before any network call.
    pub async fn update_quantity(
        &self,
        record: HookRecord,
        quantity: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::UpdateQuantity {
                record,
                quantity: quantity.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Runs one manual sync cycle, resolving when it has been applied.
    pub async fn sync_now(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SyncNow { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Replaces (or clears) the backend endpoint and reconfigures the
    /// background timer.
    pub async fn configure(&self, backend: Option<Arc<dyn Backend>>) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Configure { backend, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Replaces the selected-years set; resets pagination and reconfigures
    /// the background timer.
    pub async fn set_years<I, S>(&self, years: I) -> Result<(), RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetYears {
                years: years.into_iter().map(Into::into).collect(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Replaces the whole filter state; any change resets pagination.
    pub async fn set_filter(&self, filter: FilterState) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetFilter { filter, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Moves to a page; out-of-range values are clamped at render time.
    pub async fn set_page(&self, page: usize) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetPage { page, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Current filtered/paginated view plus aggregate and status.
    pub async fn view(&self) -> Result<DashboardView, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::View { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Unified, unfiltered record view (pending newest-first, then confirmed).
    pub async fn records(&self) -> Result<Vec<HookRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Records { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Autocomplete suggestions for one category.
    pub async fn suggestions(&self, category: MasterCategory) -> Result<Vec<String>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Suggestions { category, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// All cached master-data entries.
    pub async fn master_entries(&self) -> Result<Vec<MasterEntry>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::MasterEntries { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Current visible sync status.
    pub async fn status(&self) -> Result<SyncStatus, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Status { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the runtime loop.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
