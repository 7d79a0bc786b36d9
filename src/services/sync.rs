use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{watch, RwLock};

use crate::api::dto::DashboardPayload;
use crate::api::ApiGateway;
use crate::error::{SyncError, ValidationError};
use crate::models::{
    AssignmentDraft, Category, DashboardFilters, DashboardSnapshot, SubjectIndex,
};
use crate::services::calendar::{CalendarAggregator, CalendarView};
use crate::session::Session;

/// Lifecycle of the dashboard view. `Error` keeps any prior snapshot
/// renderable; only a failed first load leaves nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Empty,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Default)]
struct SyncState {
    active_sem: Option<i64>,
    filters: DashboardFilters,
    snapshot: Option<DashboardSnapshot>,
    calendar: CalendarAggregator,
}

/// Owns the dashboard snapshot and every path that replaces it.
///
/// The snapshot is replaced wholesale on each load; mutations never patch it
/// in place. After any mutation succeeds the dashboard is re-fetched, so the
/// server stays the single source of truth.
pub struct DashboardSynchronizer<G: ApiGateway> {
    gateway: Arc<G>,
    session: Arc<Session>,
    state: RwLock<SyncState>,
    // Guards refresh() only; a refresh arriving while one runs is dropped.
    refreshing: AtomicBool,
    // Monotonic stamp per issued load; responses stamped older than the
    // newest issued request are discarded instead of clobbering the snapshot.
    request_seq: AtomicU64,
    phase_tx: watch::Sender<SyncPhase>,
    phase_rx: watch::Receiver<SyncPhase>,
}

impl<G: ApiGateway> DashboardSynchronizer<G> {
    pub fn new(gateway: Arc<G>, session: Arc<Session>) -> Self {
        let (phase_tx, phase_rx) = watch::channel(SyncPhase::Empty);
        Self {
            gateway,
            session,
            state: RwLock::new(SyncState::default()),
            refreshing: AtomicBool::new(false),
            request_seq: AtomicU64::new(0),
            phase_tx,
            phase_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase_rx.borrow().clone()
    }

    /// Watch side of the phase machine, for loading indicators.
    pub fn subscribe_phase(&self) -> watch::Receiver<SyncPhase> {
        self.phase_tx.subscribe()
    }

    pub async fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    pub async fn active_semester(&self) -> Option<i64> {
        self.state.read().await.active_sem
    }

    pub async fn filters(&self) -> DashboardFilters {
        self.state.read().await.filters.clone()
    }

    /// Restores the remembered semester on startup. Returns false when there
    /// is nothing to restore.
    pub async fn restore(&self) -> Result<bool, SyncError> {
        match self.session.last_semester() {
            Some(sem_id) => {
                self.select_semester(sem_id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Switches the active semester. Filters never carry across semesters
    /// and any fetched calendar list is dropped.
    pub async fn select_semester(&self, sem_id: i64) -> Result<(), SyncError> {
        {
            let mut state = self.state.write().await;
            state.filters.reset();
            state.calendar.invalidate();
        }
        self.load_inner(sem_id, DashboardFilters::default()).await
    }

    pub async fn set_subject_filter(&self, subject: Option<i64>) -> Result<(), SyncError> {
        let (sem, filters) = {
            let mut state = self.state.write().await;
            state.filters.subject = subject;
            (state.active_sem, state.filters.clone())
        };
        match sem {
            Some(sem_id) => self.load_inner(sem_id, filters).await,
            None => Ok(()),
        }
    }

    pub async fn set_category_filter(
        &self,
        categories: BTreeSet<Category>,
    ) -> Result<(), SyncError> {
        let (sem, filters) = {
            let mut state = self.state.write().await;
            state.filters.categories = categories;
            (state.active_sem, state.filters.clone())
        };
        match sem {
            Some(sem_id) => self.load_inner(sem_id, filters).await,
            None => Ok(()),
        }
    }

    /// Re-fetches the active semester with the current filters. No-op when
    /// no semester is active or another refresh is still in flight; callers
    /// firing on a timer get deduplicated here, not queued.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let (sem, filters) = {
            let state = self.state.read().await;
            (state.active_sem, state.filters.clone())
        };
        let Some(sem_id) = sem else {
            return Ok(());
        };
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("refresh already in flight, dropping");
            return Ok(());
        }
        let result = self.load_inner(sem_id, filters).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    /// Full reload of the current view; the follow-up to every mutation.
    pub async fn reload(&self) -> Result<(), SyncError> {
        let (sem, filters) = {
            let state = self.state.read().await;
            (state.active_sem, state.filters.clone())
        };
        match sem {
            Some(sem_id) => self.load_inner(sem_id, filters).await,
            None => Ok(()),
        }
    }

    pub async fn create_semester(&self, sem_name: &str) -> Result<(), SyncError> {
        if sem_name.trim().is_empty() {
            return Err(ValidationError::Missing("semester name").into());
        }
        let created = self
            .gateway
            .create_semester(self.session.user_id(), sem_name.trim())
            .await?;
        log::info!("created semester {} ({})", created.sem_name, created.sem_id);
        self.select_semester(created.sem_id).await
    }

    /// Deletes a semester. When the active one goes away the view falls back
    /// to the most recent remaining semester from the menu, or to the empty
    /// state (with the durable key cleared) when none remain.
    pub async fn delete_semester(&self, sem_id: i64) -> Result<(), SyncError> {
        self.gateway.delete_semester(sem_id).await?;

        let (was_active, next) = {
            let state = self.state.read().await;
            let next = state
                .snapshot
                .as_ref()
                .map(|snap| {
                    snap.semesters
                        .iter()
                        .filter(|s| s.sem_id != sem_id)
                        .map(|s| s.sem_id)
                        .max()
                })
                .unwrap_or(None);
            (state.active_sem == Some(sem_id), next)
        };

        if !was_active {
            return self.reload().await;
        }
        match next {
            Some(next_id) => self.select_semester(next_id).await,
            None => {
                {
                    let mut state = self.state.write().await;
                    state.active_sem = None;
                    state.snapshot = None;
                    state.filters.reset();
                    state.calendar.invalidate();
                }
                self.session.forget_semester();
                self.set_phase(SyncPhase::Empty);
                Ok(())
            }
        }
    }

    pub async fn create_subject(&self, sub_name: &str) -> Result<(), SyncError> {
        if sub_name.trim().is_empty() {
            return Err(ValidationError::Missing("subject name").into());
        }
        let Some(sem_id) = self.active_semester().await else {
            return Err(ValidationError::Missing("semester").into());
        };
        self.gateway.create_subject(sem_id, sub_name.trim()).await?;
        self.reload().await
    }

    pub async fn delete_subject(&self, sub_id: i64) -> Result<(), SyncError> {
        self.gateway.delete_subject(sub_id).await?;
        // A filter pointing at the deleted subject would pin the view to an
        // empty list; drop it before reloading.
        let (sem, filters) = {
            let mut state = self.state.write().await;
            if state.filters.subject == Some(sub_id) {
                state.filters.subject = None;
            }
            (state.active_sem, state.filters.clone())
        };
        match sem {
            Some(sem_id) => self.load_inner(sem_id, filters).await,
            None => Ok(()),
        }
    }

    /// Creates or updates an assignment from a draft. Validation failures
    /// never reach the network.
    pub async fn save_assignment(&self, draft: &AssignmentDraft) -> Result<(), SyncError> {
        draft.validate()?;
        match draft.assign_id {
            Some(assign_id) => self.gateway.update_assignment(assign_id, draft).await?,
            None => {
                let Some(sub_id) = draft.sub_id else {
                    return Err(ValidationError::Missing("subject").into());
                };
                self.gateway.create_assignment(sub_id, draft).await?;
            }
        }
        self.reload().await
    }

    pub async fn delete_assignment(&self, assign_id: i64) -> Result<(), SyncError> {
        self.gateway.delete_assignment(assign_id).await?;
        self.reload().await
    }

    pub async fn toggle_complete(&self, assign_id: i64, complete: bool) -> Result<(), SyncError> {
        self.gateway.set_complete(assign_id, complete).await?;
        self.reload().await
    }

    /// Month view for the active semester. Fetches the dedicated calendar
    /// list on first use; a failed fetch degrades to the snapshot union.
    pub async fn calendar_view(&self, reference: NaiveDate) -> CalendarView {
        let sem = self.state.read().await.active_sem;
        if let Some(sem_id) = sem {
            let have = self.state.read().await.calendar.has_fetch_for(sem_id);
            if !have {
                match self.gateway.fetch_calendar(sem_id).await {
                    Ok(payload) => {
                        let mut state = self.state.write().await;
                        state.calendar.set_fetched(sem_id, payload.items);
                    }
                    Err(e) => log::warn!("calendar fetch failed, using dashboard data: {}", e),
                }
            }
        }
        let state = self.state.read().await;
        state.calendar.view(reference, state.snapshot.as_ref())
    }

    /// Drops all dashboard state and the durable key.
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            state.active_sem = None;
            state.snapshot = None;
            state.filters.reset();
            state.calendar.invalidate();
        }
        self.session.teardown();
        self.set_phase(SyncPhase::Empty);
        log::info!("logged out; local session cleared");
    }

    async fn load_inner(&self, sem_id: i64, filters: DashboardFilters) -> Result<(), SyncError> {
        let stamp = self.request_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_phase(SyncPhase::Loading);

        let fetched = self
            .gateway
            .fetch_dashboard(self.session.user_id(), sem_id, &filters)
            .await;

        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                if self.is_stale(stamp) {
                    log::debug!("discarding superseded dashboard failure for semester {sem_id}");
                    return Ok(());
                }
                let mut state = self.state.write().await;
                state.active_sem = Some(sem_id);
                state.filters = filters;
                drop(state);
                log::warn!("dashboard load failed for semester {}: {}", sem_id, e);
                self.set_phase(SyncPhase::Error(e.to_string()));
                return Err(e.into());
            }
        };

        let snapshot = self.normalize(sem_id, payload);
        let mut state = self.state.write().await;
        if self.is_stale(stamp) {
            log::debug!("discarding superseded dashboard response for semester {sem_id}");
            return Ok(());
        }
        log::debug!(
            "dashboard loaded for semester {}: {} open, {} done",
            sem_id,
            snapshot.incomplete.len(),
            snapshot.complete.len()
        );
        state.active_sem = Some(sem_id);
        state.filters = filters;
        state.snapshot = Some(snapshot);
        drop(state);
        self.session.remember_semester(sem_id);
        self.set_phase(SyncPhase::Ready);
        Ok(())
    }

    fn normalize(&self, sem_id: i64, payload: DashboardPayload) -> DashboardSnapshot {
        let subjects = payload.dashboard.subject_list;
        let index = SubjectIndex::from_subjects(&subjects);
        let incomplete = payload
            .sections
            .incomplete
            .into_iter()
            .map(|row| row.into_assignment(&index))
            .collect();
        let complete = payload
            .sections
            .complete
            .into_iter()
            .map(|row| row.into_assignment(&index))
            .collect();
        DashboardSnapshot {
            sem_id: payload.dashboard.sem_id.unwrap_or(sem_id),
            sem_name: payload.dashboard.sem_name.unwrap_or_default(),
            user_name: payload
                .dashboard
                .user_name
                .unwrap_or_else(|| self.session.user().user_name.clone()),
            subjects,
            semesters: payload.semesters,
            incomplete,
            complete,
        }
    }

    fn is_stale(&self, stamp: u64) -> bool {
        self.request_seq.load(Ordering::SeqCst) != stamp
    }

    fn set_phase(&self, phase: SyncPhase) {
        let _ = self.phase_tx.send(phase);
    }
}
