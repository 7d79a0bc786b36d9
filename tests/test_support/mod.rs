#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use studyflow::api::dto::{
    AssignmentRow, AssignmentSections, CalendarPayload, DashboardHeader, DashboardPayload,
};
use studyflow::api::ApiGateway;
use studyflow::error::FetchError;
use studyflow::models::{
    AssignmentDraft, CalendarItem, Category, DashboardFilters, SemesterItem, Subject, User,
};
use studyflow::session::{Session, SessionStore};
use studyflow::DashboardSynchronizer;

enum Scripted {
    Serve(DashboardPayload),
    Fail { status: u16, message: String },
}

/// In-memory stand-in for the HTTP gateway. Dashboards and calendars are
/// scripted per semester id; every call is counted and recorded so tests can
/// assert on exactly what the synchronizer asked for.
pub struct FakeGateway {
    dashboards: Mutex<HashMap<i64, Scripted>>,
    calendars: Mutex<HashMap<i64, Vec<CalendarItem>>>,
    holds: Mutex<HashMap<i64, Arc<Notify>>>,
    calendar_down: AtomicBool,
    next_id: AtomicI64,
    dashboard_calls: AtomicUsize,
    calendar_calls: AtomicUsize,
    queries: Mutex<Vec<(i64, String)>>,
    ops: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dashboards: Mutex::new(HashMap::new()),
            calendars: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            calendar_down: AtomicBool::new(false),
            next_id: AtomicI64::new(100),
            dashboard_calls: AtomicUsize::new(0),
            calendar_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            ops: Mutex::new(Vec::new()),
        })
    }

    pub fn serve_dashboard(&self, sem_id: i64, payload: DashboardPayload) {
        self.dashboards
            .lock()
            .expect("dashboards lock")
            .insert(sem_id, Scripted::Serve(payload));
    }

    pub fn fail_dashboard(&self, sem_id: i64, status: u16, message: &str) {
        self.dashboards.lock().expect("dashboards lock").insert(
            sem_id,
            Scripted::Fail {
                status,
                message: message.to_string(),
            },
        );
    }

    pub fn serve_calendar(&self, sem_id: i64, items: Vec<CalendarItem>) {
        self.calendars
            .lock()
            .expect("calendars lock")
            .insert(sem_id, items);
    }

    pub fn fail_calendar_fetches(&self) {
        self.calendar_down.store(true, Ordering::SeqCst);
    }

    /// Parks every dashboard fetch for `sem_id` until `release_dashboard`.
    pub fn hold_dashboard(&self, sem_id: i64) {
        self.holds
            .lock()
            .expect("holds lock")
            .insert(sem_id, Arc::new(Notify::new()));
    }

    pub fn release_dashboard(&self, sem_id: i64) {
        if let Some(gate) = self.holds.lock().expect("holds lock").remove(&sem_id) {
            gate.notify_one();
        }
    }

    pub fn dashboard_fetches(&self) -> usize {
        self.dashboard_calls.load(Ordering::SeqCst)
    }

    pub fn calendar_fetches(&self) -> usize {
        self.calendar_calls.load(Ordering::SeqCst)
    }

    /// `(sem_id, filter query)` per dashboard fetch, oldest first.
    pub fn queries(&self) -> Vec<(i64, String)> {
        self.queries.lock().expect("queries lock").clone()
    }

    pub fn last_query(&self) -> (i64, String) {
        self.queries
            .lock()
            .expect("queries lock")
            .last()
            .cloned()
            .expect("at least one dashboard fetch")
    }

    pub fn recorded_ops(&self) -> Vec<String> {
        self.ops.lock().expect("ops lock").clone()
    }

    fn record(&self, op: String) {
        self.ops.lock().expect("ops lock").push(op);
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn resolve_user(&self, user_name: &str) -> Result<User, FetchError> {
        Ok(User {
            user_id: 1,
            user_name: user_name.to_string(),
        })
    }

    async fn create_semester(
        &self,
        _user_id: i64,
        sem_name: &str,
    ) -> Result<SemesterItem, FetchError> {
        let sem_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(format!("create_semester {sem_name}"));
        // the follow-up load has to find the new semester
        self.serve_dashboard(sem_id, payload(sem_id, sem_name));
        Ok(SemesterItem {
            sem_id,
            sem_name: sem_name.to_string(),
            current: false,
        })
    }

    async fn delete_semester(&self, sem_id: i64) -> Result<(), FetchError> {
        self.record(format!("delete_semester {sem_id}"));
        Ok(())
    }

    async fn fetch_dashboard(
        &self,
        _user_id: i64,
        sem_id: i64,
        filters: &DashboardFilters,
    ) -> Result<DashboardPayload, FetchError> {
        self.dashboard_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("queries lock")
            .push((sem_id, filters.to_query()));

        let gate = self.holds.lock().expect("holds lock").get(&sem_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.dashboards.lock().expect("dashboards lock").get(&sem_id) {
            Some(Scripted::Serve(payload)) => Ok(payload.clone()),
            Some(Scripted::Fail { status, message }) => Err(FetchError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Err(FetchError::Status {
                status: 404,
                message: format!("no semester {sem_id}"),
            }),
        }
    }

    async fn create_subject(&self, sem_id: i64, sub_name: &str) -> Result<Subject, FetchError> {
        let sub_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(format!("create_subject {sem_id} {sub_name}"));
        Ok(Subject {
            sub_id,
            sub_name: sub_name.to_string(),
        })
    }

    async fn delete_subject(&self, sub_id: i64) -> Result<(), FetchError> {
        self.record(format!("delete_subject {sub_id}"));
        Ok(())
    }

    async fn create_assignment(
        &self,
        sub_id: i64,
        draft: &AssignmentDraft,
    ) -> Result<(), FetchError> {
        self.record(format!("create_assignment {sub_id} {}", draft.assign_name));
        Ok(())
    }

    async fn update_assignment(
        &self,
        assign_id: i64,
        draft: &AssignmentDraft,
    ) -> Result<(), FetchError> {
        self.record(format!("update_assignment {assign_id} {}", draft.assign_name));
        Ok(())
    }

    async fn delete_assignment(&self, assign_id: i64) -> Result<(), FetchError> {
        self.record(format!("delete_assignment {assign_id}"));
        Ok(())
    }

    async fn set_complete(&self, assign_id: i64, complete: bool) -> Result<(), FetchError> {
        self.record(format!("set_complete {assign_id} {complete}"));
        Ok(())
    }

    async fn fetch_calendar(&self, sem_id: i64) -> Result<CalendarPayload, FetchError> {
        self.calendar_calls.fetch_add(1, Ordering::SeqCst);
        if self.calendar_down.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 500,
                message: "calendar unavailable".to_string(),
            });
        }
        let items = self
            .calendars
            .lock()
            .expect("calendars lock")
            .get(&sem_id)
            .cloned()
            .unwrap_or_default();
        Ok(CalendarPayload {
            user_name: Some("dana".to_string()),
            items,
        })
    }
}

/// Logs in against the fake and wires up a synchronizer whose session file
/// lives under `data_dir`.
pub async fn synchronizer(
    gateway: &Arc<FakeGateway>,
    data_dir: &Path,
) -> Arc<DashboardSynchronizer<FakeGateway>> {
    let store = SessionStore::new(data_dir);
    let session = Session::login(gateway.as_ref(), store, "dana")
        .await
        .expect("login against fake gateway");
    Arc::new(DashboardSynchronizer::new(gateway.clone(), Arc::new(session)))
}

/// Minimal dashboard for one semester: no subjects, no assignments, its own
/// entry in the semester menu.
pub fn payload(sem_id: i64, sem_name: &str) -> DashboardPayload {
    payload_with(
        sem_id,
        sem_name,
        Vec::new(),
        vec![sem_item(sem_id, sem_name, true)],
        Vec::new(),
        Vec::new(),
    )
}

pub fn payload_with(
    sem_id: i64,
    sem_name: &str,
    subjects: Vec<Subject>,
    semesters: Vec<SemesterItem>,
    incomplete: Vec<AssignmentRow>,
    complete: Vec<AssignmentRow>,
) -> DashboardPayload {
    DashboardPayload {
        dashboard: DashboardHeader {
            user_id: Some(1),
            user_name: Some("dana".to_string()),
            sem_id: Some(sem_id),
            sem_name: Some(sem_name.to_string()),
            subject_list: subjects,
        },
        semesters,
        sections: AssignmentSections {
            incomplete,
            complete,
        },
    }
}

pub fn sem_item(sem_id: i64, sem_name: &str, current: bool) -> SemesterItem {
    SemesterItem {
        sem_id,
        sem_name: sem_name.to_string(),
        current,
    }
}

pub fn subject(sub_id: i64, sub_name: &str) -> Subject {
    Subject {
        sub_id,
        sub_name: sub_name.to_string(),
    }
}

pub fn open_row(assign_id: i64, name: &str, due: &str, sub_id: Option<i64>) -> AssignmentRow {
    AssignmentRow {
        assign_id,
        assign_name: name.to_string(),
        due_date: due.to_string(),
        category: Category::Assignment,
        is_complete: 0,
        sub_id,
        sub_name: None,
        due_label: None,
    }
}

pub fn done_row(assign_id: i64, name: &str, due: &str, sub_id: Option<i64>) -> AssignmentRow {
    AssignmentRow {
        is_complete: 1,
        ..open_row(assign_id, name, due, sub_id)
    }
}

pub fn calendar_item(name: &str, due: &str, sub_name: &str, category: Category) -> CalendarItem {
    CalendarItem {
        sub_name: sub_name.to_string(),
        due_date: due.to_string(),
        assign_name: name.to_string(),
        category,
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
