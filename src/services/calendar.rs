use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{
    clip_display, Assignment, CalendarItem, Category, DashboardSnapshot,
};
use crate::utils::dates;

/// Deadlines render one day after the stored due day. Presentation
/// convention, not a data correction.
const DISPLAY_OFFSET_DAYS: i64 = 1;

const GRID_CELLS: i64 = 42;

/// One cell of the 6x7 month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// One rendered calendar record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub name: String,
    pub category: Category,
    pub subject_name: String,
    pub is_complete: bool,
}

impl CalendarEntry {
    fn from_assignment(assignment: &Assignment) -> Self {
        Self {
            name: assignment.assign_name.clone(),
            category: assignment.category,
            subject_name: assignment
                .sub_name
                .clone()
                .unwrap_or_else(|| "(subject#?)".to_string()),
            is_complete: assignment.is_complete,
        }
    }

    // Fetched rows carry no completion flag; treat them as open work.
    fn from_item(item: &CalendarItem) -> Self {
        Self {
            name: item.assign_name.clone(),
            category: item.category,
            subject_name: clip_display(&item.sub_name),
            is_complete: false,
        }
    }
}

/// 42 consecutive dates starting on the Sunday on/before the first of the
/// reference month, so the month is always fully covered with leading and
/// trailing days marked out-of-month.
pub fn month_grid(reference: NaiveDate) -> Vec<GridDay> {
    let first = reference.with_day(1).unwrap_or(reference);
    let back = i64::from(first.weekday().num_days_from_sunday());
    let start = first - Duration::days(back);
    (0..GRID_CELLS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            GridDay {
                date,
                in_month: date.month() == reference.month() && date.year() == reference.year(),
            }
        })
        .collect()
}

fn bucket_key(due_text: &str) -> Option<String> {
    let day = dates::extract_day(due_text)?;
    dates::shift_day(&day, DISPLAY_OFFSET_DAYS)
}

/// Month view: the grid plus day-keyed entry buckets. Buckets preserve
/// source order and are rebuilt in full on every call.
#[derive(Debug, Default)]
pub struct CalendarView {
    pub grid: Vec<GridDay>,
    pub buckets: HashMap<String, Vec<CalendarEntry>>,
}

impl CalendarView {
    pub fn on(&self, date: NaiveDate) -> &[CalendarEntry] {
        self.buckets
            .get(&dates::day_string(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Holds the optional dedicated calendar fetch for the active semester.
/// When present (and for the same semester as the snapshot) it takes
/// precedence over the snapshot union of both partitions.
#[derive(Debug, Default)]
pub struct CalendarAggregator {
    fetched: Option<(i64, Vec<CalendarItem>)>,
}

impl CalendarAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fetched(&mut self, sem_id: i64, items: Vec<CalendarItem>) {
        self.fetched = Some((sem_id, items));
    }

    /// Drops the fetched list. Must run on every semester switch; subject
    /// and assignment ids do not carry across semesters.
    pub fn invalidate(&mut self) {
        self.fetched = None;
    }

    pub fn has_fetch_for(&self, sem_id: i64) -> bool {
        matches!(&self.fetched, Some((sem, _)) if *sem == sem_id)
    }

    pub fn view(&self, reference: NaiveDate, snapshot: Option<&DashboardSnapshot>) -> CalendarView {
        let grid = month_grid(reference);
        let mut buckets: HashMap<String, Vec<CalendarEntry>> = HashMap::new();

        let fetched = self
            .fetched
            .as_ref()
            .filter(|(sem_id, _)| snapshot.map_or(true, |s| s.sem_id == *sem_id));

        if let Some((_, items)) = fetched {
            for item in items {
                match bucket_key(&item.due_date) {
                    Some(key) => buckets
                        .entry(key)
                        .or_default()
                        .push(CalendarEntry::from_item(item)),
                    None => log::debug!("calendar: no due day in {:?}", item.due_date),
                }
            }
        } else if let Some(snapshot) = snapshot {
            for assignment in snapshot.all_assignments() {
                match bucket_key(&assignment.due_date) {
                    Some(key) => buckets
                        .entry(key)
                        .or_default()
                        .push(CalendarEntry::from_assignment(assignment)),
                    None => log::debug!("calendar: no due day in {:?}", assignment.due_date),
                }
            }
        }

        CalendarView { grid, buckets }
    }
}
