use crate::errors::SyncError;
use crate::models::{SheetConfig, Student, StudentDraft, View};
use crate::sync::FetchOutcome;
use crate::table::remove_student;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Issued when a fetch starts; only the latest ticket may land its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub url: Option<String>,
}

/// Authoritative session state: records, active view and the endpoint.
///
/// Local edits apply immediately. A successful remote fetch replaces the
/// whole collection, so a record added since the last fetch stays visible
/// only until the next fetch lands (the reconciliation window).
#[derive(Debug, Clone, Default)]
pub struct Shell {
    students: Vec<Student>,
    view: View,
    config: SheetConfig,
    loading: bool,
    latest_fetch: u64,
}

impl Shell {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_fetch += 1;
        let url = self.config.endpoint().map(str::to_string);
        self.loading = url.is_some();
        FetchTicket {
            seq: self.latest_fetch,
            url,
        }
    }

    /// Lands a fetch result. Returns `false` if a newer fetch was started
    /// in the meantime; the result is dropped and the loading flag stays.
    pub fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<FetchOutcome, SyncError>,
    ) -> bool {
        if ticket.seq != self.latest_fetch {
            info!(seq = ticket.seq, latest = self.latest_fetch, "dropping stale fetch result");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(FetchOutcome::Records(students)) => {
                info!(count = students.len(), "loaded students from sheet");
                self.students = students;
            }
            Ok(FetchOutcome::NotAList) => warn!("sheet response is not a list; keeping current data"),
            Ok(FetchOutcome::Skipped) => {}
            Err(err) => warn!("failed to load students from sheet: {err}"),
        }
        true
    }

    /// Prepends a finished record and switches to the list.
    pub fn add(&mut self, draft: StudentDraft, now: DateTime<Utc>) -> Student {
        let student = Student::from_draft(draft, now);
        self.students.insert(0, student.clone());
        self.view = View::List;
        student
    }

    /// Local-only removal; the sheet keeps its row.
    pub fn delete(&mut self, id: &str) -> bool {
        remove_student(&mut self.students, id)
    }

    /// Replaces the endpoint and returns to the entry view. Returns whether
    /// the endpoint actually changed.
    pub fn save_settings(&mut self, config: SheetConfig) -> bool {
        let changed = self.config != config;
        self.config = config;
        self.view = View::Entry;
        changed
    }
}
