use crate::config::local_offset;
use crate::errors::AppError;
use crate::insight::{InsightPanel, InsightStep, InsightTicket, TextGenerator};
use crate::models::{AnalyticsResponse, SheetConfig, StatusResponse, Student, StudentDraft};
use crate::shell::{FetchTicket, Shell};
use crate::stats::{build_summary, class_stats};
use crate::storage::persist_settings;
use crate::sync::{AppendOutcome, SyncClient};
use chrono::{FixedOffset, Utc};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub settings_path: PathBuf,
    pub shell: Arc<Mutex<Shell>>,
    pub insight: Arc<Mutex<InsightPanel>>,
    pub sync: SyncClient,
    pub generator: Arc<dyn TextGenerator>,
    pub reconcile_delay: Duration,
    pub display_offset: FixedOffset,
}

impl AppState {
    pub fn new(
        settings_path: PathBuf,
        config: SheetConfig,
        sync: SyncClient,
        generator: Arc<dyn TextGenerator>,
        reconcile_delay: Duration,
    ) -> Self {
        Self {
            settings_path,
            shell: Arc::new(Mutex::new(Shell::new(config))),
            insight: Arc::new(Mutex::new(InsightPanel::default())),
            sync,
            generator,
            reconcile_delay,
            display_offset: local_offset(),
        }
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    /// Fetches the full collection and waits for it to land.
    pub async fn refresh(&self) {
        let ticket = self.shell.lock().await.begin_fetch();
        self.run_fetch(ticket).await;
    }

    /// Marks the shell as loading right away and fetches in the background.
    pub async fn trigger_refresh(&self) {
        let ticket = self.shell.lock().await.begin_fetch();
        let state = self.clone();
        tokio::spawn(async move { state.run_fetch(ticket).await });
    }

    async fn run_fetch(&self, ticket: FetchTicket) {
        let outcome = self.sync.fetch_all(ticket.url.as_deref()).await;
        self.shell.lock().await.finish_fetch(&ticket, outcome);
    }

    /// Applies the new record locally, then forwards it to the sheet and
    /// schedules a reconciliation fetch.
    pub async fn add_student(&self, draft: StudentDraft) -> Student {
        let (student, endpoint) = {
            let mut shell = self.shell.lock().await;
            let student = shell.add(draft, Utc::now());
            (student, shell.config().endpoint().map(str::to_string))
        };
        info!(id = %student.id, class = %student.class_name, "student added");

        if let Some(url) = endpoint {
            let state = self.clone();
            let pushed = student.clone();
            tokio::spawn(async move { state.push_and_reconcile(pushed, url).await });
        }

        student
    }

    async fn push_and_reconcile(&self, student: Student, url: String) {
        match self.sync.append_one(Some(&url), &student).await {
            AppendOutcome::Skipped => return,
            AppendOutcome::Unknown => debug!(id = %student.id, "append outcome unknown; reconciling"),
            AppendOutcome::Failed(reason) => {
                warn!(id = %student.id, "failed to send student to sheet: {reason}");
                return;
            }
        }

        tokio::time::sleep(self.reconcile_delay).await;

        let ticket = {
            let mut shell = self.shell.lock().await;
            if shell.config().endpoint() != Some(url.as_str()) {
                debug!("endpoint changed since append; skipping reconciliation");
                return;
            }
            shell.begin_fetch()
        };
        self.run_fetch(ticket).await;
    }

    pub async fn delete_student(&self, id: &str) -> bool {
        let removed = self.shell.lock().await.delete(id);
        if removed {
            info!(%id, "student removed locally");
        }
        removed
    }

    pub async fn save_settings(&self, config: SheetConfig) -> Result<(), AppError> {
        persist_settings(&self.settings_path, &config).await?;
        let changed = self.shell.lock().await.save_settings(config);
        if changed {
            info!("sheet endpoint updated");
            self.trigger_refresh().await;
        }
        Ok(())
    }

    pub async fn status(&self) -> StatusResponse {
        let shell = self.shell.lock().await;
        StatusResponse {
            loading: shell.is_loading(),
            view: shell.view(),
            student_count: shell.students().len(),
            endpoint_configured: shell.config().endpoint().is_some(),
        }
    }

    /// Builds the analytics view and starts a new AI summary if the record
    /// count moved since the last one.
    pub async fn analytics(&self) -> AnalyticsResponse {
        let students = self.shell.lock().await.students().to_vec();
        let classes = class_stats(&students);
        let summary = build_summary(&students, &classes);

        let step = self.insight.lock().await.request(&students);
        if let InsightStep::Generate(ticket) = step {
            let state = self.clone();
            tokio::spawn(async move { state.generate_insight(ticket).await });
        }

        AnalyticsResponse {
            summary,
            classes,
            insight: self.insight.lock().await.view(),
        }
    }

    async fn generate_insight(&self, ticket: InsightTicket) {
        let result = self.generator.generate(&ticket.prompt).await;
        if let Err(err) = &result {
            error!("AI insight failed: {err}");
        }
        if !self.insight.lock().await.complete(ticket.seq, result) {
            debug!(seq = ticket.seq, "dropping stale AI insight");
        }
    }
}
