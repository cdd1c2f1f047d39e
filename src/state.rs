use crate::entry::{build_entries, clamp_count, normalize_date, EntryDraft};
use crate::errors::AppError;
use crate::insight::{InsightGenerator, InsightStatus};
use crate::logbook::LogBook;
use crate::models::{BulkEntryResponse, Category, CategoryMap, InventoryLog, Source};
use crate::session::Session;
use crate::storage::{load_logs, load_user, persist_logs, persist_user, DataPaths};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Everything a single user session mutates.
#[derive(Debug, Default)]
pub struct Workspace {
    pub logs: LogBook,
    pub draft: EntryDraft,
    pub session: Session,
}

#[derive(Clone)]
pub struct AppState {
    pub paths: DataPaths,
    pub workspace: Arc<Mutex<Workspace>>,
    pub insight: Arc<Mutex<InsightStatus>>,
    pub generator: InsightGenerator,
}

impl AppState {
    pub fn new(paths: DataPaths, workspace: Workspace, generator: InsightGenerator) -> Self {
        Self {
            paths,
            workspace: Arc::new(Mutex::new(workspace)),
            insight: Arc::new(Mutex::new(InsightStatus::default())),
            generator,
        }
    }

    /// Loads persisted state, seeding the baseline when there is none.
    pub async fn load(paths: DataPaths, generator: InsightGenerator) -> Self {
        let logs = load_logs(&paths.logs).await;
        let session = Session::new(load_user(&paths.user).await);
        let workspace = Workspace {
            logs,
            draft: EntryDraft::default(),
            session,
        };
        Self::new(paths, workspace, generator)
    }

    // Mutations are staged on a copy and only installed once the write succeeds.

    pub async fn login(&self, name: &str) -> Result<String, AppError> {
        let mut workspace = self.workspace.lock().await;
        let mut session = workspace.session.clone();
        if !session.login(name) {
            return Err(AppError::bad_request("name must not be empty"));
        }
        persist_user(&self.paths.user, session.user()).await?;
        let user = session.recorder();
        workspace.session = session;
        info!(user = %user, "logged in");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let mut workspace = self.workspace.lock().await;
        persist_user(&self.paths.user, None).await?;
        workspace.session.logout();
        Ok(())
    }

    /// Builds and stores entries for every positive count. Nothing is
    /// written when no count is positive.
    pub async fn submit_bulk(
        &self,
        date: &str,
        source: Source,
        counts: &CategoryMap<i64>,
    ) -> Result<BulkEntryResponse, AppError> {
        let date = normalize_date(date)?;
        let counts = CategoryMap::from_fn(|category| clamp_count(counts[category]));
        let mut workspace = self.workspace.lock().await;
        let entries = build_entries(&counts, &date, source, &workspace.session.recorder());
        self.store(&mut workspace, entries).await
    }

    /// Submits the pending draft; it is cleared only when something was added.
    pub async fn submit_draft(&self, date: &str, source: Source) -> Result<BulkEntryResponse, AppError> {
        let date = normalize_date(date)?;
        let mut workspace = self.workspace.lock().await;
        let entries = build_entries(
            workspace.draft.counts(),
            &date,
            source,
            &workspace.session.recorder(),
        );
        let response = self.store(&mut workspace, entries).await?;
        if response.added > 0 {
            workspace.draft.clear();
        }
        Ok(response)
    }

    pub async fn adjust_draft(&self, category: Category, delta: i64) -> CategoryMap<u64> {
        let mut workspace = self.workspace.lock().await;
        workspace.draft.adjust(category, delta);
        *workspace.draft.counts()
    }

    pub async fn set_draft(&self, category: Category, count: i64) -> CategoryMap<u64> {
        let mut workspace = self.workspace.lock().await;
        workspace.draft.set(category, count);
        *workspace.draft.counts()
    }

    pub async fn reset_logs(&self, confirmed: bool) -> Result<usize, AppError> {
        if !confirmed {
            return Err(AppError::bad_request(
                "reset discards every logged entry; resend with confirm=true",
            ));
        }
        let mut workspace = self.workspace.lock().await;
        let discarded = workspace.logs.len();
        let mut logs = workspace.logs.clone();
        logs.reset_to_baseline();
        persist_logs(&self.paths.logs, &logs).await?;
        workspace.logs = logs;
        info!(discarded, "log collection reset to baseline");
        Ok(workspace.logs.len())
    }

    /// Starts insight generation in the background. Only one job runs at a time.
    pub async fn start_insight(&self) -> Result<InsightStatus, AppError> {
        {
            let mut status = self.insight.lock().await;
            if status.is_pending() {
                return Err(AppError::conflict("insight generation already in progress"));
            }
            *status = InsightStatus::Pending;
        }

        let logs = self.workspace.lock().await.logs.logs().to_vec();
        let generator = self.generator.clone();
        let slot = Arc::clone(&self.insight);
        tokio::spawn(async move {
            let text = generator.generate(&logs).await;
            *slot.lock().await = InsightStatus::Ready {
                text,
                generated_at: Utc::now().to_rfc3339(),
            };
        });

        Ok(InsightStatus::Pending)
    }

    pub async fn insight_status(&self) -> InsightStatus {
        self.insight.lock().await.clone()
    }

    async fn store(
        &self,
        workspace: &mut Workspace,
        entries: Vec<InventoryLog>,
    ) -> Result<BulkEntryResponse, AppError> {
        if entries.is_empty() {
            return Ok(BulkEntryResponse { added: 0, entries });
        }
        let mut logs = workspace.logs.clone();
        let added = logs.submit(entries.clone());
        persist_logs(&self.paths.logs, &logs).await?;
        workspace.logs = logs;
        info!(added, "stored inventory entries");
        Ok(BulkEntryResponse { added, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{InsightError, SummaryProvider, FALLBACK_INSIGHT};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl SummaryProvider for Echo {
        async fn summarize(&self, prompt: &str) -> Result<String, InsightError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(format!("{} chars", prompt.len()))
        }
    }

    struct Down;

    #[async_trait]
    impl SummaryProvider for Down {
        async fn summarize(&self, _prompt: &str) -> Result<String, InsightError> {
            Err(InsightError::MissingApiKey)
        }
    }

    async fn state_with(provider: Arc<dyn SummaryProvider>) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(DataPaths::in_dir(dir.path()), InsightGenerator::new(provider)).await;
        (dir, state)
    }

    async fn wait_for_ready(state: &AppState) -> String {
        for _ in 0..100 {
            if let Some(text) = state.insight_status().await.text() {
                return text.to_string();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("insight never became ready");
    }

    #[tokio::test]
    async fn bulk_submit_prepends_and_persists() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        state.login("Jane").await.unwrap();

        let mut counts = CategoryMap::default();
        counts[Category::OfficeSale] = 5;
        counts[Category::DuplexRent] = -3;
        let response = state.submit_bulk("2024-06-01", Source::Owner, &counts).await.unwrap();
        assert_eq!(response.added, 1);
        assert_eq!(response.entries[0].recorded_by, "Jane");

        let reloaded = load_logs(&state.paths.logs).await;
        assert_eq!(reloaded, state.workspace.lock().await.logs);
        assert_eq!(reloaded.logs()[0].id, response.entries[0].id);
    }

    #[tokio::test]
    async fn all_zero_submit_leaves_everything_untouched() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        let before = state.workspace.lock().await.logs.clone();

        let response = state
            .submit_bulk("2024-06-01", Source::Broker, &CategoryMap::default())
            .await
            .unwrap();
        assert_eq!(response.added, 0);
        assert_eq!(state.workspace.lock().await.logs, before);
        assert!(!state.paths.logs.exists());
    }

    #[tokio::test]
    async fn invalid_date_is_rejected() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        let err = state
            .submit_bulk("yesterday", Source::Owner, &CategoryMap::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn draft_is_cleared_only_after_a_real_submit() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        assert_eq!(state.adjust_draft(Category::OfficeSale, -1).await[Category::OfficeSale], 0);

        let empty = state.submit_draft("2024-06-01", Source::Owner).await.unwrap();
        assert_eq!(empty.added, 0);

        state.adjust_draft(Category::ShowroomSale, 2).await;
        state.set_draft(Category::BunglowRent, 4).await;
        let response = state.submit_draft("2024-06-01", Source::Broker).await.unwrap();
        assert_eq!(response.added, 2);
        assert_eq!(response.entries[0].recorded_by, "Unknown");
        assert!(state.workspace.lock().await.draft.is_empty());
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        let mut counts = CategoryMap::default();
        counts[Category::PenthouseRent] = 1;
        state.submit_bulk("2024-06-01", Source::Owner, &counts).await.unwrap();

        assert!(state.reset_logs(false).await.is_err());
        assert_eq!(state.workspace.lock().await.logs.len(), 20);

        assert_eq!(state.reset_logs(true).await.unwrap(), 19);
        assert_eq!(state.workspace.lock().await.logs, LogBook::baseline());
        assert_eq!(load_logs(&state.paths.logs).await, LogBook::baseline());
    }

    #[tokio::test]
    async fn failed_writes_leave_state_untouched() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        state.login("Jane").await.unwrap();
        std::fs::create_dir_all(&state.paths.logs).unwrap();
        std::fs::remove_file(&state.paths.user).unwrap();
        std::fs::create_dir_all(&state.paths.user).unwrap();

        let mut counts = CategoryMap::default();
        counts[Category::OfficeSale] = 5;
        let err = state.submit_bulk("2024-06-01", Source::Owner, &counts).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.workspace.lock().await.logs, LogBook::baseline());

        state.set_draft(Category::DuplexRent, 2).await;
        assert!(state.submit_draft("2024-06-01", Source::Broker).await.is_err());
        {
            let workspace = state.workspace.lock().await;
            assert_eq!(workspace.logs, LogBook::baseline());
            assert_eq!(workspace.draft.counts()[Category::DuplexRent], 2);
        }

        assert!(state.login("Bob").await.is_err());
        assert!(state.logout().await.is_err());
        assert_eq!(state.workspace.lock().await.session.user(), Some("Jane"));
    }

    #[tokio::test]
    async fn reset_failure_keeps_submitted_entries() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        let mut counts = CategoryMap::default();
        counts[Category::ApartmentSale] = 4;
        state.submit_bulk("2024-06-01", Source::Owner, &counts).await.unwrap();
        let before = state.workspace.lock().await.logs.clone();

        std::fs::remove_file(&state.paths.logs).unwrap();
        std::fs::create_dir_all(&state.paths.logs).unwrap();
        assert!(state.reset_logs(true).await.is_err());
        assert_eq!(state.workspace.lock().await.logs, before);
        assert_eq!(before.len(), 20);
    }

    #[tokio::test]
    async fn login_state_survives_reload() {
        let (dir, state) = state_with(Arc::new(Down)).await;
        assert!(state.login("  ").await.is_err());
        state.login(" Jane ").await.unwrap();

        let reloaded = AppState::load(DataPaths::in_dir(dir.path()), state.generator.clone()).await;
        assert_eq!(reloaded.workspace.lock().await.session.user(), Some("Jane"));

        reloaded.logout().await.unwrap();
        let again = AppState::load(DataPaths::in_dir(dir.path()), state.generator.clone()).await;
        assert_eq!(again.workspace.lock().await.session.user(), None);
    }

    #[tokio::test]
    async fn insight_job_rejects_retrigger_while_pending() {
        let (_dir, state) = state_with(Arc::new(Echo)).await;
        assert_eq!(state.start_insight().await.unwrap(), InsightStatus::Pending);
        let err = state.start_insight().await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);

        // other operations stay available while the job runs
        let mut counts = CategoryMap::default();
        counts[Category::OfficeLease] = 2;
        assert_eq!(state.submit_bulk("2024-06-01", Source::Owner, &counts).await.unwrap().added, 1);

        assert!(wait_for_ready(&state).await.ends_with("chars"));
        assert!(state.start_insight().await.is_ok());
    }

    #[tokio::test]
    async fn insight_failure_still_produces_text() {
        let (_dir, state) = state_with(Arc::new(Down)).await;
        state.start_insight().await.unwrap();
        assert_eq!(wait_for_ready(&state).await, FALLBACK_INSIGHT);
    }
}
