use crate::errors::AppError;
use crate::insight::InsightStatus;
use crate::logbook::export_file_name;
use crate::models::{
    BulkEntryRequest, BulkEntryResponse, CategoryMap, CategoryTotal, DailyAggregation,
    DashboardResponse, DraftAdjustForm, DraftAdjustRequest, DraftSetForm, DraftSetRequest,
    DraftSubmitForm, DraftSubmitRequest, InventoryLog, LoginForm, LoginRequest, ResetForm,
    ResetRequest, SessionResponse, Source,
};
use crate::state::AppState;
use crate::stats::{build_dashboard, daily_aggregation, source_totals, totals_by_category};
use crate::ui::{render_index, render_login};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use chrono::{Local, Utc};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let insight = state.insight_status().await;
    let workspace = state.workspace.lock().await;
    let Some(user) = workspace.session.user() else {
        return Html(render_login());
    };
    let dashboard = build_dashboard(workspace.logs.logs());
    Html(render_index(
        user,
        &today_string(),
        &dashboard,
        &workspace,
        &insight,
    ))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let workspace = state.workspace.lock().await;
    Json(SessionResponse {
        user: workspace.session.user().map(str::to_string),
    })
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state.login(&payload.name).await?;
    Ok(Json(SessionResponse { user: Some(user) }))
}

pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    state.logout().await?;
    Ok(Json(SessionResponse { user: None }))
}

pub async fn get_logs(State(state): State<AppState>) -> Json<Vec<InventoryLog>> {
    let workspace = state.workspace.lock().await;
    Json(workspace.logs.logs().to_vec())
}

pub async fn bulk_submit(
    State(state): State<AppState>,
    Json(payload): Json<BulkEntryRequest>,
) -> Result<Json<BulkEntryResponse>, AppError> {
    let response = state
        .submit_bulk(&payload.date, payload.source, &payload.counts)
        .await?;
    Ok(Json(response))
}

pub async fn get_draft(State(state): State<AppState>) -> Json<CategoryMap<u64>> {
    let workspace = state.workspace.lock().await;
    Json(*workspace.draft.counts())
}

pub async fn adjust_draft(
    State(state): State<AppState>,
    Json(payload): Json<DraftAdjustRequest>,
) -> Json<CategoryMap<u64>> {
    Json(state.adjust_draft(payload.category, payload.delta).await)
}

pub async fn set_draft(
    State(state): State<AppState>,
    Json(payload): Json<DraftSetRequest>,
) -> Json<CategoryMap<u64>> {
    Json(state.set_draft(payload.category, payload.count).await)
}

pub async fn submit_draft(
    State(state): State<AppState>,
    Json(payload): Json<DraftSubmitRequest>,
) -> Result<Json<BulkEntryResponse>, AppError> {
    let date = payload.date.unwrap_or_else(today_string);
    let response = state.submit_draft(&date, payload.source).await?;
    Ok(Json(response))
}

pub async fn reset_logs(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<Vec<InventoryLog>>, AppError> {
    state.reset_logs(payload.confirm).await?;
    let workspace = state.workspace.lock().await;
    Ok(Json(workspace.logs.logs().to_vec()))
}

pub async fn get_totals(State(state): State<AppState>) -> Json<CategoryMap<u64>> {
    let workspace = state.workspace.lock().await;
    Json(totals_by_category(workspace.logs.logs()))
}

pub async fn get_source_totals(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<Vec<CategoryTotal>>, AppError> {
    let source: Source = source.parse()?;
    let workspace = state.workspace.lock().await;
    Ok(Json(source_totals(workspace.logs.logs(), source)))
}

pub async fn get_daily(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<Vec<DailyAggregation>>, AppError> {
    let source: Source = source.parse()?;
    let workspace = state.workspace.lock().await;
    Ok(Json(daily_aggregation(workspace.logs.logs(), source)))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let workspace = state.workspace.lock().await;
    Json(build_dashboard(workspace.logs.logs()))
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.workspace.lock().await.logs.to_csv();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now())
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

pub async fn start_insight(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<InsightStatus>), AppError> {
    let status = state.start_insight().await?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

pub async fn get_insight(State(state): State<AppState>) -> Json<InsightStatus> {
    Json(state.insight_status().await)
}

pub async fn login_form(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    state.login(&form.name).await?;
    Ok(Redirect::to("/"))
}

pub async fn logout_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.logout().await?;
    Ok(Redirect::to("/"))
}

pub async fn adjust_draft_form(
    State(state): State<AppState>,
    Form(form): Form<DraftAdjustForm>,
) -> Redirect {
    state.adjust_draft(form.category, form.delta).await;
    Redirect::to("/")
}

pub async fn set_draft_form(
    State(state): State<AppState>,
    Form(form): Form<DraftSetForm>,
) -> Redirect {
    state.set_draft(form.category, form.count_value()).await;
    Redirect::to("/")
}

pub async fn submit_draft_form(
    State(state): State<AppState>,
    Form(form): Form<DraftSubmitForm>,
) -> Result<Redirect, AppError> {
    let date = if form.date.trim().is_empty() {
        today_string()
    } else {
        form.date
    };
    state.submit_draft(&date, form.source).await?;
    Ok(Redirect::to("/"))
}

pub async fn reset_form(
    State(state): State<AppState>,
    Form(form): Form<ResetForm>,
) -> Result<Redirect, AppError> {
    state.reset_logs(form.confirm.is_some()).await?;
    Ok(Redirect::to("/"))
}

pub async fn insight_form(State(state): State<AppState>) -> Redirect {
    // A job already running is fine here; the page shows its progress.
    let _ = state.start_insight().await;
    Redirect::to("/#insights")
}

pub(crate) fn today_string() -> String {
    Local::now().date_naive().to_string()
}
