// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    // Importamos os models para referenciar no Swagger
    models::{
        dashboard::{ChartQuery, DailyLeadCount, DashboardSummary, ProposalChartEntry, RescueOverview},
        pipeline::StageCounts,
    },
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do topo do painel", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .summary()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/stages
#[utoipa::path(
    get,
    path = "/api/dashboard/stages",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagem por etapa e não classificados", body = StageCounts)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stage_counts(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let counts = app_state
        .dashboard_service
        .stage_counts()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(counts)))
}

// GET /api/dashboard/leads-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/leads-chart",
    tag = "Dashboard",
    params(ChartQuery),
    responses(
        (status = 200, description = "Leads criados por dia, do mais antigo ao mais novo", body = Vec<DailyLeadCount>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_leads_chart(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let chart = app_state
        .dashboard_service
        .leads_chart(query.days)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chart)))
}

// GET /api/dashboard/proposals-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/proposals-chart",
    tag = "Dashboard",
    params(ChartQuery),
    responses(
        (status = 200, description = "Propostas enviadas, vendas e rejeições por dia", body = Vec<ProposalChartEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_proposals_chart(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let chart = app_state
        .dashboard_service
        .proposals_chart(query.days)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chart)))
}

// GET /api/rescue
#[utoipa::path(
    get,
    path = "/api/rescue",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Follow-up pendente e oportunidades de resgate", body = RescueOverview)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_rescue(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .dashboard_service
        .rescue_overview()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}
