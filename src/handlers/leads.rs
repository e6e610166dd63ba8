// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        lead::{CreateLeadPayload, Lead, LeadSearchQuery, MoveStagePayload, NormalizationReport, UpdateLeadPayload},
        pipeline::KanbanBoard,
    },
    services::{classifier::parse_stage, lead_board::LeadCommand},
};

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadSearchQuery),
    responses(
        (status = 200, description = "Leads do mais novo para o mais antigo", body = Vec<Lead>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<LeadSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .lead_service
        .list(query.search.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leads)))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos ou etapa desconhecida"),
        (status = 409, description = "Número já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .create_lead(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Lead {} cadastrado por {}", lead.id, user.label());
    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead salvo", body = Lead),
        (status = 400, description = "Dados inválidos ou etapa desconhecida"),
        (status = 404, description = "Lead não encontrado"),
        (status = 422, description = "Transição de etapa não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .execute(LeadCommand::Update { id, changes: payload })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Lead {} salvo por {}", id, user.label());
    Ok((StatusCode::OK, Json(lead)))
}

// PATCH /api/leads/{id}/stage
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/stage",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = MoveStagePayload,
    responses(
        (status = 200, description = "Lead movido de coluna", body = Lead),
        (status = 400, description = "Etapa desconhecida"),
        (status = 422, description = "Transição de etapa não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveStagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let stage = parse_stage(&payload.stage)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .execute(LeadCommand::MoveStage { id, stage })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Lead {} movido para '{}' por {}", id, stage, user.label());
    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/normalize
#[utoipa::path(
    post,
    path = "/api/leads/normalize",
    tag = "Leads",
    responses(
        (status = 200, description = "Qualificações reescritas com os rótulos canônicos", body = NormalizationReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn normalize_qualifications(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Normalização de qualificações iniciada por {}", user.label());

    let report = app_state
        .lead_service
        .normalize_qualifications()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/kanban
#[utoipa::path(
    get,
    path = "/api/kanban",
    tag = "Leads",
    responses(
        (status = 200, description = "Colunas do funil na ordem declarada", body = KanbanBoard)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_kanban(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let board = app_state
        .lead_service
        .kanban()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(board)))
}
