// src/handlers/proposals.rs

use axum::{
    extract::{Path, State},
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
        dashboard::ProposalsOverview,
        lead::{ChargePayload, Lead, ProposalPayload, RejectProposalPayload, SalePayload},
    },
    services::lead_board::LeadCommand,
};

// GET /api/proposals
#[utoipa::path(
    get,
    path = "/api/proposals",
    tag = "Proposals",
    responses(
        (status = 200, description = "Propostas enviadas e as que estão sem resposta", body = ProposalsOverview)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .dashboard_service
        .proposals_overview()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/proposals/candidates
#[utoipa::path(
    get,
    path = "/api/proposals/candidates",
    tag = "Proposals",
    responses(
        (status = 200, description = "Leads que ainda podem receber proposta", body = Vec<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_candidates(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .dashboard_service
        .proposal_candidates()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leads)))
}

// POST /api/proposals/{id}
#[utoipa::path(
    post,
    path = "/api/proposals/{id}",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = ProposalPayload,
    responses(
        (status = 200, description = "Proposta registrada; lead em 'Proposta Enviada'", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 422, description = "Transição de etapa não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_proposal(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProposalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .execute(LeadCommand::RegisterProposal { id, proposal: payload })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Proposta do lead {} registrada por {}", id, user.label());
    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/proposals/{id}/charges
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/charges",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = ChargePayload,
    responses(
        (status = 200, description = "Cobrança anotada na proposta", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChargePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .execute(LeadCommand::RecordCharge { id, charge: payload })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Cobrança do lead {} registrada por {}", id, user.label());
    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/proposals/{id}/reject
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/reject",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = RejectProposalPayload,
    responses(
        (status = 200, description = "Proposta marcada como rejeitada", body = Lead),
        (status = 422, description = "Transição de etapa não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_proposal(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectProposalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .execute(LeadCommand::RejectProposal { id, reason: payload.reason })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Proposta do lead {} rejeitada (registro de {})", id, user.label());
    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/proposals/{id}/sale
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/sale",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = SalePayload,
    responses(
        (status = 200, description = "Venda registrada para o lead", body = Lead),
        (status = 422, description = "Transição de etapa não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .execute(LeadCommand::RegisterSale { id, sale: payload })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Venda do lead {} registrada por {}", id, user.label());
    Ok((StatusCode::OK, Json(lead)))
}
