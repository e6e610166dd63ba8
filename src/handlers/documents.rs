// src/handlers/documents.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    services::document_service::StoredDocument,
};

// POST /api/documents/proposals/{lead_id}
// Corpo: o PDF cru (Content-Type: application/pdf)
#[utoipa::path(
    post,
    path = "/api/documents/proposals/{lead_id}",
    tag = "Documents",
    params(("lead_id" = Uuid, Path, description = "ID do lead")),
    request_body(content = Vec<u8>, content_type = "application/pdf"),
    responses(
        (status = 201, description = "PDF armazenado", body = StoredDocument),
        (status = 400, description = "Arquivo vazio, grande demais ou não é PDF"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_proposal(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(lead_id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // O arquivo sempre pertence a um lead existente
    app_state
        .lead_service
        .get(lead_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .document_service
        .upload_proposal(lead_id, &body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(document)))
}

// GET /api/documents/{file_name}
#[utoipa::path(
    get,
    path = "/api/documents/{file_name}",
    tag = "Documents",
    params(("file_name" = String, Path, description = "Nome do arquivo")),
    responses(
        (status = 200, description = "Conteúdo do PDF", content_type = "application/pdf"),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = app_state
        .document_service
        .fetch(&file_name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/pdf")], bytes))
}

// DELETE /api/documents/{file_name}
#[utoipa::path(
    delete,
    path = "/api/documents/{file_name}",
    tag = "Documents",
    params(("file_name" = String, Path, description = "Nome do arquivo")),
    responses(
        (status = 204, description = "Documento removido"),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .document_service
        .delete(&file_name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
