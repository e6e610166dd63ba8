// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Cada variante tem um código estável
// que vira chave de tradução no I18nStore.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Etapa desconhecida: {0}")]
    UnknownStage(String),

    #[error("Transição de etapa não permitida: {from} -> {to}")]
    InvalidStageTransition { from: String, to: String },

    #[error("Lead não encontrado: {0}")]
    LeadNotFound(Uuid),

    #[error("Produto não encontrado: {0}")]
    ProductNotFound(Uuid),

    #[error("Documento não encontrado: {0}")]
    DocumentNotFound(String),

    #[error("Documento inválido: {0}")]
    InvalidDocument(String),

    #[error("Número já cadastrado: {0}")]
    PhoneAlreadyExists(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Falhas do banco hospedado
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Falhas do armazenamento de PDFs
    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código estável usado como chave de tradução.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::UnknownStage(_) => "unknown_stage",
            AppError::InvalidStageTransition { .. } => "invalid_stage_transition",
            AppError::LeadNotFound(_) => "lead_not_found",
            AppError::ProductNotFound(_) => "product_not_found",
            AppError::DocumentNotFound(_) => "document_not_found",
            AppError::InvalidDocument(_) => "invalid_document",
            AppError::PhoneAlreadyExists(_) => "phone_already_exists",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::UnknownStage(_)
            | AppError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidStageTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LeadNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PhoneAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        let params: Vec<(&str, String)> = match self {
            AppError::UnknownStage(stage) => vec![("stage", stage.clone())],
            AppError::InvalidStageTransition { from, to } => {
                vec![("from", from.clone()), ("to", to.clone())]
            }
            AppError::LeadNotFound(id) | AppError::ProductNotFound(id) => {
                vec![("id", id.to_string())]
            }
            AppError::DocumentNotFound(name) => vec![("name", name.clone())],
            AppError::PhoneAlreadyExists(phone) => vec![("phone", phone.clone())],
            _ => Vec::new(),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log, nunca na resposta.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), codes);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: store.translate_with(&locale.0, self.code(), &params),
            details,
        }
    }
}

// A resposta de erro que realmente sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
