// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

/// Disponibilidade da placa no catálogo (coluna `status`, texto).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Disponivel,
    Indisponivel,
    SobEncomenda,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Disponivel => "disponivel",
            ProductStatus::Indisponivel => "indisponivel",
            ProductStatus::SobEncomenda => "sob_encomenda",
        }
    }
}

// A coluna é texto livre; valor desconhecido não pode derrubar a listagem.
impl TryFrom<String> for ProductStatus {
    type Error = std::convert::Infallible;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Ok(match raw.trim().to_lowercase().replace(' ', "_").as_str() {
            "disponivel" | "disponível" => ProductStatus::Disponivel,
            "sob_encomenda" => ProductStatus::SobEncomenda,
            _ => ProductStatus::Indisponivel,
        })
    }
}

// --- Structs ---

/// Placa solar do catálogo (tabela `placas_solares`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarPanel {
    pub id: Uuid,
    #[sqlx(rename = "modelo")]
    #[schema(example = "Canadian Solar 550W")]
    pub model: String,
    #[sqlx(rename = "especs")]
    pub specs: Option<String>,
    #[sqlx(rename = "eficiencia")]
    #[schema(example = "21,3%")]
    pub efficiency: Option<String>,
    #[sqlx(rename = "dimensao")]
    pub dimensions: Option<String>,
    #[sqlx(rename = "garantia")]
    pub warranty: Option<String>,
    #[sqlx(rename = "aceita_financiamento")]
    pub accepts_financing: bool,
    #[sqlx(rename = "preco_por_placa")]
    pub price_per_panel: Option<Decimal>,
    #[sqlx(rename = "pacote_5_placas")]
    pub pack_5: Option<Decimal>,
    #[sqlx(rename = "pacote_10_placas")]
    pub pack_10: Option<Decimal>,
    #[sqlx(rename = "pacote_20_placas")]
    pub pack_20: Option<Decimal>,
    #[sqlx(rename = "modelo_instalacao")]
    pub installation_model: Option<String>,
    #[sqlx(rename = "prazo")]
    pub lead_time: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProductStatus,
    #[sqlx(rename = "quantidade_estoque")]
    pub stock_quantity: i32,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("negative_value".into());
        return Err(err);
    }
    Ok(())
}

/// Cadastro e edição usam o mesmo corpo: o drawer sempre envia o produto inteiro.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Canadian Solar 550W")]
    pub model: String,
    pub specs: Option<String>,
    pub efficiency: Option<String>,
    pub dimensions: Option<String>,
    pub warranty: Option<String>,
    #[serde(default)]
    pub accepts_financing: bool,
    #[validate(custom(function = "validate_not_negative"))]
    pub price_per_panel: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub pack_5: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub pack_10: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub pack_20: Option<Decimal>,
    pub installation_model: Option<String>,
    pub lead_time: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[validate(range(min = 0, message = "negative_value"))]
    #[serde(default)]
    pub stock_quantity: i32,
}
