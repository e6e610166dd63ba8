// src/db/product_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{ProductPayload, SolarPanel},
};

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<SolarPanel>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SolarPanel>, AppError>;
    async fn insert(&self, product: &ProductPayload) -> Result<SolarPanel, AppError>;
    async fn update(&self, id: Uuid, product: &ProductPayload) -> Result<Option<SolarPanel>, AppError>;
    /// `false` quando o id não existe.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

const PRODUCT_COLUMNS: &str = r#"
    id, modelo, especs, eficiencia, dimensao, garantia, aceita_financiamento,
    preco_por_placa, pacote_5_placas, pacote_10_placas, pacote_20_placas,
    modelo_instalacao, prazo, status, quantidade_estoque
"#;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn fetch_all(&self) -> Result<Vec<SolarPanel>, AppError> {
        let query = format!("SELECT {} FROM placas_solares ORDER BY modelo", PRODUCT_COLUMNS);
        let products = sqlx::query_as::<_, SolarPanel>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SolarPanel>, AppError> {
        let query = format!("SELECT {} FROM placas_solares WHERE id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, SolarPanel>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn insert(&self, p: &ProductPayload) -> Result<SolarPanel, AppError> {
        let query = format!(
            r#"
            INSERT INTO placas_solares (
                modelo, especs, eficiencia, dimensao, garantia, aceita_financiamento,
                preco_por_placa, pacote_5_placas, pacote_10_placas, pacote_20_placas,
                modelo_instalacao, prazo, status, quantidade_estoque
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, SolarPanel>(&query)
            .bind(&p.model)
            .bind(&p.specs)
            .bind(&p.efficiency)
            .bind(&p.dimensions)
            .bind(&p.warranty)
            .bind(p.accepts_financing)
            .bind(p.price_per_panel)
            .bind(p.pack_5)
            .bind(p.pack_10)
            .bind(p.pack_20)
            .bind(&p.installation_model)
            .bind(&p.lead_time)
            .bind(p.status.as_str())
            .bind(p.stock_quantity)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update(&self, id: Uuid, p: &ProductPayload) -> Result<Option<SolarPanel>, AppError> {
        let query = format!(
            r#"
            UPDATE placas_solares SET
                modelo = $2, especs = $3, eficiencia = $4, dimensao = $5, garantia = $6,
                aceita_financiamento = $7, preco_por_placa = $8, pacote_5_placas = $9,
                pacote_10_placas = $10, pacote_20_placas = $11, modelo_instalacao = $12,
                prazo = $13, status = $14, quantidade_estoque = $15
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, SolarPanel>(&query)
            .bind(id)
            .bind(&p.model)
            .bind(&p.specs)
            .bind(&p.efficiency)
            .bind(&p.dimensions)
            .bind(&p.warranty)
            .bind(p.accepts_financing)
            .bind(p.price_per_panel)
            .bind(p.pack_5)
            .bind(p.pack_10)
            .bind(p.pack_20)
            .bind(&p.installation_model)
            .bind(&p.lead_time)
            .bind(p.status.as_str())
            .bind(p.stock_quantity)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM placas_solares WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

