// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadChanges, NewLead},
};

/// Acesso à tabela de leads. O painel não tem transação nem controle de versão:
/// a última escrita vence, coluna a coluna.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Lead>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError>;
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError>;
    /// Grava só as colunas de `changes`; as demais ficam como estão no banco.
    async fn update(&self, changes: &LeadChanges) -> Result<(), AppError>;
}

// A coluna "Oportunidade" foi criada com maiúscula no banco hospedado
const LEAD_COLUMNS: &str = r#"
    id, numero, nome_whatsapp, nome_completo, qualificacao, renda, resumo, cpf,
    pausar_ia, valor_proposta, forma_pagamento, produto_proposta, prazo_instalacao,
    info_proposta, pdf_url, motivo_rejeicao, "Oportunidade" AS oportunidade,
    criado_em, ultima_mensagem
"#;

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_phone(e: sqlx::Error, phone: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::PhoneAlreadyExists(phone.to_string());
        }
    }
    e.into()
}

#[async_trait]
impl LeadStore for LeadRepository {
    // A ordenação fica no serviço: `criado_em` é texto e ORDER BY seria lexicográfico
    async fn fetch_all(&self) -> Result<Vec<Lead>, AppError> {
        let query = format!("SELECT {} FROM usuarios", LEAD_COLUMNS);
        let leads = sqlx::query_as::<_, Lead>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(leads)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let query = format!("SELECT {} FROM usuarios WHERE id = $1", LEAD_COLUMNS);
        let lead = sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let query = format!(
            r#"
            INSERT INTO usuarios (
                numero, nome_completo, nome_whatsapp, qualificacao, renda, resumo, cpf,
                pausar_ia, valor_proposta, forma_pagamento, produto_proposta,
                prazo_instalacao, info_proposta, criado_em
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(&lead.phone)
            .bind(&lead.full_name)
            .bind(&lead.whatsapp_name)
            .bind(&lead.qualification)
            .bind(&lead.income)
            .bind(&lead.summary)
            .bind(&lead.tax_id)
            .bind(&lead.ai_paused)
            .bind(&lead.proposal_value)
            .bind(&lead.payment_method)
            .bind(&lead.proposal_product)
            .bind(&lead.installation_lead_time)
            .bind(&lead.proposal_notes)
            .bind(&lead.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_phone(e, &lead.phone))
    }

    async fn update(&self, changes: &LeadChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }

        // Só as colunas alteradas: o que a integração do WhatsApp gravou no meio fica intacto
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE usuarios SET ");
        let mut assignments = builder.separated(", ");
        for (column, value) in &changes.fields {
            assignments.push(format!("{} = ", column.sql_name()));
            assignments.push_bind_unseparated(value.clone());
        }
        builder.push(" WHERE id = ").push_bind(changes.id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_phone(e, changes.phone().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::LeadNotFound(changes.id));
        }
        Ok(())
    }
}
