// src/models/lead.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::dates::{parse_lead_date, parse_lead_timestamp};
use crate::models::pipeline::PipelineStage;
use crate::services::classifier;

// Valor gravado em `pausar_ia` para leads criados pelo painel
pub const AI_NOT_PAUSED: &str = "Não";

// =========================================================================
//  LEAD (tabela `usuarios`)
// =========================================================================

/// Um lead como está no banco hospedado.
/// As colunas têm nomes em português e as datas são texto local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    #[sqlx(rename = "numero")]
    #[schema(example = "5511999990000")]
    pub phone: String,
    #[sqlx(rename = "nome_whatsapp")]
    pub whatsapp_name: Option<String>,
    #[sqlx(rename = "nome_completo")]
    pub full_name: Option<String>,

    // Texto livre; a etapa sai daqui via classificador
    #[sqlx(rename = "qualificacao")]
    #[schema(example = "Qualificado")]
    pub qualification: Option<String>,

    #[sqlx(rename = "renda")]
    pub income: Option<String>,
    #[sqlx(rename = "resumo")]
    pub summary: Option<String>,
    #[sqlx(rename = "cpf")]
    pub tax_id: Option<String>,
    #[sqlx(rename = "pausar_ia")]
    pub ai_paused: Option<String>,

    // --- Comercial ---
    #[sqlx(rename = "valor_proposta")]
    #[schema(example = "45.000,00")]
    pub proposal_value: Option<String>,
    #[sqlx(rename = "forma_pagamento")]
    pub payment_method: Option<String>,
    #[sqlx(rename = "produto_proposta")]
    pub proposal_product: Option<String>,
    #[sqlx(rename = "prazo_instalacao")]
    pub installation_lead_time: Option<String>,
    #[sqlx(rename = "info_proposta")]
    pub proposal_notes: Option<String>,
    #[sqlx(rename = "pdf_url")]
    pub proposal_pdf_url: Option<String>,
    #[sqlx(rename = "motivo_rejeicao")]
    pub rejection_reason: Option<String>,
    #[sqlx(rename = "oportunidade")]
    pub opportunity: Option<String>,

    // --- Datas (texto "dd-MM-yyyy HH:mm") ---
    #[sqlx(rename = "criado_em")]
    #[schema(example = "15-01-2025 14:30")]
    pub created_at: Option<String>,
    #[sqlx(rename = "ultima_mensagem")]
    pub last_contact_at: Option<String>,
}

impl Lead {
    /// Nome para exibição: nome completo, depois o do WhatsApp, depois o número.
    pub fn display_name(&self) -> &str {
        [self.full_name.as_deref(), self.whatsapp_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .unwrap_or(&self.phone)
    }

    /// Etapa atual. `None` quando a qualificação não bate com nenhuma etapa.
    pub fn stage(&self) -> Option<PipelineStage> {
        classifier::classify(self.qualification.as_deref())
    }

    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_lead_date)
    }

    pub fn created_at_parsed(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_lead_timestamp)
    }

    pub fn last_contact(&self) -> Option<NaiveDateTime> {
        self.last_contact_at.as_deref().and_then(parse_lead_timestamp)
    }
}

/// Linha nova para o `INSERT`; o id é gerado pelo banco.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLead {
    pub phone: String,
    pub full_name: Option<String>,
    pub whatsapp_name: Option<String>,
    pub qualification: String,
    pub income: Option<String>,
    pub summary: Option<String>,
    pub tax_id: Option<String>,
    pub ai_paused: String,
    pub proposal_value: Option<String>,
    pub payment_method: Option<String>,
    pub proposal_product: Option<String>,
    pub installation_lead_time: Option<String>,
    pub proposal_notes: Option<String>,
    pub created_at: String,
}

/// Colunas que o painel pode alterar num lead já existente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadColumn {
    Phone,
    WhatsappName,
    FullName,
    Qualification,
    Income,
    Summary,
    TaxId,
    AiPaused,
    ProposalValue,
    PaymentMethod,
    ProposalProduct,
    InstallationLeadTime,
    ProposalNotes,
    ProposalPdfUrl,
    RejectionReason,
    Opportunity,
    LastContactAt,
}

impl LeadColumn {
    pub const ALL: [LeadColumn; 17] = [
        LeadColumn::Phone,
        LeadColumn::WhatsappName,
        LeadColumn::FullName,
        LeadColumn::Qualification,
        LeadColumn::Income,
        LeadColumn::Summary,
        LeadColumn::TaxId,
        LeadColumn::AiPaused,
        LeadColumn::ProposalValue,
        LeadColumn::PaymentMethod,
        LeadColumn::ProposalProduct,
        LeadColumn::InstallationLeadTime,
        LeadColumn::ProposalNotes,
        LeadColumn::ProposalPdfUrl,
        LeadColumn::RejectionReason,
        LeadColumn::Opportunity,
        LeadColumn::LastContactAt,
    ];

    /// Nome da coluna em `usuarios`, já entre aspas quando precisa.
    pub fn sql_name(self) -> &'static str {
        match self {
            LeadColumn::Phone => "numero",
            LeadColumn::WhatsappName => "nome_whatsapp",
            LeadColumn::FullName => "nome_completo",
            LeadColumn::Qualification => "qualificacao",
            LeadColumn::Income => "renda",
            LeadColumn::Summary => "resumo",
            LeadColumn::TaxId => "cpf",
            LeadColumn::AiPaused => "pausar_ia",
            LeadColumn::ProposalValue => "valor_proposta",
            LeadColumn::PaymentMethod => "forma_pagamento",
            LeadColumn::ProposalProduct => "produto_proposta",
            LeadColumn::InstallationLeadTime => "prazo_instalacao",
            LeadColumn::ProposalNotes => "info_proposta",
            LeadColumn::ProposalPdfUrl => "pdf_url",
            LeadColumn::RejectionReason => "motivo_rejeicao",
            LeadColumn::Opportunity => "\"Oportunidade\"",
            LeadColumn::LastContactAt => "ultima_mensagem",
        }
    }

    fn value(self, lead: &Lead) -> Option<&str> {
        match self {
            LeadColumn::Phone => Some(lead.phone.as_str()),
            LeadColumn::WhatsappName => lead.whatsapp_name.as_deref(),
            LeadColumn::FullName => lead.full_name.as_deref(),
            LeadColumn::Qualification => lead.qualification.as_deref(),
            LeadColumn::Income => lead.income.as_deref(),
            LeadColumn::Summary => lead.summary.as_deref(),
            LeadColumn::TaxId => lead.tax_id.as_deref(),
            LeadColumn::AiPaused => lead.ai_paused.as_deref(),
            LeadColumn::ProposalValue => lead.proposal_value.as_deref(),
            LeadColumn::PaymentMethod => lead.payment_method.as_deref(),
            LeadColumn::ProposalProduct => lead.proposal_product.as_deref(),
            LeadColumn::InstallationLeadTime => lead.installation_lead_time.as_deref(),
            LeadColumn::ProposalNotes => lead.proposal_notes.as_deref(),
            LeadColumn::ProposalPdfUrl => lead.proposal_pdf_url.as_deref(),
            LeadColumn::RejectionReason => lead.rejection_reason.as_deref(),
            LeadColumn::Opportunity => lead.opportunity.as_deref(),
            LeadColumn::LastContactAt => lead.last_contact_at.as_deref(),
        }
    }

    fn set(self, lead: &mut Lead, value: Option<String>) {
        let slot = match self {
            LeadColumn::Phone => {
                // `numero` é NOT NULL
                if let Some(phone) = value {
                    lead.phone = phone;
                }
                return;
            }
            LeadColumn::WhatsappName => &mut lead.whatsapp_name,
            LeadColumn::FullName => &mut lead.full_name,
            LeadColumn::Qualification => &mut lead.qualification,
            LeadColumn::Income => &mut lead.income,
            LeadColumn::Summary => &mut lead.summary,
            LeadColumn::TaxId => &mut lead.tax_id,
            LeadColumn::AiPaused => &mut lead.ai_paused,
            LeadColumn::ProposalValue => &mut lead.proposal_value,
            LeadColumn::PaymentMethod => &mut lead.payment_method,
            LeadColumn::ProposalProduct => &mut lead.proposal_product,
            LeadColumn::InstallationLeadTime => &mut lead.installation_lead_time,
            LeadColumn::ProposalNotes => &mut lead.proposal_notes,
            LeadColumn::ProposalPdfUrl => &mut lead.proposal_pdf_url,
            LeadColumn::RejectionReason => &mut lead.rejection_reason,
            LeadColumn::Opportunity => &mut lead.opportunity,
            LeadColumn::LastContactAt => &mut lead.last_contact_at,
        };
        *slot = value;
    }
}

/// Só as colunas que um comando mudou; o resto da linha fica como está no banco.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadChanges {
    pub id: Uuid,
    pub fields: Vec<(LeadColumn, Option<String>)>,
}

impl LeadChanges {
    pub fn between(previous: &Lead, next: &Lead) -> Self {
        let fields = LeadColumn::ALL
            .into_iter()
            .filter(|col| col.value(previous) != col.value(next))
            .map(|col| (col, col.value(next).map(String::from)))
            .collect();

        Self { id: next.id, fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Número novo, quando o comando troca o telefone.
    pub fn phone(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(col, _)| *col == LeadColumn::Phone)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn apply_to(&self, lead: &mut Lead) {
        for (col, value) in &self.fields {
            col.set(lead, value.clone());
        }
    }
}

// =========================================================================
//  PAYLOADS
// =========================================================================

/// Cadastro manual pelo painel.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Souza")]
    pub full_name: String,

    #[validate(length(min = 8, max = 20, message = "invalid_phone"))]
    #[schema(example = "5511999990000")]
    pub phone: String,

    pub whatsapp_name: Option<String>,
    /// Etapa inicial; sem valor o lead entra em "Aquecendo".
    #[schema(example = "Aquecendo")]
    pub qualification: Option<String>,
    pub income: Option<String>,
    pub tax_id: Option<String>,
    pub summary: Option<String>,
}

/// Salvamento do drawer de edição. Campo ausente = não mexe.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    #[validate(length(min = 8, max = 20, message = "invalid_phone"))]
    pub phone: Option<String>,
    pub whatsapp_name: Option<String>,
    #[schema(example = "Qualificado")]
    pub qualification: Option<String>,
    pub income: Option<String>,
    pub tax_id: Option<String>,
    pub summary: Option<String>,
    pub ai_paused: Option<String>,
    pub proposal_value: Option<String>,
    pub payment_method: Option<String>,
    pub proposal_product: Option<String>,
    pub installation_lead_time: Option<String>,
    pub proposal_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub opportunity: Option<String>,
}

/// Arrastar o card para outra coluna.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveStagePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Qualificado")]
    pub stage: String,
}

/// Registro (ou atualização) da proposta enviada ao cliente.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "45.000,00")]
    pub proposal_value: String,
    #[schema(example = "Financiamento")]
    pub payment_method: Option<String>,
    pub proposal_product: Option<String>,
    pub installation_lead_time: Option<String>,
    pub proposal_notes: Option<String>,
    pub pdf_url: Option<String>,

    // Só entram nas notas para cartão/financiamento
    #[validate(range(min = 1, max = 120, message = "invalid_installments"))]
    pub installments: Option<u32>,
    pub installment_value: Option<String>,
    pub financing_institution: Option<String>,
}

/// Cobrança feita ao cliente que ainda não respondeu a proposta.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargePayload {
    /// Número da cobrança (1ª, 2ª, ...).
    #[validate(range(min = 1, message = "invalid_sequence"))]
    #[schema(example = 2)]
    pub sequence: u32,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Cliente pediu para ligar na sexta.")]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectProposalPayload {
    pub reason: Option<String>,
}

/// Venda de um lead que já existe.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "38.500,00")]
    pub proposal_value: String,
    pub payment_method: Option<String>,
    pub proposal_product: Option<String>,
    pub installation_lead_time: Option<String>,
    pub proposal_notes: Option<String>,
}

/// Venda lançada direto na tela de vendas, sem lead prévio.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualSalePayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    #[validate(length(min = 8, max = 20, message = "invalid_phone"))]
    pub phone: String,
    pub tax_id: Option<String>,
    pub income: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub proposal_value: String,
    pub payment_method: Option<String>,
    pub proposal_product: Option<String>,
    pub installation_lead_time: Option<String>,
    pub proposal_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeadSearchQuery {
    /// Busca por nome (sem diferenciar maiúsculas) ou número.
    pub search: Option<String>,
}

/// Resultado da migração das qualificações livres para os rótulos canônicos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    pub rewritten: usize,
    pub already_canonical: usize,
    pub unmapped: usize,
    /// Textos que não bateram com nenhuma etapa (ficaram como estavam).
    pub unmapped_values: Vec<String>,
}

/// Lead mínimo para os testes dos serviços.
#[cfg(test)]
pub fn test_lead(qualification: Option<&str>) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        phone: "5511999990000".into(),
        whatsapp_name: None,
        full_name: None,
        qualification: qualification.map(String::from),
        income: None,
        summary: None,
        tax_id: None,
        ai_paused: None,
        proposal_value: None,
        payment_method: None,
        proposal_product: None,
        installation_lead_time: None,
        proposal_notes: None,
        proposal_pdf_url: None,
        rejection_reason: None,
        opportunity: None,
        created_at: None,
        last_contact_at: None,
    }
}
