// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{lead::Lead, pipeline::PipelineStage};

// 1. Cards do topo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_leads: usize,
    pub qualified: usize,
    /// Percentual arredondado de qualificados sobre o total.
    #[schema(example = 35)]
    pub qualification_rate: u32,
    pub proposals_sent: usize,
    pub sales_completed: usize,
    pub proposals_rejected: usize,
}

// 2. Gráfico de leads por dia
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLeadCount {
    pub date: NaiveDate,
    #[schema(example = "15/01")]
    pub label: String,
    pub count: usize,
}

// 3. Gráfico de propostas por dia (pela data de criação do lead)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalChartEntry {
    pub date: NaiveDate,
    pub label: String,
    pub sent: usize,
    pub completed: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ChartQuery {
    /// Tamanho da janela em dias (padrão configurado no servidor).
    pub days: Option<u32>,
}

// --- Triagem ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Tempo desde o último contato.
/// Sem data válida não há valores e a urgência é máxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Staleness {
    pub elapsed_minutes: Option<i64>,
    pub elapsed_hours: Option<i64>,
    pub elapsed_days: Option<i64>,
    pub urgency: UrgencyLevel,
}

impl Staleness {
    /// Chave de ordenação: maior = mais parado.
    pub fn rank(&self) -> i64 {
        self.elapsed_minutes.unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpEntry {
    pub lead: Lead,
    pub stage: Option<PipelineStage>,
    pub staleness: Staleness,
}

/// Indício de que um lead vale ser resgatado. Nunca é decisão automática.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RescueSignal {
    /// Anotado pela equipe na coluna "Oportunidade".
    Recorded { note: String },
    /// Palavras de retomada encontradas no resumo ou nas notas.
    #[serde(rename_all = "camelCase")]
    KeywordHint { matches: Vec<String>, fuzzy: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityEntry {
    pub lead: Lead,
    pub signal: RescueSignal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescueSummary {
    pub follow_up: usize,
    pub recorded_opportunities: usize,
    pub keyword_hints: usize,
    pub disqualified: usize,
    /// Oportunidades anotadas sobre desqualificados, em %.
    pub rescue_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescueOverview {
    pub summary: RescueSummary,
    pub follow_up: Vec<FollowUpEntry>,
    pub opportunities: Vec<OpportunityEntry>,
}

// --- Propostas ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCounts {
    pub sent: usize,
    pub completed: usize,
    pub rejected: usize,
    pub without_response: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalsOverview {
    pub counts: ProposalCounts,
    pub sent: Vec<FollowUpEntry>,
    pub unanswered: Vec<FollowUpEntry>,
}

// --- Vendas ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverview {
    pub sales_completed: usize,
    pub total_value: Decimal,
    pub average_ticket: Decimal,
    pub proposals_sent: usize,
    pub sales: Vec<Lead>,
}
