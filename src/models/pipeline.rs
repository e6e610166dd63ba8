// src/models/pipeline.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::lead::Lead;

// --- Enums ---

/// Etapas do funil de qualificação.
/// No banco a qualificação é texto livre; aqui ela vira um conjunto fechado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PipelineStage {
    #[serde(rename = "Aquecendo")]
    Warming,
    #[serde(rename = "Informando")]
    Informing,
    #[serde(rename = "Coletando")]
    CollectingData,
    #[serde(rename = "Qualificado")]
    Qualified,
    #[serde(rename = "Desqualificado")]
    Disqualified,
    #[serde(rename = "Interesse")]
    Interested,
    #[serde(rename = "Elaborando Proposta")]
    DraftingProposal,
    #[serde(rename = "Proposta Enviada")]
    ProposalSent,
    #[serde(rename = "Venda Concluida")]
    SaleCompleted,
    #[serde(rename = "Proposta Rejeitada")]
    ProposalRejected,
}

use PipelineStage::*;

impl PipelineStage {
    /// Ordem declarada: colunas do kanban e desempate da classificação.
    pub const ALL: [PipelineStage; 10] = [
        Warming,
        Informing,
        CollectingData,
        Qualified,
        Disqualified,
        Interested,
        DraftingProposal,
        ProposalSent,
        SaleCompleted,
        ProposalRejected,
    ];

    /// Rótulo canônico, exatamente como é gravado no banco.
    pub fn label(self) -> &'static str {
        match self {
            Warming => "Aquecendo",
            Informing => "Informando",
            CollectingData => "Coletando",
            Qualified => "Qualificado",
            Disqualified => "Desqualificado",
            Interested => "Interesse",
            DraftingProposal => "Elaborando Proposta",
            ProposalSent => "Proposta Enviada",
            SaleCompleted => "Venda Concluida",
            ProposalRejected => "Proposta Rejeitada",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Warming => "hsl(30 90% 55%)",
            Informing => "hsl(200 80% 50%)",
            CollectingData => "hsl(270 70% 55%)",
            Qualified => "hsl(142 76% 45%)",
            Disqualified => "hsl(0 70% 55%)",
            Interested => "hsl(45 100% 50%)",
            DraftingProposal => "hsl(45 100% 55%)",
            ProposalSent => "hsl(40 100% 45%)",
            SaleCompleted => "hsl(120 70% 40%)",
            ProposalRejected => "hsl(35 100% 40%)",
        }
    }

    /// Topo do funil: leads que ainda estão conversando com a equipe.
    pub fn is_early_funnel(self) -> bool {
        matches!(self, Warming | Informing | CollectingData | Interested)
    }

    /// Terminal por convenção; a tabela de transições ainda permite reabrir alguns.
    pub fn is_terminal(self) -> bool {
        matches!(self, SaleCompleted | ProposalRejected | Disqualified)
    }

    /// Tabela explícita de transições.
    /// Mover para a mesma etapa é sempre permitido (não faz nada).
    pub fn can_transition_to(self, to: PipelineStage) -> bool {
        if self == to {
            return true;
        }

        match self {
            Warming | Informing | CollectingData | Interested => {
                to.is_early_funnel() || matches!(to, Qualified | Disqualified | SaleCompleted)
            }
            Qualified => matches!(
                to,
                DraftingProposal | ProposalSent | SaleCompleted | Disqualified | CollectingData
            ),
            DraftingProposal => {
                matches!(to, ProposalSent | SaleCompleted | Disqualified | Qualified)
            }
            ProposalSent => matches!(to, SaleCompleted | ProposalRejected | DraftingProposal),
            ProposalRejected => matches!(to, DraftingProposal | Disqualified),
            Disqualified => matches!(to, Warming),
            SaleCompleted => false,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// --- Structs de Visualização ---

/// Coluna do kanban.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageColumn {
    pub stage: PipelineStage,
    #[schema(example = "Qualificado")]
    pub title: &'static str,
    #[schema(example = "hsl(142 76% 45%)")]
    pub color: &'static str,
    pub count: usize,
    pub leads: Vec<Lead>,
}

/// Quadro completo: todas as etapas na ordem declarada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KanbanBoard {
    pub columns: Vec<StageColumn>,
    /// Leads fora de qualquer coluna.
    pub unclassified: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub stages: Vec<StageCount>,
    /// Leads cuja qualificação não bate com nenhuma etapa.
    pub unclassified: usize,
}

impl StageCounts {
    pub fn get(&self, stage: PipelineStage) -> usize {
        self.stages
            .iter()
            .find(|c| c.stage == stage)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.stages.iter().map(|c| c.count).sum::<usize>() + self.unclassified
    }
}
