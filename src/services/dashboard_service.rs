// src/services/dashboard_service.rs

use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, money::parse_brl_amount},
    config::PipelineSettings,
    models::{
        dashboard::{
            DailyLeadCount, DashboardSummary, ProposalChartEntry, ProposalCounts,
            ProposalsOverview, RescueOverview, SalesOverview,
        },
        lead::Lead,
        pipeline::{PipelineStage, StageCounts},
    },
    services::{
        classifier::count_by_stage,
        lead_service::LeadService,
        rescue::{self, rounded_percent},
        temporal,
    },
};

// Janela máxima aceita nos gráficos
const MAX_CHART_DAYS: u32 = 366;

#[derive(Clone)]
pub struct DashboardService {
    leads: LeadService,
    settings: PipelineSettings,
}

// =========================================================================
//  CÁLCULOS (sobre uma lista já carregada)
// =========================================================================

pub fn summarize(leads: &[Lead]) -> DashboardSummary {
    let counts = count_by_stage(leads);
    let total = leads.len();
    let qualified = counts.get(PipelineStage::Qualified);

    DashboardSummary {
        total_leads: total,
        qualified,
        qualification_rate: rounded_percent(qualified, total),
        proposals_sent: counts.get(PipelineStage::ProposalSent),
        sales_completed: counts.get(PipelineStage::SaleCompleted),
        proposals_rejected: counts.get(PipelineStage::ProposalRejected),
    }
}

/// Leads que ainda podem receber proposta.
pub fn proposal_candidates(leads: &[Lead]) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| {
            !matches!(
                lead.stage(),
                Some(PipelineStage::ProposalSent)
                    | Some(PipelineStage::SaleCompleted)
                    | Some(PipelineStage::ProposalRejected)
            )
        })
        .cloned()
        .collect()
}

/// Valores digitados à mão; o que não parseia conta como zero.
pub fn sales_overview_of(leads: &[Lead]) -> SalesOverview {
    let sales: Vec<Lead> = leads
        .iter()
        .filter(|l| l.stage() == Some(PipelineStage::SaleCompleted))
        .cloned()
        .collect();

    // Soma com checagem: um valor absurdo digitado à mão fica de fora, como os ilegíveis
    let total_value = sales
        .iter()
        .filter_map(|l| l.proposal_value.as_deref().and_then(parse_brl_amount))
        .fold(Decimal::ZERO, |total, amount| match total.checked_add(amount) {
            Some(sum) => sum,
            None => {
                tracing::warn!("Valor de venda ignorado no total por estouro: {}", amount);
                total
            }
        });
    let average_ticket = if sales.is_empty() {
        Decimal::ZERO
    } else {
        (total_value / Decimal::from(sales.len())).round_dp(2)
    };

    SalesOverview {
        sales_completed: sales.len(),
        total_value,
        average_ticket,
        proposals_sent: leads
            .iter()
            .filter(|l| l.stage() == Some(PipelineStage::ProposalSent))
            .count(),
        sales,
    }
}

impl DashboardService {
    pub fn new(leads: LeadService, settings: PipelineSettings) -> Self {
        Self { leads, settings }
    }

    fn window(&self, days: Option<u32>) -> u32 {
        days.unwrap_or(self.settings.chart_window_days).min(MAX_CHART_DAYS)
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let leads = self.leads.refresh().await?;
        Ok(summarize(&leads))
    }

    pub async fn stage_counts(&self) -> Result<StageCounts, AppError> {
        let leads = self.leads.refresh().await?;
        Ok(count_by_stage(&leads))
    }

    pub async fn leads_chart(&self, days: Option<u32>) -> Result<Vec<DailyLeadCount>, AppError> {
        let leads = self.leads.refresh().await?;
        let today = self.leads.clock().today();
        Ok(temporal::leads_per_day(&leads, today, self.window(days)))
    }

    pub async fn proposals_chart(&self, days: Option<u32>) -> Result<Vec<ProposalChartEntry>, AppError> {
        let leads = self.leads.refresh().await?;
        let today = self.leads.clock().today();
        Ok(temporal::proposals_per_day(&leads, today, self.window(days)))
    }

    pub async fn proposals_overview(&self) -> Result<ProposalsOverview, AppError> {
        let leads = self.leads.refresh().await?;
        let now = self.leads.clock().now();
        let counts = count_by_stage(&leads);

        let sent = rescue::sent_proposals(&leads, now);
        let unanswered =
            rescue::unanswered_proposals(&leads, now, self.settings.proposal_response_hours);

        Ok(ProposalsOverview {
            counts: ProposalCounts {
                sent: counts.get(PipelineStage::ProposalSent),
                completed: counts.get(PipelineStage::SaleCompleted),
                rejected: counts.get(PipelineStage::ProposalRejected),
                without_response: unanswered.len(),
            },
            sent,
            unanswered,
        })
    }

    pub async fn proposal_candidates(&self) -> Result<Vec<Lead>, AppError> {
        let leads = self.leads.refresh().await?;
        Ok(proposal_candidates(&leads))
    }

    pub async fn sales_overview(&self) -> Result<SalesOverview, AppError> {
        let leads = self.leads.refresh().await?;
        Ok(sales_overview_of(&leads))
    }

    pub async fn rescue_overview(&self) -> Result<RescueOverview, AppError> {
        let leads = self.leads.refresh().await?;
        let now = self.leads.clock().now();

        let follow_up = rescue::follow_up(&leads, now, self.settings.follow_up_hours);
        let opportunities = rescue::opportunities(&leads);
        let summary = rescue::rescue_summary(&leads, &follow_up, &opportunities);

        Ok(RescueOverview {
            summary,
            follow_up,
            opportunities,
        })
    }
}
