// src/services/temporal.rs
//
// Janelas diárias para os gráficos e "tempo parado" para a triagem.
// Datas que não parseiam saem dos gráficos, mas na triagem contam como máxima urgência.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{
    common::dates::{chart_label, parse_lead_timestamp},
    models::{
        dashboard::{DailyLeadCount, ProposalChartEntry, Staleness, UrgencyLevel},
        lead::Lead,
        pipeline::PipelineStage,
    },
};

/// `days` dias corridos terminando em `today`, do mais antigo ao mais novo.
pub fn daily_window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

pub fn leads_per_day(leads: &[Lead], today: NaiveDate, days: u32) -> Vec<DailyLeadCount> {
    let window = daily_window(today, days);
    let created: Vec<NaiveDate> = leads.iter().filter_map(Lead::created_on).collect();

    window
        .into_iter()
        .map(|date| DailyLeadCount {
            date,
            label: chart_label(date),
            count: created.iter().filter(|d| **d == date).count(),
        })
        .collect()
}

/// Propostas por dia, agrupadas pela data de criação do lead.
pub fn proposals_per_day(leads: &[Lead], today: NaiveDate, days: u32) -> Vec<ProposalChartEntry> {
    let window = daily_window(today, days);
    let dated: Vec<(NaiveDate, PipelineStage)> = leads
        .iter()
        .filter_map(|lead| Some((lead.created_on()?, lead.stage()?)))
        .collect();

    window
        .into_iter()
        .map(|date| {
            let count = |stage: PipelineStage| {
                dated
                    .iter()
                    .filter(|(d, s)| *d == date && *s == stage)
                    .count()
            };
            ProposalChartEntry {
                date,
                label: chart_label(date),
                sent: count(PipelineStage::ProposalSent),
                completed: count(PipelineStage::SaleCompleted),
                rejected: count(PipelineStage::ProposalRejected),
            }
        })
        .collect()
}

pub fn urgency_for_days(days: i64) -> UrgencyLevel {
    match days {
        d if d >= 5 => UrgencyLevel::Critical,
        d if d >= 3 => UrgencyLevel::High,
        d if d >= 1 => UrgencyLevel::Medium,
        _ => UrgencyLevel::Low,
    }
}

/// Tempo desde o último contato. Sem data (ou data ilegível) = parado ao máximo.
pub fn staleness(last_contact: Option<&str>, now: NaiveDateTime) -> Staleness {
    match last_contact.and_then(parse_lead_timestamp) {
        Some(contact) => {
            // Data no futuro (relógio adiantado de quem gravou) conta como zero
            let minutes = (now - contact).num_minutes().max(0);
            let days = minutes / (60 * 24);
            Staleness {
                elapsed_minutes: Some(minutes),
                elapsed_hours: Some(minutes / 60),
                elapsed_days: Some(days),
                urgency: urgency_for_days(days),
            }
        }
        None => Staleness {
            elapsed_minutes: None,
            elapsed_hours: None,
            elapsed_days: None,
            urgency: UrgencyLevel::Critical,
        },
    }
}
