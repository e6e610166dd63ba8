// src/services/rescue.rs
//
// Listas de triagem: follow-up do topo do funil, propostas sem resposta e
// candidatos a resgate entre os desqualificados.

use chrono::NaiveDateTime;

use crate::{
    models::{
        dashboard::{FollowUpEntry, OpportunityEntry, RescueSignal, RescueSummary},
        lead::Lead,
        pipeline::PipelineStage,
    },
    services::temporal::staleness,
};

// Expressões que costumam indicar "agora não, mas depois sim".
// Heurística: serve para sugerir, nunca para decidir.
const REENGAGEMENT_KEYWORDS: &[&str] = &[
    "mais tarde",
    "futuramente",
    "proximo mes",
    "proximo ano",
    "ano que vem",
    "depois",
    "retomar",
    "voltar a falar",
    "sem dinheiro agora",
    "no momento nao",
];

fn entry(lead: &Lead, now: NaiveDateTime) -> FollowUpEntry {
    FollowUpEntry {
        lead: lead.clone(),
        stage: lead.stage(),
        staleness: staleness(lead.last_contact_at.as_deref(), now),
    }
}

fn most_stale_first(entries: &mut [FollowUpEntry]) {
    entries.sort_by(|a, b| b.staleness.rank().cmp(&a.staleness.rank()));
}

/// Passou do limite ou nunca teve contato registrado.
fn is_overdue(entry: &FollowUpEntry, threshold_hours: i64) -> bool {
    match entry.staleness.elapsed_minutes {
        Some(minutes) => minutes > threshold_hours * 60,
        None => true,
    }
}

/// Leads do topo do funil (ou sem etapa) parados há mais de `threshold_hours`.
pub fn follow_up(leads: &[Lead], now: NaiveDateTime, threshold_hours: i64) -> Vec<FollowUpEntry> {
    let mut entries: Vec<FollowUpEntry> = leads
        .iter()
        .filter(|lead| lead.stage().is_none_or(PipelineStage::is_early_funnel))
        .map(|lead| entry(lead, now))
        .filter(|e| is_overdue(e, threshold_hours))
        .collect();

    most_stale_first(&mut entries);
    entries
}

/// Todas as propostas enviadas, com urgência, mais paradas primeiro.
pub fn sent_proposals(leads: &[Lead], now: NaiveDateTime) -> Vec<FollowUpEntry> {
    let mut entries: Vec<FollowUpEntry> = leads
        .iter()
        .filter(|lead| lead.stage() == Some(PipelineStage::ProposalSent))
        .map(|lead| entry(lead, now))
        .collect();

    most_stale_first(&mut entries);
    entries
}

/// Propostas enviadas sem resposta há mais de `threshold_hours`.
pub fn unanswered_proposals(
    leads: &[Lead],
    now: NaiveDateTime,
    threshold_hours: i64,
) -> Vec<FollowUpEntry> {
    sent_proposals(leads, now)
        .into_iter()
        .filter(|e| is_overdue(e, threshold_hours))
        .collect()
}

fn fold(text: &str) -> String {
    text.to_lowercase()
        .replace(['á', 'à', 'â', 'ã'], "a")
        .replace(['é', 'ê'], "e")
        .replace('í', "i")
        .replace(['ó', 'ô', 'õ'], "o")
        .replace('ú', "u")
        .replace('ç', "c")
}

/// Palavras de retomada presentes no resumo ou nas notas do lead.
pub fn keyword_matches(lead: &Lead) -> Vec<String> {
    let haystack = [lead.summary.as_deref(), lead.proposal_notes.as_deref()]
        .into_iter()
        .flatten()
        .map(fold)
        .collect::<Vec<_>>()
        .join("\n");

    REENGAGEMENT_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Sinal de resgate de um lead, se houver.
/// A anotação explícita da equipe tem precedência sobre as palavras-chave.
pub fn rescue_signal(lead: &Lead) -> Option<RescueSignal> {
    if let Some(note) = lead.opportunity.as_deref().map(str::trim) {
        if !note.is_empty() {
            return Some(RescueSignal::Recorded {
                note: note.to_string(),
            });
        }
    }

    if lead.stage() != Some(PipelineStage::Disqualified) {
        return None;
    }

    let matches = keyword_matches(lead);
    if matches.is_empty() {
        None
    } else {
        Some(RescueSignal::KeywordHint {
            matches,
            fuzzy: true,
        })
    }
}

pub fn opportunities(leads: &[Lead]) -> Vec<OpportunityEntry> {
    leads
        .iter()
        .filter_map(|lead| {
            rescue_signal(lead).map(|signal| OpportunityEntry {
                lead: lead.clone(),
                signal,
            })
        })
        .collect()
}

/// Percentual inteiro arredondado (meio para cima). Total zero dá zero.
pub fn rounded_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part * 100 + total / 2) / total) as u32
}

pub fn rescue_summary(
    leads: &[Lead],
    follow_up: &[FollowUpEntry],
    opportunities: &[OpportunityEntry],
) -> RescueSummary {
    let disqualified = leads
        .iter()
        .filter(|l| l.stage() == Some(PipelineStage::Disqualified))
        .count();
    let recorded = opportunities
        .iter()
        .filter(|o| matches!(o.signal, RescueSignal::Recorded { .. }))
        .count();

    RescueSummary {
        follow_up: follow_up.len(),
        recorded_opportunities: recorded,
        keyword_hints: opportunities.len() - recorded,
        disqualified,
        rescue_rate: rounded_percent(recorded, disqualified),
    }
}
