// src/common/dates.rs
//
// O banco guarda datas como texto no formato local ("15-01-2025 14:30").
// Toda lógica de "mesmo dia" / "há N horas" passa por aqui, nunca por comparação de string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y, %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Formato usado nas escritas, compatível com o que a integração do WhatsApp grava.
pub const STORE_DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Interpreta um carimbo de data/hora do banco.
/// Datas sem hora viram meia-noite. Retorna `None` para qualquer texto não reconhecido.
pub fn parse_lead_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

pub fn parse_lead_date(raw: &str) -> Option<NaiveDate> {
    parse_lead_timestamp(raw).map(|dt| dt.date())
}

pub fn format_store_timestamp(dt: NaiveDateTime) -> String {
    dt.format(STORE_DATETIME_FORMAT).to_string()
}

/// Rótulo curto dos gráficos ("15/01").
pub fn chart_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Relógio no fuso da equipe. Nos testes o instante pode ser fixado.
#[derive(Debug, Clone, Copy)]
pub struct LeadClock {
    offset: FixedOffset,
    fixed: Option<NaiveDateTime>,
}

impl LeadClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset, fixed: None }
    }

    pub fn fixed(now: NaiveDateTime) -> Self {
        Self {
            offset: Utc.fix(),
            fixed: Some(now),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        match self.fixed {
            Some(now) => now,
            None => Utc::now().with_timezone(&self.offset).naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
