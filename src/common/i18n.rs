// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "pt";

// Os catálogos são embutidos no binário; nada de arquivo solto em produção.
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens traduzidas por idioma, indexadas pelo código do erro.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn embedded() -> Self {
        let mut messages = HashMap::new();

        for (lang, raw) in CATALOGS {
            match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(catalog) => {
                    messages.insert((*lang).to_string(), catalog);
                }
                Err(e) => {
                    tracing::error!("🔥 Catálogo de idioma '{}' inválido: {}", lang, e);
                }
            }
        }

        Self { messages }
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.translate_with(lang, key, &[])
    }

    /// Traduz e substitui `{param}` pelos valores informados.
    /// Idioma sem catálogo cai no português; chave desconhecida volta como está.
    pub fn translate_with(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string());

        params.iter().fold(template, |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }
}
