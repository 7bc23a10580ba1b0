// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";
pub const SUPPORTED_LANGS: [&str; 2] = ["en", "pt"];

// Catálogos embutidos no binário (chave -> mensagem)
const CATALOGS: [(&str, &str); 2] = [
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load_embedded() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Idioma pedido -> inglês -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .find_map(|l| self.catalogs.get(*l).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_the_same_keys() {
        let store = I18nStore::load_embedded().unwrap();
        let en = &store.catalogs["en"];
        let pt = &store.catalogs["pt"];
        let mut missing: Vec<_> = en.keys().filter(|k| !pt.contains_key(*k)).collect();
        missing.extend(pt.keys().filter(|k| !en.contains_key(*k)));
        assert!(missing.is_empty(), "chaves fora de sincronia: {missing:?}");
    }

    #[test]
    fn falls_back_to_english_then_to_the_key() {
        let store = I18nStore::load_embedded().unwrap();
        assert_eq!(store.translate("pt", "user.not_found"), "Usuário não encontrado");
        assert_eq!(store.translate("de", "user.not_found"), "User not found");
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }
}
