//! Locales and localized values.
//!
//! Stored text exists in Spanish and English. Lookups for a requested locale
//! fall back to English, and report absence instead of yielding an empty
//! string when neither is present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    #[default]
    En,
}

impl Locale {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// Text keyed by locale. Missing locales are simply absent from the map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<Locale, String>);

impl LocalizedText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a value from optional per-locale columns, skipping empty ones.
    #[must_use]
    pub fn from_columns(es: Option<String>, en: Option<String>) -> Self {
        let mut text = Self::new();
        text.set(Locale::Es, es);
        text.set(Locale::En, en);
        text
    }

    pub fn set(&mut self, locale: Locale, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => {
                self.0.insert(locale, v);
            }
            _ => {
                self.0.remove(&locale);
            }
        }
    }

    #[must_use]
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0.get(&locale).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Resolves the text for `requested`, falling back to English.
    #[must_use]
    pub fn resolve(&self, requested: Locale) -> Option<&str> {
        resolve_localized(self, requested, Locale::En)
    }
}

/// Looks up `requested`, then `fallback`. Returns `None` when neither exists.
#[must_use]
pub fn resolve_localized(map: &LocalizedText, requested: Locale, fallback: Locale) -> Option<&str> {
    map.get(requested).or_else(|| map.get(fallback))
}

/// Ordered per-locale lists (features, use cases).
///
/// Both keys are always present in the serialized form so clients can index
/// them without checking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedList {
    #[serde(default)]
    pub es: Vec<String>,
    #[serde(default)]
    pub en: Vec<String>,
}

impl LocalizedList {
    /// Appends one stored row. An empty side is a missing translation and
    /// is skipped, so the locale falls back to English instead of yielding
    /// blank items.
    pub fn push(&mut self, es: String, en: String) {
        if !es.is_empty() {
            self.es.push(es);
        }
        if !en.is_empty() {
            self.en.push(en);
        }
    }

    #[must_use]
    pub fn for_locale(&self, locale: Locale) -> &[String] {
        match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
        }
    }

    /// Items for `requested`, or the English items when that list is empty.
    #[must_use]
    pub fn resolve(&self, requested: Locale) -> &[String] {
        let items = self.for_locale(requested);
        if items.is_empty() { &self.en } else { items }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.es.is_empty() && self.en.is_empty()
    }

    /// All items regardless of locale.
    pub fn iter_all(&self) -> impl Iterator<Item = &str> {
        self.es.iter().chain(self.en.iter()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_requested_locale() {
        let text = LocalizedText::from_columns(Some("Hola".into()), Some("Hello".into()));
        assert_eq!(text.resolve(Locale::Es), Some("Hola"));
        assert_eq!(text.resolve(Locale::En), Some("Hello"));
    }

    #[test]
    fn resolve_falls_back_to_english() {
        let text = LocalizedText::from_columns(None, Some("Hello".into()));
        assert_eq!(text.resolve(Locale::Es), Some("Hello"));
    }

    #[test]
    fn resolve_reports_absence() {
        let text = LocalizedText::from_columns(Some("Hola".into()), None);
        assert_eq!(resolve_localized(&text, Locale::En, Locale::En), None);
        assert_eq!(LocalizedText::new().resolve(Locale::Es), None);
    }

    #[test]
    fn empty_columns_are_treated_as_missing() {
        let text = LocalizedText::from_columns(Some(String::new()), None);
        assert!(text.is_empty());
    }

    #[test]
    fn localized_text_serializes_as_object() {
        let text = LocalizedText::from_columns(Some("Hola".into()), Some("Hello".into()));
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json, serde_json::json!({"es": "Hola", "en": "Hello"}));
    }

    #[test]
    fn list_resolve_falls_back_when_empty() {
        let list = LocalizedList {
            es: vec![],
            en: vec!["Voice cloning".into()],
        };
        assert_eq!(list.resolve(Locale::Es), ["Voice cloning".to_string()]);
        assert_eq!(list.iter_all().count(), 1);
    }

    #[test]
    fn list_push_skips_missing_translations() {
        let mut list = LocalizedList::default();
        list.push(String::new(), "Voice cloning".into());
        list.push("Doblaje".into(), String::new());

        assert_eq!(list.es, vec!["Doblaje".to_string()]);
        assert_eq!(list.en, vec!["Voice cloning".to_string()]);
        assert!(list.iter_all().all(|item| !item.is_empty()));

        let mut english_only = LocalizedList::default();
        english_only.push(String::new(), "Voice cloning".into());
        assert_eq!(english_only.resolve(Locale::Es), ["Voice cloning".to_string()]);
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert!("fr".parse::<Locale>().is_err());
    }
}
