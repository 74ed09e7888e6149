use std::collections::HashMap;

use super::{EventKey, EventPayload};

/// Localization seam: renders an event key and its payload as text.
pub trait Translator: Send + Sync {
    fn translate(&self, key: EventKey, payload: &EventPayload) -> String;
}

/// Message templates for one language.
///
/// Templates reference payload fields as `{field}`; unknown placeholders are
/// left in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleTable {
    lang: String,
    templates: HashMap<EventKey, String>,
}

impl LocaleTable {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            templates: HashMap::new(),
        }
    }

    pub fn from_templates(
        lang: impl Into<String>,
        templates: impl IntoIterator<Item = (EventKey, String)>,
    ) -> Self {
        Self {
            lang: lang.into(),
            templates: templates.into_iter().collect(),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn insert(&mut self, key: EventKey, template: impl Into<String>) {
        self.templates.insert(key, template.into());
    }

    pub fn template(&self, key: EventKey) -> Option<&str> {
        self.templates.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Translator for LocaleTable {
    fn translate(&self, key: EventKey, payload: &EventPayload) -> String {
        let Some(template) = self.template(key) else {
            return format!("Missing translation for key: {key}");
        };

        // Single pass: substituted values are never scanned again.
        let mut message = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rest = tail;
                break;
            };
            let placeholder = &tail[..=close];
            match payload.get(&placeholder[1..close]) {
                Some(value) => message.push_str(&value.to_string()),
                None => message.push_str(placeholder),
            }
            rest = &tail[close + 1..];
        }
        message.push_str(rest);
        message
    }
}
