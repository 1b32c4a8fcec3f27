//! Template application over a message's body variants.
//!
//! Three shapes are supported: one pattern tried per source until it fills
//! every required field, several single-field patterns merged across
//! sources, and a sent/received pair where the first match decides the
//! direction. Structural (table) lookups live with the providers that need
//! them.

use regex::Regex;
use std::collections::BTreeMap;

use crate::body_text::{body_text, BodySource};
use crate::error::DecodeError;
use crate::message::Message;
use crate::transaction::Direction;

/// Named capture values, trimmed. Groups that did not participate, or
/// captured only whitespace, are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The value, or an empty string when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.0.contains_key(*n))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.0.insert(name.into(), value.to_string());
        }
    }

    /// Adds fields from `other` that are not already present.
    pub fn merge_missing(&mut self, other: FieldSet) {
        for (name, value) in other.0 {
            self.0.entry(name).or_insert(value);
        }
    }

    /// Fields from `other` replace existing ones.
    pub fn overlay(&mut self, other: FieldSet) {
        self.0.extend(other.0);
    }
}

/// Named captures of the first match of `re` in `text`.
pub fn named_captures(re: &Regex, text: &str) -> Option<FieldSet> {
    let caps = re.captures(text)?;
    let mut fields = FieldSet::default();
    for name in re.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            fields.insert(name, m.as_str());
        }
    }
    Some(fields)
}

/// One pattern, the fields it must fill, and the sources to try in order.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub pattern: Regex,
    pub required: &'static [&'static str],
    pub sources: &'static [BodySource],
}

/// Independent single-field patterns whose captures are unioned.
#[derive(Debug, Clone)]
pub struct MergedTemplate {
    pub name: &'static str,
    pub fields: Vec<Regex>,
    pub required: &'static [&'static str],
    pub sources: &'static [BodySource],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub fields: FieldSet,
    pub source: BodySource,
}

impl Template {
    pub fn new(
        name: &'static str,
        pattern: &str,
        required: &'static [&'static str],
        sources: &'static [BodySource],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            required,
            sources,
        })
    }

    /// Captures from `text` if they cover every required field.
    pub fn apply(&self, text: &str) -> Option<FieldSet> {
        named_captures(&self.pattern, text).filter(|f| f.contains_all(self.required))
    }
}

impl MergedTemplate {
    pub fn new(
        name: &'static str,
        fields: &[&str],
        required: &'static [&'static str],
        sources: &'static [BodySource],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            fields: fields
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<Vec<_>, _>>()?,
            required,
            sources,
        })
    }
}

/// Single-template-with-fallback: the first source whose text fills every
/// required field wins. Later sources are never rendered.
pub fn first_complete(
    template: &Template,
    message: &Message,
) -> Result<Option<TemplateMatch>, DecodeError> {
    for &source in template.sources {
        let Some(text) = body_text(message, source)? else {
            continue;
        };
        if let Some(fields) = template.apply(&text) {
            tracing::debug!(template = template.name, ?source, "template matched");
            return Ok(Some(TemplateMatch { fields, source }));
        }
    }
    Ok(None)
}

/// Merged-independent-fields: each field pattern runs against each source
/// in priority order. A field found in an earlier source is never replaced
/// by a later one; the walk stops once every required field is present.
pub fn merge_fields(
    template: &MergedTemplate,
    message: &Message,
) -> Result<Option<FieldSet>, DecodeError> {
    let mut merged = FieldSet::default();
    for &source in template.sources {
        let Some(text) = body_text(message, source)? else {
            continue;
        };
        for re in &template.fields {
            if let Some(found) = named_captures(re, &text) {
                merged.merge_missing(found);
            }
        }
        tracing::debug!(
            template = template.name,
            ?source,
            found = merged.0.len(),
            "merged fields"
        );
        if merged.contains_all(template.required) {
            return Ok(Some(merged));
        }
    }
    Ok(None)
}

/// Direction disambiguation: `sent` is tried before `received`, and
/// whichever matches first sets the direction.
pub fn by_direction(
    sent: &Template,
    received: &Template,
    message: &Message,
) -> Result<Option<(Direction, TemplateMatch)>, DecodeError> {
    if let Some(m) = first_complete(sent, message)? {
        return Ok(Some((Direction::Sent, m)));
    }
    Ok(first_complete(received, message)?.map(|m| (Direction::Received, m)))
}

/// Free text between `prefix <payee>` and `suffix`, with the payee matched
/// literally.
pub fn scoped_note(prefix: &str, payee: &str, suffix: &str, text: &str) -> Option<String> {
    let pattern = format!(
        "{} {} (?P<note>.*?) {}",
        regex::escape(prefix),
        regex::escape(payee),
        regex::escape(suffix)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            tracing::warn!(%err, "payee-scoped note pattern rejected");
            return None;
        }
    };
    named_captures(&re, text).and_then(|f| f.get("note").map(str::to_string))
}
