//! Provider configuration and label-based dispatch.
//!
//! The registry is built once from configuration and is read-only after
//! that. A message is handed to the first configured provider whose routing
//! label it carries; configurations that give two providers the same label
//! are rejected up front so that order only matters for messages carrying
//! several distinct provider labels.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::account_resolve::{AccountMatch, AccountTable, AccountTarget};
use crate::date_normalize::normalize_date;
use crate::error::{ConfigError, ExtractError, StructuralReason};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::transaction::{Extraction, Unmatched};
use crate::{
    affinity_alert_import, capitalone_alert_import, chase_alert_import, discover_alert_import,
    paypal_alert_import, target_alert_import,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Chase,
    Discover,
    CapitalOne,
    Paypal,
    Target,
    Affinity,
}

/// One provider's extraction routine.
pub type ExtractFn = fn(&Patterns, &Provider, &Message) -> Result<Extraction, ExtractError>;

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Chase => "chase",
            ProviderKind::Discover => "discover",
            ProviderKind::CapitalOne => "capitalone",
            ProviderKind::Paypal => "paypal",
            ProviderKind::Target => "target",
            ProviderKind::Affinity => "affinity",
        }
    }

    pub fn extractor(self) -> ExtractFn {
        match self {
            ProviderKind::Chase => chase_alert_import::extract,
            ProviderKind::Discover => discover_alert_import::extract,
            ProviderKind::CapitalOne => capitalone_alert_import::extract,
            ProviderKind::Paypal => paypal_alert_import::extract,
            ProviderKind::Target => target_alert_import::extract,
            ProviderKind::Affinity => affinity_alert_import::extract,
        }
    }

    fn uses_card_digits(self) -> bool {
        matches!(self, ProviderKind::Chase)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub label: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub accounts: AccountTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub providers: Vec<ProviderConfig>,
}

impl ImportConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A configured provider. Stateless; one instance serves any number of
/// messages.
#[derive(Debug, Clone)]
pub struct Provider {
    id: String,
    label: String,
    kind: ProviderKind,
    target: AccountTarget,
}

impl Provider {
    pub fn from_config(config: ProviderConfig) -> Result<Self, ConfigError> {
        let kind = config.kind;
        let target = if kind.uses_card_digits() {
            if config.accounts.is_empty() {
                return Err(ConfigError::MissingAccountTable {
                    id: config.id,
                    kind: kind.as_str(),
                });
            }
            AccountTarget::ByCardDigits(config.accounts)
        } else {
            match config.account.filter(|a| !a.trim().is_empty()) {
                Some(account) => AccountTarget::Fixed(account),
                None => {
                    return Err(ConfigError::MissingAccount {
                        id: config.id,
                        kind: kind.as_str(),
                    })
                }
            }
        };
        Ok(Self {
            id: config.id,
            label: config.label,
            kind,
            target,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn target(&self) -> &AccountTarget {
        &self.target
    }

    pub fn extract(&self, patterns: &Patterns, message: &Message) -> Result<Extraction, ExtractError> {
        (self.kind.extractor())(patterns, self, message)
    }

    /// The posting account, or the unmatched reason when the digits are not
    /// configured.
    pub(crate) fn resolve_account(&self, digits: Option<&str>) -> Result<String, Unmatched> {
        match self.target.resolve(digits) {
            AccountMatch::Mapped(account) => Ok(account.to_string()),
            AccountMatch::Unmapped => Err(Unmatched::UnmappedAccount {
                digits: digits.unwrap_or_default().to_string(),
            }),
        }
    }

    /// Date from a root header of the message.
    pub(crate) fn header_date(
        &self,
        message: &Message,
        header: &'static str,
    ) -> Result<NaiveDate, ExtractError> {
        let value = message.header(header).ok_or_else(|| {
            ExtractError::structural(&self.id, "date", StructuralReason::MissingHeader(header))
        })?;
        self.parse_header_date(header, value)
    }

    /// Date from the first `Received` header, which carries it after `;`.
    pub(crate) fn received_date(&self, message: &Message) -> Result<NaiveDate, ExtractError> {
        const HEADER: &str = "Received";
        let value = message.header(HEADER).ok_or_else(|| {
            ExtractError::structural(&self.id, "date", StructuralReason::MissingHeader(HEADER))
        })?;
        let stamp = value.rsplit_once(';').map(|(_, d)| d).unwrap_or(value);
        self.parse_header_date(HEADER, stamp)
    }

    /// A date captured by a template that already matched.
    pub(crate) fn captured_date(&self, raw: &str) -> Result<NaiveDate, ExtractError> {
        normalize_date(raw).map_err(|e| ExtractError::structural(&self.id, "date", e))
    }

    fn parse_header_date(&self, header: &'static str, value: &str) -> Result<NaiveDate, ExtractError> {
        normalize_date(value).map_err(|source| ExtractError::DateFormat {
            provider: self.id.clone(),
            header,
            source,
        })
    }
}

/// Read-only table of configured providers, in configuration order.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
    patterns: &'static Patterns,
}

impl ProviderRegistry {
    pub fn from_configs(configs: Vec<ProviderConfig>) -> Result<Self, ConfigError> {
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut providers = Vec::with_capacity(configs.len());
        for config in configs {
            if let Some(first) = seen.get(&config.label) {
                return Err(ConfigError::DuplicateLabel {
                    label: config.label,
                    first: first.clone(),
                    second: config.id,
                });
            }
            seen.insert(config.label.clone(), config.id.clone());
            providers.push(Provider::from_config(config)?);
        }
        Ok(Self {
            providers,
            patterns: Patterns::shared(),
        })
    }

    pub fn from_config(config: ImportConfig) -> Result<Self, ConfigError> {
        Self::from_configs(config.providers)
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// First provider, in configuration order, whose label the message has.
    pub fn select(&self, message: &Message) -> Option<&Provider> {
        self.providers.iter().find(|p| message.has_label(&p.label))
    }

    pub fn extract(&self, message: &Message) -> Result<Extraction, ExtractError> {
        let Some(provider) = self.select(message) else {
            tracing::debug!(message_id = %message.id, "no provider for message labels");
            return Ok(Extraction::unmatched(Unmatched::NoProvider));
        };
        tracing::debug!(
            provider = provider.id(),
            label = provider.label(),
            kind = provider.kind().as_str(),
            message_id = %message.id,
            "provider selected"
        );
        let extraction = provider.extract(self.patterns, message)?;
        if let Some(reason) = extraction.unmatched_reason() {
            tracing::info!(
                provider = %provider.id,
                message_id = %message.id,
                ?reason,
                "unrecognized transaction format"
            );
        }
        Ok(extraction)
    }
}
