use crate::body_text::BodySource;
use crate::error::ExtractError;
use crate::extract::{first_complete, Template};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::Summary];

#[derive(Debug)]
pub struct AffinityPatterns {
    service_charge: Template,
}

impl AffinityPatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            service_charge: Template::new(
                "affinity_service_charge",
                r"Service Charge for (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2}) on (?P<date>.+?) at (?P<payee>.+?) on card ending in",
                &["amt", "date", "payee"],
                SOURCES,
            )?,
        })
    }
}

pub(crate) fn extract(
    patterns: &Patterns,
    provider: &Provider,
    message: &Message,
) -> Result<Extraction, ExtractError> {
    let Some(m) = first_complete(&patterns.affinity.service_charge, message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    };
    let date = provider.captured_date(&m.fields.text("date"))?;
    let account = match provider.resolve_account(None) {
        Ok(account) => account,
        Err(unmatched) => return Ok(Extraction::unmatched(unmatched)),
    };

    Ok(Extraction::matched(TransactionParts {
        payee: m.fields.text("payee"),
        amount: m.fields.text("amt"),
        date,
        account,
        note: None,
        id: None,
        direction: Direction::Sent,
    }))
}
