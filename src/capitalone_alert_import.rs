use crate::body_text::BodySource;
use crate::error::ExtractError;
use crate::extract::{first_complete, Template};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::PlainText, BodySource::Html, BodySource::Summary];
const CHARGE_SUBJECT: &str = "transaction was charged to your account";

#[derive(Debug)]
pub struct CapitalOnePatterns {
    purchase: Template,
}

impl CapitalOnePatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            purchase: Template::new(
                "capitalone_purchase",
                r"on (?P<date>[A-Z][a-z]+ \d{1,2}, \d{4}), at (?P<payee>.+?), a pending authorization or purchase in the amount of (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2}) was placed",
                &["date", "payee", "amt"],
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
    let charged = message
        .header("Subject")
        .is_some_and(|s| s.contains(CHARGE_SUBJECT));
    if !charged {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    }

    let Some(m) = first_complete(&patterns.capital_one.purchase, message)? else {
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
