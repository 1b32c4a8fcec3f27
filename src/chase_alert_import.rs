use crate::account_resolve::trailing_card_digits;
use crate::body_text::{raw_html, BodySource};
use crate::error::ExtractError;
use crate::extract::{first_complete, Template};
use crate::html_flatten::{cell_after_label, table_rows};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::Subject];
const ACCOUNT_LABEL: &str = "Account";

#[derive(Debug)]
pub struct ChasePatterns {
    subject: Template,
}

impl ChasePatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            // "Your $1,234.56 transaction with X" and "You made a $4.04 transaction at X"
            subject: Template::new(
                "chase_subject",
                r"^(?:Your|You made a) (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2}) transaction (?:with|at) (?P<payee>.+)$",
                &["amt", "payee"],
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
    let Some(m) = first_complete(&patterns.chase.subject, message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    };
    let date = provider.header_date(message, "Date")?;

    let Some(html) = raw_html(message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoAccountCell));
    };
    let rows = table_rows(&html);
    let Some(digits) = cell_after_label(&rows, ACCOUNT_LABEL).and_then(trailing_card_digits) else {
        return Ok(Extraction::unmatched(Unmatched::NoAccountCell));
    };
    let account = match provider.resolve_account(Some(digits)) {
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
