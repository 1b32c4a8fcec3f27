//! PayPal payment receipts, both money sent and money received.
//!
//! Everything is read from the message summary. A "You sent" receipt may
//! carry a note addressed to the payee and a details block with the
//! transaction id and date; a "sent you" receipt may carry the sender's note
//! and the transaction id. When no usable date is captured the `Date` header
//! is used.

use chrono::NaiveDate;

use crate::body_text::BodySource;
use crate::date_normalize::normalize_date;
use crate::error::ExtractError;
use crate::extract::{by_direction, scoped_note, Template};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::Summary];
const NOTE_PREFIX: &str = "YOUR NOTE TO";
const NOTE_SUFFIX: &str = "Transaction Details";

#[derive(Debug)]
pub struct PaypalPatterns {
    sent: Template,
    sent_details: Template,
    received: Template,
}

impl PaypalPatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            sent: Template::new(
                "paypal_sent",
                r"You sent (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2}).*? to (?P<payee>(?:\S+\s)+?)(?:YOUR NOTE TO|Transaction Details)",
                &["amt", "payee"],
                SOURCES,
            )?,
            sent_details: Template::new(
                "paypal_sent_details",
                r"Details Transaction ID: (?P<id>\S+) (?P<date>[A-Z][a-z]{2,8} \d{1,2}, \d{4})?",
                &["id"],
                SOURCES,
            )?,
            received: Template::new(
                "paypal_received",
                r"Hello, \S+\s\S+ (?P<payee>.+?) sent you (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2})(?:.*?Note from [^:]*: (?P<note>.*?)|.*?) Transaction Details(?: Transaction ID:? (?P<id>\S+))?",
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
    let paypal = &patterns.paypal;
    let Some((direction, m)) = by_direction(&paypal.sent, &paypal.received, message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    };
    let mut fields = m.fields;

    if direction == Direction::Sent {
        let payee = fields.text("payee");
        if let Some(note) = scoped_note(NOTE_PREFIX, &payee, NOTE_SUFFIX, &message.summary) {
            fields.insert("note", html_escape::decode_html_entities(&note));
        }
        if let Some(details) = paypal.sent_details.apply(&message.summary) {
            fields.overlay(details);
        }
    }

    let date = match fields.get("date").and_then(|raw| normalize_date(raw).ok()) {
        Some(date) => date,
        None => header_fallback(provider, message)?,
    };
    let account = match provider.resolve_account(None) {
        Ok(account) => account,
        Err(unmatched) => return Ok(Extraction::unmatched(unmatched)),
    };

    Ok(Extraction::matched(TransactionParts {
        payee: fields.text("payee"),
        amount: fields.text("amt"),
        date,
        account,
        note: fields.get("note").map(str::to_string),
        id: fields.get("id").map(str::to_string),
        direction,
    }))
}

fn header_fallback(provider: &Provider, message: &Message) -> Result<NaiveDate, ExtractError> {
    tracing::debug!(provider = provider.id(), "no usable date in summary, using Date header");
    provider.header_date(message, "Date")
}
