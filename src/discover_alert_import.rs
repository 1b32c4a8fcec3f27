use crate::body_text::BodySource;
use crate::error::ExtractError;
use crate::extract::{merge_fields, MergedTemplate};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::PlainText, BodySource::Html, BodySource::Summary];
const REQUIRED: &[&str] = &["date", "payee", "amt"];
const MESSAGE_ID_HEADER: &str = "X-MSG-ID";

/// Labeled lines in any order, merged across plain text, HTML and summary.
#[derive(Debug)]
pub struct DiscoverPatterns {
    labeled_lines: MergedTemplate,
}

impl DiscoverPatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            labeled_lines: MergedTemplate::new(
                "discover_labeled_lines",
                &[
                    // Table layouts put the value on the line after its label.
                    r"(?m)^(?:Transaction Date|Date):[ \t]*(?:\n[ \t]*)?(?P<date>\S.*)$",
                    r"(?m)^Merchant:[ \t]*(?:\n[ \t]*)?(?P<payee>\S.*)$",
                    r"(?m)^Amount:[ \t]*(?:\n[ \t]*)?(?P<amt>[\$\d,]+\.\d{2})[ \t]*$",
                ],
                REQUIRED,
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
    let Some(fields) = merge_fields(&patterns.discover.labeled_lines, message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    };
    let date = provider.captured_date(&fields.text("date"))?;
    let account = match provider.resolve_account(None) {
        Ok(account) => account,
        Err(unmatched) => return Ok(Extraction::unmatched(unmatched)),
    };

    Ok(Extraction::matched(TransactionParts {
        payee: fields.text("payee"),
        amount: fields.text("amt"),
        date,
        account,
        note: None,
        id: message.header(MESSAGE_ID_HEADER).map(|v| v.trim().to_string()),
        direction: Direction::Sent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Part;
    use crate::provider_registry::{ProviderConfig, ProviderKind};
    use crate::transaction::Transaction;
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;
    use chrono::NaiveDate;

    const HTML_ALERT: &str = "<html><body>Merchant: HOLIDAY STATIONS 3826<br/>Date: August 27, 2025<br/>Amount: $1.00</body></html>";

    fn provider() -> Provider {
        Provider::from_config(ProviderConfig {
            id: "discover".into(),
            label: "Label_disc".into(),
            kind: ProviderKind::Discover,
            account: Some("Discover".into()),
            accounts: Default::default(),
        })
        .expect("provider")
    }

    fn multipart(parts: Vec<Part>) -> Message {
        Message::new(
            Part::multipart("", parts)
                .with_header("Content-Type", "multipart/alternative; boundary=abc"),
        )
    }

    // Empty mimeType, so the media type comes from the Content-Type header.
    fn plain(text: &str) -> Part {
        Part::leaf("", URL_SAFE.encode(text)).with_header("Content-Type", "text/plain; charset=\"UTF-8\"")
    }

    fn html(text: &str) -> Part {
        Part::leaf("", URL_SAFE.encode(text)).with_header("Content-Type", "text/html; charset=\"UTF-8\"")
    }

    fn run(message: &Message) -> Option<Transaction> {
        extract(Patterns::shared(), &provider(), message)
            .expect("no error")
            .into_transaction()
    }

    fn holiday(day: u32) -> (String, String, NaiveDate) {
        (
            "HOLIDAY STATIONS 3826".to_string(),
            "$1.00".to_string(),
            NaiveDate::from_ymd_opt(2025, 8, day).expect("date"),
        )
    }

    fn summary(tx: &Transaction) -> (String, String, NaiveDate) {
        (tx.payee().to_string(), tx.amount().to_string(), tx.date())
    }

    #[test]
    fn old_format_plain_text() {
        let msg = multipart(vec![plain(
            "Transaction Date: August 18, 2025\nMerchant: HOLIDAY STATIONS 3826\nAmount: $1.00",
        )]);
        let tx = run(&msg).expect("transaction");
        assert_eq!(summary(&tx), holiday(18));
        assert_eq!(tx.account(), "Discover");
    }

    #[test]
    fn new_format_plain_text_with_crlf() {
        let msg = multipart(vec![plain(
            "Merchant: HOLIDAY STATIONS 3826\r\nDate: August 27, 2025\r\nAmount: $1.00\r\n",
        )]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn html_only() {
        let msg = multipart(vec![html(HTML_ALERT)]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn html_table_with_values_in_separate_cells() {
        let msg = multipart(vec![html(
            "<table>\
<tr><td>Merchant:</td><td>HOLIDAY STATIONS 3826</td></tr>\
<tr><td>Date:</td><td>August 27, 2025</td></tr>\
<tr><td>Amount:</td><td>$1.00</td></tr>\
</table>",
        )]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn plain_text_without_labels_falls_back_to_html() {
        let msg = multipart(vec![
            plain("This is some random text without the required labels."),
            html(HTML_ALERT),
        ]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn fields_merge_across_plain_and_html() {
        let msg = multipart(vec![
            plain("Merchant: HOLIDAY STATIONS 3826\nDate: August 27, 2025\nThanks for using Discover."),
            html("<p>Merchant: SENTINEL SHOULD NOT WIN</p><p>Amount: $1.00</p>"),
        ]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn html_is_ignored_once_plain_text_is_complete() {
        let msg = multipart(vec![
            plain("Merchant: HOLIDAY STATIONS 3826\nDate: August 27, 2025\nAmount: $1.00"),
            html("<p>Merchant: SENTINEL</p><p>Amount: $999.99</p>"),
        ]);
        assert_eq!(summary(&run(&msg).expect("transaction")), holiday(27));
    }

    #[test]
    fn message_id_header_becomes_transaction_id() {
        let mut msg = multipart(vec![html(HTML_ALERT)]);
        msg.payload = msg.payload.with_header("X-MSG-ID", " 0a1b2c ");
        assert_eq!(run(&msg).expect("transaction").id(), Some("0a1b2c"));
    }

    #[test]
    fn non_matching_content() {
        let msg = Message::new(plain("This is some unrelated content without labeled lines."));
        assert!(run(&msg).is_none());
    }

    #[test]
    fn unparsable_captured_date_is_structural() {
        let msg = multipart(vec![plain(
            "Merchant: HOLIDAY STATIONS 3826\nDate: the 27th\nAmount: $1.00",
        )]);
        let err = extract(Patterns::shared(), &provider(), &msg).expect_err("structural");
        match err {
            ExtractError::Structural(e) => {
                assert_eq!(e.field, "date");
                assert_eq!(e.provider, "discover");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
