use crate::body_text::BodySource;
use crate::error::ExtractError;
use crate::extract::{first_complete, Template};
use crate::message::Message;
use crate::patterns::Patterns;
use crate::provider_registry::Provider;
use crate::transaction::{Direction, Extraction, TransactionParts, Unmatched};

const SOURCES: &[BodySource] = &[BodySource::PlainText, BodySource::Html, BodySource::Summary];

#[derive(Debug)]
pub struct TargetPatterns {
    approval: Template,
}

impl TargetPatterns {
    pub(crate) fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            approval: Template::new(
                "target_approval",
                r"(?s)Hello .*,.*A transaction of (?P<amt>\$\d{1,3}(?:,\d{3})*\.\d{2})[\s\p{Zs}]+at[\s\p{Zs}]+(?P<payee>.+?)[\s\p{Zs}]+has been approved on your.*Target Circle.*Card",
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
    let Some(m) = first_complete(&patterns.target.approval, message)? else {
        return Ok(Extraction::unmatched(Unmatched::NoTemplate));
    };
    // The body has no date; the first Received stamp stands in.
    let date = provider.received_date(message)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Part;
    use crate::provider_registry::{ProviderConfig, ProviderKind};
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;
    use chrono::NaiveDate;

    const ALERT_HTML: &str = r#"<table><tr><td>
<p style="margin-top: 16px;">For <span style="color: #cc0000;">Target Circle Card</span> ending in 5432</p>
<p style="margin-top: 16px;">Hello NAME,</p>
<p style="margin-top: 16px;">A transaction of $19.99 at TARGET T-1234 has been approved on your <span style="color: #cc0000; font-weight: bold;">Target Circle&trade; Card</span>.</p>
<p>To view your card activity or update your alert settings, visit Target.com.</p>
</td></tr></table>"#;

    const RECEIVED: &str = "by 2002:a05:6214:301b:b0:88a:2c41:ff0e with SMTP id ke27csp1234567qvb; Fri, 16 Jan 2026 15:17:15 -0800 (PST)";

    fn provider() -> Provider {
        Provider::from_config(ProviderConfig {
            id: "target".into(),
            label: "Label_target".into(),
            kind: ProviderKind::Target,
            account: Some("target:circle".into()),
            accounts: Default::default(),
        })
        .expect("provider")
    }

    fn alert(html: &str) -> Message {
        Message::new(
            Part::multipart(
                "multipart/alternative",
                vec![Part::leaf("text/html", URL_SAFE.encode(html))],
            )
            .with_header("Received", RECEIVED)
            .with_header("Received", "from mail.target.com; Fri, 16 Jan 2026 15:17:14 -0800"),
        )
    }

    #[test]
    fn html_alert() {
        let tx = extract(Patterns::shared(), &provider(), &alert(ALERT_HTML))
            .expect("no error")
            .into_transaction()
            .expect("transaction");
        assert_eq!(tx.amount(), "$19.99");
        assert_eq!(tx.payee(), "TARGET T-1234");
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2026, 1, 16).expect("date"));
        assert_eq!(tx.account(), "target:circle");
    }

    #[test]
    fn summary_is_the_last_resort() {
        let msg = Message::new(Part::default().with_header("Received", RECEIVED)).with_summary(
            "Hello NAME, A transaction of $1,250.00 at TARGET T-0042 has been approved on your Target Circle Card.",
        );
        let tx = extract(Patterns::shared(), &provider(), &msg)
            .expect("no error")
            .into_transaction()
            .expect("transaction");
        assert_eq!(tx.amount(), "$1,250.00");
        assert_eq!(tx.payee(), "TARGET T-0042");
    }

    #[test]
    fn unrelated_body_is_unmatched() {
        let msg = alert("<p>Your Target Circle Card statement is ready.</p>");
        assert_eq!(
            extract(Patterns::shared(), &provider(), &msg).expect("no error"),
            Extraction::unmatched(Unmatched::NoTemplate)
        );
    }

    #[test]
    fn missing_received_header_is_structural() {
        let msg = Message::new(Part::leaf("text/html", URL_SAFE.encode(ALERT_HTML)));
        assert!(matches!(
            extract(Patterns::shared(), &provider(), &msg),
            Err(ExtractError::Structural(_))
        ));
    }
}
