use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use mailparse::{parse_mail, ParsedMail};
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::body_text::{body_text, BodySource};
use crate::error::EmlError;

const SNIPPET_MAX_CHARS: usize = 200;

/// A notification message: a content tree plus the summary and routing
/// labels the mailbox attached to it.
///
/// Field names follow the Gmail API `users.messages.get` response, so a dump
/// of that response deserializes directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "labelIds")]
    pub labels: BTreeSet<String>,
    #[serde(default, rename = "snippet")]
    pub summary: String,
    #[serde(default)]
    pub payload: Part,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Part {
    /// A leaf part carrying an already-encoded body.
    pub fn leaf(mime_type: impl Into<String>, encoded_body: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            headers: Vec::new(),
            body: Some(PartBody {
                data: Some(encoded_body.into()),
            }),
            parts: Vec::new(),
        }
    }

    pub fn multipart(mime_type: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            mime_type: mime_type.into(),
            headers: Vec::new(),
            body: None,
            parts,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// First value of the named header; names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The `mimeType` field, or the `Content-Type` header when that is empty.
    pub fn media_type(&self) -> &str {
        let mime = self.mime_type.trim();
        if !mime.is_empty() {
            return mime;
        }
        self.header("Content-Type").map(str::trim).unwrap_or("")
    }

    pub fn encoded_body(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|data| !data.is_empty())
    }
}

impl Message {
    pub fn new(payload: Part) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Header lookup on the root part.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.header(name)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Builds a content tree from raw RFC 822 bytes.
    ///
    /// Leaf bodies are stored as padded url-safe base64, the same form the
    /// Gmail API delivers, and the summary is synthesized from the first
    /// readable body.
    pub fn from_eml<I, S>(raw: &[u8], labels: I) -> Result<Self, EmlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mail = parse_mail(raw)?;
        let payload = part_from_mail(&mail)?;
        let mut message = Message {
            id: payload
                .header("Message-ID")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            labels: labels.into_iter().map(Into::into).collect(),
            summary: String::new(),
            payload,
        };
        message.summary = synthesize_snippet(&message);
        Ok(message)
    }
}

fn part_from_mail(mail: &ParsedMail) -> Result<Part, EmlError> {
    let headers = mail
        .headers
        .iter()
        .map(|h| Header::new(h.get_key(), h.get_value()))
        .collect::<Vec<_>>();
    let mime_type = mail.ctype.mimetype.to_ascii_lowercase();

    if !mail.subparts.is_empty() {
        let parts = mail
            .subparts
            .iter()
            .map(part_from_mail)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Part {
            mime_type,
            headers,
            body: None,
            parts,
        });
    }

    let bytes = if mime_type.starts_with("text/") {
        mail.get_body()?.into_bytes()
    } else {
        mail.get_body_raw()?
    };
    Ok(Part {
        mime_type,
        headers,
        body: Some(PartBody {
            data: Some(URL_SAFE.encode(bytes)),
        }),
        parts: Vec::new(),
    })
}

fn synthesize_snippet(message: &Message) -> String {
    let text = [BodySource::PlainText, BodySource::Html]
        .into_iter()
        .find_map(|source| body_text(message, source).ok().flatten())
        .unwrap_or_default();
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .collect()
}
