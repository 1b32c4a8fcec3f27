use serde::Serialize;

use crate::content_decode::decode_body_text;
use crate::error::DecodeError;
use crate::html_flatten::flatten_html;
use crate::message::Message;
use crate::mime_walk::find_part;

/// A textual rendering of a message that templates can be run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    /// First `text/plain` leaf.
    PlainText,
    /// First `text/html` leaf, flattened.
    Html,
    /// The mailbox's short summary (snippet).
    Summary,
    /// The root `Subject` header.
    Subject,
}

/// The text for `source`, or `None` if the message has no such rendering.
///
/// Computed on demand: a source that is never asked for is never decoded.
pub fn body_text(message: &Message, source: BodySource) -> Result<Option<String>, DecodeError> {
    match source {
        BodySource::PlainText => decoded_leaf(message, "text/plain"),
        BodySource::Html => Ok(decoded_leaf(message, "text/html")?.map(|html| flatten_html(&html))),
        BodySource::Summary => Ok(non_empty(&message.summary)),
        BodySource::Subject => Ok(message.header("Subject").and_then(non_empty)),
    }
}

/// Raw (unflattened) HTML: the first `text/html` leaf, else the root body.
pub fn raw_html(message: &Message) -> Result<Option<String>, DecodeError> {
    if let Some(html) = decoded_leaf(message, "text/html")? {
        return Ok(Some(html));
    }
    match message.payload.encoded_body() {
        Some(data) => Ok(Some(decode_body_text(data)?)),
        None => Ok(None),
    }
}

fn decoded_leaf(message: &Message, media_type: &str) -> Result<Option<String>, DecodeError> {
    match find_part(&message.payload, media_type).and_then(|p| p.encoded_body()) {
        Some(data) => Ok(Some(decode_body_text(data)?)),
        None => Ok(None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
