//! Extracts ledger transactions from card and payment alert messages.
//!
//! A [`ProviderRegistry`] is built from configuration, then each
//! [`Message`] is routed by label to a provider that runs its templates over
//! the message's subject, plain-text, HTML and summary renderings.

pub mod account_resolve;
mod affinity_alert_import;
pub mod body_text;
mod capitalone_alert_import;
mod chase_alert_import;
pub mod content_decode;
pub mod date_normalize;
mod discover_alert_import;
pub mod error;
pub mod extract;
pub mod html_flatten;
pub mod message;
pub mod mime_walk;
mod patterns;
mod paypal_alert_import;
pub mod provider_registry;
mod target_alert_import;
pub mod transaction;

pub use account_resolve::{trailing_card_digits, AccountMatch, AccountTable, AccountTarget};
pub use body_text::{body_text, BodySource};
pub use content_decode::{decode_body, decode_body_text};
pub use date_normalize::{normalize_date, normalize_date_in_year};
pub use error::{
    ConfigError, DateFormatError, DecodeError, EmlError, ExtractError, StructuralParseError,
    StructuralReason,
};
pub use html_flatten::flatten_html;
pub use message::{Header, Message, Part, PartBody};
pub use mime_walk::find_part;
pub use patterns::Patterns;
pub use provider_registry::{ImportConfig, Provider, ProviderConfig, ProviderKind, ProviderRegistry};
pub use transaction::{Direction, Extraction, Transaction, TransactionParts, Unmatched};
