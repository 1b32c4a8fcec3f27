//! Error types for alert extraction.
//!
//! Fatal, per-message failures (`ExtractError`) are kept apart from the
//! normal "nothing recognized" outcome, which is `Extraction::Unmatched` and
//! never an error.

/// An encoded body that neither padded nor unpadded URL-safe base64 accepts.
#[derive(Debug, thiserror::Error)]
#[error("body is not valid url-safe base64 (padded: {padded}; unpadded: {unpadded})")]
pub struct DecodeError {
    pub padded: base64::DecodeError,
    #[source]
    pub unpadded: base64::DecodeError,
}

/// A date string that none of the accepted grammars could parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized date format: {input:?}")]
pub struct DateFormatError {
    pub input: String,
}

/// Why a value required by an already-matched template could not be read.
#[derive(Debug, thiserror::Error)]
pub enum StructuralReason {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error(transparent)]
    Date(#[from] DateFormatError),
}

/// A template matched, but one of its required values failed to normalize.
#[derive(Debug, thiserror::Error)]
#[error("provider {provider}: template matched but `{field}` is unusable: {reason}")]
pub struct StructuralParseError {
    pub provider: String,
    pub field: &'static str,
    #[source]
    pub reason: StructuralReason,
}

/// Fatal extraction failure for a single message.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("provider {provider}: {header} header date: {source}")]
    DateFormat {
        provider: String,
        header: &'static str,
        #[source]
        source: DateFormatError,
    },

    #[error(transparent)]
    Structural(#[from] StructuralParseError),
}

impl ExtractError {
    pub(crate) fn structural(
        provider: &str,
        field: &'static str,
        reason: impl Into<StructuralReason>,
    ) -> Self {
        ExtractError::Structural(StructuralParseError {
            provider: provider.to_string(),
            field,
            reason: reason.into(),
        })
    }
}

/// Provider configuration errors, raised while building the registry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse provider configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("routing label {label:?} is claimed by both {first:?} and {second:?}")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("provider {id:?} ({kind}) needs an `account`")]
    MissingAccount { id: String, kind: &'static str },

    #[error("provider {id:?} ({kind}) needs a non-empty `accounts` table")]
    MissingAccountTable { id: String, kind: &'static str },
}

/// Raw RFC 822 input that could not be turned into a content tree.
#[derive(Debug, thiserror::Error)]
pub enum EmlError {
    #[error("failed to parse MIME message: {0}")]
    Mime(#[from] mailparse::MailParseError),
}
