use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money left the account (card charge, payment sent).
    Sent,
    Received,
}

/// A recognized transaction. Built once by a provider and read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    payee: String,
    amount: String,
    date: NaiveDate,
    account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    direction: Direction,
}

/// The fields a provider gathers before sealing them into a [`Transaction`].
#[derive(Debug, Clone)]
pub struct TransactionParts {
    pub payee: String,
    pub amount: String,
    pub date: NaiveDate,
    pub account: String,
    pub note: Option<String>,
    pub id: Option<String>,
    pub direction: Direction,
}

impl From<TransactionParts> for Transaction {
    fn from(parts: TransactionParts) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            payee: parts.payee,
            amount: parts.amount,
            date: parts.date,
            account: parts.account,
            note: non_empty(parts.note),
            id: non_empty(parts.id),
            direction: parts.direction,
        }
    }
}

impl Transaction {
    pub fn payee(&self) -> &str {
        &self.payee
    }

    /// Currency-formatted as it appeared in the message, e.g. "$3,096.00".
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Why a message yielded no transaction. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unmatched {
    /// No configured provider claims any of the message's labels.
    NoProvider,
    /// The provider's templates did not fill their required fields.
    NoTemplate,
    /// The account label/value cell was not found in the HTML body.
    NoAccountCell,
    /// Card digits were found but are not in the provider's table.
    UnmappedAccount { digits: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Extraction {
    Matched { transaction: Transaction },
    Unmatched { unmatched: Unmatched },
}

impl Extraction {
    pub fn matched(parts: TransactionParts) -> Self {
        Extraction::Matched {
            transaction: parts.into(),
        }
    }

    pub fn unmatched(reason: Unmatched) -> Self {
        Extraction::Unmatched { unmatched: reason }
    }

    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            Extraction::Matched { transaction } => Some(transaction),
            Extraction::Unmatched { .. } => None,
        }
    }

    pub fn unmatched_reason(&self) -> Option<&Unmatched> {
        match self {
            Extraction::Matched { .. } => None,
            Extraction::Unmatched { unmatched } => Some(unmatched),
        }
    }
}
