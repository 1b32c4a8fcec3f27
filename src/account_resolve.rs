use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn card_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{4,}").expect("invalid card digits regex"))
}

/// Card-number suffix to ledger account. Keys are numeric, so "0719" and
/// "719" name the same card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AccountTable(BTreeMap<u32, String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMatch<'a> {
    Mapped(&'a str),
    Unmapped,
}

/// Where a provider's transactions post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountTarget {
    Fixed(String),
    ByCardDigits(AccountTable),
}

impl AccountTable {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve(&self, digits: &str) -> AccountMatch<'_> {
        let key = match digits.trim().parse::<u32>() {
            Ok(key) => key,
            Err(_) => return AccountMatch::Unmapped,
        };
        match self.0.get(&key) {
            Some(account) => AccountMatch::Mapped(account),
            None => AccountMatch::Unmapped,
        }
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for AccountTable {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl AccountTarget {
    /// A fixed target always maps; a table needs the card digits.
    pub fn resolve(&self, digits: Option<&str>) -> AccountMatch<'_> {
        match (self, digits) {
            (AccountTarget::Fixed(account), _) => AccountMatch::Mapped(account),
            (AccountTarget::ByCardDigits(table), Some(digits)) => table.resolve(digits),
            (AccountTarget::ByCardDigits(_), None) => AccountMatch::Unmapped,
        }
    }
}

/// Final four digits of the last digit run of at least four, e.g.
/// "Visa (...8719)" -> "8719", "ending in 48719" -> "8719".
pub fn trailing_card_digits(text: &str) -> Option<&str> {
    let run = card_digits_re().find_iter(text).last()?.as_str();
    Some(&run[run.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AccountTable {
        [(8719, "liabilities:chase:freedom"), (719, "liabilities:chase:sapphire")]
            .into_iter()
            .collect()
    }

    #[test]
    fn maps_known_digits() {
        assert_eq!(
            table().resolve("8719"),
            AccountMatch::Mapped("liabilities:chase:freedom")
        );
        assert_eq!(
            table().resolve("0719"),
            AccountMatch::Mapped("liabilities:chase:sapphire")
        );
    }

    #[test]
    fn unknown_or_garbage_digits_are_unmapped() {
        assert_eq!(table().resolve("1234"), AccountMatch::Unmapped);
        assert_eq!(table().resolve("12a4"), AccountMatch::Unmapped);
        assert_eq!(table().resolve(""), AccountMatch::Unmapped);
    }

    #[test]
    fn fixed_target_ignores_digits() {
        let target = AccountTarget::Fixed("liabilities:discover".into());
        assert_eq!(
            target.resolve(None),
            AccountMatch::Mapped("liabilities:discover")
        );
        let target = AccountTarget::ByCardDigits(table());
        assert_eq!(target.resolve(None), AccountMatch::Unmapped);
        assert_eq!(
            target.resolve(Some("8719")),
            AccountMatch::Mapped("liabilities:chase:freedom")
        );
    }

    #[test]
    fn deserializes_string_keys() {
        let parsed: AccountTable =
            serde_json::from_str(r#"{"8719": "liabilities:chase:freedom"}"#).expect("parse");
        assert_eq!(parsed.resolve("8719"), AccountMatch::Mapped("liabilities:chase:freedom"));
    }

    #[test]
    fn trailing_digits_take_the_last_group() {
        assert_eq!(trailing_card_digits("Chase Freedom Visa (...8719)"), Some("8719"));
        assert_eq!(trailing_card_digits("Card 2024 ending 5432"), Some("5432"));
        assert_eq!(trailing_card_digits("no digits"), None);
        assert_eq!(trailing_card_digits("Visa 12 ending 345"), None);
    }

    #[test]
    fn long_digit_runs_keep_their_final_four() {
        assert_eq!(trailing_card_digits("Visa ending in 48719"), Some("8719"));
        assert_eq!(trailing_card_digits("Card 4111111111118719 (primary)"), Some("8719"));
        assert_eq!(
            AccountTarget::ByCardDigits(table()).resolve(trailing_card_digits("Visa ending in 48719")),
            AccountMatch::Mapped("liabilities:chase:freedom")
        );
    }
}
