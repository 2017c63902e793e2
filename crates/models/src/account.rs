use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::limit::{LimitSet, TemporaryLimit};

/// Account record from `accounts.json`.
///
/// Only the card list is interpreted; the identifier, owner and display
/// fields are carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Debit card nested under an account.
///
/// `current_limits` and `temporary_limits` are derived at read time from the
/// limit documents and are absent in the persisted form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "cardId")]
    pub card_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    #[serde(rename = "currentLimits", default, skip_serializing_if = "Option::is_none")]
    pub current_limits: Option<LimitSet>,
    #[serde(rename = "temporaryLimits", default, skip_serializing_if = "Option::is_none")]
    pub temporary_limits: Option<Vec<TemporaryLimit>>,
}
