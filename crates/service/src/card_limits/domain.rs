use models::{Account, LimitSet, LimitType, TemporaryLimit};
use serde::{Deserialize, Serialize};

/// All accounts with `currentLimits`/`temporaryLimits` attached to every card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstruments {
    pub accounts: Vec<Account>,
}

/// Limits of a single card; missing entries read as `{}` / `[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentLimits {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub limits: LimitSet,
    #[serde(rename = "temporaryLimits")]
    pub temporary_limits: Vec<TemporaryLimit>,
}

/// Result of a standing limit change.
///
/// A rejected change serializes as `{"error": ...}`; callers check for that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitChange {
    Applied {
        #[serde(rename = "cardId")]
        card_id: String,
        #[serde(rename = "type")]
        limit_type: LimitType,
        /// `None` when the card had no value for this category yet.
        old: Option<i64>,
        new: i64,
    },
    Rejected { error: String },
}

/// Result of appending a temporary override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemporaryLimitCreation {
    Created {
        #[serde(rename = "cardId")]
        card_id: String,
        created: TemporaryLimit,
    },
    Rejected { error: String },
}

impl LimitChange {
    pub fn is_rejected(&self) -> bool {
        matches!(self, LimitChange::Rejected { .. })
    }
}

impl TemporaryLimitCreation {
    pub fn is_rejected(&self) -> bool {
        matches!(self, TemporaryLimitCreation::Rejected { .. })
    }
}
