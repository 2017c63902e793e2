//! Domain records for the card limit documents.
//!
//! Three JSON documents make up the persisted state: the account list, the
//! standing limits per card and the temporary overrides per card. All three
//! are keyed (directly or through `cards[].cardId`) by the card identifier.

use std::collections::BTreeMap;

pub mod errors;
pub mod account;
pub mod limit;

pub use account::{Account, Card};
pub use errors::ModelError;
pub use limit::{LimitSet, LimitType, TemporaryLimit};

/// `accounts.json`: ordered list of accounts, each carrying its cards.
pub type AccountsDocument = Vec<Account>;

/// `limits.json`: card identifier to standing limits.
pub type LimitsDocument = BTreeMap<String, LimitSet>;

/// `temporary_limits.json`: card identifier to its overrides, in insertion order.
pub type TemporaryLimitsDocument = BTreeMap<String, Vec<TemporaryLimit>>;
