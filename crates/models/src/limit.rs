use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Transaction category a limit applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    /// Point of sale / in-store payments.
    Pos,
    /// ATM cash withdrawals.
    Atm,
    /// E-commerce / online payments.
    Ecom,
}

impl LimitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitType::Pos => "pos",
            LimitType::Atm => "atm",
            LimitType::Ecom => "ecom",
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitType {
    type Err = ModelError;

    /// Exact, case-sensitive match on the wire tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pos" => Ok(LimitType::Pos),
            "atm" => Ok(LimitType::Atm),
            "ecom" => Ok(LimitType::Ecom),
            other => Err(ModelError::InvalidLimitType(other.to_string())),
        }
    }
}

/// Standing limits of one card, in whole dollars.
///
/// Every field is optional so that a card without an entry reads as `{}`.
/// Values are not range-checked. Keys other than the three categories are
/// kept in `extra` and written back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atm: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecom: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LimitSet {
    pub fn new(pos: i64, atm: i64, ecom: i64) -> Self {
        Self { pos: Some(pos), atm: Some(atm), ecom: Some(ecom), extra: Map::new() }
    }

    pub fn get(&self, limit_type: LimitType) -> Option<i64> {
        *self.slot(limit_type)
    }

    /// Overwrite one field, returning the previous value.
    pub fn set(&mut self, limit_type: LimitType, value: i64) -> Option<i64> {
        self.slot_mut(limit_type).replace(value)
    }

    fn slot(&self, limit_type: LimitType) -> &Option<i64> {
        match limit_type {
            LimitType::Pos => &self.pos,
            LimitType::Atm => &self.atm,
            LimitType::Ecom => &self.ecom,
        }
    }

    fn slot_mut(&mut self, limit_type: LimitType) -> &mut Option<i64> {
        match limit_type {
            LimitType::Pos => &mut self.pos,
            LimitType::Atm => &mut self.atm,
            LimitType::Ecom => &mut self.ecom,
        }
    }
}

/// Time-bounded override for one category.
///
/// Dates are kept as the caller sent them; neither format nor ordering is checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryLimit {
    #[serde(rename = "type")]
    pub limit_type: LimitType,
    pub limit: i64,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}
